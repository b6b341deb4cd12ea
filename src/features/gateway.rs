//! Train/serve gateway
//!
//! [`Trainer`] and [`Server`] are the two sides of one transformation. Both
//! run the same [`FeatureSelector`] and [`CategoricalEncoder`]; only the
//! trainer derives labels and fits, only the server loads and validates.

use ndarray::Array1;
use polars::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    column_names, CategoricalEncoder, FeatureSelector, LabelDeriver, CATEGORICAL_COLUMNS,
};
use crate::artifacts::ArtifactStore;
use crate::error::{FinHealthError, Result};

/// Which side of the gateway to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Training,
    Inference,
}

/// Output of the training side
#[derive(Debug, Clone)]
pub struct TrainingBatch {
    pub features: DataFrame,
    pub labels: Array1<f64>,
    /// Table fitted on this batch; not yet persisted
    pub encoder: CategoricalEncoder,
}

/// Output of the serving side
#[derive(Debug, Clone)]
pub struct ServingBatch {
    /// Encoded features in training column order
    pub features: DataFrame,
    /// Fingerprint of the encoder that produced `features`
    pub encoder_fingerprint: String,
}

/// Mode-independent view returned by [`engineer`]
#[derive(Debug, Clone)]
pub struct EngineeredBatch {
    pub features: DataFrame,
    pub labels: Option<Array1<f64>>,
}

/// Training side: derive labels, select and fit the encoder.
///
/// Nothing is written to the artifact store here; the caller persists
/// `TrainingBatch::encoder` once everything downstream has succeeded.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    deriver: LabelDeriver,
    selector: FeatureSelector,
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Features, labels and a freshly fitted encoder for a raw training table
    pub fn engineer(&self, df: &DataFrame) -> Result<TrainingBatch> {
        if df.height() == 0 {
            return Err(FinHealthError::InvalidInput(
                "training table has no rows".to_string(),
            ));
        }

        let labels = self.deriver.derive(df)?;
        let selected = self.selector.select(df)?;
        let (encoder, features) = CategoricalEncoder::fit_transform(&selected, &CATEGORICAL_COLUMNS)?;

        let positives = labels.iter().filter(|&&l| l > 0.5).count();
        info!(
            rows = features.height(),
            features = features.width(),
            positives,
            "Engineered training batch"
        );

        Ok(TrainingBatch {
            features,
            labels,
            encoder,
        })
    }
}

/// Serving side: select, apply the persisted encoder, enforce the schema
#[derive(Clone)]
pub struct Server {
    store: Arc<dyn ArtifactStore>,
    selector: FeatureSelector,
}

impl Server {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            selector: FeatureSelector::new(),
        }
    }

    /// Encoded features for a raw batch (one or many records)
    pub fn engineer(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(self.prepare(df)?.features)
    }

    /// Like [`Server::engineer`], also reporting which encoder was used
    pub fn prepare(&self, df: &DataFrame) -> Result<ServingBatch> {
        let encoder = CategoricalEncoder::load(self.store.as_ref())?;
        let selected = self.selector.select(df)?;
        let encoded = encoder.transform(&selected)?;
        let features = align_to_schema(&encoded, &encoder)?;

        debug!(rows = features.height(), features = features.width(), "Engineered serving batch");
        Ok(ServingBatch {
            features,
            encoder_fingerprint: encoder.fingerprint()?,
        })
    }
}

/// Reorder `df` to the encoder's schema and cast each column to its
/// training dtype. A missing or extra column, or a column that cannot be cast,
/// is a `SchemaMismatch`.
fn align_to_schema(df: &DataFrame, encoder: &CategoricalEncoder) -> Result<DataFrame> {
    let expected = encoder.feature_columns();
    let actual = column_names(df);
    let missing = expected.iter().any(|c| !actual.contains(c));
    let extra = actual.iter().any(|c| !expected.contains(c));

    if missing || extra {
        return Err(FinHealthError::SchemaMismatch {
            expected: expected.to_vec(),
            actual,
        });
    }

    let columns = encoder
        .schema()
        .map(|(name, dtype)| -> Result<Column> {
            let column = df.column(name)?;
            if column.dtype() == dtype {
                return Ok(column.clone());
            }
            column.strict_cast(dtype).map_err(|_| FinHealthError::SchemaMismatch {
                expected: vec![format!("{}: {}", name, dtype)],
                actual: vec![format!("{}: {}", name, column.dtype())],
            })
        })
        .collect::<Result<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}

/// Run either side of the gateway over `df`.
///
/// The training side persists the fitted encoder after engineering succeeds.
pub fn engineer(store: Arc<dyn ArtifactStore>, df: &DataFrame, mode: Mode) -> Result<EngineeredBatch> {
    match mode {
        Mode::Training => {
            let batch = Trainer::new().engineer(df)?;
            batch.encoder.save(store.as_ref())?;
            Ok(EngineeredBatch {
                features: batch.features,
                labels: Some(batch.labels),
            })
        }
        Mode::Inference => Ok(EngineeredBatch {
            features: Server::new(store).engineer(df)?,
            labels: None,
        }),
    }
}
