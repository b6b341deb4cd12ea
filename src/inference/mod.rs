//! Inference module
//!
//! Turns raw request payloads into predictions through the serving side of
//! the feature gateway and the persisted models.

mod predictor;
mod request;

pub use predictor::Predictor;
pub use request::{
    requests_to_dataframe, FinancialRequest, FinancialResponse, IrisRequest, IrisResponse,
};
