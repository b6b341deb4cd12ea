//! Model training module
//!
//! - [`DecisionTree`] - CART classifier used for the Iris task
//! - [`GradientBoostedTrees`] - second-order boosting for the financial task
//! - [`ModelArtifact`] - persisted model with its feature schema and encoder link
//! - [`train_test_split`] and [`ClassificationReport`] for held-out evaluation
//! - [`TrainEngine`] - end-to-end training and evaluation

mod boosting;
mod engine;
mod metrics;
mod model;
mod split;
pub mod decision_tree;

pub use boosting::{GradientBoostedTrees, GradientBoostingConfig};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use engine::{TrainEngine, TrainingSummary};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use model::{Classifier, ModelArtifact, TrainedModel};
pub use split::{train_test_split, TrainTestSplit};
