//! Dataset loading
//!
//! - [`DataLoader`] reads the raw financial table from disk
//! - [`iris`] bundles the toy Iris dataset

pub mod iris;
mod loader;

pub use iris::{load_iris, species_name, IRIS_FEATURES, IRIS_SPECIES};
pub use loader::DataLoader;
