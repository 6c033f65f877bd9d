//! Pipeline module - loading, EDA, hypothesis testing, preprocessing, modeling

pub mod eda;
pub mod hypothesis;
pub mod loader;
pub mod model;
pub mod preprocess;
pub mod schema;
pub mod stats;

pub use eda::*;
pub use hypothesis::*;
pub use loader::*;
pub use model::*;
pub use preprocess::*;
pub use schema::*;
pub use stats::*;
