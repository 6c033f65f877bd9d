//! Report module - run summary and JSON export

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
