//! Chart rendering - PNG output via plotters

pub mod charts;
pub mod style;

pub use charts::*;
pub use style::*;
