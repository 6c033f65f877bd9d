//! Claimlens: insurance claims EDA library
//!
//! Loads a pipe-delimited claims dataset, computes descriptive statistics and
//! loss ratios, runs hypothesis tests across portfolio segments, preprocesses
//! for modelling, evaluates baseline models and renders charts.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;
pub mod viz;
