//! CLI module

mod args;

pub use args::*;
