pub mod aggregator;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod render;
pub mod source;
pub mod stats;
pub mod utils;

pub use aggregator::{Aggregator, RunReport};
pub use render::{render, Layout};
pub use stats::Stats;
