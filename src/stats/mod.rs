mod account_stats;
mod aggregator;

pub use account_stats::AccountStats;
pub use aggregator::{Aggregator, ProgressObserver};
