mod publish;
mod rank;

pub use rank::{RankArgs, process_account};
