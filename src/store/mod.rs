pub mod merge;
pub mod persistence;

pub use merge::MergeStore;
pub use persistence::{CsvPersistence, Persistence};
