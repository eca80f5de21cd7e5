pub mod record;
pub mod news;
pub mod price;

pub use record::{DedupKey, RawRecord, Row, StoreRecord, WorkUnit};
pub use news::NewsRecord;
pub use price::{PriceRecord, PriceStatus};
