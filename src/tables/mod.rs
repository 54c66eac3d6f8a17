// src/tables/mod.rs
pub mod compress;
pub mod error;
pub mod header;
pub mod ids;
pub mod record;
pub mod sink;
pub mod writer;

pub use compress::{CompressOutcome, compress, min_width};
pub use error::{Result, TableError};
pub use header::{MAGIC, TableHeader};
pub use ids::{ElementWidth, TableId};
pub use record::{Half, TableData, TableRecord};
pub use sink::{MemorySink, Slot, TableSink};
pub use writer::{TableWriter, WriteSummary, write_tables};
