pub mod column;
pub mod dataset;
pub mod describe;
pub mod stats;
pub mod store;

pub use column::{Column, ColumnData, ColumnKind};
pub use dataset::Dataset;
pub use describe::{ColumnInfo, DatasetInfo, NumericSummary};
pub use store::{load_csv, DataStore};
