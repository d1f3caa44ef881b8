pub mod error;
pub mod lifecycle;
pub mod normalize;
pub mod range;
pub mod snapshot;

pub use error::SheetError;
pub use lifecycle::{DataStatistics, FetchLifecycleTracker, SheetConfig};
pub use normalize::{to_list, to_pair_list, BatchValues, RawCell, RawGrid, RawRow};
pub use range::{col_to_label, partition_layout, Partition, RangeRole, RangeSpec, SheetRegion};
pub use snapshot::{FetchMetadata, FetchResult, Snapshot};
