//! Building blocks for custom rectification pipelines.
//!
//! Most users should prefer [`GeometryModel`](crate::GeometryModel) and
//! [`RectifyEngine`](crate::RectifyEngine). These expose the scan geometry,
//! the row kernel and the partition/progress pieces for callers that drive
//! their own threads.

pub use crate::engine::{
    partition_rows, remap_row, stretch_line, ProgressTracker, ProgressUpdate, RowPartition,
};
pub use crate::geometry::ScanGeometry;
