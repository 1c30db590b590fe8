//! Domain logic for the delivery warehouse
//!
//! - `dimensions` - generated and pass-through dimension builders
//! - `facts` - event reshaping, interval measurement, key resolution and
//!   aggregation
//! - `pipeline` - the full-rebuild run driver
//!
//! Everything here is pure over typed rows; database access stays behind
//! the repository traits in `data`.

pub mod dimensions;
pub mod facts;
pub mod pipeline;

pub use pipeline::{RunOptions, RunSummary, WarehousePipeline};
