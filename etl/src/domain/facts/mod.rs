//! Fact construction
//!
//! - `reshape` - event stream to one wide lifecycle row per service
//! - `intervals` - elapsed-time computation between milestones
//! - `resolve` - surrogate-key resolution for the accumulated fact
//! - `aggregate` - hourly/daily service-count grouping
//! - `incidents` - incident fact assembly

pub mod aggregate;
pub mod incidents;
pub mod intervals;
pub mod reshape;
pub mod resolve;

pub use reshape::{IncidentSummary, ServiceLifecycle, StageIntervals, StageStamp, reshape};
pub use resolve::{DimensionKeys, resolve_all};
