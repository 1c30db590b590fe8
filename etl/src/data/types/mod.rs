//! Shared data types for the storage layer
//!
//! Source rows describe what the extraction queries produce; warehouse rows
//! describe what the loaders write and the aggregation inputs read back.

mod source;
mod warehouse;

pub use source::{
    ClientRow, CourierRow, IncidentLogRow, IncidentRefRow, ServiceEventRow, ServiceStage, SiteRow,
    StatusRow,
};

pub use warehouse::{
    AccumulatedFactRow, DailyFactRow, DailyInputRow, DateDimRow, HourDimRow, HourlyFactRow,
    HourlyInputRow, IncidentFactRow,
};
