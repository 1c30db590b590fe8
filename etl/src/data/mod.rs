//! Data access layer
//!
//! Everything that touches a database lives here:
//! - `postgres` - extraction from the operational database and loads into
//!   the warehouse
//! - `memory` - in-memory stand-ins for both sides, used by the tests
//! - `types` - typed rows crossing the source/transform/load boundaries
//! - `traits` - repository traits the pipeline is written against
//! - `error` - unified error type for both databases
//!
//! The transforms under `domain` never see a connection; they speak to the
//! traits only.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;
pub mod types;

// Re-export backend implementations
pub use memory::{MemorySource, MemoryWarehouse};
pub use postgres::source::PostgresSource;
pub use postgres::warehouse::PostgresWarehouse;

// Re-export unified error type
pub use error::DataError;

// Re-export repository traits
pub use traits::{SourceRepository, WarehouseRepository};
