// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Bodega";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "bodega";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "bodega.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "BODEGA_CONFIG";

// =============================================================================
// Environment Variables - Databases
// =============================================================================

/// Environment variable for the operational (source) database URL
pub const ENV_SOURCE_URL: &str = "BODEGA_SOURCE_URL";

/// Environment variable for the warehouse database URL
pub const ENV_WAREHOUSE_URL: &str = "BODEGA_WAREHOUSE_URL";

// =============================================================================
// Environment Variables - Run
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "BODEGA_LOG";

/// Environment variable for the first day of the date dimension
pub const ENV_HORIZON_START: &str = "BODEGA_HORIZON_START";

/// Environment variable for the last day of the date dimension
pub const ENV_HORIZON_END: &str = "BODEGA_HORIZON_END";

// =============================================================================
// Date Horizon Defaults
// =============================================================================

/// Default first day covered by dim_fecha
pub const DEFAULT_HORIZON_START: &str = "2023-01-01";

/// Default last day covered by dim_fecha (inclusive)
pub const DEFAULT_HORIZON_END: &str = "2024-12-31";

// =============================================================================
// Warehouse Tables
// =============================================================================

/// Dimension tables that must all exist before any fact loading starts
pub const REQUIRED_DIMENSION_TABLES: &[&str] = &[
    "dim_fecha",
    "dim_hora",
    "dim_cliente",
    "dim_mensajero",
    "dim_sede",
    "dim_novedad",
    "dim_estado",
];

// =============================================================================
// PostgreSQL Database
// =============================================================================

/// PostgreSQL default max connections (sequential batch loader, one statement at a time)
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// PostgreSQL default min connections (runs are short-lived, no warm pool needed)
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// PostgreSQL default connection acquire timeout in seconds
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL idle connection timeout in seconds (release unused connections)
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// PostgreSQL max connection lifetime in seconds (cycle connections to prevent stale state)
pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// PostgreSQL statement timeout in seconds (full-table rebuilds run long, 0 = disabled)
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 300;
