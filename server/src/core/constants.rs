// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Datapage";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "datapage";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "DATAPAGE_CONFIG";

/// Environment variable for server host
pub const ENV_HOST: &str = "DATAPAGE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "DATAPAGE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "DATAPAGE_LOG";

/// Environment variable for the DuckDB database file
pub const ENV_DATABASE: &str = "DATAPAGE_DATABASE";

/// Environment variable for the page catalog file
pub const ENV_PAGES: &str = "DATAPAGE_PAGES";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5880;

// =============================================================================
// Query Limits
// =============================================================================

/// Per-query timeout for DuckDB work
pub const DUCKDB_QUERY_TIMEOUT_SECS: u64 = 30;

/// Largest page size a request may ask for
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Page size used when a request does not name one
pub const DEFAULT_PAGE_SIZE: u32 = 50;

// =============================================================================
// Filter Option Discovery
// =============================================================================

/// Distinct-value ceiling below which a text column is browsed as a list
pub const FILTER_LIST_MAX_OPTIONS: u64 = 20;

/// Number of most frequent values suggested for free-text columns
pub const FILTER_TOP_VALUES: u64 = 10;
