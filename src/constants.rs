//! Centralized string constants for the Drove CLI
//!
//! This module contains commonly used string literals to:
//! - Reduce string duplication
//! - Keep the cluster API paths in one place

// HTTP Headers
pub const HEADER_AUTHORIZATION_LC: &str = "authorization";

// Response envelope
pub const STATUS_SUCCESS: &str = "SUCCESS";

// Cluster API paths
pub const PATH_PING: &str = "/apis/v1/ping";
pub const PATH_CLUSTER: &str = "/apis/v1/cluster";
pub const PATH_APPLICATIONS: &str = "/apis/v1/applications";
pub const PATH_LOGFILES: &str = "/apis/v1/logfiles";

// Log file kinds, as used in the logfiles API paths
pub const LOG_KIND_APPLICATIONS: &str = "applications";

// Configuration
pub const CONFIG_SECTION: &str = "drove";
pub const DEFAULT_CONFIG_FILE: &str = ".drove";
pub const DEFAULT_TAIL_FILE: &str = "output.log";

// Environment variables
pub const ENV_DROVE_CONFIG: &str = "DROVE_CONFIG";
pub const ENV_DROVE_LOG: &str = "DROVE_LOG";
pub const ENV_DROVE_LOG_FORMAT: &str = "DROVE_LOG_FORMAT";
pub const ENV_DROVE_LOG_FILE: &str = "DROVE_LOG_FILE";
pub const ENV_DROVE_LOG_MAX_BODY: &str = "DROVE_LOG_MAX_BODY";

// Streaming
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;
pub const TAIL_INITIAL_BYTES: u64 = 4096;
pub const TAIL_READ_LENGTH: u64 = 32 * 1024;
pub const TAIL_POLL_INTERVAL_MS: u64 = 1000;

// Exit codes
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_INTERRUPTED: i32 = 130;

// Error hints
pub const ERR_CONNECTION: &str = "Check that the Drove endpoint is correct and reachable.";
pub const ERR_NO_ENDPOINT: &str =
    "provide config file or required command line params for drove connectivity";
