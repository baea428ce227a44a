//! Application-wide constants and configuration values.
//!
//! This module defines the static values used throughout emplocli, including
//! the remote protocol identifiers, file paths, timeouts, and CLI messages.

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Path Configuration ===

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Legacy configuration file, relative to the home directory.
pub const LEGACY_CONFIG_FILE_NAME: &str = ".emplocli.toml";
/// Name of the logs subdirectory.
pub const LOGS_DIR_NAME: &str = "logs";
/// Prefix of the daily log files.
pub const LOG_FILE_PREFIX: &str = "emplocli.log";

// === Remote Protocol ===

/// Authentication endpoint, relative to the backend address.
pub const RPC_COMMON_PATH: &str = "/xmlrpc/2/common";
/// Object operations endpoint, relative to the backend address.
pub const RPC_OBJECT_PATH: &str = "/xmlrpc/2/object";

pub const METHOD_AUTHENTICATE: &str = "authenticate";
pub const METHOD_EXECUTE_KW: &str = "execute_kw";
pub const METHOD_SEARCH_READ: &str = "search_read";
pub const METHOD_ATTENDANCE_MANUAL: &str = "attendance_manual";
pub const METHOD_WRITE: &str = "write";

pub const MODEL_EMPLOYEE: &str = "hr.employee";
pub const MODEL_ATTENDANCE: &str = "hr.attendance";
pub const MODEL_ATTENDANCE_REASON: &str = "hr.attendance.reason";

pub const FIELD_ATTENDANCE_STATE: &str = "attendance_state";
pub const FIELD_ATTENDANCE_REASONS: &str = "attendance_reason_ids";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_NAME: &str = "name";

/// Timestamp format used by the backend for datetime fields (UTC).
pub const BACKEND_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timeout for XML-RPC calls in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// === Config Template ===

/// Placeholder address written into a freshly bootstrapped config file.
pub const TEMPLATE_URL: &str = "https://odoo.example.com";

/// Contents of a freshly bootstrapped config file.
pub const CONFIG_TEMPLATE: &str = r#"# emplocli configuration
#
# Address of the Odoo instance, without a trailing slash.
url = "https://odoo.example.com"
# Database name on that instance.
db = "odoo"
# Login and password of the employee's user.
username = "user@example.com"
password = "changeme"
# Optional: request timeout in seconds.
# timeout_secs = 30
"#;

// === Messages: CLI Output ===

pub const CLI_MSG_CONFIG_CREATED: &str = "Created a configuration template at: ";
pub const CLI_MSG_CONFIG_EDIT: &str = "   Fill in your Odoo address and credentials, then run the command again.";
pub const CLI_MSG_CONFIG_TEMPLATE: &str = "The configuration still holds the template address: ";
pub const CLI_MSG_LOGIN_FAILED: &str = "Login failed.";
pub const CLI_MSG_ALREADY_IN: &str = "User already checked in, skipping...";
pub const CLI_MSG_ALREADY_OUT: &str = "User not checked in, skipping...";
pub const CLI_MSG_REASONS_HEADER: &str = "Available reason IDs:";
pub const CLI_MSG_NO_REASONS: &str = "No attendance reasons defined.";
pub const CLI_MSG_REASON_SET: &str = "Attendance reason set.";
pub const CLI_MSG_REASON_NOT_SET: &str = "Couldn't set attendance reason.";
pub const CLI_MSG_REASON_HINT: &str = "   Run 'emplocli list-reasons' to see the available IDs.";
pub const CLI_MSG_ERROR: &str = "Error: ";

// === Error Messages ===

pub const ERR_HTTP_CLIENT_BUILD_FAILED: &str = "Failed to build HTTP client";
pub const ERR_NETWORK_REQUEST_FAILED: &str = "Network request failed";
pub const ERR_SERVER_ERROR: &str = "Server returned error: ";
pub const ERR_NO_CONFIG_DIR: &str = "Could not determine the user configuration directory";
