//! Wire-level constants of the Omogen protocol

/// Status codes carried by both response encodings
pub const STATE_OK: &str = "10";
pub const STATE_AUTH_IMPOSSIBLE: &str = "21";
pub const STATE_AUTH_NEEDED: &str = "22";
pub const STATE_AUTH_REQUESTED: &str = "32";
pub const STATE_BAD_REQUEST: &str = "34";
pub const STATE_IMPOSSIBLE_ACTION: &str = "37";
pub const STATE_GENERAL_ERROR: &str = "39";

/// Session cookie carrying the authentication token
pub const SESSION_COOKIE: &str = "GBSESSIONID";

/// Default path segment between the service link and the format
pub const DEFAULT_API_PREFIX: &str = "guygle/";

/// Boolean literals used by the remote store
pub const BOOL_TRUE: &str = "Oui";
pub const BOOL_FALSE: &str = "Non";

/// Record field naming the remote type of a record
pub const DISCRIMINATOR_FIELD: &str = "classe";

/// Delimiter the remote store appends to identifiers in PDA responses
pub const ID_DELIMITER: &str = "[ ]";

/// Longest prefix accepted as an identifier when splitting on [`ID_DELIMITER`]
pub const MAX_ID_LENGTH: usize = 20;

/// Natural-language connector used by `where` clauses
pub const WHERE_CONNECTOR: &str = "dont le";
