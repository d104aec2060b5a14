use serde::{Deserialize, Serialize};

/// Unified error type for all mail backend operations.
///
/// Every variant carries enough context to produce a useful log line; the
/// raw backend message is kept where the backend supplied one. All variants are
/// serializable for structured error reporting.
///
/// # Transport Errors
///
/// The following variants mean the backend could not be reached or answered
/// with something unreadable. Callers treat them as infrastructure failures:
/// - [`NetworkError`](Self::NetworkError): connection failure or 5xx gateway error
/// - [`Timeout`](Self::Timeout): the fixed request timeout elapsed
/// - [`ParseError`](Self::ParseError): unexpected response shape
///
/// No retries happen at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum BackendError {
    /// A network-level error occurred (connection refused, DNS failure, 502-504).
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The addressed user (mail account) does not exist.
    UserNotFound {
        /// Identifier that was looked up.
        id: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The addressed address or forwarder does not exist.
    AddressNotFound {
        /// Identifier that was looked up.
        id: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// An address with the same name already exists.
    AddressExists {
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The domain alias does not exist.
    AliasNotFound {
        /// Alias name or id that was looked up.
        alias: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The domain alias is already registered.
    AliasExists {
        /// Alias that was being created.
        alias: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// No DKIM key is stored for the domain.
    DkimNotFound {
        /// Domain name or key id that was looked up.
        domain: String,
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// The backend refused the change.
    ChangeNotAllowed {
        /// Original error message from the backend, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the backend's response.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// An unrecognized error from the backend.
    ///
    /// Catch-all for codes that are not mapped to a specific variant.
    Unknown {
        /// Raw error code from the backend, if available.
        raw_code: Option<String>,
        /// Raw error message from the backend.
        raw_message: String,
    },
}

impl BackendError {
    /// Whether the backend reported that the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::AddressNotFound { .. }
                | Self::AliasNotFound { .. }
                | Self::DkimNotFound { .. }
        )
    }

    /// Whether the backend could not be reached or answered unreadably.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::ParseError { .. }
        )
    }

    /// Whether this is an expected outcome (missing resource, conflict), used for log levels.
    ///
    /// `true` logs at `warn`, `false` at `error`.
    /// **Update this method when adding a variant.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::AddressNotFound { .. }
                | Self::AddressExists { .. }
                | Self::AliasNotFound { .. }
                | Self::AliasExists { .. }
                | Self::DkimNotFound { .. }
                | Self::ChangeNotAllowed { .. }
        )
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { detail } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail } => write!(f, "Request timeout: {detail}"),
            Self::UserNotFound { id, .. } => write!(f, "User '{id}' not found"),
            Self::AddressNotFound { id, .. } => write!(f, "Address '{id}' not found"),
            Self::AddressExists { raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "Address already exists: {msg}")
                } else {
                    write!(f, "Address already exists")
                }
            }
            Self::AliasNotFound { alias, .. } => write!(f, "Domain alias '{alias}' not found"),
            Self::AliasExists { alias, .. } => write!(f, "Domain alias '{alias}' already exists"),
            Self::DkimNotFound { domain, .. } => write!(f, "DKIM key for '{domain}' not found"),
            Self::ChangeNotAllowed { raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "Change not allowed: {msg}")
                } else {
                    write!(f, "Change not allowed")
                }
            }
            Self::ParseError { detail } => write!(f, "Parse error: {detail}"),
            Self::Unknown {
                raw_code,
                raw_message,
            } => match raw_code {
                Some(code) => write!(f, "{raw_message} ({code})"),
                None => write!(f, "{raw_message}"),
            },
        }
    }
}

impl std::error::Error for BackendError {}

/// Convenience type alias for `Result<T, BackendError>`.
pub type Result<T> = std::result::Result<T, BackendError>;
