//! Backend error code mapping

use crate::error::BackendError;
use crate::traits::{ErrorContext, ErrorMapper, RawApiError, ResourceKind};

use super::MailBackendClient;

impl MailBackendClient {
    /// Map a failed response, falling back to the HTTP status when the body has no code.
    pub(crate) fn map_failure(
        &self,
        status: u16,
        raw: RawApiError,
        context: &ErrorContext,
    ) -> BackendError {
        if raw.code.is_none() && status == 404 {
            return not_found(raw.message, context);
        }
        self.map_error(raw, context)
    }
}

/// Resource-specific not-found variant for a bare 404.
fn not_found(message: String, context: &ErrorContext) -> BackendError {
    let subject = context.subject_or_unknown();
    let raw_message = Some(message);
    match context.resource {
        ResourceKind::User => BackendError::UserNotFound {
            id: subject,
            raw_message,
        },
        ResourceKind::Address => BackendError::AddressNotFound {
            id: subject,
            raw_message,
        },
        ResourceKind::DomainAlias => BackendError::AliasNotFound {
            alias: subject,
            raw_message,
        },
        ResourceKind::Dkim => BackendError::DkimNotFound {
            domain: subject,
            raw_message,
        },
        ResourceKind::Other => BackendError::Unknown {
            raw_code: None,
            raw_message: raw_message.unwrap_or_default(),
        },
    }
}

impl ErrorMapper for MailBackendClient {
    fn map_error(&self, raw: RawApiError, context: &ErrorContext) -> BackendError {
        match raw.code.as_deref() {
            Some("UserNotFound") => BackendError::UserNotFound {
                id: context.subject_or_unknown(),
                raw_message: Some(raw.message),
            },

            // Forwarded and regular addresses share this code
            Some("AddressNotFound") => BackendError::AddressNotFound {
                id: context.subject_or_unknown(),
                raw_message: Some(raw.message),
            },

            Some("AddressExistsError" | "AddressExists") => BackendError::AddressExists {
                raw_message: Some(raw.message),
            },

            Some("AliasNotFound") => BackendError::AliasNotFound {
                alias: context.subject_or_unknown(),
                raw_message: Some(raw.message),
            },

            Some("AliasExists") => BackendError::AliasExists {
                alias: context.subject_or_unknown(),
                raw_message: Some(raw.message),
            },

            Some("DkimNotFound") => BackendError::DkimNotFound {
                domain: context.subject_or_unknown(),
                raw_message: Some(raw.message),
            },

            Some("ChangeNotAllowed") => BackendError::ChangeNotAllowed {
                raw_message: Some(raw.message),
            },

            // Other error fallback
            _ => self.unknown_error(raw),
        }
    }
}
