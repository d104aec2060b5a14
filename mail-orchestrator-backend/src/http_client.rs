//! Generic HTTP client tools
//!
//! Sending, logging and body reading shared by every backend call. Envelope
//! interpretation stays in `client::http`.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::BackendError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP tool function set
pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns status code and response text.
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - any status the backend answered with,
    ///   except 502/503/504
    /// * `Err(BackendError::Timeout)` - the request timeout elapsed
    /// * `Err(BackendError::NetworkError)` - connection failure or gateway error
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        path: &str,
    ) -> Result<(u16, String), BackendError> {
        log::debug!("[backend] {method_name} {path}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                BackendError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[backend] Response Status: {status_code}");

        // 502/503/504: the backend itself is unreachable behind its proxy
        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[backend] Server error (HTTP {status_code}) on {method_name} {path}");
            return Err(BackendError::NetworkError {
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                BackendError::NetworkError {
                    detail: format!("Failed to read response body: {e}"),
                }
            }
        })?;

        log::debug!(
            "[backend] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Parse JSON response
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(BackendError::ParseError)` - parsing failed
    pub fn parse_json<T>(response_text: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[backend] JSON parse failed: {e}");
            log::error!("[backend] Raw response: {}", truncate_for_log(response_text));
            BackendError::ParseError {
                detail: e.to_string(),
            }
        })
    }
}
