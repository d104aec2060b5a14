//! Backend HTTP request methods

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ErrorMapper, RawApiError};
use crate::types::{BackendEnvelope, CursorPage};

use super::{ACCESS_TOKEN_HEADER, MailBackendClient, PAGE_LIMIT};

/// Safety net against a backend that keeps handing out cursors.
const MAX_PAGES: usize = 1_000;

impl MailBackendClient {
    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
    }

    /// Send a request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &Method,
        path: &str,
        context: &ErrorContext,
    ) -> Result<T> {
        let (status, text) = HttpUtils::execute_request(request, method.as_str(), path).await?;

        let envelope: BackendEnvelope<T> = match HttpUtils::parse_json(&text) {
            Ok(envelope) => envelope,
            // Some proxies answer 404 with an HTML page
            Err(_) if status == 404 => {
                return Err(self.map_failure(status, RawApiError::new("HTTP 404"), context));
            }
            Err(e) => return Err(e),
        };

        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| format!("HTTP {status}"));
            let raw = match envelope.code {
                Some(code) => RawApiError::with_code(code, message),
                None => RawApiError::new(message),
            };
            let err = self.map_failure(status, raw, context);
            if err.is_expected() {
                log::debug!("[backend] {method} {path}: {err}");
            } else {
                log::error!("[backend] {method} {path}: {err}");
            }
            return Err(err);
        }

        envelope
            .data
            .ok_or_else(|| self.parse_error("response is missing the data field"))
    }

    /// Execute a GET request
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &ErrorContext,
    ) -> Result<T> {
        let request = self.builder(Method::GET, path).query(query);
        self.send(request, &Method::GET, path, context).await
    }

    /// Execute a POST request
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: &ErrorContext,
    ) -> Result<T> {
        let request = self.builder(Method::POST, path).json(body);
        self.send(request, &Method::POST, path, context).await
    }

    /// Execute a DELETE request
    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &ErrorContext,
    ) -> Result<T> {
        let request = self.builder(Method::DELETE, path);
        self.send(request, &Method::DELETE, path, context).await
    }

    /// Execute a paged GET, following `nextCursor` to the last page
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &ErrorContext,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut page_query = query.to_vec();
            page_query.push(("limit", PAGE_LIMIT.to_string()));
            if let Some(ref next) = cursor {
                page_query.push(("next", next.clone()));
            }

            let page: CursorPage<T> = self.get(path, &page_query, context).await?;
            let next = page.next();
            items.extend(page.results);

            match next {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => return Ok(items),
            }
        }

        log::warn!("[backend] GET {path}: stopped after {MAX_PAGES} pages");
        Ok(items)
    }
}
