//! HTTP Response Utilities
//!
//! Helper functions for processing HTTP responses from API providers.

use reqwest::Response;
use zonewatch_domain::error::{Error, Result};

/// Utilities for processing HTTP responses
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Check response status and parse JSON
    ///
    /// # Arguments
    /// * `response` - The HTTP response to check
    /// * `provider_id` - Provider identifier for error messages
    ///
    /// # Returns
    /// Parsed JSON value on success. 401/403 become authentication errors,
    /// every other non-success status a provider error.
    pub async fn check_and_parse(response: Response, provider_id: &str) -> Result<serde_json::Value> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let code = status.as_u16();

            return Err(match code {
                401 | 403 => Error::authentication(format!(
                    "{provider_id} rejected credentials ({code}): {error_text}"
                )),
                429 => Error::provider(provider_id, format!("rate limit exceeded: {error_text}")),
                500..=599 => {
                    Error::provider(provider_id, format!("server error ({code}): {error_text}"))
                }
                _ => Error::provider(provider_id, format!("request failed ({code}): {error_text}")),
            });
        }

        response.json().await.map_err(|e| {
            Error::provider_with_source(provider_id, "response parse failed", e)
        })
    }

    /// Map a transport error
    pub fn transport_error(provider_id: &str, e: reqwest::Error) -> Error {
        if e.is_connect() {
            Error::provider_with_source(provider_id, "connection failed", e)
        } else {
            Error::provider_with_source(provider_id, format!("HTTP request failed: {e}"), e)
        }
    }
}
