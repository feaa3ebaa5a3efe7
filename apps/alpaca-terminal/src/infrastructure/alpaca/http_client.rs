//! HTTP client wrapper for Alpaca REST APIs.
//!
//! One request per call; failures are categorized but never retried here.

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::error::AlpacaError;
use crate::infrastructure::config::{AlpacaSettings, Credentials};

/// Wait suggested for a 429 without a usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// HTTP client for the Alpaca trading and market data APIs.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    credentials: Option<Credentials>,
    trading_base_url: String,
    data_base_url: String,
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from settings.
    ///
    /// Credentials are optional; requests go out unauthenticated without them.
    pub fn new(settings: &AlpacaSettings) -> Result<Self, AlpacaError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("alpaca-terminal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AlpacaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            credentials: settings.credentials.clone(),
            trading_base_url: settings.trading_url.clone(),
            data_base_url: settings.data_url.clone(),
        })
    }

    /// GET a path on the trading API.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AlpacaError> {
        self.request(&self.trading_base_url, segments, &[]).await
    }

    /// GET a path on the market data API.
    pub async fn data_get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, AlpacaError> {
        self.request(&self.data_base_url, segments, query).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        base_url: &str,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, AlpacaError> {
        let url = endpoint(base_url, segments)?;
        let path = url.path().to_string();

        let mut request = self.client.get(url).query(query);
        if let Some(credentials) = &self.credentials {
            request = request
                .header("APCA-API-KEY-ID", credentials.api_key())
                .header("APCA-API-SECRET-KEY", credentials.api_secret());
        }

        tracing::debug!(path = %path, "Sending Alpaca request");
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            return Ok(serde_json::from_str(&text)?);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response.text().await.unwrap_or_default();
        let err = classify(status, &path, retry_after, &body);
        tracing::debug!(status = status.as_u16(), path = %path, error = %err, "Alpaca request failed");
        Err(err)
    }
}

/// Join path segments onto a base URL, percent-encoding each segment.
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, AlpacaError> {
    let mut url =
        Url::parse(base_url).map_err(|e| AlpacaError::InvalidUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| AlpacaError::InvalidUrl(format!("{base_url}: cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Error category for an unsuccessful status.
#[derive(Debug, PartialEq, Eq)]
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500..=599 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Turn an unsuccessful response into an [`AlpacaError`].
fn classify(status: StatusCode, path: &str, retry_after: Option<u64>, body: &str) -> AlpacaError {
    let (code, message) = match serde_json::from_str::<AlpacaErrorResponse>(body) {
        Ok(err) => (
            err.code_text().unwrap_or_else(|| status.as_u16().to_string()),
            err.message,
        ),
        Err(_) => (status.as_u16().to_string(), body.trim().to_string()),
    };

    match categorize_status(status) {
        ErrorCategory::RateLimited => AlpacaError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        ErrorCategory::Retryable => AlpacaError::Server {
            status: status.as_u16(),
            message,
        },
        ErrorCategory::NonRetryable => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AlpacaError::AuthenticationFailed,
            StatusCode::NOT_FOUND => AlpacaError::NotFound {
                path: path.to_string(),
            },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
                if message.to_lowercase().contains("invalid symbol") =>
            {
                AlpacaError::InvalidSymbol(message)
            }
            _ => AlpacaError::Api { code, message },
        },
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(429, ErrorCategory::RateLimited ; "too many requests")]
    #[test_case(408, ErrorCategory::Retryable ; "request timeout")]
    #[test_case(500, ErrorCategory::Retryable ; "internal error")]
    #[test_case(502, ErrorCategory::Retryable ; "bad gateway")]
    #[test_case(503, ErrorCategory::Retryable ; "unavailable")]
    #[test_case(400, ErrorCategory::NonRetryable ; "bad request")]
    #[test_case(401, ErrorCategory::NonRetryable ; "unauthorized")]
    #[test_case(404, ErrorCategory::NonRetryable ; "not found")]
    fn status_categories(status: u16, expected: ErrorCategory) {
        assert_eq!(categorize_status(StatusCode::from_u16(status).unwrap()), expected);
    }

    #[test]
    fn not_found_keeps_path() {
        let err = classify(StatusCode::NOT_FOUND, "/v2/stocks/ZZZZ/quotes/latest", None, r#"{"message":"Not Found"}"#);
        assert_eq!(
            err,
            AlpacaError::NotFound {
                path: "/v2/stocks/ZZZZ/quotes/latest".to_string()
            }
        );
    }

    #[test]
    fn invalid_symbol_body() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            "/v2/stocks/1%24/quotes/latest",
            None,
            r#"{"code":40010001,"message":"invalid symbol: 1$"}"#,
        );
        assert_eq!(err, AlpacaError::InvalidSymbol("invalid symbol: 1$".to_string()));
    }

    #[test]
    fn other_bad_request_is_api_error() {
        let err = classify(StatusCode::BAD_REQUEST, "/x", None, r#"{"code":42210000,"message":"invalid feed"}"#);
        assert_eq!(
            err,
            AlpacaError::Api {
                code: "42210000".to_string(),
                message: "invalid feed".to_string()
            }
        );
    }

    #[test]
    fn rate_limit_honours_retry_after() {
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, "/x", Some(7), ""),
            AlpacaError::RateLimited { retry_after_secs: 7 }
        );
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, "/x", None, ""),
            AlpacaError::RateLimited {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS
            }
        );
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let err = classify(StatusCode::BAD_GATEWAY, "/x", None, "upstream connect error\n");
        assert_eq!(
            err,
            AlpacaError::Server {
                status: 502,
                message: "upstream connect error".to_string()
            }
        );
    }

    #[test]
    fn auth_statuses() {
        assert_eq!(classify(StatusCode::UNAUTHORIZED, "/x", None, ""), AlpacaError::AuthenticationFailed);
        assert_eq!(classify(StatusCode::FORBIDDEN, "/x", None, ""), AlpacaError::AuthenticationFailed);
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = endpoint("https://data.alpaca.markets", &["v2", "stocks", "BRK.B", "quotes", "latest"]).unwrap();
        assert_eq!(url.as_str(), "https://data.alpaca.markets/v2/stocks/BRK.B/quotes/latest");

        let url = endpoint("http://127.0.0.1:8080/", &["v2", "assets", "BTC/USD"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v2/assets/BTC%2FUSD");
    }

    #[test]
    fn endpoint_rejects_garbage_base() {
        assert!(matches!(endpoint("not a url", &["v2"]), Err(AlpacaError::InvalidUrl(_))));
    }
}
