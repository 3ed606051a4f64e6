//! The API client: one HTTP session against one Drove endpoint.
//!
//! A [`DroveClient`] only exists after [`DroveClient::start`] has configured
//! TLS and authentication and the liveness check has passed, so no request can
//! be issued against an unstarted session. Every call goes through the retry
//! layer in [`crate::resilience`], then through a status check and envelope
//! normalization. All failures surface as [`DroveError`].

pub mod envelope;

pub use envelope::ApiEnvelope;

use crate::constants;
use crate::error::DroveError;
use crate::logging;
use crate::resilience::{execute_with_retry, resilient_client_builder, RetryConfig, TimeoutConfig};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

/// Connectivity settings, fixed once the client is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub endpoint: String,
    pub auth_header: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl SessionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_header: None,
            insecure: false,
        }
    }

    #[must_use]
    pub fn with_auth_header(mut self, auth_header: impl Into<String>) -> Self {
        self.auth_header = Some(auth_header.into());
        self
    }

    #[must_use]
    pub const fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }
}

/// Transport tuning applied uniformly to every call of a client.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub retry: RetryConfig,
    pub timeout: TimeoutConfig,
}

#[derive(Debug)]
pub struct DroveClient {
    http: reqwest::Client,
    session: SessionConfig,
    options: ClientOptions,
    default_headers: HeaderMap,
}

fn install_crypto_provider() {
    #[cfg(not(windows))]
    let provider = rustls::crypto::ring::default_provider();
    #[cfg(windows)]
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    // Err only means a provider is already installed for this process
    let _ = provider.install_default();
}

impl DroveClient {
    /// Starts a session with the default retry and timeout settings.
    ///
    /// # Errors
    /// Fails when the HTTP session cannot be built or the liveness check does
    /// not answer `200` with a `SUCCESS` envelope.
    pub async fn start(session: SessionConfig) -> Result<Self, DroveError> {
        Self::start_with(session, ClientOptions::default()).await
    }

    /// Starts a session with explicit transport options.
    ///
    /// # Errors
    /// Same as [`DroveClient::start`].
    pub async fn start_with(
        session: SessionConfig,
        options: ClientOptions,
    ) -> Result<Self, DroveError> {
        let client = Self::build(session, options)?;
        client.get(constants::PATH_PING, 200).await?;
        debug!(
            target: "drove::client",
            endpoint = %client.session.endpoint,
            "connection validated"
        );
        Ok(client)
    }

    fn build(session: SessionConfig, options: ClientOptions) -> Result<Self, DroveError> {
        install_crypto_provider();

        let mut default_headers = HeaderMap::new();
        if let Some(auth_header) = session.auth_header.as_deref().filter(|v| !v.is_empty()) {
            let mut value = HeaderValue::from_str(auth_header)
                .map_err(|e| DroveError::transport(format!("Invalid authorization header: {e}")))?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }

        if session.insecure {
            warn!(
                target: "drove::client",
                endpoint = %session.endpoint,
                "TLS certificate verification is disabled"
            );
        }

        let http = resilient_client_builder(&options.timeout)
            .default_headers(default_headers.clone())
            .danger_accept_invalid_certs(session.insecure)
            .build()
            .map_err(|e| DroveError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            session,
            options,
            default_headers,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &SessionConfig {
        &self.session
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.session.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.session.endpoint.trim_end_matches('/'), path)
    }

    /// Issues the GET and reads the whole body, retrying transport failures.
    async fn fetch(&self, path: &str) -> Result<(u16, String), DroveError> {
        let url = self.url(path);
        let started = Instant::now();
        logging::log_request("GET", &url, Some(&self.default_headers));

        let (status, headers, text) =
            execute_with_retry(&self.options.retry, path, || {
                let request = self.http.get(&url);
                async move {
                    let response = request.send().await?;
                    let status = response.status().as_u16();
                    let headers = response.headers().clone();
                    let text = response.text().await?;
                    Ok::<_, reqwest::Error>((status, headers, text))
                }
            })
            .await
            .map_err(|e| self.connection_error(&e))?;

        logging::log_response(
            status,
            started.elapsed().as_millis(),
            Some(&headers),
            Some(&text),
            logging::get_max_body_len(),
        );
        Ok((status, text))
    }

    fn connection_error(&self, cause: &DroveError) -> DroveError {
        DroveError::transport(format!(
            "Error connecting to endpoint {}: {}",
            self.session.endpoint, cause.message
        ))
    }

    /// Fetches `path` and returns the `data` field of a `SUCCESS` envelope.
    ///
    /// # Errors
    /// - `Transport` (status `-1`) when no response could be obtained
    /// - `HttpStatusMismatch` when the status differs from `expected_status`
    /// - `MalformedBody` when the body is not an envelope
    /// - `LogicalFailure` when the envelope status is not `SUCCESS`
    pub async fn get(&self, path: &str, expected_status: u16) -> Result<Value, DroveError> {
        let (status, text) = self.fetch(path).await?;
        if status != expected_status {
            return Err(DroveError::status_mismatch(status, Some(text)));
        }
        ApiEnvelope::parse(status, &text)?.into_data(status, text)
    }

    /// Fetches `path` and returns the parsed body without enforcing `SUCCESS`.
    ///
    /// Used where the caller inspects status and message itself, or where the
    /// server answers with plain JSON instead of an envelope.
    ///
    /// # Errors
    /// Same as [`DroveClient::get`] except `LogicalFailure` is never raised.
    pub async fn get_raw(&self, path: &str, expected_status: u16) -> Result<Value, DroveError> {
        let (status, text) = self.fetch(path).await?;
        if status != expected_status {
            return Err(DroveError::status_mismatch(status, Some(text)));
        }
        serde_json::from_str(&text).map_err(|e| {
            DroveError::malformed(status, format!("Invalid response from Drove: {e}"), text)
        })
    }

    /// Streams the body of `path` into `filename` and returns the number of
    /// bytes written.
    ///
    /// The status is checked before the file is created. A failure while
    /// streaming leaves at most a truncated file and is reported as an error.
    ///
    /// # Errors
    /// `HttpStatusMismatch` for an unexpected status, `Transport` for
    /// connection, streaming or local I/O failures.
    pub async fn get_to_file(
        &self,
        path: &str,
        filename: impl AsRef<Path>,
        expected_status: u16,
    ) -> Result<u64, DroveError> {
        let filename = filename.as_ref();
        let url = self.url(path);
        let started = Instant::now();
        logging::log_request("GET", &url, Some(&self.default_headers));

        let mut response = execute_with_retry(&self.options.retry, path, || {
            self.http.get(&url).send()
        })
        .await
        .map_err(|e| self.connection_error(&e))?;

        let status = response.status().as_u16();
        logging::log_response(
            status,
            started.elapsed().as_millis(),
            Some(response.headers()),
            None,
            0,
        );
        if status != expected_status {
            return Err(DroveError::status_mismatch(status, None));
        }

        let file = tokio::fs::File::create(filename).await.map_err(|e| {
            DroveError::transport(format!("Unable to create {}: {e}", filename.display()))
        })?;
        let mut writer = BufWriter::with_capacity(constants::DOWNLOAD_CHUNK_SIZE, file);
        let mut size: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DroveError::transport(format!("Error reading response stream: {e}")))?
        {
            writer.write_all(&chunk).await.map_err(|e| {
                DroveError::transport(format!("Error writing {}: {e}", filename.display()))
            })?;
            size += chunk.len() as u64;
        }
        writer.flush().await.map_err(|e| {
            DroveError::transport(format!("Error writing {}: {e}", filename.display()))
        })?;

        info!(
            target: "drove::client",
            bytes = size,
            file = %filename.display(),
            "download complete"
        );
        Ok(size)
    }
}
