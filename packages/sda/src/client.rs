//! `reqwest`-backed [`SoilDataAccess`] implementation.

use std::time::Duration;

use dirtio_soil_models::{CandidateRow, QueryPoint, SoilKey};

use crate::{SdaError, SoilDataAccess, query, table};

/// Default SDA tabular POST endpoint.
pub const DEFAULT_URL: &str = "https://sdmdataaccess.nrcs.usda.gov/Tabular/post.rest";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Maximum length of the response body included in errors and logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Connection settings for [`SdaClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdaConfig {
    /// Tabular POST endpoint URL.
    pub url: String,
    /// Timeout for the whole request, including reading the body.
    pub timeout: Duration,
}

impl Default for SdaConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SdaConfig {
    /// Reads `SDA_URL` and `SDA_TIMEOUT_SECS`, falling back to the
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`SdaError::Config`] if `SDA_TIMEOUT_SECS` is set but is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, SdaError> {
        Self::from_vars(
            std::env::var("SDA_URL").ok(),
            std::env::var("SDA_TIMEOUT_SECS").ok(),
        )
    }

    fn from_vars(url: Option<String>, timeout_secs: Option<String>) -> Result<Self, SdaError> {
        let mut config = Self::default();

        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            config.url = url;
        }

        if let Some(raw) = timeout_secs {
            let secs: u64 = raw.trim().parse().map_err(|_| SdaError::Config {
                message: format!("SDA_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"),
            })?;
            if secs == 0 {
                return Err(SdaError::Config {
                    message: "SDA_TIMEOUT_SECS must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Soil Data Access client.
///
/// Issues exactly one POST per call and never retries; a timeout or any
/// other failure is returned to the caller.
pub struct SdaClient {
    client: reqwest::Client,
    config: SdaConfig,
}

impl SdaClient {
    /// Creates a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`SdaError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SdaConfig) -> Result<Self, SdaError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &SdaConfig {
        &self.config
    }

    /// Posts a SQL statement and returns the decoded JSON body.
    ///
    /// The statement is sent as given; the builders in [`query`] already
    /// emit single-line SQL.
    ///
    /// # Errors
    ///
    /// Returns [`SdaError`] on transport failure, a non-2xx status, or a
    /// body that is not valid JSON.
    pub async fn post_query(&self, sql: &str) -> Result<serde_json::Value, SdaError> {
        log::debug!("SDA query: {sql}");

        let response = self
            .client
            .post(&self.config.url)
            .form(&[("query", sql), ("format", "JSON")])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::error!("SDA returned HTTP {status}: {}", preview(&text));
            return Err(SdaError::Status {
                status: status.as_u16(),
                body: preview(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "SDA response is not valid JSON\n  \
                 received: {} bytes\n  \
                 parse error: {e}\n  \
                 body preview: {}",
                text.len(),
                preview(&text),
            );
            SdaError::Decode {
                message: format!("{e} (received {} bytes)", text.len()),
            }
        })
    }
}

#[async_trait::async_trait]
impl SoilDataAccess for SdaClient {
    async fn map_unit_polygons(
        &self,
        point: &QueryPoint,
    ) -> Result<Vec<CandidateRow>, SdaError> {
        let body = self.post_query(&query::map_unit_polygons(point)).await?;
        let rows = table::candidate_rows(&body)?;
        log::info!("SDA returned {} map unit polygons for {point}", rows.len());
        Ok(rows)
    }

    async fn map_unit_keys(&self, point: &QueryPoint) -> Result<Vec<SoilKey>, SdaError> {
        let body = self.post_query(&query::map_unit_keys(point)).await?;
        let keys = table::key_rows(&body)?;
        log::info!("SDA returned {} map unit keys for {point}", keys.len());
        Ok(keys)
    }
}

fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
