//! Salesforce REST API client.
//!
//! Thin wrapper over reqwest for the three calls the reports need: SOQL
//! queries, event log file downloads, and batched user name resolution.
//! Credentials come from flags or the environment; there is no login flow,
//! the caller supplies an already-issued access token.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use thiserror::Error;

use crate::events::types::{QueryResponse, UserRow};
use crate::pipeline::aggregate::UserInfo;

/// API version used when neither `--api-version` nor `SF_API_VERSION` is set.
pub const DEFAULT_API_VERSION: &str = "60.0";

/// Check if TLS verification should be skipped based on environment or flag
pub fn should_skip_verify(insecure_flag: bool) -> bool {
    if insecure_flag {
        return true;
    }

    env::var("SF_SKIP_VERIFY")
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Error body returned by the Salesforce REST API on non-2xx responses.
///
/// The API answers with a JSON array of `{message, errorCode}` objects;
/// the first entry carries the useful diagnosis.
#[derive(Debug, Error)]
#[error("Salesforce API request failed with status {status}: [{error_code}] {message}")]
pub struct ApiError {
    pub status: u16,
    pub error_code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "errorCode")]
    error_code: String,
}

impl ApiError {
    fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Vec<ErrorBody>>(body) {
            Ok(errors) if !errors.is_empty() => Self {
                status,
                error_code: errors[0].error_code.clone(),
                message: errors[0].message.clone(),
            },
            _ => Self {
                status,
                error_code: "UNKNOWN".to_string(),
                message: body.trim().to_string(),
            },
        }
    }
}

/// Salesforce API client configuration
#[derive(Debug, Clone)]
pub struct SalesforceClient {
    instance_url: String,
    access_token: String,
    api_version: String,
    client: Client,
}

impl SalesforceClient {
    /// Create a new client from instance URL, access token, and API version
    pub fn new(instance_url: String, access_token: String, api_version: String) -> Result<Self> {
        Self::new_with_skip_verify(instance_url, access_token, api_version, false)
    }

    /// Create a new client with option to skip TLS verification
    pub fn new_with_skip_verify(
        instance_url: String,
        access_token: String,
        api_version: String,
        skip_verify: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(skip_verify)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            instance_url: instance_url.trim_end_matches('/').to_string(),
            access_token,
            api_version: api_version.trim_start_matches('v').to_string(),
            client,
        })
    }

    /// Create a client with optional parameters (for CLI)
    pub fn from_options(
        instance_url: Option<&str>,
        access_token: Option<&str>,
        api_version: Option<&str>,
        skip_verify: bool,
    ) -> Result<Self> {
        let instance_url = instance_url
            .map(|s| s.to_string())
            .or_else(|| env::var("SF_INSTANCE_URL").ok())
            .ok_or_else(|| {
                anyhow!(
                    "SF_INSTANCE_URL must be set. Provide the org URL via:\n\
                     - Command-line: --instance-url https://yourorg.my.salesforce.com\n\
                     - Environment variable: export SF_INSTANCE_URL=https://yourorg.my.salesforce.com"
                )
            })?;

        let access_token = if let Some(t) = access_token {
            t.to_string()
        } else if let Ok(t) = env::var("SF_ACCESS_TOKEN") {
            t
        } else if let Ok(token_file) = env::var("SF_ACCESS_TOKEN_FILE") {
            fs::read_to_string(&token_file)
                .with_context(|| format!("Failed to read access token from file: {}", token_file))?
                .trim()
                .to_string()
        } else {
            return Err(anyhow!(
                "SF_ACCESS_TOKEN or SF_ACCESS_TOKEN_FILE must be set. Provide a token via:\n\
                 - Command-line: --access-token 00Dxx...\n\
                 - Environment variable: export SF_ACCESS_TOKEN=00Dxx...\n\
                 - Token file: export SF_ACCESS_TOKEN_FILE=/path/to/token"
            ));
        };

        let api_version = api_version
            .map(|s| s.to_string())
            .or_else(|| env::var("SF_API_VERSION").ok())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Self::new_with_skip_verify(instance_url, access_token, api_version, skip_verify)
    }

    /// Run a SOQL query and deserialize the result records
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResponse<T>> {
        let url = format!(
            "{}/services/data/v{}/query",
            self.instance_url, self.api_version
        );

        let response = self
            .client
            .get(&url)
            .query(&[("q", soql)])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to send query to Salesforce")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body).into());
        }

        serde_json::from_str(&body).context("Failed to parse Salesforce query response")
    }

    /// Download the CSV body of one event log file
    pub async fn fetch_log_body(&self, log_file_id: &str) -> Result<String> {
        let url = format!(
            "{}/services/data/v{}/sobjects/EventLogFile/{}/LogFile",
            self.instance_url, self.api_version, log_file_id
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("Failed to download log file {}", log_file_id))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body).into());
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read log file body for {}", log_file_id))
    }

    /// Resolve user IDs to display names in one batched query.
    ///
    /// Every requested ID gets an entry; IDs the org does not know fall
    /// back to "Unknown" values. Log rows carry 15-character IDs while the
    /// API returns 18-character ones, so rows are matched on the 15-char
    /// prefix.
    pub async fn resolve_user_names(&self, ids: &[String]) -> Result<HashMap<String, UserInfo>> {
        let mut resolved: HashMap<String, UserInfo> = ids
            .iter()
            .map(|id| (id.clone(), UserInfo::default()))
            .collect();
        if resolved.is_empty() {
            return Ok(resolved);
        }

        let quoted: Vec<String> = resolved.keys().map(|id| soql_quote(id)).collect();
        let soql = format!(
            "SELECT Id, Name, Username FROM User WHERE Id IN ({})",
            quoted.join(", ")
        );

        let response: QueryResponse<UserRow> = self
            .query(&soql)
            .await
            .context("Failed to resolve user names")?;

        for user in response.records {
            let key = resolved
                .keys()
                .find(|id| short_id(id) == short_id(&user.id))
                .cloned();
            if let Some(key) = key {
                resolved.insert(
                    key,
                    UserInfo {
                        name: user.name,
                        username: user.username,
                    },
                );
            }
        }

        Ok(resolved)
    }

    /// Get the instance URL
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the API version in use
    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

/// Quote a value for use inside a SOQL string literal
pub fn soql_quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('\'');
    for c in raw.chars() {
        match c {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// The 15-character form of a Salesforce ID. 18-character IDs only append
/// a checksum suffix, so the prefix identifies the same row. Values that
/// are not well-formed IDs (the `--user` flag is free-form) pass through
/// whole rather than being cut inside a char.
pub fn short_id(id: &str) -> &str {
    id.get(..15).unwrap_or(id)
}
