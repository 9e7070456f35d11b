//! Configuration for the Google backend.

use std::env;
use std::time::Duration;

use sheet_core::StoreError;

/// Default Sheets API base URL.
pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com";

/// Default Drive API base URL.
pub const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com";

/// Configuration for connecting to Google Sheets and Drive.
#[derive(Clone)]
pub struct GoogleConfig {
    /// Sheets API base URL.
    pub sheets_url: String,
    /// Drive API base URL.
    pub drive_url: String,
    /// OAuth bearer token.
    pub access_token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("sheets_url", &self.sheets_url)
            .field("drive_url", &self.drive_url)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GoogleConfig {
    /// Create a configuration with default endpoints.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            sheets_url: DEFAULT_SHEETS_URL.to_string(),
            drive_url: DEFAULT_DRIVE_URL.to_string(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GOOGLE_ACCESS_TOKEN` - OAuth bearer token with Sheets and Drive scopes
    ///
    /// Optional environment variables:
    /// - `GOOGLE_SHEETS_API_URL` - Sheets base URL (default: https://sheets.googleapis.com)
    /// - `GOOGLE_DRIVE_API_URL` - Drive base URL (default: https://www.googleapis.com)
    pub fn from_env() -> Result<Self, StoreError> {
        let access_token = env::var("GOOGLE_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                StoreError::Config(
                    "GOOGLE_ACCESS_TOKEN is not set; export a token with the spreadsheets and drive scopes"
                        .to_string(),
                )
            })?;

        let mut config = Self::new(access_token);
        if let Ok(url) = env::var("GOOGLE_SHEETS_API_URL") {
            config.sheets_url = url;
        }
        if let Ok(url) = env::var("GOOGLE_DRIVE_API_URL") {
            config.drive_url = url;
        }
        Ok(config)
    }

    /// Spreadsheet resource URL.
    pub fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}",
            self.sheets_url.trim_end_matches('/'),
            urlencoding::encode(spreadsheet_id)
        )
    }

    /// Values resource URL for an A1 range.
    pub fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    /// Drive files collection URL.
    pub fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.drive_url.trim_end_matches('/'))
    }
}
