use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Where the sheet lives and how long a loaded copy stays fresh.
///
/// Every field has a default; a config file only needs the ones it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spreadsheet id (the long token in the sheet URL).
    pub sheet_id: String,
    /// Tab to export.
    pub sheet_name: String,
    /// Host and path prefix in front of the sheet id.
    pub host: String,
    pub cache_ttl_seconds: u64,
    pub request_timeout_seconds: u64,
    /// Read this CSV file instead of the sheet.
    pub csv_path: Option<PathBuf>,
    /// Show the underlying error under the generic load-failure message.
    pub show_error_details: bool,
    /// Window and page title.
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sheet_id: "1ED2BAyqD5nyS6M-i6z7o2GoNA6cacsgh0Eua8gIwq4g".into(),
            sheet_name: "crcl_rating".into(),
            host: "docs.google.com/spreadsheets/d".into(),
            cache_ttl_seconds: 60,
            request_timeout_seconds: 10,
            csv_path: None,
            show_error_details: false,
            title: "Analyst Board – Price Targets".into(),
        }
    }
}

impl DashboardConfig {
    /// Load `dashboard.json` from `dir`, or defaults when it does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            log::info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// CSV export URL of the configured sheet tab.
    pub fn csv_url(&self) -> Result<Url> {
        let base = format!(
            "https://{}/{}/gviz/tq",
            self.host.trim_matches('/'),
            self.sheet_id
        );
        let mut url = Url::parse(&base).with_context(|| format!("invalid sheet URL '{base}'"))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:csv")
            .append_pair("sheet", &self.sheet_name);
        Ok(url)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
