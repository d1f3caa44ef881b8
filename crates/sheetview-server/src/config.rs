use std::env;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Spreadsheet fetched at startup, if any
    pub spreadsheet_id: Option<String>,
    /// Sheet used at startup and as the default for refreshes
    pub sheet_name: String,
    /// Base URL of the Sheets API
    pub sheets_api_base: String,
    /// API key appended to Sheets requests
    pub sheets_api_key: Option<String>,
    /// Pre-issued OAuth access token sent as a bearer token
    pub sheets_access_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = non_empty("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;
        let spreadsheet_id = non_empty("SPREADSHEET_ID");
        let sheet_name = non_empty("SHEET_NAME").unwrap_or_else(|| "DB".to_string());
        let sheets_api_base = non_empty("SHEETS_API_BASE")
            .unwrap_or_else(|| "https://sheets.googleapis.com".to_string());

        Ok(Self {
            host,
            port,
            spreadsheet_id,
            sheet_name,
            sheets_api_base,
            sheets_api_key: non_empty("SHEETS_API_KEY"),
            sheets_access_token: non_empty("SHEETS_ACCESS_TOKEN"),
        })
    }
}
