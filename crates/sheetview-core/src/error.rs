use thiserror::Error;

/// Errors surfaced by the sheet data layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// Missing or invalid spreadsheet id / sheet name
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failure reported by the spreadsheet transport, message kept as-is
    #[error("{0}")]
    Transport(String),

    /// A refresh was requested before any successful initialization
    #[error("Sheet data service has not been initialized")]
    NotInitialized,
}
