use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),
    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Flight not found: {0}")]
    NotFound(String),
    #[error("Flight {0} already has a change in progress")]
    UpdateInFlight(String),
    #[error("A drag is already in progress")]
    DragInProgress,
    #[error("Another change is already awaiting confirmation")]
    RequestOpen,

    #[error("{applied} was saved, but the rest failed: {source}")]
    PartialCommit {
        applied: String,
        #[source]
        source: Box<Error>,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Import failed: {0}")]
    Import(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
