use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing expected columns {missing:?}; found columns: {found:?}")]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("unexpected service category {0:?} (expected \"hour\" or \"thirty\")")]
    UnrecognizedCategory(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
