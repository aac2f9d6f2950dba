use thiserror::Error;

pub type RetailResult<T> = Result<T, RetailError>;

#[derive(Error, Debug)]
pub enum RetailError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset load error: {0}")]
    DatasetLoad(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
