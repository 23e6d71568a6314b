use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefundError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Item {0} not found")]
    ItemNotFound(u64),
    #[error("Item {item} cannot be cancelled: {reason}")]
    InvalidTransition { item: u64, reason: String },
    #[error("No payment on file for item {0}")]
    NoPaymentOnFile(u64),
    #[error("Refund state for item {item} is unknown after a storage failure: {source_message}")]
    RefundStateUnknown { item: u64, source_message: String },
}

pub type Result<T> = std::result::Result<T, RefundError>;
