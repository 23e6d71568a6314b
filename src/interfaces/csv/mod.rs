//! CSV interface for batch replay of cancellation requests.

pub mod outcome_writer;
pub mod request_reader;
