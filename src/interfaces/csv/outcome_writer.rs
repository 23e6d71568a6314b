use crate::application::engine::CancellationOutcome;
use crate::domain::item::ItemId;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One output row per processed cancellation request.
#[derive(Debug, Serialize, PartialEq)]
pub struct OutcomeRow {
    pub id: ItemId,
    pub outcome: String,
    pub refund_status: &'static str,
    pub refund_amount: String,
}

impl OutcomeRow {
    pub fn new(id: ItemId, outcome: &CancellationOutcome) -> Self {
        let (refund_status, refund_amount) = match &outcome.refund {
            Some(result) => (
                result.refund.status.as_str(),
                result
                    .refund
                    .amount
                    .map(|amount| amount.to_string())
                    .unwrap_or_default(),
            ),
            None => ("none", String::new()),
        };
        Self {
            id,
            outcome: outcome.message.clone(),
            refund_status,
            refund_amount,
        }
    }
}

/// Writes cancellation outcomes as CSV to any `Write` sink.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_outcome(&mut self, row: OutcomeRow) -> Result<()> {
        self.writer.serialize(row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
