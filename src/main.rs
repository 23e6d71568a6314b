use clap::Parser;
use miette::{IntoDiagnostic, Result};
use refund_engine::application::engine::{EngineConfig, RefundEngine};
use refund_engine::domain::policy::{self, PolicyKind};
use refund_engine::domain::ports::{ItemStore, ItemStoreBox};
use refund_engine::infrastructure::in_memory::InMemoryItemStore;
use refund_engine::interfaces::csv::outcome_writer::{OutcomeRow, OutcomeWriter};
use refund_engine::interfaces::csv::request_reader::RequestReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input cancellation requests CSV file
    #[arg(required_unless_present = "policy")]
    input: Option<PathBuf>,

    /// Print the refund policy table for an item type as JSON and exit
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Simulated payment-gateway latency per refund, in milliseconds
    #[arg(long, default_value_t = 0)]
    gateway_delay_ms: u64,

    /// Reject refunds for items with no payment on file instead of
    /// backfilling a simulated payment record
    #[arg(long)]
    no_payment_backfill: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(kind) = cli.policy {
        let policy = policy::refund_policy(kind);
        println!(
            "{}",
            serde_json::to_string_pretty(&policy).into_diagnostic()?
        );
        return Ok(());
    }

    let input = cli
        .input
        .ok_or_else(|| miette::miette!("an input file is required"))?;

    let store = InMemoryItemStore::new();
    let engine_store: ItemStoreBox = Box::new(store.clone());
    let engine = RefundEngine::with_config(
        engine_store,
        EngineConfig {
            gateway_delay: Duration::from_millis(cli.gateway_delay_ms),
            allow_payment_backfill: !cli.no_payment_backfill,
        },
    );

    let file = File::open(input).into_diagnostic()?;
    let reader = RequestReader::new(file);

    let stdout = io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock());

    for request in reader.requests() {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                eprintln!("Error reading request: {e}");
                continue;
            }
        };
        let id = request.id;
        let reason = request.reason().map(str::to_owned);
        match request.into_item(chrono::Utc::now()) {
            Ok(item) => {
                store.save(item).await.into_diagnostic()?;
                match engine.cancel(id, reason.as_deref()).await {
                    Ok(outcome) => writer
                        .write_outcome(OutcomeRow::new(id, &outcome))
                        .into_diagnostic()?,
                    Err(e) => eprintln!("Error cancelling item {id}: {e}"),
                }
            }
            Err(e) => eprintln!("Error building item {id}: {e}"),
        }
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
