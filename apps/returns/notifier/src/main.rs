//! Returns Notifier - Entry Point
//!
//! Processes one goods-return status event and prints the delivery report.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    returns_notifier::run().await
}
