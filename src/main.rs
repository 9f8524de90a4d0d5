//! inventory-watch: live console view of the synchronized collection
//!
//! Diagnostic binary: bulk-loads the collection over REST, opens the change
//! channel and prints every status and collection transition until Ctrl-C.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inventory_sync::{SyncClient, SyncConfig, SyncResult};

#[tokio::main]
async fn main() -> SyncResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SyncConfig::from_env();
    info!(
        api = %config.api_base_url,
        ws = %config.ws_url,
        "starting inventory watch"
    );

    let client = SyncClient::new(config);

    match client.api().health().await {
        Ok(health) => info!(status = %health.status, "collaborator API is up"),
        Err(err) => {
            warn!(error = %err, "health check failed; continuing, the channel will retry")
        }
    }

    match client.load_initial(0, 100).await {
        Ok(count) => info!(records = count, "initial collection loaded"),
        Err(err) => warn!(error = %err, "bulk load failed; starting from an empty collection"),
    }

    client.connect();

    let mut status = client.observer().subscribe();
    let mut inventory = client.inventory().subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                client.disconnect();
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                println!(
                    "channel: {} ({} active on server)",
                    current.state, current.active_channels
                );
            }
            changed = inventory.changed() => {
                if changed.is_err() {
                    break;
                }
                let records = inventory.borrow_and_update().clone();
                println!("inventory: {} records", records.len());
                for product in records.iter().take(10) {
                    println!(
                        "  #{:<6} {:<24} qty {:>5}  {:>10.2}",
                        product.id, product.name, product.quantity, product.price
                    );
                }
                if records.len() > 10 {
                    println!("  ... and {} more", records.len() - 10);
                }
            }
        }
    }

    Ok(())
}
