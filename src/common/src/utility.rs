use tokio::sync::broadcast;
use tracing::{error, info};

/// Broadcast channel that fires once when the process receives ctrl-c.
pub async fn create_shutdown_channel() -> broadcast::Receiver<()> {
    let (shutdown_sender, shutdown_receiver): (broadcast::Sender<()>, broadcast::Receiver<()>) =
        broadcast::channel::<()>(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        info!("signal received, starting graceful shutdown");
        // No receivers left means the session already ended
        let _ = shutdown_sender.send(());
    });
    shutdown_receiver
}
