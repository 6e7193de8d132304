//! Background sweep for expired stock reservations.
//!
//! Checkouts hold stock for a bounded time; when the customer walks away
//! the webhook that would release the hold never arrives. This task runs on
//! an interval, releases every hold past its expiry, and voids the
//! now-dead invoices. Each sweep is one transaction; errors are logged and
//! the loop keeps going.

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::services::CheckoutService;
use crate::state::AppState;

/// Spawn the sweeper task.
///
/// The task runs for the lifetime of the process; the returned handle is
/// only useful in tests that want to abort it.
pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    let period = state.config().sweep_interval;

    tokio::spawn(async move {
        let mut ticker = interval(period);
        // The first tick fires immediately; that's fine, it cleans up holds
        // left over from a previous run.
        loop {
            ticker.tick().await;
            sweep_once(&state).await;
        }
    })
}

/// Run one sweep pass.
async fn sweep_once(state: &AppState) {
    let service = CheckoutService::new(
        state.pool(),
        state.stripe(),
        state.config().reservation_ttl,
    );

    match service.release_expired(Utc::now()).await {
        Ok(0) => debug!("Sweep found no expired reservations"),
        Ok(released) => info!(invoices = released, "Released expired reservations"),
        Err(e) => error!(error = %e, "Reservation sweep failed"),
    }
}
