//! # Subscriber worker: runs one subscriber's drain loop as its own task.
//!
//! The returned [`JoinHandle`] is the subscriber's one-shot completion signal:
//! it resolves exactly once, after `drain` has returned, with the number of
//! messages the subscriber processed.
//!
//! Panics inside `drain` are caught and logged so a faulty subscriber still
//! reports completion instead of tearing down the coordinator's rendezvous.

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::Subscribe;

/// Spawns `sub.drain(token)` and resolves to the processed count once stopped.
pub fn spawn_subscriber(sub: Arc<dyn Subscribe>, token: CancellationToken) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let fut = sub.drain(token);
        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            let info = {
                let any = &*panic_err;
                if let Some(msg) = any.downcast_ref::<&'static str>() {
                    (*msg).to_string()
                } else if let Some(msg) = any.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "unknown panic".to_string()
                }
            };
            error!(subscriber = %sub.name(), info = %info, "subscriber panicked");
        }

        let processed = sub.processed();
        info!(subscriber = %sub.name(), processed, "subscriber done");
        processed
    })
}
