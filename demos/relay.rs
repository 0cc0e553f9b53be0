//! # Message Relay Example
//!
//! Runs a relayer fed by a random mock socket and three subscribers:
//! - `joe` drains class B only
//! - `bob` drains class A only
//! - `sally` drains both lanes
//!
//! A poller reads one message per `read_interval`. Press Ctrl-C to stop; the
//! run waits for every task to close and prints the final counters.
//!
//! ## Run
//! ```bash
//! RUST_LOG=relaykit=debug cargo run --example relay
//! ```

use std::sync::Arc;
use std::time::Duration;

use relaykit::{Coordinator, DrainingSubscriber, PriorityClass, RandomSource, RelayConfig, RelayerCore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = RelayConfig {
        grace: Duration::from_secs(5),
        ..RelayConfig::default()
    };
    info!(read_interval = ?cfg.read_interval, "starting service");

    let relayer = RelayerCore::named("relayer", RandomSource::new(), cfg.clone());
    let mut coord = Coordinator::new(cfg.clone());

    for (name, interest) in [
        ("joe", PriorityClass::ClassB),
        ("bob", PriorityClass::ClassA),
        ("sally", PriorityClass::Both),
    ] {
        let sub = Arc::new(DrainingSubscriber::new(name, interest, &cfg));
        relayer.register(sub.as_ref());
        coord.add_subscriber(sub);
    }
    coord.add_relayer(&relayer).add_poller("poller", &relayer);

    let report = coord.run().await?;

    println!();
    println!("Relay summary:");
    for (name, summary) in &report.relayers {
        println!(" ├─► {name}: {summary}");
    }
    for (name, processed) in &report.subscribers {
        println!(" ├─► {name}: processed={processed}");
    }
    for (name, enqueued) in &report.pollers {
        println!(" └─► {name}: enqueued={enqueued}");
    }
    Ok(())
}
