//! # Coordinator: wires relayers, subscribers and pollers into one process.
//!
//! The [`Coordinator`] owns the root [`CancellationToken`]. It starts every
//! registered task under a child token, waits for a stop request, cancels, and
//! then waits for **every** task's completion signal before reporting.
//!
//! ## Shutdown path
//! ```text
//! run()
//!   ├─► spawn subscribers   (spawn_subscriber → JoinHandle<u64>)
//!   ├─► start relayers      (RelayerCore::start → RelayerHandle)
//!   ├─► spawn pollers       (Poller::spawn → JoinHandle<u64>)
//!   ├─► wait: OS signal | shutdown() | stop future
//!   ├─► root token.cancel() → propagates to child tokens
//!   └─► wait_all(grace):
//!          ├─ all completed          → Ok(RunReport)
//!          └─ deadline exceeded      → Err(GraceExceeded { stuck })
//! ```
//!
//! The relay core never imposes a deadline on itself; `RelayConfig::grace` is
//! the coordinator's own bound (`0s` = wait indefinitely).

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::relayer::RelayerCore;
use super::summary::WorkSummary;
use crate::config::RelayConfig;
use crate::error::RuntimeError;
use crate::poller::Poller;
use crate::sources::Source;
use crate::subscribers::{spawn_subscriber, Subscribe};

/// What a finished task reported.
#[derive(Debug, Clone, Copy)]
enum Outcome {
    Relayer(WorkSummary),
    Subscriber(u64),
    Poller(u64),
}

/// Starts a task under the given token and returns its completion future.
type Launch = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, Outcome> + Send>;

/// Final results of a coordinated run, in completion order.
///
/// Task names need not be unique; the lookup helpers return the first match.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// Frozen summary per relayer.
    pub relayers: Vec<(String, WorkSummary)>,
    /// Processed count per subscriber.
    pub subscribers: Vec<(String, u64)>,
    /// Enqueued count per poller.
    pub pollers: Vec<(String, u64)>,
}

impl RunReport {
    /// Summary of the relayer named `name`.
    pub fn relayer(&self, name: &str) -> Option<WorkSummary> {
        self.relayers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    /// Processed count of the subscriber named `name`.
    pub fn subscriber(&self, name: &str) -> Option<u64> {
        self.subscribers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }
}

/// Process-level wiring for a set of relay tasks.
pub struct Coordinator {
    cfg: RelayConfig,
    token: CancellationToken,
    tasks: Vec<(String, Launch)>,
}

impl Coordinator {
    /// Creates a coordinator with no tasks.
    pub fn new(cfg: RelayConfig) -> Self {
        Self {
            cfg,
            token: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Token that stops the run when cancelled (same effect as an OS signal).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Requests shutdown.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Adds a relayer; its broadcast loop starts when the run starts.
    pub fn add_relayer<S: Source>(&mut self, relayer: &Arc<RelayerCore<S>>) -> &mut Self {
        let relayer = Arc::clone(relayer);
        let name = relayer.name().to_string();
        let launch: Launch = Box::new(move |token| {
            let handle = relayer.start(token);
            async move { Outcome::Relayer(handle.wait().await) }.boxed()
        });
        self.tasks.push((name, launch));
        self
    }

    /// Adds a subscriber. Its sinks must already be registered with the
    /// relayers that should deliver to it.
    pub fn add_subscriber(&mut self, sub: Arc<dyn Subscribe>) -> &mut Self {
        let name = sub.name().to_string();
        let launch: Launch = Box::new(move |token| {
            let name = sub.name().to_string();
            let join = spawn_subscriber(sub, token);
            async move {
                match join.await {
                    Ok(processed) => Outcome::Subscriber(processed),
                    Err(e) => {
                        warn!(subscriber = %name, error = %e, "subscriber task failed");
                        Outcome::Subscriber(0)
                    }
                }
            }
            .boxed()
        });
        self.tasks.push((name, launch));
        self
    }

    /// Adds a poller feeding `relayer` every `cfg.read_interval`.
    pub fn add_poller<S: Source>(&mut self, name: impl Into<String>, relayer: &Arc<RelayerCore<S>>) -> &mut Self {
        let poller = Poller::new(name, self.cfg.read_interval);
        let name = poller.name().to_string();
        let relayer = Arc::clone(relayer);
        let launch: Launch = Box::new(move |token| {
            let name = poller.name().to_string();
            let join = poller.spawn(relayer, token);
            async move {
                match join.await {
                    Ok(enqueued) => Outcome::Poller(enqueued),
                    Err(e) => {
                        warn!(poller = %name, error = %e, "poller task failed");
                        Outcome::Poller(0)
                    }
                }
            }
            .boxed()
        });
        self.tasks.push((name, launch));
        self
    }

    /// Runs until an OS termination signal or [`Coordinator::shutdown`].
    ///
    /// Unix listens for `SIGINT`, `SIGTERM` and `SIGQUIT`; elsewhere for Ctrl-C.
    pub async fn run(self) -> Result<RunReport, RuntimeError> {
        self.run_until(termination_signal()).await
    }

    /// Runs until `stop` resolves or [`Coordinator::shutdown`] is called.
    ///
    /// If `stop` fails (e.g. signal registration), tasks are still shut down
    /// gracefully before the error is returned.
    pub async fn run_until<F>(self, stop: F) -> Result<RunReport, RuntimeError>
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let Coordinator { cfg, token, tasks } = self;
        info!(tasks = tasks.len(), "starting relay tasks");

        let mut set = JoinSet::new();
        let mut pending = BTreeMap::new();
        for (id, (name, launch)) in tasks.into_iter().enumerate() {
            let done = launch(token.child_token());
            pending.insert(id, name.clone());
            set.spawn(async move { (id, name, done.await) });
        }

        let stopped = tokio::select! {
            res = stop => res,
            _ = token.cancelled() => Ok(()),
        };
        match &stopped {
            Ok(()) => info!("shutdown requested; cancelling relay tasks"),
            Err(e) => warn!(error = %e, "stop signal failed; cancelling relay tasks"),
        }
        token.cancel();

        let report = wait_all(&cfg, &mut set, &mut pending).await?;
        stopped?;
        Ok(report)
    }
}

/// Resolves on the first termination signal.
#[cfg(unix)]
async fn termination_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut listeners = [
        SignalKind::interrupt(),
        SignalKind::terminate(),
        SignalKind::quit(),
    ]
    .into_iter()
    .map(signal)
    .collect::<std::io::Result<Vec<_>>>()?;

    futures::future::select_all(listeners.iter_mut().map(|s| Box::pin(s.recv()))).await;
    Ok(())
}

#[cfg(not(unix))]
async fn termination_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Waits for every task, bounded by `cfg.grace` if set.
async fn wait_all(
    cfg: &RelayConfig,
    set: &mut JoinSet<(usize, String, Outcome)>,
    pending: &mut BTreeMap<usize, String>,
) -> Result<RunReport, RuntimeError> {
    let mut report = RunReport::default();
    let collect = async {
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((id, name, outcome)) => {
                    pending.remove(&id);
                    match outcome {
                        Outcome::Relayer(summary) => report.relayers.push((name, summary)),
                        Outcome::Subscriber(n) => report.subscribers.push((name, n)),
                        Outcome::Poller(n) => report.pollers.push((name, n)),
                    }
                }
                Err(e) => warn!(error = %e, "relay task join failed"),
            }
        }
    };

    match cfg.shutdown_deadline() {
        None => collect.await,
        Some(grace) => {
            if tokio::time::timeout(grace, collect).await.is_err() {
                set.abort_all();
                let stuck: Vec<String> = pending.values().cloned().collect();
                warn!(?grace, ?stuck, "shutdown deadline exceeded");
                return Err(RuntimeError::GraceExceeded { grace, stuck });
            }
        }
    }

    info!(
        relayers = report.relayers.len(),
        subscribers = report.subscribers.len(),
        pollers = report.pollers.len(),
        "all relay tasks stopped"
    );
    Ok(report)
}
