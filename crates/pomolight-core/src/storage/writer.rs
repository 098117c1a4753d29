//! Debounced background writer for the state file.
//!
//! Callers stage the latest [`PersistedState`] and move on; a single worker
//! task writes it once no new state has arrived for the debounce window.
//! Bursts of changes therefore cost one write. A failed write keeps the
//! staged state and is retried with the next change or the final flush.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::state::{save_async, PersistedState};

/// Outcome of the writes so far, observable without blocking the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStatus {
    pub writes: u64,
    pub failures: u64,
    pub last_error: Option<String>,
}

enum Message {
    Stage(PersistedState),
    Flush(oneshot::Sender<()>),
}

pub struct StateWriter {
    tx: mpsc::UnboundedSender<Message>,
    status: watch::Receiver<WriteStatus>,
    worker: JoinHandle<()>,
}

impl StateWriter {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn spawn(path: PathBuf, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(WriteStatus::default());
        let worker = tokio::spawn(run_worker(path, debounce, rx, status_tx));
        Self { tx, status, worker }
    }

    /// Queue `state` for writing. Never blocks.
    pub fn stage(&self, state: PersistedState) {
        if self.tx.send(Message::Stage(state)).is_err() {
            tracing::error!("state writer stopped; change not persisted");
        }
    }

    pub fn status(&self) -> watch::Receiver<WriteStatus> {
        self.status.clone()
    }

    /// Write whatever is staged now and wait for the attempt to finish.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Message::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Flush pending state and stop the worker.
    pub async fn shutdown(self) {
        self.flush().await;
        drop(self.tx);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "state writer task failed");
        }
    }
}

async fn run_worker(
    path: PathBuf,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Message>,
    status: watch::Sender<WriteStatus>,
) {
    let mut pending: Option<PersistedState> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let message = match deadline {
            Some(at) => {
                tokio::select! {
                    message = rx.recv() => message,
                    _ = tokio::time::sleep_until(at) => {
                        deadline = None;
                        write_pending(&path, &mut pending, &status).await;
                        continue;
                    }
                }
            }
            None => rx.recv().await,
        };

        match message {
            Some(Message::Stage(state)) => {
                pending = Some(state);
                deadline = Some(Instant::now() + debounce);
            }
            Some(Message::Flush(ack)) => {
                deadline = None;
                write_pending(&path, &mut pending, &status).await;
                let _ = ack.send(());
            }
            None => {
                write_pending(&path, &mut pending, &status).await;
                break;
            }
        }
    }
}

async fn write_pending(
    path: &Path,
    pending: &mut Option<PersistedState>,
    status: &watch::Sender<WriteStatus>,
) {
    let Some(state) = pending.take() else {
        return;
    };
    match save_async(path, &state).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "state saved");
            status.send_modify(|s| {
                s.writes += 1;
                s.last_error = None;
            });
        }
        Err(e) => {
            tracing::error!(error = %e, "state save failed; will retry");
            *pending = Some(state);
            status.send_modify(|s| {
                s.failures += 1;
                s.last_error = Some(e.to_string());
            });
        }
    }
}
