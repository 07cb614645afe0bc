//! Per-chat work queues.
//!
//! Each chat gets an unbounded queue drained by its own worker task, so
//! messages from one chat are handled strictly in arrival order while
//! different chats proceed concurrently. Workers that sit idle are reaped
//! and restarted on the chat's next message.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use {
    teloxide::types::Message,
    tokio::{sync::mpsc, time::Instant},
    tokio_util::task::TaskTracker,
    tracing::{debug, error, info},
};

use crate::handlers::UpdateHandler;

struct ChatWorker {
    tx: mpsc::UnboundedSender<Message>,
    /// Messages queued or still being handled.
    pending: Arc<AtomicUsize>,
    last_dispatch: Instant,
}

pub struct ChatQueues {
    handler: Arc<UpdateHandler>,
    workers: HashMap<i64, ChatWorker>,
    tracker: TaskTracker,
}

impl ChatQueues {
    pub fn new(handler: Arc<UpdateHandler>) -> Self {
        Self {
            handler,
            workers: HashMap::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Queue `msg` behind earlier messages from the same chat.
    pub fn dispatch(&mut self, msg: Message) {
        let chat_id = msg.chat.id.0;
        let msg = match self.workers.get_mut(&chat_id) {
            Some(worker) => {
                worker.pending.fetch_add(1, Ordering::SeqCst);
                match worker.tx.send(msg) {
                    Ok(()) => {
                        worker.last_dispatch = Instant::now();
                        return;
                    },
                    // Worker is gone (it panicked); start a fresh one.
                    Err(mpsc::error::SendError(msg)) => msg,
                }
            },
            None => msg,
        };

        let worker = self.spawn_worker(chat_id);
        worker.pending.fetch_add(1, Ordering::SeqCst);
        if worker.tx.send(msg).is_err() {
            error!(chat_id, "chat worker exited before receiving its first message");
        }
        self.workers.insert(chat_id, worker);
    }

    fn spawn_worker(&self, chat_id: i64) -> ChatWorker {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let pending = Arc::new(AtomicUsize::new(0));
        let handler = Arc::clone(&self.handler);
        let in_flight = Arc::clone(&pending);
        debug!(chat_id, "starting chat worker");
        self.tracker.spawn(async move {
            while let Some(msg) = rx.recv().await {
                match handler.handle_message(&msg).await {
                    Ok(outcome) => debug!(chat_id, ?outcome, "message handled"),
                    Err(e) => error!(chat_id, error = %e, "error handling telegram message"),
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            debug!(chat_id, "chat worker stopped");
        });
        ChatWorker {
            tx,
            pending,
            last_dispatch: Instant::now(),
        }
    }

    /// Drop workers with nothing queued or in progress that have not seen a
    /// message for `max_idle`, plus any whose task has died. Returns how
    /// many were dropped.
    pub fn reap_idle(&mut self, max_idle: Duration) -> usize {
        let before = self.workers.len();
        self.workers.retain(|chat_id, worker| {
            let busy = worker.pending.load(Ordering::SeqCst) > 0;
            let keep = !worker.tx.is_closed()
                && (busy || worker.last_dispatch.elapsed() < max_idle);
            if !keep {
                debug!(chat_id, "reaping idle chat worker");
            }
            keep
        });
        before - self.workers.len()
    }

    /// Number of chats with a live worker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Close every queue and wait for queued messages to be handled.
    pub async fn shutdown(mut self) {
        let chats = self.workers.len();
        self.workers.clear();
        self.tracker.close();
        info!(chats, "draining chat queues");
        self.tracker.wait().await;
    }
}
