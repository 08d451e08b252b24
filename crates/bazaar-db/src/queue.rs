//! Background save queue.
//!
//! A single worker thread drains a bounded channel of whole-blob writes in
//! order. Callers on a hot path (a game tick) enqueue and move on; callers
//! that need durability either write synchronously or `flush()`.

use crate::error::Result;
use crate::store::{save_logged, Persistence};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

enum SaveJob {
    Write { name: String, content: String },
    Flush(SyncSender<()>),
}

/// Handle for queueing saves; cheap to clone.
///
/// The sender is shared by every clone. Shutting the worker down takes it
/// out, so a job is either run by the worker or written by the caller after
/// the worker has finished.
#[derive(Clone)]
pub struct SaveQueue {
    tx: Arc<Mutex<Option<SyncSender<SaveJob>>>>,
    store: Arc<dyn Persistence>,
}

impl SaveQueue {
    /// Queue a full replace of `name`.
    ///
    /// Blocks while the queue is full. Once the worker has shut down the
    /// write happens synchronously on the caller's thread instead.
    pub fn enqueue(&self, name: impl Into<String>, content: impl Into<String>) {
        let job = SaveJob::Write {
            name: name.into(),
            content: content.into(),
        };
        if let Err(SaveJob::Write { name, content }) = self.send(job) {
            tracing::warn!(file = %name, "save worker stopped; writing synchronously");
            save_logged(self.store.as_ref(), &name, &content);
        }
    }

    /// Wait until every save queued before this call has run.
    ///
    /// Returns false if the worker is gone.
    pub fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        if self.send(SaveJob::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    /// Store the queue writes to.
    pub fn store(&self) -> &Arc<dyn Persistence> {
        &self.store
    }

    // The sender is cloned out of the lock so a full queue never blocks
    // shutdown. The clone keeps the channel open until the job is in.
    fn send(&self, job: SaveJob) -> std::result::Result<(), SaveJob> {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match tx {
            Some(tx) => tx.send(job).map_err(|mpsc::SendError(job)| job),
            None => Err(job),
        }
    }
}

/// Owner of the worker thread; shuts it down on drop.
pub struct SaveWorker {
    queue: SaveQueue,
    handle: Option<JoinHandle<()>>,
}

impl SaveWorker {
    /// Start a worker writing to `store`, holding at most `capacity` pending jobs.
    pub fn spawn(store: Arc<dyn Persistence>, capacity: usize) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let worker_store = Arc::clone(&store);
        let handle = thread::Builder::new()
            .name("bazaar-save".to_string())
            .spawn(move || run(worker_store, rx))?;

        Ok(Self {
            queue: SaveQueue {
                tx: Arc::new(Mutex::new(Some(tx))),
                store,
            },
            handle: Some(handle),
        })
    }

    /// A handle for queueing saves.
    pub fn queue(&self) -> SaveQueue {
        self.queue.clone()
    }

    /// Run everything queued, then stop the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Held until the worker has drained, so fallback writes land last.
            let mut tx = self.queue.tx.lock().unwrap_or_else(|e| e.into_inner());
            tx.take();
            if handle.join().is_err() {
                tracing::error!("save worker panicked");
            }
        }
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

// Ends once the last sender is gone and the channel is empty.
fn run(store: Arc<dyn Persistence>, rx: Receiver<SaveJob>) {
    for job in &rx {
        match job {
            SaveJob::Write { name, content } => {
                save_logged(store.as_ref(), &name, &content);
            }
            SaveJob::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("save worker stopped");
}
