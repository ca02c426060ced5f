//! Bounded background job queue drained by a fixed set of workers.
//!
//! Pipeline runs are submitted here instead of being fire-and-forget spawns,
//! which gives the server visibility into in-flight vs completed work and a
//! graceful shutdown path that drains the queue before exiting.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, VentureError};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

// ---------------------------------------------------------------------------
// WorkerPool
// ---------------------------------------------------------------------------

/// Fixed-size worker pool over a bounded mpsc queue.
///
/// Must be constructed inside a tokio runtime; workers are spawned eagerly
/// and exit when the queue is closed and drained.
pub struct WorkerPool {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    in_flight: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(queue_depth.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));

        let handles = (0..workers.max(1))
            .map(|n| {
                let rx = rx.clone();
                let in_flight = in_flight.clone();
                let completed = completed.clone();
                tokio::spawn(async move {
                    loop {
                        // Hold the receiver lock only while waiting for the
                        // next job, never while running one.
                        let job = { rx.lock().await.recv().await };
                        let Some(job) = job else { break };
                        in_flight.fetch_add(1, Ordering::SeqCst);
                        job.await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        completed.fetch_add(1, Ordering::SeqCst);
                    }
                    tracing::debug!(worker = n, "worker exiting, queue closed");
                })
            })
            .collect();

        Self {
            sender: Mutex::new(Some(tx)),
            in_flight,
            completed,
            workers: Mutex::new(handles),
        }
    }

    /// Queue a job. Waits for queue capacity; fails with
    /// [`VentureError::QueueClosed`] once [`WorkerPool::shutdown`] has run.
    pub async fn submit<F>(&self, job: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sender = self
            .sender
            .lock()
            .expect("worker pool lock poisoned")
            .clone();
        let Some(sender) = sender else {
            return Err(VentureError::QueueClosed);
        };
        sender
            .send(Box::pin(job))
            .await
            .map_err(|_| VentureError::QueueClosed)
    }

    /// Jobs currently executing on a worker.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Jobs that have run to completion since the pool was created.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Stop accepting jobs, drain everything already queued, and join the
    /// workers.
    pub async fn shutdown(&self) {
        self.sender
            .lock()
            .expect("worker pool lock poisoned")
            .take();
        let handles: Vec<JoinHandle<()>> = self
            .workers
            .lock()
            .expect("worker pool lock poisoned")
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
