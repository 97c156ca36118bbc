//! Background fetch of the article table.
//!
//! The root view must never block on the network, so the query runs on its own
//! thread and the outcome comes back over a single-slot channel. Dropping the
//! [`FeedLoad`] handle before the result arrives marks it cancelled; the worker
//! then discards the result instead of delivering it to a view that has gone
//! away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use tracing::debug;

use crate::client::{ArticleSource, ARTICLE_LIMIT};
use crate::error::FeedError;
use crate::model::Article;

type FetchResult = Result<Vec<Article>, FeedError>;

pub struct FeedLoader;

impl FeedLoader {
    /// Starts the one-shot fetch on a dedicated thread.
    pub fn spawn<S>(source: S) -> Result<FeedLoad, FeedError>
    where
        S: ArticleSource + Send + 'static,
    {
        let (sender, receiver) = bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);

        let worker = thread::Builder::new()
            .name("scraperrr-feed".into())
            .spawn(move || {
                let result = source.fetch_recent(ARTICLE_LIMIT);
                if worker_cancelled.load(Ordering::Acquire) {
                    debug!("feed load cancelled; discarding result");
                    return;
                }
                let _ = sender.send(result);
            })?;

        Ok(FeedLoad {
            receiver,
            cancelled,
            worker: Some(worker),
            delivered: false,
        })
    }
}

/// Handle to an in-flight fetch.
pub struct FeedLoad {
    receiver: Receiver<FetchResult>,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    delivered: bool,
}

impl FeedLoad {
    /// Channel side for use in `select!` loops.
    pub fn receiver(&self) -> &Receiver<FetchResult> {
        &self.receiver
    }

    /// Returns the result once it is ready. A worker that exits without
    /// reporting yields [`FeedError::Disconnected`] exactly once.
    pub fn poll(&mut self) -> Option<FetchResult> {
        if self.delivered || self.is_cancelled() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.delivered = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.delivered = true;
                Some(Err(FeedError::Disconnected))
            }
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Waits for the worker and returns whatever it delivered.
    pub fn finish(mut self) -> Option<FetchResult> {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.poll()
    }
}

impl Drop for FeedLoad {
    fn drop(&mut self) {
        self.cancel();
    }
}
