//! Scoped timer registry.
//!
//! Every delayed continuation the panel schedules (icon transitions, the success
//! hold, ghost expiry, poll intervals, output reveal) is a task owned by one
//! registry. Disposing the registry aborts all of them and makes later sleeps
//! resolve to [`Disposed`], so nothing mutates state after teardown.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::Disposed;

/// Owned set of cancellable tasks, cheap to clone and share between components.
#[derive(Debug, Clone)]
pub struct TimerRegistry {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    disposed: watch::Sender<bool>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerRegistry {
    /// Fresh registry, not yet disposed.
    #[must_use]
    pub fn new() -> Self {
        let (disposed, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                disposed,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Wait for `delay`, or fail early once the registry is disposed.
    ///
    /// # Errors
    ///
    /// Returns [`Disposed`] if the registry was disposed before or during the wait.
    pub async fn sleep(&self, delay: Duration) -> Result<(), Disposed> {
        let disposed = self.inner.disposed.subscribe();
        if *disposed.borrow() {
            return Err(Disposed);
        }
        tokio::select! {
            biased;
            () = wait_disposed(disposed) => Err(Disposed),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Run `action` after `delay` unless the registry is disposed first.
    pub fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let registry = self.clone();
        self.spawn(async move {
            if registry.sleep(delay).await.is_ok() {
                action();
            }
        });
    }

    /// Run `task` in the background; it is aborted when the registry is disposed.
    ///
    /// Returns `false` without spawning when the registry is already disposed.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock_tasks();
        if self.is_disposed() {
            return false;
        }
        tasks.retain(|handle| !handle.is_finished());
        let disposed = self.inner.disposed.subscribe();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = wait_disposed(disposed) => {}
                () = task => {}
            }
        });
        tasks.push(handle.abort_handle());
        true
    }

    /// Cancel every registered task. Idempotent.
    pub fn dispose(&self) {
        let drained: Vec<AbortHandle> = {
            let mut tasks = self.lock_tasks();
            self.inner.disposed.send_replace(true);
            tasks.drain(..).collect()
        };
        let pending = drained.iter().filter(|handle| !handle.is_finished()).count();
        for handle in drained {
            handle.abort();
        }
        debug!(pending, "timer registry disposed");
    }

    /// Resolves once the registry is disposed; used to abandon in-flight requests.
    pub async fn disposed(&self) {
        wait_disposed(self.inner.disposed.subscribe()).await;
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        *self.inner.disposed.borrow()
    }

    #[cfg(test)]
    pub(crate) fn live_tasks(&self) -> usize {
        self.lock_tasks()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<AbortHandle>> {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

async fn wait_disposed(mut disposed: watch::Receiver<bool>) {
    loop {
        if *disposed.borrow_and_update() {
            return;
        }
        if disposed.changed().await.is_err() {
            return;
        }
    }
}
