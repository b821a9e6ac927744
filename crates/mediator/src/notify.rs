//! # Notification Fan-Out
//!
//! Each handler matched for a notification runs as its own unit of
//! execution and the sender returns immediately. Inside a Tokio runtime the
//! handler goes to the blocking pool (handlers are synchronous); anywhere
//! else it gets a dedicated thread.
//!
//! No ordering is provided between handlers of the same notification.

use crate::handler::NotificationHandler;
use crate::key::MessageTypeKey;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Name given to threads spawned outside a Tokio runtime.
pub const NOTIFY_THREAD_NAME: &str = "mediator-notify";

/// Completion signal for one `send_notification_tracked` call.
///
/// The default dispatch path discards this. Callers that need to know when
/// every handler has finished (tests, graceful shutdown) can hold on to it.
#[derive(Debug, Clone)]
pub struct NotificationReceipt {
    scheduled: usize,
    state: Arc<Pending>,
}

#[derive(Debug)]
struct Pending {
    remaining: Mutex<usize>,
    settled: Condvar,
}

impl NotificationReceipt {
    fn new(scheduled: usize) -> Self {
        Self {
            scheduled,
            state: Arc::new(Pending {
                remaining: Mutex::new(scheduled),
                settled: Condvar::new(),
            }),
        }
    }

    /// Receipt for a notification that launched nothing.
    pub(crate) fn empty() -> Self {
        Self::new(0)
    }

    /// Number of handler invocations launched.
    #[must_use]
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Number of launched invocations that have not finished yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.state.remaining.lock()
    }

    /// True once every launched invocation has finished.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending() == 0
    }

    /// Block until every launched invocation has finished.
    ///
    /// Never call this from inside a notification handler of the same
    /// notification.
    pub fn wait(&self) {
        let mut remaining = self.state.remaining.lock();
        while *remaining > 0 {
            self.state.settled.wait(&mut remaining);
        }
    }

    /// Block until settled or until `timeout` elapses.
    ///
    /// Returns `true` if everything settled in time.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.state.remaining.lock();
        while *remaining > 0 {
            if self
                .state
                .settled
                .wait_until(&mut remaining, deadline)
                .timed_out()
            {
                return *remaining == 0;
            }
        }
        true
    }

    fn guard(&self) -> CompletionGuard {
        CompletionGuard {
            state: Arc::clone(&self.state),
        }
    }
}

/// Marks one invocation finished when dropped, including on panic or when
/// the task could not be launched at all.
struct CompletionGuard {
    state: Arc<Pending>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let mut remaining = self.state.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.state.settled.notify_all();
        }
    }
}

/// Launch every handler on its own unit of execution.
///
/// Each handler receives its own clone of the notification.
pub(crate) fn fan_out<N>(
    key: MessageTypeKey,
    handlers: Vec<Arc<dyn NotificationHandler<N>>>,
    notification: N,
) -> NotificationReceipt
where
    N: Clone + Send + 'static,
{
    let receipt = NotificationReceipt::new(handlers.len());
    let runtime = tokio::runtime::Handle::try_current().ok();
    let dispatch = tracing::dispatcher::get_default(|current| current.clone());

    debug!(
        message_type = key.name(),
        handlers = handlers.len(),
        on_runtime = runtime.is_some(),
        "Dispatching notification"
    );

    for handler in handlers {
        let guard = receipt.guard();
        let notification = notification.clone();
        let dispatch = dispatch.clone();

        let task = move || {
            let _guard = guard;
            tracing::dispatcher::with_default(&dispatch, || handler.notify(notification));
        };

        match &runtime {
            Some(handle) => {
                drop(handle.spawn_blocking(task));
            }
            None => {
                if let Err(e) = thread::Builder::new()
                    .name(NOTIFY_THREAD_NAME.to_string())
                    .spawn(task)
                {
                    error!(
                        message_type = key.name(),
                        error = %e,
                        "Failed to spawn NotificationHandler, notification will be dropped for this handler"
                    );
                }
            }
        }
    }

    receipt
}
