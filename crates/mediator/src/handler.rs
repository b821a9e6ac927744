//! # Handler Contracts
//!
//! One trait per message kind. Each has a blanket implementation for plain
//! functions and closures of the matching signature, so a handler can be
//! registered without a wrapping type.

/// Result returned by command and query handlers.
///
/// Handler errors are type-erased and reach the caller unchanged.
pub type HandlerResult<T> = Result<T, anyhow::Error>;

/// Executes a command of type `C`.
pub trait CommandHandler<C>: Send + Sync + 'static {
    /// Perform the action. `Ok(())` means it succeeded.
    fn handle(&self, command: C) -> HandlerResult<()>;
}

/// Answers a query of type `Q` with a value of type `R`.
pub trait QueryHandler<Q, R>: Send + Sync + 'static {
    /// Retrieve the data for the query.
    fn handle(&self, query: Q) -> HandlerResult<R>;
}

/// Reacts to a notification of type `N`.
///
/// There is no return channel: the sender never observes the outcome.
pub trait NotificationHandler<N>: Send + Sync + 'static {
    /// React to the notification. Runs on its own task; any failure has to be
    /// handled or logged here.
    fn notify(&self, notification: N);
}

impl<C, F> CommandHandler<C> for F
where
    F: Fn(C) -> HandlerResult<()> + Send + Sync + 'static,
{
    fn handle(&self, command: C) -> HandlerResult<()> {
        self(command)
    }
}

impl<Q, R, F> QueryHandler<Q, R> for F
where
    F: Fn(Q) -> HandlerResult<R> + Send + Sync + 'static,
{
    fn handle(&self, query: Q) -> HandlerResult<R> {
        self(query)
    }
}

impl<N, F> NotificationHandler<N> for F
where
    F: Fn(N) + Send + Sync + 'static,
{
    fn notify(&self, notification: N) {
        self(notification)
    }
}
