//! # Process-Wide Registry
//!
//! A single [`Mediator`] shared by the whole process, for code that cannot
//! have a registry passed to it.
//!
//! Register every handler during startup, before dispatch begins. The lock
//! is held only while resolving handlers, never while one runs, so handlers
//! may themselves dispatch through these functions.

use crate::error::{MediatorError, MediatorResult};
use crate::handler::{CommandHandler, NotificationHandler, QueryHandler};
use crate::key::MessageTypeKey;
use crate::notify::{self, NotificationReceipt};
use crate::registry::Mediator;
use lazy_static::lazy_static;
use parking_lot::RwLock;

lazy_static! {
    static ref GLOBAL: RwLock<Mediator> = RwLock::new(Mediator::new());
}

/// Run `f` against the process-wide registry under its read lock.
///
/// The lock is held until `f` returns. Calling any `register_*` function
/// from inside `f` deadlocks, since registration needs the write lock.
/// Dispatching from inside `f` is fine: lookups take the read lock
/// recursively and do not queue behind a waiting writer.
pub fn with_global<T>(f: impl FnOnce(&Mediator) -> T) -> T {
    f(&GLOBAL.read_recursive())
}

/// Register the process-wide handler for command type `C`, replacing any
/// previous one.
pub fn register_command_handler<C, H>(handler: H)
where
    C: 'static,
    H: CommandHandler<C>,
{
    GLOBAL.write().register_command_handler(handler);
}

/// Register the process-wide handler for query type `Q`, replacing any
/// previous one.
pub fn register_query_handler<Q, R, H>(handler: H)
where
    Q: 'static,
    R: 'static,
    H: QueryHandler<Q, R>,
{
    GLOBAL.write().register_query_handler(handler);
}

/// Append a process-wide handler for notification type `N`.
pub fn register_notification_handler<N, H>(handler: H)
where
    N: 'static,
    H: NotificationHandler<N>,
{
    GLOBAL.write().register_notification_handler(handler);
}

/// Send a command through the process-wide registry.
///
/// # Errors
///
/// See [`Mediator::send_command`].
pub fn send_command<C: 'static>(command: C) -> MediatorResult<()> {
    let handler = GLOBAL.read_recursive().resolve_command::<C>()?;
    handler.handle(command).map_err(MediatorError::Handler)
}

/// Send a query through the process-wide registry.
///
/// # Errors
///
/// See [`Mediator::send_query`].
pub fn send_query<Q: 'static, R: 'static>(query: Q) -> MediatorResult<R> {
    let handler = GLOBAL.read_recursive().resolve_query::<Q, R>()?;
    handler.handle(query).map_err(MediatorError::Handler)
}

/// Alias of [`send_query`].
///
/// # Errors
///
/// See [`Mediator::send_query`].
pub fn send_request<Q: 'static, R: 'static>(query: Q) -> MediatorResult<R> {
    send_query(query)
}

/// Notify every process-wide handler for `N` and return immediately.
pub fn send_notification<N>(notification: N)
where
    N: Clone + Send + 'static,
{
    let _ = send_notification_tracked(notification);
}

/// As [`send_notification`], returning a completion receipt.
pub fn send_notification_tracked<N>(notification: N) -> NotificationReceipt
where
    N: Clone + Send + 'static,
{
    let handlers = GLOBAL.read_recursive().resolve_notification::<N>();
    match handlers {
        Some(handlers) => notify::fan_out(MessageTypeKey::of::<N>(), handlers, notification),
        None => NotificationReceipt::empty(),
    }
}
