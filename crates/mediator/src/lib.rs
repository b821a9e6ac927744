//! # Mediator - In-Process Message Dispatch
//!
//! Decouples callers from the handlers that process their messages.
//!
//! ## Message Kinds
//!
//! | Kind         | Handlers    | Caller gets            | Runs on           |
//! |--------------|-------------|------------------------|-------------------|
//! | Command      | exactly one | `Result<()>`           | calling thread    |
//! | Query        | exactly one | `Result<R>`            | calling thread    |
//! | Notification | zero or more| nothing (fire & forget)| one task each     |
//!
//! ## Dispatch
//!
//! ```text
//! ┌──────────┐  send_command(C)   ┌──────────────┐   handle(C)   ┌───────────┐
//! │  Caller  │ ─────────────────► │   Mediator   │ ────────────► │  Handler  │
//! │          │ ◄───────────────── │  TypeId(C) ─►│ ◄──────────── │           │
//! └──────────┘  Result (verbatim) └──────────────┘               └───────────┘
//! ```
//!
//! Lookup is by the message's declared type. A missing entry is
//! [`MediatorError::NoHandlerRegistered`], an entry that fails the type check
//! is [`MediatorError::HandlerTypeMismatch`]; handler errors pass through
//! unchanged. Notification failures have no caller to go back to and are
//! logged through `tracing` instead. Those records go nowhere until the
//! program installs a subscriber, for example with `mediator-telemetry`.
//!
//! ## Usage
//!
//! ```rust
//! use mediator::{HandlerResult, Mediator};
//!
//! struct GetCount;
//!
//! let mut mediator = Mediator::new();
//! mediator.register_query_handler(|_: GetCount| -> HandlerResult<i32> { Ok(42) });
//!
//! assert_eq!(mediator.send_query::<GetCount, i32>(GetCount).unwrap(), 42);
//! ```
//!
//! The [`global`] module exposes the same operations on a single
//! process-wide registry.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod error;
pub mod global;
pub mod handler;
pub mod key;
pub mod notify;
pub mod registry;

// Re-export main types
pub use error::{MediatorError, MediatorResult};
pub use handler::{CommandHandler, HandlerResult, NotificationHandler, QueryHandler};
pub use key::{MessageKind, MessageTypeKey};
pub use notify::NotificationReceipt;
pub use registry::Mediator;
