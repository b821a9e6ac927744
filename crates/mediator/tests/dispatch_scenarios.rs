//! # Dispatch Scenarios
//!
//! End-to-end behavior of the registry as seen by a caller: routing,
//! overwrite semantics, error pass-through, notification fan-out and the
//! diagnostics emitted when a notification goes nowhere.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mediator::{global, CommandHandler, HandlerResult, Mediator, MediatorError, QueryHandler};
use mediator_telemetry::{build_subscriber, MemoryWriter, TelemetryConfig};
use proptest::prelude::*;

const SETTLE: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct IncrementCmd;

#[derive(Debug)]
struct GetCount;

#[derive(Debug, Clone)]
struct OrderPlaced {
    sku: &'static str,
}

#[derive(Debug, Clone)]
struct Unheard;

#[derive(Debug)]
struct Transfer {
    amount: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("account {0} is locked")]
struct AccountLocked(u32);

/// Command handler that refuses every transfer.
struct LockedAccount;

impl CommandHandler<Transfer> for LockedAccount {
    fn handle(&self, _command: Transfer) -> HandlerResult<()> {
        Err(AccountLocked(9).into())
    }
}

/// Query handler backed by a shared counter.
struct CountReader {
    count: Arc<AtomicUsize>,
}

impl QueryHandler<GetCount, usize> for CountReader {
    fn handle(&self, _query: GetCount) -> HandlerResult<usize> {
        Ok(self.count.load(Ordering::SeqCst))
    }
}

/// Run `f` with every record captured at the default (info) threshold.
fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, MemoryWriter) {
    let writer = MemoryWriter::new();
    let (subscriber, _levels) =
        build_subscriber(&TelemetryConfig::default(), writer.clone()).expect("subscriber");
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, writer)
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_increment_command_succeeds_then_fresh_registry_has_no_handler() {
    let mut mediator = Mediator::new();
    mediator.register_command_handler(|_: IncrementCmd| -> HandlerResult<()> { Ok(()) });

    assert!(mediator.send_command(IncrementCmd).is_ok());

    // A restart starts from empty tables.
    let restarted = Mediator::new();
    let err = restarted.send_command(IncrementCmd).unwrap_err();
    assert!(matches!(err, MediatorError::NoHandlerRegistered { .. }));
}

#[test]
fn test_command_handler_error_returned_unchanged() {
    let mut mediator = Mediator::new();
    mediator.register_command_handler::<Transfer, _>(LockedAccount);

    let err = mediator.send_command(Transfer { amount: 10 }).unwrap_err();

    assert_eq!(err.to_string(), "account 9 is locked");
    let locked = err
        .handler_error()
        .and_then(|e| e.downcast_ref::<AccountLocked>())
        .expect("handler error preserved");
    assert_eq!(locked.0, 9);
}

#[test]
fn test_only_latest_command_handler_invoked() {
    let first = Arc::new(AtomicU64::new(0));
    let second = Arc::new(AtomicU64::new(0));
    let mut mediator = Mediator::new();

    for sink in [&first, &second] {
        let sink = Arc::clone(sink);
        mediator.register_command_handler(move |t: Transfer| -> HandlerResult<()> {
            sink.fetch_add(t.amount, Ordering::SeqCst);
            Ok(())
        });
    }

    mediator.send_command(Transfer { amount: 5 }).unwrap();
    mediator.send_command(Transfer { amount: 6 }).unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 11);
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_get_count_returns_42() {
    let mut mediator = Mediator::new();
    mediator.register_query_handler(|_: GetCount| -> HandlerResult<i32> { Ok(42) });

    assert_eq!(mediator.send_query::<GetCount, i32>(GetCount).unwrap(), 42);
}

#[test]
fn test_query_failures_carry_no_result() {
    let mut mediator = Mediator::new();

    let missing: Result<usize, _> = mediator.send_query(GetCount);
    assert!(missing.unwrap_err().is_no_handler());

    mediator.register_query_handler::<GetCount, usize, _>(CountReader {
        count: Arc::new(AtomicUsize::new(3)),
    });

    let mismatched: Result<i64, _> = mediator.send_query(GetCount);
    assert!(mismatched.unwrap_err().is_type_mismatch());

    let matched: Result<usize, _> = mediator.send_query(GetCount);
    assert_eq!(matched.unwrap(), 3);
}

#[test]
fn test_commands_and_queries_share_state_through_handlers() {
    let count = Arc::new(AtomicUsize::new(0));
    let mut mediator = Mediator::new();

    let writer = Arc::clone(&count);
    mediator.register_command_handler(move |_: IncrementCmd| -> HandlerResult<()> {
        writer.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    mediator.register_query_handler::<GetCount, usize, _>(CountReader {
        count: Arc::clone(&count),
    });

    for _ in 0..4 {
        mediator.send_command(IncrementCmd).unwrap();
    }

    assert_eq!(mediator.send_query::<GetCount, usize>(GetCount).unwrap(), 4);
}

// =============================================================================
// Notifications
// =============================================================================

#[test]
fn test_order_placed_reaches_three_independent_counters() {
    let counters: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let mut mediator = Mediator::new();
    for counter in &counters {
        let counter = Arc::clone(counter);
        mediator.register_notification_handler(move |event: OrderPlaced| {
            if event.sku == "SKU-1" {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    let receipt = mediator.send_notification_tracked(OrderPlaced { sku: "SKU-1" });

    assert!(receipt.wait_timeout(SETTLE));
    for counter in &counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_unhandled_notification_emits_exactly_one_diagnostic() {
    let mediator = Mediator::new();

    let (receipt, logs) = with_captured_logs(|| mediator.send_notification_tracked(Unheard));

    assert_eq!(receipt.scheduled(), 0);
    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "unexpected records: {lines:?}");
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("No registered NotificationHandler"));
    assert!(lines[0].contains("Unheard"));
}

#[test]
fn test_fire_and_forget_send_does_not_panic_without_handlers() {
    let mediator = Mediator::new();
    mediator.send_notification(Unheard);
}

#[test]
fn test_handler_diagnostics_reach_senders_sink() {
    let mut mediator = Mediator::new();
    mediator.register_notification_handler(|event: OrderPlaced| {
        tracing::warn!(sku = event.sku, "inventory low");
    });

    let (receipt, logs) =
        with_captured_logs(|| mediator.send_notification_tracked(OrderPlaced { sku: "SKU-9" }));

    assert!(receipt.wait_timeout(SETTLE));
    let contents = logs.contents();
    assert!(contents.contains("inventory low"));
    assert!(contents.contains("SKU-9"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_notification_fan_out_inside_runtime() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut mediator = Mediator::new();
    for _ in 0..5 {
        let hits = Arc::clone(&hits);
        mediator.register_notification_handler(move |_: OrderPlaced| {
            std::thread::sleep(Duration::from_millis(10));
            hits.fetch_add(1, Ordering::SeqCst);
        });
    }

    let receipt = mediator.send_notification_tracked(OrderPlaced { sku: "SKU-2" });
    assert_eq!(receipt.scheduled(), 5);

    let settled = tokio::task::spawn_blocking(move || receipt.wait_timeout(SETTLE))
        .await
        .unwrap();

    assert!(settled);
    assert_eq!(hits.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_shared_registry_dispatches_from_many_tasks() {
    let total = Arc::new(AtomicU64::new(0));
    let mut mediator = Mediator::new();
    let sink = Arc::clone(&total);
    mediator.register_command_handler(move |t: Transfer| -> HandlerResult<()> {
        sink.fetch_add(t.amount, Ordering::SeqCst);
        Ok(())
    });
    let mediator = Arc::new(mediator);

    let tasks: Vec<_> = (1..=10u64)
        .map(|amount| {
            let mediator = Arc::clone(&mediator);
            tokio::spawn(async move { mediator.send_command(Transfer { amount }) })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(total.load(Ordering::SeqCst), 55);
}

// =============================================================================
// Process-wide registry
// =============================================================================

#[derive(Debug)]
struct GlobalPing;

#[derive(Debug)]
struct GlobalLookup;

#[derive(Debug)]
struct NeverRegistered;

#[derive(Debug, Clone)]
struct GlobalEvent;

#[test]
fn test_global_registry_round_trip() {
    global::register_command_handler(|_: GlobalPing| -> HandlerResult<()> { Ok(()) });
    global::register_query_handler(|_: GlobalLookup| -> HandlerResult<&'static str> {
        Ok("found")
    });

    assert!(global::send_command(GlobalPing).is_ok());
    assert_eq!(
        global::send_request::<GlobalLookup, &'static str>(GlobalLookup).unwrap(),
        "found"
    );
    assert!(global::send_command(NeverRegistered)
        .unwrap_err()
        .is_no_handler());
}

#[test]
fn test_global_notifications_fan_out() {
    let hits = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        let hits = Arc::clone(&hits);
        global::register_notification_handler(move |_: GlobalEvent| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert_eq!(
        global::with_global(|m| m.notification_handler_count::<GlobalEvent>()),
        3
    );

    let receipt = global::send_notification_tracked(GlobalEvent);
    assert!(receipt.wait_timeout(SETTLE));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Debug, Clone)]
struct Tick(u32);

proptest! {
    #[test]
    fn prop_every_notification_handler_runs_exactly_once(n in 0usize..8, value in any::<u32>()) {
        let counters: Vec<_> = (0..n).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let mut mediator = Mediator::new();
        for counter in &counters {
            let counter = Arc::clone(counter);
            mediator.register_notification_handler(move |tick: Tick| {
                if tick.0 == value {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        let receipt = mediator.send_notification_tracked(Tick(value));

        prop_assert_eq!(receipt.scheduled(), n);
        prop_assert!(receipt.wait_timeout(SETTLE));
        for counter in &counters {
            prop_assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn prop_command_payload_reaches_handler_verbatim(amount in any::<u64>()) {
        let seen = Arc::new(AtomicU64::new(0));
        let sink = Arc::clone(&seen);
        let mut mediator = Mediator::new();
        mediator.register_command_handler(move |t: Transfer| -> HandlerResult<()> {
            sink.store(t.amount, Ordering::SeqCst);
            Ok(())
        });

        let sent = mediator.send_command(Transfer { amount });
        prop_assert!(sent.is_ok());
        prop_assert_eq!(seen.load(Ordering::SeqCst), amount);
    }
}
