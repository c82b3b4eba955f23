use std::time::Duration;

use ctxh::{Context, ContextError};
use tokio::time::{self, Instant};

#[derive(Debug, PartialEq)]
struct User(&'static str);

#[derive(Debug, PartialEq)]
struct RequestId(u64);

#[tokio::test(start_paused = true)]
async fn background_never_done() {
    let cx = Context::background();

    assert!(!cx.is_cancelled());
    assert_eq!(cx.err(), None);
    assert_eq!(cx.deadline(), None);

    let waited = time::timeout(Duration::from_secs(60), cx.cancelled()).await;
    assert!(waited.is_err());
}

#[tokio::test]
async fn cancel_propagates_to_children() {
    let root = Context::background();
    let (parent, cancel) = root.with_cancel();
    let (child, _child_cancel) = parent.with_cancel();
    let valued = child.with_value(User("ann"));

    assert!(!valued.is_cancelled());

    cancel.cancel();
    assert!(cancel.is_cancelled());

    assert_eq!(parent.err(), Some(ContextError::Canceled));
    assert_eq!(child.err(), Some(ContextError::Canceled));
    assert_eq!(valued.err(), Some(ContextError::Canceled));
    assert_eq!(root.err(), None);

    valued.cancelled().await;
}

#[tokio::test]
async fn cancelling_child_leaves_parent() {
    let (parent, _cancel) = Context::background().with_cancel();
    let (child, cancel) = parent.with_cancel();

    cancel.cancel();

    assert!(child.is_cancelled());
    assert!(!parent.is_cancelled());
}

#[tokio::test]
async fn drop_guard_cancels() {
    let (cx, cancel) = Context::background().with_cancel();

    {
        let _guard = cancel.drop_guard();
        assert!(!cx.is_cancelled());
    }

    assert_eq!(cx.err(), Some(ContextError::Canceled));
}

#[tokio::test(start_paused = true)]
async fn deadline_exceeded() {
    let (cx, _cancel) = Context::background().with_timeout(Duration::from_secs(5));

    assert!(cx.deadline().is_some());
    assert_eq!(cx.err(), None);

    time::advance(Duration::from_secs(6)).await;

    assert_eq!(cx.err(), Some(ContextError::DeadlineExceeded));
    cx.cancelled().await;
}

#[tokio::test(start_paused = true)]
async fn cancel_before_deadline_stays_canceled() {
    let (cx, cancel) = Context::background().with_timeout(Duration::from_secs(5));
    let child = cx.with_value(User("ann"));

    cancel.cancel();
    assert_eq!(cx.err(), Some(ContextError::Canceled));

    time::advance(Duration::from_secs(6)).await;

    assert_eq!(cx.err(), Some(ContextError::Canceled));
    assert_eq!(child.err(), Some(ContextError::Canceled));
}

#[tokio::test(start_paused = true)]
async fn cancel_after_deadline_stays_exceeded() {
    let (cx, cancel) = Context::background().with_timeout(Duration::from_secs(5));

    time::advance(Duration::from_secs(6)).await;
    cancel.cancel();

    assert_eq!(cx.err(), Some(ContextError::DeadlineExceeded));
}

#[tokio::test(start_paused = true)]
async fn parent_cancel_reason_is_inherited() {
    let (parent, cancel) = Context::background().with_cancel();
    let (child, _child_cancel) = parent.with_timeout(Duration::from_secs(5));

    cancel.cancel();
    time::advance(Duration::from_secs(6)).await;

    assert_eq!(child.err(), Some(ContextError::Canceled));
    assert_eq!(parent.err(), Some(ContextError::Canceled));
}

#[tokio::test(start_paused = true)]
async fn cancelled_resolves_at_deadline() {
    let start = Instant::now();
    let (cx, _cancel) = Context::background().with_timeout(Duration::from_secs(3));

    cx.cancelled().await;

    assert!(Instant::now() - start >= Duration::from_secs(3));
    assert_eq!(cx.err(), Some(ContextError::DeadlineExceeded));
}

#[tokio::test(start_paused = true)]
async fn child_deadline_never_exceeds_parent() {
    let (parent, _a) = Context::background().with_timeout(Duration::from_secs(5));
    let (later, _b) = parent.with_timeout(Duration::from_secs(10));
    let (sooner, _c) = parent.with_timeout(Duration::from_secs(1));

    assert_eq!(later.deadline(), parent.deadline());
    assert!(sooner.deadline() < parent.deadline());

    let valued = later.with_value(RequestId(7));
    assert_eq!(valued.deadline(), parent.deadline());
}

#[test]
fn values_are_looked_up_by_type() {
    let root = Context::background();
    let cx = root.with_value(User("ann")).with_value(RequestId(1));

    assert_eq!(cx.get::<User>(), Some(&User("ann")));
    assert_eq!(cx.get::<RequestId>(), Some(&RequestId(1)));
    assert_eq!(root.get::<User>(), None);
    assert_eq!(cx.get::<String>(), None);
}

#[test]
fn values_shadow_parents() {
    let parent = Context::background().with_value(User("ann"));
    let child = parent.with_value(User("bob"));

    assert_eq!(child.get::<User>(), Some(&User("bob")));
    assert_eq!(parent.get::<User>(), Some(&User("ann")));
}

#[tokio::test]
async fn values_survive_derivation() {
    let valued = Context::background().with_value(User("ann"));
    let (cx, _cancel) = valued.with_cancel();

    assert_eq!(cx.get::<User>(), Some(&User("ann")));
}

#[test]
fn clones_share_identity() {
    let cx = Context::background();
    let clone = cx.clone();

    assert!(Context::ptr_eq(&cx, &clone));
    assert!(!Context::ptr_eq(&cx, &Context::background()));
    assert!(!Context::ptr_eq(&cx, &cx.with_value(1_u8)));
}
