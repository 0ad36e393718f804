//! Integration tests for the bounded candidate channel.

use leetforge::engine::{PopOutcome, PushOutcome, channel};
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const SHORT: Duration = Duration::from_millis(50);
const PATIENCE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn push_then_pop_preserves_order() {
    let token = CancellationToken::new();
    let (tx, mut rx) = channel(4);

    for candidate in ["C@t1!", "D0g2#", "Sun3$"] {
        assert_eq!(tx.push(candidate.to_string(), &token).await, PushOutcome::Pushed);
    }
    assert_eq!(rx.gauge().depth(), 3);
    assert_eq!(rx.gauge().capacity(), 4);

    assert_eq!(rx.pop_timeout(SHORT).await, PopOutcome::Item("C@t1!".into()));
    assert_eq!(rx.try_pop().as_deref(), Some("D0g2#"));
    assert_eq!(rx.pop_timeout(SHORT).await, PopOutcome::Item("Sun3$".into()));
    assert!(rx.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_channel_blocks_the_second_producer() {
    let token = CancellationToken::new();
    let (tx, mut rx) = channel(1);

    let first = tokio::spawn({
        let tx = tx.clone();
        let token = token.clone();
        async move { tx.push("first".to_string(), &token).await }
    });
    let second = tokio::spawn({
        let tx = tx.clone();
        let token = token.clone();
        async move { tx.push("second".to_string(), &token).await }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    let finished = [first.is_finished(), second.is_finished()];
    assert_eq!(finished.iter().filter(|done| **done).count(), 1);
    assert_eq!(tx.gauge().depth(), 1);

    // Freeing the slot lets the blocked producer through.
    assert!(matches!(rx.pop_timeout(SHORT).await, PopOutcome::Item(_)));
    let (a, b) = timeout(PATIENCE, async { (first.await, second.await) })
        .await
        .unwrap();
    assert_eq!(a.unwrap(), PushOutcome::Pushed);
    assert_eq!(b.unwrap(), PushOutcome::Pushed);
    assert_eq!(tx.gauge().depth(), 1);
}

#[tokio::test]
async fn cancellation_releases_a_blocked_push() {
    let token = CancellationToken::new();
    let (tx, _rx) = channel(1);
    assert_eq!(tx.push("fill".into(), &token).await, PushOutcome::Pushed);

    let blocked = tokio::spawn({
        let tx = tx.clone();
        let token = token.clone();
        async move { tx.push("waiting".to_string(), &token).await }
    });
    tokio::time::sleep(SHORT).await;
    assert!(!blocked.is_finished());

    token.cancel();
    let outcome = timeout(PATIENCE, blocked).await.unwrap().unwrap();
    assert_eq!(outcome, PushOutcome::Cancelled);
    assert_eq!(tx.gauge().depth(), 1);
}

#[tokio::test]
async fn push_after_cancellation_is_refused_even_with_room() {
    let token = CancellationToken::new();
    token.cancel();
    let (tx, rx) = channel(8);

    assert_eq!(tx.push("late".into(), &token).await, PushOutcome::Cancelled);
    assert!(rx.is_empty());
}

#[tokio::test]
async fn pop_times_out_on_an_idle_channel() {
    let (_tx, mut rx) = channel(2);
    assert_eq!(rx.pop_timeout(SHORT).await, PopOutcome::TimedOut);
    assert_eq!(rx.try_pop(), None);
}

#[tokio::test]
async fn channel_drains_before_reporting_closed() {
    let token = CancellationToken::new();
    let (tx, mut rx) = channel(4);
    tx.push("last".into(), &token).await;
    drop(tx);

    assert_eq!(rx.pop_timeout(SHORT).await, PopOutcome::Item("last".into()));
    assert_eq!(rx.pop_timeout(SHORT).await, PopOutcome::Closed);
}

#[tokio::test]
async fn closed_receiver_refuses_new_pushes_but_keeps_queued_ones() {
    let token = CancellationToken::new();
    let (tx, mut rx) = channel(4);
    tx.push("queued".into(), &token).await;

    rx.close();
    assert_eq!(tx.push("refused".into(), &token).await, PushOutcome::Closed);
    assert_eq!(rx.pop_timeout(SHORT).await, PopOutcome::Item("queued".into()));
    assert_eq!(rx.pop_timeout(SHORT).await, PopOutcome::Closed);
}

#[tokio::test]
async fn push_to_a_dropped_receiver_reports_closed() {
    let token = CancellationToken::new();
    let (tx, rx) = channel(4);
    drop(rx);
    assert_eq!(tx.push("orphan".into(), &token).await, PushOutcome::Closed);
}

#[tokio::test]
async fn zero_capacity_is_treated_as_one() {
    let token = CancellationToken::new();
    let (tx, _rx) = channel(0);
    assert_eq!(tx.gauge().capacity(), 1);
    assert_eq!(tx.push("only".into(), &token).await, PushOutcome::Pushed);
}
