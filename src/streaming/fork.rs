//! Splitting one fragment stream into two independent branches.
//!
//! A single pump task pulls the source and pushes each item into one
//! unbounded queue per branch. Each branch reads its own queue at its own
//! pace, so the aggregator can run ahead of the caller's iteration (or fall
//! behind it) without either side waiting on the other. An item stays queued
//! only until the branch that still needs it reads it.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One of the two outputs of [`fork`].
///
/// Yields exactly the items of the source, in order, followed by the end of
/// the stream. Dropping a branch does not affect the other one.
pub struct Branch<T> {
    rx: UnboundedReceiver<T>,
}

impl<T> Stream for Branch<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

/// Split `source` into two branches that each replay every item.
///
/// Items are cloned once per live branch, so a terminal `Err` from the source
/// reaches both consumers. The pump stops when the source ends or when both
/// branches have been dropped.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime, since the pump runs as a
/// spawned task.
pub fn fork<S, T>(source: S) -> (Branch<T>, Branch<T>)
where
    S: Stream<Item = T> + Send + 'static,
    T: Clone + Send + 'static,
{
    let (left_tx, left_rx) = mpsc::unbounded_channel();
    let (right_tx, right_rx) = mpsc::unbounded_channel();

    tokio::spawn(pump(Box::pin(source), left_tx, right_tx));

    (Branch { rx: left_rx }, Branch { rx: right_rx })
}

async fn pump<T: Clone>(
    mut source: Pin<Box<dyn Stream<Item = T> + Send>>,
    left_tx: UnboundedSender<T>,
    right_tx: UnboundedSender<T>,
) {
    let mut left = Some(left_tx);
    let mut right = Some(right_tx);
    let mut forwarded = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            item = source.next() => item,
            () = all_closed(&left, &right) => {
                tracing::debug!(forwarded, "Both stream branches dropped, stopping pump");
                return;
            }
        };

        let Some(item) = next else {
            tracing::trace!(forwarded, "Stream source exhausted");
            return;
        };
        forwarded += 1;

        match (&left, &right) {
            (Some(l), Some(r)) => {
                let left_open = l.send(item.clone()).is_ok();
                let right_open = r.send(item).is_ok();
                if !left_open {
                    left = None;
                }
                if !right_open {
                    right = None;
                }
            }
            (Some(l), None) => {
                if l.send(item).is_err() {
                    left = None;
                }
            }
            (None, Some(r)) => {
                if r.send(item).is_err() {
                    right = None;
                }
            }
            (None, None) => return,
        }
    }
}

/// Resolves once every branch that is still tracked has been dropped.
async fn all_closed<T>(left: &Option<UnboundedSender<T>>, right: &Option<UnboundedSender<T>>) {
    if let Some(tx) = left {
        tx.closed().await;
    }
    if let Some(tx) = right {
        tx.closed().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn test_both_branches_see_every_item() {
        let (left, right) = fork(stream::iter(vec![1, 2, 3]));
        let left: Vec<i32> = left.collect().await;
        let right: Vec<i32> = right.collect().await;
        assert_eq!(left, vec![1, 2, 3]);
        assert_eq!(right, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_error_reaches_both_branches() {
        let items: Vec<Result<i32, String>> = vec![Ok(1), Err("boom".to_string())];
        let (left, right) = fork(stream::iter(items));
        let left: Vec<_> = left.collect().await;
        let right: Vec<_> = right.collect().await;
        assert_eq!(left, vec![Ok(1), Err("boom".to_string())]);
        assert_eq!(left, right);
    }

    #[tokio::test]
    async fn test_dropped_branch_does_not_block_other() {
        let (left, right) = fork(stream::iter(0..100));
        drop(left);
        let right: Vec<i32> = right.collect().await;
        assert_eq!(right.len(), 100);
    }

    #[tokio::test]
    async fn test_branches_read_at_different_rates() {
        let (mut left, right) = fork(stream::iter(vec!["a", "b", "c"]));
        // Drain the right branch completely before touching the left.
        let right: Vec<&str> = right.collect().await;
        assert_eq!(right, vec!["a", "b", "c"]);
        assert_eq!(left.next().await, Some("a"));
        assert_eq!(left.next().await, Some("b"));
        assert_eq!(left.next().await, Some("c"));
        assert_eq!(left.next().await, None);
    }

    #[tokio::test]
    async fn test_pump_stops_when_both_branches_dropped() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<i32>();
        let (left, right) = fork(rx);
        drop(left);
        drop(right);
        // Give the pump a chance to observe the closed branches.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(tx.is_closed());
    }
}
