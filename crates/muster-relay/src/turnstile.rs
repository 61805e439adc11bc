//! The ticket turnstile: admission tickets and the execution cursor.
//!
//! `issue` hands out tickets with a single atomic increment. A waiter
//! parks on a watch channel until the cursor reaches its ticket — no busy
//! spin — runs, and advances the cursor. Abandoned tickets go into a
//! skipped set the cursor steps over, so a caller that timed out, was
//! cancelled, or died before invoking cannot stall everyone behind it.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;

use muster_core::Ticket;

/// Why a waiter was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TurnError {
    /// The ticket was forcibly skipped while its owner waited.
    Skipped,
    /// The turnstile is shut down; pending tickets are discarded.
    Closed,
}

pub struct Turnstile {
    /// Next ticket value to hand out.
    next: AtomicU64,
    /// Ticket currently allowed to execute. All cursor mutations happen
    /// with `skipped` locked, which keeps skip bookkeeping consistent.
    cursor: watch::Sender<u64>,
    /// Abandoned tickets the cursor has not reached yet.
    skipped: Mutex<BTreeSet<u64>>,
    closed: AtomicBool,
}

impl Turnstile {
    pub fn new() -> Self {
        let (cursor, _) = watch::channel(0);
        Turnstile {
            next: AtomicU64::new(0),
            cursor,
            skipped: Mutex::new(BTreeSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Atomically take the next ticket.
    pub(crate) fn issue(&self) -> Result<Ticket, TurnError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TurnError::Closed);
        }
        Ok(Ticket::new(self.next.fetch_add(1, Ordering::Relaxed)))
    }

    /// Number of tickets issued so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }

    /// The ticket currently allowed to execute.
    pub fn position(&self) -> u64 {
        *self.cursor.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Park until the cursor reaches `ticket`.
    pub(crate) async fn wait(&self, ticket: Ticket) -> Result<(), TurnError> {
        let mut rx = self.cursor.subscribe();
        let current = *rx
            .wait_for(|c| *c >= ticket.get())
            .await
            .map_err(|_| TurnError::Closed)?;
        if self.closed.load(Ordering::Acquire) {
            return Err(TurnError::Closed);
        }
        if current > ticket.get() {
            return Err(TurnError::Skipped);
        }
        Ok(())
    }

    /// Mark `ticket` done and advance the cursor past any skipped tickets.
    pub(crate) fn complete(&self, ticket: Ticket) {
        let mut skipped = self.skipped.lock();
        self.advance_from(ticket.get(), &mut skipped);
    }

    /// Give up on `ticket` without executing it.
    ///
    /// If the ticket is at the cursor the cursor moves on immediately;
    /// otherwise it is remembered and stepped over when reached. Tickets
    /// already passed are a no-op, so abandoning twice is harmless.
    pub(crate) fn abandon(&self, ticket: Ticket) {
        let mut skipped = self.skipped.lock();
        let current = *self.cursor.borrow();
        if current == ticket.get() {
            self.advance_from(ticket.get(), &mut skipped);
        } else if ticket.get() > current {
            skipped.insert(ticket.get());
        }
    }

    /// Shut down: reject new tickets and wake every parked waiter.
    ///
    /// Pending tickets are discarded, not drained; their waiters observe
    /// `Closed`.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let mut skipped = self.skipped.lock();
        skipped.clear();
        self.cursor.send_modify(|c| *c = u64::MAX);
    }

    /// Caller must hold the `skipped` lock.
    fn advance_from(&self, done: u64, skipped: &mut BTreeSet<u64>) {
        self.cursor.send_modify(|c| {
            if *c == done {
                let mut next = done + 1;
                while skipped.remove(&next) {
                    next += 1;
                }
                *c = next;
            }
        });
    }
}

impl Default for Turnstile {
    fn default() -> Self {
        Turnstile::new()
    }
}

/// One admission through the turnstile.
///
/// Dropping a turn that has not finished abandons its ticket, so a waiter
/// cancelled mid-wait (timeout, task abort) never wedges the cursor.
pub(crate) struct Turn<'a> {
    turnstile: &'a Turnstile,
    ticket: Ticket,
    done: bool,
}

impl<'a> Turn<'a> {
    pub(crate) fn new(turnstile: &'a Turnstile, ticket: Ticket) -> Self {
        Turn {
            turnstile,
            ticket,
            done: false,
        }
    }

    pub(crate) async fn wait(&self) -> Result<(), TurnError> {
        self.turnstile.wait(self.ticket).await
    }

    pub(crate) fn finish(mut self) {
        self.turnstile.complete(self.ticket);
        self.done = true;
    }
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.turnstile.abandon(self.ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_are_monotonic() {
        let ts = Turnstile::new();
        assert_eq!(ts.issue().unwrap(), Ticket::new(0));
        assert_eq!(ts.issue().unwrap(), Ticket::new(1));
        assert_eq!(ts.issued(), 2);
    }

    #[tokio::test]
    async fn first_ticket_passes_immediately() {
        let ts = Turnstile::new();
        let t0 = ts.issue().unwrap();
        ts.wait(t0).await.unwrap();
        ts.complete(t0);
        assert_eq!(ts.position(), 1);
    }

    #[tokio::test]
    async fn later_ticket_waits_for_earlier() {
        let ts = std::sync::Arc::new(Turnstile::new());
        let t0 = ts.issue().unwrap();
        let t1 = ts.issue().unwrap();

        let ts2 = ts.clone();
        let waiter = tokio::spawn(async move {
            ts2.wait(t1).await.unwrap();
            ts2.complete(t1);
        });

        // t1 cannot pass until t0 completes.
        tokio::task::yield_now().await;
        assert_eq!(ts.position(), 0);

        ts.wait(t0).await.unwrap();
        ts.complete(t0);
        waiter.await.unwrap();
        assert_eq!(ts.position(), 2);
    }

    #[tokio::test]
    async fn abandon_unblocks_followers() {
        let ts = Turnstile::new();
        let t0 = ts.issue().unwrap();
        let t1 = ts.issue().unwrap();

        ts.abandon(t0);
        ts.wait(t1).await.unwrap();
        ts.complete(t1);
        assert_eq!(ts.position(), 2);
    }

    #[tokio::test]
    async fn abandoned_future_ticket_is_stepped_over() {
        let ts = Turnstile::new();
        let t0 = ts.issue().unwrap();
        let t1 = ts.issue().unwrap();
        let t2 = ts.issue().unwrap();

        // t1 gives up while t0 is still ahead of it.
        ts.abandon(t1);
        ts.wait(t0).await.unwrap();
        ts.complete(t0);

        // Cursor jumped straight over the abandoned ticket.
        assert_eq!(ts.position(), 2);
        ts.wait(t2).await.unwrap();
        ts.complete(t2);
    }

    #[tokio::test]
    async fn skipped_waiter_learns_it_was_skipped() {
        let ts = std::sync::Arc::new(Turnstile::new());
        let t0 = ts.issue().unwrap();
        let t1 = ts.issue().unwrap();

        let ts2 = ts.clone();
        let waiter = tokio::spawn(async move { ts2.wait(t1).await });

        tokio::task::yield_now().await;
        ts.abandon(t1);
        ts.wait(t0).await.unwrap();
        ts.complete(t0);

        assert_eq!(waiter.await.unwrap(), Err(TurnError::Skipped));
    }

    #[tokio::test]
    async fn close_wakes_and_rejects() {
        let ts = std::sync::Arc::new(Turnstile::new());
        let _t0 = ts.issue().unwrap();
        let t1 = ts.issue().unwrap();

        let ts2 = ts.clone();
        let waiter = tokio::spawn(async move { ts2.wait(t1).await });

        tokio::task::yield_now().await;
        ts.close();

        assert_eq!(waiter.await.unwrap(), Err(TurnError::Closed));
        assert_eq!(ts.issue(), Err(TurnError::Closed));
    }

    #[tokio::test]
    async fn dropped_turn_abandons_its_ticket() {
        let ts = Turnstile::new();
        let t0 = ts.issue().unwrap();
        let t1 = ts.issue().unwrap();

        {
            let turn = Turn::new(&ts, t0);
            // Dropped without finish(): caller was cancelled.
            drop(turn);
        }

        ts.wait(t1).await.unwrap();
        ts.complete(t1);
        assert_eq!(ts.position(), 2);
    }
}
