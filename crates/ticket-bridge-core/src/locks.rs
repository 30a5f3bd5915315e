//! Per-ticket serialization of the lookup-then-mutate sequence.
//!
//! Two deliveries for the same ticket that overlap would both see "no work
//! package" and both create one. Holding a [`TicketGuard`] across lookup and
//! mutation makes them run one after the other within this process.
//! Deliveries for different tickets never wait on each other.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ticket::TicketId;

/// Registry of per-ticket async locks.
///
/// Entries are created on demand and removed once no holder or waiter
/// remains, cancelled waiters included, so the map only ever holds tickets
/// currently being processed.
#[derive(Debug, Default)]
pub struct TicketLocks {
    entries: Mutex<HashMap<TicketId, Arc<AsyncMutex<()>>>>,
}

impl TicketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task holds `ticket`, then hold it until the guard drops.
    ///
    /// Cancelling the returned future while it waits leaves no entry behind.
    pub async fn acquire(&self, ticket: TicketId) -> TicketGuard<'_> {
        let lock = self.entries().entry(ticket).or_default().clone();
        let guard = Waiter {
            locks: self,
            ticket,
            pending: Box::pin(lock.lock_owned()),
        }
        .await;

        TicketGuard {
            locks: self,
            ticket,
            guard: Some(guard),
        }
    }

    /// Number of tickets currently held or waited on.
    pub fn active(&self) -> usize {
        self.entries().len()
    }

    /// Drop the entry for `ticket` once nothing but the map refers to it.
    fn release(&self, ticket: TicketId) {
        let mut entries = self.entries();
        if let Some(lock) = entries.get(&ticket) {
            if Arc::strong_count(lock) == 1 {
                entries.remove(&ticket);
            }
        }
    }

    // A panic while the map lock is held cannot leave the map inconsistent
    // (every operation is a single insert, lookup or remove).
    fn entries(&self) -> MutexGuard<'_, HashMap<TicketId, Arc<AsyncMutex<()>>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive hold on one ticket.
#[derive(Debug)]
pub struct TicketGuard<'a> {
    locks: &'a TicketLocks,
    ticket: TicketId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl TicketGuard<'_> {
    pub fn ticket(&self) -> TicketId {
        self.ticket
    }
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the count only sees the map and waiters.
        self.guard.take();
        self.locks.release(self.ticket);
    }
}

type PendingLock = Pin<Box<dyn Future<Output = OwnedMutexGuard<()>> + Send>>;

/// In-flight acquisition of one ticket.
///
/// A waiter can be handed the lock and then dropped before it is polled
/// again, after the previous holder already saw it and kept the entry. The
/// waiter then performs the cleanup itself.
struct Waiter<'a> {
    locks: &'a TicketLocks,
    ticket: TicketId,
    pending: PendingLock,
}

impl Future for Waiter<'_> {
    type Output = OwnedMutexGuard<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.pending.as_mut().poll(cx)
    }
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        // The pending future owns a reference to the lock; drop it before counting.
        let idle: PendingLock = Box::pin(std::future::pending::<OwnedMutexGuard<()>>());
        drop(std::mem::replace(&mut self.pending, idle));
        self.locks.release(self.ticket);
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
