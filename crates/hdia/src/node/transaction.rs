// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transaction table: correlates outgoing requests with incoming answers.
//!
//! One table per peer connection. Pending transactions live in a concurrent
//! map keyed by Hop-by-Hop Identifier; the state machine is
//!
//! ```text
//! Pending --answer--> Matched
//!    |     --budget exhausted--> TimedOut
//!    |     --caller gave up--> Cancelled
//! ```
//!
//! Terminal transitions go through a single atomic compare-exchange, so of a
//! racing answer, timeout and cancellation exactly one wins and the caller
//! sees exactly one outcome on the handle's channel.

use crate::node::{Error, Result};
use crate::protocol::constants::FLAG_RETRANSMITTED;
use crate::protocol::message::Message;
use crossbeam::channel::{bounded, Receiver, Sender};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const STATE_PENDING: u8 = 0;
const STATE_MATCHED: u8 = 1;
const STATE_TIMED_OUT: u8 = 2;
const STATE_CANCELLED: u8 = 3;

/// Terminal outcome of a transaction, delivered on the handle's channel.
///
/// Local errors travel the same path as answers so callers cannot mistake a
/// synthesized failure for a peer result.
#[derive(Debug)]
pub enum TransactionOutcome {
    /// The matching answer, delivered exactly once.
    Answer(Message),
    /// Retry budget exhausted; local equivalent of "unable to deliver".
    TimedOut,
}

/// What the deadline path decided for an expired transaction.
#[derive(Debug)]
pub(crate) enum DeadlineAction {
    /// Budget remains: re-send these bytes (T flag set, identical contents)
    /// and re-arm the deadline.
    Retransmit(Vec<u8>),
    /// Budget exhausted: the caller has been handed `TimedOut`.
    Expired,
    /// Transaction already reached a terminal state; nothing to do.
    Stale,
}

struct PendingTransaction {
    end_to_end_id: u32,
    state: AtomicU8,
    outcome_tx: Sender<TransactionOutcome>,
    /// Encoded request with the T flag already set: retransmissions must
    /// carry identical contents under the same End-to-End Identifier.
    retransmit_wire: Vec<u8>,
    retransmits_left: AtomicU32,
    issued_at: Instant,
}

impl PendingTransaction {
    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(STATE_PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Concurrent map of pending transactions for one peer connection.
pub struct TransactionTable {
    pending: DashMap<u32, Arc<PendingTransaction>>,
    next_hop_by_hop: AtomicU32,
    max_pending: usize,
}

impl TransactionTable {
    pub fn new(max_pending: usize) -> Self {
        // Seed the counter from the clock so ids do not repeat across quick
        // restarts of the same connection.
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos();
        Self {
            pending: DashMap::new(),
            next_hop_by_hop: AtomicU32::new(nanos | 1),
            max_pending,
        }
    }

    /// Number of transactions currently pending.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Allocate a Hop-by-Hop Identifier unique among pending transactions.
    ///
    /// Monotonic counter; after a full wrap an id could still be in flight,
    /// so occupied ids are skipped.
    pub fn allocate_hop_by_hop(&self) -> u32 {
        loop {
            let id = self.next_hop_by_hop.fetch_add(1, Ordering::Relaxed);
            if !self.pending.contains_key(&id) {
                return id;
            }
        }
    }

    /// Insert a Pending entry for an encoded request about to be sent.
    ///
    /// Fails synchronously with [`Error::Overloaded`] at capacity, before
    /// any bytes are written to the transport.
    pub(crate) fn insert(
        &self,
        message: &Message,
        wire: &[u8],
        max_retransmits: u32,
    ) -> Result<TransactionHandle> {
        let pending = self.pending.len();
        if pending >= self.max_pending {
            return Err(Error::Overloaded {
                pending,
                limit: self.max_pending,
            });
        }

        let mut retransmit_wire = wire.to_vec();
        retransmit_wire[4] |= FLAG_RETRANSMITTED;

        let (outcome_tx, outcome_rx) = bounded(1);
        let tx = Arc::new(PendingTransaction {
            end_to_end_id: message.end_to_end_id,
            state: AtomicU8::new(STATE_PENDING),
            outcome_tx,
            retransmit_wire,
            retransmits_left: AtomicU32::new(max_retransmits),
            issued_at: Instant::now(),
        });
        self.pending.insert(message.hop_by_hop_id, tx);

        Ok(TransactionHandle {
            hop_by_hop_id: message.hop_by_hop_id,
            outcome_rx,
        })
    }

    /// Drop a just-inserted entry after a failed transport send.
    pub(crate) fn abort(&self, hop_by_hop_id: u32) {
        self.pending.remove(&hop_by_hop_id);
    }

    /// Match an inbound answer to its pending request.
    ///
    /// Returns `false` for stale, duplicate or unsolicited answers; those are
    /// the caller's to log and discard, never fatal.
    pub fn match_answer(&self, answer: Message) -> bool {
        let hop = answer.hop_by_hop_id;
        let Some(tx) = self.pending.get(&hop).map(|e| Arc::clone(e.value())) else {
            return false;
        };
        if !tx.transition(STATE_MATCHED) {
            return false;
        }
        self.pending.remove(&hop);
        log::debug!(
            "[tx] matched answer hbh={:#010x} e2e={:#010x} after {:?}",
            hop,
            tx.end_to_end_id,
            tx.issued_at.elapsed()
        );
        // Receiver may have been dropped by a caller that stopped waiting.
        let _ = tx.outcome_tx.send(TransactionOutcome::Answer(answer));
        true
    }

    /// Drive a fired deadline for `hop_by_hop_id`.
    pub(crate) fn on_deadline(&self, hop_by_hop_id: u32) -> DeadlineAction {
        let Some(tx) = self
            .pending
            .get(&hop_by_hop_id)
            .map(|e| Arc::clone(e.value()))
        else {
            return DeadlineAction::Stale;
        };

        let budget_left = tx
            .retransmits_left
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if budget_left {
            if tx.state.load(Ordering::Acquire) != STATE_PENDING {
                return DeadlineAction::Stale;
            }
            return DeadlineAction::Retransmit(tx.retransmit_wire.clone());
        }

        if !tx.transition(STATE_TIMED_OUT) {
            return DeadlineAction::Stale;
        }
        self.pending.remove(&hop_by_hop_id);
        log::debug!(
            "[tx] timeout hbh={:#010x} e2e={:#010x} after {:?}",
            hop_by_hop_id,
            tx.end_to_end_id,
            tx.issued_at.elapsed()
        );
        let _ = tx.outcome_tx.send(TransactionOutcome::TimedOut);
        DeadlineAction::Expired
    }

    /// Cancel a pending transaction: removes it and suppresses any late
    /// answer delivery. Bytes already on the wire are not recalled.
    pub fn cancel(&self, hop_by_hop_id: u32) -> bool {
        let Some(tx) = self
            .pending
            .get(&hop_by_hop_id)
            .map(|e| Arc::clone(e.value()))
        else {
            return false;
        };
        if !tx.transition(STATE_CANCELLED) {
            return false;
        }
        self.pending.remove(&hop_by_hop_id);
        log::debug!("[tx] cancelled hbh={:#010x}", hop_by_hop_id);
        true
    }
}

/// Caller-side handle to one pending transaction.
#[derive(Debug)]
pub struct TransactionHandle {
    hop_by_hop_id: u32,
    outcome_rx: Receiver<TransactionOutcome>,
}

impl TransactionHandle {
    pub fn hop_by_hop_id(&self) -> u32 {
        self.hop_by_hop_id
    }

    /// Block until the terminal outcome and convert it to a result.
    pub fn wait(&self) -> Result<Message> {
        match self.outcome_rx.recv() {
            Ok(TransactionOutcome::Answer(answer)) => Ok(answer),
            Ok(TransactionOutcome::TimedOut) => Err(Error::TransactionTimeout {
                hop_by_hop_id: self.hop_by_hop_id,
            }),
            // Sender gone: the owning connection was torn down.
            Err(_) => Err(Error::Cancelled),
        }
    }

    /// Bounded wait, mostly for callers multiplexing several transactions.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<Message>> {
        match self.outcome_rx.recv_timeout(timeout) {
            Ok(TransactionOutcome::Answer(answer)) => Some(Ok(answer)),
            Ok(TransactionOutcome::TimedOut) => Some(Err(Error::TransactionTimeout {
                hop_by_hop_id: self.hop_by_hop_id,
            })),
            Err(crossbeam::channel::RecvTimeoutError::Timeout) => None,
            Err(crossbeam::channel::RecvTimeoutError::Disconnected) => Some(Err(Error::Cancelled)),
        }
    }

    /// Non-blocking poll.
    pub fn try_outcome(&self) -> Option<TransactionOutcome> {
        self.outcome_rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::Message;

    fn request(hop: u32) -> (Message, Vec<u8>) {
        let mut msg = Message::request(306, 16_777_217);
        msg.hop_by_hop_id = hop;
        msg.end_to_end_id = 0xE2E0_0000 | hop;
        let wire = msg.encode().expect("encode");
        (msg, wire)
    }

    fn answer_for(req: &Message) -> Message {
        Message::answer_to(req)
    }

    #[test]
    fn test_match_delivers_answer_once() {
        let table = TransactionTable::new(16);
        let (msg, wire) = request(7);
        let handle = table.insert(&msg, &wire, 0).expect("insert");

        assert!(table.match_answer(answer_for(&msg)));
        // A duplicate answer with the same hop-by-hop id is discarded.
        assert!(!table.match_answer(answer_for(&msg)));

        let got = handle.wait().expect("answer delivered");
        assert_eq!(got.hop_by_hop_id, 7);
        assert!(table.is_empty());
    }

    #[test]
    fn test_unsolicited_answer_is_discarded() {
        let table = TransactionTable::new(16);
        let (msg, _) = request(99);
        assert!(!table.match_answer(answer_for(&msg)));
    }

    #[test]
    fn test_capacity_fails_before_send() {
        let table = TransactionTable::new(1);
        let (m1, w1) = request(1);
        let _h1 = table.insert(&m1, &w1, 0).expect("first insert");
        let (m2, w2) = request(2);
        match table.insert(&m2, &w2, 0).unwrap_err() {
            Error::Overloaded { pending: 1, limit: 1 } => {}
            other => std::panic::panic_any(format!("unexpected error {:?}", other)),
        }
    }

    #[test]
    fn test_deadline_retransmits_then_expires() {
        let table = TransactionTable::new(16);
        let (msg, wire) = request(5);
        let handle = table.insert(&msg, &wire, 1).expect("insert");

        match table.on_deadline(5) {
            DeadlineAction::Retransmit(bytes) => {
                // Identical contents except the T flag.
                assert_eq!(bytes.len(), wire.len());
                assert_eq!(bytes[4], wire[4] | FLAG_RETRANSMITTED);
                assert_eq!(&bytes[5..], &wire[5..]);
            }
            other => std::panic::panic_any(format!("expected retransmit, got {:?}", other)),
        }

        match table.on_deadline(5) {
            DeadlineAction::Expired => {}
            other => std::panic::panic_any(format!("expected expiry, got {:?}", other)),
        }
        assert!(matches!(
            handle.wait(),
            Err(Error::TransactionTimeout { hop_by_hop_id: 5 })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_answer_timeout_race_yields_one_outcome() {
        let table = Arc::new(TransactionTable::new(16));
        let (msg, wire) = request(11);
        let handle = table.insert(&msg, &wire, 0).expect("insert");

        let t1 = {
            let table = Arc::clone(&table);
            let ans = answer_for(&msg);
            std::thread::spawn(move || table.match_answer(ans))
        };
        let t2 = {
            let table = Arc::clone(&table);
            std::thread::spawn(move || matches!(table.on_deadline(11), DeadlineAction::Expired))
        };
        let matched = t1.join().expect("join");
        let expired = t2.join().expect("join");
        assert!(
            matched ^ expired,
            "exactly one of answer/timeout must win (matched={}, expired={})",
            matched,
            expired
        );

        // Exactly one outcome is on the channel either way.
        assert!(handle.try_outcome().is_some());
        assert!(handle.try_outcome().is_none());
    }

    #[test]
    fn test_cancel_suppresses_late_answer() {
        let table = TransactionTable::new(16);
        let (msg, wire) = request(21);
        let handle = table.insert(&msg, &wire, 3).expect("insert");

        assert!(table.cancel(21));
        assert!(!table.cancel(21));
        assert!(!table.match_answer(answer_for(&msg)));
        assert!(matches!(table.on_deadline(21), DeadlineAction::Stale));
        assert!(handle.try_outcome().is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_hop_by_hop_ids_unique_under_concurrency() {
        let table = Arc::new(TransactionTable::new(4096));
        let mut threads = Vec::new();
        for _ in 0..8 {
            let table = Arc::clone(&table);
            threads.push(std::thread::spawn(move || {
                (0..256).map(|_| table.allocate_hop_by_hop()).collect::<Vec<u32>>()
            }));
        }
        let mut all: Vec<u32> = threads
            .into_iter()
            .flat_map(|t| t.join().expect("join"))
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total, "allocated ids must be pairwise distinct");
    }
}
