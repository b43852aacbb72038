// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transaction deadline timer.
//!
//! A dedicated thread sleeps on a min-heap of deadlines and fires a callback
//! per expired hop-by-hop id. Insertion is O(log n); cancellation is lazy:
//! a fired deadline for a transaction that already reached a terminal state
//! is ignored by the transaction table's atomic state check, so nothing is
//! ever removed from the heap early.

use parking_lot::{Condvar, Mutex};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deadline {
    at: Instant,
    hop_by_hop_id: u32,
}

impl Ord for Deadline {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.at
            .cmp(&other.at)
            .then(self.hop_by_hop_id.cmp(&other.hop_by_hop_id))
    }
}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

struct TimerShared {
    queue: Mutex<BinaryHeap<Reverse<Deadline>>>,
    condvar: Condvar,
    shutdown: AtomicBool,
}

/// Cloneable scheduling capability, handed to whoever arms deadlines.
#[derive(Clone)]
pub struct TimerHandle {
    shared: Arc<TimerShared>,
}

impl TimerHandle {
    /// Arm a deadline for `hop_by_hop_id` at instant `at`.
    pub fn schedule(&self, hop_by_hop_id: u32, at: Instant) {
        let mut queue = self.shared.queue.lock();
        queue.push(Reverse(Deadline { at, hop_by_hop_id }));
        drop(queue);
        self.shared.condvar.notify_one();
    }

    pub fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }
}

/// Deadline timer thread owner. Dropping it stops the thread.
pub struct DeadlineTimer {
    shared: Arc<TimerShared>,
    thread: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    /// Spawn the timer thread. `on_expiry` runs on the timer thread for each
    /// fired deadline and must not block for long.
    pub fn spawn<F>(on_expiry: F) -> Self
    where
        F: Fn(u32) + Send + 'static,
    {
        let shared = Arc::new(TimerShared {
            queue: Mutex::new(BinaryHeap::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });
        let worker = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name("hdia-deadline".to_string())
            .spawn(move || Self::run(&worker, &on_expiry))
            .expect("spawning the deadline timer thread");
        Self {
            shared,
            thread: Some(thread),
        }
    }

    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn run<F: Fn(u32)>(shared: &TimerShared, on_expiry: &F) {
        let mut queue = shared.queue.lock();
        loop {
            if shared.shutdown.load(Ordering::Acquire) {
                return;
            }
            match queue.peek().copied() {
                None => {
                    shared.condvar.wait(&mut queue);
                }
                Some(Reverse(next)) => {
                    let now = Instant::now();
                    if next.at > now {
                        shared.condvar.wait_for(&mut queue, next.at - now);
                    } else {
                        queue.pop();
                        // Fire without holding the lock so callbacks may
                        // re-arm deadlines.
                        drop(queue);
                        on_expiry(next.hop_by_hop_id);
                        queue = shared.queue.lock();
                    }
                }
            }
        }
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.condvar.notify_all();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_deadlines_fire_in_order() {
        let (tx, rx) = mpsc::channel();
        let timer = DeadlineTimer::spawn(move |hop| {
            tx.send(hop).expect("test channel open");
        });
        let handle = timer.handle();

        let now = Instant::now();
        handle.schedule(3, now + Duration::from_millis(60));
        handle.schedule(1, now + Duration::from_millis(20));
        handle.schedule(2, now + Duration::from_millis(40));

        let mut fired = Vec::new();
        for _ in 0..3 {
            fired.push(
                rx.recv_timeout(Duration::from_secs(2))
                    .expect("deadline should fire"),
            );
        }
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_past_deadline_fires_immediately() {
        let (tx, rx) = mpsc::channel();
        let timer = DeadlineTimer::spawn(move |hop| {
            tx.send(hop).expect("test channel open");
        });
        timer.handle().schedule(7, Instant::now());
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2))
                .expect("deadline should fire"),
            7
        );
    }

    #[test]
    fn test_callback_may_rearm() {
        let (tx, rx) = mpsc::channel();
        let rearm: Arc<Mutex<Option<TimerHandle>>> = Arc::new(Mutex::new(None));
        let rearm_in_cb = Arc::clone(&rearm);
        let timer = DeadlineTimer::spawn(move |hop| {
            if hop < 10 {
                if let Some(handle) = rearm_in_cb.lock().as_ref() {
                    handle.schedule(hop + 1, Instant::now());
                }
            }
            tx.send(hop).expect("test channel open");
        });
        *rearm.lock() = Some(timer.handle());

        timer.handle().schedule(9, Instant::now());
        let first = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("first expiry");
        let second = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("re-armed expiry");
        assert_eq!((first, second), (9, 10));
    }

    #[test]
    fn test_drop_stops_the_thread() {
        let timer = DeadlineTimer::spawn(|_| {});
        timer
            .handle()
            .schedule(1, Instant::now() + Duration::from_secs(3600));
        drop(timer); // must not hang on the distant deadline
    }
}
