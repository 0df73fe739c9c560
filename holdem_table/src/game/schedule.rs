//! Delayed continuations for a single table.
//!
//! Every timer-driven step of a hand (the big blind after the small blind,
//! the next street during a lockup, the next hand after settlement and the
//! turn countdown) is queued here with the table's epoch at scheduling
//! time. The owner drains due entries and drops any whose epoch has moved
//! on, so there is never a need to cancel anything.

use serde::Serialize;
use std::collections::VecDeque;

/// Identifies the flow a continuation belongs to. `hand` changes with every
/// new hand; `step` changes with every action or street transition.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct Epoch {
    pub hand: u64,
    pub step: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Continuation {
    PostBigBlind,
    CountdownTick,
    DealStreet,
    NextHand,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Scheduled {
    pub due_ms: u64,
    pub epoch: Epoch,
    pub continuation: Continuation,
}

/// Continuations ordered by due time, ties in insertion order.
#[derive(Debug, Default)]
pub struct Schedule {
    queue: VecDeque<Scheduled>,
}

impl Schedule {
    pub fn push(&mut self, due_ms: u64, epoch: Epoch, continuation: Continuation) {
        let idx = self.queue.partition_point(|s| s.due_ms <= due_ms);
        self.queue.insert(
            idx,
            Scheduled {
                due_ms,
                epoch,
                continuation,
            },
        );
    }

    /// Remove and return the earliest continuation due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Scheduled> {
        match self.queue.front() {
            Some(next) if next.due_ms <= now_ms => self.queue.pop_front(),
            _ => None,
        }
    }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.front().map(|s| s.due_ms)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
