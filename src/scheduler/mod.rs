// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cancellable action scheduler.
//!
//! A priority queue of game actions with microsecond-precision due times.
//! Every schedule is tagged with a [`Role`]; cancelling a role removes all
//! of its pending actions in one operation, so starting a new reveal round
//! or a new background loop for a segment never leaves stale callbacks
//! behind.
//!
//! Scheduling is non-blocking: callers enqueue and return, then drain due
//! actions from `poll` on the shared frame clock.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::object::ObjectId;
use crate::timing::units_to_micros;

/// Logical owner of a schedule, used as the cancellation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The foreground reveal/await cycle of the active segment.
    Reveal,
    /// The background loop of one segment, keyed by segment index.
    Loop(usize),
    /// Segment-to-segment progression and restart.
    Progression,
}

/// What to do when an action comes due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Trigger the play/highlight animation of one object.
    PlayObject { object: ObjectId, colored: bool },
    /// The reveal round has finished playing; start listening for clicks.
    BeginInput { segment: usize },
    /// A correct round settled; celebrate and reveal one more object.
    RoundComplete { segment: usize },
    /// A wrong click settled; replay the round at the same length.
    RestartRound { segment: usize },
    /// The final click settled; color the segment and hand it onward.
    SegmentSolved { segment: usize },
    /// One iteration of a background segment loop.
    LoopCycle { segment: usize },
    /// Begin the segment at the given index.
    StartSegment { index: usize },
}

/// A scheduled game action.
#[derive(Debug, Clone)]
pub struct ScheduledAction {
    /// Due time in microseconds.
    pub due_micros: u64,
    /// Insertion counter, so simultaneous actions pop in FIFO order.
    seq: u64,
    /// Cancellation tag.
    pub role: Role,
    /// Payload.
    pub kind: ActionKind,
}

impl Eq for ScheduledAction {}

impl PartialEq for ScheduledAction {
    fn eq(&self, other: &Self) -> bool {
        self.due_micros == other.due_micros && self.seq == other.seq
    }
}

impl Ord for ScheduledAction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior; seq breaks ties FIFO.
        other
            .due_micros
            .cmp(&self.due_micros)
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of pending game actions.
pub struct ActionScheduler {
    queue: BinaryHeap<ScheduledAction>,
    next_seq: u64,
}

impl ActionScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::with_capacity(64),
            next_seq: 0,
        }
    }

    /// Schedule an action at an absolute time in units.
    pub fn schedule(&mut self, due_units: f64, role: Role, kind: ActionKind) {
        let action = ScheduledAction {
            due_micros: units_to_micros(due_units),
            seq: self.next_seq,
            role,
            kind,
        };
        self.next_seq += 1;
        self.queue.push(action);
    }

    /// Drain every action due at or before `now`, in time order.
    pub fn poll(&mut self, now_units: f64) -> Vec<ScheduledAction> {
        let now_micros = units_to_micros(now_units);
        let mut due = Vec::new();

        while let Some(action) = self.queue.peek() {
            if action.due_micros <= now_micros {
                due.push(self.queue.pop().unwrap());
            } else {
                break;
            }
        }

        due
    }

    /// Remove every pending action owned by `role`.
    pub fn cancel_role(&mut self, role: Role) {
        let kept: Vec<ScheduledAction> =
            self.queue.drain().filter(|a| a.role != role).collect();
        for action in kept {
            self.queue.push(action);
        }
    }

    /// Remove everything (game restart).
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending actions owned by `role`.
    pub fn pending_for_role(&self, role: Role) -> usize {
        self.queue.iter().filter(|a| a.role == role).count()
    }

    /// Due time of the earliest pending action, in units.
    pub fn next_due(&self) -> Option<f64> {
        self.queue
            .peek()
            .map(|a| crate::timing::micros_to_units(a.due_micros))
    }
}

impl Default for ActionScheduler {
    fn default() -> Self {
        Self::new()
    }
}
