// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Background segment loops.
//!
//! Completed segments keep playing forever behind the foreground game.
//! Each loop waits the segment's start delay, plays every object spaced by
//! the inter-object delay, waits out the remaining end-delay, and repeats
//! at the total cycle duration. New loops begin on the shared master beat
//! grid so that all looping segments pulse in phase.

use std::collections::HashMap;

use tracing::debug;

use crate::scheduler::{ActionKind, ActionScheduler, Role};
use crate::segment::Segment;
use crate::timing::MasterClock;

/// Bookkeeping for one running loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopHandle {
    /// When the loop's first cycle was scheduled.
    pub started_at: f64,
    /// Completed cycle count.
    pub cycles: u64,
}

/// Runs zero or more background loops, one per completed segment.
///
/// The manager owns the loop lifecycle exclusively: it is the only writer
/// of a segment's `looping` flag, and at most one schedule exists per
/// segment at any time.
#[derive(Debug, Default)]
pub struct SegmentLoopManager {
    handles: HashMap<usize, LoopHandle>,
}

impl SegmentLoopManager {
    /// Create a manager with no running loops.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the background loop for `segment`.
    ///
    /// An existing loop for the same segment is cancelled first, so one
    /// segment never plays over itself. The first cycle is aligned to the
    /// next `master_beat_interval` grid point.
    pub fn start_loop(
        &mut self,
        seg_index: usize,
        segment: &mut Segment,
        clock: &MasterClock,
        scheduler: &mut ActionScheduler,
        master_beat_interval: f64,
        now: f64,
    ) {
        if self.handles.contains_key(&seg_index) {
            debug!(segment = segment.name(), "restarting background loop");
            scheduler.cancel_role(Role::Loop(seg_index));
        }

        let offset = clock.next_beat(now, master_beat_interval);
        scheduler.schedule(
            now + offset,
            Role::Loop(seg_index),
            ActionKind::LoopCycle { segment: seg_index },
        );

        self.handles.insert(
            seg_index,
            LoopHandle {
                started_at: now + offset,
                cycles: 0,
            },
        );
        segment.set_looping(true);
    }

    /// Run one loop cycle starting at `now`: fan out the object plays and
    /// schedule the next cycle one period later.
    ///
    /// Delays are clamped into `[0, 10]` units by the segment timing math,
    /// so misconfigured data cannot produce pathological waits.
    pub fn run_cycle(
        &mut self,
        seg_index: usize,
        segment: &Segment,
        scheduler: &mut ActionScheduler,
        now: f64,
    ) {
        if !self.handles.contains_key(&seg_index) {
            // Cycle for a loop that was stopped; drop it.
            return;
        }

        let timing = segment.timing();
        let start_delay = timing.clamped_start_delay();

        for (i, &object) in segment.objects().iter().enumerate() {
            scheduler.schedule(
                now + start_delay + i as f64 * timing.inter_object_delay,
                Role::Loop(seg_index),
                ActionKind::PlayObject {
                    object,
                    colored: true,
                },
            );
        }

        // The cycle period is start delay + playback + clamped end-delay.
        let period =
            start_delay + timing.playback_span(segment.len()) + segment.end_delay();
        scheduler.schedule(
            now + period,
            Role::Loop(seg_index),
            ActionKind::LoopCycle { segment: seg_index },
        );

        if let Some(handle) = self.handles.get_mut(&seg_index) {
            handle.cycles += 1;
        }
    }

    /// Stop the loop for one segment.
    pub fn stop_loop(
        &mut self,
        seg_index: usize,
        segment: &mut Segment,
        scheduler: &mut ActionScheduler,
    ) {
        if self.handles.remove(&seg_index).is_some() {
            scheduler.cancel_role(Role::Loop(seg_index));
            debug!(segment = segment.name(), "stopped background loop");
        }
        segment.set_looping(false);
    }

    /// Stop every loop (game restart).
    pub fn stop_all(&mut self, segments: &mut [Segment], scheduler: &mut ActionScheduler) {
        for (&seg_index, _) in self.handles.iter() {
            scheduler.cancel_role(Role::Loop(seg_index));
            if let Some(segment) = segments.get_mut(seg_index) {
                segment.set_looping(false);
            }
        }
        self.handles.clear();
    }

    /// Whether a loop is running for the segment.
    pub fn is_looping(&self, seg_index: usize) -> bool {
        self.handles.contains_key(&seg_index)
    }

    /// The handle for a running loop.
    pub fn handle(&self, seg_index: usize) -> Option<&LoopHandle> {
        self.handles.get(&seg_index)
    }

    /// Number of running loops.
    pub fn active_count(&self) -> usize {
        self.handles.len()
    }
}
