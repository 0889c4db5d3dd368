// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Game segments.
//!
//! A segment is an ordered group of musical objects forming one round of
//! the memory game, plus the timing parameters that shape its playback
//! cycle: a start delay, an inter-object delay, and a total cycle duration.
//! Whatever remains of the cycle after the objects have played is the
//! implicit end-delay.

use tracing::warn;

use crate::object::ObjectId;

/// Upper bound for configured or derived delays, in time units.
pub const MAX_CONFIGURED_DELAY: f64 = 10.0;

/// Per-segment timing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTiming {
    /// Delay before the first object of a cycle.
    pub start_delay: f64,
    /// Spacing between consecutive objects.
    pub inter_object_delay: f64,
    /// Total duration of one playback cycle.
    pub total_cycle_duration: f64,
}

impl Default for SegmentTiming {
    fn default() -> Self {
        Self {
            start_delay: 0.0,
            inter_object_delay: 1.0,
            total_cycle_duration: 5.0,
        }
    }
}

impl SegmentTiming {
    /// Time spent playing `object_count` objects spaced by the
    /// inter-object delay.
    pub fn playback_span(&self, object_count: usize) -> f64 {
        object_count as f64 * self.inter_object_delay
    }

    /// Start delay clamped into `[0, MAX_CONFIGURED_DELAY]`.
    pub fn clamped_start_delay(&self) -> f64 {
        clamp_delay(self.start_delay, "start delay")
    }

    /// Remainder of the cycle after the start delay and object playback,
    /// clamped into `[0, MAX_CONFIGURED_DELAY]`.
    ///
    /// A negative remainder means the configured cycle is too short for
    /// the object count; timing degrades gracefully instead of failing.
    pub fn end_delay(&self, object_count: usize) -> f64 {
        let raw = self.total_cycle_duration - self.start_delay - self.playback_span(object_count);
        clamp_delay(raw, "end delay")
    }

    /// Duration of one reveal round playing `elements` objects: the last
    /// object starts at `(elements - 1) * inter_object_delay` and plays for
    /// one object-play unit.
    pub fn round_duration(&self, elements: usize, play_duration: f64) -> f64 {
        if elements == 0 {
            return 0.0;
        }
        (elements - 1) as f64 * self.inter_object_delay + play_duration
    }
}

fn clamp_delay(value: f64, what: &str) -> f64 {
    if value < 0.0 {
        warn!(value, what, "negative delay, clamping to zero");
        0.0
    } else if value > MAX_CONFIGURED_DELAY {
        warn!(value, what, "delay above bound, clamping");
        MAX_CONFIGURED_DELAY
    } else {
        value
    }
}

/// An ordered group of musical objects with its playback timing.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Segment name.
    name: String,
    /// Ordered object identities. The same object may appear in several
    /// segments; validation is position-indexed so duplicates within one
    /// segment stay unambiguous.
    objects: Vec<ObjectId>,
    /// Playback timing parameters.
    timing: SegmentTiming,
    /// Set once the player has reproduced the full sequence.
    completed: bool,
    /// Set while a background loop is running for this segment.
    looping: bool,
}

impl Segment {
    /// Create a segment.
    pub fn new(name: impl Into<String>, objects: Vec<ObjectId>, timing: SegmentTiming) -> Self {
        Self {
            name: name.into(),
            objects,
            timing,
            completed: false,
            looping: false,
        }
    }

    /// Segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the segment has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ordered object identities.
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Object at a sequence position.
    pub fn object_at(&self, position: usize) -> Option<ObjectId> {
        self.objects.get(position).copied()
    }

    /// Whether the segment references the object at any position.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    /// Playback timing parameters.
    pub fn timing(&self) -> &SegmentTiming {
        &self.timing
    }

    /// End-delay for this segment's full object list.
    pub fn end_delay(&self) -> f64 {
        self.timing.end_delay(self.objects.len())
    }

    /// Whether the player has solved this segment.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Mark the segment solved.
    pub fn set_completed(&mut self) {
        self.completed = true;
    }

    /// Whether a background loop is running.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Record the background-loop state.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Reset to initial state (game restart).
    pub fn reset(&mut self) {
        self.completed = false;
        self.looping = false;
    }
}
