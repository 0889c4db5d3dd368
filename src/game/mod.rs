// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Game core.
//!
//! This module provides the memory-game machinery:
//! - The consolidated per-session state
//! - The sequence state machine driving reveal/await/validate rounds
//! - The background loop manager for completed segments
//! - The top-level game director

pub mod director;
pub mod looper;
pub mod sequence;

pub use director::{GameDirector, GameOptions};
pub use looper::{LoopHandle, SegmentLoopManager};
pub use sequence::{ClickOutcome, Phase, SequenceEngine};

/// Play/highlight duration of a single object, in time units.
pub const OBJECT_PLAY_DURATION: f64 = 1.0;

/// Settle delay between the final correct click and permanent coloring.
pub const SETTLE_DELAY: f64 = 1.0;

/// Settle delay between a completed round and its happy celebration.
pub const ROUND_SETTLE_DELAY: f64 = 0.5;

/// Delay before replaying a round after a wrong click (the length of the
/// wrong-highlight animation).
pub const WRONG_RESTART_DELAY: f64 = 1.0;

/// Consolidated state of the running session.
///
/// Exactly one segment is actively played at a time; any number of
/// completed segments may loop in the background independently of this
/// state.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    /// Index of the actively played segment.
    pub segment_index: usize,
    /// How many objects of the segment are currently revealed.
    pub revealed_len: usize,
    /// Position of the next expected click within the revealed prefix.
    pub input_index: usize,
    /// Whether player clicks are currently consumed.
    pub awaiting_input: bool,
    /// Expected click timestamps for the current reveal round, one per
    /// revealed position. Rebuilt whenever a round starts awaiting input.
    pub expected: Vec<f64>,
    /// Current phase of the sequence state machine.
    pub phase: Phase,
}

impl GameSession {
    /// Fresh session state pointing at segment 0.
    pub fn new() -> Self {
        Self {
            segment_index: 0,
            revealed_len: 1,
            input_index: 0,
            awaiting_input: false,
            expected: Vec::new(),
            phase: Phase::Idle,
        }
    }

    /// Reset for the start of a segment: one revealed object, no input.
    pub fn reset_for_segment(&mut self, index: usize) {
        self.segment_index = index;
        self.revealed_len = 1;
        self.input_index = 0;
        self.awaiting_input = false;
        self.expected.clear();
        self.phase = Phase::Idle;
    }

    /// Reset only the input cursor (wrong click, round replay).
    pub fn reset_input(&mut self) {
        self.input_index = 0;
        self.awaiting_input = false;
        self.expected.clear();
    }

    /// Invariant from the data model:
    /// `0 <= input_index <= revealed_len <= segment length`.
    pub fn invariant_holds(&self, segment_len: usize) -> bool {
        self.input_index <= self.revealed_len && self.revealed_len <= segment_len
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session() {
        let session = GameSession::new();
        assert_eq!(session.segment_index, 0);
        assert_eq!(session.revealed_len, 1);
        assert_eq!(session.input_index, 0);
        assert!(!session.awaiting_input);
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn test_reset_for_segment() {
        let mut session = GameSession::new();
        session.revealed_len = 4;
        session.input_index = 2;
        session.awaiting_input = true;
        session.expected = vec![1.0, 2.0];

        session.reset_for_segment(3);
        assert_eq!(session.segment_index, 3);
        assert_eq!(session.revealed_len, 1);
        assert_eq!(session.input_index, 0);
        assert!(!session.awaiting_input);
        assert!(session.expected.is_empty());
    }

    #[test]
    fn test_reset_input_keeps_reveal_progress() {
        let mut session = GameSession::new();
        session.revealed_len = 3;
        session.input_index = 2;
        session.awaiting_input = true;

        session.reset_input();
        assert_eq!(session.revealed_len, 3);
        assert_eq!(session.input_index, 0);
        assert!(!session.awaiting_input);
    }

    #[test]
    fn test_invariant() {
        let mut session = GameSession::new();
        session.revealed_len = 3;
        session.input_index = 3;
        assert!(session.invariant_holds(3));
        assert!(!session.invariant_holds(2));

        session.input_index = 4;
        assert!(!session.invariant_holds(5));
    }
}
