// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequence state machine.
//!
//! Drives one active segment through reveal/replay/validate cycles: play
//! the currently revealed prefix on the beat grid, build the expected
//! click timeline, validate clicks by position, and decide whether a
//! correct round grows the reveal, solves the segment, or a wrong click
//! replays the round.

use tracing::debug;

use crate::game::{
    GameSession, OBJECT_PLAY_DURATION, ROUND_SETTLE_DELAY, SETTLE_DELAY, WRONG_RESTART_DELAY,
};
use crate::object::ObjectId;
use crate::scheduler::{ActionKind, ActionScheduler, Role};
use crate::segment::Segment;
use crate::stage::Stage;
use crate::timing::{Grade, GradeWindows, MasterClock};

/// Phase of the sequence state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round in flight.
    Idle,
    /// The revealed prefix is being played back to the player.
    RevealPlaying,
    /// The player is reproducing the sequence.
    AwaitingInput,
}

/// What a processed click meant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Out-of-context click, silently dropped.
    Ignored,
    /// Correct click mid-round.
    Progress { grade: Grade },
    /// Correct click finishing the round; a longer reveal follows.
    RoundComplete { grade: Grade },
    /// Correct click finishing the fully revealed segment.
    SegmentSolved { grade: Grade },
    /// Wrong object; the round will replay at the same length.
    Wrong { position: usize },
}

/// The reveal/await/validate engine for the active segment.
///
/// Owns no session state itself; it acts on the director's [`GameSession`]
/// and the shared scheduler so that restart stays atomic.
#[derive(Debug, Clone)]
pub struct SequenceEngine {
    grader: GradeWindows,
}

impl SequenceEngine {
    /// Create an engine grading clicks with the given windows.
    pub fn new(grader: GradeWindows) -> Self {
        Self { grader }
    }

    /// The grading windows in use.
    pub fn grader(&self) -> &GradeWindows {
        &self.grader
    }

    /// Schedule a reveal round for the revealed prefix of `segment`.
    ///
    /// The round start is aligned to the segment's own cycle grid via the
    /// master clock, so replays land on the same pulse as everything else.
    /// Any pending reveal schedule is cancelled first.
    pub fn start_round(
        &self,
        session: &mut GameSession,
        segment: &Segment,
        clock: &MasterClock,
        scheduler: &mut ActionScheduler,
        now: f64,
    ) {
        scheduler.cancel_role(Role::Reveal);
        session.awaiting_input = false;
        session.input_index = 0;
        session.expected.clear();
        session.phase = Phase::RevealPlaying;

        let elements = session.revealed_len.min(segment.len());
        if elements == 0 {
            debug!(segment = segment.name(), "empty segment, nothing to reveal");
            session.phase = Phase::Idle;
            return;
        }

        let timing = segment.timing();
        let round_start = now + clock.next_beat(now, timing.total_cycle_duration);

        for i in 0..elements {
            if let Some(object) = segment.object_at(i) {
                scheduler.schedule(
                    round_start + i as f64 * timing.inter_object_delay,
                    Role::Reveal,
                    ActionKind::PlayObject {
                        object,
                        colored: segment.is_completed(),
                    },
                );
            }
        }

        let round_duration = timing.round_duration(elements, OBJECT_PLAY_DURATION);
        scheduler.schedule(
            round_start + round_duration,
            Role::Reveal,
            ActionKind::BeginInput {
                segment: session.segment_index,
            },
        );
    }

    /// The reveal round just finished playing: build the expected click
    /// timeline and start consuming input.
    ///
    /// Position `i` is expected at `now + i * inter_object_delay`.
    pub fn begin_input(&self, session: &mut GameSession, segment: &Segment, now: f64) {
        let elements = session.revealed_len.min(segment.len());
        session.expected = (0..elements)
            .map(|i| now + i as f64 * segment.timing().inter_object_delay)
            .collect();
        session.input_index = 0;
        session.awaiting_input = true;
        session.phase = Phase::AwaitingInput;
    }

    /// Process a click on an object belonging to the active segment.
    ///
    /// Validation is position-indexed: the click is compared against
    /// `objects[input_index]`, never searched by identity, so an object
    /// appearing twice in one segment stays unambiguous.
    pub fn handle_click<S: Stage>(
        &self,
        session: &mut GameSession,
        segment: &Segment,
        scheduler: &mut ActionScheduler,
        stage: &mut S,
        clicked: ObjectId,
        now: f64,
    ) -> ClickOutcome {
        if !session.awaiting_input || session.phase != Phase::AwaitingInput {
            debug!(%clicked, "click outside input window, ignoring");
            return ClickOutcome::Ignored;
        }

        let Some(expected_object) = segment.object_at(session.input_index) else {
            debug!(%clicked, "no expected object at cursor, ignoring");
            return ClickOutcome::Ignored;
        };

        if clicked != expected_object {
            return self.fail_round(session, segment, scheduler, stage, clicked, now);
        }

        let position = session.input_index;
        let expected_at = session.expected.get(position).copied().unwrap_or(now);
        let grade = self.grader.grade(expected_at, now);
        stage.show_timing_feedback(grade, position);
        session.input_index += 1;

        if session.input_index < session.revealed_len {
            return ClickOutcome::Progress { grade };
        }

        // Round reproduced in full.
        session.awaiting_input = false;
        session.phase = Phase::Idle;
        scheduler.cancel_role(Role::Reveal);

        if session.revealed_len >= segment.len() {
            // Whole segment solved: final highlight now, permanent
            // coloring after the settle delay.
            for &id in segment.objects() {
                stage.highlight_temporary(id);
            }
            scheduler.schedule(
                now + SETTLE_DELAY,
                Role::Reveal,
                ActionKind::SegmentSolved {
                    segment: session.segment_index,
                },
            );
            ClickOutcome::SegmentSolved { grade }
        } else {
            scheduler.schedule(
                now + ROUND_SETTLE_DELAY,
                Role::Reveal,
                ActionKind::RoundComplete {
                    segment: session.segment_index,
                },
            );
            ClickOutcome::RoundComplete { grade }
        }
    }

    /// A completed round settled: celebrate the revealed prefix and grow
    /// the reveal by one. The caller starts the next round.
    pub fn advance_reveal<S: Stage>(
        &self,
        session: &mut GameSession,
        segment: &Segment,
        stage: &mut S,
    ) {
        let revealed = session.revealed_len.min(segment.len());
        for i in 0..revealed {
            if let Some(id) = segment.object_at(i) {
                stage.highlight_temporary(id);
            }
        }
        session.revealed_len = (session.revealed_len + 1).min(segment.len());
        session.reset_input();
        session.phase = Phase::Idle;
    }

    fn fail_round<S: Stage>(
        &self,
        session: &mut GameSession,
        segment: &Segment,
        scheduler: &mut ActionScheduler,
        stage: &mut S,
        clicked: ObjectId,
        now: f64,
    ) -> ClickOutcome {
        let position = session.input_index;
        stage.highlight_wrong_selected(clicked);

        let others: Vec<ObjectId> = segment
            .objects()
            .iter()
            .copied()
            .filter(|&id| id != clicked)
            .collect();
        stage.highlight_wrong_others(&others);

        // Only the input cursor resets; the revealed length is kept and
        // the round replays from the start.
        session.reset_input();
        session.phase = Phase::Idle;
        scheduler.cancel_role(Role::Reveal);
        scheduler.schedule(
            now + WRONG_RESTART_DELAY,
            Role::Reveal,
            ActionKind::RestartRound {
                segment: session.segment_index,
            },
        );

        ClickOutcome::Wrong { position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentTiming;
    use crate::stage::{MemoryStage, StageEvent};

    fn engine() -> SequenceEngine {
        SequenceEngine::new(GradeWindows::default())
    }

    fn segment() -> Segment {
        Segment::new(
            "test",
            vec![ObjectId(0), ObjectId(1), ObjectId(2)],
            SegmentTiming {
                start_delay: 0.0,
                inter_object_delay: 1.0,
                total_cycle_duration: 5.0,
            },
        )
    }

    struct Fixture {
        session: GameSession,
        segment: Segment,
        clock: MasterClock,
        scheduler: ActionScheduler,
        stage: MemoryStage,
    }

    fn fixture() -> Fixture {
        Fixture {
            session: GameSession::new(),
            segment: segment(),
            clock: MasterClock::new(0.0),
            scheduler: ActionScheduler::new(),
            stage: MemoryStage::new(),
        }
    }

    /// Drive the fixture to awaiting-input with `revealed` objects, with
    /// the expected timeline starting at `start`.
    fn await_input(f: &mut Fixture, revealed: usize, start: f64) {
        f.session.revealed_len = revealed;
        engine().begin_input(&mut f.session, &f.segment, start);
    }

    #[test]
    fn test_start_round_schedules_plays_and_begin_input() {
        let mut f = fixture();
        engine().start_round(
            &mut f.session,
            &f.segment,
            &f.clock,
            &mut f.scheduler,
            0.0,
        );

        // One revealed object: one play plus the begin-input marker.
        assert_eq!(f.scheduler.pending_for_role(Role::Reveal), 2);
        assert_eq!(f.session.phase, Phase::RevealPlaying);

        // Round start aligns to the 5-unit cycle grid: first play at 5.0,
        // input opens one play-duration later.
        let due = f.scheduler.poll(10.0);
        assert_eq!(due[0].due_micros, 5_000_000);
        assert!(matches!(due[0].kind, ActionKind::PlayObject { .. }));
        assert_eq!(due[1].due_micros, 6_000_000);
        assert!(matches!(due[1].kind, ActionKind::BeginInput { .. }));
    }

    #[test]
    fn test_start_round_spacing() {
        let mut f = fixture();
        f.session.revealed_len = 3;
        engine().start_round(
            &mut f.session,
            &f.segment,
            &f.clock,
            &mut f.scheduler,
            0.0,
        );

        let due = f.scheduler.poll(20.0);
        // Plays at 5, 6, 7; input opens at 7 + 1 = 8.
        let times: Vec<u64> = due.iter().map(|a| a.due_micros).collect();
        assert_eq!(times, vec![5_000_000, 6_000_000, 7_000_000, 8_000_000]);
    }

    #[test]
    fn test_start_round_cancels_previous_reveal() {
        let mut f = fixture();
        engine().start_round(
            &mut f.session,
            &f.segment,
            &f.clock,
            &mut f.scheduler,
            0.0,
        );
        let first_count = f.scheduler.len();
        engine().start_round(
            &mut f.session,
            &f.segment,
            &f.clock,
            &mut f.scheduler,
            0.1,
        );
        // No stale schedules accumulate.
        assert_eq!(f.scheduler.len(), first_count);
    }

    #[test]
    fn test_begin_input_builds_timeline() {
        let mut f = fixture();
        f.session.revealed_len = 3;
        engine().begin_input(&mut f.session, &f.segment, 8.0);

        assert!(f.session.awaiting_input);
        assert_eq!(f.session.phase, Phase::AwaitingInput);
        assert_eq!(f.session.expected, vec![8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_correct_click_progresses() {
        let mut f = fixture();
        await_input(&mut f, 2, 10.0);

        let outcome = engine().handle_click(
            &mut f.session,
            &f.segment,
            &mut f.scheduler,
            &mut f.stage,
            ObjectId(0),
            10.05,
        );

        assert_eq!(
            outcome,
            ClickOutcome::Progress {
                grade: Grade::Perfect
            }
        );
        assert_eq!(f.session.input_index, 1);
        assert_eq!(
            f.stage.events()[0],
            StageEvent::Feedback {
                grade: Grade::Perfect,
                position: 0
            }
        );
    }

    #[test]
    fn test_round_completion_schedules_settle() {
        let mut f = fixture();
        await_input(&mut f, 1, 10.0);

        let outcome = engine().handle_click(
            &mut f.session,
            &f.segment,
            &mut f.scheduler,
            &mut f.stage,
            ObjectId(0),
            10.0,
        );

        assert!(matches!(outcome, ClickOutcome::RoundComplete { .. }));
        assert!(!f.session.awaiting_input);
        let due = f.scheduler.poll(10.0 + ROUND_SETTLE_DELAY);
        assert_eq!(due.len(), 1);
        assert!(matches!(due[0].kind, ActionKind::RoundComplete { .. }));
    }

    #[test]
    fn test_segment_solved_on_final_click() {
        let mut f = fixture();
        await_input(&mut f, 3, 10.0);

        for (i, t) in [(0usize, 10.0f64), (1, 11.0), (2, 12.0)] {
            let outcome = engine().handle_click(
                &mut f.session,
                &f.segment,
                &mut f.scheduler,
                &mut f.stage,
                ObjectId(i),
                t,
            );
            if i < 2 {
                assert!(matches!(outcome, ClickOutcome::Progress { .. }));
            } else {
                assert!(matches!(outcome, ClickOutcome::SegmentSolved { .. }));
            }
        }

        // Final highlight fired on every object.
        let happy = f
            .stage
            .count(|e| matches!(e, StageEvent::Temporary(_)));
        assert_eq!(happy, 3);

        // The settle action is pending.
        let due = f.scheduler.poll(12.0 + SETTLE_DELAY);
        assert_eq!(due.len(), 1);
        assert!(matches!(due[0].kind, ActionKind::SegmentSolved { .. }));
    }

    #[test]
    fn test_wrong_click_resets_input_keeps_reveal() {
        let mut f = fixture();
        await_input(&mut f, 2, 10.0);

        // First click correct, second wrong.
        engine().handle_click(
            &mut f.session,
            &f.segment,
            &mut f.scheduler,
            &mut f.stage,
            ObjectId(0),
            10.0,
        );
        let outcome = engine().handle_click(
            &mut f.session,
            &f.segment,
            &mut f.scheduler,
            &mut f.stage,
            ObjectId(2),
            11.0,
        );

        assert_eq!(outcome, ClickOutcome::Wrong { position: 1 });
        assert_eq!(f.session.input_index, 0);
        // The reveal length survives: the round replays at the same L.
        assert_eq!(f.session.revealed_len, 2);
        assert!(!f.session.awaiting_input);

        // Wrong highlights: clicked object plus the others.
        assert_eq!(
            f.stage
                .count(|e| matches!(e, StageEvent::WrongSelected(_))),
            1
        );
        assert_eq!(
            f.stage.events().last(),
            Some(&StageEvent::WrongOthers(vec![ObjectId(0), ObjectId(1)]))
        );

        // A restart-round action replaces the reveal schedule.
        let due = f.scheduler.poll(11.0 + WRONG_RESTART_DELAY);
        assert_eq!(due.len(), 1);
        assert!(matches!(due[0].kind, ActionKind::RestartRound { .. }));
    }

    #[test]
    fn test_click_ignored_when_not_awaiting() {
        let mut f = fixture();
        let outcome = engine().handle_click(
            &mut f.session,
            &f.segment,
            &mut f.scheduler,
            &mut f.stage,
            ObjectId(0),
            1.0,
        );
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert!(f.stage.events().is_empty());
        assert!(f.scheduler.is_empty());
    }

    #[test]
    fn test_advance_reveal() {
        let mut f = fixture();
        f.session.revealed_len = 2;
        engine().advance_reveal(&mut f.session, &f.segment, &mut f.stage);

        assert_eq!(f.session.revealed_len, 3);
        assert_eq!(f.session.input_index, 0);
        // Happy highlight on the previously revealed prefix only.
        assert_eq!(
            f.stage.count(|e| matches!(e, StageEvent::Temporary(_))),
            2
        );
    }

    #[test]
    fn test_advance_reveal_clamps_at_segment_len() {
        let mut f = fixture();
        f.session.revealed_len = 3;
        engine().advance_reveal(&mut f.session, &f.segment, &mut f.stage);
        assert_eq!(f.session.revealed_len, 3);
    }

    #[test]
    fn test_late_click_still_counts() {
        let mut f = fixture();
        await_input(&mut f, 2, 10.0);

        let outcome = engine().handle_click(
            &mut f.session,
            &f.segment,
            &mut f.scheduler,
            &mut f.stage,
            ObjectId(0),
            13.0,
        );

        // Way off the expected time, but the object matched.
        assert_eq!(outcome, ClickOutcome::Progress { grade: Grade::Late });
        assert_eq!(f.session.input_index, 1);
    }

    #[test]
    fn test_duplicate_object_validated_by_position() {
        let mut f = fixture();
        f.segment = Segment::new(
            "echo",
            vec![ObjectId(0), ObjectId(1), ObjectId(0)],
            SegmentTiming::default(),
        );
        await_input(&mut f, 3, 10.0);

        // The duplicate object is correct at position 0 and at position 2.
        assert!(matches!(
            engine().handle_click(
                &mut f.session,
                &f.segment,
                &mut f.scheduler,
                &mut f.stage,
                ObjectId(0),
                10.0,
            ),
            ClickOutcome::Progress { .. }
        ));
        assert!(matches!(
            engine().handle_click(
                &mut f.session,
                &f.segment,
                &mut f.scheduler,
                &mut f.stage,
                ObjectId(1),
                11.0,
            ),
            ClickOutcome::Progress { .. }
        ));
        assert!(matches!(
            engine().handle_click(
                &mut f.session,
                &f.segment,
                &mut f.scheduler,
                &mut f.stage,
                ObjectId(0),
                12.0,
            ),
            ClickOutcome::SegmentSolved { .. }
        ));
    }

    #[test]
    fn test_reveal_plays_colored_after_completion() {
        let mut f = fixture();
        f.segment.set_completed();
        engine().start_round(
            &mut f.session,
            &f.segment,
            &f.clock,
            &mut f.scheduler,
            0.0,
        );

        let due = f.scheduler.poll(20.0);
        assert!(matches!(
            due[0].kind,
            ActionKind::PlayObject { colored: true, .. }
        ));
    }
}
