// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Game director.
//!
//! Owns the segment list and every shared service — object bank, click
//! registry, master clock, action scheduler, loop manager, camera rig —
//! and drives the game from segment to segment. All delayed work runs
//! through the shared scheduler, so one `tick` call advances the whole
//! cooperative timeline and a restart is a single atomic reset.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::game::looper::SegmentLoopManager;
use crate::game::sequence::{ClickOutcome, SequenceEngine};
use crate::game::GameSession;
use crate::object::{ObjectBank, ObjectId};
use crate::scheduler::{ActionKind, ActionScheduler, Role, ScheduledAction};
use crate::segment::Segment;
use crate::stage::{CameraRig, Stage};
use crate::timing::{GradeWindows, MasterClock};

/// Session-level options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOptions {
    /// Grid interval shared by all background loops.
    pub master_beat_interval: f64,
    /// Whether completing a segment schedules the next one.
    pub auto_advance: bool,
    /// Extra delay between a segment's end-delay and the next segment.
    pub inter_segment_delay: f64,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            master_beat_interval: 1.0,
            auto_advance: true,
            inter_segment_delay: 2.0,
        }
    }
}

/// Top-level orchestrator of one game session.
pub struct GameDirector<S: Stage> {
    bank: ObjectBank,
    segments: Vec<Segment>,
    /// Object identity -> segments referencing it. Maintained here and
    /// queried on every click instead of per-object callbacks, so an
    /// object appearing in several segments registers exactly once.
    registry: HashMap<ObjectId, Vec<usize>>,
    session: GameSession,
    engine: SequenceEngine,
    clock: MasterClock,
    scheduler: ActionScheduler,
    looper: SegmentLoopManager,
    camera: CameraRig,
    options: GameOptions,
    stage: S,
    finished: bool,
}

impl<S: Stage> GameDirector<S> {
    /// Assemble a director from configured parts.
    pub fn new(
        bank: ObjectBank,
        segments: Vec<Segment>,
        options: GameOptions,
        windows: GradeWindows,
        camera_views: usize,
        stage: S,
    ) -> Self {
        let mut registry: HashMap<ObjectId, Vec<usize>> = HashMap::new();
        for (index, segment) in segments.iter().enumerate() {
            for &id in segment.objects() {
                let entry = registry.entry(id).or_default();
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }

        Self {
            bank,
            segments,
            registry,
            session: GameSession::new(),
            engine: SequenceEngine::new(windows),
            clock: MasterClock::default(),
            scheduler: ActionScheduler::new(),
            looper: SegmentLoopManager::new(),
            camera: CameraRig::new(camera_views),
            options,
            stage,
            finished: false,
        }
    }

    /// Anchor the master clock and begin with segment 0.
    pub fn start(&mut self, now: f64) {
        self.clock.restart(now);
        self.start_segment(0, now);
    }

    /// Begin the segment at `index`, or finish the game past the end.
    pub fn start_segment(&mut self, index: usize, now: f64) {
        if index >= self.segments.len() {
            info!("all segments completed");
            self.finished = true;
            let last_view = self.camera.view_count().saturating_sub(1);
            if self.camera.switch_to(last_view, now) {
                self.stage.switch_camera(last_view);
            }
            return;
        }

        info!(segment = self.segments[index].name(), "starting segment");
        self.finished = false;
        self.session.reset_for_segment(index);
        self.engine.start_round(
            &mut self.session,
            &self.segments[index],
            &self.clock,
            &mut self.scheduler,
            now,
        );
    }

    /// Route a player click into the sequence state machine.
    ///
    /// Clicks for objects outside the active segment, or arriving while
    /// no input is expected, are silently dropped.
    pub fn object_clicked(&mut self, id: ObjectId, now: f64) -> ClickOutcome {
        if self.finished {
            return ClickOutcome::Ignored;
        }

        let active = self.session.segment_index;
        let belongs = self
            .registry
            .get(&id)
            .map(|segments| segments.contains(&active))
            .unwrap_or(false);
        if !belongs {
            debug!(%id, segment = active, "click outside active segment, ignoring");
            return ClickOutcome::Ignored;
        }

        self.engine.handle_click(
            &mut self.session,
            &self.segments[active],
            &mut self.scheduler,
            &mut self.stage,
            id,
            now,
        )
    }

    /// Advance the cooperative timeline to `now`, executing every action
    /// that has come due.
    pub fn tick(&mut self, now: f64) {
        for action in self.scheduler.poll(now) {
            self.dispatch(action, now);
        }
    }

    fn dispatch(&mut self, action: ScheduledAction, now: f64) {
        match action.kind {
            ActionKind::PlayObject { object, colored } => {
                self.stage.play_object(object, colored);
            }
            ActionKind::BeginInput { segment } => {
                if segment == self.session.segment_index {
                    self.engine
                        .begin_input(&mut self.session, &self.segments[segment], now);
                }
            }
            ActionKind::RoundComplete { segment } => {
                if segment == self.session.segment_index {
                    self.engine
                        .advance_reveal(&mut self.session, &self.segments[segment], &mut self.stage);
                    self.engine.start_round(
                        &mut self.session,
                        &self.segments[segment],
                        &self.clock,
                        &mut self.scheduler,
                        now,
                    );
                }
            }
            ActionKind::RestartRound { segment } => {
                if segment == self.session.segment_index {
                    self.engine.start_round(
                        &mut self.session,
                        &self.segments[segment],
                        &self.clock,
                        &mut self.scheduler,
                        now,
                    );
                }
            }
            ActionKind::SegmentSolved { segment } => {
                self.complete_segment(segment, now);
            }
            ActionKind::LoopCycle { segment } => {
                if let Some(seg) = self.segments.get(segment) {
                    self.looper
                        .run_cycle(segment, seg, &mut self.scheduler, now);
                }
            }
            ActionKind::StartSegment { index } => {
                self.start_segment(index, now);
            }
        }
    }

    /// Mark a segment solved: color it, hand it to the loop manager,
    /// advance the camera, and schedule the next segment.
    fn complete_segment(&mut self, index: usize, now: f64) {
        let Some(segment) = self.segments.get_mut(index) else {
            return;
        };
        segment.set_completed();
        info!(segment = segment.name(), "segment completed");

        let objects: Vec<ObjectId> = segment.objects().to_vec();
        for id in objects {
            self.bank.set_colored(id);
            self.stage.highlight_permanent(id);
        }

        // The loop's grid alignment provides the settle before playback.
        self.looper.start_loop(
            index,
            &mut self.segments[index],
            &self.clock,
            &mut self.scheduler,
            self.options.master_beat_interval,
            now,
        );

        if self.camera.advance(now) {
            self.stage.switch_camera(self.camera.active());
        }

        if self.options.auto_advance {
            let delay = self.segments[index].end_delay() + self.options.inter_segment_delay;
            self.scheduler.schedule(
                now + delay,
                Role::Progression,
                ActionKind::StartSegment { index: index + 1 },
            );
        }
    }

    /// Cancel everything and begin again from segment 0.
    ///
    /// Loops are stopped, pending schedules dropped, segment and object
    /// state cleared, the master grid re-anchored and the camera reset —
    /// then segment 0 starts after one beat interval.
    pub fn restart(&mut self, now: f64) {
        info!("restarting game");
        self.looper.stop_all(&mut self.segments, &mut self.scheduler);
        self.scheduler.clear();

        for segment in &mut self.segments {
            segment.reset();
        }
        self.bank.reset_all();
        let ids: Vec<ObjectId> = self.bank.iter().map(|o| o.id()).collect();
        for id in ids {
            self.stage.reset_visual(id);
        }

        self.clock.restart(now);
        self.camera.reset();
        self.finished = false;
        self.session.reset_for_segment(0);
        self.scheduler.schedule(
            now + self.options.master_beat_interval,
            Role::Progression,
            ActionKind::StartSegment { index: 0 },
        );
    }

    /// Whether every segment has been completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The consolidated session state.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The segment list.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The object bank.
    pub fn bank(&self) -> &ObjectBank {
        &self.bank
    }

    /// The loop manager.
    pub fn looper(&self) -> &SegmentLoopManager {
        &self.looper
    }

    /// The camera rig.
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// The stage sink.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Mutable stage access (demo event dumping).
    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// Due time of the next pending action, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.scheduler.next_due()
    }

    /// Number of pending scheduled actions.
    pub fn pending_actions(&self) -> usize {
        self.scheduler.len()
    }
}
