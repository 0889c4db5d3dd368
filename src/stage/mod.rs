// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Stage abstraction layer.
//!
//! This module provides a trait-based abstraction over the visual and
//! audio environment: object play/highlight animations, timing feedback,
//! and camera transitions. The game core only ever issues fire-and-forget
//! calls through this trait; rendering, audio and VFX live on the other
//! side of it.

pub mod camera;

pub use camera::{CameraRig, CameraTransition, CAMERA_TRANSITION_DURATION};

use crate::object::ObjectId;
use crate::timing::Grade;

/// Sink for all externally visible side effects.
///
/// Implementations must tolerate any call at any time; a missing feedback
/// channel is a no-op, never an error.
pub trait Stage {
    /// Trigger the play/highlight animation of one object.
    fn play_object(&mut self, id: ObjectId, colored: bool);

    /// Permanently switch an object to its colored look.
    fn highlight_permanent(&mut self, id: ObjectId);

    /// Transient "happy" highlight that reverts on its own.
    fn highlight_temporary(&mut self, id: ObjectId);

    /// Wrong-click highlight on the clicked object.
    fn highlight_wrong_selected(&mut self, id: ObjectId);

    /// Wrong-reset highlight on the rest of the segment.
    fn highlight_wrong_others(&mut self, ids: &[ObjectId]);

    /// Return an object to its idle look.
    fn reset_visual(&mut self, id: ObjectId);

    /// Show timing-accuracy feedback for the click at `position`.
    fn show_timing_feedback(&mut self, grade: Grade, position: usize);

    /// Blend the view to the camera at `index`.
    fn switch_camera(&mut self, index: usize);
}

/// Stage that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStage;

impl Stage for NullStage {
    fn play_object(&mut self, _id: ObjectId, _colored: bool) {}
    fn highlight_permanent(&mut self, _id: ObjectId) {}
    fn highlight_temporary(&mut self, _id: ObjectId) {}
    fn highlight_wrong_selected(&mut self, _id: ObjectId) {}
    fn highlight_wrong_others(&mut self, _ids: &[ObjectId]) {}
    fn reset_visual(&mut self, _id: ObjectId) {}
    fn show_timing_feedback(&mut self, _grade: Grade, _position: usize) {}
    fn switch_camera(&mut self, _index: usize) {}
}

/// One recorded stage call.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    Play { id: ObjectId, colored: bool },
    Permanent(ObjectId),
    Temporary(ObjectId),
    WrongSelected(ObjectId),
    WrongOthers(Vec<ObjectId>),
    ResetVisual(ObjectId),
    Feedback { grade: Grade, position: usize },
    Camera(usize),
}

/// Stage that records every call, for tests and the demo event dump.
#[derive(Debug, Default)]
pub struct MemoryStage {
    events: Vec<StageEvent>,
}

impl MemoryStage {
    /// Create an empty recording stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in call order.
    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }

    /// Drop the recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Count recorded events matching a predicate.
    pub fn count(&self, predicate: impl Fn(&StageEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl Stage for MemoryStage {
    fn play_object(&mut self, id: ObjectId, colored: bool) {
        self.events.push(StageEvent::Play { id, colored });
    }

    fn highlight_permanent(&mut self, id: ObjectId) {
        self.events.push(StageEvent::Permanent(id));
    }

    fn highlight_temporary(&mut self, id: ObjectId) {
        self.events.push(StageEvent::Temporary(id));
    }

    fn highlight_wrong_selected(&mut self, id: ObjectId) {
        self.events.push(StageEvent::WrongSelected(id));
    }

    fn highlight_wrong_others(&mut self, ids: &[ObjectId]) {
        self.events.push(StageEvent::WrongOthers(ids.to_vec()));
    }

    fn reset_visual(&mut self, id: ObjectId) {
        self.events.push(StageEvent::ResetVisual(id));
    }

    fn show_timing_feedback(&mut self, grade: Grade, position: usize) {
        self.events.push(StageEvent::Feedback { grade, position });
    }

    fn switch_camera(&mut self, index: usize) {
        self.events.push(StageEvent::Camera(index));
    }
}

/// Stage that prints every call, for the CLI demo.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleStage;

impl Stage for ConsoleStage {
    fn play_object(&mut self, id: ObjectId, colored: bool) {
        println!("  play {} {}", id, if colored { "(colored)" } else { "" });
    }

    fn highlight_permanent(&mut self, id: ObjectId) {
        println!("  {} is now permanently colored", id);
    }

    fn highlight_temporary(&mut self, id: ObjectId) {
        println!("  {} happy!", id);
    }

    fn highlight_wrong_selected(&mut self, id: ObjectId) {
        println!("  {} wrong!", id);
    }

    fn highlight_wrong_others(&mut self, ids: &[ObjectId]) {
        println!("  {} object(s) reset after wrong click", ids.len());
    }

    fn reset_visual(&mut self, id: ObjectId) {
        println!("  {} back to idle", id);
    }

    fn show_timing_feedback(&mut self, grade: Grade, position: usize) {
        println!("  [{}] at position {}", grade.label(), position);
    }

    fn switch_camera(&mut self, index: usize) {
        println!("  camera -> view {}", index);
    }
}
