// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Camera view switching.
//!
//! The rig tracks which of a fixed set of viewpoints is active and the
//! in-flight blend between two of them. The blend itself is rendered
//! externally; starting a new transition replaces any running one, which
//! is the single cancellation point for camera motion.

use tracing::warn;

/// Duration of a camera blend, in time units.
pub const CAMERA_TRANSITION_DURATION: f64 = 2.0;

/// An in-flight blend between two viewpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransition {
    /// View being blended out.
    pub from: usize,
    /// View being blended in.
    pub to: usize,
    /// When the blend started.
    pub started_at: f64,
    /// Blend length.
    pub duration: f64,
}

impl CameraTransition {
    /// Blend progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    /// Whether the blend has finished at `now`.
    pub fn is_complete(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Tracks the active viewpoint out of a fixed set.
#[derive(Debug, Clone)]
pub struct CameraRig {
    active: usize,
    view_count: usize,
    transition: Option<CameraTransition>,
}

impl CameraRig {
    /// Create a rig with `view_count` viewpoints, starting on view 0.
    pub fn new(view_count: usize) -> Self {
        Self {
            active: 0,
            view_count,
            transition: None,
        }
    }

    /// Currently active view index.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Number of available viewpoints.
    pub fn view_count(&self) -> usize {
        self.view_count
    }

    /// The in-flight blend, if any.
    pub fn transition(&self) -> Option<&CameraTransition> {
        self.transition.as_ref()
    }

    /// Switch to the view at `index`.
    ///
    /// A request beyond the available views is a logged no-op, and a
    /// request for the already-active view does nothing. Returns whether a
    /// new transition was started; the caller forwards the switch to the
    /// stage only in that case.
    pub fn switch_to(&mut self, index: usize, now: f64) -> bool {
        if index >= self.view_count {
            warn!(index, views = self.view_count, "camera index out of range");
            return false;
        }
        if index == self.active {
            return false;
        }

        // A new blend replaces any in-flight one.
        self.transition = Some(CameraTransition {
            from: self.active,
            to: index,
            started_at: now,
            duration: CAMERA_TRANSITION_DURATION,
        });
        self.active = index;
        true
    }

    /// Switch to the next view, clamped at the last one.
    pub fn advance(&mut self, now: f64) -> bool {
        let next = self.active + 1;
        self.switch_to(next, now)
    }

    /// Back to view 0 with no transition (game restart).
    pub fn reset(&mut self) {
        self.active = 0;
        self.transition = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_starts_on_view_zero() {
        let rig = CameraRig::new(3);
        assert_eq!(rig.active(), 0);
        assert!(rig.transition().is_none());
    }

    #[test]
    fn test_switch_starts_transition() {
        let mut rig = CameraRig::new(3);
        assert!(rig.switch_to(1, 10.0));
        assert_eq!(rig.active(), 1);

        let t = rig.transition().unwrap();
        assert_eq!(t.from, 0);
        assert_eq!(t.to, 1);
        assert_eq!(t.started_at, 10.0);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut rig = CameraRig::new(2);
        assert!(!rig.switch_to(5, 0.0));
        assert_eq!(rig.active(), 0);
        assert!(rig.transition().is_none());
    }

    #[test]
    fn test_same_index_is_noop() {
        let mut rig = CameraRig::new(2);
        assert!(!rig.switch_to(0, 0.0));
        assert!(rig.transition().is_none());
    }

    #[test]
    fn test_new_transition_replaces_running_one() {
        let mut rig = CameraRig::new(3);
        rig.switch_to(1, 0.0);
        rig.switch_to(2, 0.5);

        let t = rig.transition().unwrap();
        assert_eq!(t.from, 1);
        assert_eq!(t.to, 2);
        assert_eq!(t.started_at, 0.5);
    }

    #[test]
    fn test_transition_progress() {
        let t = CameraTransition {
            from: 0,
            to: 1,
            started_at: 0.0,
            duration: 2.0,
        };
        assert_eq!(t.progress(0.0), 0.0);
        assert_eq!(t.progress(1.0), 0.5);
        assert_eq!(t.progress(2.0), 1.0);
        assert_eq!(t.progress(5.0), 1.0);
        assert!(t.is_complete(2.0));
        assert!(!t.is_complete(1.9));
    }

    #[test]
    fn test_advance_clamps_at_last_view() {
        let mut rig = CameraRig::new(2);
        assert!(rig.advance(0.0));
        assert_eq!(rig.active(), 1);
        // Already at the last view: a further advance is a no-op.
        assert!(!rig.advance(1.0));
        assert_eq!(rig.active(), 1);
    }

    #[test]
    fn test_reset() {
        let mut rig = CameraRig::new(3);
        rig.switch_to(2, 0.0);
        rig.reset();
        assert_eq!(rig.active(), 0);
        assert!(rig.transition().is_none());
    }
}
