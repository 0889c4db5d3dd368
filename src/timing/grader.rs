// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing-accuracy grading.
//!
//! Maps the distance between an expected and an actual click time onto a
//! small ordered set of grades. Pure and deterministic; `Late` suppresses
//! positive feedback but is never an error.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Accuracy grade for a correct click, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    /// Within the tightest window.
    Perfect,
    /// Within the middle window.
    Good,
    /// Within the widest window.
    Ok,
    /// Outside every window. Still a correct click.
    Late,
}

impl Grade {
    /// Display label for feedback sinks.
    pub fn label(&self) -> &'static str {
        match self {
            Grade::Perfect => "PERFECT",
            Grade::Good => "GOOD",
            Grade::Ok => "OK",
            Grade::Late => "LATE",
        }
    }

    /// Whether this grade should trigger positive feedback.
    pub fn is_positive(&self) -> bool {
        *self != Grade::Late
    }
}

/// Grading window thresholds in time units.
///
/// Invariant: `perfect < good < ok`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeWindows {
    /// Widest diff graded Perfect.
    #[serde(default = "default_perfect")]
    pub perfect: f64,
    /// Widest diff graded Good.
    #[serde(default = "default_good")]
    pub good: f64,
    /// Widest diff graded Ok; anything beyond is Late.
    #[serde(default = "default_ok")]
    pub ok: f64,
}

fn default_perfect() -> f64 {
    0.15
}
fn default_good() -> f64 {
    0.30
}
fn default_ok() -> f64 {
    0.50
}

impl Default for GradeWindows {
    fn default() -> Self {
        Self {
            perfect: default_perfect(),
            good: default_good(),
            ok: default_ok(),
        }
    }
}

impl GradeWindows {
    /// Create windows, restoring the ordering invariant if violated.
    pub fn new(perfect: f64, good: f64, ok: f64) -> Self {
        let mut windows = Self { perfect, good, ok };
        if !windows.is_ordered() {
            warn!(perfect, good, ok, "misordered grade windows, reordering");
            let mut sorted = [perfect.abs(), good.abs(), ok.abs()];
            sorted.sort_by(f64::total_cmp);
            windows = Self {
                perfect: sorted[0],
                good: sorted[1],
                ok: sorted[2],
            };
        }
        windows
    }

    /// Check the `perfect < good < ok` invariant.
    pub fn is_ordered(&self) -> bool {
        self.perfect > 0.0 && self.perfect < self.good && self.good < self.ok
    }

    /// Grade the distance between an expected and an actual timestamp.
    pub fn grade(&self, expected: f64, actual: f64) -> Grade {
        let diff = (actual - expected).abs();
        if diff <= self.perfect {
            Grade::Perfect
        } else if diff <= self.good {
            Grade::Good
        } else if diff <= self.ok {
            Grade::Ok
        } else {
            Grade::Late
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let windows = GradeWindows::default();
        assert_eq!(windows.perfect, 0.15);
        assert_eq!(windows.good, 0.30);
        assert_eq!(windows.ok, 0.50);
        assert!(windows.is_ordered());
    }

    #[test]
    fn test_grade_perfect() {
        let windows = GradeWindows::default();
        assert_eq!(windows.grade(10.0, 10.05), Grade::Perfect);
        assert_eq!(windows.grade(10.0, 9.95), Grade::Perfect);
        assert_eq!(windows.grade(10.0, 10.0), Grade::Perfect);
    }

    #[test]
    fn test_grade_ok() {
        let windows = GradeWindows::default();
        assert_eq!(windows.grade(10.0, 10.40), Grade::Ok);
        assert_eq!(windows.grade(10.0, 9.60), Grade::Ok);
    }

    #[test]
    fn test_grade_late() {
        let windows = GradeWindows::default();
        assert_eq!(windows.grade(10.0, 11.0), Grade::Late);
        assert_eq!(windows.grade(10.0, 9.0), Grade::Late);
    }

    #[test]
    fn test_grade_good() {
        let windows = GradeWindows::default();
        assert_eq!(windows.grade(10.0, 10.2), Grade::Good);
        assert_eq!(windows.grade(10.0, 9.75), Grade::Good);
    }

    #[test]
    fn test_grade_boundaries_inclusive() {
        let windows = GradeWindows::default();
        assert_eq!(windows.grade(0.0, 0.15), Grade::Perfect);
        assert_eq!(windows.grade(0.0, 0.30), Grade::Good);
        assert_eq!(windows.grade(0.0, 0.50), Grade::Ok);
    }

    #[test]
    fn test_misordered_windows_reorder() {
        let windows = GradeWindows::new(0.5, 0.3, 0.15);
        assert!(windows.is_ordered());
        assert_eq!(windows.perfect, 0.15);
        assert_eq!(windows.ok, 0.5);
    }

    #[test]
    fn test_grade_ordering() {
        assert!(Grade::Perfect < Grade::Good);
        assert!(Grade::Good < Grade::Ok);
        assert!(Grade::Ok < Grade::Late);
    }

    #[test]
    fn test_late_is_not_positive() {
        assert!(Grade::Perfect.is_positive());
        assert!(Grade::Good.is_positive());
        assert!(Grade::Ok.is_positive());
        assert!(!Grade::Late.is_positive());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Grade::Perfect.label(), "PERFECT");
        assert_eq!(Grade::Late.label(), "LATE");
    }
}
