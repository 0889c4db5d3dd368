// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the game.
//!
//! This module provides data structures for loading and validating game
//! setups: the object roster, the segment list with per-segment timing,
//! grading windows, and session options.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::game::GameOptions;
use crate::object::ObjectBank;
use crate::segment::{Segment, SegmentTiming};
use crate::timing::GradeWindows;

/// Configuration validation failure.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no objects defined")]
    NoObjects,
    #[error("no segments defined")]
    NoSegments,
    #[error("duplicate object name '{0}'")]
    DuplicateObject(String),
    #[error("segment '{0}' has no objects")]
    EmptySegment(String),
    #[error("segment '{segment}' references unknown object '{object}'")]
    UnknownObject { segment: String, object: String },
    #[error("segment '{0}' has a non-positive inter-object delay")]
    NonPositiveDelay(String),
    #[error("segment '{0}' has a non-positive cycle duration")]
    NonPositiveCycle(String),
    #[error("grading windows must be ordered perfect < good < ok")]
    MisorderedWindows,
}

/// Root configuration for a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameFile {
    /// Game metadata and session options.
    pub game: GameConfig,
    /// Object roster; positions become stable identities.
    #[serde(default)]
    pub objects: Vec<String>,
    /// Segment definitions.
    #[serde(default)]
    pub segments: Vec<SegmentConfig>,
}

impl GameFile {
    /// Load a game configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a game configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Serialize to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Check the configuration without building anything.
    ///
    /// Timing-budget overruns (objects not fitting in the cycle) are not
    /// errors: the segment math clamps and the game degrades gracefully,
    /// so they only warn here.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.objects.is_empty() {
            return Err(ConfigError::NoObjects);
        }
        if self.segments.is_empty() {
            return Err(ConfigError::NoSegments);
        }

        let mut seen = HashMap::new();
        for name in &self.objects {
            if seen.insert(name.as_str(), ()).is_some() {
                return Err(ConfigError::DuplicateObject(name.clone()));
            }
        }

        if !self.game.grading.is_ordered() {
            return Err(ConfigError::MisorderedWindows);
        }

        for segment in &self.segments {
            if segment.objects.is_empty() {
                return Err(ConfigError::EmptySegment(segment.name.clone()));
            }
            if segment.inter_object_delay <= 0.0 {
                return Err(ConfigError::NonPositiveDelay(segment.name.clone()));
            }
            if segment.total_cycle_duration <= 0.0 {
                return Err(ConfigError::NonPositiveCycle(segment.name.clone()));
            }
            for object in &segment.objects {
                if !seen.contains_key(object.as_str()) {
                    return Err(ConfigError::UnknownObject {
                        segment: segment.name.clone(),
                        object: object.clone(),
                    });
                }
            }

            let span =
                segment.start_delay + segment.objects.len() as f64 * segment.inter_object_delay;
            if span > segment.total_cycle_duration {
                warn!(
                    segment = segment.name.as_str(),
                    span,
                    cycle = segment.total_cycle_duration,
                    "objects do not fit in the cycle, end-delay will clamp"
                );
            }
        }

        Ok(())
    }

    /// Build the session parts: object bank, segments, options, windows.
    pub fn build(&self) -> std::result::Result<BuiltGame, ConfigError> {
        self.validate()?;

        let mut bank = ObjectBank::new();
        let mut ids = HashMap::new();
        for name in &self.objects {
            let id = bank.add(name.clone());
            ids.insert(name.as_str(), id);
        }

        let segments = self
            .segments
            .iter()
            .map(|config| {
                let objects = config
                    .objects
                    .iter()
                    .map(|name| ids[name.as_str()])
                    .collect();
                Segment::new(config.name.clone(), objects, config.timing())
            })
            .collect();

        Ok(BuiltGame {
            bank,
            segments,
            options: self.game.options(),
            windows: self.game.grading,
            camera_views: self.game.camera_views,
        })
    }

    /// Built-in configuration for the demo and tests.
    pub fn demo() -> Self {
        Self {
            game: GameConfig {
                name: "Pond Chorus".to_string(),
                ..Default::default()
            },
            objects: vec![
                "bass frog".to_string(),
                "tenor frog".to_string(),
                "alto frog".to_string(),
                "soprano frog".to_string(),
            ],
            segments: vec![
                SegmentConfig {
                    name: "intro".to_string(),
                    objects: vec![
                        "bass frog".to_string(),
                        "tenor frog".to_string(),
                        "alto frog".to_string(),
                    ],
                    start_delay: 0.0,
                    inter_object_delay: 1.0,
                    total_cycle_duration: 5.0,
                },
                SegmentConfig {
                    name: "chorus".to_string(),
                    objects: vec![
                        "alto frog".to_string(),
                        "soprano frog".to_string(),
                        "bass frog".to_string(),
                        "tenor frog".to_string(),
                    ],
                    start_delay: 1.0,
                    inter_object_delay: 1.0,
                    total_cycle_duration: 8.0,
                },
            ],
        }
    }
}

/// Session parts produced from a validated configuration.
pub struct BuiltGame {
    pub bank: ObjectBank,
    pub segments: Vec<Segment>,
    pub options: GameOptions,
    pub windows: GradeWindows,
    pub camera_views: usize,
}

/// Game-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Game name.
    pub name: String,
    /// Grid interval shared by all background loops.
    #[serde(default = "default_beat_interval")]
    pub master_beat_interval: f64,
    /// Whether completing a segment starts the next one.
    #[serde(default = "default_auto_advance")]
    pub auto_advance: bool,
    /// Extra delay between segments.
    #[serde(default = "default_inter_segment_delay")]
    pub inter_segment_delay: f64,
    /// Number of camera viewpoints.
    #[serde(default = "default_camera_views")]
    pub camera_views: usize,
    /// Timing-accuracy windows.
    #[serde(default)]
    pub grading: GradeWindows,
}

fn default_beat_interval() -> f64 {
    1.0
}
fn default_auto_advance() -> bool {
    true
}
fn default_inter_segment_delay() -> f64 {
    2.0
}
fn default_camera_views() -> usize {
    3
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            master_beat_interval: default_beat_interval(),
            auto_advance: default_auto_advance(),
            inter_segment_delay: default_inter_segment_delay(),
            camera_views: default_camera_views(),
            grading: GradeWindows::default(),
        }
    }
}

impl GameConfig {
    /// Session options for the director.
    pub fn options(&self) -> GameOptions {
        GameOptions {
            master_beat_interval: self.master_beat_interval,
            auto_advance: self.auto_advance,
            inter_segment_delay: self.inter_segment_delay,
        }
    }
}

/// Segment configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentConfig {
    /// Segment name.
    pub name: String,
    /// Object names in sequence order.
    pub objects: Vec<String>,
    /// Delay before the first object of a cycle.
    #[serde(default)]
    pub start_delay: f64,
    /// Spacing between consecutive objects.
    #[serde(default = "default_inter_object_delay")]
    pub inter_object_delay: f64,
    /// Total duration of one playback cycle.
    #[serde(default = "default_cycle_duration")]
    pub total_cycle_duration: f64,
}

fn default_inter_object_delay() -> f64 {
    1.0
}
fn default_cycle_duration() -> f64 {
    5.0
}

impl SegmentConfig {
    /// The segment timing parameters.
    pub fn timing(&self) -> SegmentTiming {
        SegmentTiming {
            start_delay: self.start_delay,
            inter_object_delay: self.inter_object_delay,
            total_cycle_duration: self.total_cycle_duration,
        }
    }
}
