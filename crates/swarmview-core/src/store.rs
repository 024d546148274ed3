//! Per-robot display state, reconciled incrementally from snapshots.
//!
//! Records are created lazily the first time a snapshot references a robot
//! id, mutated in place by every later update (last write wins), and
//! destroyed only by a bulk clear at session start or reset. Iteration
//! order is unspecified for correctness; the map's key order is used only
//! for a stable cosmetic draw order.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use swarmview_types::{FaultKind, FaultStatus, RobotId, RobotPhase, RobotUpdate, SimPoint};
use tracing::debug;

/// Default robot radius in display pixels.
pub const ROBOT_RADIUS: f64 = 6.0;

/// Lower bound for random color channels, keeping robots visible against a
/// dark canvas.
const COLOR_CHANNEL_FLOOR: u8 = 50;

/// An RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DisplayColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl DisplayColor {
    /// Pick a random color with every channel in `50..=255`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.random_range(COLOR_CHANNEL_FLOOR..=u8::MAX),
            g: rng.random_range(COLOR_CHANNEL_FLOOR..=u8::MAX),
            b: rng.random_range(COLOR_CHANNEL_FLOOR..=u8::MAX),
        }
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Mutable display state of one robot.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotRecord {
    /// The robot's id within the session.
    pub id: RobotId,
    /// Last reported position, in simulation space.
    pub position: SimPoint,
    /// Display color, assigned once when the record is created.
    pub color: DisplayColor,
    /// Draw radius in display pixels.
    pub radius: f64,
    /// Last reported lifecycle phase.
    pub phase: RobotPhase,
    /// Whether the robot is currently frozen.
    pub frozen: bool,
    /// Whether the robot has terminated its algorithm.
    pub terminated: bool,
    /// Number of robots co-located at this position.
    pub multiplicity: u32,
    /// Kind of injected fault, if any.
    pub fault_kind: Option<FaultKind>,
    /// Whether the injected fault has fired, if known.
    pub fault_status: Option<FaultStatus>,
}

impl RobotRecord {
    fn from_update(id: RobotId, update: &RobotUpdate, color: DisplayColor) -> Self {
        Self {
            id,
            position: update.position,
            color,
            radius: ROBOT_RADIUS,
            phase: update.phase,
            frozen: update.frozen,
            terminated: update.terminated,
            multiplicity: update.multiplicity,
            fault_kind: update.fault_kind,
            fault_status: update.fault_status,
        }
    }

    fn apply(&mut self, update: &RobotUpdate) {
        self.position = update.position;
        self.phase = update.phase;
        self.frozen = update.frozen;
        self.terminated = update.terminated;
        self.multiplicity = update.multiplicity;
        self.fault_kind = update.fault_kind;
        self.fault_status = update.fault_status;
    }

    /// Human-readable fault text for the renderer, if a fault is present.
    pub fn fault_text(&self) -> Option<String> {
        self.fault_kind.map(|kind| match self.fault_status {
            Some(status) => format!("{kind} ({status})"),
            None => kind.to_string(),
        })
    }
}

/// Mapping from robot id to mutable per-robot display state.
#[derive(Debug, Default)]
pub struct RobotStore {
    robots: BTreeMap<RobotId, RobotRecord>,
}

impl RobotStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            robots: BTreeMap::new(),
        }
    }

    /// Merge one update into the store.
    ///
    /// An unseen id gets a fresh record (and a freshly assigned random
    /// color); a seen id is mutated in place with last-write-wins
    /// semantics. Applying the same update twice is idempotent.
    pub fn upsert(&mut self, id: RobotId, update: &RobotUpdate) {
        if let Some(record) = self.robots.get_mut(&id) {
            record.apply(update);
        } else {
            let mut rng = rand::rng();
            let color = DisplayColor::random(&mut rng);
            debug!(robot = %id, color = %color, "New robot observed");
            self.robots.insert(id, RobotRecord::from_update(id, update, color));
        }
    }

    /// Look up one robot's record.
    pub fn get(&self, id: &RobotId) -> Option<&RobotRecord> {
        self.robots.get(id)
    }

    /// Iterate over all records in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &RobotRecord> {
        self.robots.values()
    }

    /// Number of robots seen so far this session.
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    /// Whether no robot has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    /// Destroy every record. Records are never removed individually.
    pub fn clear(&mut self) {
        self.robots.clear();
    }
}
