//! Snapshot wire format.
//!
//! One snapshot is a timestamped frame of per-robot state produced by the
//! remote simulation. The wire layout is positional, inherited from the
//! simulator's JSON stream:
//!
//! ```text
//! [time, { "<robot id>": [[x, y], phase, frozen, terminated,
//!                         multiplicity?, fault_kind?, fault_status?] }]
//! ```
//!
//! Shape validation happens exactly once, here, on deserialization; the rest
//! of the engine works with the named-field [`Snapshot`] and [`RobotUpdate`]
//! structs and never re-checks the wire shape. The trailing optional fields
//! default to neutral values (`multiplicity = 1`, no fault), and an
//! unrecognized fault label degrades to "no fault" rather than rejecting the
//! whole snapshot. A missing required field or an unknown phase label *is* a
//! wire error.
//!
//! These two types keep their legacy tuple encoding on purpose, so no
//! `TypeScript` bindings are derived for them; the frontend's hand-written
//! snapshot type matches the tuple layout.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::enums::{FaultKind, FaultStatus, RobotPhase};
use crate::geometry::SimPoint;
use crate::ids::RobotId;

/// One robot's state within a snapshot, with named fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotUpdate {
    /// Position in simulation space.
    pub position: SimPoint,
    /// Lifecycle phase at snapshot time.
    pub phase: RobotPhase,
    /// Whether the robot is frozen (its movement suspended by the scheduler).
    pub frozen: bool,
    /// Whether the robot has terminated its algorithm.
    pub terminated: bool,
    /// Number of robots co-located at this point (1 unless the simulator
    /// runs with multiplicity detection).
    pub multiplicity: u32,
    /// Kind of injected fault, if any.
    pub fault_kind: Option<FaultKind>,
    /// Whether the injected fault has fired, if known.
    pub fault_status: Option<FaultStatus>,
}

impl RobotUpdate {
    /// Create an update with neutral optional fields.
    pub const fn new(position: SimPoint, phase: RobotPhase) -> Self {
        Self {
            position,
            phase,
            frozen: false,
            terminated: false,
            multiplicity: 1,
            fault_kind: None,
            fault_status: None,
        }
    }
}

impl Serialize for RobotUpdate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(7))?;
        seq.serialize_element(&(self.position.x, self.position.y))?;
        seq.serialize_element(&self.phase)?;
        seq.serialize_element(&self.frozen)?;
        seq.serialize_element(&self.terminated)?;
        seq.serialize_element(&self.multiplicity)?;
        seq.serialize_element(&self.fault_kind)?;
        seq.serialize_element(&self.fault_status)?;
        seq.end()
    }
}

struct RobotUpdateVisitor;

impl<'de> Visitor<'de> for RobotUpdateVisitor {
    type Value = RobotUpdate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            "a robot update tuple [[x, y], phase, frozen, terminated, \
             multiplicity?, fault_kind?, fault_status?]",
        )
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let (x, y): (f64, f64) = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let phase: RobotPhase = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let frozen: bool = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;
        let terminated: bool = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(3, &self))?;

        // Trailing fields are optional; missing or null means neutral.
        let multiplicity = seq
            .next_element::<Option<u32>>()?
            .flatten()
            .unwrap_or(1)
            .max(1);
        // Unknown fault labels degrade to "no fault" instead of poisoning
        // the whole snapshot.
        let fault_kind = seq
            .next_element::<Option<String>>()?
            .flatten()
            .and_then(|label| FaultKind::from_label(&label));
        let fault_status = seq
            .next_element::<Option<String>>()?
            .flatten()
            .and_then(|label| FaultStatus::from_label(&label));

        Ok(RobotUpdate {
            position: SimPoint::new(x, y),
            phase,
            frozen,
            terminated,
            multiplicity,
            fault_kind,
            fault_status,
        })
    }
}

impl<'de> Deserialize<'de> for RobotUpdate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(RobotUpdateVisitor)
    }
}

/// One timestamped frame of per-robot state from the remote simulation.
///
/// Immutable once produced: the engine enqueues it once, dequeues it exactly
/// once, reconciles the robot store from it, and drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Simulation time of this frame, in simulation seconds.
    pub time: f64,
    /// Per-robot updates, keyed by robot id.
    pub robots: BTreeMap<RobotId, RobotUpdate>,
}

impl Snapshot {
    /// Create a snapshot from a time and an update map.
    pub const fn new(time: f64, robots: BTreeMap<RobotId, RobotUpdate>) -> Self {
        Self { time, robots }
    }
}

impl Serialize for Snapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.time)?;
        seq.serialize_element(&self.robots)?;
        seq.end()
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = Snapshot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a snapshot tuple [time, robot update map]")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let time: f64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let robots: BTreeMap<RobotId, RobotUpdate> = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        Ok(Snapshot { time, robots })
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SnapshotVisitor)
    }
}
