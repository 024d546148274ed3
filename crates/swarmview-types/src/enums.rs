//! Enumeration types shared between the wire format, the playback engine,
//! and the control surface.
//!
//! The captured simulator variants disagree on label vocabulary (`"LOOK"` vs
//! `"Look"`, `"Move start"`/`"Move end"` vs `"MOVE"`, `"triggered"` vs
//! `"active"`). Each enum here picks one canonical form for serialization
//! and folds every observed wire variant into it on deserialization, so the
//! mapping lives in exactly one place.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::Serialize;
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Robot lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle phase of one robot in the look-compute-move cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RobotPhase {
    /// Taking a snapshot of the visible robots.
    Look,
    /// Moving toward a computed target point.
    Move,
    /// Waiting for the next activation.
    Wait,
    /// Finished; will not be activated again.
    Terminated,
}

impl RobotPhase {
    /// Parse a wire label, folding every observed vocabulary variant into
    /// the canonical phase. Matching is case-insensitive; `"move start"`,
    /// `"move end"` map to [`Move`](Self::Move) and `"sleep"` maps to
    /// [`Wait`](Self::Wait).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "look" => Some(Self::Look),
            "move" | "move start" | "move end" => Some(Self::Move),
            "wait" | "sleep" => Some(Self::Wait),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }

    /// The canonical display label for this phase.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Look => "Look",
            Self::Move => "Move",
            Self::Wait => "Wait",
            Self::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for RobotPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RobotPhase {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_label(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown robot phase label: {raw:?}")))
    }
}

// ---------------------------------------------------------------------------
// Faults
// ---------------------------------------------------------------------------

/// Kind of fault injected into a robot by the remote simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FaultKind {
    /// The robot stops participating permanently once the fault triggers.
    Crash,
    /// The robot reports or acts on arbitrary incorrect values.
    Byzantine,
    /// The robot's activations are delayed beyond the scheduler's bounds.
    Delay,
}

impl FaultKind {
    /// Parse a wire label case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "crash" => Some(Self::Crash),
            "byzantine" => Some(Self::Byzantine),
            "delay" => Some(Self::Delay),
            _ => None,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Crash => "crash",
            Self::Byzantine => "byzantine",
            Self::Delay => "delay",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for FaultKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_label(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown fault kind label: {raw:?}")))
    }
}

/// Whether an injected fault has fired yet.
///
/// Canonical forms are `"armed"` and `"triggered"`; the wire variants
/// `"pending"` and `"active"` fold into them respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FaultStatus {
    /// Injected but not yet fired.
    Armed,
    /// The fault has fired and is affecting the robot.
    Triggered,
}

impl FaultStatus {
    /// Parse a wire label case-insensitively, accepting the divergent
    /// vocabularies of the captured simulator variants.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "armed" | "pending" => Some(Self::Armed),
            "triggered" | "active" => Some(Self::Triggered),
            _ => None,
        }
    }
}

impl fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Armed => "armed",
            Self::Triggered => "triggered",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for FaultStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_label(&raw)
            .ok_or_else(|| de::Error::custom(format!("unknown fault status label: {raw:?}")))
    }
}

// ---------------------------------------------------------------------------
// Start-request vocabulary (forwarded opaquely to the simulator)
// ---------------------------------------------------------------------------

/// Activation scheduler model of the remote simulation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SchedulerKind {
    /// Fully asynchronous activations.
    #[default]
    #[serde(alias = "Async", alias = "ASYNC")]
    Async,
    /// Activations in rounds; an arbitrary subset activates each round.
    #[serde(alias = "SSYNC", alias = "SemiSync")]
    SemiSync,
    /// Activations in rounds; every robot activates each round.
    #[serde(alias = "FSYNC", alias = "FullSync")]
    FullSync,
}

/// Probability distribution used for activation intervals.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DistributionKind {
    /// Exponentially distributed inter-activation times.
    #[default]
    #[serde(alias = "Exponential")]
    Exponential,
    /// Normally distributed inter-activation times.
    #[serde(alias = "Gaussian")]
    Gaussian,
}

/// Algorithm the remote robots execute.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AlgorithmKind {
    /// All robots gather at a single point.
    #[default]
    #[serde(alias = "Gathering")]
    Gathering,
    /// Robots converge to the smallest enclosing circle of their positions.
    #[serde(alias = "SEC", alias = "sec")]
    EnclosingCircle,
}

/// How initial robot positions are chosen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum InitMethod {
    /// The simulator places robots at random.
    #[default]
    #[serde(alias = "Random")]
    Random,
    /// The observer supplies explicit initial positions (canvas clicks).
    #[serde(alias = "user-defined", alias = "User Defined")]
    UserDefined,
}
