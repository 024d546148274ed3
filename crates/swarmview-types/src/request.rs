//! Simulation start request.
//!
//! The observer's only outbound message is a [`SimulationRequest`], a flat
//! record of named parameters forwarded opaquely to the remote simulator.
//! The playback engine validates exactly one semantic precondition before
//! emission (user-defined placement needs at least one placed position);
//! everything else is the simulator's business.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AlgorithmKind, DistributionKind, FaultKind, InitMethod, SchedulerKind};
use crate::geometry::SimPoint;
use crate::ids::RobotId;

/// Robot speed specification: one shared value or one value per robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum SpeedSpec {
    /// Every robot moves at the same speed.
    Uniform(f64),
    /// Speed per robot, indexed by robot id.
    PerRobot(Vec<f64>),
}

impl Default for SpeedSpec {
    fn default() -> Self {
        Self::Uniform(1.0)
    }
}

/// One fault to inject into the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FaultSpec {
    /// The robot to inject into, or `None` to let the simulator pick.
    #[serde(default)]
    pub robot: Option<RobotId>,
    /// Kind of fault to inject.
    pub kind: FaultKind,
    /// Probability per activation that the fault fires.
    #[serde(default = "default_fault_probability")]
    pub probability: f64,
}

/// Flat record of simulation parameters sent with a start request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationRequest {
    /// Number of robots to simulate.
    #[serde(default = "default_num_robots")]
    pub num_robots: u32,

    /// Robot speed(s) in simulation units per second.
    #[serde(default)]
    pub speed: SpeedSpec,

    /// Activation scheduler model.
    #[serde(default)]
    pub scheduler: SchedulerKind,

    /// Probability distribution for activation intervals.
    #[serde(default)]
    pub distribution: DistributionKind,

    /// Algorithm the robots execute.
    #[serde(default)]
    pub algorithm: AlgorithmKind,

    /// Visibility radius in simulation units (`None` = unlimited).
    #[serde(default)]
    pub visibility_radius: Option<f64>,

    /// Whether robots block each other's line of sight.
    #[serde(default)]
    pub obstructed_visibility: bool,

    /// Whether movements always reach their target (rigid) or may be
    /// interrupted partway by the scheduler.
    #[serde(default = "default_true")]
    pub rigid_movement: bool,

    /// Whether robots can detect how many peers share a point.
    #[serde(default)]
    pub multiplicity_detection: bool,

    /// Snapshot sampling interval in simulation seconds.
    #[serde(default = "default_sampling_interval")]
    pub sampling_interval: f64,

    /// Random seed for a reproducible run (`None` = simulator picks).
    #[serde(default)]
    pub seed: Option<u64>,

    /// How initial positions are chosen.
    #[serde(default)]
    pub init_method: InitMethod,

    /// Explicit initial positions; required non-empty when `init_method`
    /// is [`InitMethod::UserDefined`].
    #[serde(default)]
    pub initial_positions: Vec<SimPoint>,

    /// Faults to inject into the run.
    #[serde(default)]
    pub faults: Vec<FaultSpec>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            num_robots: default_num_robots(),
            speed: SpeedSpec::default(),
            scheduler: SchedulerKind::default(),
            distribution: DistributionKind::default(),
            algorithm: AlgorithmKind::default(),
            visibility_radius: None,
            obstructed_visibility: false,
            rigid_movement: true,
            multiplicity_detection: false,
            sampling_interval: default_sampling_interval(),
            seed: None,
            init_method: InitMethod::default(),
            initial_positions: Vec::new(),
            faults: Vec::new(),
        }
    }
}

const fn default_num_robots() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}

const fn default_sampling_interval() -> f64 {
    0.25
}

const fn default_fault_probability() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_request_uses_defaults() {
        let req: Result<SimulationRequest, _> = serde_json::from_str("{}");
        let req = req.ok().unwrap_or_default();
        assert_eq!(req.num_robots, 3);
        assert_eq!(req.speed, SpeedSpec::Uniform(1.0));
        assert_eq!(req.scheduler, SchedulerKind::Async);
        assert!(req.rigid_movement);
        assert!(req.initial_positions.is_empty());
    }

    #[test]
    fn speed_accepts_scalar_and_list() {
        let scalar: Result<SpeedSpec, _> = serde_json::from_str("2.5");
        assert_eq!(scalar.ok(), Some(SpeedSpec::Uniform(2.5)));
        let list: Result<SpeedSpec, _> = serde_json::from_str("[1.0, 2.0]");
        assert_eq!(list.ok(), Some(SpeedSpec::PerRobot(vec![1.0, 2.0])));
    }

    #[test]
    fn fault_spec_defaults_probability() {
        let spec: Result<FaultSpec, _> = serde_json::from_str(r#"{"kind": "crash"}"#);
        let spec = spec.ok();
        assert!(spec.is_some());
        assert!(spec.is_some_and(|s| (s.probability - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn request_roundtrip_serde() {
        let req = SimulationRequest {
            num_robots: 5,
            init_method: InitMethod::UserDefined,
            initial_positions: vec![SimPoint::new(0.0, 1.0)],
            ..SimulationRequest::default()
        };
        let json = serde_json::to_string(&req).ok();
        let back: Option<SimulationRequest> =
            json.as_deref().and_then(|j| serde_json::from_str(j).ok());
        assert_eq!(back, Some(req));
    }
}
