//! Scripted demo feed standing in for the remote simulation.
//!
//! The feeder waits for the engine's start request, then plays one
//! gathering run: robots placed on a circle walk toward their centroid,
//! with snapshots produced at a deliberately irregular cadence so the
//! playback queue actually does its decoupling job. The run finishes with
//! an enclosing-circle overlay, a drain pause, and a session end.

use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::time::Duration;

use swarmview_core::{IngressEvent, ViewerRequest};
use swarmview_types::{
    EnclosingCircle, RobotId, RobotPhase, RobotUpdate, SessionId, SimPoint, Snapshot,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Radius of the starting circle, in simulation units.
const START_RADIUS: f64 = 5.0;

/// Fraction of the remaining distance to the centroid covered per step.
const STEP_FRACTION: f64 = 0.08;

/// Number of snapshots produced for the run.
const STEPS: u32 = 40;

/// Serve one scripted simulation run, then return.
///
/// Blocks until a [`ViewerRequest::StartSimulation`] arrives, streams the
/// run's events, and exits after the session ends.
pub async fn feed(
    events: mpsc::UnboundedSender<IngressEvent>,
    mut requests: mpsc::UnboundedReceiver<ViewerRequest>,
) {
    let Some(ViewerRequest::StartSimulation(request)) = requests.recv().await else {
        info!("Request channel closed before a start arrived");
        return;
    };
    info!(
        num_robots = request.num_robots,
        algorithm = ?request.algorithm,
        "Demo simulation starting"
    );

    let session = SessionId::new();
    if events.send(IngressEvent::SessionStart(session)).is_err() {
        return;
    }

    let count = request.num_robots.max(1);
    let mut positions: Vec<SimPoint> = (0..count)
        .map(|i| {
            let angle = TAU * f64::from(i) / f64::from(count);
            SimPoint::new(START_RADIUS * angle.cos(), START_RADIUS * angle.sin())
        })
        .collect();
    let centroid = centroid(&positions);

    let mut time = 0.0_f64;
    for step in 0..STEPS {
        for p in &mut positions {
            p.x += (centroid.x - p.x) * STEP_FRACTION;
            p.y += (centroid.y - p.y) * STEP_FRACTION;
        }
        let phase = if step == 0 {
            RobotPhase::Look
        } else {
            RobotPhase::Move
        };
        let robots: BTreeMap<RobotId, RobotUpdate> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let id = u32::try_from(i).unwrap_or(u32::MAX);
                (RobotId(id), RobotUpdate::new(*p, phase))
            })
            .collect();
        if events
            .send(IngressEvent::Snapshot {
                session,
                snapshot: Snapshot::new(time, robots),
            })
            .is_err()
        {
            return;
        }
        time += request.sampling_interval;

        // Irregular production cadence: bursts followed by gaps, so the
        // playback queue visibly absorbs the jitter.
        let gap_ms = if step % 3 == 0 { 45 } else { 8 };
        debug!(step, gap_ms, "Snapshot produced");
        tokio::time::sleep(Duration::from_millis(gap_ms)).await;
    }

    let radius = positions
        .iter()
        .map(|p| distance(*p, centroid))
        .fold(0.0_f64, f64::max);
    let _ = events.send(IngressEvent::Overlay {
        session,
        circle: EnclosingCircle {
            center: centroid,
            radius,
        },
    });

    // Let playback drain the backlog before the authoritative discard.
    tokio::time::sleep(Duration::from_secs(2)).await;
    let _ = events.send(IngressEvent::SessionEnd);
    info!("Demo simulation ended");
}

fn centroid(points: &[SimPoint]) -> SimPoint {
    let n = f64::from(u32::try_from(points.len()).unwrap_or(u32::MAX)).max(1.0);
    let (sx, sy) = points
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), p| (sx + p.x, sy + p.y));
    SimPoint::new(sx / n, sy / n)
}

fn distance(a: SimPoint, b: SimPoint) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
