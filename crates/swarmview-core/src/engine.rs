//! The playback engine: session-fenced buffering plus the frame-paced
//! replay state machine.
//!
//! One [`PlaybackEngine`] owns all mutable playback state -- queue, fence,
//! robot store, transform, pacing bookkeeping -- and is driven from exactly
//! one task, so ingress handling and pacing ticks interleave cooperatively
//! and never race. There are no module-level singletons; everything hangs
//! off this struct.
//!
//! # State machine
//!
//! - **Idle** -- no active session, or a session with nothing started yet.
//! - **Running** -- actively pacing dequeue-reconcile-render cycles.
//! - **Paused** -- pacing suspended; buffering continues.
//! - **Stalled** -- queue exhausted; no pacing until new data arrives.
//!
//! Only two external triggers drive transitions: admitted snapshots
//! (re-arm from `Stalled` or `Idle`) and pause/resume commands. Session end
//! and reset force `Idle` and discard buffered-but-undisplayed snapshots --
//! an explicit latency-over-completeness choice. Empty queue and stale
//! session tags are level-triggered signals, not faults; nothing here
//! retries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use swarmview_types::{
    DisplayPoint, EnclosingCircle, InitMethod, SessionId, SimPoint, SimulationRequest, Snapshot,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ViewerConfig};
use crate::error::{CommandError, StartError};
use crate::ingress::{IngressEvent, ViewerCommand, ViewerRequest};
use crate::queue::SnapshotQueue;
use crate::render::{Renderer, RobotSprite};
use crate::session::SessionFence;
use crate::store::{RobotRecord, RobotStore};
use crate::transform::CoordinateTransform;

/// Playback state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackPhase {
    /// No active session, or nothing started yet.
    Idle,
    /// Actively pacing consumption.
    Running,
    /// Pacing suspended; buffering continues.
    Paused,
    /// Queue exhausted; waiting for new data.
    Stalled,
}

/// What one pacing tick did. At most one render happens per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Dequeued one snapshot, reconciled the store, rendered one frame.
    Rendered,
    /// The frame interval has not elapsed yet; no side effects.
    TooEarly,
    /// The queue ran dry; transitioned to `Stalled`.
    Drained,
    /// Drew the pending enclosing-circle overlay (once, after a stall).
    Finalized,
    /// Tick observed while paused; no side effects.
    Paused,
    /// Tick observed while idle or stalled with nothing to do.
    Idle,
}

/// Point-in-time view of the engine for logs and status displays.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerStatus {
    /// Current playback phase.
    pub phase: PlaybackPhase,
    /// Whether pacing is suspended by a pause command.
    pub paused: bool,
    /// The active session, if any.
    pub session: Option<SessionId>,
    /// Number of buffered snapshots.
    pub queue_depth: usize,
    /// Robots seen so far this session.
    pub robots_tracked: usize,
    /// Frames rendered since the viewer started.
    pub frames_rendered: u64,
    /// Snapshots dropped for carrying a stale session tag.
    pub stale_dropped: u64,
    /// Sessions observed since the viewer started.
    pub sessions_observed: u64,
    /// Initial positions placed and not yet consumed by a start request.
    pub placed_points: usize,
    /// ISO 8601 timestamp of when the viewer started.
    pub started_at: String,
}

/// The playback engine. See the module docs for the state machine.
#[derive(Debug)]
pub struct PlaybackEngine {
    frame_interval: Duration,
    queue: SnapshotQueue,
    fence: SessionFence,
    store: RobotStore,
    transform: CoordinateTransform,
    /// Machine state; never stores [`PlaybackPhase::Paused`]. Pausing is an
    /// orthogonal flag so buffering and stall bookkeeping continue
    /// unchanged underneath a pause.
    phase: PlaybackPhase,
    paused: bool,
    last_frame: Option<Instant>,
    pending_overlay: Option<EnclosingCircle>,
    placement_method: InitMethod,
    placed_points: Vec<SimPoint>,
    requests: mpsc::UnboundedSender<ViewerRequest>,
    frames_rendered: u64,
    stale_dropped: u64,
    sessions_observed: u64,
    started_at: DateTime<Utc>,
}

impl PlaybackEngine {
    /// Create an engine from validated configuration and the outbound
    /// request channel.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration fails validation.
    pub fn new(
        config: &ViewerConfig,
        requests: mpsc::UnboundedSender<ViewerRequest>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let transform = CoordinateTransform::new(config.display.scale).ok_or(
            ConfigError::NonPositiveScale {
                scale: config.display.scale,
            },
        )?;
        Ok(Self {
            frame_interval: Duration::from_millis(config.playback.frame_interval_ms),
            queue: SnapshotQueue::new(),
            fence: SessionFence::new(),
            store: RobotStore::new(),
            transform,
            phase: PlaybackPhase::Idle,
            paused: false,
            last_frame: None,
            pending_overlay: None,
            placement_method: config.placement.method,
            placed_points: Vec::new(),
            requests,
            frames_rendered: 0,
            stale_dropped: 0,
            sessions_observed: 0,
            started_at: Utc::now(),
        })
    }

    // -----------------------------------------------------------------------
    // Ingress
    // -----------------------------------------------------------------------

    /// Apply one ingress event.
    ///
    /// Stale-tagged snapshots and overlays are dropped silently with a
    /// diagnostic log; this is routine filtering, not an error.
    pub fn handle_ingress(&mut self, event: IngressEvent) {
        match event {
            IngressEvent::SessionStart(id) => {
                info!(session = %id, "Session started");
                self.fence.begin(id);
                self.queue.clear();
                self.store.clear();
                self.pending_overlay = None;
                self.last_frame = None;
                self.phase = PlaybackPhase::Idle;
                // A user pause outlives session boundaries; only resume,
                // reset, or session end lift it.
                self.sessions_observed = self.sessions_observed.saturating_add(1);
            }
            IngressEvent::Snapshot { session, snapshot } => {
                if !self.fence.is_current(&session) {
                    self.stale_dropped = self.stale_dropped.saturating_add(1);
                    debug!(session = %session, "Dropping snapshot with stale session tag");
                    return;
                }
                self.queue.enqueue(snapshot);
                if matches!(self.phase, PlaybackPhase::Idle | PlaybackPhase::Stalled) {
                    debug!(queue_depth = self.queue.len(), "Pacing armed");
                    self.phase = PlaybackPhase::Running;
                }
            }
            IngressEvent::Overlay { session, circle } => {
                if !self.fence.is_current(&session) {
                    self.stale_dropped = self.stale_dropped.saturating_add(1);
                    debug!(session = %session, "Dropping overlay with stale session tag");
                    return;
                }
                debug!(radius = circle.radius, "Overlay geometry buffered");
                self.pending_overlay = Some(circle);
            }
            IngressEvent::SessionEnd => {
                info!(
                    discarded = self.queue.len(),
                    "Session ended; discarding buffered snapshots"
                );
                self.clear_session();
            }
        }
    }

    /// Force the engine back to a safe idle state. Called when the ingress
    /// channel fails; the engine keeps serving control commands afterwards.
    pub fn force_idle(&mut self) {
        warn!(
            discarded = self.queue.len(),
            "Ingress failure; returning to idle"
        );
        self.clear_session();
    }

    // -----------------------------------------------------------------------
    // Control surface
    // -----------------------------------------------------------------------

    /// Apply one control command.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] for user-visible rejections (invalid
    /// start request, placement outside user-defined mode). Rejections
    /// never change engine state.
    pub fn handle_command(&mut self, command: ViewerCommand) -> Result<(), CommandError> {
        match command {
            ViewerCommand::Start(request) => self.start(request).map_err(CommandError::from),
            ViewerCommand::Pause => {
                if self.paused {
                    debug!("Pause ignored; already paused");
                } else {
                    info!("Playback paused");
                    self.paused = true;
                }
                Ok(())
            }
            ViewerCommand::Resume => {
                if self.paused {
                    info!("Playback resumed");
                    self.paused = false;
                } else {
                    debug!("Resume ignored; not paused");
                }
                Ok(())
            }
            ViewerCommand::Reset => {
                info!(discarded = self.queue.len(), "Viewer reset");
                self.clear_session();
                self.placed_points.clear();
                Ok(())
            }
            ViewerCommand::InjectPoint(point) => self.inject_point(point),
            // Shutdown is handled by the playback loop before it reaches
            // the engine; treated as a no-op here.
            ViewerCommand::Shutdown => Ok(()),
        }
    }

    /// Validate and emit a start request.
    ///
    /// With user-defined placement, an empty `initial_positions` field is
    /// filled from the points placed via [`inject_point`]; if the result is
    /// still empty the request is rejected locally and nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::NoPlacedPositions`] on the empty-placement
    /// precondition, or [`StartError::ChannelClosed`] if the simulator
    /// channel is gone.
    ///
    /// [`inject_point`]: Self::inject_point
    pub fn start(&mut self, mut request: SimulationRequest) -> Result<(), StartError> {
        if request.init_method == InitMethod::UserDefined {
            if request.initial_positions.is_empty() {
                request.initial_positions.clone_from(&self.placed_points);
            }
            if request.initial_positions.is_empty() {
                return Err(StartError::NoPlacedPositions);
            }
        }
        self.placement_method = request.init_method;
        info!(
            num_robots = request.num_robots,
            algorithm = ?request.algorithm,
            scheduler = ?request.scheduler,
            "Requesting simulation start"
        );
        self.requests
            .send(ViewerRequest::StartSimulation(request))
            .map_err(|_| StartError::ChannelClosed)?;
        self.placed_points.clear();
        Ok(())
    }

    /// Record one user-placed initial position from a display-space click.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::PlacementDisabled`] outside user-defined
    /// placement mode.
    pub fn inject_point(&mut self, point: DisplayPoint) -> Result<(), CommandError> {
        if self.placement_method != InitMethod::UserDefined {
            return Err(CommandError::PlacementDisabled);
        }
        let sim = self.transform.to_simulation(point);
        debug!(x = sim.x, y = sim.y, "Initial position placed");
        self.placed_points.push(sim);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pacing
    // -----------------------------------------------------------------------

    /// Whether the pacing timer should be armed.
    pub const fn wants_tick(&self) -> bool {
        if self.paused {
            return false;
        }
        match self.phase {
            PlaybackPhase::Running => true,
            // A stalled session still owes one finalize tick when overlay
            // geometry arrived after the stall.
            PlaybackPhase::Stalled => self.pending_overlay.is_some(),
            PlaybackPhase::Idle | PlaybackPhase::Paused => false,
        }
    }

    /// The earliest instant the next tick may render.
    pub fn next_deadline(&self, now: Instant) -> Instant {
        self.last_frame.map_or(now, |last| {
            last.checked_add(self.frame_interval)
                .map_or(now, |due| due.max(now))
        })
    }

    /// Run one pacing tick.
    ///
    /// At most one render happens per tick, and renders strictly follow
    /// enqueue order. A tick before the frame interval has elapsed has no
    /// side effects beyond re-arming.
    pub fn tick(&mut self, now: Instant, renderer: &mut dyn Renderer) -> TickOutcome {
        if self.paused {
            return TickOutcome::Paused;
        }
        match self.phase {
            PlaybackPhase::Idle | PlaybackPhase::Paused => TickOutcome::Idle,
            PlaybackPhase::Stalled => match self.pending_overlay.take() {
                Some(circle) => {
                    self.draw_overlay(&circle, renderer);
                    TickOutcome::Finalized
                }
                None => TickOutcome::Idle,
            },
            PlaybackPhase::Running => self.running_tick(now, renderer),
        }
    }

    fn running_tick(&mut self, now: Instant, renderer: &mut dyn Renderer) -> TickOutcome {
        if let Some(last) = self.last_frame {
            if now.duration_since(last) < self.frame_interval {
                return TickOutcome::TooEarly;
            }
        }
        match self.queue.dequeue() {
            Some(snapshot) => {
                self.render_frame(&snapshot, renderer);
                self.last_frame = Some(now);
                self.frames_rendered = self.frames_rendered.saturating_add(1);
                TickOutcome::Rendered
            }
            None => {
                debug!("Queue drained; playback stalled");
                self.phase = PlaybackPhase::Stalled;
                match self.pending_overlay.take() {
                    Some(circle) => {
                        self.draw_overlay(&circle, renderer);
                        TickOutcome::Finalized
                    }
                    None => TickOutcome::Drained,
                }
            }
        }
    }

    fn render_frame(&mut self, snapshot: &Snapshot, renderer: &mut dyn Renderer) {
        for (id, update) in &snapshot.robots {
            self.store.upsert(*id, update);
        }
        renderer.begin_frame(snapshot.time);
        for record in self.store.iter() {
            let sprite = Self::sprite(self.transform, record);
            renderer.draw_robot(&sprite);
        }
        renderer.end_frame();
    }

    fn draw_overlay(&self, circle: &EnclosingCircle, renderer: &mut dyn Renderer) {
        let display_circle = self.transform.circle_to_display(circle);
        info!(radius = display_circle.radius, "Drawing enclosing-circle overlay");
        renderer.draw_overlay(&display_circle);
    }

    fn sprite(transform: CoordinateTransform, record: &RobotRecord) -> RobotSprite {
        let label = if record.multiplicity > 1 {
            format!("{} x{}", record.phase, record.multiplicity)
        } else {
            record.phase.to_string()
        };
        RobotSprite {
            id: record.id,
            position: transform.to_display(record.position),
            color: record.color,
            radius: record.radius,
            label,
            status: record.fault_text(),
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Current playback phase. Reports [`PlaybackPhase::Paused`] whenever
    /// the pause flag is set over a non-idle machine state.
    pub const fn phase(&self) -> PlaybackPhase {
        if self.paused && !matches!(self.phase, PlaybackPhase::Idle) {
            PlaybackPhase::Paused
        } else {
            self.phase
        }
    }

    /// Number of buffered snapshots.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Read access to the reconciled robot state.
    pub const fn store(&self) -> &RobotStore {
        &self.store
    }

    /// Frames rendered since the viewer started.
    pub const fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Sessions observed since the viewer started.
    pub const fn sessions_observed(&self) -> u64 {
        self.sessions_observed
    }

    /// Initial positions placed and not yet consumed by a start request.
    pub fn placed_points(&self) -> &[SimPoint] {
        &self.placed_points
    }

    /// Point-in-time status snapshot for logs and status displays.
    pub fn status(&self) -> ViewerStatus {
        ViewerStatus {
            phase: self.phase(),
            paused: self.paused,
            session: self.fence.active(),
            queue_depth: self.queue.len(),
            robots_tracked: self.store.len(),
            frames_rendered: self.frames_rendered,
            stale_dropped: self.stale_dropped,
            sessions_observed: self.sessions_observed,
            placed_points: self.placed_points.len(),
            started_at: self.started_at.to_rfc3339(),
        }
    }

    fn clear_session(&mut self) {
        self.fence.end();
        self.queue.clear();
        self.store.clear();
        self.pending_overlay = None;
        self.last_frame = None;
        self.phase = PlaybackPhase::Idle;
        self.paused = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;

    use swarmview_types::{
        DisplayCircle, RobotId, RobotPhase, RobotUpdate, Snapshot,
    };

    use super::*;
    use crate::ingress::ViewerRequest;

    /// Renderer that records every call for assertions.
    #[derive(Debug, Default)]
    struct Recorder {
        frames: Vec<f64>,
        robots: Vec<(RobotId, String)>,
        overlays: Vec<DisplayCircle>,
        ends: u32,
    }

    impl Renderer for Recorder {
        fn begin_frame(&mut self, time: f64) {
            self.frames.push(time);
        }
        fn draw_robot(&mut self, sprite: &RobotSprite) {
            self.robots.push((sprite.id, sprite.label.clone()));
        }
        fn draw_overlay(&mut self, circle: &DisplayCircle) {
            self.overlays.push(*circle);
        }
        fn end_frame(&mut self) {
            self.ends = self.ends.saturating_add(1);
        }
    }

    fn engine() -> (PlaybackEngine, mpsc::UnboundedReceiver<ViewerRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = PlaybackEngine::new(&ViewerConfig::default(), tx).unwrap();
        (engine, rx)
    }

    fn snapshot(time: f64, robots: &[(u32, f64, f64)]) -> Snapshot {
        let mut map = BTreeMap::new();
        for &(id, x, y) in robots {
            map.insert(
                RobotId(id),
                RobotUpdate::new(SimPoint::new(x, y), RobotPhase::Look),
            );
        }
        Snapshot::new(time, map)
    }

    fn begin_session(engine: &mut PlaybackEngine) -> SessionId {
        let session = SessionId::new();
        engine.handle_ingress(IngressEvent::SessionStart(session));
        session
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_in_idle_session_arms_running() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        assert_eq!(engine.phase(), PlaybackPhase::Idle);

        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(0.0, &[(0, 1.0, 1.0)]),
        });
        assert_eq!(engine.phase(), PlaybackPhase::Running);
        assert!(engine.wants_tick());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_snapshot_mutates_nothing() {
        let (mut engine, _rx) = engine();
        let _session = begin_session(&mut engine);

        let stale = SessionId::new();
        engine.handle_ingress(IngressEvent::Snapshot {
            session: stale,
            snapshot: snapshot(0.0, &[(0, 1.0, 1.0)]),
        });
        assert_eq!(engine.queue_depth(), 0);
        assert_eq!(engine.phase(), PlaybackPhase::Idle);
        assert!(engine.store().is_empty());
        assert_eq!(engine.status().stale_dropped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_renders_immediately() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(0.5, &[(0, 1.0, 2.0)]),
        });

        let mut recorder = Recorder::default();
        let outcome = engine.tick(Instant::now(), &mut recorder);
        assert_eq!(outcome, TickOutcome::Rendered);
        assert_eq!(recorder.frames, vec![0.5]);
        assert_eq!(recorder.ends, 1);
        assert_eq!(engine.frames_rendered(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn early_tick_has_no_side_effects() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        for t in 0..2 {
            engine.handle_ingress(IngressEvent::Snapshot {
                session,
                snapshot: snapshot(f64::from(t), &[(0, 0.0, 0.0)]),
            });
        }

        let mut recorder = Recorder::default();
        let start = Instant::now();
        assert_eq!(engine.tick(start, &mut recorder), TickOutcome::Rendered);
        // 5 ms later: under the 17 ms interval, nothing must happen.
        let early = start + Duration::from_millis(5);
        assert_eq!(engine.tick(early, &mut recorder), TickOutcome::TooEarly);
        assert_eq!(engine.queue_depth(), 1);
        assert_eq!(recorder.frames.len(), 1);

        let due = start + Duration::from_millis(17);
        assert_eq!(engine.tick(due, &mut recorder), TickOutcome::Rendered);
        assert_eq!(recorder.frames.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_ticks_never_shrink_the_queue() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        for t in 0..3 {
            engine.handle_ingress(IngressEvent::Snapshot {
                session,
                snapshot: snapshot(f64::from(t), &[(0, 0.0, 0.0)]),
            });
        }
        engine.handle_command(ViewerCommand::Pause).unwrap();
        assert_eq!(engine.phase(), PlaybackPhase::Paused);
        assert!(!engine.wants_tick());

        let mut recorder = Recorder::default();
        let mut now = Instant::now();
        for _ in 0..5 {
            now += Duration::from_millis(17);
            assert_eq!(engine.tick(now, &mut recorder), TickOutcome::Paused);
        }
        assert_eq!(engine.queue_depth(), 3);
        assert!(recorder.frames.is_empty());

        // Resume continues from the same point: nothing skipped.
        engine.handle_command(ViewerCommand::Resume).unwrap();
        now += Duration::from_millis(17);
        assert_eq!(engine.tick(now, &mut recorder), TickOutcome::Rendered);
        assert_eq!(recorder.frames, vec![0.0]);
        assert_eq!(engine.queue_depth(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn buffering_continues_under_pause() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        engine.handle_command(ViewerCommand::Pause).unwrap();

        for t in 0..2 {
            engine.handle_ingress(IngressEvent::Snapshot {
                session,
                snapshot: snapshot(f64::from(t), &[(0, 0.0, 0.0)]),
            });
        }
        assert_eq!(engine.queue_depth(), 2);
        assert_eq!(engine.phase(), PlaybackPhase::Paused);
        assert!(!engine.wants_tick());

        engine.handle_command(ViewerCommand::Resume).unwrap();
        assert_eq!(engine.phase(), PlaybackPhase::Running);
        let mut recorder = Recorder::default();
        assert_eq!(
            engine.tick(Instant::now(), &mut recorder),
            TickOutcome::Rendered
        );
        assert_eq!(recorder.frames, vec![0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn drained_queue_stalls_and_rearms_on_arrival() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(0.0, &[(0, 0.0, 0.0)]),
        });

        let mut recorder = Recorder::default();
        let start = Instant::now();
        assert_eq!(engine.tick(start, &mut recorder), TickOutcome::Rendered);
        let next = start + Duration::from_millis(17);
        assert_eq!(engine.tick(next, &mut recorder), TickOutcome::Drained);
        assert_eq!(engine.phase(), PlaybackPhase::Stalled);
        assert!(!engine.wants_tick());

        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(1.0, &[(0, 1.0, 1.0)]),
        });
        assert_eq!(engine.phase(), PlaybackPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn renders_follow_enqueue_order() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(0.0, &[(0, 0.0, 0.0)]),
        });
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(1.0, &[(0, 1.0, 1.0)]),
        });

        let mut recorder = Recorder::default();
        let mut now = Instant::now();
        assert_eq!(engine.tick(now, &mut recorder), TickOutcome::Rendered);
        now += Duration::from_millis(17);
        assert_eq!(engine.tick(now, &mut recorder), TickOutcome::Rendered);
        assert_eq!(recorder.frames, vec![0.0, 1.0]);

        // Final reconciled state reflects the last snapshot.
        let record = engine.store().get(&RobotId(0)).unwrap();
        assert!((record.position.x - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn overlay_draws_once_at_stall_transition() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(0.0, &[(0, 0.0, 0.0)]),
        });
        engine.handle_ingress(IngressEvent::Overlay {
            session,
            circle: EnclosingCircle {
                center: SimPoint::new(0.0, 0.0),
                radius: 2.0,
            },
        });

        let mut recorder = Recorder::default();
        let start = Instant::now();
        assert_eq!(engine.tick(start, &mut recorder), TickOutcome::Rendered);
        assert!(recorder.overlays.is_empty());

        let next = start + Duration::from_millis(17);
        assert_eq!(engine.tick(next, &mut recorder), TickOutcome::Finalized);
        assert_eq!(recorder.overlays.len(), 1);
        // Radius scales by the default 10 px/unit factor.
        assert!(
            recorder
                .overlays
                .first()
                .is_some_and(|c| (c.radius - 20.0).abs() < f64::EPSILON)
        );

        // Never drawn twice.
        let later = next + Duration::from_millis(17);
        assert_eq!(engine.tick(later, &mut recorder), TickOutcome::Idle);
        assert_eq!(recorder.overlays.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn overlay_after_stall_requests_finalize_tick() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(0.0, &[(0, 0.0, 0.0)]),
        });

        let mut recorder = Recorder::default();
        let start = Instant::now();
        assert_eq!(engine.tick(start, &mut recorder), TickOutcome::Rendered);
        let next = start + Duration::from_millis(17);
        assert_eq!(engine.tick(next, &mut recorder), TickOutcome::Drained);
        assert!(!engine.wants_tick());

        engine.handle_ingress(IngressEvent::Overlay {
            session,
            circle: EnclosingCircle {
                center: SimPoint::new(1.0, 1.0),
                radius: 1.0,
            },
        });
        assert!(engine.wants_tick());
        let later = next + Duration::from_millis(17);
        assert_eq!(engine.tick(later, &mut recorder), TickOutcome::Finalized);
        assert_eq!(recorder.overlays.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn session_end_discards_buffered_snapshots() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        for t in 0..4 {
            engine.handle_ingress(IngressEvent::Snapshot {
                session,
                snapshot: snapshot(f64::from(t), &[(0, 0.0, 0.0)]),
            });
        }
        engine.handle_ingress(IngressEvent::SessionEnd);
        assert_eq!(engine.phase(), PlaybackPhase::Idle);
        assert_eq!(engine.queue_depth(), 0);
        assert!(engine.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn session_start_discards_previous_buffering() {
        let (mut engine, _rx) = engine();
        let first = begin_session(&mut engine);
        engine.handle_ingress(IngressEvent::Snapshot {
            session: first,
            snapshot: snapshot(0.0, &[(0, 0.0, 0.0)]),
        });
        assert_eq!(engine.queue_depth(), 1);

        let second = begin_session(&mut engine);
        assert_eq!(engine.queue_depth(), 0);
        // Old tags no longer pass the fence.
        engine.handle_ingress(IngressEvent::Snapshot {
            session: first,
            snapshot: snapshot(1.0, &[(0, 0.0, 0.0)]),
        });
        assert_eq!(engine.queue_depth(), 0);
        engine.handle_ingress(IngressEvent::Snapshot {
            session: second,
            snapshot: snapshot(1.0, &[(0, 0.0, 0.0)]),
        });
        assert_eq!(engine.queue_depth(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_with_user_placement_and_no_points_is_rejected() {
        let (mut engine, mut rx) = engine();
        let request = SimulationRequest {
            init_method: InitMethod::UserDefined,
            ..SimulationRequest::default()
        };
        let result = engine.start(request);
        assert_eq!(result, Err(StartError::NoPlacedPositions));
        // Nothing was emitted.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn start_consumes_placed_points() {
        let (mut engine, mut rx) = engine();
        // Enable user-defined placement via the start path's mode update.
        engine.placement_method = InitMethod::UserDefined;
        engine
            .inject_point(DisplayPoint::new(10.0, -20.0))
            .unwrap();

        let request = SimulationRequest {
            init_method: InitMethod::UserDefined,
            ..SimulationRequest::default()
        };
        engine.start(request).unwrap();
        let ViewerRequest::StartSimulation(sent) = rx.try_recv().unwrap();
        // Display (10, -20) at scale 10 with the y flip is sim (1, 2).
        assert_eq!(sent.initial_positions.len(), 1);
        assert!(
            sent.initial_positions
                .first()
                .is_some_and(|p| (p.x - 1.0).abs() < 1e-9 && (p.y - 2.0).abs() < 1e-9)
        );
        // Points are consumed by the accepted request.
        assert!(engine.placed_points().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn inject_point_outside_manual_mode_is_rejected() {
        let (mut engine, _rx) = engine();
        let result = engine.inject_point(DisplayPoint::new(0.0, 0.0));
        assert_eq!(result, Err(CommandError::PlacementDisabled));
        assert!(engine.placed_points().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_idle_and_clears_points() {
        let (mut engine, _rx) = engine();
        engine.placement_method = InitMethod::UserDefined;
        engine.inject_point(DisplayPoint::new(5.0, 5.0)).unwrap();
        let session = begin_session(&mut engine);
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: snapshot(0.0, &[(0, 0.0, 0.0)]),
        });

        engine.handle_command(ViewerCommand::Reset).unwrap();
        assert_eq!(engine.phase(), PlaybackPhase::Idle);
        assert_eq!(engine.queue_depth(), 0);
        assert!(engine.placed_points().is_empty());
        assert!(engine.status().session.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn multiplicity_shows_in_the_sprite_label() {
        let (mut engine, _rx) = engine();
        let session = begin_session(&mut engine);
        let mut map = BTreeMap::new();
        let mut update = RobotUpdate::new(SimPoint::new(0.0, 0.0), RobotPhase::Wait);
        update.multiplicity = 3;
        map.insert(RobotId(4), update);
        engine.handle_ingress(IngressEvent::Snapshot {
            session,
            snapshot: Snapshot::new(0.0, map),
        });

        let mut recorder = Recorder::default();
        engine.tick(Instant::now(), &mut recorder);
        assert_eq!(
            recorder.robots,
            vec![(RobotId(4), String::from("Wait x3"))]
        );
    }
}
