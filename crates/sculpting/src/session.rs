//! Interactive sculpt session.
//!
//! Turns the host's raw pointer stream into brush applications. Two
//! orthogonal pieces of state decide what a pointer event means:
//!
//! - [`StrokePhase`]: `Idle` or `Dragging`. Pointer-down enters `Dragging`,
//!   pointer-up and focus loss return to `Idle`.
//! - The edit toggle: while edit is active, pointer-down drives the brush and
//!   camera controls are disabled; otherwise the same gesture belongs to the
//!   camera and the brush is inert.
//!
//! Mesh mutation happens once per delivered pointer sample. View knobs
//! (wireframe, camera controls, camera speed) are coalesced and flushed once per frame in
//! [`SculptSession::on_frame`]. Everything the renderer needs to know is
//! pushed over an [`EngineToRenderer`] channel.

use crossbeam_channel::{Receiver, Sender};
use glam::Vec2;
use terrain_config::TerrainConfig;
use terrain_ipc::{EditorCommand, EngineToRenderer, Modifiers, PointerEvent, TerrainType};
use tracing::{debug, trace, warn};

use crate::brush::{BrushConfig, apply_brush};
use crate::error::SculptError;
use crate::lifecycle::{LifecycleChange, TerrainLifecycle};
use crate::mesh::HeightFieldMesh;
use crate::raycast::{CameraRay, MeshRayCaster, RayCaster, RayHit, resolve_pointer};
use crate::scene::MeshHandle;
use crate::snapshot::TerrainSnapshot;
use crate::types::MeshId;

/// Pointer state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokePhase {
    #[default]
    Idle,
    Dragging,
}

/// Result of one brush sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { vertices_touched: usize },
    /// No terrain exists yet
    NoActiveMesh,
    /// The pointer is not over the terrain
    Miss,
}

/// View changes waiting for the next frame.
#[derive(Debug, Clone, Copy, Default)]
struct PendingView {
    wireframe: Option<bool>,
    camera_controls: Option<bool>,
    camera_speed: Option<f32>,
}

/// Per-stroke counters, logged when the stroke ends.
#[derive(Debug, Clone, Copy, Default)]
struct StrokeStats {
    samples: usize,
    misses: usize,
    vertices_touched: usize,
}

/// Single-user sculpt session over one active mesh.
pub struct SculptSession<C = MeshRayCaster> {
    config: TerrainConfig,
    lifecycle: TerrainLifecycle,
    caster: C,
    phase: StrokePhase,
    modifiers: Modifiers,
    stroke: StrokeStats,
    pending: PendingView,
    sender: Sender<EngineToRenderer>,
}

impl SculptSession {
    /// Session with the default triangle ray caster.
    ///
    /// Returns the receiving end of the renderer notification channel.
    pub fn new(config: TerrainConfig) -> (Self, Receiver<EngineToRenderer>) {
        Self::with_caster(config, MeshRayCaster)
    }
}

impl<C: RayCaster> SculptSession<C> {
    pub fn with_caster(config: TerrainConfig, caster: C) -> (Self, Receiver<EngineToRenderer>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let pending = PendingView {
            wireframe: Some(config.view.wireframe),
            camera_controls: Some(!config.view.edit_active),
            camera_speed: Some(config.view.camera_speed),
        };

        let session = Self {
            config,
            lifecycle: TerrainLifecycle::new(),
            caster,
            phase: StrokePhase::Idle,
            modifiers: Modifiers::default(),
            stroke: StrokeStats::default(),
            pending,
            sender,
        };
        (session, receiver)
    }

    pub fn phase(&self) -> StrokePhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == StrokePhase::Dragging
    }

    /// Whether pointer-down drives the brush (as opposed to the camera).
    pub fn edit_active(&self) -> bool {
        self.config.view.edit_active
    }

    pub fn terrain_type(&self) -> TerrainType {
        self.lifecycle.terrain_type()
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn active_mesh(&self) -> Option<&HeightFieldMesh> {
        self.lifecycle.active()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Update held-key state. Invert applies for as long as it is held.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Brush parameters for the next sample, with held modifiers applied.
    pub fn brush_config(&self) -> BrushConfig {
        BrushConfig::from(&self.config.brush).with_invert_held(self.modifiers.invert)
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Dispatch a pointer event.
    ///
    /// Returns the brush outcome when the event produced a sample, `None`
    /// when it only moved the cursor, belonged to the camera, or ended a
    /// stroke.
    pub fn handle_pointer(&mut self, event: PointerEvent, camera: &impl CameraRay) -> Option<ApplyOutcome> {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(Vec2::new(x, y), camera),
            PointerEvent::Move { x, y } => self.pointer_move(Vec2::new(x, y), camera),
            PointerEvent::Up => {
                self.pointer_up();
                None
            }
            PointerEvent::FocusLost => {
                self.focus_lost();
                None
            }
        }
    }

    /// Begin a stroke and apply the first sample.
    ///
    /// In view interaction the gesture belongs to the camera and nothing
    /// happens here.
    pub fn pointer_down(&mut self, ndc: Vec2, camera: &impl CameraRay) -> Option<ApplyOutcome> {
        if !self.edit_active() {
            return None;
        }

        if self.phase == StrokePhase::Idle {
            self.phase = StrokePhase::Dragging;
            self.stroke = StrokeStats::default();
            trace!("Stroke started");
        }

        Some(self.sample(ndc, camera))
    }

    /// Continue a stroke, or track the brush cursor while hovering.
    pub fn pointer_move(&mut self, ndc: Vec2, camera: &impl CameraRay) -> Option<ApplyOutcome> {
        match self.phase {
            StrokePhase::Dragging => Some(self.sample(ndc, camera)),
            StrokePhase::Idle => {
                if self.edit_active() {
                    let hit = resolve_pointer(camera, &self.caster, self.lifecycle.active(), ndc);
                    if let Some(point) = hit.point() {
                        self.send_cursor(Some(point.to_array()));
                    }
                }
                None
            }
        }
    }

    /// End the current stroke. Mesh state is left as is.
    pub fn pointer_up(&mut self) {
        self.end_stroke("pointer up");
    }

    /// Window blur or similar: end any stroke and drop held modifiers.
    pub fn focus_lost(&mut self) {
        self.end_stroke("focus lost");
        self.modifiers = Modifiers::default();
    }

    fn end_stroke(&mut self, reason: &str) {
        if self.phase != StrokePhase::Dragging {
            return;
        }
        self.phase = StrokePhase::Idle;
        let stats = std::mem::take(&mut self.stroke);
        debug!(
            "Stroke ended ({}): {} samples, {} misses, {} vertex updates",
            reason, stats.samples, stats.misses, stats.vertices_touched
        );
    }

    /// Resolve the pointer and apply one brush sample.
    fn sample(&mut self, ndc: Vec2, camera: &impl CameraRay) -> ApplyOutcome {
        let Some(mesh) = self.lifecycle.active() else {
            trace!("Brush sample ignored: no active mesh");
            return ApplyOutcome::NoActiveMesh;
        };

        self.stroke.samples += 1;
        let point = match resolve_pointer(camera, &self.caster, Some(mesh), ndc) {
            RayHit::Hit { point, .. } => point,
            RayHit::Miss => {
                self.stroke.misses += 1;
                trace!("Brush sample missed terrain at {:?}", ndc);
                return ApplyOutcome::Miss;
            }
        };

        self.send_cursor(Some(point.to_array()));

        let config = self.brush_config();
        let Some(mesh) = self.lifecycle.active_mut() else {
            return ApplyOutcome::NoActiveMesh;
        };
        let mesh_id = mesh.id();
        let effect = apply_brush(mesh, point, &config);

        if effect.positions_changed || effect.colors_changed {
            self.send(EngineToRenderer::GeometryDirty {
                mesh_id: mesh_id.0,
                positions: effect.positions_changed,
                colors: effect.colors_changed,
            });
        }
        if effect.vertex_colors_enabled {
            self.send(EngineToRenderer::VertexColorsEnabled { mesh_id: mesh_id.0 });
        }

        self.stroke.vertices_touched += effect.vertices_touched;
        ApplyOutcome::Applied {
            vertices_touched: effect.vertices_touched,
        }
    }

    // ------------------------------------------------------------------
    // Editor commands
    // ------------------------------------------------------------------

    /// Apply a configuration change from the editor UI.
    ///
    /// Values are taken as already validated. Changing the map size or
    /// resolution in create mode regenerates the plane, discarding any
    /// sculpting done on it.
    pub fn apply_command(&mut self, command: EditorCommand) -> Result<(), SculptError> {
        debug!("Editor command: {:?}", command);

        match command {
            EditorCommand::SetBrushKind(kind) => self.config.brush.kind = kind,
            EditorCommand::SetBrushRadius(radius) => self.config.brush.radius = radius,
            EditorCommand::SetBrushStrength(strength) => self.config.brush.strength = strength,
            EditorCommand::SetBrushColor(color) => self.config.brush.color = color,
            EditorCommand::SetMapSize(size) => self.resize_map(size, self.config.map.resolution)?,
            EditorCommand::SetMapResolution(resolution) => {
                self.resize_map(self.config.map.size, resolution)?
            }
            EditorCommand::SetWireframe(enabled) => self.set_wireframe(enabled),
            EditorCommand::SetCameraSpeed(speed) => self.set_camera_speed(speed),
            EditorCommand::SetEditActive(active) => self.set_edit_active(active),
            EditorCommand::SetTerrainType(TerrainType::Create) => {
                self.enter_create()?;
            }
            EditorCommand::SetTerrainType(TerrainType::Edit) => {
                self.config.map.terrain_type = TerrainType::Edit;
                self.end_stroke("terrain type changed");
                if let Some(released) = self.lifecycle.set_terrain_type(TerrainType::Edit) {
                    self.send(EngineToRenderer::MeshReleased { mesh_id: released.0 });
                    self.send_cursor(None);
                }
            }
        }

        Ok(())
    }

    /// New map settings take effect only once a plane built from them exists.
    fn resize_map(&mut self, size: f32, resolution: u32) -> Result<(), SculptError> {
        if self.lifecycle.terrain_type() == TerrainType::Create && self.lifecycle.active().is_some() {
            self.create_plane(size, resolution)?;
        }
        self.config.map.size = size;
        self.config.map.resolution = resolution;
        Ok(())
    }

    /// Toggle between brush (edit) and camera (view) interaction.
    pub fn set_edit_active(&mut self, active: bool) {
        if self.config.view.edit_active == active {
            return;
        }
        self.config.view.edit_active = active;
        if !active {
            self.end_stroke("edit toggled off");
            self.send_cursor(None);
        }
        self.pending.camera_controls = Some(!active);
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.config.view.wireframe = enabled;
        self.pending.wireframe = Some(enabled);
    }

    pub fn set_camera_speed(&mut self, speed: f32) {
        self.config.view.camera_speed = speed;
        self.pending.camera_speed = Some(speed);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Generate a fresh plane from the current map settings.
    pub fn enter_create(&mut self) -> Result<MeshId, SculptError> {
        self.create_plane(self.config.map.size, self.config.map.resolution)
    }

    fn create_plane(&mut self, size: f32, resolution: u32) -> Result<MeshId, SculptError> {
        self.end_stroke("terrain regenerated");
        let change = self.lifecycle.enter_create(size, resolution)?;
        self.config.map.terrain_type = TerrainType::Create;
        self.on_bound(change, TerrainType::Create);
        Ok(change.bound)
    }

    /// Bind scene geometry for editing.
    ///
    /// On rejection the host receives [`EngineToRenderer::BindRejected`], the
    /// session stays idle and the previous binding is kept.
    pub fn enter_edit(&mut self, handle: MeshHandle) -> Result<MeshId, SculptError> {
        self.end_stroke("terrain rebound");
        match self.lifecycle.enter_edit(handle) {
            Ok(change) => {
                self.config.map.terrain_type = TerrainType::Edit;
                self.on_bound(change, TerrainType::Edit);
                Ok(change.bound)
            }
            Err(e) => {
                self.send(EngineToRenderer::BindRejected { reason: e.to_string() });
                Err(e)
            }
        }
    }

    /// Detach the active mesh without binding another.
    pub fn release(&mut self) -> Option<MeshId> {
        self.end_stroke("terrain released");
        let released = self.lifecycle.release()?;
        self.send(EngineToRenderer::MeshReleased { mesh_id: released.0 });
        self.send_cursor(None);
        Some(released)
    }

    fn on_bound(&mut self, change: LifecycleChange, terrain_type: TerrainType) {
        if change.rebound {
            return;
        }
        if let Some(released) = change.released {
            self.send(EngineToRenderer::MeshReleased { mesh_id: released.0 });
        }
        self.send(EngineToRenderer::MeshBound {
            mesh_id: change.bound.0,
            terrain_type,
        });
        self.send_cursor(None);
        // New geometry picks up the current wireframe state next frame
        self.pending.wireframe = Some(self.config.view.wireframe);
    }

    /// Owned copy of the active terrain for an exporter.
    pub fn export_snapshot(&self) -> Option<TerrainSnapshot> {
        self.lifecycle.export_snapshot()
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Flush view changes accumulated since the last frame.
    pub fn on_frame(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        if let Some(enabled) = pending.wireframe {
            if let Some(mesh) = self.lifecycle.active() {
                let mut scene_mesh = mesh.handle().borrow_mut();
                if scene_mesh.material.wireframe != enabled {
                    scene_mesh.material.wireframe = enabled;
                    scene_mesh.dirty.material = true;
                }
            }
            self.send(EngineToRenderer::WireframeChanged { enabled });
        }

        if let Some(enabled) = pending.camera_controls {
            self.send(EngineToRenderer::CameraControlsEnabled { enabled });
        }

        if let Some(speed) = pending.camera_speed {
            self.send(EngineToRenderer::CameraSpeedChanged { speed });
        }
    }

    fn send_cursor(&self, position: Option<[f32; 3]>) {
        self.send(EngineToRenderer::BrushCursor {
            position,
            radius: self.config.brush.radius,
        });
    }

    fn send(&self, message: EngineToRenderer) {
        if self.sender.send(message).is_err() {
            warn!("Renderer channel closed, dropping engine notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::Ray;
    use crate::scene::{SceneMesh, VertexAttribute};
    use glam::Vec3;
    use terrain_config::BrushSettings;
    use terrain_ipc::BrushKind;

    /// Straight-down rays over a 10x10 area centered on the origin, nudged
    /// off the grid lines.
    fn top_down(ndc: Vec2) -> Option<Ray> {
        Ray::new(
            Vec3::new(ndc.x * 5.0 + 0.01, 10.0, -ndc.y * 5.0 + 0.013),
            Vec3::NEG_Y,
        )
    }

    fn config() -> TerrainConfig {
        let mut config = TerrainConfig::default();
        config.brush = BrushSettings {
            kind: BrushKind::Raise,
            radius: 2.0,
            strength: 0.1,
            color: [1.0, 0.0, 0.0],
        };
        config.map.size = 10.0;
        config.map.resolution = 10;
        config.view.edit_active = true;
        config
    }

    fn created_session() -> (SculptSession, Receiver<EngineToRenderer>) {
        let (mut session, rx) = SculptSession::new(config());
        session.enter_create().unwrap();
        while rx.try_recv().is_ok() {}
        (session, rx)
    }

    fn center_height(session: &SculptSession) -> f32 {
        session.active_mesh().unwrap().height(60).unwrap()
    }

    #[test]
    fn test_down_move_up_transitions() {
        let (mut session, _rx) = created_session();
        assert_eq!(session.phase(), StrokePhase::Idle);

        let outcome = session.pointer_down(Vec2::ZERO, &top_down);
        assert!(matches!(outcome, Some(ApplyOutcome::Applied { vertices_touched }) if vertices_touched > 0));
        assert_eq!(session.phase(), StrokePhase::Dragging);

        session.pointer_move(Vec2::new(0.1, 0.0), &top_down);
        assert_eq!(session.phase(), StrokePhase::Dragging);

        session.pointer_up();
        assert_eq!(session.phase(), StrokePhase::Idle);
    }

    #[test]
    fn test_each_move_reapplies_brush() {
        let (mut session, _rx) = created_session();
        session.pointer_down(Vec2::ZERO, &top_down);
        let after_down = center_height(&session);
        session.pointer_move(Vec2::ZERO, &top_down);
        session.pointer_move(Vec2::ZERO, &top_down);
        assert!((center_height(&session) - 3.0 * after_down).abs() < 1e-5);
    }

    #[test]
    fn test_hover_does_not_mutate() {
        let (mut session, rx) = created_session();
        assert_eq!(session.pointer_move(Vec2::ZERO, &top_down), None);
        assert_eq!(center_height(&session), 0.0);

        let cursor = rx.try_recv().unwrap();
        assert!(matches!(cursor, EngineToRenderer::BrushCursor { position: Some(_), .. }));
    }

    #[test]
    fn test_leaving_drag_keeps_mesh_state() {
        let (mut session, _rx) = created_session();
        session.pointer_down(Vec2::ZERO, &top_down);
        let height = center_height(&session);
        session.pointer_up();
        assert_eq!(center_height(&session), height);
    }

    #[test]
    fn test_view_interaction_leaves_brush_inert() {
        let (mut session, rx) = created_session();
        session.set_edit_active(false);
        session.on_frame();

        assert_eq!(session.pointer_down(Vec2::ZERO, &top_down), None);
        assert_eq!(session.phase(), StrokePhase::Idle);
        assert_eq!(center_height(&session), 0.0);

        let messages: Vec<_> = rx.try_iter().collect();
        assert!(!messages.contains(&EngineToRenderer::CameraControlsEnabled { enabled: false }));
        assert!(messages.contains(&EngineToRenderer::CameraControlsEnabled { enabled: true }));
    }

    #[test]
    fn test_edit_toggle_off_ends_stroke() {
        let (mut session, _rx) = created_session();
        session.pointer_down(Vec2::ZERO, &top_down);
        session.set_edit_active(false);
        assert_eq!(session.phase(), StrokePhase::Idle);
        assert_eq!(session.pointer_move(Vec2::ZERO, &top_down), None);
    }

    #[test]
    fn test_focus_lost_forces_idle() {
        let (mut session, _rx) = created_session();
        session.set_modifiers(Modifiers { invert: true });
        session.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 }, &top_down);
        session.handle_pointer(PointerEvent::FocusLost, &top_down);
        assert_eq!(session.phase(), StrokePhase::Idle);
        assert!(!session.modifiers().invert);
    }

    #[test]
    fn test_no_active_mesh_is_noop() {
        let (mut session, rx) = SculptSession::new(config());
        assert_eq!(
            session.pointer_down(Vec2::ZERO, &top_down),
            Some(ApplyOutcome::NoActiveMesh)
        );
        assert_eq!(session.pointer_move(Vec2::ZERO, &top_down), Some(ApplyOutcome::NoActiveMesh));
        assert!(rx.try_iter().all(|m| !matches!(m, EngineToRenderer::GeometryDirty { .. })));
    }

    #[test]
    fn test_miss_every_frame_is_tolerated() {
        let (mut session, rx) = created_session();
        let off_mesh = |_: Vec2| Ray::new(Vec3::new(100.0, 10.0, 0.0), Vec3::NEG_Y);
        let no_ray = |_: Vec2| -> Option<Ray> { None };

        assert_eq!(session.pointer_down(Vec2::ZERO, &off_mesh), Some(ApplyOutcome::Miss));
        for _ in 0..10 {
            assert_eq!(session.pointer_move(Vec2::ZERO, &off_mesh), Some(ApplyOutcome::Miss));
            assert_eq!(session.pointer_move(Vec2::ZERO, &no_ray), Some(ApplyOutcome::Miss));
            session.on_frame();
        }
        session.pointer_up();

        assert!(rx.try_iter().all(|m| !matches!(
            m,
            EngineToRenderer::GeometryDirty { .. } | EngineToRenderer::BrushCursor { .. }
        )));
    }

    #[test]
    fn test_invert_modifier_lowers() {
        let (mut session, _rx) = created_session();
        session.set_modifiers(Modifiers { invert: true });
        session.pointer_down(Vec2::ZERO, &top_down);
        assert!(center_height(&session) < 0.0);
        assert!(session.brush_config().invert);
    }

    #[test]
    fn test_geometry_dirty_pushed() {
        let (mut session, rx) = created_session();
        session.pointer_down(Vec2::ZERO, &top_down);
        let id = session.active_mesh().unwrap().id().0;
        let messages: Vec<_> = rx.try_iter().collect();
        assert!(messages.contains(&EngineToRenderer::GeometryDirty {
            mesh_id: id,
            positions: true,
            colors: false,
        }));
    }

    #[test]
    fn test_vertex_colors_enabled_once() {
        let (mut session, rx) = created_session();
        session
            .apply_command(EditorCommand::SetBrushKind(BrushKind::Paint))
            .unwrap();
        session.pointer_down(Vec2::ZERO, &top_down);
        session.pointer_move(Vec2::new(0.1, 0.1), &top_down);
        session.pointer_up();
        session.pointer_down(Vec2::ZERO, &top_down);

        let enabled = rx
            .try_iter()
            .filter(|m| matches!(m, EngineToRenderer::VertexColorsEnabled { .. }))
            .count();
        assert_eq!(enabled, 1);

        let color = session.active_mesh().unwrap().color(60).unwrap();
        assert!(color[0] > 0.99 && color[1] < 0.01 && color[2] < 0.01);
    }

    #[test]
    fn test_view_knobs_coalesce_per_frame() {
        let (mut session, rx) = created_session();
        session.set_wireframe(true);
        session.set_wireframe(false);
        session.set_wireframe(true);
        assert!(rx.try_recv().is_err());

        session.on_frame();
        let wireframe: Vec<_> = rx
            .try_iter()
            .filter(|m| matches!(m, EngineToRenderer::WireframeChanged { .. }))
            .collect();
        assert_eq!(wireframe, vec![EngineToRenderer::WireframeChanged { enabled: true }]);
        assert!(session.active_mesh().unwrap().handle().borrow().material.wireframe);

        session.on_frame();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_resolution_change_regenerates_plane() {
        let (mut session, rx) = created_session();
        let first = session.active_mesh().unwrap().id();
        session.pointer_down(Vec2::ZERO, &top_down);
        session.pointer_up();

        session.apply_command(EditorCommand::SetMapResolution(4)).unwrap();
        let mesh = session.active_mesh().unwrap();
        assert_ne!(mesh.id(), first);
        assert_eq!(mesh.vertex_count(), 25);
        assert!((0..25).all(|i| mesh.height(i) == Some(0.0)));
        assert!(rx.try_iter().any(|m| m == EngineToRenderer::MeshReleased { mesh_id: first.0 }));
    }

    #[test]
    fn test_rejected_map_size_keeps_settings() {
        let (mut session, rx) = created_session();
        let plane = session.active_mesh().unwrap().id();
        let map = session.config().map.clone();

        assert!(matches!(
            session.apply_command(EditorCommand::SetMapSize(0.0)),
            Err(SculptError::InvalidGrid { .. })
        ));
        assert_eq!(session.config().map, map);
        assert_eq!(session.active_mesh().unwrap().id(), plane);
        assert!(rx.try_recv().is_err());

        session.apply_command(EditorCommand::SetMapResolution(8)).unwrap();
        assert_eq!(session.config().map.size, 10.0);
        assert_eq!(session.config().map.resolution, 8);
        assert_eq!(session.active_mesh().unwrap().vertex_count(), 81);
    }

    #[test]
    fn test_camera_speed_flushed_on_frame() {
        let (mut session, rx) = created_session();
        session.on_frame();
        while rx.try_recv().is_ok() {}

        session.apply_command(EditorCommand::SetCameraSpeed(2.0)).unwrap();
        session.apply_command(EditorCommand::SetCameraSpeed(3.5)).unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(session.config().view.camera_speed, 3.5);

        session.on_frame();
        let messages: Vec<_> = rx.try_iter().collect();
        assert_eq!(messages, vec![EngineToRenderer::CameraSpeedChanged { speed: 3.5 }]);
    }

    #[test]
    fn test_reimported_export_rebinds_with_notifications() {
        let (mut session, rx) = created_session();
        session.pointer_down(Vec2::ZERO, &top_down);
        session.pointer_up();
        let plane = session.active_mesh().unwrap().id();
        let snapshot = session.export_snapshot().unwrap();
        while rx.try_recv().is_ok() {}

        let handle = SceneMesh::from(snapshot).into_handle();
        assert_eq!(handle.borrow().id, plane);
        assert_eq!(session.enter_edit(handle.clone()).unwrap(), plane);
        assert_eq!(session.terrain_type(), TerrainType::Edit);
        assert!(session.active_mesh().unwrap().is_bound_to(&handle));

        let messages: Vec<_> = rx.try_iter().collect();
        assert!(messages.contains(&EngineToRenderer::MeshReleased { mesh_id: plane.0 }));
        assert!(messages.contains(&EngineToRenderer::MeshBound {
            mesh_id: plane.0,
            terrain_type: TerrainType::Edit,
        }));
        assert!(messages.iter().any(|m| matches!(m, EngineToRenderer::BrushCursor { position: None, .. })));

        // Binding the same handle again changes nothing
        session.enter_edit(handle).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rejected_bind_reports_and_stays_idle() {
        let (mut session, rx) = created_session();
        let plane = session.active_mesh().unwrap().id();
        let handle = SceneMesh::with_attribute(
            MeshId(7),
            VertexAttribute::Float32x4(vec![[0.0, 0.0, 0.0, 1.0]; 3]),
            None,
        )
        .into_handle();

        assert!(session.enter_edit(handle).is_err());
        assert_eq!(session.phase(), StrokePhase::Idle);
        assert_eq!(session.terrain_type(), TerrainType::Create);
        assert_eq!(session.active_mesh().unwrap().id(), plane);
        assert!(rx
            .try_iter()
            .any(|m| matches!(m, EngineToRenderer::BindRejected { .. })));
    }

    #[test]
    fn test_switch_to_edit_type_releases_plane() {
        let (mut session, rx) = created_session();
        let plane = session.active_mesh().unwrap().id();
        session
            .apply_command(EditorCommand::SetTerrainType(TerrainType::Edit))
            .unwrap();
        assert!(session.active_mesh().is_none());
        assert_eq!(session.terrain_type(), TerrainType::Edit);
        assert!(rx.try_iter().any(|m| m == EngineToRenderer::MeshReleased { mesh_id: plane.0 }));

        // Map changes no longer regenerate anything
        session.apply_command(EditorCommand::SetMapSize(20.0)).unwrap();
        assert!(session.active_mesh().is_none());
    }
}
