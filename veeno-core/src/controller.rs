/// The scene and everything that drives it, independent of the front end
use nalgebra::Point3;
use rand::Rng;
use std::sync::Arc;
use std::task::Poll;

use crate::assets::Loading;
use crate::axes::{AxesHelper, AXES_SIZE};
use crate::clock::FrameClock;
use crate::config::SceneConfig;
use crate::controls::{CameraMode, CameraRig};
use crate::decor::DecorField;
use crate::error::Result;
use crate::font::Font;
use crate::material::{Color, Matcap, Material, Texture};
use crate::panel::{Bound, Control, ControlEffect, ControlValue, Panel};
use crate::params::TextParams;
use crate::projection::Camera;
use crate::raster::{project_scene, ScreenTriangle};
use crate::rebuild::{RebuildOutcome, TextMeshRebuilder};
use crate::scene::{ObjectId, Scene};
use crate::viewport::{Pointer, Viewport};

/// Base color of the toon-shaded decorations
pub const DECOR_COLOR: u32 = 0x8f7cf2;

/// Something that happened while polling pending assets
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    FontLoaded { family: String, glyphs: usize },
    MatcapLoaded,
    ToonTextureLoaded,
    Failed { asset: &'static str, error: String },
}

pub struct SceneController {
    params: TextParams,
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    rig: CameraRig,
    pointer: Pointer,
    decor: DecorField,
    axes: Option<AxesHelper>,
    show_axes: bool,
    rebuilder: TextMeshRebuilder,
    panel: Panel,
    clock: FrameClock,
    font: Option<Arc<Font>>,
    font_loading: Option<Loading<Font>>,
    matcap_loading: Option<Loading<Matcap>>,
    toon_loading: Option<Loading<Texture>>,
}

impl SceneController {
    /// Build the scene synchronously. Assets are attached separately and
    /// picked up by [`poll_assets`](Self::poll_assets).
    pub fn new<R: Rng>(config: &SceneConfig, viewport: Viewport, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let mut scene = Scene::new();
        let decor = DecorField::spawn(
            &mut scene,
            &config.decor,
            Material::toon(Color::from_hex(DECOR_COLOR)),
            rng,
        );
        let camera = Camera::new(viewport.aspect());

        tracing::info!(
            decorations = decor.len(),
            camera = ?config.camera,
            "scene created"
        );

        Ok(Self {
            params: config.text.clone(),
            scene,
            camera,
            viewport,
            rig: CameraRig::new(config.camera, Point3::origin()),
            pointer: Pointer::default(),
            decor,
            axes: None,
            show_axes: config.axes,
            rebuilder: TextMeshRebuilder::new(Material::Matcap(Arc::new(Matcap::studio()))),
            panel: Panel::standard(),
            clock: FrameClock::new(),
            font: None,
            font_loading: None,
            matcap_loading: None,
            toon_loading: None,
        })
    }

    pub fn attach_font(&mut self, loading: Loading<Font>) {
        self.font_loading = Some(loading);
    }

    pub fn attach_matcap(&mut self, loading: Loading<Matcap>) {
        self.matcap_loading = Some(loading);
    }

    /// Texture for the decorations' toon material
    pub fn attach_toon_texture(&mut self, loading: Loading<Texture>) {
        self.toon_loading = Some(loading);
    }

    /// Take any resolved assets and run their continuations
    pub fn poll_assets(&mut self) -> Vec<AssetEvent> {
        let mut events = Vec::new();

        if let Some(loading) = &mut self.font_loading {
            if let Poll::Ready(result) = loading.poll() {
                self.font_loading = None;
                match result {
                    Ok(font) => {
                        tracing::info!(family = %font.family_name, glyphs = font.glyph_count(), "font ready");
                        events.push(AssetEvent::FontLoaded {
                            family: font.family_name.clone(),
                            glyphs: font.glyph_count(),
                        });
                        self.font = Some(Arc::new(font));
                        if self.show_axes && self.axes.is_none() {
                            self.axes = Some(AxesHelper::spawn(&mut self.scene, AXES_SIZE));
                        }
                        if let Err(error) = self.rebuild() {
                            tracing::error!(%error, "initial text build failed");
                        }
                    }
                    Err(error) => {
                        tracing::error!(%error, "font failed to load");
                        events.push(AssetEvent::Failed {
                            asset: "font",
                            error: error.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(loading) = &mut self.matcap_loading {
            if let Poll::Ready(result) = loading.poll() {
                self.matcap_loading = None;
                match result {
                    Ok(matcap) => {
                        tracing::info!("matcap ready");
                        self.rebuilder
                            .set_material(&mut self.scene, Material::Matcap(Arc::new(matcap)));
                        events.push(AssetEvent::MatcapLoaded);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "matcap failed to load, keeping built-in matcap");
                        events.push(AssetEvent::Failed {
                            asset: "matcap",
                            error: error.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(loading) = &mut self.toon_loading {
            if let Poll::Ready(result) = loading.poll() {
                self.toon_loading = None;
                match result {
                    Ok(texture) => {
                        tracing::info!(size = ?texture.dimensions(), "toon texture ready");
                        let material = Material::Toon {
                            color: Color::from_hex(DECOR_COLOR),
                            map: Some(Arc::new(texture)),
                        };
                        self.decor.set_material(&mut self.scene, &material);
                        events.push(AssetEvent::ToonTextureLoaded);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "toon texture failed to load, keeping plain toon");
                        events.push(AssetEvent::Failed {
                            asset: "toon texture",
                            error: error.to_string(),
                        });
                    }
                }
            }
        }

        events
    }

    /// Rebuild the text mesh from the current parameters
    pub fn rebuild(&mut self) -> Result<RebuildOutcome> {
        self.rebuilder.rebuild(
            &mut self.scene,
            &mut self.camera,
            &self.params,
            self.font.as_deref(),
        )
    }

    fn after_control(&mut self, effect: ControlEffect) -> Result<ControlEffect> {
        if effect == ControlEffect::Rebuild {
            self.rebuild()?;
        }
        Ok(effect)
    }

    /// Apply a panel edit; text edits rebuild the mesh immediately
    pub fn apply_control(&mut self, index: usize, value: ControlValue) -> Result<ControlEffect> {
        let effect = self.panel.apply(
            index,
            value,
            Bound {
                lights: &mut self.scene.lights,
                camera: &mut self.camera,
                params: &mut self.params,
            },
        )?;
        self.after_control(effect)
    }

    pub fn nudge_control(&mut self, index: usize, steps: i32) -> Result<ControlEffect> {
        let effect = self.panel.nudge(
            index,
            steps,
            Bound {
                lights: &mut self.scene.lights,
                camera: &mut self.camera,
                params: &mut self.params,
            },
        )?;
        self.after_control(effect)
    }

    pub fn control_value(&self, index: usize) -> Result<ControlValue> {
        self.panel
            .value(index, &self.scene.lights, &self.camera, &self.params)
    }

    pub fn control(&self, index: usize) -> Option<&Control> {
        self.panel.get(index)
    }

    pub fn control_count(&self) -> usize {
        self.panel.len()
    }

    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> Result<()> {
        self.viewport
            .resize(&mut self.camera, width, height, device_pixel_ratio)
    }

    /// Pointer position in viewport units
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Pointer::normalize(x, y, &self.viewport);
    }

    /// Queue an orbit rotation; ignored in pointer mode
    pub fn orbit(&mut self, left: f32, up: f32) {
        if let CameraRig::Orbit(controls) = &mut self.rig {
            controls.rotate_left(left);
            controls.rotate_up(up);
        }
    }

    pub fn zoom(&mut self, factor: f32) {
        if let CameraRig::Orbit(controls) = &mut self.rig {
            controls.zoom(factor);
        }
    }

    /// Advance one frame at timestamp `now` (seconds)
    pub fn tick(&mut self, now: f64) -> Vec<AssetEvent> {
        self.clock.tick(now);
        let events = self.poll_assets();
        self.decor.update(&mut self.scene, self.clock.elapsed());
        self.rig.update(&mut self.camera, self.pointer);
        events
    }

    /// Shaded triangles of the current frame for a `width` x `height` target
    pub fn frame(&self, width: f32, height: f32) -> Vec<ScreenTriangle> {
        project_scene(&self.scene, &self.camera, width, height)
    }

    pub fn params(&self) -> &TextParams {
        &self.params
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.rig.mode()
    }

    pub fn decor(&self) -> &DecorField {
        &self.decor
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn font(&self) -> Option<&Font> {
        self.font.as_deref()
    }

    pub fn text_mesh(&self) -> Option<ObjectId> {
        self.rebuilder.current()
    }

    pub fn axes(&self) -> Option<&AxesHelper> {
        self.axes.as_ref()
    }

    /// Whether an attached asset has not resolved yet
    pub fn is_loading(&self) -> bool {
        self.font_loading.is_some() || self.matcap_loading.is_some() || self.toon_loading.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decor::DecorSettings;
    use crate::error::Error;
    use crate::scene::ObjectKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TINY_FONT: &str = r#"{
        "glyphs": {
            "v": { "ha": 700, "x_min": 0, "x_max": 700, "o": "m 0 700 l 350 0 l 700 700 l 550 700 l 350 250 l 150 700 z" }
        },
        "familyName": "Tiny",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "yMin": 0, "xMax": 700, "yMax": 700 },
        "underlineThickness": 50
    }"#;

    fn controller() -> SceneController {
        let config = SceneConfig {
            decor: DecorSettings {
                count: Some(10),
                ..DecorSettings::default()
            },
            text: TextParams {
                text: "vv".to_string(),
                ..TextParams::default()
            },
            ..SceneConfig::default()
        };
        let viewport = Viewport::new(800, 600, 1.0).unwrap();
        SceneController::new(&config, viewport, &mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_scene_exists_before_font() {
        let mut controller = controller();
        controller.tick(0.0);
        assert_eq!(controller.decor().len(), 10);
        assert_eq!(controller.text_mesh(), None);
        assert_eq!(controller.rebuild().unwrap(), RebuildOutcome::FontPending);
    }

    #[test]
    fn test_font_resolution_builds_text() {
        let mut controller = controller();
        let (loading, resolver) = Loading::pending("font");
        controller.attach_font(loading);
        assert!(controller.tick(0.0).is_empty());
        assert!(controller.is_loading());

        resolver.resolve(Font::from_json(TINY_FONT));
        let events = controller.tick(0.016);
        assert!(matches!(&events[..], [AssetEvent::FontLoaded { glyphs: 1, .. }]));
        assert!(controller.text_mesh().is_some());
        assert_eq!(controller.scene().count_kind(ObjectKind::Text), 1);
    }

    #[test]
    fn test_failed_font_leaves_scene_without_text() {
        let mut controller = controller();
        controller.attach_font(Loading::ready("font", Err(Error::Config("missing".into()))));
        let events = controller.poll_assets();
        assert!(matches!(&events[..], [AssetEvent::Failed { asset: "font", .. }]));
        assert_eq!(controller.text_mesh(), None);
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_text_control_rebuilds() {
        let mut controller = controller();
        controller.attach_font(Loading::ready("font", Font::from_json(TINY_FONT)));
        controller.poll_assets();
        let first = controller.text_mesh().unwrap();

        let depth = (0..controller.control_count())
            .find(|&i| controller.control(i).map(|c| c.label) == Some("depth"))
            .unwrap();
        let effect = controller.apply_control(depth, ControlValue::Number(0.5)).unwrap();
        assert_eq!(effect, ControlEffect::Rebuild);
        assert_ne!(controller.text_mesh(), Some(first));
        assert_eq!(controller.scene().count_kind(ObjectKind::Text), 1);
        // Shared decoration geometry, the axes and the text
        assert_eq!(controller.scene().live_geometries(), 3);
    }

    #[test]
    fn test_matcap_failure_keeps_studio_material() {
        let mut controller = controller();
        controller.attach_matcap(Loading::ready("matcap", Matcap::from_bytes(b"bogus")));
        let events = controller.poll_assets();
        assert!(matches!(&events[..], [AssetEvent::Failed { asset: "matcap", .. }]));
    }

    fn decoration_materials(controller: &SceneController) -> Vec<Material> {
        controller
            .scene()
            .iter()
            .filter(|(_, object)| object.kind == ObjectKind::Decoration)
            .map(|(_, object)| object.material.clone())
            .collect()
    }

    #[test]
    fn test_toon_texture_maps_every_decoration() {
        let mut controller = controller();
        let (loading, resolver) = Loading::pending("toon texture");
        controller.attach_toon_texture(loading);
        assert!(controller.tick(0.0).is_empty());
        assert!(controller.is_loading());

        resolver.resolve(Ok(Texture::from_image(image::RgbImage::new(2, 2))));
        let events = controller.tick(0.016);
        assert_eq!(events, vec![AssetEvent::ToonTextureLoaded]);
        let materials = decoration_materials(&controller);
        assert_eq!(materials.len(), 10);
        for material in materials {
            assert!(matches!(material, Material::Toon { map: Some(_), .. }));
        }
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_toon_texture_failure_keeps_plain_toon() {
        let mut controller = controller();
        controller.attach_toon_texture(Loading::ready("toon texture", Texture::from_bytes(b"bogus")));
        let events = controller.poll_assets();
        assert!(matches!(&events[..], [AssetEvent::Failed { asset: "toon texture", .. }]));
        for material in decoration_materials(&controller) {
            assert_eq!(material, Material::toon(Color::from_hex(DECOR_COLOR)));
        }
    }

    #[test]
    fn test_axes_follow_font_and_config() {
        let mut controller = controller();
        assert!(controller.axes().is_none());
        controller.attach_font(Loading::ready("font", Font::from_json(TINY_FONT)));
        controller.poll_assets();
        assert!(controller.axes().is_some());
        assert_eq!(controller.scene().count_kind(ObjectKind::Helper), 3);

        let config = SceneConfig {
            axes: false,
            ..SceneConfig::default()
        };
        let viewport = Viewport::new(800, 600, 1.0).unwrap();
        let mut hidden = SceneController::new(&config, viewport, &mut StdRng::seed_from_u64(1)).unwrap();
        hidden.attach_font(Loading::ready("font", Font::from_json(TINY_FONT)));
        hidden.poll_assets();
        assert!(hidden.axes().is_none());
        assert_eq!(hidden.scene().count_kind(ObjectKind::Helper), 0);
    }

    #[test]
    fn test_camera_edit_survives_orbit_updates() {
        let mut controller = controller();
        let x = (0..controller.control_count())
            .find(|&i| controller.control(i).map(|c| c.path()) == Some("CAMERA/x".to_string()))
            .unwrap();
        let effect = controller.apply_control(x, ControlValue::Number(-4.5)).unwrap();
        assert_eq!(effect, ControlEffect::Updated);

        for frame in 0..10 {
            controller.tick(frame as f64 / 60.0);
        }
        let position = controller.camera().position;
        assert!((position.x + 4.5).abs() < 1e-4, "camera drifted to {position}");
        assert!((position.y - 1.0).abs() < 1e-4);
        assert!((position.z - 3.0).abs() < 1e-4);
        assert_eq!(controller.control_value(x).unwrap(), ControlValue::Number(controller.camera().position.x));
    }

    #[test]
    fn test_zero_resize_keeps_aspect() {
        let mut controller = controller();
        let aspect = controller.camera().aspect;
        assert!(controller.resize(0, 600, 1.0).is_err());
        assert_eq!(controller.camera().aspect, aspect);
        controller.resize(1000, 500, 3.0).unwrap();
        assert_eq!(controller.camera().aspect, 2.0);
        assert_eq!(controller.viewport().backing_size(), (2000, 1000));
    }

    #[test]
    fn test_orbit_moves_camera_over_frames() {
        let mut controller = controller();
        let start = controller.camera().position;
        controller.orbit(0.5, 0.0);
        for frame in 0..30 {
            controller.tick(frame as f64 / 60.0);
        }
        assert!((controller.camera().position - start).norm() > 0.01);
        assert_eq!(controller.camera_mode(), CameraMode::Orbit);
    }
}
