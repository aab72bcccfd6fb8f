/// Replacing the text mesh when its parameters change
use nalgebra::Vector3;

use crate::error::Result;
use crate::font::Font;
use crate::material::Material;
use crate::params::TextParams;
use crate::projection::Camera;
use crate::scene::{ObjectId, ObjectKind, Scene, SceneObject};
use crate::text::text_geometry;

/// Result of a [`TextMeshRebuilder::rebuild`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RebuildOutcome {
    /// The font has not resolved yet; nothing was touched
    FontPending,
    Rebuilt {
        object: ObjectId,
        vertices: usize,
        /// Translation applied to centre the geometry
        offset: Vector3<f32>,
    },
}

/// Owns the single text mesh in a scene
#[derive(Debug)]
pub struct TextMeshRebuilder {
    current: Option<ObjectId>,
    material: Material,
}

impl TextMeshRebuilder {
    pub fn new(material: Material) -> Self {
        Self {
            current: None,
            material,
        }
    }

    /// The attached text mesh, if any
    pub fn current(&self) -> Option<ObjectId> {
        self.current
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Swap the material used for new meshes and the attached one
    pub fn set_material(&mut self, scene: &mut Scene, material: Material) {
        if let Some(object) = self.current.and_then(|id| scene.get_mut(id)) {
            object.material = material.clone();
        }
        self.material = material;
    }

    /// Detach the current mesh and release its geometry
    pub fn clear(&mut self, scene: &mut Scene) {
        if let Some(id) = self.current.take() {
            if let Some(object) = scene.remove(id) {
                scene.dispose_geometry(object.geometry);
            }
        }
    }

    /// Rebuild the text mesh from `params`.
    ///
    /// The previous mesh is released before the new geometry is built, so a
    /// failed build leaves the scene without a text mesh rather than with a
    /// stale one.
    pub fn rebuild(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        params: &TextParams,
        font: Option<&Font>,
    ) -> Result<RebuildOutcome> {
        let Some(font) = font else {
            tracing::debug!("font not loaded yet, skipping text rebuild");
            return Ok(RebuildOutcome::FontPending);
        };
        params.validate()?;

        self.clear(scene);

        let mut mesh = text_geometry(font, params)?;
        let offset = mesh.center();
        let vertices = mesh.vertex_count();

        let geometry = scene.insert_geometry(mesh);
        let object = scene.add(SceneObject::new(
            "text",
            ObjectKind::Text,
            geometry,
            self.material.clone(),
        ));
        self.current = Some(object);

        let position = scene
            .get(object)
            .map(|object| object.transform.position)
            .unwrap_or_else(nalgebra::Point3::origin);
        camera.look_at(position);

        tracing::debug!(
            text = %params.text,
            vertices,
            live_geometries = scene.live_geometries(),
            "text mesh rebuilt"
        );

        Ok(RebuildOutcome::Rebuilt {
            object,
            vertices,
            offset,
        })
    }
}
