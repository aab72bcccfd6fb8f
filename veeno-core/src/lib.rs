/// Veeno Core Library - scene logic shared by the terminal and web front ends
///
/// This library holds everything that does not touch a display: typeface
/// parsing, text extrusion, the scene graph and geometry pool, the text mesh
/// rebuilder, camera rigs, shading, the debug panel model and asset handles.

pub mod assets;
pub mod axes;
pub mod clock;
pub mod config;
pub mod controller;
pub mod controls;
pub mod decor;
pub mod error;
pub mod extrude;
pub mod font;
pub mod geometry;
pub mod light;
pub mod material;
pub mod panel;
pub mod params;
pub mod projection;
pub mod raster;
pub mod rebuild;
pub mod scene;
pub mod shape;
pub mod text;
pub mod transform;
pub mod viewport;

// Re-export commonly used types
pub use assets::{Loading, Resolver};
pub use axes::AxesHelper;
pub use clock::FrameClock;
pub use config::SceneConfig;
pub use controller::{AssetEvent, SceneController};
pub use controls::{CameraMode, CameraRig, OrbitControls, PointerOrbit};
pub use decor::{DecorField, DecorSettings, DecorShape};
pub use error::{Error, Result};
pub use font::Font;
pub use geometry::{BoundingBox, Mesh, Triangle, Vertex};
pub use light::{AmbientLight, Lights, PointLight};
pub use material::{Color, Fragment, Matcap, Material, Texture};
pub use panel::{Control, ControlEffect, ControlKind, ControlValue, Panel};
pub use params::{TextField, TextParams};
pub use projection::{Camera, ScreenPoint};
pub use raster::ScreenTriangle;
pub use rebuild::{RebuildOutcome, TextMeshRebuilder};
pub use scene::{ObjectId, ObjectKind, Scene, SceneObject};
pub use transform::{RotationState, Transform};
pub use viewport::{Pointer, Viewport};
