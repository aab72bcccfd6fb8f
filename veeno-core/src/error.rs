/// Error types for the scene core
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid font data: {0}")]
    FontParse(#[from] serde_json::Error),

    #[error("Malformed glyph outline for {glyph:?}: {reason}")]
    Outline { glyph: char, reason: String },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Tessellation failed: {0}")]
    Tessellation(String),

    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("Texture error: {0}")]
    Texture(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Asset loader dropped before resolving {0}")]
    AssetDropped(&'static str),

    #[error("No control at index {0}")]
    UnknownControl(usize),

    #[error("Control {label} does not accept {value}")]
    ControlType { label: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
