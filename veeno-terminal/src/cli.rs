/// Command-line options and logging setup
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use veeno_core::{CameraMode, SceneConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CameraArg {
    /// Damped orbit steered with the arrow keys
    Orbit,
    /// Camera follows the mouse
    Pointer,
}

impl From<CameraArg> for CameraMode {
    fn from(arg: CameraArg) -> Self {
        match arg {
            CameraArg::Orbit => CameraMode::Orbit,
            CameraArg::Pointer => CameraMode::Pointer,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "veeno-terminal")]
#[command(version)]
#[command(about = "Extruded text scene rendered in the terminal", long_about = None)]
pub struct Args {
    /// Scene configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Typeface JSON font
    #[arg(long)]
    pub font: Option<String>,

    /// Matcap image for the text
    #[arg(long)]
    pub matcap: Option<String>,

    /// Image that tints the decorations
    #[arg(long)]
    pub toon_texture: Option<String>,

    /// Hide the axes helper
    #[arg(long)]
    pub no_axes: bool,

    /// Text to extrude
    #[arg(short, long)]
    pub text: Option<String>,

    /// Number of decorations
    #[arg(long)]
    pub count: Option<usize>,

    /// Seed for decoration placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Camera rig
    #[arg(long, value_enum)]
    pub camera: Option<CameraArg>,

    /// Target frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Write logs to this file; logging is off otherwise
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Minimum level written to the log file
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Args {
    /// The configuration file, if any, with command-line overrides applied
    pub fn scene_config(&self) -> anyhow::Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SceneConfig::default(),
        };

        if let Some(font) = &self.font {
            config.font = font.clone();
        }
        if let Some(matcap) = &self.matcap {
            config.matcap = Some(matcap.clone());
        }
        if let Some(texture) = &self.toon_texture {
            config.toon_texture = Some(texture.clone());
        }
        if self.no_axes {
            config.axes = false;
        }
        if let Some(text) = &self.text {
            config.text.text = text.replace("\\n", "\n");
        }
        if let Some(count) = self.count {
            config.decor.count = Some(count);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(camera) = self.camera {
            config.camera = camera.into();
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Send logs to the configured file. The terminal itself is owned by the
/// renderer, so without a file nothing is logged.
pub fn init_logging(args: &Args) -> anyhow::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}
