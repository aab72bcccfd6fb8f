/// Veeno Terminal - extruded text scene in the terminal
///
/// Controls:
///   - Tab / Shift-Tab: Select a panel control
///   - +/- and </>: Adjust the selected control by one or ten steps
///   - Space: Toggle, Enter: Edit text
///   - WASD / Arrow Keys: Orbit the camera, Z/X: Zoom
///   - Q/ESC: Quit
use clap::Parser;
use veeno_terminal::cli::{init_logging, Args};
use veeno_terminal::TerminalApp;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let config = args.scene_config()?;
    tracing::info!(font = %config.font, fps = config.fps, "starting terminal renderer");

    let mut app = TerminalApp::new(&config)?;
    app.run()?;

    tracing::info!("terminal renderer exited");
    Ok(())
}
