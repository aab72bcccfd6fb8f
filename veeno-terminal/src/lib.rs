/// Terminal front end: ASCII rendering of the veeno scene with a keyboard panel
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, MouseEvent, MouseEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::time::Duration;
use veeno_core::{
    AssetEvent, ControlKind, ControlValue, SceneConfig, SceneController, Viewport,
};

pub mod cli;
pub mod input;
pub mod loader;
pub mod render_loop;
pub mod renderer;

pub use input::{Action, EditOutcome, TextEditor};
pub use render_loop::{FrameInfo, LoopHandle, RenderLoop};
pub use renderer::AsciiRenderer;

/// Terminal cells are about twice as tall as they are wide
pub const CELL_ASPECT: u32 = 2;

/// Viewport in square units for a terminal of `cols` x `rows` cells
pub fn cell_viewport(cols: u16, rows: u16) -> veeno_core::Result<Viewport> {
    Viewport::new(cols as u32, rows as u32 * CELL_ASPECT, 1.0)
}

/// Everything a frame reads and mutates
pub struct Session {
    controller: SceneController,
    renderer: AsciiRenderer,
    handle: LoopHandle,
    selected: usize,
    editor: Option<TextEditor>,
    status: Option<String>,
}

impl Session {
    pub fn new(controller: SceneController, cols: u16, rows: u16, handle: LoopHandle) -> Self {
        Self {
            controller,
            renderer: AsciiRenderer::new(cols as usize, rows as usize),
            handle,
            selected: 0,
            editor: None,
            status: None,
        }
    }

    pub fn controller(&self) -> &SceneController {
        &self.controller
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    fn report<T>(&mut self, result: veeno_core::Result<T>) {
        if let Err(error) = result {
            tracing::warn!(%error, "panel edit rejected");
            self.status = Some(error.to_string());
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
                column,
                row,
                ..
            }) => {
                let x = column as f32 + 0.5;
                let y = (row as f32 + 0.5) * CELL_ASPECT as f32;
                self.controller.pointer_moved(x, y);
            }
            Event::Resize(cols, rows) => {
                match self.controller.resize(cols as u32, rows as u32 * CELL_ASPECT, 1.0) {
                    Ok(()) => self.renderer.resize(cols as usize, rows as usize),
                    Err(error) => tracing::debug!(%error, "ignoring resize"),
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(editor) = &mut self.editor {
            match editor.handle(key) {
                EditOutcome::Editing => {}
                EditOutcome::Cancel => self.editor = None,
                EditOutcome::Commit(text) => {
                    self.editor = None;
                    let result = self.controller.apply_control(self.selected, ControlValue::Text(text));
                    self.report(result);
                }
            }
            return;
        }

        let Some(action) = input::map_key(key) else {
            return;
        };
        let count = self.controller.control_count().max(1);
        match action {
            Action::Quit => self.handle.cancel(),
            Action::SelectNext => self.selected = (self.selected + 1) % count,
            Action::SelectPrevious => self.selected = (self.selected + count - 1) % count,
            Action::Nudge(steps) => {
                let result = self.controller.nudge_control(self.selected, steps);
                self.report(result);
            }
            Action::Toggle => {
                if matches!(self.selected_kind(), Some(ControlKind::Toggle)) {
                    let result = self.controller.nudge_control(self.selected, 1);
                    self.report(result);
                }
            }
            Action::BeginEdit => {
                if matches!(self.selected_kind(), Some(ControlKind::TextInput)) {
                    if let Ok(ControlValue::Text(text)) = self.controller.control_value(self.selected) {
                        self.editor = Some(TextEditor::new(&text));
                    }
                }
            }
            Action::Orbit { left, up } => self.controller.orbit(left, up),
            Action::Zoom(factor) => self.controller.zoom(factor),
        }
    }

    fn selected_kind(&self) -> Option<&ControlKind> {
        self.controller.control(self.selected).map(|control| &control.kind)
    }

    /// Advance the scene to `now` seconds
    pub fn update(&mut self, now: f64) {
        for event in self.controller.tick(now) {
            if let AssetEvent::Failed { asset, error } = event {
                self.status = Some(format!("{asset}: {error}"));
            }
        }
    }

    /// Status line shown at the top of the screen
    pub fn header(&self, fps: f32) -> String {
        let font = match self.controller.font() {
            Some(font) => font.family_name.clone(),
            None if self.controller.is_loading() => "loading".to_string(),
            None => "unavailable".to_string(),
        };
        let mut line = format!(
            "Veeno | FPS: {fps:.1} | font: {font} | camera: {:?} | decorations: {}",
            self.controller.camera_mode(),
            self.controller.decor().len()
        );
        if let Some(status) = &self.status {
            line.push_str(" | ");
            line.push_str(status);
        }
        line
    }

    /// Panel line shown at the bottom of the screen
    pub fn footer(&self) -> String {
        if let Some(editor) = &self.editor {
            return format!(
                "text> {}_   Enter=commit Alt+Enter=newline Esc=cancel",
                editor.buffer().replace('\n', "\\n")
            );
        }
        let Some(control) = self.controller.control(self.selected) else {
            return String::new();
        };
        let value = self
            .controller
            .control_value(self.selected)
            .map(|value| value.to_string())
            .unwrap_or_default();
        format!(
            "[{}/{}] {} = {}   Tab=select +/-=adjust </>=x10 Space=toggle Enter=edit WASD=orbit Z/X=zoom Q=quit",
            self.selected + 1,
            self.controller.control_count(),
            control.path(),
            value.replace("\\n", "⏎")
        )
    }

    fn render<W: Write>(&mut self, out: &mut W, fps: f32) -> std::io::Result<()> {
        let width = self.renderer.width();
        let height = self.renderer.height();
        let triangles = self.controller.frame(width as f32, height as f32);

        self.renderer.clear();
        self.renderer.render(&triangles);
        self.renderer.draw(out)?;

        let fit = |line: String| line.chars().take(width).collect::<String>();
        queue!(
            out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(fit(self.header(fps))),
            terminal::Clear(ClearType::UntilNewLine),
            cursor::MoveTo(0, height.saturating_sub(1) as u16),
            SetForegroundColor(Color::Cyan),
            Print(fit(self.footer())),
            terminal::Clear(ClearType::UntilNewLine),
            ResetColor
        )?;
        out.flush()
    }

    /// One iteration of the render loop: input, tick, render
    pub fn frame(&mut self, info: FrameInfo) -> anyhow::Result<()> {
        while event::poll(Duration::from_millis(0))? {
            let event = event::read()?;
            self.handle_event(event);
        }
        self.update(info.now);
        self.render(&mut stdout(), info.fps)?;
        Ok(())
    }
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    render_loop: RenderLoop,
    session: Session,
}

impl TerminalApp {
    /// Build the scene for the current terminal size and start loading its
    /// assets in the background
    pub fn new(config: &SceneConfig) -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let viewport = cell_viewport(cols, rows)?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut controller = SceneController::new(config, viewport, &mut rng)?;
        controller.attach_font(loader::load_font(PathBuf::from(&config.font)));
        if let Some(matcap) = &config.matcap {
            controller.attach_matcap(loader::load_matcap(PathBuf::from(matcap)));
        }
        if let Some(texture) = &config.toon_texture {
            controller.attach_toon_texture(loader::load_toon_texture(PathBuf::from(texture)));
        }

        let render_loop = RenderLoop::new(config.fps);
        let session = Session::new(controller, cols, rows, render_loop.handle());
        Ok(Self {
            render_loop,
            session,
        })
    }

    /// Handle that stops [`run`](Self::run) from another thread
    pub fn handle(&self) -> LoopHandle {
        self.render_loop.handle()
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;

        let session = &mut self.session;
        let result = self.render_loop.start(|info| session.frame(info));

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use veeno_core::{DecorSettings, Font, Loading};

    const FONT_JSON: &str = include_str!("../../assets/fonts/veeno.typeface.json");

    fn session() -> Session {
        let config = SceneConfig {
            decor: DecorSettings {
                count: Some(20),
                ..DecorSettings::default()
            },
            ..SceneConfig::default()
        };
        let viewport = cell_viewport(80, 24).unwrap();
        let mut controller =
            SceneController::new(&config, viewport, &mut StdRng::seed_from_u64(5)).unwrap();
        controller.attach_font(Loading::ready("font", Font::from_json(FONT_JSON)));
        let mut session = Session::new(controller, 80, 24, LoopHandle::default());
        session.update(0.0);
        session
    }

    fn press(session: &mut Session, code: KeyCode) {
        session.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn select(session: &mut Session, label: &str) {
        for _ in 0..session.controller().control_count() {
            if session.controller().control(session.selected()).map(|c| c.label) == Some(label) {
                return;
            }
            press(session, KeyCode::Tab);
        }
        panic!("no control {label}");
    }

    #[test]
    fn test_selection_wraps() {
        let mut session = session();
        press(&mut session, KeyCode::BackTab);
        assert_eq!(session.selected(), session.controller().control_count() - 1);
        press(&mut session, KeyCode::Tab);
        assert_eq!(session.selected(), 0);
    }

    #[test]
    fn test_edit_text_control() {
        let mut session = session();
        select(&mut session, "text");
        press(&mut session, KeyCode::Enter);
        assert!(session.is_editing());
        for _ in 0.."veeno".len() {
            press(&mut session, KeyCode::Backspace);
        }
        for ch in "neon".chars() {
            press(&mut session, KeyCode::Char(ch));
        }
        press(&mut session, KeyCode::Enter);
        assert!(!session.is_editing());
        assert_eq!(session.controller().params().text, "neon");
        assert!(session.controller().text_mesh().is_some());
    }

    #[test]
    fn test_escape_cancels_edit_without_quitting() {
        let mut render_loop = RenderLoop::new(1000);
        let mut session = session();
        session.handle = render_loop.handle();
        render_loop
            .start(|_| {
                select(&mut session, "text");
                press(&mut session, KeyCode::Enter);
                press(&mut session, KeyCode::Char('x'));
                press(&mut session, KeyCode::Esc);
                assert!(!session.is_editing());
                assert!(session.handle.is_running());
                session.handle.cancel();
                Ok::<_, ()>(())
            })
            .unwrap();
        assert_eq!(session.controller().params().text, "veeno");
    }

    #[test]
    fn test_nudge_and_toggle() {
        let mut session = session();
        select(&mut session, "curveSegments");
        press(&mut session, KeyCode::Char('+'));
        assert_eq!(session.controller().params().curve_segments, 6);
        press(&mut session, KeyCode::Char('<'));
        assert_eq!(session.controller().params().curve_segments, 1);

        select(&mut session, "bevelEnabled");
        press(&mut session, KeyCode::Char(' '));
        assert!(!session.controller().params().bevel_enabled);
        assert!(session.footer().contains("TEXT/bevelEnabled = false"));
    }

    #[test]
    fn test_quit_cancels_loop() {
        let mut render_loop = RenderLoop::new(1000);
        let mut session = session();
        session.handle = render_loop.handle();
        render_loop
            .start(|_| {
                press(&mut session, KeyCode::Char('q'));
                Ok::<_, ()>(())
            })
            .unwrap();
        assert!(!render_loop.handle().is_running());
    }

    #[test]
    fn test_resize_and_pointer() {
        let mut session = session();
        session.handle_event(Event::Resize(100, 25));
        assert_eq!(session.controller().viewport().width, 100);
        assert_eq!(session.controller().viewport().height, 50);

        session.handle_event(Event::Resize(0, 0));
        assert_eq!(session.controller().viewport().width, 100);

        session.handle_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }));
        let pointer = session.controller().pointer();
        assert!(pointer.x < -0.45 && pointer.y > 0.45);
    }

    #[test]
    fn test_header_reports_font() {
        let session = session();
        assert!(session.header(30.0).contains("font: Veeno Blocks"));
    }

    #[test]
    fn test_render_writes_frame() {
        let mut session = session();
        let mut out = Vec::new();
        session.render(&mut out, 30.0).unwrap();
        assert!(!out.is_empty());
    }
}
