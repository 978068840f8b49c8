/// Terminal-based ASCII viewer for OBJ models
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::debug;
use scop_core::{Motion, ViewMode, Viewer};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Rows reserved for the status overlay
const STATUS_ROWS: u16 = 2;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: u32 = 2;

/// Main application struct for terminal model viewing
pub struct TerminalApp {
    viewer: Viewer,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    message: Option<String>,
}

impl TerminalApp {
    pub fn new(viewer: Viewer) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(viewer, width, height))
    }

    /// Build the app for a known terminal size without touching the terminal
    pub fn with_size(mut viewer: Viewer, width: u16, height: u16) -> Self {
        let (render_width, render_height) = render_size(width, height);
        viewer.set_viewport(render_width as u32, render_height as u32 * CELL_ASPECT);

        Self {
            viewer,
            renderer: AsciiRenderer::new(render_width, render_height),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            message: None,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        let mut previous = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            // Update
            let dt = frame_start.duration_since(previous).as_secs_f32();
            previous = frame_start;
            self.viewer.update(dt);
            // Most terminals never report key releases
            self.viewer.release_all();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(MouseEvent { kind, .. }) => match kind {
                MouseEventKind::ScrollUp => self.viewer.zoom(1.0),
                MouseEventKind::ScrollDown => self.viewer.zoom(-1.0),
                _ => {}
            },
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            if let Some(motion) = motion_for(code) {
                self.viewer.release(motion);
            }
            return;
        }

        if let Some(motion) = motion_for(code) {
            self.viewer.press(motion);
            return;
        }

        match code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.running = false,
            KeyCode::Char('f') => self.viewer.toggle_view_mode(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewer.adjust_spin_speed(1.0),
            KeyCode::Char('-') => self.viewer.adjust_spin_speed(-1.0),
            KeyCode::Char(' ') => self.viewer.reset(),
            KeyCode::Char('t') => self.viewer.cycle_render_mode(),
            KeyCode::Char('z') => self.viewer.zoom(1.0),
            KeyCode::Char('x') => self.viewer.zoom(-1.0),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Left => self.viewer.look(-1.0, 0.0),
            KeyCode::Right => self.viewer.look(1.0, 0.0),
            KeyCode::Up => self.viewer.look(0.0, 1.0),
            KeyCode::Down => self.viewer.look(0.0, -1.0),
            _ => {}
        }
    }

    fn reload(&mut self) {
        // Failures are already logged by the viewer
        self.message = Some(match self.viewer.reload() {
            Ok(true) => format!("Reloaded {}", self.viewer.model().object_name),
            Ok(false) => "Nothing to reload".to_string(),
            Err(e) => format!("Reload failed: {}", e),
        });
    }

    fn resize(&mut self, width: u16, height: u16) {
        let (render_width, render_height) = render_size(width, height);
        debug!("Terminal resized to {}x{}", width, height);
        self.renderer = AsciiRenderer::new(render_width, render_height);
        self.viewer
            .set_viewport(render_width as u32, render_height as u32 * CELL_ASPECT);
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.viewer.frame();

        // Clear renderer
        self.renderer.clear();

        // Render model
        self.renderer.render_model(
            self.viewer.model(),
            self.viewer.colors(),
            self.viewer.render_mode(),
            &frame,
        );

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, STATUS_ROWS))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line()),
            cursor::MoveTo(0, 1),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::DarkYellow),
            Print(self.help_line()),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    /// One-line summary of the session state
    pub fn status_line(&self) -> String {
        let camera = self.viewer.camera();
        let mode = match self.viewer.view_mode() {
            ViewMode::Focus => "focus",
            ViewMode::Free => "free",
        };
        let mut line = format!(
            "scop | {} | {} | {} | FOV {:.0} | spin {:.1} | eye ({:.1}, {:.1}, {:.1}) | FPS {:.1}",
            self.viewer.model().object_name,
            mode,
            self.viewer.render_mode().name(),
            camera.fovy(),
            self.viewer.spin_speed(),
            camera.eye.x,
            camera.eye.y,
            camera.eye.z,
            self.fps
        );
        if let Some(message) = &self.message {
            line.push_str(" | ");
            line.push_str(message);
        }
        line
    }

    fn help_line(&self) -> &'static str {
        match self.viewer.view_mode() {
            ViewMode::Focus => {
                "F=free camera  +/-=spin  Space=reset  T=render mode  Z/X/wheel=zoom  R=reload  Esc=quit"
            }
            ViewMode::Free => {
                "F=focus  WASD=move  Q/E=down/up  Arrows=look  T=render mode  Z/X/wheel=zoom  Esc=quit"
            }
        }
    }
}

fn motion_for(code: KeyCode) -> Option<Motion> {
    match code {
        KeyCode::Char('w') => Some(Motion::Forward),
        KeyCode::Char('s') => Some(Motion::Backward),
        KeyCode::Char('a') => Some(Motion::Left),
        KeyCode::Char('d') => Some(Motion::Right),
        KeyCode::Char('e') => Some(Motion::Up),
        KeyCode::Char('q') => Some(Motion::Down),
        _ => None,
    }
}

fn render_size(width: u16, height: u16) -> (usize, usize) {
    (width as usize, height.saturating_sub(STATUS_ROWS) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scop_core::{Model, RenderMode, ViewerConfig};

    fn app() -> TerminalApp {
        TerminalApp::with_size(Viewer::new(Model::cube(2.0), ViewerConfig::default()), 80, 42)
    }

    fn press(app: &mut TerminalApp, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_viewport_accounts_for_cell_shape() {
        let app = app();
        assert!((app.viewer().camera().aspect - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mode_and_render_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.viewer().render_mode(), RenderMode::RandomColor);

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.viewer().view_mode(), ViewMode::Free);
        assert!(app.status_line().contains("free"));
    }

    #[test]
    fn test_free_movement_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('w'));
        app.viewer.update(1.0);
        assert_eq!(app.viewer().camera().eye.z, 5.0);

        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('w'));
        app.viewer.update(0.2);
        assert!((app.viewer().camera().eye.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_keys_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.viewer().camera().fovy(), 44.0);

        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!app.is_running());
    }

    #[test]
    fn test_reload_without_file_reports_nothing_to_reload() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        assert!(app.status_line().contains("Nothing to reload"));
        assert!(!app.status_line().contains("Reloaded"));
    }

    #[test]
    fn test_resize_rebuilds_renderer() {
        let mut app = app();
        app.handle_event(Event::Resize(40, 12));
        assert_eq!(app.renderer.width(), 40);
        assert_eq!(app.renderer.height(), 10);
    }
}
