/// Terminal-based ASCII viewer for glow-dot clouds
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use glowdot_core::{CameraFrame, CameraState, DotCloud};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;

pub use config::{ConfigError, ViewerConfig};
pub use renderer::{AsciiRenderer, RenderStats};

/// Camera rotation per key press, in radians
const ROTATE_STEP: f32 = 0.1;
/// Frame height multiplier per zoom key press
const ZOOM_STEP: f32 = 1.1;

/// Main application struct for terminal glow-dot rendering
pub struct TerminalApp {
    cloud: DotCloud,
    frame: CameraFrame,
    is_fixed_in_frame: f32,
    orbit_speed: f32,
    target_fps: u32,
    renderer: AsciiRenderer,
    stats: RenderStats,
    show_camera_info: bool,
    running: bool,
    started: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let cloud = config.dot_cloud();
        log::info!("viewer starting with {} dots on a {width}x{height} terminal", cloud.len());

        Ok(Self {
            cloud,
            frame: config.camera_frame(),
            is_fixed_in_frame: 0.0,
            orbit_speed: config.orbit_speed.to_radians(),
            target_fps: config.target_fps.max(1),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            stats: RenderStats::default(),
            show_camera_info: false,
            running: true,
            started: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        // Back on the main screen, safe to log
        self.frame.snapshot().describe();
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.target_fps as u64);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.update();

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

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.frame.increment_phi(-ROTATE_STEP);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.frame.increment_phi(ROTATE_STEP);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.frame.increment_theta(-ROTATE_STEP);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.frame.increment_theta(ROTATE_STEP);
                }
                KeyCode::Char('e') => {
                    self.frame.increment_gamma(ROTATE_STEP);
                }
                KeyCode::Char('r') => {
                    self.frame.increment_gamma(-ROTATE_STEP);
                }
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    self.frame.set_height(self.frame.height / ZOOM_STEP);
                }
                KeyCode::Char('-') => {
                    self.frame.set_height(self.frame.height * ZOOM_STEP);
                }
                KeyCode::Char('f') => {
                    self.is_fixed_in_frame = 1.0 - self.is_fixed_in_frame;
                }
                KeyCode::Char('g') => {
                    let quad_factor = self.cloud.style.quad_factor();
                    let next = if quad_factor >= 1.0 { 0.0 } else { quad_factor + 0.5 };
                    self.cloud.style.set_quad_factor(next);
                }
                KeyCode::Char('0') => {
                    self.frame.to_default_state();
                }
                KeyCode::Char('i') => {
                    self.show_camera_info = !self.show_camera_info;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn update(&mut self) {
        // Continuous slow orbit for demo effect
        self.frame.increment_theta(self.orbit_speed);
    }

    fn render(&mut self) -> io::Result<()> {
        let camera = self.frame.snapshot();

        // Clear renderer
        self.renderer.clear();

        // Render dots
        let time = self.started.elapsed().as_secs_f32();
        self.stats = self
            .renderer
            .render_cloud(&self.cloud, &camera, self.is_fixed_in_frame, time);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Glowdot | FPS: {:.1} | dots {}/{} | fixed {} | WASD/Arrows=Orbit E/R=Roll +/-=Zoom F=Fix G=Shape I=Info 0=Reset Q=Quit",
                self.fps,
                self.stats.drawn,
                self.cloud.len(),
                self.is_fixed_in_frame,
            )),
            ResetColor
        )?;
        if self.show_camera_info {
            queue!(
                stdout,
                cursor::MoveTo(0, 1),
                SetForegroundColor(Color::Cyan),
                Print(camera_info_line(&camera)),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}

/// One-line summary of the camera uniforms for the overlay
fn camera_info_line(camera: &CameraState) -> String {
    let position = camera.camera_position;
    let rescale = camera.rescale_factors.0;
    format!(
        "camera ({:.2}, {:.2}, {:.2}) | rescale ({:.3}, {:.3}, {:.3})",
        position.x, position.y, position.z, rescale.x, rescale.y, rescale.z
    )
}
