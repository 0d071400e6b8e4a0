/// Glowdot Terminal Demo - Orbiting grid of glow dots
///
/// Usage: glowdot-terminal [config.toml]
///
/// Controls:
///   - WASD / Arrow Keys: Orbit the camera
///   - E/R: Roll
///   - +/-: Zoom
///   - F: Toggle fixed-in-frame
///   - G: Cycle dot shape (circle to square)
///   - Q/ESC: Quit

use std::env;
use std::error::Error;
use glowdot_terminal::{TerminalApp, ViewerConfig};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = match env::args().nth(1) {
        Some(path) => {
            println!("Loading viewer config: {}", path);
            ViewerConfig::load_from_file(&path)?
        }
        None => ViewerConfig::default(),
    };

    println!("Starting glowdot terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Run the terminal app
    let mut app = TerminalApp::new(&config)?;
    app.run()?;

    println!("Thank you for using the Glowdot terminal viewer!");
    Ok(())
}
