//! SafeKey demo
//!
//! Replays a login screen against headless collaborators: a name field on
//! the system keyboard and a password field bound to the overlay, sitting
//! low enough that the overlay would cover it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use safekey_core::prelude::*;
use safekey_core::RecordingRenderer;
use safekey_platform::headless::{
    FocusHub, MemoryField, MemoryScrollContainer, RecordingHaptics, RecordingSuppressor,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const NAME: FieldId = FieldId(1);
const PASSWORD: FieldId = FieldId(2);
const OVERLAY_TOP: f32 = 520.0;

#[derive(Parser)]
#[command(name = "safekey-demo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scripted SafeKey overlay session", long_about = None)]
struct Cli {
    /// Shuffle the digit keys on every entry into the numbers face
    #[arg(long)]
    randomize_digits: bool,

    /// Never show the key-press preview bubble
    #[arg(long)]
    suppress_preview: bool,

    /// Pulse the haptic motor on every key
    #[arg(long)]
    vibrate: bool,

    /// Always reopen on the letters face
    #[arg(long)]
    no_remember: bool,

    /// Overlay config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Password typed by the script
    #[arg(long, default_value = "Pass2024")]
    password: String,
}

struct Screen {
    overlay: OverlayController,
    hub: FocusHub,
    container: MemoryScrollContainer,
    haptics: RecordingHaptics,
    name: MemoryField,
    password: MemoryField,
}

impl Screen {
    fn new(config: OverlayConfig) -> Self {
        let hub = FocusHub::new();
        let container = MemoryScrollContainer::new(Rect::new(0.0, 0.0, 360.0, 800.0));
        let haptics = RecordingHaptics::new();

        let name = MemoryField::new(NAME, Rect::new(16.0, 120.0, 328.0, 48.0));
        let password = MemoryField::new(PASSWORD, Rect::new(16.0, 640.0, 328.0, 48.0));
        for field in [&name, &password] {
            hub.register(field);
            container.add_child(field);
        }

        let mut overlay = OverlayController::new(
            config,
            Collaborators {
                renderer: Box::new(RecordingRenderer::new(OVERLAY_TOP)),
                focus: Box::new(hub.clone()),
                container: Box::new(container.clone()),
                suppressor: Box::new(RecordingSuppressor::new()),
                haptics: Some(Box::new(haptics.clone())),
            },
        );
        overlay.bind(password.clone());

        Self {
            overlay,
            hub,
            container,
            haptics,
            name,
            password,
        }
    }

    fn focus(&mut self, id: FieldId) {
        self.hub.focus(Some(id));
        self.overlay.pump();
    }

    /// Let every pending debounce and animation run out
    fn settle(&mut self) {
        self.overlay.advance(Duration::from_millis(1000));
    }

    fn press(&mut self, code: i32) {
        self.overlay.key_down(code);
        self.overlay.key_pressed(code);
    }

    /// Type `text` the way a user would, switching faces and case as needed
    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            let face = self.overlay.current_layout().kind();
            if c.is_ascii_digit() {
                if face != LayoutKind::Numbers {
                    self.press(codes::MODE_CHANGE);
                    info!("digits: {}", self.digit_row());
                }
            } else if face != LayoutKind::Letters {
                self.press(codes::MODE_CHANGE);
            }

            if c.is_ascii_uppercase() && !self.overlay.case_state().is_upper() {
                self.press(codes::SHIFT);
            }

            // Find the key currently typing `c`
            let code = self
                .overlay
                .current_layout()
                .keys()
                .iter()
                .find(|key| key.action() == Some(KeyAction::Char(c)))
                .map(|key| key.code())
                .unwrap_or(c as i32);
            self.press(code);
        }
    }

    fn digit_row(&self) -> String {
        self.overlay
            .current_layout()
            .keys()
            .iter()
            .filter_map(|key| key.label())
            .filter(|label| label.len() == 1 && label.chars().all(|c| c.is_ascii_digit()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn report(&self, step: &str) {
        println!(
            "{:<28} name={:?} password={:?} overlay={:?} face={:?} offset={}",
            step,
            self.name.text(),
            self.password.text(),
            self.overlay.visibility(),
            self.overlay.current_layout().kind(),
            self.container.offset(),
        );
    }
}

fn load_config(cli: &Cli) -> Result<OverlayConfig> {
    let mut config = match &cli.config {
        Some(path) => OverlayConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => OverlayConfig::default(),
    };

    if cli.randomize_digits {
        config.set(OverlayOption::RandomizeDigits, true);
    }
    if cli.suppress_preview {
        config.set(OverlayOption::SuppressPreview, true);
    }
    if cli.vibrate {
        config.set(OverlayOption::VibrateOnKey, true);
    }
    if cli.no_remember {
        config.set(OverlayOption::RememberLastLayout, false);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = load_config(&cli)?;
    info!("overlay config: {:?}", config);

    let mut screen = Screen::new(config);
    screen.report("start");

    screen.focus(NAME);
    screen.name.set_text("alice");
    screen.settle();
    screen.report("typed name (system kb)");

    screen.focus(PASSWORD);
    screen.settle();
    screen.report("focused password");

    let password = cli.password.clone();
    screen.type_text(&password);
    screen.report("typed password");

    screen.press(codes::DELETE);
    screen.report("deleted last char");

    screen.focus(NAME);
    screen.settle();
    screen.report("back to name");

    screen.focus(PASSWORD);
    screen.settle();
    screen.report("password again");

    screen.press(codes::CANCEL);
    screen.settle();
    screen.report("cancel key");

    if !screen.haptics.pulses().is_empty() {
        info!("haptic pulses: {}", screen.haptics.pulses().len());
    }

    screen.overlay.release();
    screen.report("released");

    Ok(())
}
