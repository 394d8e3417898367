//! SlideCraft gesture replay
//!
//! Feeds a scripted pointer session through the editor on a virtual clock and
//! prints every dispatched write as one JSON line.
//!
//! ```json
//! {
//!   "elements": [{ "id": 1, "left": 0, "top": 0, "width": 100, "height": 80 }],
//!   "steps": [
//!     { "type": "down", "x": 10, "y": 10 },
//!     { "type": "up", "x": 40, "y": 10 },
//!     { "type": "wait", "ms": 500 }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use kurbo::Point;
use serde::Deserialize;
use slidecraft_core::commit::{Completion, DispatchedWrite, WriteTransport};
use slidecraft_core::{Element, ElementId, EngineConfig, Modifiers, Platform, PointerEvent, Slide, SlideEditor};
use std::time::{Duration, Instant};

/// One scripted input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Step {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Modifier { held: bool },
    /// Full modifier state, resolved against the session platform.
    Keys { modifiers: Modifiers },
    Cancel,
    Promote { id: ElementId },
    Demote { id: ElementId },
    Reinsert { id: ElementId },
    /// Advance the virtual clock.
    Wait { ms: u64 },
}

#[derive(Debug, Deserialize)]
struct Session {
    #[serde(default)]
    config: Option<EngineConfig>,
    #[serde(default)]
    platform: Platform,
    elements: Vec<Element>,
    steps: Vec<Step>,
}

/// Prints each write as a JSON line.
#[derive(Debug, Default)]
struct StdoutTransport {
    sent: usize,
}

impl WriteTransport for StdoutTransport {
    fn send(&mut self, write: DispatchedWrite, done: Completion) {
        match write.to_json() {
            Ok(line) => {
                println!("{}", line);
                self.sent += 1;
                done(Ok(()));
            }
            Err(e) => done(Err(e)),
        }
    }
}

fn run(session: Session, transport: &mut StdoutTransport) -> Result<()> {
    let config = session.config.unwrap_or_default();
    config.validate().context("Invalid engine config")?;
    let slide = Slide::from_elements(session.elements).context("Could not build slide")?;
    let mut editor = SlideEditor::with_config(slide, config);
    editor.set_platform(session.platform);

    let start = Instant::now();
    let mut now = start;

    for step in session.steps {
        match step {
            Step::Down { x, y } => editor.handle_pointer_event(PointerEvent::Down { position: Point::new(x, y) }, now),
            Step::Move { x, y } => editor.handle_pointer_event(PointerEvent::Move { position: Point::new(x, y) }, now),
            Step::Up { x, y } => editor.handle_pointer_event(PointerEvent::Up { position: Point::new(x, y) }, now),
            Step::Modifier { held } => editor.set_magnet_modifier(held),
            Step::Keys { modifiers } => editor.set_modifiers(modifiers),
            Step::Cancel => editor.handle_pointer_event(PointerEvent::Cancel, now),
            Step::Promote { id } => {
                if editor.promote(id, now).is_none() {
                    log::info!("Promote of element {} had no effect", id);
                }
            }
            Step::Demote { id } => {
                if editor.demote(id, now).is_none() {
                    log::info!("Demote of element {} had no effect", id);
                }
            }
            Step::Reinsert { id } => {
                editor
                    .reinsert(id, now)
                    .with_context(|| format!("Reinserting element {}", id))?;
            }
            Step::Wait { ms } => now += Duration::from_millis(ms),
        }

        for event in editor.take_events() {
            log::debug!("{:?}", event);
        }
        editor.poll_writes(now, transport);
    }

    let remaining = editor.flush_writes(transport);
    log::info!(
        "Replay finished at +{}ms, {} write(s) flushed at exit",
        (now - start).as_millis(),
        remaining
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: slidecraft-replay <session.json>")?;
    let json = std::fs::read_to_string(&path).with_context(|| format!("Reading {}", path))?;
    let session: Session = serde_json::from_str(&json).with_context(|| format!("Parsing session {}", path))?;
    log::info!("Replaying {} step(s) from {}", session.steps.len(), path);

    let mut transport = StdoutTransport::default();
    run(session, &mut transport).context("Running replay")?;
    log::info!("{} write(s) dispatched", transport.sent);
    Ok(())
}
