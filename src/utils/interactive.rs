//! Console pauses between the steps of the sample
//!
//! The sample stops twice so the user can look at the container and the
//! local files before they are deleted.

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::IsTerminal;
use tracing::debug;

use crate::error::{QuickblobError, Result};

/// Something that waits for the user before the run continues
#[async_trait]
pub trait Pause: Send + Sync {
    async fn wait(&self, message: &str) -> Result<()>;
}

/// Prints the message and waits for a single key press
pub struct KeyPressPause;

impl KeyPressPause {
    /// Decide what a terminal key event means for the pause. `None` keeps
    /// waiting. Ctrl+C aborts since raw mode swallows the signal.
    fn key_outcome(key: &KeyEvent) -> Option<Result<()>> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Err(QuickblobError::input("Interrupted by user")));
        }
        Some(Ok(()))
    }

    fn wait_for_key() -> Result<()> {
        terminal::enable_raw_mode()
            .map_err(|e| QuickblobError::input(format!("Failed to enable raw mode: {e}")))?;

        let result = loop {
            match event::read() {
                Ok(Event::Key(key)) => match Self::key_outcome(&key) {
                    Some(outcome) => break outcome,
                    None => continue,
                },
                Ok(_) => continue,
                Err(e) => break Err(QuickblobError::input(e.to_string())),
            }
        };

        terminal::disable_raw_mode()
            .map_err(|e| QuickblobError::input(format!("Failed to disable raw mode: {e}")))?;
        result
    }
}

#[async_trait]
impl Pause for KeyPressPause {
    async fn wait(&self, message: &str) -> Result<()> {
        println!("{message}");

        if !std::io::stdin().is_terminal() {
            debug!("stdin is not a terminal, not waiting for a key press");
            return Ok(());
        }

        tokio::task::spawn_blocking(Self::wait_for_key)
            .await
            .map_err(|e| QuickblobError::unknown(format!("Key press task failed: {e}")))?
    }
}

/// Prints the message and carries on
pub struct NoPause;

#[async_trait]
impl Pause for NoPause {
    async fn wait(&self, message: &str) -> Result<()> {
        println!("{message}");
        Ok(())
    }
}

/// Pause implementation matching the interactive setting
pub fn console_pause(interactive: bool) -> Box<dyn Pause> {
    if interactive {
        Box::new(KeyPressPause)
    } else {
        Box::new(NoPause)
    }
}
