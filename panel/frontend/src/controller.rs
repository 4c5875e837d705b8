//! Toggle logic behind the two LED buttons.
//!
//! The controller owns the panel state; egui only renders what it exposes.
//! Every toggle produces a numbered [`Dispatch`], and replies are applied to
//! the status line only if they are newer than the last one applied, so a slow
//! reply can never overwrite the outcome of a later click.

use led_panel::rpc::ClientError;
use led_shared::{CommandReply, LedId, LedState, Level};

/// Status text for a reply that carries neither `message` nor `error`.
pub const UNKNOWN_RESPONSE: &str = "Unknown response from server";

/// A command to send, tagged with its sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub seq: u64,
    pub command: LedState,
}

#[derive(Debug, Default)]
pub struct ToggleController {
    state: LedState,
    next_seq: u64,
    /// Sequence number of the reply currently shown; 0 before any.
    last_applied: u64,
    status: Option<String>,
}

impl ToggleController {
    pub fn new(initial: LedState) -> Self {
        Self {
            state: initial,
            ..Self::default()
        }
    }

    pub fn level(&self, id: LedId) -> Level {
        self.state.get(id)
    }

    /// Button label, e.g. `"Red = 1"`.
    pub fn label(&self, id: LedId) -> String {
        format!("{id} = {}", self.level(id))
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Flip `id` and build the command reporting both LEDs.
    ///
    /// The other LED's level is read as-is and sent unchanged.
    pub fn handle_toggle(&mut self, id: LedId) -> Dispatch {
        let new_level = self.state.get(id).toggled();
        self.state.set(id, new_level);

        let other = id.other();
        let mut command = LedState::default();
        command.set(id, new_level);
        command.set(other, self.state.get(other));

        self.next_seq += 1;
        log::debug!("toggle #{}: {id} -> {new_level}", self.next_seq);

        Dispatch {
            seq: self.next_seq,
            command,
        }
    }

    /// Show the outcome of dispatch `seq` unless a newer one is already shown.
    ///
    /// Returns whether the status line changed.
    pub fn apply_reply(&mut self, seq: u64, outcome: Result<CommandReply, ClientError>) -> bool {
        if seq <= self.last_applied {
            log::debug!("dropping stale reply #{seq} (showing #{})", self.last_applied);
            return false;
        }
        self.last_applied = seq;

        let text = match outcome {
            Ok(reply) => reply.display_text().unwrap_or(UNKNOWN_RESPONSE).to_owned(),
            Err(e) => {
                log::error!("LED command #{seq} failed: {e}");
                format!("Request failed: {e}")
            }
        };
        self.status = Some(text);
        true
    }

    /// Adopt a state pushed by the server.
    pub fn sync(&mut self, state: LedState) {
        if state != self.state {
            log::debug!("syncing LED state from server: {state:?}");
            self.state = state;
        }
    }
}
