//! Calls from the panel to its server.

use led_panel::rpc::{self, ClientError};
use led_shared::{CONTROL_LED_PATH, CommandReply, LedState};

/// POST both LED levels to the server and return its reply.
///
/// Error replies (`{"error": ...}`) come back as `Ok`, whatever the status.
pub async fn send_command(command: LedState) -> Result<CommandReply, ClientError> {
    log::debug!("POST {CONTROL_LED_PATH} {command:?}");
    rpc::post_json(CONTROL_LED_PATH, &command).await
}
