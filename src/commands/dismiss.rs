use crate::libs::alarm;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;

/// Closes the open alarm as if Enter had been pressed in its terminal. This
/// is how alarms of a detached service are answered.
pub fn cmd() -> Result<()> {
    alarm::request_dismissal()?;
    msg_success!(Message::DismissRequested);
    Ok(())
}
