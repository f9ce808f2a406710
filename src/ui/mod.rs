//! Terminal presentation: colours, the progress spinner and plant reports.

use anyhow::Result;
use inquire::InquireError;

pub mod report;
mod spinner;
mod style;

pub use spinner::Spinner;
pub use style::Style;

/// `true` when the user left an inquire prompt with Escape or Ctrl+C.
pub const fn is_prompt_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Runs an interactive step such as `plantid configure`, treating a cancelled
/// prompt as a clean exit.
pub fn handle_prompt_cancellation<F>(step: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let Err(err) = step() else {
        return Ok(());
    };

    match err.downcast_ref::<InquireError>() {
        Some(inquire_err) if is_prompt_cancelled(inquire_err) => {
            // Leave the prompt line before returning to the shell.
            println!();
            Ok(())
        }
        _ => Err(err),
    }
}
