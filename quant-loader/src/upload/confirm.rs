//! Confirmation of destructive or structural actions

use dialoguer::Confirm as ConfirmPrompt;

/// Asks the operator to approve an action
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive y/n prompt on the terminal, defaulting to "no"
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match ConfirmPrompt::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Confirmation prompt failed, treating as declined: {}", e);
                false
            }
        }
    }
}

/// Approves everything (`--yes`)
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        log::debug!("Auto-confirmed: {}", prompt);
        true
    }
}

/// Declines everything, used when no terminal is attached
pub struct DeclineAll;

impl Confirm for DeclineAll {
    fn confirm(&self, prompt: &str) -> bool {
        log::info!("No terminal to confirm '{}', declining", prompt);
        false
    }
}
