//! Interactive mode, entered when no subcommand is given.
//!
//! Prompts for the same options the subcommands take, using `dialoguer`.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use livability_cli_utils::MultiProgress;

use crate::commands::{self, ReconcileOptions};

/// Top-level actions in the interactive menu.
enum Action {
    Reconcile,
    Normalize,
    Baseline,
}

impl Action {
    const ALL: &[Self] = &[Self::Reconcile, Self::Normalize, Self::Baseline];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Reconcile => "Reconcile crime rates",
            Self::Normalize => "Normalize raw table only",
            Self::Baseline => "Show national baseline",
        }
    }
}

/// Prompts for a path, returning `None` when left blank.
fn prompt_optional_path(prompt: &str) -> Result<Option<PathBuf>, dialoguer::Error> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| PathBuf::from(value)))
}

fn prompt_path(prompt: &str, default: &str) -> Result<PathBuf, dialoguer::Error> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    Ok(PathBuf::from(value.trim()))
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen command fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Reconcile => {
            let options = ReconcileOptions {
                input: prompt_path("Raw places CSV", "places.csv")?,
                output: prompt_path("Output CSV", "places_reconciled.csv")?,
                secondary: prompt_optional_path("Secondary source CSV (blank to skip)")?,
                config: prompt_optional_path("Engine config TOML (blank for defaults)")?,
                by_state: Confirm::new()
                    .with_prompt("Reconcile states in parallel?")
                    .default(true)
                    .interact()?,
            };
            commands::reconcile(&options, multi)?;
        }
        Action::Normalize => {
            let input = prompt_path("Raw places CSV", "places.csv")?;
            let output = prompt_path("Output CSV", "places_normalized.csv")?;
            commands::normalize(&input, &output)?;
        }
        Action::Baseline => {
            let config = prompt_optional_path("Engine config TOML (blank for defaults)")?;
            commands::baseline(config.as_deref())?;
        }
    }

    Ok(())
}
