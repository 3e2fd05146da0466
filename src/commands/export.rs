//! The `nugget-quiz export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use nugget_quiz::load_nugget;

pub fn execute(path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let nugget = load_nugget(&path)?;
    let json = serde_json::to_string_pretty(&nugget)?;

    match output {
        Some(output) => {
            std::fs::write(&output, json + "\n")
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(path = %output.display(), "exported nugget");
        }
        None => println!("{json}"),
    }

    Ok(())
}
