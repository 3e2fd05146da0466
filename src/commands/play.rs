//! The `nugget-quiz play` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use nugget_quiz::{Config, Player, RetryPolicy};

pub fn execute(path: PathBuf, retry: Option<RetryPolicy>, config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let retry = retry.unwrap_or(config.retry);

    let player = Player::from_path(&path, retry)?;
    player
        .run()
        .with_context(|| format!("player failed for {}", path.display()))
}
