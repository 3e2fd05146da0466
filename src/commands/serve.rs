//! The `nugget-quiz serve` command.

use std::path::PathBuf;

use anyhow::Result;
use nugget_quiz::{Config, RetryPolicy, load_nugget, server};

pub fn execute(
    path: PathBuf,
    port: Option<u16>,
    bind: Option<String>,
    retry: Option<RetryPolicy>,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load(config.as_deref())?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(retry) = retry {
        config.retry = retry;
    }

    let nugget = load_nugget(&path)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::run(&config, nugget))?;
    Ok(())
}
