//! nugget-quiz CLI: play, check, export and host learning nuggets.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use nugget_quiz::RetryPolicy;

mod commands;

#[derive(Parser)]
#[command(name = "nugget-quiz", version, about = "Interactive learning nuggets in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a nugget in the terminal
    Play {
        /// Nugget markup (.md) or exported nugget (.json)
        path: PathBuf,

        /// What happens when a question is answered twice
        #[arg(long, value_enum)]
        retry: Option<RetryArg>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check nugget files for malformed blocks and authoring mistakes
    Validate {
        /// Nugget file or directory of nuggets
        path: PathBuf,
    },

    /// Export a parsed nugget as JSON
    Export {
        /// Nugget markup file
        path: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Host a nugget over WebSocket so remote players can submit answers
    Serve {
        /// Nugget markup (.md) or exported nugget (.json)
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        bind: Option<String>,

        /// What happens when a question is answered twice
        #[arg(long, value_enum)]
        retry: Option<RetryArg>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RetryArg {
    /// One answer per question
    Lock,
    /// Answers may be changed freely
    Unlimited,
}

impl From<RetryArg> for RetryPolicy {
    fn from(arg: RetryArg) -> Self {
        match arg {
            RetryArg::Lock => RetryPolicy::Lock,
            RetryArg::Unlimited => RetryPolicy::Unlimited,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nugget_quiz=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play { path, retry, config } => {
            commands::play::execute(path, retry.map(Into::into), config)
        }
        Commands::Validate { path } => commands::validate::execute(path),
        Commands::Export { path, output } => commands::export::execute(path, output),
        Commands::Serve {
            path,
            port,
            bind,
            retry,
            config,
        } => commands::serve::execute(path, port, bind, retry.map(Into::into), config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
