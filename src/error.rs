//! Error types.
//!
//! Malformed markup is an authoring defect and surfaces as [`ParseError`].
//! Learner-side contract violations live next to the interpreter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Ways a quiz block can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBlock {
    #[error("quiz block has no option marked [(X)]")]
    MissingCorrectOption,

    #[error("quiz block marks {count} options as correct, expected exactly one")]
    MultipleCorrectOptions { count: usize },

    #[error("quiz block has no option lines")]
    NoOptions,

    #[error("[[?]] line without preceding options")]
    OrphanHint,

    #[error("fragment block is missing its closing star line")]
    UnterminatedFragment,

    #[error("<script> block is missing </script>")]
    UnterminatedScript,

    #[error("response handler never calls send.lia(...)")]
    HandlerWithoutDispatch,

    #[error("expected a single quiz block and nothing else")]
    ExtraContent,
}

/// A malformed block and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: MalformedBlock,
}

/// Errors loading or parsing a nugget.
#[derive(Debug, Error)]
pub enum NuggetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("invalid quiz block {} in section {} of {}: {source}", block + 1, section + 1, path.display())]
    InvalidBlock {
        path: PathBuf,
        section: usize,
        block: usize,
        #[source]
        source: MalformedBlock,
    },

    #[error("invalid nugget JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
