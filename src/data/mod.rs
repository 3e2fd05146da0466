mod handler;
mod loader;
mod parser;

pub use loader::{load_nugget, load_nugget_dir, nugget_paths};
pub use parser::{parse_nugget, parse_quiz_block};
