//! The `nugget-quiz validate` command.

use std::path::PathBuf;

use anyhow::{Result, bail};
use nugget_quiz::{load_nugget, load_nugget_dir, validate_nugget};

pub fn execute(path: PathBuf) -> Result<()> {
    let loaded = if path.is_dir() {
        load_nugget_dir(&path)?
    } else {
        let nugget = load_nugget(&path);
        vec![(path, nugget)]
    };

    let mut total_warnings = 0;
    let mut failed = 0;

    for (_, nugget) in loaded {
        let nugget = match nugget {
            Ok(nugget) => nugget,
            Err(e) => {
                println!("{e}");
                failed += 1;
                continue;
            }
        };

        println!(
            "Nugget: {} ({} sections, {} quizzes)",
            nugget.title,
            nugget.sections.len(),
            nugget.quiz_count()
        );

        let warnings = validate_nugget(&nugget);
        for w in &warnings {
            println!("  WARNING: {w}");
        }
        total_warnings += warnings.len();
    }

    if failed > 0 {
        bail!("{failed} nugget(s) failed to parse");
    }

    if total_warnings == 0 {
        println!("All nuggets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
