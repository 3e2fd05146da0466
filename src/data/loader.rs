use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::NuggetError;
use crate::models::Nugget;

use super::parser::parse_nugget;

/// Load a nugget from disk. `.json` files hold an exported nugget, anything
/// else is read as markup.
pub fn load_nugget<P: AsRef<Path>>(path: P) -> Result<Nugget, NuggetError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|source| NuggetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let nugget = if is_json(path) {
        let nugget = serde_json::from_str(&content).map_err(|source| NuggetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        check_blocks(&nugget, path)?;
        nugget
    } else {
        parse_nugget(&content).map_err(|source| NuggetError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    debug!(path = %path.display(), sections = nugget.sections.len(), "loaded nugget");
    Ok(nugget)
}

/// The `.md` and `.json` files of a directory, sorted by name.
pub fn nugget_paths<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, NuggetError> {
    let dir = dir.as_ref();
    let io_error = |source| NuggetError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && (is_json(&path) || is_markdown(&path)) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every nugget in a directory. A file that fails to load yields its
/// error in place, so one broken nugget does not hide the others.
pub fn load_nugget_dir<P: AsRef<Path>>(
    dir: P,
) -> Result<Vec<(PathBuf, Result<Nugget, NuggetError>)>, NuggetError> {
    let mut nuggets = Vec::new();
    for path in nugget_paths(dir)? {
        let loaded = load_nugget(&path);
        if let Err(e) = &loaded {
            warn!("failed to load {}: {}", path.display(), e);
        }
        nuggets.push((path, loaded));
    }

    Ok(nuggets)
}

/// Exported nuggets skip the markup parser, so re-check every quiz block.
fn check_blocks(nugget: &Nugget, path: &Path) -> Result<(), NuggetError> {
    for (section, content) in nugget.sections.iter().enumerate() {
        for (block, quiz) in content.quizzes().into_iter().enumerate() {
            quiz.check().map_err(|source| NuggetError::InvalidBlock {
                path: path.to_path_buf(),
                section,
                block,
                source,
            })?;
        }
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedBlock;
    use tempfile::TempDir;

    const MARKUP: &str = "# Correlation\n\nPearson or Spearman?\n\n[(X)] Pearson\n[( )] Spearman\n";

    #[test]
    fn test_load_markup_and_json() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("correlation.md");
        fs::write(&md, MARKUP).unwrap();

        let nugget = load_nugget(&md).unwrap();
        assert_eq!(nugget.title, "Correlation");

        let json = dir.path().join("correlation.json");
        fs::write(&json, serde_json::to_string(&nugget).unwrap()).unwrap();
        assert_eq!(load_nugget(&json).unwrap(), nugget);
    }

    #[test]
    fn test_missing_file() {
        let err = load_nugget("does-not-exist.md").unwrap_err();
        assert!(matches!(err, NuggetError::Io { .. }));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("broken.md");
        fs::write(&md, "# Broken\n\n[( )] a\n[( )] b\n").unwrap();

        let err = load_nugget(&md).unwrap_err();
        assert!(matches!(err, NuggetError::Parse { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn test_load_dir_reports_each_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), MARKUP).unwrap();
        fs::write(dir.path().join("b.md"), "# Broken\n[[?]] orphan\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let nuggets = load_nugget_dir(dir.path()).unwrap();
        assert_eq!(nuggets.len(), 2);
        assert!(nuggets[0].0.ends_with("a.md"));
        assert!(nuggets[0].1.is_ok());
        assert!(nuggets[1].0.ends_with("b.md"));
        assert!(matches!(nuggets[1].1, Err(NuggetError::Parse { .. })));
    }

    #[test]
    fn test_json_with_correct_index_out_of_range() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("bad.json");
        fs::write(
            &json,
            r#"{"title":"T","sections":[{"title":"T","level":1,"blocks":[
                {"kind":"fragment","index":1,"blocks":[
                    {"kind":"quiz","prompt":"Q","options":["a","b"],"correct_index":7}
                ]}
            ]}]}"#,
        )
        .unwrap();

        let err = load_nugget(&json).unwrap_err();
        match &err {
            NuggetError::InvalidBlock {
                section,
                block,
                source,
                ..
            } => {
                assert_eq!((*section, *block), (0, 0));
                assert_eq!(*source, MalformedBlock::MissingCorrectOption);
            }
            other => panic!("expected invalid block, got {:?}", other),
        }
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_json_without_options() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("empty.json");
        fs::write(
            &json,
            r#"{"title":"T","sections":[{"title":"T","level":1,"blocks":[
                {"kind":"quiz","prompt":"Q","options":[],"correct_index":0}
            ]}]}"#,
        )
        .unwrap();

        let err = load_nugget(&json).unwrap_err();
        assert!(matches!(
            err,
            NuggetError::InvalidBlock {
                source: MalformedBlock::NoOptions,
                ..
            }
        ));
    }
}
