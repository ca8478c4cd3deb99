// src/cli/paths.rs
//
// Program discovery for the classify command.

use std::path::{Path, PathBuf};

use glob::glob;

/// Errors that can occur while collecting program files
#[derive(Debug)]
pub enum PathError {
    /// Glob pattern syntax error
    InvalidPattern { pattern: String, message: String },
    /// IO error (permissions, etc.)
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::InvalidPattern { pattern, message } => {
                write!(f, "invalid glob pattern '{}': {}", pattern, message)
            }
            PathError::IoError { path, source } => {
                write!(f, "error reading '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Collect the program files under `root` whose names match `pattern`
/// (e.g. "*.c"). With `recursive` set, subdirectories are searched too.
///
/// Results are sorted by path so classification runs are reproducible.
pub fn collect_programs(
    root: &Path,
    pattern: &str,
    recursive: bool,
) -> Result<Vec<PathBuf>, PathError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let glob_pattern = if recursive {
        format!("{}/**/{}", root.display(), pattern)
    } else {
        format!("{}/{}", root.display(), pattern)
    };

    let entries = glob(&glob_pattern).map_err(|e| PathError::InvalidPattern {
        pattern: glob_pattern.clone(),
        message: e.msg.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                return Err(PathError::IoError {
                    path: e.path().to_path_buf(),
                    source: e.into(),
                });
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(&path).unwrap();
        file.write_all(b"void main() {}").unwrap();
        path
    }

    #[test]
    fn collects_matching_files_sorted() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "z.c");
        create_file(dir.path(), "a.c");
        create_file(dir.path(), "notes.txt");

        let files = collect_programs(dir.path(), "*.c", false).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap()).collect();
        assert_eq!(names, ["a.c", "z.c"]);
    }

    #[test]
    fn non_recursive_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "top.c");
        create_file(dir.path(), "sub/nested.c");

        let files = collect_programs(dir.path(), "*.c", false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn recursive_descends_into_subdirectories() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "top.c");
        create_file(dir.path(), "sub/nested.c");
        create_file(dir.path(), "sub/deep/leaf.c");

        let files = collect_programs(dir.path(), "*.c", true).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn single_file_path_is_returned_as_is() {
        let dir = TempDir::new().unwrap();
        let file = create_file(dir.path(), "only.c");

        let files = collect_programs(&file, "*.c", false).unwrap();
        assert_eq!(files, [file]);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = collect_programs(dir.path(), "[broken", false);
        assert!(matches!(result, Err(PathError::InvalidPattern { .. })));
    }

    #[test]
    fn empty_result_is_ok() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "readme.md");

        let files = collect_programs(dir.path(), "*.c", false).unwrap();
        assert!(files.is_empty());
    }
}
