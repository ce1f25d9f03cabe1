//! Path handling for user-supplied backup directories.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Turn raw user input (CLI argument or config value) into an absolute path.
///
/// Surrounding whitespace is dropped and a leading `~` is expanded, matching
/// what users paste from a shell. The cleaned path is then resolved with
/// [`resolve_absolute_path`]. Empty input stays empty so directory validation
/// can report it as such.
#[must_use]
pub fn resolve_backup_dir(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return PathBuf::new();
    }
    resolve_absolute_path(&expand_user(trimmed))
}

pub(crate) fn expand_user(raw: &str) -> PathBuf {
    if let Some(home) = env::var_os("HOME") {
        if raw == "~" {
            return PathBuf::from(home);
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Resolve a path to an absolute, normalized path.
///
/// When the path exists, `fs::canonicalize` resolves symlinks and normalizes
/// components. Otherwise the path is made absolute against CWD and `..`/`.`
/// components are folded syntactically.
pub fn resolve_absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    if let Ok(canonical) = std::fs::canonicalize(&absolute) {
        return canonical;
    }

    normalize_syntactic(&absolute)
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_existing_path_canonically() {
        let cwd = env::current_dir().unwrap();
        let resolved = resolve_absolute_path(Path::new("."));
        assert_eq!(resolved, std::fs::canonicalize(&cwd).unwrap());
    }

    #[test]
    fn normalizes_nonexistent_path_syntactically() {
        let input = Path::new("/nonexistent/foo/../bar");
        let expected = Path::new("/nonexistent/bar");

        assert!(std::fs::canonicalize(input).is_err());
        assert_eq!(resolve_absolute_path(input), expected);
    }

    #[test]
    fn handles_parent_at_root() {
        let resolved = normalize_syntactic(Path::new("/../foo"));
        assert_eq!(resolved, Path::new("/foo"));
    }

    #[test]
    fn backup_dir_input_is_trimmed() {
        let resolved = resolve_backup_dir("  /nonexistent/backups/udid  ");
        assert_eq!(resolved, Path::new("/nonexistent/backups/udid"));
    }

    #[test]
    fn empty_backup_dir_input_stays_empty() {
        assert_eq!(resolve_backup_dir("   "), PathBuf::new());
        assert_eq!(resolve_backup_dir(""), PathBuf::new());
    }

    #[test]
    fn tilde_expands_against_home() {
        if let Some(home) = env::var_os("HOME") {
            let resolved = expand_user("~/Backups/udid");
            assert_eq!(resolved, PathBuf::from(home).join("Backups/udid"));
        }
    }
}
