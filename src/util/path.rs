use std::path::{Path, PathBuf};

use crate::infrastructure::source::STDIN;

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
///
/// Unknown variables leave the path untouched; `-` stays `-`.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    if raw == STDIN {
        return path.to_path_buf();
    }
    shellexpand::full(&raw)
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tilde_when_expanding_then_uses_home() {
        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = expand_path(Path::new("~/records.json"));
        assert_eq!(expanded, Path::new(&home).join("records.json"));
    }

    #[test]
    fn given_stdin_marker_when_expanding_then_unchanged() {
        assert_eq!(expand_path(Path::new("-")), PathBuf::from("-"));
    }

    #[test]
    fn given_unknown_variable_when_expanding_then_unchanged() {
        let path = Path::new("$SPRINGTREE_SURELY_UNSET_VAR/x.json");
        assert_eq!(expand_path(path), path);
    }
}
