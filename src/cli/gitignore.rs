//! `.gitignore` patching for `init`, so slot files stay out of commits
//! when a vault lives inside a repository.

use std::fs;
use std::path::Path;

use crate::cli::output;

/// Append `entry` to `.gitignore` unless a line already matches it.
///
/// Creates the file if it doesn't exist. Write errors are ignored.
pub fn patch_gitignore(project_dir: &Path, entry: &str) {
    let gitignore_path = project_dir.join(".gitignore");

    let existing = fs::read_to_string(&gitignore_path).unwrap_or_default();

    if existing.lines().any(|line| line.trim() == entry) {
        return;
    }

    let separator = if existing.ends_with('\n') || existing.is_empty() {
        ""
    } else {
        "\n"
    };

    if fs::write(&gitignore_path, format!("{existing}{separator}{entry}\n")).is_ok() {
        output::info(&format!("Added '{entry}' to .gitignore"));
    }
}

/// The `.gitignore` line for a vault directory, or `None` when the
/// directory is outside `project_dir`.
pub fn vault_entry(project_dir: &Path, vault_dir: &Path) -> Option<String> {
    let relative = vault_dir.strip_prefix(project_dir).ok()?;
    let text = relative.to_str()?.trim_end_matches('/');
    if text.is_empty() {
        return None;
    }
    Some(format!("{text}/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_gitignore_with_vault_dir() {
        let dir = TempDir::new().unwrap();
        patch_gitignore(dir.path(), ".credvault/");

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, ".credvault/\n");
    }

    #[test]
    fn existing_entry_is_left_alone() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target/\n.credvault/\n").unwrap();

        patch_gitignore(dir.path(), ".credvault/");

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content.matches(".credvault/").count(), 1);
    }

    #[test]
    fn missing_trailing_newline_is_repaired() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target/").unwrap();

        patch_gitignore(dir.path(), ".credvault/");

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target/\n.credvault/\n");
    }

    #[test]
    fn vault_entry_is_relative_to_project() {
        let project = Path::new("/home/user/project");
        assert_eq!(
            vault_entry(project, &project.join(".credvault")).as_deref(),
            Some(".credvault/")
        );
        assert_eq!(vault_entry(project, Path::new("/var/vaults")), None);
        assert_eq!(vault_entry(project, project), None);
    }
}
