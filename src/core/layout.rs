//! Layout scripts
//!
//! A layout is an executable file in the layouts directory. It is run with
//! `<project path> <session name> <project name>` and is expected to create
//! a fully configured tmux session.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use super::error::{DiscoveryError, LaunchError};

/// Layout scripts installed by `muxpick init`
pub const DEFAULT_LAYOUTS: &[(&str, &str)] = &[
    ("editor-agent", include_str!("../../assets/layouts/editor-agent.sh")),
    ("editor", include_str!("../../assets/layouts/editor.sh")),
    ("split", include_str!("../../assets/layouts/split.sh")),
    ("shell", include_str!("../../assets/layouts/shell.sh")),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LayoutStore {
    dir: PathBuf,
}

impl LayoutStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Executable, non-directory entries of the layouts directory, sorted by
    /// name. A missing directory is simply empty.
    pub fn list(&self) -> Result<Vec<Layout>, DiscoveryError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Layout directory {} does not exist", self.dir.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(DiscoveryError::LayoutDir {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut layouts: Vec<Layout> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                // Follows symlinks so a linked script counts like the real file
                std::fs::metadata(entry.path())
                    .map(|meta| is_runnable(&meta))
                    .unwrap_or(false)
            })
            .map(|entry| Layout {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
            })
            .collect();

        layouts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(layouts)
    }

    /// Resolve a layout by name, re-checking it at the time of use.
    pub fn get(&self, name: &str) -> Result<Layout, LaunchError> {
        let not_found = || LaunchError::LayoutNotFound {
            name: name.to_string(),
            dir: self.dir.clone(),
        };

        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(not_found());
        }

        let path = self.dir.join(name);
        let meta = std::fs::metadata(&path).map_err(|_| not_found())?;
        if meta.is_dir() {
            return Err(not_found());
        }
        if !is_executable(&meta) {
            return Err(LaunchError::LayoutNotExecutable {
                name: name.to_string(),
                path,
            });
        }

        Ok(Layout {
            name: name.to_string(),
            path,
        })
    }

    /// Write the bundled layouts, leaving existing files untouched.
    /// Returns the names that were newly written.
    pub fn install_defaults(&self) -> std::io::Result<Vec<String>> {
        std::fs::create_dir_all(&self.dir)?;

        let mut installed = Vec::new();
        for (name, script) in DEFAULT_LAYOUTS {
            let path = self.dir.join(name);
            if path.exists() {
                tracing::debug!("Layout {} already present, skipping", name);
                continue;
            }
            std::fs::write(&path, script)?;
            set_executable(&path)?;
            installed.push(name.to_string());
        }
        Ok(installed)
    }
}

fn is_runnable(meta: &Metadata) -> bool {
    !meta.is_dir() && is_executable(meta)
}

#[cfg(unix)]
fn is_executable(meta: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(meta: &Metadata) -> bool {
    meta.is_file()
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = LayoutStore::new(temp.path().join("nope"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("locked");
        std::fs::create_dir(&dir).unwrap();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root
        let readable = std::fs::read_dir(&dir).is_ok();
        let result = LayoutStore::new(&dir).list();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(DiscoveryError::LayoutDir { ref path, .. }) if *path == dir));
        }
    }

    #[test]
    fn test_file_in_place_of_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("layouts");
        std::fs::write(&file, "").unwrap();

        assert!(matches!(
            LayoutStore::new(&file).list(),
            Err(DiscoveryError::LayoutDir { .. })
        ));
    }

    #[test]
    fn test_lists_only_executable_files() {
        let temp = TempDir::new().unwrap();
        write_script(temp.path(), "zeta", 0o755);
        write_script(temp.path(), "alpha", 0o700);
        write_script(temp.path(), "group-only", 0o610);
        write_script(temp.path(), "notes.txt", 0o644);
        std::fs::create_dir(temp.path().join("subdir")).unwrap();

        let names: Vec<String> = LayoutStore::new(temp.path())
            .list()
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["alpha", "group-only", "zeta"]);
    }

    #[test]
    fn test_list_reports_absolute_paths() {
        let temp = TempDir::new().unwrap();
        write_script(temp.path(), "shell", 0o755);

        let layouts = LayoutStore::new(temp.path()).list().unwrap();
        assert_eq!(layouts[0].path, temp.path().join("shell"));
    }

    #[test]
    fn test_get_checks_existence_and_mode() {
        let temp = TempDir::new().unwrap();
        write_script(temp.path(), "ok", 0o755);
        write_script(temp.path(), "plain", 0o644);
        std::fs::create_dir(temp.path().join("dir")).unwrap();
        let store = LayoutStore::new(temp.path());

        assert_eq!(store.get("ok").unwrap().path, temp.path().join("ok"));
        assert!(matches!(
            store.get("plain"),
            Err(LaunchError::LayoutNotExecutable { .. })
        ));
        assert!(matches!(store.get("dir"), Err(LaunchError::LayoutNotFound { .. })));
        assert!(matches!(store.get("gone"), Err(LaunchError::LayoutNotFound { .. })));
        assert!(matches!(
            store.get("../ok"),
            Err(LaunchError::LayoutNotFound { .. })
        ));
    }

    #[test]
    fn test_install_defaults_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("layouts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("shell"), "custom").unwrap();

        let store = LayoutStore::new(&dir);
        let installed = store.install_defaults().unwrap();
        assert_eq!(installed, vec!["editor-agent", "editor", "split"]);
        assert_eq!(std::fs::read_to_string(dir.join("shell")).unwrap(), "custom");

        let names: Vec<String> = store.list().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["editor", "editor-agent", "split"]);
    }
}
