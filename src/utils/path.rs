use std::path::{Path, PathBuf};

fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Replace the home directory prefix with `~`
pub fn tildify(path: &Path) -> String {
    match home_dir() {
        Some(home) => tildify_with(path, &home),
        None => path.to_string_lossy().to_string(),
    }
}

fn tildify_with(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(relative) if relative.as_os_str().is_empty() => "~".to_string(),
        Ok(relative) => format!("~/{}", relative.to_string_lossy()),
        Err(_) => path.to_string_lossy().to_string(),
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match home_dir() {
        Some(home) => expand_home_with(path, &home),
        None => path.to_path_buf(),
    }
}

fn expand_home_with(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Shorten a path for display, replacing home directory with ~ and truncating long paths
pub fn shorten_path_for_display(path: &Path) -> String {
    shorten_long_path(&tildify(path))
}

/// Shorten very long paths by truncating the middle
fn shorten_long_path(path: &str) -> String {
    const MAX_LENGTH: usize = 50;

    let chars: Vec<char> = path.chars().collect();
    if chars.len() <= MAX_LENGTH {
        return path.to_string();
    }

    // For very long paths, show start...end
    let start_len = MAX_LENGTH / 2 - 2;
    let end_len = MAX_LENGTH / 2 - 1;

    let start: String = chars[..start_len].iter().collect();
    let end: String = chars[chars.len() - end_len..].iter().collect();
    format!("{}...{}", start, end)
}

/// Canonicalize a path, resolving symlinks and normalizing
pub fn canonicalize_path(path: &Path) -> anyhow::Result<PathBuf> {
    let path = expand_home(path);

    // Convert to absolute path first if needed
    let absolute_path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };

    // Canonicalize to resolve symlinks and normalize
    let canonical_path = absolute_path.canonicalize().unwrap_or(absolute_path); // Fall back if canonicalize fails

    Ok(canonical_path)
}
