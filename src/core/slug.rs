use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const FALLBACK_SLUG: &str = "session";

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9-]").expect("static regex"))
}

fn dash_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{2,}").expect("static regex"))
}

/// Turn a project path into a tmux session name.
///
/// Only the last path segment is used, so `/a/web` and `/b/web` share a slug.
/// The result always matches `^[a-z0-9-]+$`.
pub fn slugify(project_path: &str) -> String {
    let name = project_name(project_path).to_lowercase().replace('.', "-");
    let name = invalid_chars().replace_all(&name, "-");
    let name = dash_runs().replace_all(&name, "-");
    let slug = name.trim_matches('-');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Final path segment, used as the human-readable project name.
pub fn project_name(project_path: &str) -> String {
    let trimmed = project_path.trim_end_matches('/');
    if trimmed.is_empty() {
        return project_path.to_string();
    }
    Path::new(trimmed)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        // `..` style tails have no file_name; keep the raw segment
        .unwrap_or_else(|| {
            trimmed
                .rsplit('/')
                .next()
                .unwrap_or(trimmed)
                .to_string()
        })
}
