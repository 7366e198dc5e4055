//! Project discovery
//!
//! A project is any directory that directly contains a `.git` directory.
//! Searching is delegated to `fd` when installed and to `find` otherwise;
//! both produce the same candidates because exclusion is always re-applied
//! as a plain substring test on the project path.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::error::DiscoveryError;
use crate::utils::path::canonicalize_path;

/// Name of the version-control metadata directory that marks a project
pub const METADATA_DIR: &str = ".git";

const FD_MAX_DEPTH: &str = "6";
const FIND_MAX_DEPTH: &str = "7";
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '\\'];

/// External search utility used to enumerate metadata directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTool {
    /// `fd` (or `fdfind` on Debian), with the resolved binary path
    Fd(PathBuf),
    Find(PathBuf),
}

impl SearchTool {
    /// Prefer `fd`, fall back to `find`
    pub fn detect() -> Option<Self> {
        for name in ["fd", "fdfind"] {
            if let Ok(path) = which::which(name) {
                return Some(SearchTool::Fd(path));
            }
        }
        which::which("find").ok().map(SearchTool::Find)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchTool::Fd(_) => "fd",
            SearchTool::Find(_) => "find",
        }
    }

    fn program(&self) -> &Path {
        match self {
            SearchTool::Fd(path) | SearchTool::Find(path) => path,
        }
    }

    /// Arguments for searching one root
    pub fn args(&self, root: &Path, exclude_patterns: &[String]) -> Vec<String> {
        let root = root.to_string_lossy().to_string();
        let pruned = exclude_patterns.iter().filter(|p| is_prunable(p));

        match self {
            SearchTool::Fd(_) => {
                let mut args: Vec<String> = [
                    "--type",
                    "d",
                    "--hidden",
                    "--no-ignore-vcs",
                    "--absolute-path",
                    "--max-depth",
                    FD_MAX_DEPTH,
                ]
                .iter()
                .map(|s| s.to_string())
                .collect();
                for pattern in pruned {
                    args.push("--exclude".to_string());
                    args.push(format!("*{}*", pattern));
                }
                args.push(format!("^{}$", regex::escape(METADATA_DIR)));
                args.push(root);
                args
            }
            SearchTool::Find(_) => {
                let mut args = vec![root, "-maxdepth".to_string(), FIND_MAX_DEPTH.to_string()];
                let pruned: Vec<&String> = pruned.collect();
                if !pruned.is_empty() {
                    args.push("(".to_string());
                    for (i, pattern) in pruned.iter().enumerate() {
                        if i > 0 {
                            args.push("-o".to_string());
                        }
                        args.push("-path".to_string());
                        args.push(format!("*{}*", pattern));
                    }
                    args.push(")".to_string());
                    args.push("-prune".to_string());
                    args.push("-o".to_string());
                }
                for arg in ["-type", "d", "-name", METADATA_DIR, "-prune", "-print"] {
                    args.push(arg.to_string());
                }
                args
            }
        }
    }
}

/// Whether a pattern can be handed to the search tool as a `*pattern*` glob.
/// Patterns with glob syntax in them are left to the substring post-filter.
fn is_prunable(pattern: &str) -> bool {
    !pattern.is_empty() && !METADATA_DIR.contains(pattern) && !pattern.contains(GLOB_META)
}

/// Enumerates project directories below a set of scan roots
#[derive(Debug, Clone)]
pub struct ProjectFinder {
    scan_paths: Vec<PathBuf>,
    exclude_patterns: Vec<String>,
    tool: Option<SearchTool>,
}

impl ProjectFinder {
    pub fn new(scan_paths: Vec<PathBuf>, exclude_patterns: Vec<String>) -> Self {
        Self {
            scan_paths,
            exclude_patterns,
            tool: SearchTool::detect(),
        }
    }

    /// Use a specific search tool instead of detecting one
    pub fn with_tool(mut self, tool: Option<SearchTool>) -> Self {
        self.tool = tool;
        self
    }

    /// Search every root concurrently. A root that fails contributes nothing;
    /// only a missing search tool fails the whole discovery.
    pub async fn find_projects(&self) -> Result<Vec<PathBuf>, DiscoveryError> {
        let tool = self.tool.as_ref().ok_or(DiscoveryError::NoSearchTool)?;
        tracing::info!(
            "Scanning {} root(s) for projects with {}",
            self.scan_paths.len(),
            tool.name()
        );

        let searches = self
            .scan_paths
            .iter()
            .map(|root| self.search_root(tool, root));

        let mut projects = Vec::new();
        for result in join_all(searches).await {
            match result {
                Ok(found) => projects.extend(found),
                Err(e) => tracing::warn!("{}", e),
            }
        }

        tracing::info!("Found {} project(s)", projects.len());
        Ok(projects)
    }

    async fn search_root(
        &self,
        tool: &SearchTool,
        root: &Path,
    ) -> Result<Vec<PathBuf>, DiscoveryError> {
        let failed = |reason: String| DiscoveryError::DiscoveryFailed {
            root: root.to_path_buf(),
            reason,
        };

        if !root.is_dir() {
            return Err(failed("not a directory".to_string()));
        }
        // Candidates must be absolute whichever tool produced them
        let root = canonicalize_path(root).map_err(|e| failed(e.to_string()))?;

        let output = Command::new(tool.program())
            .args(tool.args(&root, &self.exclude_patterns))
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let projects = parse_search_output(&stdout, &self.exclude_patterns);

        if !output.status.success() {
            // find exits non-zero on unreadable subdirectories but still
            // reports everything it could reach
            if projects.is_empty() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = stderr
                    .lines()
                    .next()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} exited with {}", tool.name(), output.status));
                return Err(failed(reason));
            }
            tracing::debug!(
                "{} exited with {} for {}, keeping {} partial result(s)",
                tool.name(),
                output.status,
                root.display(),
                projects.len()
            );
        }

        Ok(projects)
    }
}

/// Turn search tool output (one metadata directory per line) into project
/// directories, dropping anything whose path contains an excluded substring.
pub fn parse_search_output(output: &str, exclude_patterns: &[String]) -> Vec<PathBuf> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| Path::new(line.trim_end_matches('/')).parent())
        .filter(|project| !is_excluded(project, exclude_patterns))
        .map(Path::to_path_buf)
        .collect()
}

pub fn is_excluded(path: &Path, exclude_patterns: &[String]) -> bool {
    let path = path.to_string_lossy();
    exclude_patterns
        .iter()
        .any(|pattern| !pattern.is_empty() && path.contains(pattern.as_str()))
}
