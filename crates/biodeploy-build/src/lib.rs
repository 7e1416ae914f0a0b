//! Dockerfile recipe and build-context composition for biodeploy.
//!
//! # Pipeline position
//!
//! ```text
//! biodeploy deploy
//!   1. Dirty check  ── git status --porcelain (skip with --allow-dirty)
//!   2. Context      ── git ls-files → .biodeploy-context/
//!   3. Dockerfile   ── DockerfileGenerator::render()
//!   4. Release      ── docker build / tag / push, gcloud run deploy
//! ```
//!
//! # Context strategy
//!
//! The build context mirrors the git repository state:
//! - All tracked and untracked (non-ignored) files via `git ls-files`
//! - `.gitignore`d paths are excluded automatically
//! - `.biodeploy-context/` and `.git/` are always excluded
//!
//! The context is composed once, validated up front (dependency manifest
//! and entrypoint module must exist), and never mutated afterwards; the
//! docker build only reads it.

pub mod dockerfile;

pub use dockerfile::DockerfileGenerator;

use biodeploy_core::BuildConfig;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Files/directories that biodeploy always excludes from the build
/// context, regardless of .gitignore content.
const CONTEXT_EXCLUDES: &[&str] = &[".biodeploy-context", ".git"];

/// Compose the build context for a docker build.
///
/// Validates that the dependency manifest and the entrypoint module
/// declared in `config` exist before anything is copied, then mirrors
/// the project tree (via `git ls-files`, respecting `.gitignore`) into
/// `.biodeploy-context/` and writes the generated Dockerfile into it.
pub fn compose_context(
    project_dir: &Path,
    config: &BuildConfig,
    dockerfile_content: &str,
) -> Result<PathBuf, ContextError> {
    let manifest = project_dir.join(&config.manifest);
    if !manifest.exists() {
        return Err(ContextError::MissingManifest { path: manifest });
    }

    let entrypoint = project_dir.join(entry_module_file(&config.app_module));
    if !entrypoint.exists() {
        return Err(ContextError::MissingEntrypoint {
            app_module: config.app_module.clone(),
            path: entrypoint,
        });
    }

    let context_dir = project_dir.join(".biodeploy-context");

    // Clean previous context
    if context_dir.exists() {
        std::fs::remove_dir_all(&context_dir).map_err(|e| ContextError::Cleanup {
            path: context_dir.clone(),
            source: e,
        })?;
    }
    std::fs::create_dir_all(&context_dir).map_err(|e| ContextError::Create {
        path: context_dir.clone(),
        source: e,
    })?;

    // Get file list from git (respects .gitignore)
    let files = git_ls_files(project_dir)?;

    // Copy each file into the context
    for relative_path in &files {
        if CONTEXT_EXCLUDES
            .iter()
            .any(|ex| relative_path.starts_with(ex))
        {
            continue;
        }

        let src = project_dir.join(relative_path);
        let dst = context_dir.join(relative_path);

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ContextError::Create {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::copy(&src, &dst).map_err(|e| ContextError::CopyFile {
            path: src,
            source: e,
        })?;
    }

    // Write generated Dockerfile
    std::fs::write(context_dir.join("Dockerfile"), dockerfile_content).map_err(|e| {
        ContextError::WriteDockerfile {
            path: context_dir.join("Dockerfile"),
            source: e,
        }
    })?;

    Ok(context_dir)
}

/// Source file backing an ASGI application path:
/// `server:app` → `server.py`, `bioindex.server:app` → `bioindex/server.py`.
pub fn entry_module_file(app_module: &str) -> PathBuf {
    let module = app_module.split(':').next().unwrap_or(app_module);
    PathBuf::from(format!("{}.py", module.replace('.', "/")))
}

/// Returns the list of files git considers part of the project:
/// tracked files + untracked files that are not .gitignored.
fn git_ls_files(project_dir: &Path) -> Result<Vec<PathBuf>, ContextError> {
    let output = Command::new("git")
        .args(["ls-files", "--cached", "--others", "--exclude-standard"])
        .current_dir(project_dir)
        .output()
        .map_err(|e| ContextError::GitCommand {
            detail: "failed to execute git ls-files".to_owned(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ContextError::GitFailed {
            detail: format!(
                "git ls-files exited with {}: {}",
                output.status,
                stderr.trim()
            ),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let files: Vec<PathBuf> = stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect();

    Ok(files)
}

/// Checks whether the git working tree has uncommitted changes.
pub fn is_dirty(project_dir: &Path) -> Result<bool, ContextError> {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(project_dir)
        .output()
        .map_err(|e| ContextError::GitCommand {
            detail: "failed to execute git status".to_owned(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ContextError::GitFailed {
            detail: format!(
                "git status exited with {}: {}",
                output.status,
                stderr.trim()
            ),
        });
    }

    Ok(!output.stdout.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("dependency manifest not found at {path}")]
    MissingManifest { path: PathBuf },

    #[error("entrypoint module '{app_module}' not found — expected {path}")]
    MissingEntrypoint { app_module: String, path: PathBuf },

    #[error("failed to clean up context directory {path}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy file {path}")]
    CopyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write Dockerfile at {path}")]
    WriteDockerfile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("git command failed: {detail}")]
    GitCommand {
        detail: String,
        source: std::io::Error,
    },

    #[error("git failed: {detail}")]
    GitFailed { detail: String },
}
