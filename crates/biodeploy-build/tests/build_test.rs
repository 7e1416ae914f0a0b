use std::path::Path;
use std::process::Command;

use biodeploy_build::{ContextError, DockerfileGenerator, compose_context, entry_module_file, is_dirty};
use biodeploy_core::BuildConfig;
use tempfile::TempDir;

/// Initialize a git repo with a minimal Python project and an initial commit.
fn init_git_project(dir: &Path) {
    std::fs::write(dir.join("requirements.txt"), "fastapi>=0.53\n").unwrap();
    std::fs::write(dir.join("server.py"), "app = object()\n").unwrap();

    Command::new("git")
        .args(["init"])
        .current_dir(dir)
        .output()
        .unwrap();
    Command::new("git")
        .args(["config", "user.email", "test@test.com"])
        .current_dir(dir)
        .output()
        .unwrap();
    Command::new("git")
        .args(["config", "user.name", "Test"])
        .current_dir(dir)
        .output()
        .unwrap();
    Command::new("git")
        .args(["add", "."])
        .current_dir(dir)
        .output()
        .unwrap();
    Command::new("git")
        .args(["commit", "-m", "init"])
        .current_dir(dir)
        .output()
        .unwrap();
}

// ── Dockerfile Generation Tests ──

#[test]
fn dockerfile_pins_base_version_and_platform() {
    let config = BuildConfig::default();
    let output = DockerfileGenerator::new(&config, 5000).render();

    assert!(output.contains("FROM --platform=linux/amd64 python:3.8.12-slim-bullseye"));
    assert!(!output.contains(":latest"));
}

#[test]
fn dockerfile_installs_system_packages() {
    let config = BuildConfig::default();
    let output = DockerfileGenerator::new(&config, 5000).render();

    assert!(output.contains("apt-get install -y build-essential default-libmysqlclient-dev"));
    assert!(output.contains("rm -rf /var/lib/apt/lists/*"));
}

#[test]
fn dockerfile_no_apt_layer_when_packages_empty() {
    let config = BuildConfig {
        system_packages: vec![],
        ..Default::default()
    };
    let output = DockerfileGenerator::new(&config, 5000).render();

    assert!(!output.contains("apt-get install"));
}

#[test]
fn dockerfile_bypasses_pip_cache() {
    let config = BuildConfig::default();
    let output = DockerfileGenerator::new(&config, 5000).render();

    assert!(output.contains("pip install --no-cache-dir -r requirements.txt"));
}

#[test]
fn dockerfile_copies_manifest_before_source() {
    let config = BuildConfig::default();
    let output = DockerfileGenerator::new(&config, 5000).render();

    let manifest_copy = output.find("COPY requirements.txt").unwrap();
    let source_copy = output.find("COPY . .").unwrap();
    assert!(manifest_copy < source_copy);
}

#[test]
fn dockerfile_exposes_declared_port() {
    let config = BuildConfig::default();
    let output = DockerfileGenerator::new(&config, 5000).render();

    assert!(output.contains("EXPOSE 5000"));
    assert!(output.contains("0.0.0.0:5000"));
}

#[test]
fn dockerfile_launch_command_disables_request_timeout() {
    let config = BuildConfig::default();
    let output = DockerfileGenerator::new(&config, 5000).render();

    assert!(output.contains("\"gunicorn\""));
    assert!(output.contains("\"uvicorn.workers.UvicornWorker\""));
    assert!(output.contains("\"--timeout\", \"0\""));
    assert!(output.contains("\"server:app\""));
}

#[test]
fn dockerfile_uses_configured_workers_and_module() {
    let config = BuildConfig {
        app_module: "bioindex.server:app".to_owned(),
        workers: 2,
        ..Default::default()
    };
    let output = DockerfileGenerator::new(&config, 8000).render();

    assert!(output.contains("\"-w\", \"2\""));
    assert!(output.contains("\"bioindex.server:app\""));
    assert!(output.contains("EXPOSE 8000"));
}

#[test]
fn dockerfile_uses_configured_manifest() {
    let config = BuildConfig {
        manifest: "requirements-prod.txt".to_owned(),
        ..Default::default()
    };
    let output = DockerfileGenerator::new(&config, 5000).render();

    assert!(output.contains("COPY requirements-prod.txt ."));
    assert!(output.contains("pip install --no-cache-dir -r requirements-prod.txt"));
}

// ── Entry module resolution ──

#[test]
fn entry_module_file_flat_module() {
    assert_eq!(entry_module_file("server:app"), Path::new("server.py"));
}

#[test]
fn entry_module_file_dotted_module() {
    assert_eq!(
        entry_module_file("bioindex.server:app"),
        Path::new("bioindex/server.py")
    );
}

// ── Context Composition Tests ──

#[test]
fn context_creates_expected_structure() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());

    let config = BuildConfig::default();
    let context = compose_context(tmp.path(), &config, "FROM scratch").unwrap();

    assert!(context.ends_with(".biodeploy-context"));
    assert!(context.join("requirements.txt").exists());
    assert!(context.join("server.py").exists());
    assert_eq!(
        std::fs::read_to_string(context.join("Dockerfile")).unwrap(),
        "FROM scratch"
    );
}

#[test]
fn context_fails_without_manifest() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::remove_file(tmp.path().join("requirements.txt")).unwrap();

    let config = BuildConfig::default();
    let result = compose_context(tmp.path(), &config, "FROM scratch");

    assert!(matches!(result, Err(ContextError::MissingManifest { .. })));
    // Fail-fast: nothing was composed.
    assert!(!tmp.path().join(".biodeploy-context").exists());
}

#[test]
fn context_fails_without_entrypoint_module() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::remove_file(tmp.path().join("server.py")).unwrap();

    let config = BuildConfig::default();
    let result = compose_context(tmp.path(), &config, "FROM scratch");

    assert!(matches!(
        result,
        Err(ContextError::MissingEntrypoint { .. })
    ));
    assert!(!tmp.path().join(".biodeploy-context").exists());
}

#[test]
fn context_respects_gitignore() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::write(tmp.path().join(".gitignore"), ".env\n").unwrap();
    std::fs::write(tmp.path().join(".env"), "SECRET=1").unwrap();

    let config = BuildConfig::default();
    let context = compose_context(tmp.path(), &config, "FROM scratch").unwrap();

    assert!(!context.join(".env").exists());
    assert!(context.join("server.py").exists());
}

#[test]
fn context_copies_nested_source_dirs() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::create_dir_all(tmp.path().join("api")).unwrap();
    std::fs::write(tmp.path().join("api/bio.py"), "router = None\n").unwrap();
    std::fs::create_dir_all(tmp.path().join("schema")).unwrap();
    std::fs::write(tmp.path().join("schema/genes.json"), "{}").unwrap();

    let config = BuildConfig::default();
    let context = compose_context(tmp.path(), &config, "FROM scratch").unwrap();

    assert!(context.join("api/bio.py").exists());
    assert!(context.join("schema/genes.json").exists());
}

#[test]
fn context_excludes_previous_context_dir() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());

    let config = BuildConfig::default();
    compose_context(tmp.path(), &config, "FROM scratch").unwrap();
    let context = compose_context(tmp.path(), &config, "FROM scratch").unwrap();

    assert!(!context.join(".biodeploy-context").exists());
}

#[test]
fn context_cleans_previous_context() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());

    let config = BuildConfig::default();
    let context = compose_context(tmp.path(), &config, "FROM scratch").unwrap();
    std::fs::write(context.join("stale.txt"), "old").unwrap();

    let context = compose_context(tmp.path(), &config, "FROM scratch").unwrap();
    assert!(!context.join("stale.txt").exists());
}

#[test]
fn context_fails_outside_git_repo() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("requirements.txt"), "fastapi\n").unwrap();
    std::fs::write(tmp.path().join("server.py"), "app = object()\n").unwrap();

    let config = BuildConfig::default();
    let result = compose_context(tmp.path(), &config, "FROM scratch");

    assert!(matches!(result, Err(ContextError::GitFailed { .. })));
}

// ── Dirty Check Tests ──

#[test]
fn is_dirty_clean_repo() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());

    assert!(!is_dirty(tmp.path()).unwrap());
}

#[test]
fn is_dirty_with_uncommitted_changes() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::write(tmp.path().join("server.py"), "app = None  # changed\n").unwrap();

    assert!(is_dirty(tmp.path()).unwrap());
}

#[test]
fn is_dirty_with_untracked_file() {
    let tmp = TempDir::new().unwrap();
    init_git_project(tmp.path());
    std::fs::write(tmp.path().join("notes.md"), "todo").unwrap();

    assert!(is_dirty(tmp.path()).unwrap());
}
