use crate::executor::{CommandExecutor, ExecError, RealExecutor};
use biodeploy_core::ImageReference;
use std::fmt;

/// APIs the deploy path depends on: Cloud Run for the service, Container
/// Registry for the push target, Cloud SQL Admin for the instance binding.
const REQUIRED_APIS: &[(&str, &str)] = &[
    ("Cloud Run", "run.googleapis.com"),
    ("Container Registry", "containerregistry.googleapis.com"),
    ("Cloud SQL Admin", "sqladmin.googleapis.com"),
];

/// GCP operations client, parameterized over the executor for testability.
pub struct GcloudClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl GcloudClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for GcloudClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> GcloudClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Preflight ──

    /// Fail-fast checks run before the pipeline starts. Authentication
    /// itself is the operator's concern; this only verifies credentials
    /// and the target project are usable.
    pub async fn check_prerequisites(
        &self,
        project_id: &str,
    ) -> Result<PreflightReport, PreflightError> {
        let mut report = PreflightReport::default();

        // 1. gcloud CLI available
        match self
            .executor
            .run("gcloud", &args(["version", "--format", "value(version)"]))
            .await
        {
            Ok(version) => report.gcloud_version = Some(version.trim().to_owned()),
            Err(_) => return Err(PreflightError::GcloudNotInstalled),
        }

        // 2. Authenticated
        match self
            .executor
            .run("gcloud", &args(["auth", "print-access-token", "--quiet"]))
            .await
        {
            Ok(_) => report.authenticated = true,
            Err(_) => return Err(PreflightError::NotAuthenticated),
        }

        // 3. Project accessible
        match self
            .executor
            .run(
                "gcloud",
                &args(["projects", "describe", project_id, "--format", "value(name)"]),
            )
            .await
        {
            Ok(name) => report.project_name = Some(name.trim().to_owned()),
            Err(_) => return Err(PreflightError::ProjectNotAccessible(project_id.to_owned())),
        }

        // 4. Required APIs enabled
        for (_, api) in REQUIRED_APIS {
            let enabled = self
                .executor
                .run(
                    "gcloud",
                    &args([
                        "services",
                        "list",
                        "--project",
                        project_id,
                        "--filter",
                        &format!("config.name={api}"),
                        "--format",
                        "value(config.name)",
                    ]),
                )
                .await
                .map(|out| !out.trim().is_empty())
                .unwrap_or(false);

            if !enabled {
                report.disabled_apis.push((*api).to_owned());
            }
        }

        Ok(report)
    }

    // ── Cloud Run Deploy ──

    /// Roll out a new revision of `service_name` from a pushed image.
    ///
    /// The configuration bundle is fixed: managed platform, unauthenticated
    /// ingress, the declared listening port, and the Cloud SQL instances
    /// attached through the platform's own proxy. Returns the service URL.
    pub async fn deploy_run_service(
        &self,
        service_name: &str,
        image: &ImageReference,
        project_id: &str,
        region: &str,
        port: u16,
        cloudsql_instances: &[String],
    ) -> Result<String, DeployError> {
        let image = image.to_string();
        let port = port.to_string();
        let instances = cloudsql_instances.join(",");

        let cmd = vec![
            "run",
            "deploy",
            service_name,
            "--image",
            &image,
            "--project",
            project_id,
            "--region",
            region,
            "--platform",
            "managed",
            "--allow-unauthenticated",
            "--port",
            &port,
            "--add-cloudsql-instances",
            &instances,
            "--quiet",
            "--format",
            "value(status.url)",
        ];

        let cmd_owned: Vec<String> = cmd.iter().map(|s| (*s).to_owned()).collect();

        let output = self
            .executor
            .run("gcloud", &cmd_owned)
            .await
            .map_err(|e| DeployError::Deploy { source: e })?;

        Ok(output.trim().to_owned())
    }

    // ── Doctor ──

    /// Run all diagnostic checks without early return.
    /// Returns a report with pass/fail for each check item.
    pub async fn doctor(&self, project_id: Option<&str>) -> DoctorReport {
        let mut report = DoctorReport::default();

        // 1. gcloud CLI
        match self.executor.run("gcloud", &args(["version"])).await {
            Ok(v) => {
                // Parse "Google Cloud SDK X.Y.Z" from first line
                let version = v
                    .lines()
                    .next()
                    .and_then(|line| line.strip_prefix("Google Cloud SDK "))
                    .unwrap_or(v.trim());
                report.gcloud = CheckResult::ok(version.trim());
            }
            Err(e) => report.gcloud = CheckResult::fail(&e.to_string()),
        }

        // 2. Active account
        match self
            .executor
            .run("gcloud", &args(["config", "get-value", "account"]))
            .await
        {
            Ok(a) if !a.trim().is_empty() => report.account = CheckResult::ok(a.trim()),
            _ => report.account = CheckResult::fail("no active account"),
        }

        // 3. Project
        let Some(pid) = project_id else {
            report.project = CheckResult::fail("gcp_project_id not set in biodeploy.toml");
            return report;
        };

        match self
            .executor
            .run(
                "gcloud",
                &args(["projects", "describe", pid, "--format", "value(name)"]),
            )
            .await
        {
            Ok(name) => {
                report.project = CheckResult::ok(&format!("{pid} ({name})", name = name.trim()))
            }
            Err(_) => {
                report.project = CheckResult::fail(&format!("{pid} — not accessible"));
                return report;
            }
        }

        // 4. Required APIs
        for (label, api) in REQUIRED_APIS {
            let enabled = self
                .executor
                .run(
                    "gcloud",
                    &args([
                        "services",
                        "list",
                        "--project",
                        pid,
                        "--filter",
                        &format!("config.name={api}"),
                        "--format",
                        "value(config.name)",
                    ]),
                )
                .await
                .map(|out| !out.trim().is_empty())
                .unwrap_or(false);

            report.apis.push(ApiCheck {
                name: (*label).to_owned(),
                result: if enabled {
                    CheckResult::ok("Enabled")
                } else {
                    CheckResult::fail("Not enabled")
                },
            });
        }

        report
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Preflight types ──

#[derive(Debug, Default)]
pub struct PreflightReport {
    pub gcloud_version: Option<String>,
    pub authenticated: bool,
    pub project_name: Option<String>,
    pub disabled_apis: Vec<String>,
}

impl PreflightReport {
    pub fn has_warnings(&self) -> bool {
        !self.disabled_apis.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("gcloud CLI not installed — https://cloud.google.com/sdk/docs/install")]
    GcloudNotInstalled,

    #[error("not authenticated — run: gcloud auth login")]
    NotAuthenticated,

    #[error("GCP project '{0}' is not accessible — check project ID and permissions")]
    ProjectNotAccessible(String),
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub docker: CheckResult,
    pub gcloud: CheckResult,
    pub account: CheckResult,
    pub project: CheckResult,
    pub apis: Vec<ApiCheck>,
    pub config_file: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.docker.passed
            && self.gcloud.passed
            && self.account.passed
            && self.project.passed
            && self.config_file.passed
            && self.apis.iter().all(|a| a.result.passed)
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] docker CLI      {}", self.docker.icon(), self.docker.detail)?;
        writeln!(f, "[{}] gcloud CLI      {}", self.gcloud.icon(), self.gcloud.detail)?;
        writeln!(f, "[{}] account         {}", self.account.icon(), self.account.detail)?;
        writeln!(f, "[{}] project         {}", self.project.icon(), self.project.detail)?;
        for api in &self.apis {
            writeln!(f, "[{}] {:<15} {}", api.result.icon(), api.name, api.result.detail)?;
        }
        write!(
            f,
            "[{}] biodeploy.toml  {}",
            self.config_file.icon(),
            self.config_file.detail
        )
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

#[derive(Debug, Clone)]
pub struct ApiCheck {
    pub name: String,
    pub result: CheckResult,
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("cloud run deployment failed")]
    Deploy { source: ExecError },
}
