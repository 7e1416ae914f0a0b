use biodeploy_cloud::{CheckResult, DockerClient, GcloudClient};
use biodeploy_core::BiodeployConfig;
use std::path::Path;

pub async fn doctor() -> anyhow::Result<()> {
    let config = BiodeployConfig::load(Path::new("."));
    let project_id = config
        .as_ref()
        .ok()
        .and_then(|c| c.project.gcp_project_id.as_deref());

    let gcloud = GcloudClient::new();
    let mut report = gcloud.doctor(project_id).await;

    // Docker CLI check
    let docker = DockerClient::new();
    report.docker = match docker.version().await {
        Ok(version) => CheckResult::ok(&version),
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    // Config file check
    if Path::new("biodeploy.toml").exists() {
        report.config_file = CheckResult::ok("Found");
    } else {
        report.config_file = CheckResult::fail("Not found");
    }

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed — see above for details");
    }

    Ok(())
}
