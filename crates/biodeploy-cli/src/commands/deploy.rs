use biodeploy_build::{DockerfileGenerator, compose_context, is_dirty};
use biodeploy_cloud::{DockerClient, GcloudClient, ReleasePlan, release};
use biodeploy_core::{BiodeployConfig, DeployParams, ImageReference};
use std::path::PathBuf;

/// Execute the full pipeline: build → tag → push → deploy.
pub async fn deploy(allow_dirty: bool, tag: Option<String>) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");

    // Load and validate configuration before anything else runs; a
    // missing required parameter must abort before any external call.
    let config = BiodeployConfig::load(&project_dir)?;
    let params = DeployParams::resolve(&config, std::env::var("GOOGLE_CLOUD_PROJECT").ok())?;
    let tag = tag.unwrap_or_else(|| super::DEFAULT_TAG.to_owned());

    // Dirty check: refuse to deploy uncommitted changes unless --allow-dirty
    if !allow_dirty && is_dirty(&project_dir)? {
        anyhow::bail!(
            "uncommitted changes detected.\n\
             Commit your changes, or use `biodeploy deploy --allow-dirty` to deploy anyway."
        );
    }

    let docker = DockerClient::new();
    let gcloud = GcloudClient::new();

    // Pre-flight checks
    println!("Running pre-flight checks...");
    let report = gcloud.check_prerequisites(&params.project_id).await?;

    if report.has_warnings() {
        println!("Warning: the following APIs are not enabled:");
        for api in &report.disabled_apis {
            println!("  - {api}");
        }
        println!(
            "Enable them with: gcloud services enable <api> --project {project}",
            project = params.project_id
        );
        anyhow::bail!("required APIs not enabled");
    }

    // One local name, one registry-qualified name for the same content
    let local_image = ImageReference::local(&params.service_name, &tag);
    let remote_image = local_image.qualify(&params.registry, &params.project_id);

    // Compose the build context
    println!("Composing build context...");
    let dockerfile_content = DockerfileGenerator::new(&config.build, params.port).render();
    let context_dir = compose_context(&project_dir, &config.build, &dockerfile_content)?;

    // Build, tag, push, deploy — strictly in that order
    let plan = ReleasePlan {
        context_dir: &context_dir,
        local_image: &local_image,
        remote_image: &remote_image,
        service_name: &params.service_name,
        project_id: &params.project_id,
        region: &params.region,
        port: params.port,
        cloudsql_instances: &params.cloudsql_instances,
    };

    let url = release(&docker, &gcloud, &plan).await?;

    println!();
    println!("Deployed: {url}");

    Ok(())
}
