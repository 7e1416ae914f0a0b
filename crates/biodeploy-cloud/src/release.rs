use crate::docker::{DockerClient, DockerError};
use crate::executor::CommandExecutor;
use crate::gcloud::{DeployError, GcloudClient};
use biodeploy_core::ImageReference;
use std::path::Path;

/// Everything one release needs, resolved and validated up front.
#[derive(Debug)]
pub struct ReleasePlan<'a> {
    pub context_dir: &'a Path,
    pub local_image: &'a ImageReference,
    pub remote_image: &'a ImageReference,
    pub service_name: &'a str,
    pub project_id: &'a str,
    pub region: &'a str,
    pub port: u16,
    pub cloudsql_instances: &'a [String],
}

/// Run the release sequence: build → tag → push → deploy.
///
/// Strictly linear; each stage is a hard gate on the previous one
/// succeeding. The first failure propagates immediately — no retry, no
/// rollback, no cleanup of partially completed stages (an image pushed
/// before a deploy failure stays in the registry). Returns the deployed
/// service URL.
pub async fn release<D, G>(
    docker: &DockerClient<D>,
    gcloud: &GcloudClient<G>,
    plan: &ReleasePlan<'_>,
) -> Result<String, ReleaseError>
where
    D: CommandExecutor,
    G: CommandExecutor,
{
    tracing::info!("building image {}", plan.local_image);
    docker.build(plan.context_dir, plan.local_image).await?;

    tracing::info!("tagging {} as {}", plan.local_image, plan.remote_image);
    docker.tag(plan.local_image, plan.remote_image).await?;

    tracing::info!("pushing {}", plan.remote_image);
    docker.push(plan.remote_image).await?;

    tracing::info!("deploying {} in {}", plan.service_name, plan.region);
    let url = gcloud
        .deploy_run_service(
            plan.service_name,
            plan.remote_image,
            plan.project_id,
            plan.region,
            plan.port,
            plan.cloudsql_instances,
        )
        .await?;

    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Docker(#[from] DockerError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}
