use biodeploy_build::{DockerfileGenerator, compose_context};
use biodeploy_cloud::DockerClient;
use biodeploy_core::{BiodeployConfig, ImageReference};
use std::path::PathBuf;

/// Build the container image locally without touching the registry or
/// the deploy platform.
pub async fn build(tag: Option<String>) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");

    let config = BiodeployConfig::load(&project_dir)?;
    config.build.validate()?;
    let tag = tag.unwrap_or_else(|| super::DEFAULT_TAG.to_owned());

    let image = ImageReference::local(&config.project.name, &tag);

    println!("Composing build context...");
    let dockerfile_content = DockerfileGenerator::new(&config.build, config.service.port).render();
    let context_dir = compose_context(&project_dir, &config.build, &dockerfile_content)?;

    println!("Building {image}...");
    let docker = DockerClient::new();
    docker.build(&context_dir, &image).await?;

    println!();
    println!("Built: {image}");

    Ok(())
}
