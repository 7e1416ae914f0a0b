use crate::executor::{CommandExecutor, ExecError, RealExecutor};
use biodeploy_core::ImageReference;
use std::path::Path;

/// Local docker operations, parameterized over the executor for testability.
pub struct DockerClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Build an image from a composed context directory, streaming the
    /// build output to the terminal.
    pub async fn build(
        &self,
        context_dir: &Path,
        image: &ImageReference,
    ) -> Result<(), DockerError> {
        let context_str = context_dir
            .to_str()
            .ok_or_else(|| DockerError::InvalidPath(context_dir.to_path_buf()))?;

        self.executor
            .run_streaming(
                "docker",
                &args(["build", "--tag", &image.to_string(), context_str]),
            )
            .await
            .map_err(|e| DockerError::Build {
                image: image.to_string(),
                source: e,
            })
    }

    /// Attach a second name to an already built image. Same content, new
    /// reference; the original name stays valid.
    pub async fn tag(
        &self,
        from: &ImageReference,
        to: &ImageReference,
    ) -> Result<(), DockerError> {
        self.executor
            .run("docker", &args(["tag", &from.to_string(), &to.to_string()]))
            .await
            .map(|_| ())
            .map_err(|e| DockerError::Tag {
                from: from.to_string(),
                to: to.to_string(),
                source: e,
            })
    }

    /// Upload a registry-qualified image, streaming progress to the
    /// terminal. Registry authentication must already be in place.
    pub async fn push(&self, image: &ImageReference) -> Result<(), DockerError> {
        self.executor
            .run_streaming("docker", &args(["push", &image.to_string()]))
            .await
            .map_err(|e| DockerError::Push {
                image: image.to_string(),
                source: e,
            })
    }

    /// Docker client version, used by diagnostics.
    pub async fn version(&self) -> Result<String, DockerError> {
        self.executor
            .run("docker", &args(["version", "--format", "{{.Client.Version}}"]))
            .await
            .map(|v| v.trim().to_owned())
            .map_err(|e| DockerError::Version { source: e })
    }
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("image build failed for {image}")]
    Build { image: String, source: ExecError },

    #[error("tagging {from} as {to} failed")]
    Tag {
        from: String,
        to: String,
        source: ExecError,
    },

    #[error("push failed for {image}")]
    Push { image: String, source: ExecError },

    #[error("docker version check failed")]
    Version { source: ExecError },

    #[error("build context path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),
}
