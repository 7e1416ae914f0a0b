use serde::{Deserialize, Serialize};

/// biodeploy.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiodeployConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Service name, used for the local image name and the Cloud Run
    /// service (defaults to "bioindex")
    #[serde(default = "default_service_name")]
    pub name: String,
    /// GCP project ID
    pub gcp_project_id: Option<String>,
    /// GCP region (defaults to us-central1)
    #[serde(default = "default_region")]
    pub region: String,
    /// Container registry host (defaults to gcr.io)
    #[serde(default = "default_registry")]
    pub registry: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Base runtime image; must carry an exact version tag
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// CPU architecture the image is built for
    #[serde(default = "default_platform")]
    pub platform: String,
    /// System packages installed via apt-get for native extension builds
    #[serde(default = "default_system_packages")]
    pub system_packages: Vec<String>,
    /// Dependency manifest file
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// ASGI application path, `module:attribute`
    #[serde(default = "default_app_module")]
    pub app_module: String,
    /// gunicorn worker count
    #[serde(default = "default_workers")]
    pub workers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Port the container listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Cloud SQL instances bound to the service, each a fully qualified
    /// `project:region:instance` identifier
    #[serde(default)]
    pub cloudsql_instances: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            gcp_project_id: None,
            region: default_region(),
            registry: default_registry(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_image: default_base_image(),
            platform: default_platform(),
            system_packages: default_system_packages(),
            manifest: default_manifest(),
            app_module: default_app_module(),
            workers: default_workers(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cloudsql_instances: Vec::new(),
        }
    }
}

impl BiodeployConfig {
    /// Load from biodeploy.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join("biodeploy.toml");
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

impl BuildConfig {
    /// Reject floating base image tags. The build must be reproducible,
    /// so `latest` or a missing tag is a configuration error.
    pub fn validate(&self) -> crate::Result<()> {
        let tag = match self.base_image.rsplit_once(':') {
            Some((_, tag)) if !tag.is_empty() => tag,
            _ => {
                return Err(crate::Error::UnpinnedBaseImage {
                    image: self.base_image.clone(),
                    reason: "no tag — pin an exact version like python:3.8.12-slim-bullseye",
                });
            }
        };

        if tag == "latest" {
            return Err(crate::Error::UnpinnedBaseImage {
                image: self.base_image.clone(),
                reason: "'latest' floats — pin an exact version",
            });
        }

        Ok(())
    }
}

/// Fully resolved deploy parameters. Every field is mandatory; resolution
/// fails rather than defaulting a missing value, so no external call is
/// ever issued with an empty parameter.
#[derive(Debug, Clone)]
pub struct DeployParams {
    pub service_name: String,
    pub project_id: String,
    pub region: String,
    pub registry: String,
    pub port: u16,
    pub cloudsql_instances: Vec<String>,
}

impl DeployParams {
    /// Validate the config and resolve it into deploy parameters.
    ///
    /// `env_project_id` is the `GOOGLE_CLOUD_PROJECT` fallback, consulted
    /// when `[project].gcp_project_id` is absent from biodeploy.toml.
    pub fn resolve(
        config: &BiodeployConfig,
        env_project_id: Option<String>,
    ) -> crate::Result<Self> {
        config.build.validate()?;

        let project_id = config
            .project
            .gcp_project_id
            .clone()
            .or(env_project_id)
            .ok_or(crate::Error::MissingField {
                field: "project.gcp_project_id",
                hint: "set it in biodeploy.toml or export GOOGLE_CLOUD_PROJECT",
            })?;

        if config.service.cloudsql_instances.is_empty() {
            return Err(crate::Error::NoDatabaseBinding);
        }

        Ok(Self {
            service_name: config.project.name.clone(),
            project_id,
            region: config.project.region.clone(),
            registry: config.project.registry.clone(),
            port: config.service.port,
            cloudsql_instances: config.service.cloudsql_instances.clone(),
        })
    }
}

fn default_service_name() -> String {
    "bioindex".to_owned()
}

fn default_region() -> String {
    "us-central1".to_owned()
}

fn default_registry() -> String {
    "gcr.io".to_owned()
}

fn default_base_image() -> String {
    "python:3.8.12-slim-bullseye".to_owned()
}

fn default_platform() -> String {
    "linux/amd64".to_owned()
}

fn default_system_packages() -> Vec<String> {
    vec![
        "build-essential".to_owned(),
        "default-libmysqlclient-dev".to_owned(),
    ]
}

fn default_manifest() -> String {
    "requirements.txt".to_owned()
}

fn default_app_module() -> String {
    "server:app".to_owned()
}

fn default_workers() -> u32 {
    4
}

fn default_port() -> u16 {
    5000
}
