use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // Required fields are checked before any external call is made, so a
    // deploy can never go out with an empty parameter.
    #[error("required field {field} is not set — {hint}")]
    MissingField {
        field: &'static str,
        hint: &'static str,
    },

    #[error(
        "service.cloudsql_instances is empty — deploy requires at least one \
         Cloud SQL instance binding (project:region:instance)"
    )]
    NoDatabaseBinding,

    #[error("base image '{image}' is not version-pinned: {reason}")]
    UnpinnedBaseImage { image: String, reason: &'static str },
}
