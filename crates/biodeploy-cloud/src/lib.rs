//! docker and gcloud operations for biodeploy.
//!
//! [`release`] runs the build → tag → push → deploy sequence against a
//! [`DockerClient`] and a [`GcloudClient`]; both are generic over
//! [`CommandExecutor`] so tests can substitute mocks for the real CLIs.

pub mod docker;
pub mod executor;
pub mod gcloud;
pub mod release;

pub use docker::{DockerClient, DockerError};
pub use executor::{CommandExecutor, ExecError, RealExecutor};
pub use gcloud::{
    ApiCheck, CheckResult, DeployError, DoctorReport, GcloudClient, PreflightError,
    PreflightReport,
};
pub use release::{ReleaseError, ReleasePlan, release};
