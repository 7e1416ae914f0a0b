mod build;
mod deploy;
mod doctor;

/// Tag assigned when the operator does not mint one with `--tag`.
pub(crate) const DEFAULT_TAG: &str = "latest";

pub use build::build;
pub use deploy::deploy;
pub use doctor::doctor;
