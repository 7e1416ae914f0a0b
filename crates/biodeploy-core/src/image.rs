use std::fmt;

/// A `(registry, repository, tag)` name for a container image.
///
/// An image starts life with a local-only name (`registry` is `None`),
/// is qualified exactly once with a registry host and project path, and
/// is never renamed after that. Uniqueness and collision handling are
/// the registry's problem, not ours — this is just a string identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Registry host, e.g. `gcr.io`. `None` while the image only has
    /// its local build name.
    pub registry: Option<String>,
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// Local build name, e.g. `bioindex:latest`.
    pub fn local(repository: &str, tag: &str) -> Self {
        Self {
            registry: None,
            repository: repository.to_owned(),
            tag: tag.to_owned(),
        }
    }

    /// Registry-qualified name for the same image content:
    /// `<registry>/<project_id>/<repository>:<tag>`.
    pub fn qualify(&self, registry: &str, project_id: &str) -> Self {
        Self {
            registry: Some(registry.to_owned()),
            repository: format!("{project_id}/{repo}", repo = self.repository),
            tag: self.tag.clone(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.registry.is_some()
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.registry {
            Some(registry) => write!(
                f,
                "{registry}/{repo}:{tag}",
                repo = self.repository,
                tag = self.tag
            ),
            None => write!(f, "{repo}:{tag}", repo = self.repository, tag = self.tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_name_has_no_registry() {
        let image = ImageReference::local("bioindex", "latest");
        assert!(!image.is_qualified());
        assert_eq!(image.to_string(), "bioindex:latest");
    }

    #[test]
    fn qualify_prefixes_registry_and_project() {
        let local = ImageReference::local("bioindex", "latest");
        let remote = local.qualify("gcr.io", "my-project");

        assert!(remote.is_qualified());
        assert_eq!(remote.to_string(), "gcr.io/my-project/bioindex:latest");
        // Same content, new name: the local reference is untouched.
        assert_eq!(local.to_string(), "bioindex:latest");
    }

    #[test]
    fn qualify_preserves_tag() {
        let local = ImageReference::local("bioindex", "r42");
        let remote = local.qualify("gcr.io", "proj");
        assert_eq!(remote.tag, "r42");
    }
}
