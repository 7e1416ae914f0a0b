use biodeploy_core::BuildConfig;

/// Renders the image recipe for the served application.
///
/// The recipe is deliberately rigid: an exact base version pinned to one
/// CPU architecture, system packages for native extension builds, a
/// cache-bypassed dependency install, and a fixed copy order (manifest
/// before source) so repeated builds that only touch source reuse the
/// dependency layer.
pub struct DockerfileGenerator<'a> {
    config: &'a BuildConfig,
    port: u16,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(config: &'a BuildConfig, port: u16) -> Self {
        Self { config, port }
    }

    pub fn render(&self) -> String {
        let system_packages = if self.config.system_packages.is_empty() {
            String::new()
        } else {
            format!(
                "RUN apt-get update && apt-get install -y {} && rm -rf /var/lib/apt/lists/*\n\n",
                self.config.system_packages.join(" ")
            )
        };

        format!(
            r#"# === Runtime: exact version, exact architecture ===
FROM --platform={platform} {base}

WORKDIR /app

{system_packages}# === Dependencies: manifest first, fresh resolution every build ===
COPY {manifest} .
RUN pip install --no-cache-dir -r {manifest}

# === Application source ===
COPY . .

EXPOSE {port}
CMD ["gunicorn", "-w", "{workers}", "-k", "uvicorn.workers.UvicornWorker", "-b", "0.0.0.0:{port}", "--timeout", "0", "{app_module}"]
"#,
            platform = self.config.platform,
            base = self.config.base_image,
            system_packages = system_packages,
            manifest = self.config.manifest,
            port = self.port,
            workers = self.config.workers,
            app_module = self.config.app_module,
        )
    }
}
