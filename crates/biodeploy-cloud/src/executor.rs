/// Abstraction over external CLI execution (docker, gcloud) for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command and capture stdout.
    async fn run(&self, program: &str, args: &[String]) -> Result<String, ExecError>;

    /// Execute a command, streaming output to the terminal.
    async fn run_streaming(&self, program: &str, args: &[String]) -> Result<(), ExecError>;
}

/// Real CLI executor. Echoes every command (program + full argument list)
/// before it runs, so a failed pipeline can be audited from the log.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, ExecError> {
        use std::process::Stdio;

        tracing::info!("+ {}", render_command(program, args));

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExecError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 {
                program: program.to_owned(),
                source: e,
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: output.status.code(),
                stderr,
            })
        }
    }

    async fn run_streaming(&self, program: &str, args: &[String]) -> Result<(), ExecError> {
        use std::process::Stdio;

        tracing::info!("+ {}", render_command(program, args));

        let status = tokio::process::Command::new(program)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            // Diagnostics already went to the terminal via the inherited
            // stderr; the error only needs to carry the exit status.
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

/// Render a command line the way a shell trace would, quoting arguments
/// that contain whitespace so the audit line can be re-run as printed.
fn render_command(program: &str, args: &[String]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.chars().any(char::is_whitespace) {
            line.push('\'');
            line.push_str(arg);
            line.push('\'');
        } else {
            line.push_str(arg);
        }
    }
    line
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{program} CLI not found — is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("command failed with exit code {code:?}: {program} {args:?}\n{stderr}")]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },
}

impl ExecError {
    /// Exit code of the failed command, when the process ran and exited.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}
