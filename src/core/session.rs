use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::config::TmuxConfig;
use super::error::LaunchError;

/// Environment variable tmux sets inside a session
pub const TMUX_ENV: &str = "TMUX";

// tmux server options that take a separate value
const TMUX_VALUE_FLAGS: &[&str] = &["-L", "-S", "-f", "-c", "-T"];

/// Operations on the terminal multiplexer needed to open a project session
pub trait SessionGateway {
    /// Whether a session with exactly this name exists. Any failure of the
    /// query counts as "does not exist".
    fn session_exists(&self, session: &str) -> bool;

    /// Run a layout script that builds the session
    fn create_session(
        &self,
        layout_path: &Path,
        project_path: &Path,
        session: &str,
        project_name: &str,
    ) -> Result<(), LaunchError>;

    /// Hand the terminal over to the session. Only returns on failure.
    fn attach(&self, session: &str) -> Result<Infallible, LaunchError>;
}

/// [`SessionGateway`] backed by the `tmux` binary
#[derive(Debug, Clone)]
pub struct TmuxGateway {
    program: PathBuf,
    /// Server options such as `-L <socket>`, passed to every tmux call
    global_args: Vec<String>,
    attach_args: Vec<String>,
    inside_tmux: bool,
}

impl TmuxGateway {
    pub fn from_config(config: &TmuxConfig) -> anyhow::Result<Self> {
        let mut words = shell_words::split(&config.attach_command)?.into_iter();
        let program = words
            .next()
            .ok_or_else(|| anyhow::anyhow!("tmux.attach_command is empty"))?;

        let attach_args: Vec<String> = words.collect();

        Ok(Self {
            program: PathBuf::from(program),
            global_args: leading_options(&attach_args),
            attach_args,
            inside_tmux: std::env::var_os(TMUX_ENV).is_some_and(|v| !v.is_empty()),
        })
    }

    /// Program and arguments used for the handoff
    pub fn attach_command(&self, session: &str) -> (PathBuf, Vec<String>) {
        let args = if self.inside_tmux {
            let mut args = self.global_args.clone();
            args.extend(["switch-client".to_string(), "-t".to_string(), session.to_string()]);
            args
        } else {
            let mut args = self.attach_args.clone();
            args.push(session.to_string());
            args
        };
        (self.program.clone(), args)
    }
}

/// Options that precede the tmux subcommand
fn leading_options(args: &[String]) -> Vec<String> {
    let mut options = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if !arg.starts_with('-') {
            break;
        }
        options.push(arg.clone());
        if TMUX_VALUE_FLAGS.contains(&arg.as_str()) {
            if let Some(value) = iter.next() {
                options.push(value.clone());
            }
        }
    }
    options
}

impl SessionGateway for TmuxGateway {
    fn session_exists(&self, session: &str) -> bool {
        // `=` disables tmux's prefix matching of session names
        let status = Command::new(&self.program)
            .args(&self.global_args)
            .args(["has-session", "-t", &format!("={}", session)])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!("has-session for {} failed to run: {}", session, e);
                false
            }
        }
    }

    fn create_session(
        &self,
        layout_path: &Path,
        project_path: &Path,
        session: &str,
        project_name: &str,
    ) -> Result<(), LaunchError> {
        tracing::info!(
            "Creating session {} with {}",
            session,
            layout_path.display()
        );

        let failed = |reason: String| LaunchError::SessionCreateFailed {
            session: session.to_string(),
            reason,
        };

        let status = Command::new(layout_path)
            .arg(project_path)
            .arg(session)
            .arg(project_name)
            .current_dir(project_path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| failed(format!("could not run {}: {}", layout_path.display(), e)))?;

        if !status.success() {
            return Err(failed(format!(
                "{} exited with {}",
                layout_path.display(),
                status
            )));
        }
        Ok(())
    }

    #[cfg(unix)]
    fn attach(&self, session: &str) -> Result<Infallible, LaunchError> {
        use std::os::unix::process::CommandExt;

        let failed = |reason: String| LaunchError::AttachFailed {
            session: session.to_string(),
            reason,
        };

        let program = which::which(&self.program).map_err(|e| {
            failed(format!("{} not found: {}", self.program.display(), e))
        })?;
        let (_, args) = self.attach_command(session);
        tracing::info!("Handing off to {} {:?}", program.display(), args);

        // exec only returns if the process image could not be replaced
        let err = Command::new(program).args(&args).exec();
        Err(failed(err.to_string()))
    }

    #[cfg(not(unix))]
    fn attach(&self, session: &str) -> Result<Infallible, LaunchError> {
        Err(LaunchError::AttachFailed {
            session: session.to_string(),
            reason: "process handoff is only supported on unix".to_string(),
        })
    }
}
