use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::info;

use crate::domain::SearchProgram;
use crate::error::BgcError;

/// Tabular hit output.
pub const OUTPUT_FORMAT: &str = "6";
pub const EVALUE_THRESHOLD: &str = "1e-5";
pub const THREADS: u32 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: PathBuf,
    pub database: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub program: String,
    pub version: Option<String>,
    pub output: String,
    pub finished_at: String,
}

pub trait SearchRunner {
    fn run(&self, request: &SearchRequest) -> Result<SearchOutcome, BgcError>;
}

/// Runs the search tool found on `PATH` (or at an explicit location) once,
/// blocking until it exits. A non-zero exit is fatal; the hit file is not
/// read back.
#[derive(Debug, Clone)]
pub struct SystemSearchRunner {
    program: SearchProgram,
    executable: Option<PathBuf>,
}

impl SystemSearchRunner {
    pub fn new(program: SearchProgram) -> Self {
        Self {
            program,
            executable: locate_on_path(program),
        }
    }

    pub fn with_executable(program: SearchProgram, executable: PathBuf) -> Self {
        Self {
            program,
            executable: Some(executable),
        }
    }

    pub fn program(&self) -> SearchProgram {
        self.program
    }

    /// First line of `<tool> -version`, e.g. `blastn: 2.15.0+`.
    pub fn tool_version(&self) -> Option<String> {
        let executable = self.executable.as_ref()?;
        let output = Command::new(executable).arg("-version").output().ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).into_owned())?
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }

    pub fn build_args(request: &SearchRequest) -> Vec<String> {
        vec![
            "-query".to_string(),
            request.query.to_string_lossy().to_string(),
            "-db".to_string(),
            request.database.to_string_lossy().to_string(),
            "-out".to_string(),
            request.output.to_string_lossy().to_string(),
            "-outfmt".to_string(),
            OUTPUT_FORMAT.to_string(),
            "-evalue".to_string(),
            EVALUE_THRESHOLD.to_string(),
            "-num_threads".to_string(),
            THREADS.to_string(),
        ]
    }

    fn require_executable(&self) -> Result<&PathBuf, BgcError> {
        self.executable
            .as_ref()
            .ok_or_else(|| BgcError::MissingTool(self.program.executable_name().to_string()))
    }

    /// Blocks until the tool exits; there is no timeout.
    fn invoke(&self, executable: &Path, args: &[String]) -> Result<(), BgcError> {
        let output = match Command::new(executable).args(args).output() {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(BgcError::MissingTool(executable.display().to_string()));
            }
            Err(err) => {
                return Err(BgcError::SearchFailed {
                    status: -1,
                    message: format!("{} could not be started: {err}", self.program),
                });
            }
        };
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("{} reported no error text", self.program),
            text => text.to_string(),
        };
        Err(BgcError::SearchFailed {
            // Killed by a signal: no exit code.
            status: output.status.code().unwrap_or(-1),
            message,
        })
    }
}

impl SearchRunner for SystemSearchRunner {
    fn run(&self, request: &SearchRequest) -> Result<SearchOutcome, BgcError> {
        let executable = self.require_executable()?;
        let args = Self::build_args(request);
        info!("running {} {}", executable.display(), args.join(" "));
        self.invoke(executable, &args)?;
        info!(
            "search completed, results saved to {}",
            request.output.display()
        );
        Ok(SearchOutcome {
            program: self.program.to_string(),
            version: self.tool_version(),
            output: request.output.display().to_string(),
            finished_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// First `PATH` directory holding the program's executable.
fn locate_on_path(program: SearchProgram) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program.executable_name()))
        .find(|candidate| candidate.is_file())
}
