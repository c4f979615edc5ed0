//! Drives Vivado in batch mode: writes the HDL, constraint file and build script of a
//! design into a build directory and runs the toolchain on them.

use std::fmt;
use std::fs::{self, create_dir_all};
use std::io;
use std::path::{self, PathBuf};
use std::process::{ExitStatus, Stdio};

use fpgaflow_platform::{ConstraintError, Design, Language, Source};
use fpgaflow_toolchain::{Toolchain, ToolchainError};
use indexmap::IndexSet;
use log::{debug, info};

pub mod launcher;
pub mod tcl;
pub mod xdc;

use launcher::{Launcher, LauncherKind};

#[derive(Debug)]
pub enum BuildError {
    Io(io::Error),
    Constraint(ConstraintError),
    Toolchain(ToolchainError),
    ToolFailed { tool: String, status: ExitStatus },
}

impl From<io::Error> for BuildError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ConstraintError> for BuildError {
    fn from(value: ConstraintError) -> Self {
        Self::Constraint(value)
    }
}

impl From<ToolchainError> for BuildError {
    fn from(value: ToolchainError) -> Self {
        Self::Toolchain(value)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Io(error) => write!(f, "{error}"),
            BuildError::Constraint(error) => write!(f, "{error}"),
            BuildError::Toolchain(error) => write!(f, "{error}"),
            BuildError::ToolFailed { tool, status } => {
                write!(f, "non-zero {tool} status: {status}")
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io(error) => Some(error),
            BuildError::Constraint(error) => Some(error),
            BuildError::Toolchain(error) => Some(error),
            BuildError::ToolFailed { .. } => None,
        }
    }
}

/// Where and under which name to build, and with what installation.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub build_dir: PathBuf,
    pub build_name: String,
    pub toolchain: Toolchain,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            build_name: "top".to_string(),
            toolchain: Toolchain::default(),
        }
    }
}

impl BuildRequest {
    pub fn path(&self, ext: &str) -> PathBuf {
        self.build_dir.join(format!("{}.{ext}", self.build_name))
    }
}

/// Batch flow settings.
///
/// Extra commands may use the `{build_name}` placeholder. Nothing else is substituted:
/// `{{` and `}}` stay doubled, so write plain Tcl braces.
#[derive(Debug, Clone, Default)]
pub struct VivadoToolchain {
    /// Run after the constraint file is read, before synthesis. Only `{build_name}` is
    /// substituted.
    pub pre_synthesis_commands: Vec<String>,
    /// Run right before the bitstream is written. Only `{build_name}` is substituted.
    pub bitstream_commands: Vec<String>,
    /// Run after the bitstream is written. Only `{build_name}` is substituted.
    pub additional_commands: Vec<String>,
    pub with_phys_opt: bool,
    pub launcher: Option<LauncherKind>,
}

impl VivadoToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit choice if any, a batch file under wine, else the host's flavor.
    pub fn launcher_kind(&self, tc: &Toolchain) -> LauncherKind {
        match self.launcher {
            Some(kind) => kind,
            None if tc.use_wine => LauncherKind::Windows,
            None => LauncherKind::host(),
        }
    }

    /// Writes `NAME.v`, `NAME.tcl` and `NAME.xdc` into the build directory and, when
    /// `run` is set, runs Vivado on them. Returns the path of the bitstream.
    ///
    /// Artifacts written before a failure are left in place.
    pub fn build(
        &self,
        design: &mut Design<'_>,
        req: &BuildRequest,
        run: bool,
    ) -> Result<PathBuf, BuildError> {
        let name = &req.build_name;
        create_dir_all(&req.build_dir)?;
        design.finalize();
        let signals = design.resolve_signals()?;

        fs::write(req.path("v"), design.verilog())?;

        // The toolchain runs inside the build directory.
        let mut sources = IndexSet::new();
        for source in design.sources() {
            sources.insert(Source {
                path: path::absolute(&source.path)?,
                language: source.language,
            });
        }
        sources.insert(Source {
            path: PathBuf::from(format!("{name}.v")),
            language: Language::Verilog,
        });
        let sources: Vec<_> = sources.into_iter().collect();
        let include_dirs = design
            .include_dirs()
            .iter()
            .map(path::absolute)
            .collect::<io::Result<Vec<_>>>()?;
        let script = tcl::build_script(
            self,
            &sources,
            design.board().device(),
            design.top(),
            &include_dirs,
            name,
        );
        fs::write(req.path("tcl"), script)?;

        let constraints = xdc::build_xdc(
            &signals,
            design.timing_constraints(),
            design.platform_commands(),
        );
        fs::write(req.path("xdc"), constraints)?;
        debug!("wrote {} sources into {}", sources.len(), req.build_dir.display());

        if run {
            self.run(req)?;
        }
        Ok(req.path("bit"))
    }

    fn run(&self, req: &BuildRequest) -> Result<(), BuildError> {
        let tc = &req.toolchain;
        let kind = self.launcher_kind(tc);
        let settings = if tc.source_settings && kind == LauncherKind::Posix {
            Some(tc.settings()?)
        } else {
            None
        };
        let launcher = Launcher::new(kind, &req.build_name, settings.as_deref());
        launcher.write(&req.build_dir)?;
        let mut cmd = launcher.command(tc);
        cmd.current_dir(&req.build_dir);
        cmd.stdin(Stdio::null());
        info!("running vivado in {}", req.build_dir.display());
        let status = cmd.status()?;
        if !status.success() {
            return Err(BuildError::ToolFailed {
                tool: "vivado".to_string(),
                status,
            });
        }
        Ok(())
    }
}
