//! Loading bitstreams into boards and writing their configuration flash.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use fpgaflow_toolchain::Toolchain;
use log::info;

mod xc3sprog;

pub use xc3sprog::Xc3sProg;

#[derive(Debug)]
pub enum ProgrammerError {
    Io(io::Error),
    FlashProxyNotFound(String),
    ToolFailed { tool: String, status: ExitStatus },
}

impl From<io::Error> for ProgrammerError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl fmt::Display for ProgrammerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgrammerError::Io(error) => write!(f, "{error}"),
            ProgrammerError::FlashProxyNotFound(name) if name.is_empty() => {
                write!(f, "no flash proxy bitstream configured")
            }
            ProgrammerError::FlashProxyNotFound(name) => {
                write!(f, "failed to find flash proxy bitstream {name}")
            }
            ProgrammerError::ToolFailed { tool, status } => {
                write!(f, "non-zero {tool} status: {status}")
            }
        }
    }
}

impl std::error::Error for ProgrammerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProgrammerError::Io(error) => Some(error),
            _ => None,
        }
    }
}

/// An external tool that talks to the board's configuration interface.
pub trait Programmer {
    /// Name of the external binary.
    fn tool(&self) -> &str;

    /// Configures the FPGA directly, volatile.
    fn load_bitstream(&self, tc: &Toolchain, bitstream: &Path) -> Result<(), ProgrammerError>;

    /// Writes `data` into the configuration flash at `address`.
    fn flash(&self, tc: &Toolchain, address: u32, data: &Path) -> Result<(), ProgrammerError>;
}

/// Directories searched for flash proxy bitstreams, most specific first.
pub fn default_proxy_dirs() -> Vec<PathBuf> {
    let mut res = vec![];
    if let Some(home) = std::env::var_os("HOME") {
        res.push(PathBuf::from(home).join(".fpgaflow"));
    }
    res.push(PathBuf::from("/usr/local/share/fpgaflow"));
    res.push(PathBuf::from("/usr/share/fpgaflow"));
    res
}

/// Empty `name` never matches.
pub fn find_flash_proxy(dirs: &[PathBuf], name: &str) -> Result<PathBuf, ProgrammerError> {
    if name.is_empty() {
        return Err(ProgrammerError::FlashProxyNotFound(String::new()));
    }
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
        .ok_or_else(|| ProgrammerError::FlashProxyNotFound(name.to_string()))
}

fn run(mut cmd: Command, tool: &str) -> Result<(), ProgrammerError> {
    cmd.stdin(Stdio::null());
    info!("running {tool}");
    let status = cmd.status()?;
    if !status.success() {
        return Err(ProgrammerError::ToolFailed {
            tool: tool.to_string(),
            status,
        });
    }
    Ok(())
}
