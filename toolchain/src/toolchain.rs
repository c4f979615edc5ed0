use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::{read_dir, read_to_string};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use which::which_in;

fn default_vivado_path() -> PathBuf {
    PathBuf::from("/opt/Xilinx/Vivado")
}

fn default_true() -> bool {
    true
}

/// Where the vendor tools live and how to run them.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Toolchain {
    /// Installation root holding one directory per version.
    #[serde(default = "default_vivado_path")]
    pub vivado_path: PathBuf,
    /// Version directory to use; the highest installed one when absent.
    #[serde(default)]
    pub version: Option<String>,
    /// Source the version's settings script before invoking the tools.
    #[serde(default = "default_true")]
    pub source_settings: bool,
    #[serde(default)]
    pub use_wine: bool,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            vivado_path: default_vivado_path(),
            version: None,
            source_settings: true,
            use_wine: false,
            env: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub enum ToolchainError {
    Io(io::Error),
    Parse(toml::de::Error),
    NoVersions(PathBuf),
    VersionNotFound { path: PathBuf, version: String },
    SettingsNotFound(PathBuf),
}

impl From<io::Error> for ToolchainError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ToolchainError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchainError::Io(error) => write!(f, "{error}"),
            ToolchainError::Parse(error) => write!(f, "invalid toolchain file: {error}"),
            ToolchainError::NoVersions(path) => {
                write!(f, "no toolchain versions found in {}", path.display())
            }
            ToolchainError::VersionNotFound { path, version } => {
                write!(f, "toolchain version {version} not found in {}", path.display())
            }
            ToolchainError::SettingsNotFound(path) => {
                write!(f, "no settings file found in {}", path.display())
            }
        }
    }
}

impl std::error::Error for ToolchainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolchainError::Io(error) => Some(error),
            ToolchainError::Parse(error) => Some(error),
            _ => None,
        }
    }
}

/// Parses a dotted all-numeric version like `2019.1`.
pub fn parse_version(s: &str) -> Option<Vec<u32>> {
    s.split('.').map(|part| part.parse().ok()).collect()
}

/// Installed version directories under `path`, sorted ascending.
pub fn versions(path: &Path) -> io::Result<Vec<(Vec<u32>, String)>> {
    let mut res = vec![];
    let entries = match read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(res),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(ver) = parse_version(&name) {
            res.push((ver, name));
        }
    }
    res.sort();
    Ok(res)
}

impl Toolchain {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ToolchainError> {
        let s = read_to_string(path)?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self, ToolchainError> {
        Ok(toml::from_str(s)?)
    }

    /// Finds the environment settings script of the selected version.
    pub fn settings(&self) -> Result<PathBuf, ToolchainError> {
        let vers = versions(&self.vivado_path)?;
        let dir = match self.version {
            None => match vers.last() {
                Some((_, name)) => name,
                None => return Err(ToolchainError::NoVersions(self.vivado_path.clone())),
            },
            Some(ref version) => {
                let want = parse_version(version);
                match vers.iter().find(|(ver, _)| Some(ver) == want.as_ref()) {
                    Some((_, name)) => name,
                    None => {
                        return Err(ToolchainError::VersionNotFound {
                            path: self.vivado_path.clone(),
                            version: version.clone(),
                        });
                    }
                }
            }
        };
        let full = self.vivado_path.join(dir);
        let mut search = [64, 32];
        if cfg!(target_pointer_width = "32") {
            search.reverse();
        }
        for bits in search {
            let settings = full.join(format!("settings{bits}.sh"));
            if settings.exists() {
                debug!("using settings {}", settings.display());
                return Ok(settings);
            }
        }
        Err(ToolchainError::SettingsNotFound(full))
    }

    /// A vendor tool, wrapped with wine when configured.
    pub fn command(&self, cmd: &str) -> Command {
        if !self.use_wine {
            return self.native_command(cmd);
        }
        let mut res = Command::new("wine");
        res.arg(cmd);
        for (k, v) in self.env.iter() {
            res.env(k, v);
        }
        res
    }

    /// A host program run with the configured environment, never through wine.
    pub fn native_command(&self, cmd: &str) -> Command {
        let mut res = match self.env.get("PATH") {
            Some(path) => match which_in(cmd, Some(path), "/") {
                Ok(rcmd) => Command::new(rcmd),
                Err(_) => Command::new(cmd),
            },
            None => Command::new(cmd),
        };
        for (k, v) in self.env.iter() {
            res.env(k, v);
        }
        res
    }
}
