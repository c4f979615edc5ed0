//! Shell and batch wrappers that run Vivado on a generated script.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use fpgaflow_toolchain::Toolchain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKind {
    Posix,
    Windows,
}

impl LauncherKind {
    pub fn host() -> Self {
        if cfg!(windows) {
            LauncherKind::Windows
        } else {
            LauncherKind::Posix
        }
    }
}

/// Single-quotes `s` for a POSIX shell.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub kind: LauncherKind,
    pub file_name: String,
    pub contents: String,
}

impl Launcher {
    /// `settings` is sourced before running Vivado; batch files ignore it.
    pub fn new(kind: LauncherKind, build_name: &str, settings: Option<&Path>) -> Self {
        let vivado = format!("vivado -mode batch -source {build_name}.tcl\n");
        match kind {
            LauncherKind::Posix => {
                let mut contents = "# Autogenerated by fpgaflow\nset -e\n".to_string();
                if let Some(settings) = settings {
                    contents += &format!(
                        "source {}\n",
                        shell_quote(&settings.to_string_lossy())
                    );
                }
                contents += &vivado;
                Launcher {
                    kind,
                    file_name: format!("build_{build_name}.sh"),
                    contents,
                }
            }
            LauncherKind::Windows => Launcher {
                kind,
                file_name: format!("build_{build_name}.bat"),
                contents: format!("REM Autogenerated by fpgaflow\n{vivado}"),
            },
        }
    }

    pub fn write(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }

    /// The interpreter invocation, relative to the directory holding the launcher.
    ///
    /// Shell launchers always run on the host shell; batch launchers go through wine
    /// when the toolchain asks for it.
    pub fn command(&self, tc: &Toolchain) -> Command {
        match self.kind {
            LauncherKind::Posix => {
                let mut cmd = tc.native_command("bash");
                cmd.arg(&self.file_name);
                cmd
            }
            LauncherKind::Windows => {
                let mut cmd = tc.command("cmd");
                cmd.arg("/C");
                cmd.arg(&self.file_name);
                cmd
            }
        }
    }
}
