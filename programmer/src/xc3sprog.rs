use std::path::{Path, PathBuf};
use std::process::Command;

use fpgaflow_toolchain::Toolchain;

use crate::{Programmer, ProgrammerError, default_proxy_dirs, find_flash_proxy, run};

/// JTAG programming through `xc3sprog`.
///
/// Flash writes go through a proxy bitstream that bridges JTAG to the SPI flash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xc3sProg {
    pub cable: String,
    pub flash_proxy: Option<String>,
    /// Device position in the JTAG chain.
    pub position: u32,
    pub proxy_dirs: Vec<PathBuf>,
}

impl Xc3sProg {
    pub fn new(cable: &str, flash_proxy: Option<&str>) -> Self {
        Self {
            cable: cable.to_string(),
            flash_proxy: flash_proxy.map(str::to_string),
            position: 0,
            proxy_dirs: default_proxy_dirs(),
        }
    }

    pub fn with_position(self, position: u32) -> Self {
        Self { position, ..self }
    }

    pub fn with_proxy_dirs(self, proxy_dirs: Vec<PathBuf>) -> Self {
        Self { proxy_dirs, ..self }
    }

    fn base_command(&self, tc: &Toolchain) -> Command {
        let mut cmd = tc.command("xc3sprog");
        cmd.arg("-v");
        cmd.arg("-c");
        cmd.arg(&self.cable);
        cmd.arg("-p");
        cmd.arg(self.position.to_string());
        cmd
    }

    pub fn load_command(&self, tc: &Toolchain, bitstream: &Path) -> Command {
        let mut cmd = self.base_command(tc);
        cmd.arg(bitstream);
        cmd
    }

    pub fn flash_command(
        &self,
        tc: &Toolchain,
        address: u32,
        data: &Path,
    ) -> Result<Command, ProgrammerError> {
        let Some(ref name) = self.flash_proxy else {
            return Err(ProgrammerError::FlashProxyNotFound(String::new()));
        };
        let proxy = find_flash_proxy(&self.proxy_dirs, name)?;
        let mut cmd = self.base_command(tc);
        let mut iarg = std::ffi::OsString::from("-I");
        iarg.push(&proxy);
        cmd.arg(iarg);
        cmd.arg(format!("{}:w:0x{address:x}:BIN", data.display()));
        Ok(cmd)
    }
}

impl Programmer for Xc3sProg {
    fn tool(&self) -> &str {
        "xc3sprog"
    }

    fn load_bitstream(&self, tc: &Toolchain, bitstream: &Path) -> Result<(), ProgrammerError> {
        run(self.load_command(tc, bitstream), self.tool())
    }

    fn flash(&self, tc: &Toolchain, address: u32, data: &Path) -> Result<(), ProgrammerError> {
        run(self.flash_command(tc, address, data)?, self.tool())
    }
}
