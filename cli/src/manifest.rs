use std::error::Error;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use fpgaflow_platform::{Board, Design, Language};
use serde::Deserialize;
use simple_error::bail;

fn default_top() -> String {
    "top".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestEntry {
    pub resource: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub port: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodEntry {
    pub port: String,
    pub ns: f64,
}

/// A design described in TOML. Relative paths are taken from the manifest's directory.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default = "default_top")]
    pub top: String,
    pub verilog: PathBuf,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub request: Vec<RequestEntry>,
    #[serde(default)]
    pub period: Vec<PeriodEntry>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(skip)]
    pub base: PathBuf,
}

pub fn language(path: &Path) -> Result<Language, Box<dyn Error>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("v") => Ok(Language::Verilog),
        Some("sv") => Ok(Language::SystemVerilog),
        Some("vhd" | "vhdl") => Ok(Language::Vhdl),
        _ => bail!("unknown source language: {}", path.display()),
    }
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let mut res: Manifest = toml::from_str(&read_to_string(path)?)?;
        res.base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(res)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base.join(path)
    }

    pub fn design<'b>(&self, board: &'b dyn Board) -> Result<Design<'b>, Box<dyn Error>> {
        let verilog = read_to_string(self.resolve(&self.verilog))?;
        let mut design = Design::new(board, verilog).with_top(&self.top);
        for source in &self.sources {
            design.add_source(self.resolve(source), language(source)?)?;
        }
        for dir in &self.include_dirs {
            design.add_include_dir(self.resolve(dir))?;
        }
        for req in &self.request {
            match req.port {
                Some(ref port) => design.request_as(&req.resource, req.number, port)?,
                None => design.request(&req.resource, req.number)?,
            };
        }
        for period in &self.period {
            design.add_period_constraint(&period.port, period.ns)?;
        }
        for command in &self.commands {
            design.add_platform_command(command.clone())?;
        }
        Ok(design)
    }
}
