use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::ConstraintError;
use crate::board::{Board, ResolvedSignal, resolve_resource};
use crate::constraint::{IoDef, IoItem, split_pins};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Verilog,
    SystemVerilog,
    Vhdl,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub path: PathBuf,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimingConstraint {
    ClockPeriod { port: String, period_ns: f64 },
}

/// A board resource claimed by the design and the top-level port carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub resource: &'static IoDef,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub width: usize,
}

fn pin_count<'a>(mut items: impl Iterator<Item = &'a IoItem>) -> usize {
    items
        .find_map(|item| match *item {
            IoItem::Pins(pins) => Some(split_pins(pins).len()),
            _ => None,
        })
        .unwrap_or(1)
}

impl Request {
    /// Top-level ports the HDL must declare for this request.
    pub fn ports(&self) -> Vec<Port> {
        let def = self.resource;
        if def.has_subsignals() {
            def.subsignals()
                .map(|(sub, items)| Port {
                    name: format!("{}_{sub}", self.port),
                    width: pin_count(def.top_items().chain(items)),
                })
                .collect()
        } else {
            vec![Port {
                name: self.port.clone(),
                width: pin_count(def.top_items()),
            }]
        }
    }
}

/// A synthesizable design bound to a board.
///
/// Requests, sources and constraints accumulate until [`Design::finalize`];
/// afterwards the design is read-only.
pub struct Design<'b> {
    board: &'b dyn Board,
    top: String,
    verilog: String,
    sources: IndexSet<Source>,
    include_dirs: Vec<PathBuf>,
    requests: Vec<Request>,
    timing: Vec<TimingConstraint>,
    commands: Vec<String>,
    finalized: bool,
}

impl<'b> Design<'b> {
    pub fn new(board: &'b dyn Board, verilog: impl Into<String>) -> Self {
        Self {
            board,
            top: "top".to_string(),
            verilog: verilog.into(),
            sources: IndexSet::new(),
            include_dirs: vec![],
            requests: vec![],
            timing: vec![],
            commands: vec![],
            finalized: false,
        }
    }

    pub fn with_top(self, top: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            ..self
        }
    }

    pub fn board(&self) -> &'b dyn Board {
        self.board
    }

    pub fn top(&self) -> &str {
        &self.top
    }

    pub fn verilog(&self) -> &str {
        &self.verilog
    }

    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn timing_constraints(&self) -> &[TimingConstraint] {
        &self.timing
    }

    pub fn platform_commands(&self) -> &[String] {
        &self.commands
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn check_open(&self) -> Result<(), ConstraintError> {
        if self.finalized {
            Err(ConstraintError::Finalized)
        } else {
            Ok(())
        }
    }

    pub fn add_source(
        &mut self,
        path: impl AsRef<Path>,
        language: Language,
    ) -> Result<(), ConstraintError> {
        self.check_open()?;
        self.sources.insert(Source {
            path: path.as_ref().to_path_buf(),
            language,
        });
        Ok(())
    }

    pub fn add_include_dir(&mut self, dir: impl AsRef<Path>) -> Result<(), ConstraintError> {
        self.check_open()?;
        let dir = dir.as_ref().to_path_buf();
        if !self.include_dirs.contains(&dir) {
            self.include_dirs.push(dir);
        }
        Ok(())
    }

    fn port_taken(&self, port: &str) -> bool {
        self.requests.iter().any(|req| {
            req.port == port || req.ports().iter().any(|p| p.name == port)
        })
    }

    fn claim(&self, name: &str, number: Option<u32>) -> Result<&'static IoDef, ConstraintError> {
        let mut seen = false;
        for def in self.board.io() {
            if def.name != name || number.is_some_and(|n| def.number != n) {
                continue;
            }
            seen = true;
            if !self.requests.iter().any(|req| std::ptr::eq(req.resource, def)) {
                return Ok(def);
            }
        }
        if seen {
            Err(ConstraintError::ResourceInUse {
                name: name.to_string(),
                number,
            })
        } else {
            Err(ConstraintError::ResourceNotFound {
                name: name.to_string(),
                number,
            })
        }
    }

    /// Claims a resource (the first free one when `number` is `None`) and names its
    /// port after the resource, falling back to `{name}_{number}` on collision.
    pub fn request(&mut self, name: &str, number: Option<u32>) -> Result<&Request, ConstraintError> {
        self.check_open()?;
        let def = self.claim(name, number)?;
        let mut port = def.name.to_string();
        if self.port_taken(&port) {
            port = format!("{}_{}", def.name, def.number);
        }
        self.push_request(def, port)
    }

    /// Claims a resource under an explicit port name.
    pub fn request_as(
        &mut self,
        name: &str,
        number: Option<u32>,
        port: &str,
    ) -> Result<&Request, ConstraintError> {
        self.check_open()?;
        let def = self.claim(name, number)?;
        self.push_request(def, port.to_string())
    }

    fn push_request(&mut self, def: &'static IoDef, port: String) -> Result<&Request, ConstraintError> {
        let req = Request {
            resource: def,
            port,
        };
        for p in req.ports() {
            if self.port_taken(&p.name) {
                return Err(ConstraintError::DuplicatePort(p.name));
            }
        }
        let idx = self.requests.len();
        self.requests.push(req);
        Ok(&self.requests[idx])
    }

    pub fn lookup_request(&self, name: &str, number: Option<u32>) -> Result<&Request, ConstraintError> {
        self.requests
            .iter()
            .find(|req| {
                req.resource.name == name && number.is_none_or(|n| req.resource.number == n)
            })
            .ok_or_else(|| ConstraintError::NotRequested {
                name: name.to_string(),
                number,
            })
    }

    pub fn add_period_constraint(&mut self, port: &str, period_ns: f64) -> Result<(), ConstraintError> {
        self.check_open()?;
        self.timing.push(TimingConstraint::ClockPeriod {
            port: port.to_string(),
            period_ns,
        });
        Ok(())
    }

    /// Raw vendor command appended verbatim to the constraint file.
    pub fn add_platform_command(&mut self, command: impl Into<String>) -> Result<(), ConstraintError> {
        self.check_open()?;
        self.commands.push(command.into());
        Ok(())
    }

    /// Runs the board's finalize hook once and freezes the design.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        let board = self.board;
        board.finalize(self);
        self.finalized = true;
    }

    /// Maps every requested resource to its physical constraints, in request order.
    pub fn resolve_signals(&self) -> Result<Vec<ResolvedSignal>, ConstraintError> {
        let connectors = self.board.connector_manager();
        let mut res = vec![];
        for req in &self.requests {
            res.extend(resolve_resource(req.resource, &req.port, &connectors)?);
        }
        Ok(res)
    }
}
