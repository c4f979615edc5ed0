//! Board resource tables and the designs that claim them.
//!
//! A board is a static list of [`IoDef`] resources: named, numbered groups of
//! package pins with their I/O standards and vendor attributes, optionally split
//! into subsignals. A [`Design`] claims resources, binds them to top-level ports
//! and resolves them into [`ResolvedSignal`]s for a toolchain backend to emit.

use std::fmt;

pub mod board;
pub mod connector;
pub mod constraint;
pub mod design;

pub use board::{Board, DefaultClock, ResolvedSignal, ResourceName};
pub use connector::ConnectorManager;
pub use constraint::{Constraint, ConnectorDef, IoDef, IoItem};
pub use design::{Design, Language, Port, Request, Source, TimingConstraint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    ResourceNotFound { name: String, number: Option<u32> },
    ResourceInUse { name: String, number: Option<u32> },
    NotRequested { name: String, number: Option<u32> },
    SubsignalNotFound { resource: String, subsignal: String },
    DuplicatePins(String),
    DuplicatePort(String),
    ConnectorNotFound(String),
    ConnectorPinNotFound { connector: String, pin: String },
    Finalized,
}

struct ResourceKey<'a>(&'a str, Option<u32>);

impl fmt::Display for ResourceKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(number) => write!(f, "{}:{number}", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintError::ResourceNotFound { name, number } => {
                write!(f, "resource not found: {}", ResourceKey(name, *number))
            }
            ConstraintError::ResourceInUse { name, number } => {
                write!(f, "resource already requested: {}", ResourceKey(name, *number))
            }
            ConstraintError::NotRequested { name, number } => {
                write!(f, "resource not requested: {}", ResourceKey(name, *number))
            }
            ConstraintError::SubsignalNotFound {
                resource,
                subsignal,
            } => write!(f, "subsignal not found: {resource}.{subsignal}"),
            ConstraintError::DuplicatePins(resource) => {
                write!(f, "pins declared twice for {resource}")
            }
            ConstraintError::DuplicatePort(port) => write!(f, "port name already used: {port}"),
            ConstraintError::ConnectorNotFound(conn) => write!(f, "connector not found: {conn}"),
            ConstraintError::ConnectorPinNotFound { connector, pin } => {
                write!(f, "connector pin not found: {connector}:{pin}")
            }
            ConstraintError::Finalized => write!(f, "design already finalized"),
        }
    }
}

impl std::error::Error for ConstraintError {}
