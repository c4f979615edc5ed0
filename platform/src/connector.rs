use std::collections::HashMap;

use crate::ConstraintError;
use crate::constraint::ConnectorDef;

/// Resolves `CONN:INDEX` pin references against a board's connector table.
#[derive(Debug, Clone, Default)]
pub struct ConnectorManager {
    table: HashMap<&'static str, Vec<&'static str>>,
}

impl ConnectorManager {
    pub fn new(connectors: &[ConnectorDef]) -> Self {
        let mut table = HashMap::new();
        for conn in connectors {
            table.insert(conn.name, conn.pins.split_whitespace().collect());
        }
        Self { table }
    }

    pub fn pins(&self, connector: &str) -> Option<&[&'static str]> {
        self.table.get(connector).map(|pins| &pins[..])
    }

    pub fn resolve(&self, identifier: &str) -> Result<String, ConstraintError> {
        let Some((conn, pin)) = identifier.split_once(':') else {
            return Ok(identifier.to_string());
        };
        let pins = self
            .table
            .get(conn)
            .ok_or_else(|| ConstraintError::ConnectorNotFound(conn.to_string()))?;
        let not_found = || ConstraintError::ConnectorPinNotFound {
            connector: conn.to_string(),
            pin: pin.to_string(),
        };
        let idx: usize = pin.parse().map_err(|_| not_found())?;
        match pins.get(idx) {
            // "None" marks an unpopulated header position.
            Some(&"None") | None => Err(not_found()),
            Some(pin) => Ok(pin.to_string()),
        }
    }

    pub fn resolve_identifiers(&self, identifiers: &[String]) -> Result<Vec<String>, ConstraintError> {
        identifiers.iter().map(|ident| self.resolve(ident)).collect()
    }
}
