use std::fmt;

use fpgaflow_programmer::Programmer;
use log::warn;

use crate::ConstraintError;
use crate::connector::ConnectorManager;
use crate::constraint::{Constraint, ConnectorDef, IoDef, IoItem};
use crate::design::{Design, TimingConstraint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultClock {
    pub name: &'static str,
    pub period_ns: f64,
}

/// Identifies where a resolved signal came from, `name:number[.subsignal]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceName {
    pub name: &'static str,
    pub number: u32,
    pub subsignal: Option<&'static str>,
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.number)?;
        if let Some(sub) = self.subsignal {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}

/// A top-level port bound to physical pins and electrical attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSignal {
    pub port: String,
    pub resource: ResourceName,
    pub pins: Vec<String>,
    /// Everything but the pins, resource-wide attributes first.
    pub constraints: Vec<Constraint>,
}

impl ResolvedSignal {
    pub fn width(&self) -> usize {
        self.pins.len().max(1)
    }
}

/// Static description of a development board.
pub trait Board {
    fn name(&self) -> &'static str;
    /// Full vendor part name, e.g. `xc6slx45-csg324-2`.
    fn device(&self) -> &'static str;
    fn identifier(&self) -> u32;
    fn io(&self) -> &'static [IoDef];
    fn connectors(&self) -> &'static [ConnectorDef];
    fn default_clk(&self) -> Option<DefaultClock>;
    fn create_programmer(&self) -> Box<dyn Programmer>;

    /// Called once by [`Design::finalize`] before the design is frozen.
    ///
    /// The default constrains the board's default clock when the design requested
    /// it and nothing constrains it yet. A design without that clock only gets a
    /// warning.
    fn finalize(&self, design: &mut Design<'_>) {
        let Some(clk) = self.default_clk() else {
            return;
        };
        let port = match design.lookup_request(clk.name, None) {
            Ok(req) => req.port.clone(),
            Err(err) => {
                warn!("{}: default clock not constrained: {err}", self.name());
                return;
            }
        };
        let constrained = design.timing_constraints().iter().any(|tc| match tc {
            TimingConstraint::ClockPeriod { port: p, .. } => *p == port,
        });
        if constrained {
            return;
        }
        if let Err(err) = design.add_period_constraint(&port, clk.period_ns) {
            warn!("{}: default clock not constrained: {err}", self.name());
        }
    }

    fn lookup(&self, name: &str, number: Option<u32>) -> Result<&'static IoDef, ConstraintError> {
        self.io()
            .iter()
            .find(|def| def.name == name && number.is_none_or(|n| def.number == n))
            .ok_or_else(|| ConstraintError::ResourceNotFound {
                name: name.to_string(),
                number,
            })
    }

    fn connector_manager(&self) -> ConnectorManager {
        ConnectorManager::new(self.connectors())
    }

    /// Resolves one resource to its constraint sets, with default port names.
    fn resolve(
        &self,
        name: &str,
        number: Option<u32>,
        subsignal: Option<&str>,
    ) -> Result<Vec<ResolvedSignal>, ConstraintError> {
        let def = self.lookup(name, number)?;
        let mut signals = resolve_resource(def, def.name, &self.connector_manager())?;
        if let Some(sub) = subsignal {
            signals.retain(|sig| sig.resource.subsignal == Some(sub));
            if signals.is_empty() {
                return Err(ConstraintError::SubsignalNotFound {
                    resource: format!("{}:{}", def.name, def.number),
                    subsignal: sub.to_string(),
                });
            }
        }
        Ok(signals)
    }
}

fn separate_pins<'a>(
    items: impl Iterator<Item = &'a IoItem>,
    resource: ResourceName,
) -> Result<(Vec<String>, Vec<Constraint>), ConstraintError> {
    let mut pins = None;
    let mut others = vec![];
    for item in items {
        match Constraint::from_item(item) {
            Some(Constraint::Pins(p)) => {
                if pins.is_some() {
                    return Err(ConstraintError::DuplicatePins(resource.to_string()));
                }
                pins = Some(p);
            }
            Some(c) => others.push(c),
            None => (),
        }
    }
    Ok((pins.unwrap_or_default(), others))
}

/// Expands a resource into one resolved signal per subsignal (or one for the
/// whole resource), naming subsignal ports `{port}_{subsignal}`.
pub fn resolve_resource(
    def: &'static IoDef,
    port: &str,
    connectors: &ConnectorManager,
) -> Result<Vec<ResolvedSignal>, ConstraintError> {
    let mut res = vec![];
    if def.has_subsignals() {
        for (sub, items) in def.subsignals() {
            let resource = ResourceName {
                name: def.name,
                number: def.number,
                subsignal: Some(sub),
            };
            let (pins, constraints) = separate_pins(def.top_items().chain(items), resource)?;
            res.push(ResolvedSignal {
                port: format!("{port}_{sub}"),
                resource,
                pins: connectors.resolve_identifiers(&pins)?,
                constraints,
            });
        }
    } else {
        let resource = ResourceName {
            name: def.name,
            number: def.number,
            subsignal: None,
        };
        let (pins, constraints) = separate_pins(def.top_items(), resource)?;
        res.push(ResolvedSignal {
            port: port.to_string(),
            resource,
            pins: connectors.resolve_identifiers(&pins)?,
            constraints,
        });
    }
    Ok(res)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use fpgaflow_programmer::Xc3sProg;

    pub(crate) struct TestBoard;

    const IO: &[IoDef] = &[
        IoDef {
            name: "clk",
            number: 0,
            items: &[IoItem::Pins("H17"), IoItem::IoStandard("LVTTL")],
        },
        IoDef {
            name: "led",
            number: 0,
            items: &[IoItem::Pins("V16"), IoItem::Drive(8)],
        },
        IoDef {
            name: "led",
            number: 1,
            items: &[IoItem::Pins("U16"), IoItem::Drive(8)],
        },
        IoDef {
            name: "serial",
            number: 0,
            items: &[
                IoItem::Subsignal("tx", &[IoItem::Pins("A10"), IoItem::Misc("SLEW=SLOW")]),
                IoItem::Subsignal("rx", &[IoItem::Pins("A11")]),
                IoItem::IoStandard("LVTTL"),
            ],
        },
        IoDef {
            name: "ext",
            number: 0,
            items: &[IoItem::Pins("J:0 J:2 K1"), IoItem::IoStandard("LVCMOS33")],
        },
        IoDef {
            name: "broken",
            number: 0,
            items: &[IoItem::Pins("A1"), IoItem::Pins("A2")],
        },
        IoDef {
            name: "vref",
            number: 0,
            items: &[IoItem::IoStandard("SSTL18_II")],
        },
    ];

    const CONNECTORS: &[ConnectorDef] = &[ConnectorDef {
        name: "J",
        pins: "P1 P2 P3",
    }];

    impl Board for TestBoard {
        fn name(&self) -> &'static str {
            "test"
        }

        fn device(&self) -> &'static str {
            "xc7a35t-csg324-1"
        }

        fn identifier(&self) -> u32 {
            0x1234
        }

        fn io(&self) -> &'static [IoDef] {
            IO
        }

        fn connectors(&self) -> &'static [ConnectorDef] {
            CONNECTORS
        }

        fn default_clk(&self) -> Option<DefaultClock> {
            Some(DefaultClock {
                name: "clk",
                period_ns: 10.0,
            })
        }

        fn create_programmer(&self) -> Box<dyn Programmer> {
            Box::new(Xc3sProg::new("ftdi", None))
        }
    }

    #[test]
    fn test_lookup() {
        let board = TestBoard;
        assert_eq!(board.lookup("led", None).unwrap().number, 0);
        assert_eq!(board.lookup("led", Some(1)).unwrap().items[0], IoItem::Pins("U16"));
        assert_matches!(
            board.lookup("led", Some(2)),
            Err(ConstraintError::ResourceNotFound { name, number: Some(2) }) if name == "led"
        );
        assert_matches!(
            board.lookup("user_btn", None),
            Err(ConstraintError::ResourceNotFound { .. })
        );
    }

    #[test]
    fn test_resolve_subsignals() {
        let sigs = TestBoard.resolve("serial", None, None).unwrap();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].port, "serial_tx");
        assert_eq!(sigs[0].resource.to_string(), "serial:0.tx");
        assert_eq!(sigs[0].pins, ["A10"]);
        assert_eq!(
            sigs[0].constraints,
            [
                Constraint::IoStandard("LVTTL".into()),
                Constraint::Misc("SLEW=SLOW".into())
            ]
        );
        assert_eq!(sigs[1].port, "serial_rx");
        assert_eq!(sigs[1].constraints, [Constraint::IoStandard("LVTTL".into())]);

        let rx = TestBoard.resolve("serial", Some(0), Some("rx")).unwrap();
        assert_eq!(rx.len(), 1);
        assert_eq!(rx[0].pins, ["A11"]);
        assert_matches!(
            TestBoard.resolve("serial", None, Some("cts")),
            Err(ConstraintError::SubsignalNotFound { subsignal, .. }) if subsignal == "cts"
        );
    }

    #[test]
    fn test_resolve_connector_pins() {
        let sigs = TestBoard.resolve("ext", None, None).unwrap();
        assert_eq!(sigs[0].pins, ["P1", "P3", "K1"]);
        assert_eq!(sigs[0].width(), 3);
    }

    #[test]
    fn test_resolve_edge_cases() {
        assert_matches!(
            TestBoard.resolve("broken", None, None),
            Err(ConstraintError::DuplicatePins(r)) if r == "broken:0"
        );
        let vref = TestBoard.resolve("vref", None, None).unwrap();
        assert!(vref[0].pins.is_empty());
        assert_eq!(vref[0].width(), 1);
    }
}
