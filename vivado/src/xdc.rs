//! XDC constraint files.

use std::fmt;
use std::sync::LazyLock;

use fpgaflow_platform::{Constraint, ResolvedSignal, ResourceName, TimingConstraint};
use regex::Regex;

static RE_LOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*set_property\s+(?:LOC|PACKAGE_PIN)\s+(\S+)\s+\[get_ports\s+\{?(\S+?)\}?\s*\]\s*$")
        .unwrap()
});

/// Formats a clock period the way the constraint file expects, `20.0` rather than `20`.
pub fn format_period(period_ns: f64) -> String {
    if period_ns.fract() == 0.0 {
        format!("{period_ns:.1}")
    } else {
        format!("{period_ns}")
    }
}

fn format_constraint(c: &Constraint) -> Option<String> {
    match c {
        Constraint::Pins(pins) => pins.first().map(|pin| format!("set_property LOC {pin}")),
        Constraint::IoStandard(name) => Some(format!("set_property IOSTANDARD {name}")),
        Constraint::Drive(strength) => Some(format!("set_property DRIVE {strength}")),
        Constraint::Misc(misc) => Some(if misc.contains('=') {
            format!("set_property {}", misc.replace('=', " "))
        } else {
            format!("set_property {misc} TRUE")
        }),
    }
}

fn format_timing(tc: &TimingConstraint) -> String {
    match tc {
        TimingConstraint::ClockPeriod { port, period_ns } => format!(
            "create_clock -name {port} -period {} [get_ports {port}]",
            format_period(*period_ns)
        ),
    }
}

struct Block<'a> {
    port: &'a str,
    resource: ResourceName,
    loc: Option<&'a str>,
    constraints: &'a [Constraint],
}

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " ## {}", self.resource)?;
        if let Some(pin) = self.loc {
            writeln!(f, "set_property LOC {pin} [get_ports {}]", self.port)?;
        }
        for c in self.constraints {
            if let Some(line) = format_constraint(c) {
                writeln!(f, "{line} [get_ports {}]", self.port)?;
            }
        }
        Ok(())
    }
}

/// A complete constraint file: pin blocks, then timing constraints and raw commands.
pub struct Xdc<'a> {
    pub signals: &'a [ResolvedSignal],
    pub timing: &'a [TimingConstraint],
    pub commands: &'a [String],
}

impl fmt::Display for Xdc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sig in self.signals {
            if sig.pins.len() > 1 {
                for (i, pin) in sig.pins.iter().enumerate() {
                    let port = format!("{}[{i}]", sig.port);
                    write!(
                        f,
                        "{}",
                        Block {
                            port: &port,
                            resource: sig.resource,
                            loc: Some(pin.as_str()),
                            constraints: &sig.constraints,
                        }
                    )?;
                }
            } else {
                write!(
                    f,
                    "{}",
                    Block {
                        port: &sig.port,
                        resource: sig.resource,
                        loc: sig.pins.first().map(String::as_str),
                        constraints: &sig.constraints,
                    }
                )?;
            }
        }
        let extra: Vec<String> = self
            .timing
            .iter()
            .map(format_timing)
            .chain(self.commands.iter().cloned())
            .collect();
        if !extra.is_empty() {
            write!(f, "\n{}", extra.join("\n\n"))?;
        }
        Ok(())
    }
}

pub fn build_xdc(
    signals: &[ResolvedSignal],
    timing: &[TimingConstraint],
    commands: &[String],
) -> String {
    Xdc {
        signals,
        timing,
        commands,
    }
    .to_string()
}

/// Extracts `(port, pin)` pairs from the location lines of a constraint file.
pub fn parse_locations(xdc: &str) -> Vec<(String, String)> {
    xdc.lines()
        .filter_map(|line| RE_LOC.captures(line))
        .map(|cap| (cap[2].to_string(), cap[1].to_string()))
        .collect()
}
