use std::fmt;

/// One item of a board resource declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoItem {
    /// Whitespace-separated package pins, or `CONN:INDEX` connector references.
    Pins(&'static str),
    IoStandard(&'static str),
    Drive(u32),
    /// Free-form vendor option, `KEY=VALUE` or bare `KEY`.
    Misc(&'static str),
    Subsignal(&'static str, &'static [IoItem]),
}

/// A board resource: `(name, number)` plus its pins and attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoDef {
    pub name: &'static str,
    pub number: u32,
    pub items: &'static [IoItem],
}

impl IoDef {
    pub fn has_subsignals(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, IoItem::Subsignal(..)))
    }

    pub fn subsignals(&self) -> impl Iterator<Item = (&'static str, &'static [IoItem])> {
        self.items.iter().filter_map(|item| match *item {
            IoItem::Subsignal(name, items) => Some((name, items)),
            _ => None,
        })
    }

    pub fn subsignal(&self, name: &str) -> Option<&'static [IoItem]> {
        self.subsignals()
            .find(|&(sname, _)| sname == name)
            .map(|(_, items)| items)
    }

    /// Items that apply to the whole resource (everything but subsignals).
    pub fn top_items(&self) -> impl Iterator<Item = &'static IoItem> {
        self.items
            .iter()
            .filter(|item| !matches!(item, IoItem::Subsignal(..)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorDef {
    pub name: &'static str,
    pub pins: &'static str,
}

/// A resolved physical or electrical directive for one port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    Pins(Vec<String>),
    IoStandard(String),
    Drive(u32),
    Misc(String),
}

impl Constraint {
    /// Subsignals carry no constraint of their own and map to `None`.
    pub fn from_item(item: &IoItem) -> Option<Self> {
        match *item {
            IoItem::Pins(pins) => Some(Constraint::Pins(split_pins(pins))),
            IoItem::IoStandard(name) => Some(Constraint::IoStandard(name.to_string())),
            IoItem::Drive(strength) => Some(Constraint::Drive(strength)),
            IoItem::Misc(misc) => Some(Constraint::Misc(misc.to_string())),
            IoItem::Subsignal(..) => None,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Pins(pins) => write!(f, "Pins({})", pins.join(" ")),
            Constraint::IoStandard(name) => write!(f, "IOStandard({name})"),
            Constraint::Drive(strength) => write!(f, "Drive({strength})"),
            Constraint::Misc(misc) => write!(f, "Misc({misc})"),
        }
    }
}

pub fn split_pins(pins: &str) -> Vec<String> {
    pins.split_whitespace().map(str::to_string).collect()
}
