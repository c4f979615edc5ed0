//! Saanlima Pipistrello LX45.

use fpgaflow_platform::{Board, ConnectorDef, DefaultClock, IoDef, IoItem};
use fpgaflow_programmer::{Programmer, Xc3sProg};

use IoItem::{Drive, IoStandard, Misc, Pins, Subsignal};

pub const IO: &[IoDef] = &[
    // green near hdmi
    IoDef {
        name: "user_led",
        number: 0,
        items: &[Pins("V16"), IoStandard("LVTTL"), Drive(8), Misc("SLEW=QUIETIO")],
    },
    // red near hdmi
    IoDef {
        name: "user_led",
        number: 1,
        items: &[Pins("U16"), IoStandard("LVTTL"), Drive(8), Misc("SLEW=QUIETIO")],
    },
    // green at msd
    IoDef {
        name: "user_led",
        number: 2,
        items: &[Pins("A16"), IoStandard("LVTTL"), Drive(8), Misc("SLEW=QUIETIO")],
    },
    // red at msd
    IoDef {
        name: "user_led",
        number: 3,
        items: &[Pins("A15"), IoStandard("LVTTL"), Drive(8), Misc("SLEW=QUIETIO")],
    },
    // red at usb
    IoDef {
        name: "user_led",
        number: 4,
        items: &[Pins("A12"), IoStandard("LVTTL"), Drive(8), Misc("SLEW=QUIETIO")],
    },
    IoDef {
        name: "user_switch",
        number: 0,
        items: &[Pins("N14"), IoStandard("LVTTL"), Misc("PULLDOWN")],
    },
    IoDef {
        name: "clk50",
        number: 0,
        items: &[Pins("H17"), IoStandard("LVTTL")],
    },
    IoDef {
        name: "serial",
        number: 0,
        items: &[
            Subsignal("tx", &[Pins("A10"), Misc("SLEW=SLOW")]),
            Subsignal("rx", &[Pins("A11"), Misc("PULLUP")]),
            Subsignal("rts", &[Pins("C10"), Misc("SLEW=SLOW")]),
            Subsignal("cts", &[Pins("A9"), Misc("PULLUP")]),
            IoStandard("LVTTL"),
        ],
    },
    // shares pins with serial, the FT2232H runs either mode
    IoDef {
        name: "usb_fifo",
        number: 0,
        items: &[
            Subsignal("data", &[Pins("A11 A10 C10 A9 B9 A8 B8 A7")]),
            Subsignal("rxf", &[Pins("C7")]),
            Subsignal("txe", &[Pins("A6")]),
            Subsignal("rd", &[Pins("B6")]),
            Subsignal("wr", &[Pins("A5")]),
            Subsignal("siwua", &[Pins("C5")]),
            IoStandard("LVTTL"),
        ],
    },
    IoDef {
        name: "dvi_in",
        number: 0,
        items: &[
            Subsignal("clk_p", &[Pins("U5"), IoStandard("TMDS_33")]),
            Subsignal("clk_n", &[Pins("V5"), IoStandard("TMDS_33")]),
            Subsignal("data0_p", &[Pins("T6"), IoStandard("TMDS_33")]),
            Subsignal("data0_n", &[Pins("V6"), IoStandard("TMDS_33")]),
            Subsignal("data1_p", &[Pins("U7"), IoStandard("TMDS_33")]),
            Subsignal("data1_n", &[Pins("V7"), IoStandard("TMDS_33")]),
            Subsignal("data2_p", &[Pins("U8"), IoStandard("TMDS_33")]),
            Subsignal("data2_n", &[Pins("V8"), IoStandard("TMDS_33")]),
            Subsignal("scl", &[Pins("V9"), IoStandard("LVCMOS33")]),
            Subsignal("sda", &[Pins("T9"), IoStandard("LVCMOS33")]),
            Subsignal("hpd_notif", &[Pins("R8"), IoStandard("LVCMOS33")]),
        ],
    },
    IoDef {
        name: "spiflash",
        number: 0,
        items: &[
            Subsignal("cs_n", &[Pins("V3")]),
            Subsignal("clk", &[Pins("R15")]),
            Subsignal("mosi", &[Pins("T13")]),
            Subsignal("miso", &[Pins("R13"), Misc("PULLUP")]),
            Subsignal("wp", &[Pins("T14")]),
            Subsignal("hold", &[Pins("V14")]),
            IoStandard("LVTTL"),
            Misc("SLEW=FAST"),
        ],
    },
    IoDef {
        name: "spiflash2x",
        number: 0,
        items: &[
            Subsignal("cs_n", &[Pins("V3")]),
            Subsignal("clk", &[Pins("R15")]),
            Subsignal("dq", &[Pins("T13 R13"), Misc("PULLUP")]),
            Subsignal("wp", &[Pins("T14")]),
            Subsignal("hold", &[Pins("V14")]),
            IoStandard("LVCMOS33"),
            Misc("SLEW=FAST"),
        ],
    },
    IoDef {
        name: "mmc",
        number: 0,
        items: &[
            Subsignal("clk", &[Pins("A3")]),
            Subsignal("cmd", &[Pins("B3")]),
            Subsignal("dat", &[Pins("B4 A4 B2 A2")]),
            IoStandard("SDIO"),
        ],
    },
    IoDef {
        name: "audio",
        number: 0,
        items: &[
            Subsignal("l", &[Pins("R7")]),
            Subsignal("r", &[Pins("T7")]),
            IoStandard("LVTTL"),
        ],
    },
    IoDef {
        name: "pmod",
        number: 0,
        items: &[
            Subsignal("d", &[Pins("D9 C8 D6 C4 B11 C9 D8 C6")]),
            IoStandard("LVCMOS33"),
        ],
    },
    IoDef {
        name: "sdram_clock",
        number: 0,
        items: &[
            Subsignal("p", &[Pins("G3")]),
            Subsignal("n", &[Pins("G1")]),
            IoStandard("MOBILE_DDR"),
            Misc("SLEW=FAST"),
        ],
    },
    // cs_n is tied low on the board
    IoDef {
        name: "sdram",
        number: 0,
        items: &[
            Subsignal("a", &[Pins("J7 J6 H5 L7 F3 H4 H3 H6 D2 D1 F4 D3 G6")]),
            Subsignal("ba", &[Pins("F2 F1")]),
            Subsignal("cke", &[Pins("H7")]),
            Subsignal("ras_n", &[Pins("L5")]),
            Subsignal("cas_n", &[Pins("K5")]),
            Subsignal("we_n", &[Pins("E3")]),
            Subsignal(
                "dq",
                &[Pins("L2 L1 K2 K1 H2 H1 J3 J1 M3 M1 N2 N1 T2 T1 U2 U1")],
            ),
            Subsignal("dm", &[Pins("K3 K4")]),
            IoStandard("MOBILE_DDR"),
            Misc("SLEW=FAST"),
        ],
    },
];

pub const CONNECTORS: &[ConnectorDef] = &[
    ConnectorDef {
        name: "A",
        pins: "U18 T17 P17 P16 N16 N17 M16 L15 L17 K15 K17 J16 H15 H18 F18 D18",
    },
    ConnectorDef {
        name: "B",
        pins: "C18 E18 G18 H16 J18 K18 K16 L18 L16 M18 N18 N15 P15 P18 T18 U17",
    },
    ConnectorDef {
        name: "C",
        pins: "F17 F16 E16 G16 F15 G14 F14 H14 H13 J13 G13 H12 K14 K13 K12 L12",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Pipistrello;

impl Board for Pipistrello {
    fn name(&self) -> &'static str {
        "pipistrello"
    }

    fn device(&self) -> &'static str {
        "xc6slx45-csg324-2"
    }

    fn identifier(&self) -> u32 {
        0x5049
    }

    fn io(&self) -> &'static [IoDef] {
        IO
    }

    fn connectors(&self) -> &'static [ConnectorDef] {
        CONNECTORS
    }

    fn default_clk(&self) -> Option<DefaultClock> {
        Some(DefaultClock {
            name: "clk50",
            period_ns: 20.0,
        })
    }

    fn create_programmer(&self) -> Box<dyn Programmer> {
        Box::new(Xc3sProg::new("ftdi", Some("bscan_spi_lx45_csg324.bit")))
    }
}
