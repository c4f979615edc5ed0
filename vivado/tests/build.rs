use std::fs::{self, create_dir_all, read_to_string};
use std::path::Path;

use assert_matches::assert_matches;
use fpgaflow_boards::{Pipistrello, pipistrello};
use fpgaflow_platform::{ConstraintError, Design, IoItem};
use fpgaflow_toolchain::Toolchain;
use fpgaflow_vivado::xdc::parse_locations;
use fpgaflow_vivado::{BuildError, BuildRequest, VivadoToolchain};
use tempfile::TempDir;

const BLINKY: &str = "module top(input clk50, output user_led);\nendmodule\n";

fn request(dir: &Path, toolchain: Toolchain) -> BuildRequest {
    BuildRequest {
        build_dir: dir.join("build"),
        build_name: "blinky".to_string(),
        toolchain,
    }
}

/// A fake installation whose settings script defines `vivado` as a shell function.
fn fake_install(dir: &Path, vivado: &str) -> Toolchain {
    let ver = dir.join("Vivado").join("2019.1");
    create_dir_all(&ver).unwrap();
    fs::write(ver.join("settings64.sh"), format!("vivado() {{\n{vivado}\n}}\n")).unwrap();
    fs::write(ver.join("settings32.sh"), format!("vivado() {{\n{vivado}\n}}\n")).unwrap();
    Toolchain {
        vivado_path: dir.join("Vivado"),
        ..Default::default()
    }
}

#[test]
fn test_generate_without_run() {
    let dir = TempDir::new().unwrap();
    let board = Pipistrello;
    let mut design = Design::new(&board, BLINKY);
    design.request("clk50", None).unwrap();
    design.request("user_led", Some(1)).unwrap();
    design.request("sdram", None).unwrap();
    let req = request(dir.path(), Toolchain::default());
    let bit = VivadoToolchain::new().build(&mut design, &req, false).unwrap();
    assert_eq!(bit, dir.path().join("build").join("blinky.bit"));
    assert!(design.is_finalized());

    let build = dir.path().join("build");
    assert_eq!(read_to_string(build.join("blinky.v")).unwrap(), BLINKY);
    assert!(!build.join("build_blinky.sh").exists());

    let tcl = read_to_string(build.join("blinky.tcl")).unwrap();
    assert!(tcl.starts_with("add_files {blinky.v}\nread_xdc blinky.xdc\n"));
    assert!(tcl.contains("-part xc6slx45-csg324-2 "));

    let xdc = read_to_string(build.join("blinky.xdc")).unwrap();
    assert!(xdc.ends_with("create_clock -name clk50 -period 20.0 [get_ports clk50]"));
    let locs = parse_locations(&xdc);
    assert_eq!(locs[0], ("clk50".to_string(), "H17".to_string()));
    assert_eq!(locs[1], ("user_led".to_string(), "U16".to_string()));
    let dq: Vec<_> = locs
        .iter()
        .filter(|(port, _)| port.starts_with("sdram_dq["))
        .map(|(_, pin)| pin.as_str())
        .collect();
    assert_eq!(
        dq,
        "L2 L1 K2 K1 H2 H1 J3 J1 M3 M1 N2 N1 T2 T1 U2 U1"
            .split(' ')
            .collect::<Vec<_>>()
    );
}

/// `(port, pin)` pairs as the constraint file should list them for `items`.
fn declared_locations(port: &str, items: &[IoItem], out: &mut Vec<(String, String)>) {
    for item in items {
        match *item {
            IoItem::Pins(pins) => {
                let pins: Vec<_> = pins.split_whitespace().collect();
                if pins.len() == 1 {
                    out.push((port.to_string(), pins[0].to_string()));
                } else {
                    for (i, pin) in pins.iter().enumerate() {
                        out.push((format!("{port}[{i}]"), pin.to_string()));
                    }
                }
            }
            IoItem::Subsignal(sub, items) => declared_locations(&format!("{port}_{sub}"), items, out),
            _ => (),
        }
    }
}

#[test]
fn test_all_resources_locations() {
    let dir = TempDir::new().unwrap();
    let board = Pipistrello;
    let mut design = Design::new(&board, BLINKY);
    let mut expected = vec![];
    for (i, def) in pipistrello::IO.iter().enumerate() {
        let port = format!("io{i}");
        design.request_as(def.name, Some(def.number), &port).unwrap();
        declared_locations(&port, def.items, &mut expected);
    }
    let req = request(dir.path(), Toolchain::default());
    VivadoToolchain::new().build(&mut design, &req, false).unwrap();
    let xdc = read_to_string(dir.path().join("build").join("blinky.xdc")).unwrap();
    let mut locs = parse_locations(&xdc);
    assert!(locs.len() > pipistrello::IO.len());
    locs.sort();
    expected.sort();
    assert_eq!(locs, expected);
}

#[test]
fn test_empty_design() {
    let dir = TempDir::new().unwrap();
    let board = Pipistrello;
    let mut design = Design::new(&board, BLINKY);
    assert_matches!(
        design.request("user_btn", None),
        Err(ConstraintError::ResourceNotFound { .. })
    );
    let req = request(dir.path(), Toolchain::default());
    VivadoToolchain::new().build(&mut design, &req, false).unwrap();
    let xdc = read_to_string(dir.path().join("build").join("blinky.xdc")).unwrap();
    assert!(xdc.is_empty());
}

#[cfg(unix)]
#[test]
fn test_run_success() {
    let dir = TempDir::new().unwrap();
    let tc = fake_install(dir.path(), "echo \"$@\" > vivado.args\ntouch blinky.bit");
    let board = Pipistrello;
    let mut design = Design::new(&board, BLINKY);
    design.request("clk50", None).unwrap();
    let req = request(dir.path(), tc);
    let bit = VivadoToolchain::new().build(&mut design, &req, true).unwrap();
    assert!(bit.exists());
    let build = dir.path().join("build");
    let args = read_to_string(build.join("vivado.args")).unwrap();
    assert_eq!(args, "-mode batch -source blinky.tcl\n");
    let launcher = read_to_string(build.join("build_blinky.sh")).unwrap();
    assert!(launcher.starts_with("# Autogenerated by fpgaflow\nset -e\nsource "));
}

#[cfg(unix)]
#[test]
fn test_run_failure() {
    let dir = TempDir::new().unwrap();
    let tc = fake_install(dir.path(), "exit 3");
    let board = Pipistrello;
    let mut design = Design::new(&board, BLINKY);
    let req = request(dir.path(), tc);
    assert_matches!(
        VivadoToolchain::new().build(&mut design, &req, true),
        Err(BuildError::ToolFailed { tool, status }) if tool == "vivado" && status.code() == Some(3)
    );
    assert!(dir.path().join("build").join("blinky.tcl").exists());
}

#[cfg(unix)]
#[test]
fn test_run_missing_install() {
    let dir = TempDir::new().unwrap();
    let tc = Toolchain {
        vivado_path: dir.path().join("nowhere"),
        ..Default::default()
    };
    let board = Pipistrello;
    let mut design = Design::new(&board, BLINKY);
    let req = request(dir.path(), tc);
    assert_matches!(
        VivadoToolchain::new().build(&mut design, &req, true),
        Err(BuildError::Toolchain(_))
    );
}
