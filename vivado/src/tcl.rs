//! Batch-mode build scripts.

use std::path::{Path, PathBuf};

use fpgaflow_platform::Source;

use crate::VivadoToolchain;

/// Substitutes the `{build_name}` placeholder in a caller-supplied command. Other
/// braces, doubled or not, are left as written.
pub fn substitute(command: &str, build_name: &str) -> String {
    command.replace("{build_name}", build_name)
}

/// A path as a single braced Tcl word.
fn tcl_path(path: &Path) -> String {
    format!("{{{}}}", path.to_string_lossy().replace('\\', "/"))
}

/// Builds the full synthesis, implementation and bitstream script.
pub fn build_script(
    toolchain: &VivadoToolchain,
    sources: &[Source],
    device: &str,
    top: &str,
    include_dirs: &[PathBuf],
    build_name: &str,
) -> String {
    let mut tcl = vec![];
    for source in sources {
        tcl.push(format!("add_files {}", tcl_path(&source.path)));
    }
    tcl.push(format!("read_xdc {build_name}.xdc"));
    tcl.extend(
        toolchain
            .pre_synthesis_commands
            .iter()
            .map(|c| substitute(c, build_name)),
    );
    let include_dirs: Vec<_> = include_dirs.iter().map(|dir| tcl_path(dir)).collect();
    tcl.push(format!(
        "synth_design -top {top} -part {device} -include_dirs {{{}}}",
        include_dirs.join(" ")
    ));
    tcl.push(format!(
        "report_utilization -hierarchical -file {build_name}_utilization_hierarchical_synth.rpt"
    ));
    tcl.push(format!("report_utilization -file {build_name}_utilization_synth.rpt"));
    tcl.push("place_design".to_string());
    if toolchain.with_phys_opt {
        tcl.push("phys_opt_design -directive AddRetime".to_string());
    }
    tcl.push(format!(
        "report_utilization -hierarchical -file {build_name}_utilization_hierarchical_place.rpt"
    ));
    tcl.push(format!("report_utilization -file {build_name}_utilization_place.rpt"));
    tcl.push(format!("report_io -file {build_name}_io.rpt"));
    tcl.push(format!("report_control_sets -verbose -file {build_name}_control_sets.rpt"));
    tcl.push(format!("report_clock_utilization -file {build_name}_clock_utilization.rpt"));
    tcl.push("route_design".to_string());
    tcl.push(format!("report_route_status -file {build_name}_route_status.rpt"));
    tcl.push(format!("report_drc -file {build_name}_drc.rpt"));
    tcl.push(format!("report_timing_summary -max_paths 10 -file {build_name}_timing.rpt"));
    tcl.push(format!("report_power -file {build_name}_power.rpt"));
    tcl.extend(
        toolchain
            .bitstream_commands
            .iter()
            .map(|c| substitute(c, build_name)),
    );
    tcl.push(format!("write_bitstream -force {build_name}.bit"));
    tcl.extend(
        toolchain
            .additional_commands
            .iter()
            .map(|c| substitute(c, build_name)),
    );
    tcl.push("quit".to_string());
    let mut res = tcl.join("\n");
    res.push('\n');
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpgaflow_platform::Language;

    fn commands(script: &str) -> Vec<&str> {
        script
            .lines()
            .map(|line| line.split_whitespace().next().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_fixed_stages() {
        let tc = VivadoToolchain::new();
        let sources = [Source {
            path: "top.v".into(),
            language: Language::Verilog,
        }];
        let script = build_script(&tc, &sources, "xc6slx45-csg324-2", "top", &[], "top");
        assert_eq!(
            commands(&script),
            [
                "add_files",
                "read_xdc",
                "synth_design",
                "report_utilization",
                "report_utilization",
                "place_design",
                "report_utilization",
                "report_utilization",
                "report_io",
                "report_control_sets",
                "report_clock_utilization",
                "route_design",
                "report_route_status",
                "report_drc",
                "report_timing_summary",
                "report_power",
                "write_bitstream",
                "quit",
            ]
        );
        assert!(script.contains("synth_design -top top -part xc6slx45-csg324-2 -include_dirs {}\n"));
        assert!(script.contains("\nwrite_bitstream -force top.bit\nquit\n"));
    }

    #[test]
    fn test_paths_with_spaces() {
        let tc = VivadoToolchain::new();
        let sources = [Source {
            path: r"C:\Users\First Last\my rtl\uart.v".into(),
            language: Language::Verilog,
        }];
        let script = build_script(
            &tc,
            &sources,
            "xc6slx45-csg324-2",
            "top",
            &["/home/ci/my rtl/inc".into(), "gen".into()],
            "top",
        );
        let lines: Vec<_> = script.lines().collect();
        assert_eq!(lines[0], "add_files {C:/Users/First Last/my rtl/uart.v}");
        assert_eq!(
            lines[2],
            "synth_design -top top -part xc6slx45-csg324-2 -include_dirs {{/home/ci/my rtl/inc} {gen}}"
        );
    }

    #[test]
    fn test_substitute_leaves_braces() {
        assert_eq!(
            substitute("write_cfgmem -file {build_name}.bin {{x}}", "soc"),
            "write_cfgmem -file soc.bin {{x}}"
        );
    }

    #[test]
    fn test_caller_commands() {
        let mut tc = VivadoToolchain::new();
        tc.with_phys_opt = true;
        tc.pre_synthesis_commands
            .push("set_param general.maxThreads 4".into());
        tc.bitstream_commands
            .push("set_property BITSTREAM.GENERAL.COMPRESS TRUE [current_design]".into());
        tc.additional_commands
            .push("write_cfgmem -force -format bin -interface spix4 -loadbit \"up 0x0 {build_name}.bit\" -file {build_name}.bin".into());
        let sources = [
            Source {
                path: r"rtl\core.vhd".into(),
                language: Language::Vhdl,
            },
            Source {
                path: "soc.v".into(),
                language: Language::Verilog,
            },
        ];
        let script = build_script(
            &tc,
            &sources,
            "xc7a35ticsg324-1L",
            "soc",
            &["rtl/inc".into(), "gen".into()],
            "soc",
        );
        let lines: Vec<_> = script.lines().collect();
        assert_eq!(lines[0], "add_files {rtl/core.vhd}");
        assert_eq!(lines[1], "add_files {soc.v}");
        assert_eq!(lines[2], "read_xdc soc.xdc");
        assert_eq!(lines[3], "set_param general.maxThreads 4");
        assert_eq!(
            lines[4],
            "synth_design -top soc -part xc7a35ticsg324-1L -include_dirs {{rtl/inc} {gen}}"
        );
        assert_eq!(lines[8], "phys_opt_design -directive AddRetime");
        let n = lines.len();
        assert_eq!(
            lines[n - 4],
            "set_property BITSTREAM.GENERAL.COMPRESS TRUE [current_design]"
        );
        assert_eq!(lines[n - 3], "write_bitstream -force soc.bit");
        assert_eq!(
            lines[n - 2],
            "write_cfgmem -force -format bin -interface spix4 -loadbit \"up 0x0 soc.bit\" -file soc.bin"
        );
        assert_eq!(lines[n - 1], "quit");
    }
}
