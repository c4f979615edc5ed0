use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use fpgaflow_boards::{BOARDS, get_board};
use fpgaflow_platform::Board;
use fpgaflow_toolchain::Toolchain;
use fpgaflow_vivado::{BuildRequest, VivadoToolchain, xdc};
use log::LevelFilter;
use simple_error::bail;
use simple_logger::SimpleLogger;

mod manifest;

use manifest::Manifest;

#[derive(Parser)]
#[command(name = "fpgaflow", about = "Board pin tables and Vivado batch builds.")]
struct Args {
    /// Increase log verbosity; repeat for more.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List supported boards.
    Boards,
    /// Print every resource of a board with its pins and attributes.
    Pins { board: String },
    /// Print the constraint file of a design.
    Xdc { board: String, manifest: PathBuf },
    /// Generate the build files of a design and run Vivado on them.
    Build {
        board: String,
        manifest: PathBuf,
        #[arg(long)]
        toolchain: Option<PathBuf>,
        #[arg(long, default_value = "build")]
        build_dir: PathBuf,
        #[arg(long, default_value = "top")]
        build_name: String,
        /// Only write the files.
        #[arg(long)]
        no_run: bool,
        #[arg(long)]
        phys_opt: bool,
    },
    /// Load a bitstream into the FPGA.
    Program {
        board: String,
        bitstream: PathBuf,
        #[arg(long)]
        toolchain: Option<PathBuf>,
    },
    /// Write a file into the board's configuration flash.
    Flash {
        board: String,
        #[arg(value_parser = parse_address)]
        address: u32,
        file: PathBuf,
        #[arg(long)]
        toolchain: Option<PathBuf>,
    },
}

fn parse_address(s: &str) -> Result<u32, String> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    res.map_err(|e| format!("invalid address {s}: {e}"))
}

fn board(name: &str) -> Result<&'static dyn Board, Box<dyn Error>> {
    match get_board(name) {
        Some(board) => Ok(board),
        None => bail!("unknown board {}", name),
    }
}

fn toolchain(path: Option<&Path>) -> Result<Toolchain, Box<dyn Error>> {
    Ok(match path {
        Some(path) => Toolchain::from_file(path)?,
        None => Toolchain::default(),
    })
}

fn print_pins(board: &dyn Board) -> Result<(), Box<dyn Error>> {
    for def in board.io() {
        for sig in board.resolve(def.name, Some(def.number), None)? {
            let constraints: Vec<_> = sig.constraints.iter().map(|c| c.to_string()).collect();
            println!(
                "{res:24} {pins:40} {constraints}",
                res = sig.resource.to_string(),
                pins = sig.pins.join(" "),
                constraints = constraints.join(" "),
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;

    match args.command {
        Command::Boards => {
            for board in BOARDS {
                println!(
                    "{name:16} {device:20} {id:#06x}",
                    name = board.name(),
                    device = board.device(),
                    id = board.identifier()
                );
            }
        }
        Command::Pins { board: name } => print_pins(board(&name)?)?,
        Command::Xdc {
            board: name,
            manifest,
        } => {
            let board = board(&name)?;
            let mut design = Manifest::from_file(&manifest)?.design(board)?;
            design.finalize();
            let signals = design.resolve_signals()?;
            println!(
                "{}",
                xdc::build_xdc(
                    &signals,
                    design.timing_constraints(),
                    design.platform_commands()
                )
            );
        }
        Command::Build {
            board: name,
            manifest,
            toolchain: tc,
            build_dir,
            build_name,
            no_run,
            phys_opt,
        } => {
            let board = board(&name)?;
            let mut design = Manifest::from_file(&manifest)?.design(board)?;
            let req = BuildRequest {
                build_dir,
                build_name,
                toolchain: toolchain(tc.as_deref())?,
            };
            let vivado = VivadoToolchain {
                with_phys_opt: phys_opt,
                ..Default::default()
            };
            let bit = vivado.build(&mut design, &req, !no_run)?;
            if no_run {
                println!("build files written to {}", req.build_dir.display());
            } else {
                println!("{}", bit.display());
            }
        }
        Command::Program {
            board: name,
            bitstream,
            toolchain: tc,
        } => {
            let tc = toolchain(tc.as_deref())?;
            board(&name)?
                .create_programmer()
                .load_bitstream(&tc, &bitstream)?;
        }
        Command::Flash {
            board: name,
            address,
            file,
            toolchain: tc,
        } => {
            let tc = toolchain(tc.as_deref())?;
            board(&name)?
                .create_programmer()
                .flash(&tc, address, &file)?;
        }
    }
    Ok(())
}
