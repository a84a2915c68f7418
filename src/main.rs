//! AL1 Emulator - CLI Entry Point
//!
//! Commands:
//! - `al1-emu make <source>` - Assemble to a sibling `.bin` image
//! - `al1-emu run <image>` - Run an image until it stops
//! - `al1-emu disasm <image>` - Disassemble an image
//! - `al1-emu debug <image>` - Interactive debugger

use al1::asm::{assemble, binary_path_for, disassemble, load_image, load_source, save_image};
use al1::{Cpu, EventLog, Observer};
use clap::{Parser, Subcommand};
use std::path::Path;

/// Cells seeded before `run`, as (address, value).
const SEED_CELLS: [(usize, u8); 2] = [(10, 5), (11, 3)];

#[derive(Parser)]
#[command(name = "al1-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator and assembler for the AL1 8-bit accumulator machine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a source file to a .bin image next to it
    Make {
        /// Path to the assembly source
        input: String,
    },
    /// Run a program until it halts
    Run {
        /// Path to the .bin image to execute
        input: String,
        /// Stop after this many instructions
        #[arg(short, long)]
        max_steps: Option<u64>,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Disassemble an image to readable text
    Disasm {
        /// Path to the .bin image
        input: String,
    },
    /// Interactive debugger
    Debug {
        /// Path to the .bin image to debug
        input: String,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Make { input } => {
            make(&input);
        }
        Commands::Run { input, max_steps, trace, json } => {
            let program = read_image(&input);
            if json {
                run_program(Cpu::with_observer(EventLog::new()), &program, max_steps, trace, true);
            } else {
                run_program(Cpu::new(), &program, max_steps, trace, false);
            }
        }
        Commands::Disasm { input } => {
            let program = read_image(&input);
            print!("{}", disassemble(&program));
        }
        Commands::Debug { input } => {
            debug_program(&input);
        }
    }
}

fn make(input: &str) {
    let output = binary_path_for(input);

    let source = match load_source(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Nothing is written unless the whole file assembles.
    let program = match assemble(&source) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = save_image(&output, &program) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("Compiled {} to {}", input, output.display());
}

fn read_image(path: &str) -> Vec<u8> {
    match load_image(Path::new(path)) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program<O: Observer>(mut cpu: Cpu<O>, program: &[u8], max_steps: Option<u64>, trace: bool, json: bool) {
    cpu.load_program(program);
    for (addr, value) in SEED_CELLS {
        cpu.set_memory(addr, value);
    }

    match (max_steps, trace) {
        (None, false) => {
            cpu.run();
        }
        _ => {
            cpu.reset();
            cpu.run_traced(max_steps.unwrap_or(u64::MAX), |pc, instr, cpu| {
                if trace {
                    println!("{:03}: {:<8} A={}", pc, instr.to_string(), cpu.accumulator());
                }
            });
            if cpu.is_running() {
                eprintln!("Stopped after {} steps; program still running", cpu.steps);
            }
        }
    }

    if json {
        match cpu.snapshot().to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", cpu);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) {
    use al1::tui::run_debugger;

    let program = read_image(path);

    if let Err(e) = run_debugger(program, &SEED_CELLS) {
        eprintln!("Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str) {
    eprintln!("Error: this build does not include the debugger (enable the `tui` feature)");
    std::process::exit(1);
}
