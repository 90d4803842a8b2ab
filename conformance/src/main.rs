//! Runs the TomHarte/ProcessorTests ("SingleStepTests") JSON corpus against
//! `cpu-6502` and reports pass/fail counts per opcode, the way the source's
//! own `harteSuite_test.go` reports one Go subtest per opcode byte.
//!
//! The corpus (<https://github.com/SingleStepTests/65x02>) is not vendored -
//! point `--corpus` (or `CPU6502_CONFORMANCE_DIR`) at a checkout of it.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use cpu_6502::{new_cmos_65c02, new_nmos_6502, Bus, Cpu, CpuError, Variant as CpuVariant};
use serde::Deserialize;

#[derive(Parser)]
#[command(author, version, about = "6502/65C02 conformance harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the SingleStepTests JSON corpus against one or both variants.
    Run(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path to a SingleStepTests/65x02 checkout. Falls back to
    /// CPU6502_CONFORMANCE_DIR when not given.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Which opcode table to check.
    #[arg(long, value_enum, default_value_t = SuiteArg::Both)]
    variant: SuiteArg,

    /// Stop at the first failing scenario instead of tallying all of them.
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SuiteArg {
    Nmos,
    Cmos,
    Both,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let Commands::Run(args) = cli.command;

    let corpus = match args.corpus.or_else(|| std::env::var_os("CPU6502_CONFORMANCE_DIR").map(PathBuf::from)) {
        Some(path) => path,
        None => {
            eprintln!(
                "no corpus path given: pass --corpus or set CPU6502_CONFORMANCE_DIR to a \
                 SingleStepTests/65x02 checkout"
            );
            return ExitCode::FAILURE;
        }
    };

    let mut failures = 0usize;
    if matches!(args.variant, SuiteArg::Nmos | SuiteArg::Both) {
        failures += run_suite(&corpus.join("6502/v1"), CpuVariant::Nmos6502, args.fail_fast);
    }
    if matches!(args.variant, SuiteArg::Cmos | SuiteArg::Both) {
        failures += run_suite(&corpus.join("wdc65c02/v1"), CpuVariant::Cmos65C02, args.fail_fast);
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        eprintln!("{failures} scenario(s) failed");
        ExitCode::FAILURE
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioState {
    pc: u16,
    s: u8,
    a: u8,
    x: u8,
    y: u8,
    p: u8,
    ram: Vec<(u16, u8)>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    initial: ScenarioState,
    #[serde(rename = "final")]
    final_state: ScenarioState,
    cycles: Vec<(u16, u8, String)>,
}

/// Known-mismatched scenarios, excluded exactly as the source excludes them.
const KNOWN_EXCLUSIONS: &[&str] = &["20 55 13", "d3 f4 44"];
const ADC_OPCODES: &[u8] = &[0x61, 0x65, 0x69, 0x6D, 0x71, 0x72, 0x75, 0x79, 0x7D];

#[derive(Clone)]
struct TracedMemory {
    memory: [u8; 0x1_0000],
    trace: Rc<RefCell<Vec<(u16, u8, &'static str)>>>,
}

impl TracedMemory {
    fn new() -> TracedMemory {
        TracedMemory {
            memory: [0; 0x1_0000],
            trace: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl Bus for TracedMemory {
    fn peek_data(&mut self, address: u16) -> u8 {
        let value = self.memory[address as usize];
        self.trace.borrow_mut().push((address, value, "read"));
        value
    }

    fn peek_code(&mut self, address: u16) -> u8 {
        let value = self.memory[address as usize];
        self.trace.borrow_mut().push((address, value, "read"));
        value
    }

    fn poke(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
        self.trace.borrow_mut().push((address, value, "write"));
    }
}

fn run_suite(path: &Path, variant: CpuVariant, fail_fast: bool) -> usize {
    if !path.is_dir() {
        eprintln!("skipping {}: not found", path.display());
        return 0;
    }

    let mut passed = 0usize;
    let mut failed = 0usize;
    'opcodes: for opcode in 0x00u16..=0xFF {
        let file = path.join(format!("{opcode:02x}.json"));
        if !file.is_file() {
            continue;
        }
        let scenarios = match load_scenarios(&file) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("{}: {err}", file.display());
                failed += 1;
                continue;
            }
        };
        let is_adc = ADC_OPCODES.contains(&(opcode as u8));

        for scenario in &scenarios {
            if KNOWN_EXCLUSIONS.contains(&scenario.name.as_str()) {
                continue;
            }
            match run_scenario(variant, is_adc, scenario) {
                Ok(()) => passed += 1,
                Err(message) => {
                    failed += 1;
                    eprintln!("FAIL {:02x} {}: {message}", opcode, scenario.name);
                    if fail_fast {
                        break 'opcodes;
                    }
                }
            }
        }
    }

    println!(
        "{}: {passed} passed, {failed} failed",
        path.display()
    );
    failed
}

/// Reads and parses one opcode's scenario file, surfacing I/O and decode
/// failures as [`CpuError`] rather than panicking on a malformed corpus.
fn load_scenarios(file: &Path) -> Result<Vec<Scenario>, CpuError> {
    let data = std::fs::read(file)?;
    let scenarios = serde_json::from_slice(&data)?;
    Ok(scenarios)
}

fn run_scenario(variant: CpuVariant, is_adc: bool, scenario: &Scenario) -> Result<(), String> {
    let mem = TracedMemory::new();
    let trace = mem.trace.clone();
    let mut cpu: Cpu<TracedMemory> = if variant.is_cmos() {
        new_cmos_65c02(mem)
    } else {
        new_nmos_6502(mem)
    };

    cpu.set_pc(scenario.initial.pc);
    cpu.set_sp(scenario.initial.s);
    cpu.set_axyp(scenario.initial.a, scenario.initial.x, scenario.initial.y, scenario.initial.p);
    for &(address, value) in &scenario.initial.ram {
        cpu.bus_mut().poke(address, value);
    }
    trace.borrow_mut().clear();

    let start_cycles = cpu.get_cycles();
    cpu.execute_instruction();

    check_reg("A", cpu.get_a(), scenario.final_state.a)?;
    check_reg("X", cpu.get_x(), scenario.final_state.x)?;
    check_reg("Y", cpu.get_y(), scenario.final_state.y)?;
    check_reg("SP", cpu.get_sp(), scenario.final_state.s)?;
    check_reg16("PC", cpu.get_pc(), scenario.final_state.pc)?;

    let is_nmos_decimal_adc = !variant.is_cmos() && is_adc && cpu.get_p() & 0x08 != 0;
    if is_nmos_decimal_adc {
        check_reg("P (ignoring N)", cpu.get_p() & 0x7F, scenario.final_state.p & 0x7F)?;
    } else {
        check_reg("P", cpu.get_p(), scenario.final_state.p)?;
    }

    let taken = trace.borrow();
    if taken.len() != scenario.cycles.len() {
        return Err(format!(
            "cycle count {} != expected {}",
            taken.len(),
            scenario.cycles.len()
        ));
    }
    for (got, want) in taken.iter().zip(scenario.cycles.iter()) {
        if got.0 != want.0 || got.1 != want.1 || got.2 != want.2 {
            return Err(format!("bus trace mismatch: got {got:?}, want {want:?}"));
        }
    }

    let elapsed = cpu.get_cycles() - start_cycles;
    if elapsed as usize != scenario.cycles.len() {
        return Err(format!(
            "cycle counter advanced by {elapsed}, expected {}",
            scenario.cycles.len()
        ));
    }

    Ok(())
}

fn check_reg(name: &str, actual: u8, expected: u8) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{name} is ${actual:02X}, expected ${expected:02X}"))
    }
}

fn check_reg16(name: &str, actual: u16, expected: u16) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{name} is ${actual:04X}, expected ${expected:04X}"))
    }
}
