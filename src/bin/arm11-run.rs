use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use arm11_rs::{exec::IntExecutor, isa::arm::ArmDecoder, Cpu, CpuConfig, MappedMemory};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run an assembled binary on the arm11-rs emulator"
)]
struct Opts {
    /// Start address (defaults to 0)
    #[arg(short, long)]
    entry: Option<u32>,
    /// Stop with an error after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,
    /// Print the final state as JSON instead of the register listing
    #[arg(long)]
    json: bool,
    #[arg(value_name = "BINFILE")]
    input: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let mut mem = MappedMemory::new();

    let bytes = std::fs::read(&opts.input).with_context(|| format!("cannot open {}", opts.input))?;
    mem.ram
        .load_image(&bytes)
        .with_context(|| format!("{} does not fit in memory", opts.input))?;

    let mut cpu = Cpu::new(CpuConfig {
        max_steps: opts.max_steps,
    });
    cpu.reset(opts.entry.unwrap_or(0));

    let dec = ArmDecoder::new();
    let exec = IntExecutor;
    cpu.run(&mut mem, &dec, &exec)?;

    if opts.json {
        let state = serde_json::json!({ "cpu": cpu, "gpio": mem.gpio });
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_state(&cpu, &mem);
    }
    Ok(())
}

fn print_state(cpu: &Cpu, mem: &MappedMemory) {
    println!("Registers:");
    for (i, v) in cpu.gpr.iter().enumerate() {
        println!("${:<3}: {:>10} ({:#010x})", i, *v as i32, v);
    }
    for (name, v) in [("SP", cpu.sp), ("LR", cpu.lr), ("PC", cpu.pc), ("CPSR", cpu.cpsr.bits())] {
        println!("{:<4}: {:>10} ({:#010x})", name, v as i32, v);
    }
    println!("Non-zero memory:");
    for (addr, word) in mem.ram.nonzero_words() {
        println!("{addr:#010x}: {word:#010x}");
    }
}
