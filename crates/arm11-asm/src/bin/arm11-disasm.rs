use anyhow::{Context, Result};
use clap::Parser;
use std::fmt::Write as _;

use arm11_rs::decoder::Decoder;
use arm11_rs::disasm::fmt_decoded;
use arm11_rs::isa::arm::ArmDecoder;

#[derive(Parser, Debug)]
#[command(author, version, about = "Disassembler for arm11-rs binaries", long_about = None)]
struct Cli {
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Show instruction bytes
    #[arg(long)]
    show_bytes: bool,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let bytes = std::fs::read(&cli.input).with_context(|| format!("cannot open {}", cli.input))?;

    let dec = ArmDecoder::new();
    let mut buf = String::new();
    for (i, w) in bytes.chunks(4).enumerate() {
        let pc = (i * 4) as u32;
        if w.len() < 4 {
            let _ = writeln!(buf, "{pc:#010x}: <truncated>");
            break;
        }
        let raw32 = u32::from_le_bytes([w[0], w[1], w[2], w[3]]);
        let _ = write!(buf, "{pc:#010x}: ");
        if cli.show_bytes {
            let _ = write!(buf, "{:02x} {:02x} {:02x} {:02x}   ", w[0], w[1], w[2], w[3]);
        }
        match dec.decode(raw32) {
            Some(d) => {
                let _ = writeln!(buf, "{}", fmt_decoded(&d));
            }
            None => {
                let _ = writeln!(buf, ".word {raw32:#010x}");
            }
        }
    }
    if let Some(path) = cli.out {
        std::fs::write(&path, buf).with_context(|| format!("cannot write {path}"))?;
    } else {
        print!("{}", buf);
    }
    Ok(())
}
