use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use arm11_asm::{Tokenizer, assemble_tokens};

#[derive(Parser, Debug)]
#[command(author, version, about = "Two-pass assembler for the arm11-rs instruction set")]
struct Opts {
    /// Input assembly file (one instruction per line)
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Output binary file (little-endian words)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// Export the label table to JSON (Vec<{ addr, name }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct LabelKV<'a> {
    addr: u32,
    name: &'a str,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("cannot open {}", opts.input.display()))?;

    let mut tokenizer = Tokenizer::new();
    for line in text.lines() {
        tokenizer.push_line(line);
    }
    let program = assemble_tokens(&tokenizer.finish())
        .with_context(|| format!("{}", opts.input.display()))?;

    fs::write(&opts.output, program.to_bytes())
        .with_context(|| format!("cannot write {}", opts.output.display()))?;

    if let Some(path) = opts.labels_out {
        let arr: Vec<LabelKV> = program
            .labels
            .sorted()
            .into_iter()
            .map(|(name, addr)| LabelKV { addr, name })
            .collect();
        fs::write(&path, serde_json::to_string_pretty(&arr)?)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }
    Ok(())
}
