//! Two-pass assembly over the flat token stream.
//!
//! Pass 1 gives every source line one word and binds labels to the address
//! of the line they prefix. Pass 2 encodes each line against the finished
//! label table. Words are emitted in source order, followed by the literal
//! pool.

use arm11_rs::isa::arm::encode;
use tracing::{debug, trace};

use crate::encoder::Encoder;
use crate::error::AsmError;
use crate::symbols::SymbolMap;
use crate::token::{tokenize, Token, TokenKind};

pub const WORD_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub words: Vec<u32>,
    pub labels: SymbolMap,
}

impl Program {
    /// Little-endian image, one word after another.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

/// One slice per Newline-terminated line, up to the end-of-file sentinel.
fn lines(tokens: &[Token]) -> Vec<&[Token]> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::Newline => {
                out.push(&tokens[start..i]);
                start = i + 1;
            }
            TokenKind::EndOfFile => break,
            _ => {}
        }
    }
    out
}

/// Pass 1: label table and the address just past the last line.
pub fn resolve_labels(tokens: &[Token]) -> (SymbolMap, u32) {
    let mut labels = SymbolMap::new();
    let mut addr = 0u32;
    for tok in tokens {
        match tok.kind {
            TokenKind::Label => {
                debug!(label = %tok.text, addr = format_args!("{addr:#06x}"), "bind label");
                labels.insert(&tok.text, addr);
            }
            TokenKind::Newline => addr += WORD_SIZE,
            TokenKind::EndOfFile => break,
            _ => {}
        }
    }
    (labels, addr)
}

pub fn assemble_tokens(tokens: &[Token]) -> Result<Program, AsmError> {
    let (labels, end) = resolve_labels(tokens);
    debug!(labels = labels.len(), end, "pass 1 done");

    let mut words = Vec::new();
    let mut enc = Encoder::new(&labels, end);
    let mut addr = 0u32;
    for (i, line) in lines(tokens).into_iter().enumerate() {
        let body: Vec<Token> = line
            .iter()
            .filter(|t| t.kind != TokenKind::Label)
            .cloned()
            .collect();
        let insn = enc.encode_line(addr, &body).map_err(|e| e.at_line(i + 1))?;
        let word = encode(&insn);
        trace!(addr = format_args!("{addr:#06x}"), word = format_args!("{word:#010x}"), ?insn);
        words.push(word);
        addr += WORD_SIZE;
    }
    let pool = enc.into_pool();
    debug!(lines = words.len(), pool = pool.words().len(), "pass 2 done");
    words.extend_from_slice(pool.words());

    Ok(Program { words, labels })
}

pub fn assemble(src: &str) -> Result<Program, AsmError> {
    assemble_tokens(&tokenize(src))
}
