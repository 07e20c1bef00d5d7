pub mod encoder;
pub mod error;
pub mod resolve;
pub mod symbols;
pub mod token;

pub use error::AsmError;
pub use resolve::{assemble, assemble_tokens, resolve_labels, Program};
pub use symbols::SymbolMap;
pub use token::{tokenize, Token, TokenKind, Tokenizer};
