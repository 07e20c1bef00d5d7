use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    #[error("malformed literal `{0}`")]
    MalformedLiteral(String),

    #[error("`{mnemonic}` expects {expected} operand(s)")]
    MissingOperand { mnemonic: String, expected: usize },

    #[error("unexpected operand `{0}`")]
    UnexpectedOperand(String),

    #[error("{0} cannot be encoded in this operand")]
    UnencodableImmediate(i64),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<AsmError>,
    },
}

impl AsmError {
    pub fn at_line(self, line: usize) -> Self {
        match self {
            e @ AsmError::Line { .. } => e,
            e => AsmError::Line {
                line,
                source: Box::new(e),
            },
        }
    }

    /// The underlying error without line context.
    pub fn kind(&self) -> &AsmError {
        match self {
            AsmError::Line { source, .. } => source.kind(),
            e => e,
        }
    }
}
