#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `name:` with the colon stripped.
    Label,
    /// `#n` with the marker stripped.
    Literal,
    /// `=expr` with the marker stripped.
    Expression,
    /// Mnemonics, registers, shift names, label references.
    Other,
    Newline,
    EndOfFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | ',' | '[' | ']' | '\r' | '\n')
}

fn classify(word: &str) -> Token {
    if let Some(name) = word.strip_suffix(':') {
        Token::new(TokenKind::Label, name)
    } else if let Some(lit) = word.strip_prefix('#') {
        Token::new(TokenKind::Literal, lit)
    } else if let Some(expr) = word.strip_prefix('=') {
        Token::new(TokenKind::Expression, expr)
    } else {
        Token::new(TokenKind::Other, word)
    }
}

/// Accumulates tokens one source line at a time.
#[derive(Debug, Default)]
pub struct Tokenizer {
    tokens: Vec<Token>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        let code = line.split(';').next().unwrap_or_default();
        self.tokens.extend(
            code.split(is_separator)
                .filter(|w| !w.is_empty())
                .map(classify),
        );
        self.tokens.push(Token::new(TokenKind::Newline, "nl"));
    }

    /// Appends the end-of-file sentinel.
    pub fn finish(mut self) -> Vec<Token> {
        self.tokens.push(Token::new(TokenKind::EndOfFile, "end"));
        self.tokens
    }
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let mut t = Tokenizer::new();
    for line in src.lines() {
        t.push_line(line);
    }
    t.finish()
}
