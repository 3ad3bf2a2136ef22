use super::CifError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    DataBlock(String),
    Loop,
    Tag(String),
    Value(String),
    /// A line holding nothing but whitespace.
    Break,
    Eof,
}

/// Splits mmCIF text into tokens, one line-aware scan over the bytes.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    at_line_start: bool,
    line_has_content: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            at_line_start: true,
            line_has_content: false,
        }
    }

    /// 1-based line of the scan position.
    pub fn line(&self) -> usize {
        self.line
    }

    fn newline(&mut self) -> bool {
        self.pos += 1;
        self.line += 1;
        self.at_line_start = true;
        let blank = !self.line_has_content;
        self.line_has_content = false;
        blank
    }

    /// Skips whitespace and comments. Returns true when a blank line was crossed.
    fn skip_trivia(&mut self) -> bool {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\r' => {
                    self.pos += 1;
                    self.at_line_start = false;
                }
                b'\n' => {
                    if self.newline() {
                        return true;
                    }
                }
                b'#' => {
                    self.line_has_content = true;
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        false
    }

    pub fn next_token(&mut self) -> Result<Token, CifError> {
        if self.skip_trivia() {
            return Ok(Token::Break);
        }
        let Some(&b) = self.bytes.get(self.pos) else {
            return Ok(Token::Eof);
        };
        self.line_has_content = true;

        if b == b';' && self.at_line_start {
            return self.text_field();
        }
        self.at_line_start = false;

        if b == b'\'' || b == b'"' {
            return self.quoted(b);
        }

        let start = self.pos;
        while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        Ok(classify(&self.input[start..self.pos]))
    }

    fn quoted(&mut self, quote: u8) -> Result<Token, CifError> {
        let line = self.line;
        let start = self.pos + 1;
        let mut pos = start;
        while pos < self.bytes.len() && self.bytes[pos] != b'\n' {
            if self.bytes[pos] == quote {
                let closes = self
                    .bytes
                    .get(pos + 1)
                    .is_none_or(|next| next.is_ascii_whitespace() || *next == b'#');
                if closes {
                    self.pos = pos + 1;
                    return Ok(Token::Value(self.input[start..pos].to_string()));
                }
            }
            pos += 1;
        }
        Err(CifError::UnterminatedQuote { line })
    }

    /// Reads a `;`-delimited field. The value runs from after the opening `;` to the newline
    /// before the closing `;`.
    fn text_field(&mut self) -> Result<Token, CifError> {
        let line = self.line;
        let start = self.pos + 1;
        self.pos = start;
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                self.pos += 1;
            }
            if self.pos >= self.bytes.len() {
                return Err(CifError::UnterminatedTextField { line });
            }
            let end = self.pos;
            self.newline();
            self.line_has_content = true;
            if self.bytes.get(self.pos) == Some(&b';') {
                self.pos += 1;
                self.at_line_start = false;
                let value = self.input[start..end].trim_end_matches('\r');
                return Ok(Token::Value(value.to_string()));
            }
        }
    }
}

fn classify(word: &str) -> Token {
    let lower = word.to_ascii_lowercase();
    if lower.starts_with("data_") {
        Token::DataBlock(word[5..].to_string())
    } else if lower == "loop_" {
        Token::Loop
    } else if word.starts_with('_') {
        Token::Tag(word.to_string())
    } else {
        Token::Value(word.to_string())
    }
}
