//! Lexical analysis for the Yu language.
//!
//! The lexer is table-driven: a 256-entry class table routes each byte to
//! one of the sublexers (identifier, number, string) or to a second
//! 256-entry table of single-character operator kinds. Byte-level
//! problems never abort tokenization; they are recorded as flag bits on
//! the offending token and surfaced later by the parser.
//!
//! While scanning, the lexer appends the offset of every line start —
//! including newlines inside comments — to a line table, which
//! [`Lexer::line_col`] searches to map token offsets to 1-based
//! line/column pairs.

pub mod token;

pub use token::{token_flags, Token, TokenKind, TokenList, TOKEN_MAP};

const CLASS_OTHER: u8 = 0;
const CLASS_WHITESPACE: u8 = 1;
const CLASS_SLASH: u8 = 2;
const CLASS_STAR: u8 = 3;
const CLASS_IDENT_START: u8 = 4;
const CLASS_DIGIT: u8 = 5;
const CLASS_QUOTE: u8 = 6;

const fn build_char_class() -> [u8; 256] {
    let mut table = [CLASS_OTHER; 256];
    let mut i = 0usize;
    while i < 256 {
        let b = i as u8;
        table[i] = if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
            CLASS_WHITESPACE
        } else if b == b'/' {
            CLASS_SLASH
        } else if b == b'*' {
            CLASS_STAR
        } else if b.is_ascii_alphabetic() || b == b'_' || b == b'@' {
            CLASS_IDENT_START
        } else if b.is_ascii_digit() {
            CLASS_DIGIT
        } else if b == b'"' {
            CLASS_QUOTE
        } else {
            CLASS_OTHER
        };
        i += 1;
    }
    table
}

const fn build_single_char_tokens() -> [TokenKind; 256] {
    let mut table = [TokenKind::Unknown; 256];
    table[b'+' as usize] = TokenKind::Plus;
    table[b'-' as usize] = TokenKind::Minus;
    table[b'*' as usize] = TokenKind::Star;
    table[b'/' as usize] = TokenKind::Slash;
    table[b'%' as usize] = TokenKind::Percent;
    table[b'=' as usize] = TokenKind::Equal;
    table[b'!' as usize] = TokenKind::Bang;
    table[b'<' as usize] = TokenKind::Less;
    table[b'>' as usize] = TokenKind::Greater;
    table[b'&' as usize] = TokenKind::And;
    table[b'|' as usize] = TokenKind::Or;
    table[b'^' as usize] = TokenKind::Xor;
    table[b'~' as usize] = TokenKind::Tilde;
    table[b'.' as usize] = TokenKind::Dot;
    table[b'(' as usize] = TokenKind::LeftParen;
    table[b')' as usize] = TokenKind::RightParen;
    table[b'{' as usize] = TokenKind::LeftBrace;
    table[b'}' as usize] = TokenKind::RightBrace;
    table[b'[' as usize] = TokenKind::LeftBracket;
    table[b']' as usize] = TokenKind::RightBracket;
    table[b',' as usize] = TokenKind::Comma;
    table[b':' as usize] = TokenKind::Colon;
    table[b';' as usize] = TokenKind::Semicolon;
    table[b'?' as usize] = TokenKind::Question;
    table
}

const fn build_valid_escapes() -> [bool; 256] {
    let mut table = [false; 256];
    table[b'n' as usize] = true;
    table[b't' as usize] = true;
    table[b'r' as usize] = true;
    table[b'\\' as usize] = true;
    table[b'"' as usize] = true;
    table[b'0' as usize] = true;
    table[b'x' as usize] = true;
    table
}

static CHAR_CLASS: [u8; 256] = build_char_class();
static SINGLE_CHAR_TOKENS: [TokenKind; 256] = build_single_char_tokens();
static VALID_ESCAPES: [bool; 256] = build_valid_escapes();

/// Tokenizes a Yu source buffer.
///
/// A lexer owns the token list and line table it produces; the source is
/// borrowed and must outlive the lexer. One lexer handles one buffer —
/// concurrent tokenizations use distinct instances.
pub struct Lexer<'src> {
    source: &'src str,
    src: &'src [u8],
    current_pos: u32,
    src_length: u32,
    tokens: TokenList,
    line_starts: Vec<u32>,
}

impl<'src> Lexer<'src> {
    /// Captures a byte view of `source`. Sources are limited to
    /// `u32::MAX` bytes; token offsets are 32-bit.
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = Vec::with_capacity(source.len() / 40 + 1);
        line_starts.push(0);
        let mut tokens = TokenList::new();
        tokens.reserve(source.len() / 4);
        Lexer {
            source,
            src: source.as_bytes(),
            current_pos: 0,
            src_length: source.len() as u32,
            tokens,
            line_starts,
        }
    }

    /// Scans the whole buffer, appending tokens until a single
    /// `END_OF_FILE` terminator has been emitted. Returns the owned
    /// token list; also reachable through [`Lexer::tokens`] afterwards.
    pub fn tokenize(&mut self) -> &TokenList {
        loop {
            let token = self.next_token();
            self.tokens.push(token);
            if token.kind == TokenKind::EndOfFile {
                break;
            }
            self.current_pos += token.length as u32;
        }
        &self.tokens
    }

    /// The tokens produced by [`Lexer::tokenize`].
    pub fn tokens(&self) -> &TokenList {
        &self.tokens
    }

    /// Offsets at which each source line starts; entry 0 is offset 0.
    pub fn line_starts(&self) -> &[u32] {
        &self.line_starts
    }

    /// Maps a token to its 1-based (line, column) via upper-bound search
    /// on the line table.
    pub fn line_col(&self, token: Token) -> (u32, u32) {
        let line = self.line_starts.partition_point(|&s| s <= token.start);
        (line as u32, token.start - self.line_starts[line - 1] + 1)
    }

    /// The raw bytes `[start, start + length)` of a token.
    pub fn token_value(&self, token: Token) -> &'src [u8] {
        let start = token.start as usize;
        &self.src[start..start + token.length as usize]
    }

    /// The token bytes as text. Tokens produced by the sublexers are
    /// ASCII-delimited, so this only yields an empty string for stray
    /// non-UTF-8 single-byte tokens.
    pub fn token_text(&self, token: Token) -> &'src str {
        std::str::from_utf8(self.token_value(token)).unwrap_or("")
    }

    /// Text of the token at `pos` in the token list.
    pub fn token_text_at(&self, pos: usize) -> &'src str {
        self.token_text(self.tokens.get(pos))
    }

    /// Classification a single byte would receive: the operator table
    /// takes priority, then the character class.
    pub fn token_kind_of(c: u8) -> TokenKind {
        let single = SINGLE_CHAR_TOKENS[c as usize];
        if single != TokenKind::Unknown {
            return single;
        }
        match CHAR_CLASS[c as usize] {
            CLASS_IDENT_START => TokenKind::Identifier,
            CLASS_DIGIT => TokenKind::NumLiteral,
            CLASS_QUOTE => TokenKind::StrLiteral,
            _ => TokenKind::Unknown,
        }
    }

    /// The borrowed source text.
    pub fn source(&self) -> &'src str {
        self.source
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_comment();

        if self.current_pos >= self.src_length {
            return Token {
                start: self.current_pos,
                length: 0,
                kind: TokenKind::EndOfFile,
                flags: 0,
            };
        }

        let c = self.src[self.current_pos as usize];
        match CHAR_CLASS[c as usize] {
            CLASS_IDENT_START => self.lex_identifier(),
            CLASS_DIGIT => self.lex_number(),
            CLASS_QUOTE => self.lex_string(),
            _ => Token {
                start: self.current_pos,
                length: 1,
                kind: SINGLE_CHAR_TOKENS[c as usize],
                flags: 0,
            },
        }
    }

    /// Advances past whitespace, `//` comments, and `/* */` comments
    /// (not nested), recording line starts along the way. An unterminated
    /// block comment consumes the rest of the input without error.
    fn skip_whitespace_comment(&mut self) {
        let src = self.src;
        let len = self.src_length as usize;
        let mut pos = self.current_pos as usize;

        while pos < len {
            let c = src[pos];
            match CHAR_CLASS[c as usize] {
                CLASS_WHITESPACE => {
                    if c == b'\n' {
                        self.line_starts.push(pos as u32 + 1);
                    }
                    pos += 1;
                }
                CLASS_SLASH => {
                    let next = if pos + 1 < len { src[pos + 1] } else { 0 };
                    if next == b'/' {
                        pos += 2;
                        while pos < len && src[pos] != b'\n' {
                            pos += 1;
                        }
                        // The newline is handled by the whitespace arm.
                    } else if next == b'*' {
                        pos += 2;
                        let mut closed = false;
                        while pos < len {
                            if src[pos] == b'\n' {
                                self.line_starts.push(pos as u32 + 1);
                            }
                            if src[pos] == b'*' && pos + 1 < len && src[pos + 1] == b'/' {
                                pos += 2;
                                closed = true;
                                break;
                            }
                            pos += 1;
                        }
                        if !closed {
                            pos = len;
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }

        self.current_pos = pos as u32;
    }

    fn lex_identifier(&self) -> Token {
        let src = self.src;
        let len = self.src_length as usize;
        let start = self.current_pos as usize;
        let mut flags = 0u8;

        let first = src[start];
        if !(first == b'_' || first == b'@' || first.is_ascii_alphabetic()) {
            flags |= token_flags::INVALID_IDENTIFIER_START;
        }

        let mut current = start + (first == b'@') as usize;
        while current < len {
            let c = src[current];
            if c.is_ascii_alphanumeric() || c == b'_' {
                current += 1;
                continue;
            }
            if !(c.is_ascii_whitespace() || c.is_ascii_punctuation()) {
                flags |= token_flags::INVALID_IDENTIFIER_CHAR;
            }
            break;
        }

        let length = (current - start) as u16;
        let text = &src[start..current];
        for (lexeme, kind) in TOKEN_MAP {
            if lexeme.as_bytes() == text {
                return Token {
                    start: start as u32,
                    length,
                    kind: *kind,
                    flags,
                };
            }
        }

        Token {
            start: start as u32,
            length,
            kind: TokenKind::Identifier,
            flags,
        }
    }

    fn lex_number(&self) -> Token {
        let src = self.src;
        let len = self.src_length as usize;
        let start = self.current_pos as usize;
        let mut current = start;
        let mut flags = 0u8;

        let mut is_hex = false;
        let mut is_bin = false;
        if src[start] == b'0' && start + 1 < len {
            match src[start + 1] | 32 {
                b'x' => {
                    is_hex = true;
                    current = start + 2;
                }
                b'b' => {
                    is_bin = true;
                    current = start + 2;
                }
                _ => {}
            }
        }

        let mut decimal_points = 0u32;
        while current < len {
            let c = src[current];
            let valid = if is_hex {
                c.is_ascii_hexdigit()
            } else if is_bin {
                c == b'0' || c == b'1'
            } else {
                c.is_ascii_digit() || c == b'.'
            };
            if !valid {
                break;
            }
            if c == b'.' {
                decimal_points += 1;
                if decimal_points > 1 {
                    flags |= token_flags::MULTIPLE_DECIMAL_POINTS;
                }
            }
            current += 1;
        }

        if !is_hex && !is_bin && current < len && (src[current] | 32) == b'e' {
            current += 1;
            if current < len && (src[current] == b'+' || src[current] == b'-') {
                current += 1;
            }
            if current < len && src[current].is_ascii_digit() {
                while current < len && src[current].is_ascii_digit() {
                    current += 1;
                }
            } else {
                flags |= token_flags::INVALID_EXPONENT;
            }
        }

        Token {
            start: start as u32,
            length: (current - start) as u16,
            kind: TokenKind::NumLiteral,
            flags,
        }
    }

    fn lex_string(&self) -> Token {
        let src = self.src;
        let len = self.src_length as usize;
        let start = self.current_pos as usize;
        let mut current = start + 1;
        let mut flags = 0u8;
        let mut terminated = false;

        while current < len {
            let c = src[current];
            if c == b'"' {
                current += 1;
                terminated = true;
                break;
            }
            if c == b'\\' {
                let next = if current + 1 < len { src[current + 1] } else { 0 };
                if !VALID_ESCAPES[next as usize] {
                    flags |= token_flags::INVALID_ESCAPE_SEQUENCE;
                    current = (current + 2).min(len);
                    break;
                }
                // `\x` consumes two further bytes.
                current += 2 + if next == b'x' { 2 } else { 0 };
            } else {
                current += 1;
            }
        }
        let current = current.min(len);

        if !terminated {
            flags |= token_flags::UNTERMINATED_STRING;
        }

        Token {
            start: start as u32,
            length: (current - start) as u16,
            kind: TokenKind::StrLiteral,
            flags,
        }
    }
}
