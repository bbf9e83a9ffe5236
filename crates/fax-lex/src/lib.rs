//! fax-lex - the lexer (§4.1) and token model (§3.1, §6.1).
//!
//! A single pass over the source bytes produces an immutable token
//! stream. The lexer is byte-oriented rather than UTF-8-aware: source
//! is treated as ASCII punctuation/keywords/digits plus opaque payload
//! bytes inside identifiers and string literals, matching the "UTF-
//! oblivious byte stream" wording in §4.1.

mod cursor;
#[cfg(feature = "serde")]
mod dump;
mod token;

pub use token::{Token, TokenKind, TokenValue};

#[cfg(feature = "serde")]
pub use dump::{tokens_from_json, tokens_to_json};

use cursor::Cursor;
use fax_util::{FaxError, Span};

/// Lex `source` completely, returning every token up to and including a
/// trailing `END_OF_FILE` token, or the first [`FaxError`] encountered.
///
/// Per §4.1: on an unclassifiable first character the lexer reports
/// `(line, column)` and stops — there is no error-recovery/resync mode,
/// unlike some hand-written lexers that skip and continue.
pub fn lex(source: &str) -> Result<Vec<Token>, FaxError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = tok.kind == TokenKind::EndOfFile;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

/// Owns the cursor over the source text.
struct Lexer<'a> {
    cursor: Cursor<'a>,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("function", TokenKind::Function),
    ("let", TokenKind::Let),
    ("const", TokenKind::Const),
    ("if", TokenKind::If),
    ("elseif", TokenKind::ElseIf),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("return", TokenKind::Return),
    ("import", TokenKind::Import),
    ("as", TokenKind::As),
    ("true", TokenKind::BoolLiteral),
    ("false", TokenKind::BoolLiteral),
    ("nothing", TokenKind::NothingLiteral),
];

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    fn next_token(&mut self) -> Result<Token, FaxError> {
        self.skip_trivia();
        let span = self.cursor.span();

        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(TokenKind::EndOfFile, TokenValue::Absent, span));
        };

        if c == b'_' || c == b'$' || c.is_ascii_alphabetic() {
            return Ok(self.lex_identifier_or_keyword(span));
        }
        if c.is_ascii_digit() {
            return Ok(self.lex_number(span));
        }
        if c == b'\'' || c == b'"' {
            return self.lex_string(span, c);
        }
        self.lex_operator(span)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.cursor.bump();
                }
                Some(b'#') => {
                    while let Some(c) = self.cursor.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.cursor.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_identifier_or_keyword(&mut self, span: Span) -> Token {
        let start = self.cursor.pos();
        while let Some(c) = self.cursor.peek() {
            if c == b'_' || c == b'$' || c.is_ascii_alphanumeric() {
                self.cursor.bump();
            } else {
                break;
            }
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        for (kw, kind) in KEYWORDS {
            if *kw == text {
                let value = match kind {
                    TokenKind::BoolLiteral => TokenValue::Bool(text == "true"),
                    _ => TokenValue::Absent,
                };
                return Token::new(*kind, value, span);
            }
        }
        Token::new(
            TokenKind::Identifier,
            TokenValue::String(text.to_string()),
            span,
        )
    }

    fn lex_number(&mut self, span: Span) -> Token {
        let start = self.cursor.pos();
        while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
            self.cursor.bump();
        }
        let mut is_float = false;
        if self.cursor.peek() == Some(b'.') && matches!(self.cursor.peek_at(1), Some(c) if c.is_ascii_digit())
        {
            is_float = true;
            self.cursor.bump();
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                self.cursor.bump();
            }
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        if is_float {
            let v: f64 = text.parse().expect("number grammar guarantees valid float");
            Token::new(TokenKind::FloatLiteral, TokenValue::Float(v), span)
        } else {
            let v: i64 = text.parse().expect("number grammar guarantees valid int");
            Token::new(TokenKind::IntLiteral, TokenValue::Int(v), span)
        }
    }

    fn lex_string(&mut self, span: Span, quote: u8) -> Result<Token, FaxError> {
        self.cursor.bump();
        let start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(FaxError::lex(span, "unterminated string literal"));
                }
                Some(c) if c == quote => {
                    let text = self.cursor.slice(start, self.cursor.pos()).to_string();
                    self.cursor.bump();
                    return Ok(Token::new(
                        TokenKind::StringLiteral,
                        TokenValue::String(text),
                        span,
                    ));
                }
                _ => {
                    self.cursor.bump();
                }
            }
        }
    }

    fn lex_operator(&mut self, span: Span) -> Result<Token, FaxError> {
        // Greedy-longest-match per first character (§4.1): try two-byte
        // operators before falling back to one-byte ones.
        let two = self.cursor.peek_str(2);
        let one = self.cursor.peek_str(1);

        let (len, kind) = if let Some(k) = two.as_deref().and_then(two_char_kind) {
            (2, Some(k))
        } else if let Some(k) = one.as_deref().and_then(one_char_kind) {
            (1, Some(k))
        } else {
            (0, None)
        };

        match kind {
            Some(k) => {
                for _ in 0..len {
                    self.cursor.bump();
                }
                Ok(Token::new(k, TokenValue::Absent, span))
            }
            None => {
                let c = self.cursor.peek().unwrap();
                Err(FaxError::lex(
                    span,
                    format!("unexpected character '{}'", c as char),
                ))
            }
        }
    }
}

fn two_char_kind(s: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match s {
        ".." => DotDot,
        "==" => EqEq,
        "!=" => BangEq,
        "<=" => LtEq,
        ">=" => GtEq,
        "+=" => PlusEq,
        "-=" => MinusEq,
        "*=" => StarEq,
        "/=" => SlashEq,
        "%=" => PercentEq,
        _ => return None,
    })
}

fn one_char_kind(s: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match s {
        "." => Dot,
        "," => Comma,
        ":" => Colon,
        ";" => Semicolon,
        "=" => Eq,
        "!" => Bang,
        "<" => Lt,
        ">" => Gt,
        "+" => Plus,
        "-" => Minus,
        "*" => Star,
        "/" => Slash,
        "%" => Percent,
        "&" => Amp,
        "|" => Pipe,
        "(" => LParen,
        ")" => RParen,
        "[" => LBracket,
        "]" => RBracket,
        "{" => LBrace,
        "}" => RBrace,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fax_util::ErrorKind;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn hello_program() {
        let toks = kinds("function main() print(\"hello\"); ..");
        use TokenKind::*;
        assert_eq!(
            toks,
            vec![
                Function, Identifier, LParen, RParen, Identifier, LParen, StringLiteral, RParen,
                Semicolon, DotDot, EndOfFile
            ]
        );
    }

    #[test]
    fn numbers_and_float_promotion() {
        let toks = lex("1 + 2.0").unwrap();
        assert_eq!(toks[0].kind, TokenKind::IntLiteral);
        assert_eq!(toks[0].value, TokenValue::Int(1));
        assert_eq!(toks[2].kind, TokenKind::FloatLiteral);
        assert_eq!(toks[2].value, TokenValue::Float(2.0));
    }

    #[test]
    fn dot_dot_is_not_two_dots() {
        let toks = kinds("..");
        assert_eq!(toks, vec![TokenKind::DotDot, TokenKind::EndOfFile]);
    }

    #[test]
    fn comment_to_end_of_line_is_skipped() {
        let toks = kinds("let x = 1; # comment\nlet y = 2;");
        assert_eq!(toks.iter().filter(|k| **k == TokenKind::Let).count(), 2);
    }

    #[test]
    fn unterminated_string_is_lex_error() {
        let err = lex("\"abc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
    }

    #[test]
    fn unclassifiable_character_is_lex_error() {
        let err = lex("let x = @;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.span, Span::new(1, 9));
    }

    #[test]
    fn compound_assign_operators() {
        let toks = kinds("+= -= *= /= %=");
        use TokenKind::*;
        assert_eq!(toks, vec![PlusEq, MinusEq, StarEq, SlashEq, PercentEq, EndOfFile]);
    }

    #[test]
    fn string_literal_is_verbatim() {
        let toks = lex("'a\\nb'").unwrap();
        assert_eq!(toks[0].value, TokenValue::String("a\\nb".to_string()));
    }

    #[test]
    fn line_column_tracking() {
        let toks = lex("let\nx").unwrap();
        assert_eq!(toks[0].span, Span::new(1, 1));
        assert_eq!(toks[1].span, Span::new(2, 1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn dump_then_relex_matches_direct_lex() {
        let src = r#"function main() let x = 1 + 2.5; print("hi"); ..  "#;
        let direct = lex(src).unwrap();
        let json = tokens_to_json(&direct);
        let restored = tokens_from_json(&json).unwrap();
        assert_eq!(direct, restored);
    }
}
