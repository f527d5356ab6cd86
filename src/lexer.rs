//! Hand-rolled lexer for the set-algebra language.
//!
//! The alphabet is small enough that character classes beat a generated
//! automaton: spaces, tabs and newlines separate tokens, every punctuation
//! and operator character (including the uppercase `U` and `I`) is a token
//! by itself, maximal lowercase runs are keywords or identifiers, and
//! maximal digit runs are numbers. Any other character is a lexical error,
//! which aborts tokenization with nothing produced.
//!
//! Numbers must fit in 32 bits. A run with a leading zero splits: `099`
//! lexes as `0` followed by `99`.

use crate::error::LexicalError;
use crate::symtab::SymTab;
use crate::token::{Token, TokenKind};
use log::{debug, trace};

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }

    /// The next token, or `None` at end of input. `pos` only ever advances
    /// by whole tokens, so it stays on a character boundary.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexicalError> {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t' | b'\n') {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return Ok(None);
        }

        let start = self.pos;
        let b = bytes[start];
        if !b.is_ascii() {
            let ch = self.src[start..].chars().next().unwrap_or('\u{fffd}');
            return Err(LexicalError::InvalidCharacter { ch, pos: start });
        }
        let ch = b as char;

        if let Some(kind) = TokenKind::single(ch) {
            self.pos += 1;
            return Ok(Some(Token::new(kind, &self.src[start..self.pos])));
        }

        if ch.is_ascii_lowercase() {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_lowercase() {
                self.pos += 1;
            }
            let word = &self.src[start..self.pos];
            return Ok(Some(match TokenKind::keyword(word) {
                Some(kind) => Token::new(kind, word),
                None => Token::new(TokenKind::Ident, word),
            }));
        }

        if ch.is_ascii_digit() {
            // A zero followed by more digits stands alone.
            if ch == '0' && start + 1 < bytes.len() && bytes[start + 1].is_ascii_digit() {
                self.pos += 1;
                return Ok(Some(Token::number("0", 0)));
            }
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            let run = &self.src[start..self.pos];
            return match run.parse::<u32>() {
                Ok(value) => Ok(Some(Token::number(run, value))),
                Err(_) => Err(LexicalError::NumberOutOfRange {
                    lexeme: run.into(),
                    pos: start,
                }),
            };
        }

        Err(LexicalError::InvalidCharacter { ch, pos: start })
    }
}

/// Tokenizes a whole program and registers every identifier in a fresh
/// symbol table. Fail-fast: the first bad character or oversized number
/// discards the token sequence.
pub fn tokenize(source: &str) -> Result<(Vec<Token>, SymTab), LexicalError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut symtab = SymTab::new();
    while let Some(token) = lexer.next_token()? {
        trace!("token {} {:?}", token.kind, token.lexeme);
        if token.kind == TokenKind::Ident {
            symtab.register(&token.lexeme);
        }
        tokens.push(token);
    }
    debug!("lexed {} tokens, {} identifiers", tokens.len(), symtab.len());
    Ok((tokens, symtab))
}
