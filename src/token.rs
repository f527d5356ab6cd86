//! Tokens of the set-algebra language.
//!
//! A [`TokenKind`] is the exact terminal symbol the parsing table is keyed
//! by (`let`, `.`, `id`, `num`, ...), not a broader category; the lexeme
//! keeps the source spelling. Number tokens additionally carry their parsed
//! value.

use serde::ser::{Serialize, SerializeMap, Serializer};
use smartstring::alias::String;
use std::fmt;

/// Terminal symbols, one per column of the ACTION table plus `simplify`
/// (which never reaches the parser, see the pipeline's pre-parse rewrite)
/// and the synthesized end marker `$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Let,
    Be,
    Show,
    Int,
    Set,
    Simplify,
    Ident,
    Number,
    Period,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Colon,
    Plus,
    Minus,
    Asterisk,
    Union,
    Intersect,
    At,
    Less,
    Greater,
    Equals,
    Ampersand,
    VerticalBar,
    Bang,
    End,
}

impl TokenKind {
    /// Number of kinds, for dense per-kind table rows.
    pub const COUNT: usize = TokenKind::End as usize + 1;

    /// The terminal symbol as it appears in table headers and serialized
    /// token lists.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Let => "let",
            TokenKind::Be => "be",
            TokenKind::Show => "show",
            TokenKind::Int => "int",
            TokenKind::Set => "set",
            TokenKind::Simplify => "simplify",
            TokenKind::Ident => "id",
            TokenKind::Number => "num",
            TokenKind::Period => ".",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Colon => ":",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Union => "U",
            TokenKind::Intersect => "I",
            TokenKind::At => "@",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Equals => "=",
            TokenKind::Ampersand => "&",
            TokenKind::VerticalBar => "|",
            TokenKind::Bang => "!",
            TokenKind::End => "$",
        }
    }

    /// Inverse of [`as_str`](Self::as_str), used when reading table column
    /// headers.
    pub fn from_symbol(sym: &str) -> Option<TokenKind> {
        Some(match sym {
            "let" => TokenKind::Let,
            "be" => TokenKind::Be,
            "show" => TokenKind::Show,
            "int" => TokenKind::Int,
            "set" => TokenKind::Set,
            "simplify" => TokenKind::Simplify,
            "id" => TokenKind::Ident,
            "num" => TokenKind::Number,
            "." => TokenKind::Period,
            "(" => TokenKind::LeftParen,
            ")" => TokenKind::RightParen,
            "{" => TokenKind::LeftBrace,
            "}" => TokenKind::RightBrace,
            ":" => TokenKind::Colon,
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "*" => TokenKind::Asterisk,
            "U" => TokenKind::Union,
            "I" => TokenKind::Intersect,
            "@" => TokenKind::At,
            "<" => TokenKind::Less,
            ">" => TokenKind::Greater,
            "=" => TokenKind::Equals,
            "&" => TokenKind::Ampersand,
            "|" => TokenKind::VerticalBar,
            "!" => TokenKind::Bang,
            "$" => TokenKind::End,
            _ => return None,
        })
    }

    /// Maps a reserved word to its keyword kind.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "let" => TokenKind::Let,
            "be" => TokenKind::Be,
            "show" => TokenKind::Show,
            "int" => TokenKind::Int,
            "set" => TokenKind::Set,
            "simplify" => TokenKind::Simplify,
            _ => return None,
        })
    }

    /// Maps a single-character punctuation or operator to its kind. `U` and
    /// `I` are the two uppercase letters that are tokens rather than errors.
    pub fn single(c: char) -> Option<TokenKind> {
        Some(match c {
            '.' => TokenKind::Period,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ':' => TokenKind::Colon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            'U' => TokenKind::Union,
            'I' => TokenKind::Intersect,
            '@' => TokenKind::At,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '=' => TokenKind::Equals,
            '&' => TokenKind::Ampersand,
            '|' => TokenKind::VerticalBar,
            '!' => TokenKind::Bang,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One lexed token. Immutable once produced, except for the pipeline's
/// `simplify` reclassification which rewrites `kind` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// Parsed value for `num` tokens, `None` for everything else.
    pub value: Option<u32>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            value: None,
        }
    }

    pub fn number(lexeme: impl Into<String>, value: u32) -> Self {
        Token {
            kind: TokenKind::Number,
            lexeme: lexeme.into(),
            value: Some(value),
        }
    }
}

// Serialized token lists carry kind and lexeme only, matching the
// `lexer_out.json` artifact shape.
impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("token", self.kind.as_str())?;
        map.serialize_entry("lexeme", self.lexeme.as_str())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_round_trip() {
        for kind in [
            TokenKind::Let,
            TokenKind::Show,
            TokenKind::Ident,
            TokenKind::Number,
            TokenKind::Period,
            TokenKind::Union,
            TokenKind::Bang,
            TokenKind::End,
        ] {
            assert_eq!(TokenKind::from_symbol(kind.as_str()), Some(kind));
        }
        assert_eq!(TokenKind::from_symbol("nope"), None);
    }

    #[test]
    fn uppercase_set_operators_are_single_char_tokens() {
        assert_eq!(TokenKind::single('U'), Some(TokenKind::Union));
        assert_eq!(TokenKind::single('I'), Some(TokenKind::Intersect));
        assert_eq!(TokenKind::single('X'), None);
    }

    #[test]
    fn keywords_are_exact_matches() {
        assert_eq!(TokenKind::keyword("let"), Some(TokenKind::Let));
        assert_eq!(TokenKind::keyword("simplify"), Some(TokenKind::Simplify));
        assert_eq!(TokenKind::keyword("lets"), None);
    }

    #[test]
    fn tokens_serialize_as_kind_lexeme_pairs() {
        let t = Token::number("42", 42);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v, serde_json::json!({"token": "num", "lexeme": "42"}));
    }
}
