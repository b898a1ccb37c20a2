use crate::{ident::Ident, keyword::Keyword, operators::Operator};
use jv_common::{span::*, DiagnosticLabel, DiagnosticOutput, TracedError};
use std::{fmt, path::PathBuf, rc::Rc};

mod lex;

#[cfg(test)]
mod test;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum DelimiterPair {
    Brace,
    Bracket,
    SquareBracket,
}

impl DelimiterPair {
    pub fn tokens(&self) -> (&str, &str) {
        match self {
            DelimiterPair::Brace => ("{", "}"),
            DelimiterPair::Bracket => ("(", ")"),
            DelimiterPair::SquareBracket => ("[", "]"),
        }
    }
}

impl fmt::Display for DelimiterPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DelimiterPair::Brace => "{}",
                DelimiterPair::SquareBracket => "[]",
                DelimiterPair::Bracket => "()",
            }
        )
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Separator {
    Semicolon,
    Comma,
    Colon,
    Dot,
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Separator::Colon => ':',
                Separator::Comma => ',',
                Separator::Semicolon => ';',
                Separator::Dot => '.',
            }
        )
    }
}

#[derive(Clone, Debug)]
pub enum TokenTree {
    Ident(Ident),
    IntNumber {
        value: u64,
        long: bool,
        radix: u32,
        span: Span,
    },
    RealNumber {
        value: f64,
        float: bool,
        span: Span,
    },
    Char {
        value: char,
        span: Span,
    },
    String {
        value: Rc<str>,
        span: Span,
    },
    Keyword {
        kw: Keyword,
        span: Span,
    },
    Operator {
        op: Operator,
        span: Span,
    },
    Separator {
        sep: Separator,
        span: Span,
    },
    Delimited(DelimitedGroup),
}

#[derive(Clone, Debug)]
pub struct DelimitedGroup {
    pub delim: DelimiterPair,
    pub inner: Vec<TokenTree>,
    pub open: Span,
    pub close: Span,
    pub span: Span,
}

impl PartialEq for TokenTree {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TokenTree::Ident(a), TokenTree::Ident(b)) => a == b,
            (
                TokenTree::IntNumber { value: a, long: la, .. },
                TokenTree::IntNumber { value: b, long: lb, .. },
            ) => a == b && la == lb,
            (
                TokenTree::RealNumber { value: a, float: fa, .. },
                TokenTree::RealNumber { value: b, float: fb, .. },
            ) => a.to_bits() == b.to_bits() && fa == fb,
            (TokenTree::Char { value: a, .. }, TokenTree::Char { value: b, .. }) => a == b,
            (TokenTree::String { value: a, .. }, TokenTree::String { value: b, .. }) => a == b,
            (TokenTree::Keyword { kw: a, .. }, TokenTree::Keyword { kw: b, .. }) => a == b,
            (TokenTree::Operator { op: a, .. }, TokenTree::Operator { op: b, .. }) => a == b,
            (TokenTree::Separator { sep: a, .. }, TokenTree::Separator { sep: b, .. }) => a == b,
            (TokenTree::Delimited(a), TokenTree::Delimited(b)) => {
                a.delim == b.delim && a.inner == b.inner
            },
            _ => false,
        }
    }
}

impl TokenTree {
    pub fn tokenize(file_name: impl Into<PathBuf>, source: &str) -> TokenizeResult<Vec<Self>> {
        lex::lex(file_name, source)
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            TokenTree::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn is_ident(&self, name: &str) -> bool {
        match self {
            TokenTree::Ident(ident) => ident.as_str() == name,
            _ => false,
        }
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            TokenTree::Keyword { kw, .. } => Some(*kw),
            _ => None,
        }
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.as_keyword() == Some(kw)
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            TokenTree::Operator { op, .. } => Some(*op),
            _ => None,
        }
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        self.as_operator() == Some(op)
    }

    pub fn is_separator(&self, sep: Separator) -> bool {
        match self {
            TokenTree::Separator { sep: token_sep, .. } => *token_sep == sep,
            _ => false,
        }
    }

    pub fn as_delimited(&self) -> Option<&DelimitedGroup> {
        match self {
            TokenTree::Delimited(group) => Some(group),
            _ => None,
        }
    }

    pub fn is_delimited(&self, delim: DelimiterPair) -> bool {
        match self {
            TokenTree::Delimited(group) => group.delim == delim,
            _ => false,
        }
    }

    pub fn is_literal(&self) -> bool {
        match self {
            TokenTree::IntNumber { .. }
            | TokenTree::RealNumber { .. }
            | TokenTree::Char { .. }
            | TokenTree::String { .. } => true,
            TokenTree::Keyword { kw, .. } => {
                matches!(kw, Keyword::True | Keyword::False | Keyword::Null)
            },
            _ => false,
        }
    }
}

impl Spanned for TokenTree {
    fn span(&self) -> &Span {
        match self {
            TokenTree::Ident(ident) => &ident.span,
            TokenTree::IntNumber { span, .. } => span,
            TokenTree::RealNumber { span, .. } => span,
            TokenTree::Char { span, .. } => span,
            TokenTree::String { span, .. } => span,
            TokenTree::Keyword { span, .. } => span,
            TokenTree::Operator { span, .. } => span,
            TokenTree::Separator { span, .. } => span,
            TokenTree::Delimited(group) => &group.span,
        }
    }
}

impl fmt::Display for TokenTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenTree::Ident(ident) => write!(f, "identifier `{}`", ident),
            TokenTree::IntNumber { value, long, .. } => {
                write!(f, "integer literal `{}{}`", value, if *long { "L" } else { "" })
            },
            TokenTree::RealNumber { value, .. } => write!(f, "floating point literal `{}`", value),
            TokenTree::Char { value, .. } => write!(f, "character literal `{:?}`", value),
            TokenTree::String { value, .. } => write!(f, "string literal {:?}", value),
            TokenTree::Keyword { kw, .. } => write!(f, "keyword `{}`", kw),
            TokenTree::Operator { op, .. } => write!(f, "operator `{}`", op),
            TokenTree::Separator { sep, .. } => write!(f, "`{}`", sep),
            TokenTree::Delimited(group) => {
                let (open, close) = group.delim.tokens();
                write!(f, "`{}`...`{}`", open, close)
            },
        }
    }
}

#[derive(Debug)]
pub enum TokenizeError {
    IllegalToken(Span),
    UnterminatedLiteral(Span),
    UnterminatedComment(Span),
    IntegerTooLarge(Span),
    UnmatchedDelimiter {
        delim: DelimiterPair,
        to_match: Span,
        span: Span,
    },
    UnexpectedCloseDelimited {
        delim: DelimiterPair,
        span: Span,
    },
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenizeError::IllegalToken(_) => write!(f, "Illegal token"),
            TokenizeError::UnterminatedLiteral(_) => write!(f, "Unterminated literal"),
            TokenizeError::UnterminatedComment(_) => write!(f, "Unterminated comment"),
            TokenizeError::IntegerTooLarge(_) => write!(f, "Integer number too large"),

            TokenizeError::UnmatchedDelimiter { delim, to_match, .. } => {
                write!(f, "unmatched {} delimiter from {}", delim, to_match)
            },

            TokenizeError::UnexpectedCloseDelimited { delim, .. } => {
                write!(f, "unexpected {} close delimiter", delim)
            },
        }
    }
}

impl Spanned for TokenizeError {
    fn span(&self) -> &Span {
        match self {
            TokenizeError::IllegalToken(span) => span,
            TokenizeError::UnterminatedLiteral(span) => span,
            TokenizeError::UnterminatedComment(span) => span,
            TokenizeError::IntegerTooLarge(span) => span,
            TokenizeError::UnmatchedDelimiter { span, .. } => span,
            TokenizeError::UnexpectedCloseDelimited { span, .. } => span,
        }
    }
}

impl DiagnosticOutput for TokenizeError {
    fn label(&self) -> Option<DiagnosticLabel> {
        Some(DiagnosticLabel {
            text: None,
            span: self.span().clone(),
        })
    }
}

pub type TokenizeResult<T> = Result<T, TracedError<TokenizeError>>;
