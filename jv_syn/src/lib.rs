pub mod ast;
pub mod flags;
pub mod ident;
pub mod keyword;
pub mod operators;
pub mod parse;
pub mod token_tree;
pub mod visit;

pub use self::{
    ast::*,
    flags::Flags,
    ident::*,
    keyword::Keyword,
    operators::*,
    parse::{ParseError, ParseResult, TokenStream},
    token_tree::{TokenTree, TokenizeError, TokenizeResult},
};
use jv_common::{span::*, Backtrace, DiagnosticMessage, DiagnosticOutput, TracedError};
use std::{fmt, path::PathBuf};

#[derive(Debug)]
pub enum SyntaxError {
    Tokenize(TracedError<TokenizeError>),
    Parse(TracedError<ParseError>),
}

impl From<TracedError<TokenizeError>> for SyntaxError {
    fn from(err: TracedError<TokenizeError>) -> Self {
        SyntaxError::Tokenize(err)
    }
}

impl From<TracedError<ParseError>> for SyntaxError {
    fn from(err: TracedError<ParseError>) -> Self {
        SyntaxError::Parse(err)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyntaxError::Tokenize(err) => write!(f, "{}", err),
            SyntaxError::Parse(err) => write!(f, "{}", err),
        }
    }
}

impl DiagnosticOutput for SyntaxError {
    fn main(&self) -> DiagnosticMessage {
        match self {
            SyntaxError::Tokenize(err) => err.main(),
            SyntaxError::Parse(err) => err.main(),
        }
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            SyntaxError::Tokenize(err) => err.backtrace(),
            SyntaxError::Parse(err) => err.backtrace(),
        }
    }
}

/// Tokenizes and parses one source file.
pub fn parse_unit<A: Annotation>(file: impl Into<PathBuf>, source: &str) -> Result<Unit<A>, SyntaxError> {
    let file = file.into();
    let tokens = TokenTree::tokenize(file.clone(), source)?;

    let mut stream = TokenStream::new(tokens, Span::zero(file.clone()));
    let unit = Unit::parse(&mut stream, file)?;
    stream.finish()?;

    Ok(unit)
}
