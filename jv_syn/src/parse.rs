mod matcher;
mod token_stream;

#[cfg(test)]
mod test;

use crate::keyword::Keyword;
use crate::token_tree::*;
use jv_common::{span::*, DiagnosticLabel, DiagnosticOutput, TracedError};
use std::fmt;

pub use self::{matcher::*, token_stream::*};

#[derive(Debug)]
pub enum ParseError {
    UnexpectedToken(Box<TokenTree>, Option<Matcher>),
    UnexpectedEOF(Matcher, Span),
    InvalidStatement { expr: String, span: Span },
    RepeatedModifier(Keyword, Span),
    IntegerTooLarge(Span),
}

pub type ParseResult<T> = Result<T, TracedError<ParseError>>;

impl Spanned for ParseError {
    fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken(tt, _) => tt.span(),
            ParseError::UnexpectedEOF(_, span) => span,
            ParseError::InvalidStatement { span, .. } => span,
            ParseError::RepeatedModifier(_, span) => span,
            ParseError::IntegerTooLarge(span) => span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken(..) => write!(f, "Unexpected token"),
            ParseError::UnexpectedEOF(..) => write!(f, "Unexpected end of file"),
            ParseError::InvalidStatement { .. } => write!(f, "Invalid statement"),
            ParseError::RepeatedModifier(..) => write!(f, "Repeated modifier"),
            ParseError::IntegerTooLarge(..) => write!(f, "Integer number too large"),
        }
    }
}

impl DiagnosticOutput for ParseError {
    fn label(&self) -> Option<DiagnosticLabel> {
        let text = match self {
            ParseError::UnexpectedToken(tt, Some(expected)) => {
                format!("expected {}, found {}", expected, tt)
            },

            ParseError::UnexpectedToken(tt, None) => format!("unexpected {}", tt),

            ParseError::UnexpectedEOF(expected, _) => {
                format!("expected {} but reached end of sequence", expected)
            },

            ParseError::InvalidStatement { expr, .. } => {
                format!("the expression `{}` is not valid as a statement", expr)
            },

            ParseError::RepeatedModifier(kw, _) => format!("`{}` appears more than once", kw),

            ParseError::IntegerTooLarge(_) => "literal is out of range for its type".to_string(),
        };

        Some(DiagnosticLabel {
            text: Some(text),
            span: self.span().clone(),
        })
    }
}
