use crate::{keyword::*, operators::*, token_tree::*};
use std::fmt;

#[derive(Clone, Debug)]
pub enum Matcher {
    Keyword(Keyword),
    Operator(Operator),
    Separator(Separator),
    Delimited(DelimiterPair),
    AnyIdent,
    AnyLiteral,
    PrimitiveType,
    ExprOperandStart,
    StmtStart,
    OneOf(Vec<Matcher>),
}

impl From<Operator> for Matcher {
    fn from(op: Operator) -> Self {
        Matcher::Operator(op)
    }
}

impl From<Separator> for Matcher {
    fn from(sep: Separator) -> Self {
        Matcher::Separator(sep)
    }
}

impl From<DelimiterPair> for Matcher {
    fn from(delim: DelimiterPair) -> Self {
        Matcher::Delimited(delim)
    }
}

impl From<Keyword> for Matcher {
    fn from(keyword: Keyword) -> Self {
        Matcher::Keyword(keyword)
    }
}

pub trait MatchOneOf {
    fn or(self, next: impl Into<Matcher>) -> Matcher;
}

impl<M: Into<Matcher>> MatchOneOf for M {
    fn or(self, next: impl Into<Matcher>) -> Matcher {
        self.into().or(next.into())
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Matcher::Keyword(kw) => write!(f, "`{}`", kw),
            Matcher::Operator(op) => write!(f, "`{}`", op),
            Matcher::Separator(sep) => write!(f, "`{}`", sep),
            Matcher::Delimited(delim) => write!(f, "{}-delimited group", delim),
            Matcher::AnyIdent => write!(f, "identifier"),
            Matcher::AnyLiteral => write!(f, "literal"),
            Matcher::PrimitiveType => write!(f, "primitive type"),
            Matcher::ExprOperandStart => write!(f, "expression"),
            Matcher::StmtStart => write!(f, "statement"),
            Matcher::OneOf(matchers) => write!(
                f,
                "one of: {}",
                matchers
                    .iter()
                    .map(|matcher| format!("{}", matcher))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

impl Matcher {
    pub fn is_match(&self, token: &TokenTree) -> bool {
        match self {
            Matcher::Separator(sep) => token.is_separator(*sep),
            Matcher::Delimited(delim) => token.is_delimited(*delim),
            Matcher::Keyword(kw) => token.is_keyword(*kw),
            Matcher::Operator(op) => token.is_operator(*op),
            Matcher::AnyIdent => token.as_ident().is_some(),
            Matcher::AnyLiteral => token.is_literal(),
            Matcher::PrimitiveType => token
                .as_keyword()
                .map(|kw| kw.is_primitive_type())
                .unwrap_or(false),
            Matcher::ExprOperandStart => {
                token.is_literal()
                    || token.as_ident().is_some()
                    || token.is_delimited(DelimiterPair::Bracket)
                    || matches!(token.as_keyword(), Some(Keyword::This | Keyword::Super | Keyword::New))
            },
            Matcher::StmtStart => true,
            Matcher::OneOf(matchers) => matchers.iter().any(|matcher| matcher.is_match(token)),
        }
    }

    pub fn or(self, or: impl Into<Matcher>) -> Matcher {
        match (self, or.into()) {
            (Matcher::OneOf(mut options), Matcher::OneOf(others)) => {
                options.extend(others);
                Matcher::OneOf(options)
            },

            (Matcher::OneOf(mut options), other) => {
                options.push(other);
                Matcher::OneOf(options)
            },

            (this, Matcher::OneOf(mut others)) => {
                others.insert(0, this);
                Matcher::OneOf(others)
            },

            (this, other) => Matcher::OneOf(vec![this, other]),
        }
    }
}
