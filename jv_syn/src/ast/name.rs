use crate::{ast::*, ident::*, parse::*, token_tree::*};
use jv_common::span::*;
use std::{fmt, rc::Rc};

/// Whatever can appear to the left of a `.`: an expression, a type or a package.
#[derive(Clone, Debug)]
pub enum Prefix<A: Annotation> {
    Expr(Rc<ExprPrefix<A>>),
    Type(Rc<TypePrefix<A>>),
    Package(Rc<PackageNode<A>>),
    Ambiguous(Rc<AmbPrefix<A>>),
}

node_category!(Prefix {
    Expr,
    Type,
    Package,
    Ambiguous
});

#[derive(Clone, Debug)]
pub struct ExprPrefix<A: Annotation> {
    pub expr: Expr<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct TypePrefix<A: Annotation> {
    pub ty: TypeNode<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct PackageNode<A: Annotation> {
    pub name: IdentPath,
    pub annotation: A,
}

/// A dotted name component which could still be a variable, a type or a package.
#[derive(Clone, Debug)]
pub struct AmbPrefix<A: Annotation> {
    pub prefix: Option<Prefix<A>>,
    pub name: Ident,
    pub annotation: A,
}

impl<A: Annotation> Prefix<A> {
    pub fn expr(expr: Expr<A>) -> Self {
        let annotation = expr.annotation().clone();
        Prefix::Expr(Rc::new(ExprPrefix { expr, annotation }))
    }

    pub fn ty(ty: TypeNode<A>) -> Self {
        let annotation = ty.annotation().clone();
        Prefix::Type(Rc::new(TypePrefix { ty, annotation }))
    }

    pub fn package(name: IdentPath, annotation: A) -> Self {
        Prefix::Package(Rc::new(PackageNode { name, annotation }))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Prefix::Ambiguous(..))
    }

    /// Builds the left-nested chain of ambiguous prefixes for a dotted name.
    pub fn from_name_parts(parts: &[Ident]) -> Option<Self> {
        let mut prefix: Option<Self> = None;
        for part in parts {
            let span = match &prefix {
                Some(prefix) => prefix.span().to(part),
                None => part.span.clone(),
            };

            prefix = Some(Prefix::Ambiguous(Rc::new(AmbPrefix {
                prefix,
                name: part.clone(),
                annotation: A::from(span),
            })));
        }
        prefix
    }
}

impl<A: Annotation> fmt::Display for Prefix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Prefix::Expr(expr) => write!(f, "{}", expr.expr),
            Prefix::Type(ty) => write!(f, "{}", ty.ty),
            Prefix::Package(package) => write!(f, "{}", package.name),
            Prefix::Ambiguous(amb) => match &amb.prefix {
                Some(prefix) => write!(f, "{}.{}", prefix, amb.name),
                None => write!(f, "{}", amb.name),
            },
        }
    }
}

/// Consumes any `.ident` parts following a name that has already been matched.
pub fn parse_name_tail(tokens: &mut TokenStream) -> ParseResult<Vec<Ident>> {
    let mut parts = Vec::new();
    while tokens.peek_sequence(&[Matcher::Separator(Separator::Dot), Matcher::AnyIdent]) {
        tokens.advance(1);
        let part = tokens.match_one(Matcher::AnyIdent)?;
        parts.extend(part.as_ident().cloned());
    }
    Ok(parts)
}

/// Splits `first.rest...` into its qualifying parts and the final name.
pub fn split_qualified(first: Ident, mut rest: Vec<Ident>) -> (Vec<Ident>, Ident) {
    match rest.pop() {
        Some(last) => {
            let mut qualifiers = vec![first];
            qualifiers.extend(rest);
            (qualifiers, last)
        },
        None => (Vec::new(), first),
    }
}

pub fn parse_ident_path(tokens: &mut TokenStream) -> ParseResult<IdentPath> {
    let first = tokens.match_one(Matcher::AnyIdent)?;
    let mut parts: Vec<Ident> = first.as_ident().cloned().into_iter().collect();
    parts.extend(parse_name_tail(tokens)?);
    Ok(IdentPath::from_parts(parts))
}
