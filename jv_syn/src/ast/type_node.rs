use crate::{ast::*, ident::*, keyword::Keyword, parse::*, token_tree::*};
use jv_common::span::*;
use std::{fmt, rc::Rc};

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum PrimitiveKind {
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub fn from_keyword(kw: Keyword) -> Option<Self> {
        match kw {
            Keyword::Void => Some(PrimitiveKind::Void),
            Keyword::Boolean => Some(PrimitiveKind::Boolean),
            Keyword::Byte => Some(PrimitiveKind::Byte),
            Keyword::Short => Some(PrimitiveKind::Short),
            Keyword::Char => Some(PrimitiveKind::Char),
            Keyword::Int => Some(PrimitiveKind::Int),
            Keyword::Long => Some(PrimitiveKind::Long),
            Keyword::Float => Some(PrimitiveKind::Float),
            Keyword::Double => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub enum TypeNode<A: Annotation> {
    Primitive(Rc<PrimitiveTypeNode<A>>),
    Array(Rc<ArrayTypeNode<A>>),
    Ambiguous(Rc<AmbTypeNode<A>>),
    Canonical(Rc<CanonicalTypeNode<A>>),
}

node_category!(TypeNode {
    Primitive,
    Array,
    Ambiguous,
    Canonical
});

#[derive(Clone, Debug)]
pub struct PrimitiveTypeNode<A: Annotation> {
    pub kind: PrimitiveKind,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct ArrayTypeNode<A: Annotation> {
    pub elem: TypeNode<A>,
    pub annotation: A,
}

/// A type written as a possibly-qualified name that hasn't been resolved yet.
#[derive(Clone, Debug)]
pub struct AmbTypeNode<A: Annotation> {
    pub prefix: Option<Prefix<A>>,
    pub name: Ident,
    pub annotation: A,
}

/// A type node that refers to a resolved type. The annotation carries the type itself.
#[derive(Clone, Debug)]
pub struct CanonicalTypeNode<A: Annotation> {
    pub name: Rc<str>,
    pub annotation: A,
}

impl<A: Annotation> TypeNode<A> {
    pub fn primitive(kind: PrimitiveKind, span: Span) -> Self {
        TypeNode::Primitive(Rc::new(PrimitiveTypeNode {
            kind,
            annotation: A::from(span),
        }))
    }

    pub fn array_of(elem: Self, span: Span) -> Self {
        TypeNode::Array(Rc::new(ArrayTypeNode {
            elem,
            annotation: A::from(span),
        }))
    }

    pub fn canonical(name: impl Into<Rc<str>>, annotation: A) -> Self {
        TypeNode::Canonical(Rc::new(CanonicalTypeNode {
            name: name.into(),
            annotation,
        }))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, TypeNode::Ambiguous(..))
    }

    pub fn is_void(&self) -> bool {
        match self {
            TypeNode::Primitive(prim) => prim.kind == PrimitiveKind::Void,
            _ => false,
        }
    }

    /// Parses a type, including any trailing `[]` dimensions.
    pub fn parse(tokens: &mut TokenStream) -> ParseResult<Self> {
        let base = Self::parse_base(tokens)?;
        Ok(Self::parse_dims(base, tokens))
    }

    /// Parses a primitive type or a dotted type name without array dimensions.
    pub fn parse_base(tokens: &mut TokenStream) -> ParseResult<Self> {
        let matcher = Matcher::AnyIdent.or(Matcher::PrimitiveType);
        match tokens.match_one(matcher.clone())? {
            TokenTree::Keyword { kw, span } => match PrimitiveKind::from_keyword(kw) {
                Some(kind) => Ok(Self::primitive(kind, span)),
                None => unreachable!("{} not covered by matcher {}", kw, matcher),
            },

            TokenTree::Ident(first) => {
                let rest = parse_name_tail(tokens)?;
                let (qualifiers, name) = split_qualified(first, rest);
                Ok(Self::from_qualified(&qualifiers, name))
            },

            unhandled => unreachable!("{} not covered by matcher {}", unhandled, matcher),
        }
    }

    pub fn parse_dims(mut ty: Self, tokens: &mut TokenStream) -> Self {
        while let Some(TokenTree::Delimited(group)) = tokens.current() {
            if group.delim != DelimiterPair::SquareBracket || !group.inner.is_empty() {
                break;
            }
            let span = ty.span().to(&group.span);
            tokens.advance(1);
            ty = Self::array_of(ty, span);
        }
        ty
    }

    pub fn from_qualified(qualifiers: &[Ident], name: Ident) -> Self {
        let prefix = Prefix::from_name_parts(qualifiers);
        let span = match &prefix {
            Some(prefix) => prefix.span().to(&name),
            None => name.span.clone(),
        };

        TypeNode::Ambiguous(Rc::new(AmbTypeNode {
            prefix,
            name,
            annotation: A::from(span),
        }))
    }
}

impl<A: Annotation> fmt::Display for TypeNode<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeNode::Primitive(prim) => write!(f, "{}", prim.kind),
            TypeNode::Array(array) => write!(f, "{}[]", array.elem),
            TypeNode::Ambiguous(amb) => match &amb.prefix {
                Some(prefix) => write!(f, "{}.{}", prefix, amb.name),
                None => write!(f, "{}", amb.name),
            },
            TypeNode::Canonical(canonical) => f.write_str(&canonical.name),
        }
    }
}
