use crate::{
    def::{ClassId, FieldId, LocalId, ProcId},
    ty::{ConstValue, Type},
};
use derivative::*;
use jv_common::span::*;
use jv_syn::Annotation;
use std::rc::Rc;

/// What a name in the tree was resolved to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum DeclRef {
    Local(LocalId),
    Field(FieldId),
    Proc(ProcId),
    Class(ClassId),
    Package(Rc<str>),
}

/// Annotation of checked trees. Freshly parsed nodes start out with an unknown type and
/// no declaration, the passes fill these in as they rebuild the tree.
#[derive(Clone, Derivative)]
#[derivative(Debug, PartialEq)]
pub struct Typed {
    #[derivative(Debug = "ignore")]
    #[derivative(PartialEq = "ignore")]
    pub span: Span,

    pub ty: Type,
    pub decl: Option<DeclRef>,
    pub constant: Option<ConstValue>,
}

impl Typed {
    pub fn new(span: Span, ty: Type) -> Self {
        Self {
            span,
            ty,
            decl: None,
            constant: None,
        }
    }

    pub fn with_decl(mut self, decl: DeclRef) -> Self {
        self.decl = Some(decl);
        self
    }

    pub fn with_constant(mut self, constant: Option<ConstValue>) -> Self {
        self.constant = constant;
        self
    }
}

impl From<Span> for Typed {
    fn from(span: Span) -> Self {
        Self::new(span, Type::Unknown)
    }
}

impl Spanned for Typed {
    fn span(&self) -> &Span {
        &self.span
    }
}

impl Annotation for Typed {}
