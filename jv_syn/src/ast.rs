pub mod class;
pub mod expr;
pub mod literal;
pub mod name;
pub mod stmt;
pub mod type_node;
pub mod unit;

pub use self::{class::*, expr::*, literal::*, name::*, stmt::*, type_node::*, unit::*};
use jv_common::span::*;
use std::fmt;

/// Per-node data attached by whichever stage produced the tree. Parsing produces nodes
/// annotated directly from their spans, later stages replace the annotations.
pub trait Annotation: Spanned + Clone + fmt::Debug + From<Span> {}

impl Annotation for Span {}

/// Implements the shared accessors of a node category enum whose variants each wrap an
/// `Rc` of a node struct with a public `annotation` field. Nodes of a category compare
/// by identity.
macro_rules! node_category {
    ($category:ident { $($variant:ident),* $(,)? }) => {
        impl<A: Annotation> $category<A> {
            pub fn annotation(&self) -> &A {
                match self {
                    $($category::$variant(node) => &node.annotation,)*
                }
            }

            pub fn with_annotation(&self, annotation: A) -> Self {
                match self {
                    $($category::$variant(node) => {
                        let mut node = (**node).clone();
                        node.annotation = annotation;
                        $category::$variant(std::rc::Rc::new(node))
                    },)*
                }
            }

            pub fn ptr_eq(&self, other: &Self) -> bool {
                #[allow(unreachable_patterns)]
                match (self, other) {
                    $(($category::$variant(a), $category::$variant(b)) => std::rc::Rc::ptr_eq(a, b),)*
                    _ => false,
                }
            }
        }

        impl<A: Annotation> PartialEq for $category<A> {
            fn eq(&self, other: &Self) -> bool {
                self.ptr_eq(other)
            }
        }

        impl<A: Annotation> Spanned for $category<A> {
            fn span(&self) -> &Span {
                self.annotation().span()
            }
        }
    };
}

pub(crate) use node_category;

/// Writes a comma-separated list of displayable items.
pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
