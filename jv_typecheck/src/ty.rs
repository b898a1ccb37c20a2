mod constant;
mod lookup;
mod primitive;
mod relations;
mod sig;

#[cfg(test)]
mod test;

pub use self::{constant::*, primitive::*, relations::*, sig::*};
use crate::def::ClassId;
use derivative::*;
use std::{fmt, rc::Rc};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Type {
    /// Placeholder for a type that isn't known, either because it hasn't been resolved yet
    /// or because resolving it failed. Compatible with everything so one error doesn't
    /// cascade into many.
    Unknown,

    Null,
    Primitive(Primitive),
    Class(ClassType),
    Array(Rc<ArrayType>),
}

#[derive(Clone, Derivative)]
#[derivative(Debug, Eq, PartialEq, Hash)]
pub struct ClassType {
    pub id: ClassId,

    #[derivative(Debug = "ignore")]
    #[derivative(PartialEq = "ignore")]
    #[derivative(Hash = "ignore")]
    pub name: Rc<str>,
}

/// Array types are interned by the def table, one per element type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ArrayType {
    pub elem: Type,
}

impl Type {
    pub const VOID: Type = Type::Primitive(Primitive::Void);
    pub const BOOLEAN: Type = Type::Primitive(Primitive::Boolean);
    pub const CHAR: Type = Type::Primitive(Primitive::Char);
    pub const BYTE: Type = Type::Primitive(Primitive::Byte);
    pub const SHORT: Type = Type::Primitive(Primitive::Short);
    pub const INT: Type = Type::Primitive(Primitive::Int);
    pub const LONG: Type = Type::Primitive(Primitive::Long);
    pub const FLOAT: Type = Type::Primitive(Primitive::Float);
    pub const DOUBLE: Type = Type::Primitive(Primitive::Double);

    pub fn class(id: ClassId, name: impl Into<Rc<str>>) -> Self {
        Type::Class(ClassType { id, name: name.into() })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_void(&self) -> bool {
        *self == Type::VOID
    }

    pub fn is_boolean(&self) -> bool {
        *self == Type::BOOLEAN
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.as_primitive().is_some()
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive().map(Primitive::is_numeric).unwrap_or(false)
    }

    pub fn is_integral(&self) -> bool {
        self.as_primitive().map(Primitive::is_integral).unwrap_or(false)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Null | Type::Class(..) | Type::Array(..))
    }

    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            Type::Class(class) => Some(class.id),
            _ => None,
        }
    }

    pub fn array_elem(&self) -> Option<&Type> {
        match self {
            Type::Array(array) => Some(&array.elem),
            _ => None,
        }
    }

    /// Number of array dimensions, 0 for non-array types.
    pub fn dims(&self) -> usize {
        match self {
            Type::Array(array) => 1 + array.elem.dims(),
            _ => 0,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Unknown => write!(f, "<unknown>"),
            Type::Null => write!(f, "null"),
            Type::Primitive(p) => write!(f, "{}", p),
            Type::Class(class) => write!(f, "{}", class.name),
            Type::Array(array) => write!(f, "{}[]", array.elem),
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub(crate) fn write_types(f: &mut fmt::Formatter, types: &[Type]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}
