use jv_syn::PrimitiveKind;
use std::fmt;

#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum Primitive {
    Void,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 9] = [
        Primitive::Void,
        Primitive::Boolean,
        Primitive::Char,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Void | Primitive::Boolean)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Primitive::Char | Primitive::Byte | Primitive::Short | Primitive::Int | Primitive::Long
        )
    }

    /// Whether a value of this type converts to `other` without an explicit cast.
    pub fn widens_to(self, other: Primitive) -> bool {
        use Primitive::*;

        if self == other {
            return true;
        }

        match self {
            Byte => matches!(other, Short | Int | Long | Float | Double),
            Short | Char => matches!(other, Int | Long | Float | Double),
            Int => matches!(other, Long | Float | Double),
            Long => matches!(other, Float | Double),
            Float => other == Double,
            Void | Boolean | Double => false,
        }
    }

    /// Unary numeric promotion: types narrower than int widen to int.
    pub fn promote(self) -> Option<Primitive> {
        match self {
            Primitive::Byte | Primitive::Short | Primitive::Char | Primitive::Int => Some(Primitive::Int),
            Primitive::Long | Primitive::Float | Primitive::Double => Some(self),
            Primitive::Void | Primitive::Boolean => None,
        }
    }

    /// Binary numeric promotion: the wider of the two promoted operand types.
    pub fn promote_binary(self, other: Primitive) -> Option<Primitive> {
        if !self.is_numeric() || !other.is_numeric() {
            return None;
        }

        let result = if self == Primitive::Double || other == Primitive::Double {
            Primitive::Double
        } else if self == Primitive::Float || other == Primitive::Float {
            Primitive::Float
        } else if self == Primitive::Long || other == Primitive::Long {
            Primitive::Long
        } else {
            Primitive::Int
        };

        Some(result)
    }
}

impl From<PrimitiveKind> for Primitive {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Void => Primitive::Void,
            PrimitiveKind::Boolean => Primitive::Boolean,
            PrimitiveKind::Char => Primitive::Char,
            PrimitiveKind::Byte => Primitive::Byte,
            PrimitiveKind::Short => Primitive::Short,
            PrimitiveKind::Int => Primitive::Int,
            PrimitiveKind::Long => Primitive::Long,
            PrimitiveKind::Float => Primitive::Float,
            PrimitiveKind::Double => Primitive::Double,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
