use crate::ty::{write_types, Type};
use std::fmt;

/// Resolved signature of a method or constructor. Constructors return `void`.
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct ProcSig {
    pub ret: Type,
    pub formals: Vec<Type>,
    pub throws: Vec<Type>,
}

impl ProcSig {
    /// Signature used while the real one can't be resolved.
    pub fn unknown(formal_count: usize) -> Self {
        Self {
            ret: Type::Unknown,
            formals: vec![Type::Unknown; formal_count],
            throws: Vec::new(),
        }
    }

    pub fn same_formals(&self, other: &ProcSig) -> bool {
        self.formals == other.formals
    }

    pub fn formals_display(&self) -> FormalsDisplay {
        FormalsDisplay(&self.formals)
    }
}

pub struct FormalsDisplay<'a>(pub &'a [Type]);

impl fmt::Display for FormalsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        write_types(f, self.0)?;
        write!(f, ")")
    }
}

impl fmt::Display for ProcSig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.ret, self.formals_display())?;
        if !self.throws.is_empty() {
            write!(f, " throws ")?;
            write_types(f, &self.throws)?;
        }
        Ok(())
    }
}
