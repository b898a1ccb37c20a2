use crate::ast::Annotation;
use std::{fmt, rc::Rc};

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(Rc<str>),
    Boolean(bool),
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LiteralValue::Int(i) => write!(f, "{}", i),
            LiteralValue::Long(i) => write!(f, "{}L", i),
            LiteralValue::Float(x) => write!(f, "{:?}f", x),
            LiteralValue::Double(x) => write!(f, "{:?}", x),
            LiteralValue::Char(c) => write!(f, "{:?}", c),
            LiteralValue::String(s) => write!(f, "{:?}", s),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Null => write!(f, "null"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Literal<A: Annotation> {
    pub value: LiteralValue,
    pub annotation: A,
}
