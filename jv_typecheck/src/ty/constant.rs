use crate::ty::{Primitive, Type};
use jv_syn::{BinaryOp, LiteralValue, UnaryOp};
use std::{fmt, rc::Rc};

/// Value of a compile-time constant expression. Values of type `byte`, `short` and `int`
/// are all stored as `Int`; the expression's type says which it is.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Boolean(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Rc<str>),
}

impl ConstValue {
    pub fn from_literal(lit: &LiteralValue) -> Option<Self> {
        match lit {
            LiteralValue::Int(i) => Some(ConstValue::Int(*i)),
            LiteralValue::Long(i) => Some(ConstValue::Long(*i)),
            LiteralValue::Float(x) => Some(ConstValue::Float(*x)),
            LiteralValue::Double(x) => Some(ConstValue::Double(*x)),
            LiteralValue::Char(c) => Some(ConstValue::Char(*c)),
            LiteralValue::String(s) => Some(ConstValue::String(s.clone())),
            LiteralValue::Boolean(b) => Some(ConstValue::Boolean(*b)),
            LiteralValue::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstValue::Char(c) => Some(*c as i64),
            ConstValue::Int(i) => Some(*i as i64),
            ConstValue::Long(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Float(x) => Some(*x as f64),
            ConstValue::Double(x) => Some(*x),
            _ => self.as_i64().map(|i| i as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this integral constant can be assigned to `target` without a cast.
    pub fn fits(&self, target: Primitive) -> bool {
        let value = match self {
            ConstValue::Int(i) => *i,
            ConstValue::Char(c) => *c as i32,
            _ => return false,
        };

        match target {
            Primitive::Byte => cast::i8(value).is_ok(),
            Primitive::Short => cast::i16(value).is_ok(),
            Primitive::Char => cast::u16(value).is_ok(),
            Primitive::Int => true,
            _ => false,
        }
    }

    /// Applies a primitive conversion to this value, as an explicit cast would.
    pub fn convert(&self, target: Primitive) -> Option<ConstValue> {
        if let ConstValue::Boolean(b) = self {
            return match target {
                Primitive::Boolean => Some(ConstValue::Boolean(*b)),
                _ => None,
            };
        }

        let is_float = matches!(self, ConstValue::Float(..) | ConstValue::Double(..));

        let value = match target {
            Primitive::Byte | Primitive::Short | Primitive::Char | Primitive::Int => {
                let i = if is_float {
                    self.as_f64()? as i32
                } else {
                    self.as_i64()? as i32
                };

                match target {
                    Primitive::Byte => ConstValue::Int(i as i8 as i32),
                    Primitive::Short => ConstValue::Int(i as i16 as i32),
                    Primitive::Char => ConstValue::Char(char::from_u32(i as u16 as u32)?),
                    _ => ConstValue::Int(i),
                }
            },

            Primitive::Long => {
                let i = if is_float { self.as_f64()? as i64 } else { self.as_i64()? };
                ConstValue::Long(i)
            },

            Primitive::Float => match self {
                ConstValue::Double(x) => ConstValue::Float(*x as f32),
                ConstValue::Float(x) => ConstValue::Float(*x),
                _ => ConstValue::Float(self.as_i64()? as f32),
            },

            Primitive::Double => ConstValue::Double(self.as_f64()?),

            Primitive::Boolean | Primitive::Void => return None,
        };

        Some(value)
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConstValue::Boolean(b) => write!(f, "{}", b),
            ConstValue::Char(c) => write!(f, "{}", c),
            ConstValue::Int(i) => write!(f, "{}", i),
            ConstValue::Long(i) => write!(f, "{}", i),
            ConstValue::Float(x) => write!(f, "{:?}", x),
            ConstValue::Double(x) => write!(f, "{:?}", x),
            ConstValue::String(s) => write!(f, "{}", s),
        }
    }
}

pub fn fold_unary(op: UnaryOp, operand: &ConstValue, ty: &Type) -> Option<ConstValue> {
    match (op, ty.as_primitive()?) {
        (UnaryOp::Not, Primitive::Boolean) => Some(ConstValue::Boolean(!operand.as_bool()?)),

        (UnaryOp::Pos, prim) => operand.convert(prim),

        (UnaryOp::Neg, Primitive::Int) => Some(ConstValue::Int((operand.as_i64()? as i32).wrapping_neg())),
        (UnaryOp::Neg, Primitive::Long) => Some(ConstValue::Long(operand.as_i64()?.wrapping_neg())),
        (UnaryOp::Neg, Primitive::Float) => match operand.convert(Primitive::Float)? {
            ConstValue::Float(x) => Some(ConstValue::Float(-x)),
            _ => None,
        },
        (UnaryOp::Neg, Primitive::Double) => Some(ConstValue::Double(-operand.as_f64()?)),

        (UnaryOp::BitNot, Primitive::Int) => Some(ConstValue::Int(!(operand.as_i64()? as i32))),
        (UnaryOp::BitNot, Primitive::Long) => Some(ConstValue::Long(!operand.as_i64()?)),

        _ => None,
    }
}

/// Folds a binary operation on constants. `operand_ty` is the type both operands were
/// promoted to (the left operand's type for shifts), `result_ty` the expression's type.
pub fn fold_binary(
    op: BinaryOp,
    lhs: &ConstValue,
    rhs: &ConstValue,
    operand_ty: &Type,
    result_ty: &Type,
) -> Option<ConstValue> {
    if op == BinaryOp::Add && !result_ty.is_primitive() {
        let concat = format!("{}{}", lhs, rhs);
        return Some(ConstValue::String(concat.into()));
    }

    match operand_ty.as_primitive()? {
        Primitive::Boolean => fold_bool(op, lhs.as_bool()?, rhs.as_bool()?),

        Primitive::Int => {
            let (a, b) = (lhs.as_i64()? as i32, rhs.as_i64()? as i32);
            let value = match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Mul => a.wrapping_mul(b),
                BinaryOp::Div | BinaryOp::Rem if b == 0 => return None,
                BinaryOp::Div => a.wrapping_div(b),
                BinaryOp::Rem => a.wrapping_rem(b),
                BinaryOp::Shl => a.wrapping_shl(rhs.as_i64()? as u32),
                BinaryOp::Shr => a.wrapping_shr(rhs.as_i64()? as u32),
                BinaryOp::UShr => (a as u32).wrapping_shr(rhs.as_i64()? as u32) as i32,
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                BinaryOp::BitXor => a ^ b,
                _ => return compare(op, a.cmp(&b)),
            };
            Some(ConstValue::Int(value))
        },

        Primitive::Long => {
            let (a, b) = (lhs.as_i64()?, rhs.as_i64()?);
            let value = match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Mul => a.wrapping_mul(b),
                BinaryOp::Div | BinaryOp::Rem if b == 0 => return None,
                BinaryOp::Div => a.wrapping_div(b),
                BinaryOp::Rem => a.wrapping_rem(b),
                BinaryOp::Shl => a.wrapping_shl(b as u32),
                BinaryOp::Shr => a.wrapping_shr(b as u32),
                BinaryOp::UShr => (a as u64).wrapping_shr(b as u32) as i64,
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                BinaryOp::BitXor => a ^ b,
                _ => return compare(op, a.cmp(&b)),
            };
            Some(ConstValue::Long(value))
        },

        prim @ (Primitive::Float | Primitive::Double) => {
            let (a, b) = (lhs.as_f64()?, rhs.as_f64()?);
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Rem => a % b,
                _ => {
                    return match a.partial_cmp(&b) {
                        Some(ordering) => compare(op, ordering),

                        // comparisons involving NaN are all false except !=
                        None => Some(ConstValue::Boolean(op == BinaryOp::NotEquals)),
                    }
                },
            };

            if prim == Primitive::Float {
                Some(ConstValue::Float(value as f32))
            } else {
                Some(ConstValue::Double(value))
            }
        },

        _ => None,
    }
}

fn fold_bool(op: BinaryOp, a: bool, b: bool) -> Option<ConstValue> {
    let value = match op {
        BinaryOp::Equals => a == b,
        BinaryOp::NotEquals => a != b,
        BinaryOp::BitAnd | BinaryOp::And => a && b,
        BinaryOp::BitOr | BinaryOp::Or => a || b,
        BinaryOp::BitXor => a ^ b,
        _ => return None,
    };
    Some(ConstValue::Boolean(value))
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> Option<ConstValue> {
    use std::cmp::Ordering::*;

    let value = match op {
        BinaryOp::Lt => ordering == Less,
        BinaryOp::Lte => ordering != Greater,
        BinaryOp::Gt => ordering == Greater,
        BinaryOp::Gte => ordering != Less,
        BinaryOp::Equals => ordering == Equal,
        BinaryOp::NotEquals => ordering != Equal,
        _ => return None,
    };
    Some(ConstValue::Boolean(value))
}
