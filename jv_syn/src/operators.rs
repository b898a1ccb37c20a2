use std::fmt;

#[derive(Eq, PartialEq, Clone, Debug, Copy, Hash)]
pub enum Operator {
    Assignment,
    CompoundAssignment(CompoundAssignmentOperator),
    Question,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    Shl,
    Shr,
    UShr,
    Lt,
    Lte,
    Gt,
    Gte,
    Equals,
    NotEquals,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Not,
    BitNot,
    Increment,
    Decrement,
}

impl Operator {
    /// All the operator spellings, longest first so the lexer can match greedily.
    pub const SPELLINGS: [(&'static str, Operator); 36] = [
        (">>>=", Operator::CompoundAssignment(CompoundAssignmentOperator::UShrAssign)),
        ("<<=", Operator::CompoundAssignment(CompoundAssignmentOperator::ShlAssign)),
        (">>=", Operator::CompoundAssignment(CompoundAssignmentOperator::ShrAssign)),
        (">>>", Operator::UShr),
        ("+=", Operator::CompoundAssignment(CompoundAssignmentOperator::AddAssign)),
        ("-=", Operator::CompoundAssignment(CompoundAssignmentOperator::SubAssign)),
        ("*=", Operator::CompoundAssignment(CompoundAssignmentOperator::MulAssign)),
        ("/=", Operator::CompoundAssignment(CompoundAssignmentOperator::DivAssign)),
        ("%=", Operator::CompoundAssignment(CompoundAssignmentOperator::RemAssign)),
        ("&=", Operator::CompoundAssignment(CompoundAssignmentOperator::BitAndAssign)),
        ("|=", Operator::CompoundAssignment(CompoundAssignmentOperator::BitOrAssign)),
        ("^=", Operator::CompoundAssignment(CompoundAssignmentOperator::BitXorAssign)),
        ("<<", Operator::Shl),
        (">>", Operator::Shr),
        ("<=", Operator::Lte),
        (">=", Operator::Gte),
        ("==", Operator::Equals),
        ("!=", Operator::NotEquals),
        ("&&", Operator::And),
        ("||", Operator::Or),
        ("++", Operator::Increment),
        ("--", Operator::Decrement),
        ("=", Operator::Assignment),
        ("?", Operator::Question),
        ("+", Operator::Plus),
        ("-", Operator::Minus),
        ("*", Operator::Multiply),
        ("/", Operator::Divide),
        ("%", Operator::Remainder),
        ("<", Operator::Lt),
        (">", Operator::Gt),
        ("&", Operator::BitAnd),
        ("|", Operator::BitOr),
        ("^", Operator::BitXor),
        ("!", Operator::Not),
        ("~", Operator::BitNot),
    ];

    pub fn as_str(self) -> &'static str {
        Self::SPELLINGS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(text, _)| *text)
            .unwrap_or("?")
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Eq, PartialEq, Clone, Debug, Copy, Hash)]
pub enum CompoundAssignmentOperator {
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
}

impl CompoundAssignmentOperator {
    pub fn binary_op(self) -> BinaryOp {
        match self {
            CompoundAssignmentOperator::AddAssign => BinaryOp::Add,
            CompoundAssignmentOperator::SubAssign => BinaryOp::Sub,
            CompoundAssignmentOperator::MulAssign => BinaryOp::Mul,
            CompoundAssignmentOperator::DivAssign => BinaryOp::Div,
            CompoundAssignmentOperator::RemAssign => BinaryOp::Rem,
            CompoundAssignmentOperator::BitAndAssign => BinaryOp::BitAnd,
            CompoundAssignmentOperator::BitOrAssign => BinaryOp::BitOr,
            CompoundAssignmentOperator::BitXorAssign => BinaryOp::BitXor,
            CompoundAssignmentOperator::ShlAssign => BinaryOp::Shl,
            CompoundAssignmentOperator::ShrAssign => BinaryOp::Shr,
            CompoundAssignmentOperator::UShrAssign => BinaryOp::UShr,
        }
    }
}

#[derive(Eq, PartialEq, Clone, Debug, Copy, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Lte,
    Gt,
    Gte,
    Equals,
    NotEquals,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

impl BinaryOp {
    /// Binding strength, higher binds tighter. Every binary operator is left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Equals | BinaryOp::NotEquals => 6,
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => 7,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
        }
    }

    pub fn from_operator(op: Operator) -> Option<Self> {
        match op {
            Operator::Plus => Some(BinaryOp::Add),
            Operator::Minus => Some(BinaryOp::Sub),
            Operator::Multiply => Some(BinaryOp::Mul),
            Operator::Divide => Some(BinaryOp::Div),
            Operator::Remainder => Some(BinaryOp::Rem),
            Operator::Shl => Some(BinaryOp::Shl),
            Operator::Shr => Some(BinaryOp::Shr),
            Operator::UShr => Some(BinaryOp::UShr),
            Operator::Lt => Some(BinaryOp::Lt),
            Operator::Lte => Some(BinaryOp::Lte),
            Operator::Gt => Some(BinaryOp::Gt),
            Operator::Gte => Some(BinaryOp::Gte),
            Operator::Equals => Some(BinaryOp::Equals),
            Operator::NotEquals => Some(BinaryOp::NotEquals),
            Operator::BitAnd => Some(BinaryOp::BitAnd),
            Operator::BitOr => Some(BinaryOp::BitOr),
            Operator::BitXor => Some(BinaryOp::BitXor),
            Operator::And => Some(BinaryOp::And),
            Operator::Or => Some(BinaryOp::Or),
            _ => None,
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Equals | BinaryOp::NotEquals)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        })
    }
}

#[derive(Eq, PartialEq, Clone, Debug, Copy, Hash)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn is_increment(self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostIncrement
                | UnaryOp::PostDecrement
        )
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        })
    }
}
