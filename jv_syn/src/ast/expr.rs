use crate::{ast::*, ident::*, keyword::Keyword, operators::*, parse::*, token_tree::*};
use jv_common::{span::*, TracedError};
use std::{fmt, rc::Rc};

#[derive(Clone, Debug)]
pub enum Expr<A: Annotation> {
    Literal(Rc<Literal<A>>),
    Local(Rc<LocalRef<A>>),
    Field(Rc<FieldAccess<A>>),
    Call(Rc<Call<A>>),
    New(Rc<New<A>>),
    NewArray(Rc<NewArray<A>>),
    ArrayAccess(Rc<ArrayAccess<A>>),
    Unary(Rc<Unary<A>>),
    Binary(Rc<Binary<A>>),
    Assign(Rc<Assign<A>>),
    Cast(Rc<Cast<A>>),
    InstanceOf(Rc<InstanceOf<A>>),
    Conditional(Rc<Conditional<A>>),
    Special(Rc<Special<A>>),
    Ambiguous(Rc<AmbExpr<A>>),
}

node_category!(Expr {
    Literal,
    Local,
    Field,
    Call,
    New,
    NewArray,
    ArrayAccess,
    Unary,
    Binary,
    Assign,
    Cast,
    InstanceOf,
    Conditional,
    Special,
    Ambiguous,
});

#[derive(Clone, Debug)]
pub struct LocalRef<A: Annotation> {
    pub name: Ident,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct FieldAccess<A: Annotation> {
    pub target: Prefix<A>,
    pub name: Ident,
    pub annotation: A,
}

/// A method call. A call with no target is an unqualified call to a method of one of the
/// enclosing classes.
#[derive(Clone, Debug)]
pub struct Call<A: Annotation> {
    pub target: Option<Prefix<A>>,
    pub name: Ident,
    pub args: Vec<Expr<A>>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct New<A: Annotation> {
    pub ty: TypeNode<A>,
    pub args: Vec<Expr<A>>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct NewArray<A: Annotation> {
    pub elem: TypeNode<A>,
    pub dims: Vec<Expr<A>>,
    pub extra_dims: usize,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct ArrayAccess<A: Annotation> {
    pub array: Expr<A>,
    pub index: Expr<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Unary<A: Annotation> {
    pub op: UnaryOp,
    pub operand: Expr<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Binary<A: Annotation> {
    pub lhs: Expr<A>,
    pub op: BinaryOp,
    pub rhs: Expr<A>,
    pub annotation: A,
}

/// Simple assignment when `op` is `None`, otherwise a compound assignment.
#[derive(Clone, Debug)]
pub struct Assign<A: Annotation> {
    pub target: Expr<A>,
    pub op: Option<BinaryOp>,
    pub value: Expr<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Cast<A: Annotation> {
    pub ty: TypeNode<A>,
    pub expr: Expr<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct InstanceOf<A: Annotation> {
    pub expr: Expr<A>,
    pub ty: TypeNode<A>,
    pub annotation: A,
}

#[derive(Clone, Debug)]
pub struct Conditional<A: Annotation> {
    pub cond: Expr<A>,
    pub then_expr: Expr<A>,
    pub else_expr: Expr<A>,
    pub annotation: A,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum SpecialKind {
    This,
    Super,
}

impl fmt::Display for SpecialKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            SpecialKind::This => "this",
            SpecialKind::Super => "super",
        })
    }
}

/// `this` or `super`, optionally qualified by an enclosing class name.
#[derive(Clone, Debug)]
pub struct Special<A: Annotation> {
    pub kind: SpecialKind,
    pub qualifier: Option<TypeNode<A>>,
    pub annotation: A,
}

/// A possibly-qualified name in expression position that could be a local, a field or
/// (erroneously) a type.
#[derive(Clone, Debug)]
pub struct AmbExpr<A: Annotation> {
    pub prefix: Option<Prefix<A>>,
    pub name: Ident,
    pub annotation: A,
}

impl<A: Annotation> Expr<A> {
    pub fn literal(value: LiteralValue, span: Span) -> Self {
        Expr::Literal(Rc::new(Literal {
            value,
            annotation: A::from(span),
        }))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Expr::Ambiguous(..))
    }

    /// Whether this expression may stand alone as an expression statement.
    pub fn is_statement_expr(&self) -> bool {
        match self {
            Expr::Assign(..) | Expr::Call(..) | Expr::New(..) => true,
            Expr::Unary(unary) => unary.op.is_increment(),
            _ => false,
        }
    }

    pub fn parse(tokens: &mut TokenStream) -> ParseResult<Self> {
        let target = parse_conditional(tokens)?;

        let op = match tokens.current() {
            Some(TokenTree::Operator { op: Operator::Assignment, .. }) => None,
            Some(TokenTree::Operator { op: Operator::CompoundAssignment(op), .. }) => {
                Some(op.binary_op())
            },
            _ => return Ok(target),
        };
        tokens.advance(1);

        let value = Expr::parse(tokens)?;
        let span = target.span().to(&value);
        Ok(Expr::Assign(Rc::new(Assign {
            target,
            op,
            value,
            annotation: A::from(span),
        })))
    }

    /// Parses a comma-separated argument list from the contents of a bracket group.
    pub fn parse_args(group: &DelimitedGroup) -> ParseResult<Vec<Self>> {
        let mut tokens = TokenStream::new(group.inner.clone(), group.open.clone());
        let mut args = Vec::new();
        if tokens.current().is_none() {
            return Ok(args);
        }

        loop {
            args.push(Expr::parse(&mut tokens)?);
            if tokens.match_one_maybe(Separator::Comma).is_none() {
                break;
            }
        }
        tokens.finish()?;

        Ok(args)
    }
}

fn parse_conditional<A: Annotation>(tokens: &mut TokenStream) -> ParseResult<Expr<A>> {
    let cond = parse_binary(tokens, 1)?;
    if tokens.match_one_maybe(Operator::Question).is_none() {
        return Ok(cond);
    }

    let then_expr = Expr::parse(tokens)?;
    tokens.match_one(Separator::Colon)?;
    let else_expr = parse_conditional(tokens)?;

    let span = cond.span().to(&else_expr);
    Ok(Expr::Conditional(Rc::new(Conditional {
        cond,
        then_expr,
        else_expr,
        annotation: A::from(span),
    })))
}

const INSTANCEOF_PRECEDENCE: u8 = 7;

fn parse_binary<A: Annotation>(tokens: &mut TokenStream, min_precedence: u8) -> ParseResult<Expr<A>> {
    let mut lhs = parse_unary(tokens)?;

    loop {
        let (precedence, op) = match tokens.current() {
            Some(TokenTree::Operator { op, .. }) => match BinaryOp::from_operator(*op) {
                Some(bin_op) => (bin_op.precedence(), Some(bin_op)),
                None => break,
            },
            Some(TokenTree::Keyword { kw: Keyword::InstanceOf, .. }) => (INSTANCEOF_PRECEDENCE, None),
            _ => break,
        };

        if precedence < min_precedence {
            break;
        }
        tokens.advance(1);

        lhs = match op {
            Some(op) => {
                let rhs = parse_binary(tokens, precedence + 1)?;
                let span = lhs.span().to(&rhs);
                Expr::Binary(Rc::new(Binary {
                    lhs,
                    op,
                    rhs,
                    annotation: A::from(span),
                }))
            },

            None => {
                let ty = TypeNode::parse(tokens)?;
                let span = lhs.span().to(&ty);
                Expr::InstanceOf(Rc::new(InstanceOf {
                    expr: lhs,
                    ty,
                    annotation: A::from(span),
                }))
            },
        };
    }

    Ok(lhs)
}

fn prefix_op(op: Operator) -> Option<UnaryOp> {
    match op {
        Operator::Minus => Some(UnaryOp::Neg),
        Operator::Plus => Some(UnaryOp::Pos),
        Operator::Not => Some(UnaryOp::Not),
        Operator::BitNot => Some(UnaryOp::BitNot),
        Operator::Increment => Some(UnaryOp::PreIncrement),
        Operator::Decrement => Some(UnaryOp::PreDecrement),
        _ => None,
    }
}

fn parse_unary<A: Annotation>(tokens: &mut TokenStream) -> ParseResult<Expr<A>> {
    match tokens.current().cloned() {
        Some(TokenTree::Operator { op, span }) => {
            let unary_op = match prefix_op(op) {
                Some(unary_op) => unary_op,
                None => {
                    let matcher = Matcher::ExprOperandStart;
                    return Err(TracedError::trace(ParseError::UnexpectedToken(
                        Box::new(TokenTree::Operator { op, span }),
                        Some(matcher),
                    )));
                },
            };
            tokens.advance(1);

            // the most negative int and long literals are only representable when negated
            if unary_op == UnaryOp::Neg {
                if let Some(min_literal) = negated_min_literal(tokens.current()) {
                    let lit_span = tokens.current().map(|t| t.span().clone()).unwrap_or(span.clone());
                    tokens.advance(1);
                    return parse_postfix(tokens, Expr::literal(min_literal, span.to(&lit_span)));
                }
            }

            let operand = parse_unary(tokens)?;
            let span = span.to(&operand);
            Ok(Expr::Unary(Rc::new(Unary {
                op: unary_op,
                operand,
                annotation: A::from(span),
            })))
        },

        Some(TokenTree::Delimited(group)) if is_cast(&group, tokens.peek_at(1)) => {
            tokens.advance(1);
            let mut ty_tokens = TokenStream::new(group.inner.clone(), group.open.clone());
            let ty = TypeNode::parse(&mut ty_tokens)?;
            ty_tokens.finish()?;

            let expr = parse_unary(tokens)?;
            let span = group.span.to(&expr);
            Ok(Expr::Cast(Rc::new(Cast {
                ty,
                expr,
                annotation: A::from(span),
            })))
        },

        _ => {
            let primary = parse_primary(tokens)?;
            parse_postfix(tokens, primary)
        },
    }
}

fn negated_min_literal(token: Option<&TokenTree>) -> Option<LiteralValue> {
    match token {
        Some(TokenTree::IntNumber { value, long: false, radix: 10, .. }) if *value == 1 << 31 => {
            Some(LiteralValue::Int(i32::MIN))
        },
        Some(TokenTree::IntNumber { value, long: true, radix: 10, .. }) if *value == 1 << 63 => {
            Some(LiteralValue::Long(i64::MIN))
        },
        _ => None,
    }
}

/// A parenthesized group is a cast if it contains nothing but a type, and is followed by
/// something that can start an operand. Primitive casts may also be followed by a sign.
fn is_cast(group: &DelimitedGroup, next: Option<&TokenTree>) -> bool {
    if group.delim != DelimiterPair::Bracket || group.inner.is_empty() {
        return false;
    }

    let inner = &group.inner;
    if type_shape_len(inner) != Some(inner.len()) {
        return false;
    }
    let primitive = matches!(inner.first(), Some(TokenTree::Keyword { kw, .. }) if kw.is_primitive_type());

    match next {
        None => false,
        Some(TokenTree::Operator { op: Operator::Plus, .. })
        | Some(TokenTree::Operator { op: Operator::Minus, .. })
        | Some(TokenTree::Operator { op: Operator::Increment, .. })
        | Some(TokenTree::Operator { op: Operator::Decrement, .. }) => primitive,
        Some(TokenTree::Operator { op: Operator::Not, .. })
        | Some(TokenTree::Operator { op: Operator::BitNot, .. }) => true,
        Some(TokenTree::Ident(_)) | Some(TokenTree::Delimited(_)) => true,
        Some(TokenTree::Keyword { kw, .. }) => matches!(
            kw,
            Keyword::This | Keyword::Super | Keyword::New | Keyword::True | Keyword::False | Keyword::Null
        ),
        Some(token) => token.is_literal(),
    }
}

fn parse_int_literal(value: u64, long: bool, radix: u32, span: &Span) -> ParseResult<LiteralValue> {
    let too_large = || TracedError::trace(ParseError::IntegerTooLarge(span.clone()));

    // hex and octal literals may use the full unsigned range of their type
    match (long, radix) {
        (false, 10) => cast::i32(value).map(LiteralValue::Int).map_err(|_| too_large()),
        (false, _) => cast::u32(value)
            .map(|bits| LiteralValue::Int(bits as i32))
            .map_err(|_| too_large()),
        (true, 10) => cast::i64(value).map(LiteralValue::Long).map_err(|_| too_large()),
        (true, _) => Ok(LiteralValue::Long(value as i64)),
    }
}

fn parse_primary<A: Annotation>(tokens: &mut TokenStream) -> ParseResult<Expr<A>> {
    let token = match tokens.next() {
        Some(token) => token,
        None => {
            return Err(TracedError::trace(ParseError::UnexpectedEOF(
                Matcher::ExprOperandStart,
                tokens.context().clone(),
            )))
        },
    };

    match token {
        TokenTree::IntNumber { value, long, radix, span } => {
            let value = parse_int_literal(value, long, radix, &span)?;
            Ok(Expr::literal(value, span))
        },

        TokenTree::RealNumber { value, float: true, span } => {
            Ok(Expr::literal(LiteralValue::Float(value as f32), span))
        },

        TokenTree::RealNumber { value, float: false, span } => {
            Ok(Expr::literal(LiteralValue::Double(value), span))
        },

        TokenTree::Char { value, span } => Ok(Expr::literal(LiteralValue::Char(value), span)),

        TokenTree::String { value, span } => Ok(Expr::literal(LiteralValue::String(value), span)),

        TokenTree::Keyword { kw: Keyword::True, span } => {
            Ok(Expr::literal(LiteralValue::Boolean(true), span))
        },

        TokenTree::Keyword { kw: Keyword::False, span } => {
            Ok(Expr::literal(LiteralValue::Boolean(false), span))
        },

        TokenTree::Keyword { kw: Keyword::Null, span } => Ok(Expr::literal(LiteralValue::Null, span)),

        TokenTree::Keyword { kw: kw @ Keyword::This, span } | TokenTree::Keyword { kw: kw @ Keyword::Super, span } => {
            let kind = if kw == Keyword::This { SpecialKind::This } else { SpecialKind::Super };
            Ok(Expr::Special(Rc::new(Special {
                kind,
                qualifier: None,
                annotation: A::from(span),
            })))
        },

        TokenTree::Keyword { kw: Keyword::New, span } => parse_new(tokens, span),

        TokenTree::Delimited(group) if group.delim == DelimiterPair::Bracket => {
            let mut inner = TokenStream::new(group.inner.clone(), group.open.clone());
            let expr = Expr::parse(&mut inner)?;
            inner.finish()?;
            Ok(expr)
        },

        TokenTree::Ident(first) => parse_name_expr(tokens, first),

        unexpected => Err(TracedError::trace(ParseError::UnexpectedToken(
            Box::new(unexpected),
            Some(Matcher::ExprOperandStart),
        ))),
    }
}

/// Parses a dotted name that starts an expression: `a.b.c`, `a.b.m(...)` or `A.B.this`.
fn parse_name_expr<A: Annotation>(tokens: &mut TokenStream, first: Ident) -> ParseResult<Expr<A>> {
    let rest = parse_name_tail(tokens)?;

    if tokens.peek_sequence(&[Matcher::Separator(Separator::Dot), Matcher::Keyword(Keyword::This)]) {
        tokens.advance(1);
        let this_kw = tokens.match_one(Keyword::This)?;
        let (qualifiers, name) = split_qualified(first, rest);
        let qualifier = TypeNode::from_qualified(&qualifiers, name);
        let span = qualifier.span().to(this_kw.span());
        return Ok(Expr::Special(Rc::new(Special {
            kind: SpecialKind::This,
            qualifier: Some(qualifier),
            annotation: A::from(span),
        })));
    }

    let (qualifiers, name) = split_qualified(first, rest);
    let prefix = Prefix::from_name_parts(&qualifiers);

    if let Some(TokenTree::Delimited(group)) = tokens.current().cloned() {
        if group.delim == DelimiterPair::Bracket {
            tokens.advance(1);
            let args = Expr::parse_args(&group)?;
            let start = match &prefix {
                Some(prefix) => prefix.span().clone(),
                None => name.span.clone(),
            };
            return Ok(Expr::Call(Rc::new(Call {
                target: prefix,
                name,
                args,
                annotation: A::from(start.to(&group.span)),
            })));
        }
    }

    let span = match &prefix {
        Some(prefix) => prefix.span().to(&name),
        None => name.span.clone(),
    };
    Ok(Expr::Ambiguous(Rc::new(AmbExpr {
        prefix,
        name,
        annotation: A::from(span),
    })))
}

fn parse_new<A: Annotation>(tokens: &mut TokenStream, new_span: Span) -> ParseResult<Expr<A>> {
    let ty = TypeNode::parse_base(tokens)?;

    match tokens.current().cloned() {
        Some(TokenTree::Delimited(group)) if group.delim == DelimiterPair::Bracket => {
            tokens.advance(1);
            let args = Expr::parse_args(&group)?;
            Ok(Expr::New(Rc::new(New {
                ty,
                args,
                annotation: A::from(new_span.to(&group.span)),
            })))
        },

        Some(TokenTree::Delimited(group))
            if group.delim == DelimiterPair::SquareBracket && !group.inner.is_empty() =>
        {
            let mut dims = Vec::new();
            let mut end = group.span.clone();
            while let Some(TokenTree::Delimited(group)) = tokens.current().cloned() {
                if group.delim != DelimiterPair::SquareBracket || group.inner.is_empty() {
                    break;
                }
                tokens.advance(1);

                let mut dim_tokens = TokenStream::new(group.inner.clone(), group.open.clone());
                dims.push(Expr::parse(&mut dim_tokens)?);
                dim_tokens.finish()?;
                end = group.span.clone();
            }

            let mut extra_dims = 0;
            while let Some(TokenTree::Delimited(group)) = tokens.current().cloned() {
                if group.delim != DelimiterPair::SquareBracket || !group.inner.is_empty() {
                    break;
                }
                tokens.advance(1);
                extra_dims += 1;
                end = group.span.clone();
            }

            Ok(Expr::NewArray(Rc::new(NewArray {
                elem: ty,
                dims,
                extra_dims,
                annotation: A::from(new_span.to(&end)),
            })))
        },

        Some(unexpected) => Err(TracedError::trace(ParseError::UnexpectedToken(
            Box::new(unexpected),
            Some(Matcher::Delimited(DelimiterPair::Bracket).or(DelimiterPair::SquareBracket)),
        ))),

        None => Err(TracedError::trace(ParseError::UnexpectedEOF(
            Matcher::Delimited(DelimiterPair::Bracket),
            tokens.context().clone(),
        ))),
    }
}

fn parse_postfix<A: Annotation>(tokens: &mut TokenStream, mut expr: Expr<A>) -> ParseResult<Expr<A>> {
    loop {
        match tokens.current().cloned() {
            Some(TokenTree::Separator { sep: Separator::Dot, .. }) => {
                tokens.advance(1);
                let name = tokens.match_one(Matcher::AnyIdent)?;
                let name = match name.as_ident() {
                    Some(name) => name.clone(),
                    None => unreachable!("matched an identifier"),
                };

                let target = Prefix::expr(expr);
                expr = match tokens.current().cloned() {
                    Some(TokenTree::Delimited(group)) if group.delim == DelimiterPair::Bracket => {
                        tokens.advance(1);
                        let args = Expr::parse_args(&group)?;
                        let span = target.span().to(&group.span);
                        Expr::Call(Rc::new(Call {
                            target: Some(target),
                            name,
                            args,
                            annotation: A::from(span),
                        }))
                    },

                    _ => {
                        let span = target.span().to(&name);
                        Expr::Field(Rc::new(FieldAccess {
                            target,
                            name,
                            annotation: A::from(span),
                        }))
                    },
                };
            },

            Some(TokenTree::Delimited(group))
                if group.delim == DelimiterPair::SquareBracket && !group.inner.is_empty() =>
            {
                tokens.advance(1);
                let mut index_tokens = TokenStream::new(group.inner.clone(), group.open.clone());
                let index = Expr::parse(&mut index_tokens)?;
                index_tokens.finish()?;

                let span = expr.span().to(&group.span);
                expr = Expr::ArrayAccess(Rc::new(ArrayAccess {
                    array: expr,
                    index,
                    annotation: A::from(span),
                }));
            },

            Some(TokenTree::Operator { op: op @ Operator::Increment, span })
            | Some(TokenTree::Operator { op: op @ Operator::Decrement, span }) => {
                tokens.advance(1);
                let op = if op == Operator::Increment {
                    UnaryOp::PostIncrement
                } else {
                    UnaryOp::PostDecrement
                };
                let span = expr.span().to(&span);
                expr = Expr::Unary(Rc::new(Unary {
                    op,
                    operand: expr,
                    annotation: A::from(span),
                }));
            },

            _ => break Ok(expr),
        }
    }
}

impl<A: Annotation> fmt::Display for Expr<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit.value),
            Expr::Local(local) => write!(f, "{}", local.name),
            Expr::Field(field) => write!(f, "{}.{}", field.target, field.name),
            Expr::Call(call) => {
                if let Some(target) = &call.target {
                    write!(f, "{}.", target)?;
                }
                write!(f, "{}(", call.name)?;
                write_list(f, &call.args)?;
                write!(f, ")")
            },
            Expr::New(new) => {
                write!(f, "new {}(", new.ty)?;
                write_list(f, &new.args)?;
                write!(f, ")")
            },
            Expr::NewArray(new_array) => {
                write!(f, "new {}", new_array.elem)?;
                for dim in &new_array.dims {
                    write!(f, "[{}]", dim)?;
                }
                for _ in 0..new_array.extra_dims {
                    write!(f, "[]")?;
                }
                Ok(())
            },
            Expr::ArrayAccess(access) => write!(f, "{}[{}]", access.array, access.index),
            Expr::Unary(unary) if unary.op.is_postfix() => write!(f, "{}{}", unary.operand, unary.op),
            Expr::Unary(unary) => write!(f, "{}{}", unary.op, unary.operand),
            Expr::Binary(bin) => write!(f, "{} {} {}", bin.lhs, bin.op, bin.rhs),
            Expr::Assign(assign) => match assign.op {
                Some(op) => write!(f, "{} {}= {}", assign.target, op, assign.value),
                None => write!(f, "{} = {}", assign.target, assign.value),
            },
            Expr::Cast(cast) => write!(f, "({}) {}", cast.ty, cast.expr),
            Expr::InstanceOf(instance_of) => {
                write!(f, "{} instanceof {}", instance_of.expr, instance_of.ty)
            },
            Expr::Conditional(cond) => {
                write!(f, "{} ? {} : {}", cond.cond, cond.then_expr, cond.else_expr)
            },
            Expr::Special(special) => match &special.qualifier {
                Some(qualifier) => write!(f, "{}.{}", qualifier, special.kind),
                None => write!(f, "{}", special.kind),
            },
            Expr::Ambiguous(amb) => match &amb.prefix {
                Some(prefix) => write!(f, "{}.{}", prefix, amb.name),
                None => write!(f, "{}", amb.name),
            },
        }
    }
}
