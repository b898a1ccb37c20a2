use super::TypeChecker;
use crate::{
    annotation::{DeclRef, Typed},
    def::{CodeId, FieldInstance},
    goal::{GoalKind, GoalTarget},
    job::Compiler,
    result::{NameError, TypeError, TypeResult},
    ty::{fold_binary, fold_unary, ConstValue, Type},
};
use jv_common::span::*;
use jv_syn::{
    ArrayAccess, Assign, BinaryOp, Call, Cast, Conditional, Expr, FieldAccess, Ident, InstanceOf, LiteralValue,
    New, NewArray, Prefix, ProcKind, Special, SpecialKind, Unary, UnaryOp,
};

/// The annotation of an expression whose children have already been checked.
pub(super) fn typecheck_expr(comp: &mut Compiler, checker: &TypeChecker, expr: &Expr<Typed>) -> TypeResult<Typed> {
    let span = expr.span().clone();

    match expr {
        Expr::Literal(literal) => Ok(typecheck_literal(comp, &literal.value, span)),
        Expr::Local(local) => typecheck_local(comp, checker, &local.name, span),
        Expr::Field(access) => typecheck_field_access(comp, checker, access, span),
        Expr::Call(call) => typecheck_call(comp, checker, call, span),
        Expr::New(new) => typecheck_new(comp, checker, new, span),
        Expr::NewArray(new_array) => typecheck_new_array(comp, new_array, span),
        Expr::ArrayAccess(access) => typecheck_array_access(comp, access, span),
        Expr::Unary(unary) => typecheck_unary(comp, checker, unary, span),
        Expr::Binary(binary) => {
            let lhs = binary.lhs.annotation();
            let rhs = binary.rhs.annotation();
            typecheck_binary_op(comp, binary.op, lhs, rhs, span)
        },
        Expr::Assign(assign) => typecheck_assign(comp, checker, assign, span),
        Expr::Cast(cast) => typecheck_cast(comp, cast, span),
        Expr::InstanceOf(instance_of) => typecheck_instance_of(comp, instance_of, span),
        Expr::Conditional(cond) => typecheck_conditional(comp, checker, cond, span),
        Expr::Special(special) => typecheck_special(comp, checker, special, span),

        // only left behind when disambiguation already reported it
        Expr::Ambiguous(..) => Ok(Typed::from(span)),
    }
}

fn typecheck_literal(comp: &mut Compiler, value: &LiteralValue, span: Span) -> Typed {
    let ty = match value {
        LiteralValue::Int(..) => Type::INT,
        LiteralValue::Long(..) => Type::LONG,
        LiteralValue::Float(..) => Type::FLOAT,
        LiteralValue::Double(..) => Type::DOUBLE,
        LiteralValue::Char(..) => Type::CHAR,
        LiteralValue::Boolean(..) => Type::BOOLEAN,
        LiteralValue::String(..) => comp.string_type(),
        LiteralValue::Null => Type::Null,
    };

    Typed::new(span, ty).with_constant(ConstValue::from_literal(value))
}

fn typecheck_local(comp: &mut Compiler, checker: &TypeChecker, name: &Ident, span: Span) -> TypeResult<Typed> {
    let binding = checker
        .ctx
        .find_local(name.as_str())
        .ok_or_else(|| NameError::NotFound(name.clone()))?;

    match binding.local {
        Some(local) => {
            let ty = comp.defs.local(local).ty.clone();
            Ok(Typed::new(span, ty).with_decl(DeclRef::Local(local)))
        },

        // its declaration failed to check
        None => Ok(Typed::from(span)),
    }
}

fn field_annotation(comp: &mut Compiler, checker: &TypeChecker, field: &FieldInstance, span: Span) -> Typed {
    let ty = field.ty(comp);
    checker.depend(comp, GoalKind::Signature, GoalTarget::Field(field.def));

    let field_def = comp.defs.field(field.def);
    let has_source_init = field_def.decl().is_some() && field_def.has_init();

    let constant = if field.flags(comp).is_final() {
        let constant = comp.field_constant(field.def);

        // no value yet because the initializer's checker gave up for now
        if constant.is_none() && has_source_init {
            checker.depend(comp, GoalKind::TypeChecked, GoalTarget::Field(field.def));
        }
        constant
    } else {
        None
    };

    Typed::new(span, ty)
        .with_decl(DeclRef::Field(field.def))
        .with_constant(constant)
}

fn typecheck_field_access(
    comp: &mut Compiler,
    checker: &TypeChecker,
    access: &FieldAccess<Typed>,
    span: Span,
) -> TypeResult<Typed> {
    match &access.target {
        Prefix::Type(ty_prefix) => {
            let ty = ty_prefix.ty.annotation().ty.clone();
            let field = comp.find_field(&ty, &access.name, checker.class)?;
            if !field.flags(comp).is_static() {
                return Err(TypeError::StaticContext {
                    name: format!("{}.{}", ty, access.name),
                    span,
                });
            }
            Ok(field_annotation(comp, checker, &field, span))
        },

        Prefix::Expr(expr_prefix) => {
            let ty = expr_prefix.expr.annotation().ty.clone();
            if ty.is_unknown() {
                return Ok(Typed::from(span));
            }

            if ty.array_elem().is_some() && access.name.as_str() == "length" {
                return Ok(Typed::new(span, Type::INT));
            }

            let field = comp.find_field(&ty, &access.name, checker.class)?;
            Ok(field_annotation(comp, checker, &field, span))
        },

        Prefix::Package(package) => Err(TypeError::ExpectedValue {
            name: package.name.to_string(),
            span,
        }),

        Prefix::Ambiguous(..) => Ok(Typed::from(span)),
    }
}

fn arg_types(args: &[Expr<Typed>]) -> Vec<Type> {
    args.iter().map(|arg| arg.annotation().ty.clone()).collect()
}

fn typecheck_call(comp: &mut Compiler, checker: &TypeChecker, call: &Call<Typed>, span: Span) -> TypeResult<Typed> {
    let args = arg_types(&call.args);

    // the type the method is looked up in, and whether it needs to be static
    let (receiver, needs_static) = match &call.target {
        None => {
            let scope = match checker.ctx.find_method_scope(comp, call.name.as_str()) {
                Some(scope) => scope,
                None => {
                    return Err(NameError::MemberNotFound {
                        base: comp.defs.class_type(checker.class),
                        member: call.name.clone(),
                        args: Some(args),
                    }
                    .into())
                },
            };
            let in_static = checker.ctx.in_static_context() && scope == checker.class;
            (comp.defs.class_type(scope), in_static)
        },

        Some(Prefix::Type(ty_prefix)) => (ty_prefix.ty.annotation().ty.clone(), true),
        Some(Prefix::Expr(expr_prefix)) => (expr_prefix.expr.annotation().ty.clone(), false),

        Some(Prefix::Package(package)) => {
            return Err(TypeError::ExpectedValue {
                name: package.name.to_string(),
                span,
            })
        },
        Some(Prefix::Ambiguous(..)) => return Ok(Typed::from(span)),
    };

    if receiver.is_unknown() {
        return Ok(Typed::from(span));
    }

    let method = comp.find_method(&receiver, &call.name, &args, checker.class)?;
    if needs_static && !method.flags(comp).is_static() {
        return Err(TypeError::StaticContext {
            name: format!("{}.{}", receiver, call.name),
            span,
        });
    }

    let sig = method.sig(comp);
    checker.depend(comp, GoalKind::Signature, GoalTarget::Proc(method.def));
    for thrown in &sig.throws {
        checker.check_thrown(comp, thrown, &span);
    }

    Ok(Typed::new(span, sig.ret.clone()).with_decl(DeclRef::Proc(method.def)))
}

fn typecheck_new(comp: &mut Compiler, checker: &TypeChecker, new: &New<Typed>, span: Span) -> TypeResult<Typed> {
    let ty = new.ty.annotation().ty.clone();
    if ty.is_unknown() {
        return Ok(Typed::from(span));
    }

    let class = ty.as_class().ok_or_else(|| TypeError::ExpectedType {
        name: ty.to_string(),
        span: span.clone(),
    })?;

    if comp.defs.class(class).flags.is_abstract() {
        return Err(TypeError::AbstractInstantiation { ty, span });
    }

    let args = arg_types(&new.args);
    let ctor = comp.find_constructor(class, &args, checker.class, &span)?;

    let sig = ctor.sig(comp);
    checker.depend(comp, GoalKind::Signature, GoalTarget::Proc(ctor.def));
    for thrown in &sig.throws {
        checker.check_thrown(comp, thrown, &span);
    }

    Ok(Typed::new(span, ty).with_decl(DeclRef::Proc(ctor.def)))
}

/// Checks that an array size or index promotes to `int`.
fn check_index(comp: &Compiler, index: &Expr<Typed>) -> TypeResult<()> {
    let ty = &index.annotation().ty;
    match comp.numeric_promote(ty) {
        Some(promoted) if promoted == Type::INT || promoted.is_unknown() => Ok(()),
        _ => Err(TypeError::TypeMismatch {
            expected: Type::INT,
            actual: ty.clone(),
            span: index.span().clone(),
        }),
    }
}

fn typecheck_new_array(comp: &mut Compiler, new_array: &NewArray<Typed>, span: Span) -> TypeResult<Typed> {
    for dim in &new_array.dims {
        check_index(comp, dim)?;
    }

    let elem = new_array.elem.annotation().ty.clone();
    let ty = comp.defs.array_dims(elem, new_array.dims.len() + new_array.extra_dims);
    Ok(Typed::new(span, ty))
}

fn typecheck_array_access(comp: &mut Compiler, access: &ArrayAccess<Typed>, span: Span) -> TypeResult<Typed> {
    check_index(comp, &access.index)?;

    let array_ty = access.array.annotation().ty.clone();
    if array_ty.is_unknown() {
        return Ok(Typed::from(span));
    }

    match array_ty.array_elem() {
        Some(elem) => Ok(Typed::new(span, elem.clone())),
        None => Err(TypeError::TypeMismatch {
            expected: comp.defs.array_of(Type::Unknown),
            actual: array_ty,
            span: access.array.span().clone(),
        }),
    }
}

/// Whether an expression denotes a variable that can be assigned to.
fn is_variable(expr: &Expr<Typed>) -> bool {
    matches!(expr, Expr::Local(..) | Expr::Field(..) | Expr::ArrayAccess(..))
}

/// Reports assigning to a final variable. Blank final fields may be assigned by the
/// constructors and initializers of their own class.
fn check_not_final(comp: &Compiler, checker: &TypeChecker, target: &Expr<Typed>) -> TypeResult<()> {
    let name = match target {
        Expr::Local(local) => &local.name,
        Expr::Field(access) => &access.name,
        _ => return Ok(()),
    };

    let is_final = match &target.annotation().decl {
        Some(DeclRef::Local(local)) => comp.defs.local(*local).flags.is_final(),

        Some(DeclRef::Field(field)) => {
            let field_def = comp.defs.field(*field);
            let in_own_initialization = match checker.code {
                CodeId::Proc(proc_id) => {
                    let proc_def = comp.defs.proc(proc_id);
                    proc_def.kind == ProcKind::Constructor && !field_def.flags.is_static()
                },
                CodeId::Init(init) => comp.defs.init(init).is_static == field_def.flags.is_static(),
                CodeId::Field(..) => false,
            };

            let is_blank = field_def.decl().is_some() && !field_def.has_init();
            let may_initialize = is_blank && in_own_initialization && field_def.container == checker.class;
            field_def.flags.is_final() && !may_initialize
        },

        _ => false,
    };

    if is_final {
        Err(TypeError::AssignToFinal {
            name: name.name.clone(),
            span: target.span().clone(),
        })
    } else {
        Ok(())
    }
}

fn typecheck_unary(comp: &mut Compiler, checker: &TypeChecker, unary: &Unary<Typed>, span: Span) -> TypeResult<Typed> {
    let operand = unary.operand.annotation();
    if operand.ty.is_unknown() {
        return Ok(Typed::from(span));
    }

    let invalid = || TypeError::InvalidOperand {
        op: unary.op,
        operand: operand.ty.clone(),
        span: span.clone(),
    };

    let ty = match unary.op {
        UnaryOp::Not if operand.ty.is_boolean() => Type::BOOLEAN,
        UnaryOp::Neg | UnaryOp::Pos if operand.ty.is_numeric() => comp.numeric_promote(&operand.ty).ok_or_else(invalid)?,
        UnaryOp::BitNot if operand.ty.is_integral() => comp.numeric_promote(&operand.ty).ok_or_else(invalid)?,

        op if op.is_increment() && operand.ty.is_numeric() => {
            if !is_variable(&unary.operand) {
                return Err(TypeError::NotAVariable {
                    span: unary.operand.span().clone(),
                });
            }
            check_not_final(comp, checker, &unary.operand)?;
            return Ok(Typed::new(span, operand.ty.clone()));
        },

        _ => return Err(invalid()),
    };

    let constant = operand
        .constant
        .as_ref()
        .and_then(|constant| fold_unary(unary.op, constant, &ty));
    Ok(Typed::new(span, ty).with_constant(constant))
}

/// The result and operand types of a binary operator, or `None` if the operands don't
/// fit it. Operands are promoted to the operand type before the operation.
fn binary_types(comp: &mut Compiler, op: BinaryOp, lhs: &Type, rhs: &Type) -> Option<(Type, Type)> {
    if op == BinaryOp::Add && (comp.is_string(lhs) || comp.is_string(rhs)) {
        if lhs.is_void() || rhs.is_void() {
            return None;
        }
        let string = comp.string_type();
        return Some((string.clone(), string));
    }

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let promoted = comp.numeric_promote_binary(lhs, rhs)?;
            Some((promoted.clone(), promoted))
        },

        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
            if !lhs.is_integral() || !rhs.is_integral() {
                return None;
            }
            let promoted = comp.numeric_promote(lhs)?;
            Some((promoted.clone(), promoted))
        },

        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
            let promoted = comp.numeric_promote_binary(lhs, rhs)?;
            Some((Type::BOOLEAN, promoted))
        },

        BinaryOp::Equals | BinaryOp::NotEquals => {
            if lhs.is_numeric() && rhs.is_numeric() {
                let promoted = comp.numeric_promote_binary(lhs, rhs)?;
                Some((Type::BOOLEAN, promoted))
            } else if lhs.is_boolean() && rhs.is_boolean() {
                Some((Type::BOOLEAN, Type::BOOLEAN))
            } else if lhs.is_reference() && rhs.is_reference() {
                let comparable = comp.is_castable(lhs, rhs) || comp.is_castable(rhs, lhs);
                Some((Type::BOOLEAN, lhs.clone())).filter(|_| comparable)
            } else {
                None
            }
        },

        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            if lhs.is_boolean() && rhs.is_boolean() {
                Some((Type::BOOLEAN, Type::BOOLEAN))
            } else if lhs.is_integral() && rhs.is_integral() {
                let promoted = comp.numeric_promote_binary(lhs, rhs)?;
                Some((promoted.clone(), promoted))
            } else {
                None
            }
        },

        BinaryOp::And | BinaryOp::Or => {
            if lhs.is_boolean() && rhs.is_boolean() {
                Some((Type::BOOLEAN, Type::BOOLEAN))
            } else {
                None
            }
        },
    }
}

fn typecheck_binary_op(comp: &mut Compiler, op: BinaryOp, lhs: &Typed, rhs: &Typed, span: Span) -> TypeResult<Typed> {
    if lhs.ty.is_unknown() || rhs.ty.is_unknown() {
        return Ok(Typed::from(span));
    }

    let (result_ty, operand_ty) = binary_types(comp, op, &lhs.ty, &rhs.ty).ok_or_else(|| TypeError::InvalidBinaryOperands {
        op,
        lhs: lhs.ty.clone(),
        rhs: rhs.ty.clone(),
        span: span.clone(),
    })?;

    let constant = match (&lhs.constant, &rhs.constant) {
        (Some(l), Some(r)) => fold_binary(op, l, r, &operand_ty, &result_ty),
        _ => None,
    };
    Ok(Typed::new(span, result_ty).with_constant(constant))
}

fn typecheck_assign(comp: &mut Compiler, checker: &TypeChecker, assign: &Assign<Typed>, span: Span) -> TypeResult<Typed> {
    if !is_variable(&assign.target) {
        return Err(TypeError::NotAVariable {
            span: assign.target.span().clone(),
        });
    }
    check_not_final(comp, checker, &assign.target)?;

    let target = assign.target.annotation();
    let value = assign.value.annotation();
    if target.ty.is_unknown() || value.ty.is_unknown() {
        return Ok(Typed::new(span, target.ty.clone()));
    }

    let assignable = match assign.op {
        None => comp.is_assignable(&value.ty, value.constant.as_ref(), &target.ty),

        // compound assignments cast the result back to the target type
        Some(op) => {
            let result = typecheck_binary_op(comp, op, target, value, span.clone())?;
            comp.is_castable(&result.ty, &target.ty)
        },
    };

    if !assignable {
        return Err(TypeError::TypeMismatch {
            expected: target.ty.clone(),
            actual: value.ty.clone(),
            span: assign.value.span().clone(),
        });
    }

    Ok(Typed::new(span, target.ty.clone()))
}

fn typecheck_cast(comp: &mut Compiler, cast: &Cast<Typed>, span: Span) -> TypeResult<Typed> {
    let to = cast.ty.annotation().ty.clone();
    let from = cast.expr.annotation();

    if !comp.is_castable(&from.ty, &to) {
        return Err(TypeError::InvalidCast {
            from: from.ty.clone(),
            to,
            span,
        });
    }

    let constant = match (&to, &from.constant) {
        (Type::Primitive(primitive), Some(constant)) => constant.convert(*primitive),
        (_, Some(constant @ ConstValue::String(..))) if comp.is_string(&to) => Some(constant.clone()),
        _ => None,
    };
    Ok(Typed::new(span, to).with_constant(constant))
}

fn typecheck_instance_of(comp: &mut Compiler, instance_of: &InstanceOf<Typed>, span: Span) -> TypeResult<Typed> {
    let from = instance_of.expr.annotation().ty.clone();
    let to = instance_of.ty.annotation().ty.clone();

    let reference_or_unknown = |ty: &Type| ty.is_reference() || ty.is_unknown();
    if !reference_or_unknown(&from) || !reference_or_unknown(&to) || !comp.is_castable(&from, &to) {
        return Err(TypeError::InvalidCast { from, to, span });
    }

    Ok(Typed::new(span, Type::BOOLEAN))
}

fn typecheck_conditional(
    comp: &mut Compiler,
    checker: &TypeChecker,
    cond: &Conditional<Typed>,
    span: Span,
) -> TypeResult<Typed> {
    checker.check_condition(comp, &cond.cond);

    let then_ty = cond.then_expr.annotation().ty.clone();
    let else_ty = cond.else_expr.annotation().ty.clone();
    let ty = comp
        .least_common_ancestor(&then_ty, &else_ty)
        .ok_or_else(|| TypeError::NoCommonAncestor {
            a: then_ty.clone(),
            b: else_ty.clone(),
            span: span.clone(),
        })?;

    let chosen = match cond.cond.annotation().constant.as_ref().and_then(|c| c.as_bool()) {
        Some(true) => cond.then_expr.annotation().constant.clone(),
        Some(false) => cond.else_expr.annotation().constant.clone(),
        None => None,
    };
    let constant = match (&ty, chosen) {
        (Type::Primitive(primitive), Some(value)) => value.convert(*primitive),
        (_, value) => value.filter(|value| matches!(value, ConstValue::String(..))),
    };

    Ok(Typed::new(span, ty).with_constant(constant))
}

fn typecheck_special(comp: &mut Compiler, checker: &TypeChecker, special: &Special<Typed>, span: Span) -> TypeResult<Typed> {
    let keyword = special.kind;

    if checker.ctx.in_static_context() {
        return Err(TypeError::StaticContext {
            name: keyword.to_string(),
            span,
        });
    }

    let class = match &special.qualifier {
        None => checker.class,
        Some(qualifier) => {
            let qualifier_ty = qualifier.annotation().ty.clone();
            let outer = match qualifier_ty.as_class() {
                Some(outer) => outer,
                None => return Ok(Typed::from(span)),
            };

            // every class between here and the qualifying class needs an enclosing instance
            let mut next = Some(checker.class);
            loop {
                match next {
                    Some(class) if class == outer => break,
                    Some(class) if comp.defs.class(class).flags.is_static() => {
                        return Err(TypeError::StaticContext {
                            name: format!("{}.{}", qualifier_ty, keyword),
                            span,
                        })
                    },
                    Some(class) => next = comp.defs.class(class).outer,
                    None => {
                        let ident = Ident::new(&format!("{}.{}", qualifier_ty, keyword), span);
                        return Err(NameError::NotFound(ident).into());
                    },
                }
            }
            outer
        },
    };

    let ty = match special.kind {
        SpecialKind::This => comp.defs.class_type(class),
        SpecialKind::Super => match comp.superclass(class) {
            Some(superclass) => superclass,
            None => comp.object_type(),
        },
    };

    Ok(Typed::new(span, ty).with_decl(DeclRef::Class(class)))
}
