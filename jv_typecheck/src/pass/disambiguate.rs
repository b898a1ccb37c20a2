//! Turns the names the parser couldn't classify into locals, field accesses, types and
//! packages. Nothing else in the tree changes, so code without ambiguous names comes back
//! as the same nodes.

use crate::{
    annotation::{DeclRef, Typed},
    context::{Context, Variable},
    def::{ClassId, CodeId},
    goal::{GoalId, GoalRun},
    job::Compiler,
    pass::{finish_code_pass, hierarchies_settled, log_deferred, log_error, PassLog, SharedLog},
    resolve::{Named, ResolveError},
    result::{NameError, TypeError, TypeResult},
    ty::Type,
};
use jv_common::span::*;
use jv_syn::{
    visit::{rewrite_member, rewrite_prefix, Rewriter},
    AmbExpr, AmbTypeNode, Expr, FieldAccess, Formal, IdentPath, Ident, LocalRef, Prefix, Special, SpecialKind, Stmt,
    TypeNode,
};
use std::rc::Rc;

/// Where a name appears, which decides what it may resolve to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum NamePos {
    /// A whole expression: must be a variable.
    Expr,

    /// The left side of a `.` in an expression: a variable, a type or a package.
    Ambiguous,

    /// The left side of a `.` in a type name.
    PackageOrType,

    /// A whole type name.
    Type,
}

impl NamePos {
    fn allows_value(self) -> bool {
        matches!(self, NamePos::Expr | NamePos::Ambiguous)
    }

    fn allows_package(self) -> bool {
        matches!(self, NamePos::Ambiguous | NamePos::PackageOrType)
    }

    fn allows_type(self) -> bool {
        self != NamePos::Expr
    }

    fn qualifier(self) -> NamePos {
        match self {
            NamePos::Expr | NamePos::Ambiguous => NamePos::Ambiguous,
            NamePos::PackageOrType | NamePos::Type => NamePos::PackageOrType,
        }
    }
}

/// A canonical type node for a class.
pub(crate) fn class_node(comp: &Compiler, class: ClassId, span: Span) -> TypeNode<Typed> {
    let ty = comp.defs.class_type(class);
    let annotation = Typed::new(span, ty.clone()).with_decl(DeclRef::Class(class));
    TypeNode::canonical(ty.to_string(), annotation)
}

fn field_access(target: Prefix<Typed>, name: &Ident, span: Span) -> Expr<Typed> {
    Expr::Field(Rc::new(FieldAccess {
        target,
        name: name.clone(),
        annotation: Typed::from(span),
    }))
}

fn not_found(name: &str, span: Span, pos: NamePos) -> TypeError {
    match pos {
        NamePos::Expr | NamePos::Ambiguous => NameError::NotFound(Ident::new(name, span)).into(),
        NamePos::PackageOrType | NamePos::Type => NameError::NoClass {
            name: name.to_string(),
            span,
        }
        .into(),
    }
}

fn resolve_error(err: ResolveError, name: &str, span: Span, pos: NamePos) -> TypeError {
    match err {
        ResolveError::NoClass(_) => not_found(name, span, pos),
        ResolveError::Ambiguous { options, .. } => NameError::Ambiguous {
            ident: Ident::new(name, span),
            options,
        }
        .into(),
    }
}

fn named_prefix(comp: &Compiler, named: Named, path: IdentPath, span: Span, pos: NamePos) -> TypeResult<Prefix<Typed>> {
    match named {
        Named::Class(_) if !pos.allows_type() => Err(TypeError::ExpectedValue {
            name: path.to_string(),
            span,
        }),
        Named::Class(class) => Ok(Prefix::ty(class_node(comp, class, span))),

        Named::Package(package) if pos.allows_package() => {
            let annotation = Typed::new(span, Type::Unknown).with_decl(DeclRef::Package(package));
            Ok(Prefix::package(path, annotation))
        },
        Named::Package(_) => Err(not_found(&path.to_string(), span, pos)),
    }
}

/// The expression a simple name refers to when it names a variable. Fields get an explicit
/// target: the class for static fields, `this` or a qualified `this` otherwise.
fn variable_expr(comp: &Compiler, ctx: &Context, var: Variable, name: &Ident, span: Span) -> TypeResult<Expr<Typed>> {
    let (field, class) = match var {
        Variable::Local(..) => {
            return Ok(Expr::Local(Rc::new(LocalRef {
                name: name.clone(),
                annotation: Typed::from(span),
            })))
        },
        Variable::Field { field, class } => (field, class),
    };

    let target = if field.flags(comp).is_static() {
        Prefix::ty(class_node(comp, class, name.span.clone()))
    } else {
        let is_current = ctx.current_class() == Some(class);
        if is_current && ctx.in_static_context() {
            return Err(TypeError::StaticContext {
                name: name.to_string(),
                span,
            });
        }

        let qualifier = if is_current {
            None
        } else {
            Some(class_node(comp, class, name.span.clone()))
        };
        Prefix::expr(Expr::Special(Rc::new(Special {
            kind: SpecialKind::This,
            qualifier,
            annotation: Typed::from(name.span.clone()),
        })))
    };

    Ok(field_access(target, name, span))
}

fn resolve_simple(comp: &mut Compiler, ctx: &Context, name: &Ident, span: Span, pos: NamePos) -> TypeResult<Prefix<Typed>> {
    if pos.allows_value() {
        if let Some(var) = ctx.find_variable_silent(comp, name.as_str()) {
            return variable_expr(comp, ctx, var, name, span).map(Prefix::expr);
        }
    }

    match ctx.find_named(comp, name.as_str()) {
        Ok(named) => named_prefix(comp, named, IdentPath::from(name.clone()), span, pos),
        Err(err) => Err(resolve_error(err, name.as_str(), span, pos)),
    }
}

/// Resolves `name` qualified by an already resolved prefix.
fn resolve_qualified(
    comp: &mut Compiler,
    ctx: &Context,
    prefix: Prefix<Typed>,
    name: &Ident,
    span: Span,
    pos: NamePos,
) -> TypeResult<Prefix<Typed>> {
    match prefix {
        Prefix::Package(package) => {
            let path = package.name.clone().child(name.clone());
            let full_name = path.join(".");
            match ctx.find_named(comp, &full_name) {
                Ok(named) => named_prefix(comp, named, path, span, pos),
                Err(err) => Err(resolve_error(err, &full_name, span, pos)),
            }
        },

        Prefix::Type(ty_prefix) => {
            let ty = ty_prefix.ty.annotation().ty.clone();
            let class = match ty.as_class() {
                Some(class) => class,
                None => {
                    return Err(NameError::MemberNotFound {
                        base: ty,
                        member: name.clone(),
                        args: None,
                    }
                    .into())
                },
            };

            if pos.allows_value() && comp.find_field_silent(class, name.as_str()).is_some() {
                let expr = field_access(Prefix::Type(ty_prefix), name, span);
                return Ok(Prefix::expr(expr));
            }

            if pos.allows_type() {
                if let Some(member) = comp.find_member_class(class, name.as_str()) {
                    return Ok(Prefix::ty(class_node(comp, member, span)));
                }
            }

            Err(NameError::MemberNotFound {
                base: ty,
                member: name.clone(),
                args: None,
            }
            .into())
        },

        prefix @ Prefix::Expr(..) => {
            if !pos.allows_value() {
                return Err(TypeError::ExpectedType {
                    name: format!("{}.{}", prefix, name),
                    span,
                });
            }
            Ok(Prefix::expr(field_access(prefix, name, span)))
        },

        Prefix::Ambiguous(..) => unreachable!("qualifier of `{}` must be resolved first", name),
    }
}

fn resolve_name(
    comp: &mut Compiler,
    ctx: &Context,
    prefix: Option<Prefix<Typed>>,
    name: &Ident,
    span: Span,
    pos: NamePos,
) -> TypeResult<Prefix<Typed>> {
    match prefix {
        None => resolve_simple(comp, ctx, name, span, pos),
        Some(prefix) => resolve_qualified(comp, ctx, prefix, name, span, pos),
    }
}

fn resolve_prefix(comp: &mut Compiler, ctx: &Context, prefix: &Prefix<Typed>, pos: NamePos) -> TypeResult<Prefix<Typed>> {
    match prefix {
        Prefix::Ambiguous(amb) => {
            let qualifier = match &amb.prefix {
                Some(qualifier) => Some(resolve_prefix(comp, ctx, qualifier, pos.qualifier())?),
                None => None,
            };
            resolve_name(comp, ctx, qualifier, &amb.name, amb.annotation.span.clone(), pos)
        },
        resolved => Ok(resolved.clone()),
    }
}

fn resolve_type_name(comp: &mut Compiler, ctx: &Context, amb: &AmbTypeNode<Typed>) -> TypeResult<TypeNode<Typed>> {
    let qualifier = match &amb.prefix {
        Some(qualifier) => Some(resolve_prefix(comp, ctx, qualifier, NamePos::PackageOrType)?),
        None => None,
    };

    match resolve_name(comp, ctx, qualifier, &amb.name, amb.annotation.span.clone(), NamePos::Type)? {
        Prefix::Type(ty_prefix) => Ok(ty_prefix.ty.clone()),
        other => Err(TypeError::ExpectedType {
            name: other.to_string(),
            span: amb.annotation.span.clone(),
        }),
    }
}

/// The type a type node written in a class header or a signature denotes.
pub fn resolve_type(comp: &mut Compiler, ctx: &Context, node: &TypeNode<Typed>) -> TypeResult<Type> {
    match node {
        TypeNode::Primitive(primitive) => Ok(Type::Primitive(primitive.kind.into())),
        TypeNode::Array(array) => {
            let elem = resolve_type(comp, ctx, &array.elem)?;
            Ok(comp.defs.array_of(elem))
        },
        TypeNode::Canonical(canonical) => Ok(canonical.annotation.ty.clone()),
        TypeNode::Ambiguous(amb) => {
            let resolved = resolve_type_name(comp, ctx, amb)?;
            Ok(resolved.annotation().ty.clone())
        },
    }
}

#[derive(Clone)]
struct Disambiguator {
    ctx: Context,
    log: SharedLog,
}

impl Disambiguator {
    /// Logs a failed lookup, unless the name might still appear once the hierarchy of an
    /// enclosing class is known.
    fn fail(&self, comp: &mut Compiler, err: TypeError) {
        if hierarchies_settled(comp, &self.ctx) {
            log_error(&self.log, err);
        } else {
            log_deferred(&self.log);
        }
    }

    fn resolve_expr(&mut self, comp: &mut Compiler, amb: &AmbExpr<Typed>) -> TypeResult<Expr<Typed>> {
        let qualifier = match &amb.prefix {
            Some(qualifier) if qualifier.is_ambiguous() => {
                Some(resolve_prefix(comp, &self.ctx, qualifier, NamePos::Ambiguous)?)
            },
            Some(qualifier) => Some(rewrite_prefix(qualifier, self, comp)),
            None => None,
        };

        let span = amb.annotation.span.clone();
        match resolve_name(comp, &self.ctx, qualifier, &amb.name, span, NamePos::Expr)? {
            Prefix::Expr(expr_prefix) => Ok(expr_prefix.expr.clone()),
            other => Err(TypeError::ExpectedValue {
                name: other.to_string(),
                span: amb.annotation.span.clone(),
            }),
        }
    }
}

impl Rewriter<Typed> for Disambiguator {
    type Env = Compiler;

    fn leave_formal(&mut self, _comp: &mut Compiler, _old: &Rc<Formal<Typed>>, new: Rc<Formal<Typed>>) -> Rc<Formal<Typed>> {
        self.ctx = self.ctx.add_local(new.name.name.clone(), None, new.name.span.clone());
        new
    }

    fn enter_stmt(&mut self, _comp: &mut Compiler, stmt: &Stmt<Typed>) -> Self {
        Self {
            ctx: super::stmt_context(&self.ctx, stmt),
            log: self.log.clone(),
        }
    }

    fn add_decls(&mut self, _comp: &mut Compiler, stmt: &Stmt<Typed>) {
        if let Stmt::LocalDecl(decl) = stmt {
            self.ctx = self.ctx.add_local(decl.name.name.clone(), None, decl.name.span.clone());
        }
    }

    fn override_expr(&mut self, comp: &mut Compiler, expr: &Expr<Typed>) -> Option<Expr<Typed>> {
        let amb = match expr {
            Expr::Ambiguous(amb) => amb,
            _ => return None,
        };

        match self.resolve_expr(comp, amb) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                self.fail(comp, err);
                Some(expr.clone())
            },
        }
    }

    fn override_prefix(&mut self, comp: &mut Compiler, prefix: &Prefix<Typed>) -> Option<Prefix<Typed>> {
        if !prefix.is_ambiguous() {
            return None;
        }

        match resolve_prefix(comp, &self.ctx, prefix, NamePos::Ambiguous) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                self.fail(comp, err);
                Some(prefix.clone())
            },
        }
    }

    fn override_type_node(&mut self, comp: &mut Compiler, ty: &TypeNode<Typed>) -> Option<TypeNode<Typed>> {
        let amb = match ty {
            TypeNode::Ambiguous(amb) => amb,
            _ => return None,
        };

        match resolve_type_name(comp, &self.ctx, amb) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                self.fail(comp, err);
                Some(ty.clone())
            },
        }
    }
}

/// Goal body: disambiguates the latest code of a member.
pub fn run(comp: &mut Compiler, goal: GoalId, code: CodeId) -> GoalRun {
    let member = match comp.defs.code_ref(code).and_then(|code_ref| code_ref.latest()) {
        Some(member) => member.clone(),
        None => unreachable!("{:?} has no code", code),
    };

    let log = PassLog::shared();
    let mut disambiguator = Disambiguator {
        ctx: comp.code_context(code),
        log: log.clone(),
    };

    let result = rewrite_member(&member, &mut disambiguator, comp);
    finish_code_pass(comp, goal, code, &log, result)
}
