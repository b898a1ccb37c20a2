//! Tree rewriting. A [Rewriter] is offered every node top-down: `override_*` may replace a
//! node outright, otherwise `enter_*` produces the visitor used for the node's children,
//! the children are rewritten, and `leave_*` sees the original node, the node rebuilt from
//! the rewritten children and the child visitor. A node whose children all come back
//! unchanged is returned as the same `Rc`, so a rewriter that changes nothing returns
//! the tree it was given.
//!
//! Every hook also receives the rewriter's `Env`, a single mutable environment shared by
//! the whole traversal, alongside the cloned per-scope visitor.

use crate::ast::*;
use std::rc::Rc;

#[cfg(test)]
mod test;

pub trait Rewriter<A: Annotation>: Clone {
    /// State shared by the whole traversal rather than copied into each child visitor.
    type Env;

    fn override_class(&mut self, _env: &mut Self::Env, _class: &Rc<ClassDecl<A>>) -> Option<Rc<ClassDecl<A>>> {
        None
    }

    fn enter_class(&mut self, _env: &mut Self::Env, _class: &Rc<ClassDecl<A>>) -> Self {
        self.clone()
    }

    fn leave_class(&mut self, _env: &mut Self::Env, _old: &Rc<ClassDecl<A>>, new: Rc<ClassDecl<A>>, _child: Self) -> Rc<ClassDecl<A>> {
        new
    }

    fn override_member(&mut self, _env: &mut Self::Env, _member: &Member<A>) -> Option<Member<A>> {
        None
    }

    fn enter_member(&mut self, _env: &mut Self::Env, _member: &Member<A>) -> Self {
        self.clone()
    }

    fn leave_member(&mut self, _env: &mut Self::Env, _old: &Member<A>, new: Member<A>, _child: Self) -> Member<A> {
        new
    }

    fn leave_formal(&mut self, _env: &mut Self::Env, _old: &Rc<Formal<A>>, new: Rc<Formal<A>>) -> Rc<Formal<A>> {
        new
    }

    fn override_stmt(&mut self, _env: &mut Self::Env, _stmt: &Stmt<A>) -> Option<Stmt<A>> {
        None
    }

    fn enter_stmt(&mut self, _env: &mut Self::Env, _stmt: &Stmt<A>) -> Self {
        self.clone()
    }

    fn leave_stmt(&mut self, _env: &mut Self::Env, _old: &Stmt<A>, new: Stmt<A>, _child: Self) -> Stmt<A> {
        new
    }

    /// Called on the visitor of a block or `for` header after each of its statements has
    /// been rewritten, so declarations become visible to the statements that follow.
    fn add_decls(&mut self, _env: &mut Self::Env, _stmt: &Stmt<A>) {}

    fn override_expr(&mut self, _env: &mut Self::Env, _expr: &Expr<A>) -> Option<Expr<A>> {
        None
    }

    fn enter_expr(&mut self, _env: &mut Self::Env, _expr: &Expr<A>) -> Self {
        self.clone()
    }

    fn leave_expr(&mut self, _env: &mut Self::Env, _old: &Expr<A>, new: Expr<A>, _child: Self) -> Expr<A> {
        new
    }

    fn override_prefix(&mut self, _env: &mut Self::Env, _prefix: &Prefix<A>) -> Option<Prefix<A>> {
        None
    }

    fn enter_prefix(&mut self, _env: &mut Self::Env, _prefix: &Prefix<A>) -> Self {
        self.clone()
    }

    fn leave_prefix(&mut self, _env: &mut Self::Env, _old: &Prefix<A>, new: Prefix<A>, _child: Self) -> Prefix<A> {
        new
    }

    fn override_type_node(&mut self, _env: &mut Self::Env, _ty: &TypeNode<A>) -> Option<TypeNode<A>> {
        None
    }

    fn enter_type_node(&mut self, _env: &mut Self::Env, _ty: &TypeNode<A>) -> Self {
        self.clone()
    }

    fn leave_type_node(&mut self, _env: &mut Self::Env, _old: &TypeNode<A>, new: TypeNode<A>, _child: Self) -> TypeNode<A> {
        new
    }
}

pub fn rewrite_unit<A: Annotation, V: Rewriter<A>>(unit: &Rc<Unit<A>>, v: &mut V, env: &mut V::Env) -> Rc<Unit<A>> {
    let classes: Vec<_> = unit.classes.iter().map(|class| rewrite_class(class, v, env)).collect();

    if same_all(&classes, &unit.classes, Rc::ptr_eq) {
        unit.clone()
    } else {
        Rc::new(Unit {
            classes,
            ..(**unit).clone()
        })
    }
}

pub fn rewrite_class<A: Annotation, V: Rewriter<A>>(class: &Rc<ClassDecl<A>>, v: &mut V, env: &mut V::Env) -> Rc<ClassDecl<A>> {
    if let Some(replaced) = v.override_class(env, class) {
        return replaced;
    }

    let mut child = v.enter_class(env, class);

    let superclass = class.superclass.as_ref().map(|ty| rewrite_type_node(ty, &mut child, env));
    let interfaces = rewrite_type_nodes(&class.interfaces, &mut child, env);
    let members: Vec<_> = class.members.iter().map(|m| rewrite_member(m, &mut child, env)).collect();

    let new = if superclass == class.superclass && interfaces == class.interfaces && members == class.members {
        class.clone()
    } else {
        Rc::new(ClassDecl {
            superclass,
            interfaces,
            members,
            ..(**class).clone()
        })
    };

    v.leave_class(env, class, new, child)
}

pub fn rewrite_member<A: Annotation, V: Rewriter<A>>(member: &Member<A>, v: &mut V, env: &mut V::Env) -> Member<A> {
    if let Some(replaced) = v.override_member(env, member) {
        return replaced;
    }

    let mut child = v.enter_member(env, member);

    let new = match member {
        Member::Field(field) => {
            let ty = rewrite_type_node(&field.ty, &mut child, env);
            let init = field.init.as_ref().map(|init| rewrite_expr(init, &mut child, env));

            if ty == field.ty && init == field.init {
                member.clone()
            } else {
                Member::Field(Rc::new(FieldDecl {
                    ty,
                    init,
                    ..(**field).clone()
                }))
            }
        },

        Member::Proc(proc_decl) => {
            let ret = proc_decl.ret.as_ref().map(|ret| rewrite_type_node(ret, &mut child, env));

            let mut formals_changed = false;
            let mut formals = Vec::with_capacity(proc_decl.formals.len());
            for formal in &proc_decl.formals {
                let ty = rewrite_type_node(&formal.ty, &mut child, env);
                let rebuilt = if ty == formal.ty {
                    formal.clone()
                } else {
                    Rc::new(Formal {
                        ty,
                        ..(**formal).clone()
                    })
                };
                let new_formal = child.leave_formal(env, formal, rebuilt);
                formals_changed |= !Rc::ptr_eq(&new_formal, formal);
                formals.push(new_formal);
            }

            let throws = rewrite_type_nodes(&proc_decl.throws, &mut child, env);
            let body = proc_decl.body.as_ref().map(|body| rewrite_body(body, &mut child, env));

            let body_same = match (&body, &proc_decl.body) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };

            if ret == proc_decl.ret && !formals_changed && throws == proc_decl.throws && body_same {
                member.clone()
            } else {
                Member::Proc(Rc::new(ProcDecl {
                    ret,
                    formals: if formals_changed { formals } else { proc_decl.formals.clone() },
                    throws,
                    body,
                    ..(**proc_decl).clone()
                }))
            }
        },

        Member::Initializer(init) => {
            let body = rewrite_body(&init.body, &mut child, env);
            if Rc::ptr_eq(&body, &init.body) {
                member.clone()
            } else {
                Member::Initializer(Rc::new(Initializer {
                    body,
                    ..(**init).clone()
                }))
            }
        },

        Member::Class(class) => {
            let new_class = rewrite_class(class, &mut child, env);
            if Rc::ptr_eq(&new_class, class) {
                member.clone()
            } else {
                Member::Class(new_class)
            }
        },
    };

    v.leave_member(env, member, new, child)
}

/// Rewrites a method or initializer body as a block statement so the rewriter sees it
/// like any other block.
pub fn rewrite_body<A: Annotation, V: Rewriter<A>>(body: &Rc<Block<A>>, v: &mut V, env: &mut V::Env) -> Rc<Block<A>> {
    match rewrite_stmt(&Stmt::Block(body.clone()), v, env) {
        Stmt::Block(block) => block,
        other => {
            let annotation = other.annotation().clone();
            Rc::new(Block {
                stmts: vec![other],
                annotation,
            })
        },
    }
}

fn rewrite_stmt_list<A: Annotation, V: Rewriter<A>>(stmts: &[Stmt<A>], v: &mut V, env: &mut V::Env) -> Vec<Stmt<A>> {
    let mut result = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        let new = rewrite_stmt(stmt, v, env);
        v.add_decls(env, &new);
        result.push(new);
    }
    result
}

pub fn rewrite_stmt<A: Annotation, V: Rewriter<A>>(stmt: &Stmt<A>, v: &mut V, env: &mut V::Env) -> Stmt<A> {
    if let Some(replaced) = v.override_stmt(env, stmt) {
        return replaced;
    }

    let mut child = v.enter_stmt(env, stmt);
    let c = &mut child;

    let new = match stmt {
        Stmt::Block(block) => {
            let stmts = rewrite_stmt_list(&block.stmts, c, env);
            if stmts == block.stmts {
                stmt.clone()
            } else {
                Stmt::Block(Rc::new(Block {
                    stmts,
                    annotation: block.annotation.clone(),
                }))
            }
        },

        Stmt::LocalDecl(decl) => {
            let ty = rewrite_type_node(&decl.ty, c, env);
            let init = decl.init.as_ref().map(|init| rewrite_expr(init, c, env));
            if ty == decl.ty && init == decl.init {
                stmt.clone()
            } else {
                Stmt::LocalDecl(Rc::new(LocalDecl {
                    ty,
                    init,
                    ..(**decl).clone()
                }))
            }
        },

        Stmt::Expr(expr_stmt) => {
            let expr = rewrite_expr(&expr_stmt.expr, c, env);
            if expr == expr_stmt.expr {
                stmt.clone()
            } else {
                Stmt::Expr(Rc::new(ExprStmt {
                    expr,
                    annotation: expr_stmt.annotation.clone(),
                }))
            }
        },

        Stmt::If(if_stmt) => {
            let cond = rewrite_expr(&if_stmt.cond, c, env);
            let then_branch = rewrite_stmt(&if_stmt.then_branch, c, env);
            let else_branch = if_stmt.else_branch.as_ref().map(|s| rewrite_stmt(s, c, env));
            if cond == if_stmt.cond && then_branch == if_stmt.then_branch && else_branch == if_stmt.else_branch {
                stmt.clone()
            } else {
                Stmt::If(Rc::new(If {
                    cond,
                    then_branch,
                    else_branch,
                    annotation: if_stmt.annotation.clone(),
                }))
            }
        },

        Stmt::While(while_stmt) => {
            let cond = rewrite_expr(&while_stmt.cond, c, env);
            let body = rewrite_stmt(&while_stmt.body, c, env);
            if cond == while_stmt.cond && body == while_stmt.body {
                stmt.clone()
            } else {
                Stmt::While(Rc::new(While {
                    cond,
                    body,
                    annotation: while_stmt.annotation.clone(),
                }))
            }
        },

        Stmt::Do(do_stmt) => {
            let body = rewrite_stmt(&do_stmt.body, c, env);
            let cond = rewrite_expr(&do_stmt.cond, c, env);
            if cond == do_stmt.cond && body == do_stmt.body {
                stmt.clone()
            } else {
                Stmt::Do(Rc::new(Do {
                    body,
                    cond,
                    annotation: do_stmt.annotation.clone(),
                }))
            }
        },

        Stmt::For(for_stmt) => {
            let init = rewrite_stmt_list(&for_stmt.init, c, env);
            let cond = for_stmt.cond.as_ref().map(|cond| rewrite_expr(cond, c, env));
            let update = rewrite_exprs(&for_stmt.update, c, env);
            let body = rewrite_stmt(&for_stmt.body, c, env);
            if init == for_stmt.init && cond == for_stmt.cond && update == for_stmt.update && body == for_stmt.body {
                stmt.clone()
            } else {
                Stmt::For(Rc::new(For {
                    init,
                    cond,
                    update,
                    body,
                    annotation: for_stmt.annotation.clone(),
                }))
            }
        },

        Stmt::Return(ret) => {
            let value = ret.value.as_ref().map(|value| rewrite_expr(value, c, env));
            if value == ret.value {
                stmt.clone()
            } else {
                Stmt::Return(Rc::new(Return {
                    value,
                    annotation: ret.annotation.clone(),
                }))
            }
        },

        Stmt::Labeled(labeled) => {
            let inner = rewrite_stmt(&labeled.stmt, c, env);
            if inner == labeled.stmt {
                stmt.clone()
            } else {
                Stmt::Labeled(Rc::new(Labeled {
                    stmt: inner,
                    ..(**labeled).clone()
                }))
            }
        },

        Stmt::Throw(throw) => {
            let expr = rewrite_expr(&throw.expr, c, env);
            if expr == throw.expr {
                stmt.clone()
            } else {
                Stmt::Throw(Rc::new(Throw {
                    expr,
                    annotation: throw.annotation.clone(),
                }))
            }
        },

        Stmt::CtorCall(call) => {
            let args = rewrite_exprs(&call.args, c, env);
            if args == call.args {
                stmt.clone()
            } else {
                Stmt::CtorCall(Rc::new(CtorCall {
                    args,
                    ..(**call).clone()
                }))
            }
        },

        Stmt::Break(..) | Stmt::Continue(..) | Stmt::Empty(..) => stmt.clone(),
    };

    v.leave_stmt(env, stmt, new, child)
}

pub fn rewrite_exprs<A: Annotation, V: Rewriter<A>>(exprs: &[Expr<A>], v: &mut V, env: &mut V::Env) -> Vec<Expr<A>> {
    exprs.iter().map(|expr| rewrite_expr(expr, v, env)).collect()
}

pub fn rewrite_expr<A: Annotation, V: Rewriter<A>>(expr: &Expr<A>, v: &mut V, env: &mut V::Env) -> Expr<A> {
    if let Some(replaced) = v.override_expr(env, expr) {
        return replaced;
    }

    let mut child = v.enter_expr(env, expr);
    let c = &mut child;

    let new = match expr {
        Expr::Literal(..) | Expr::Local(..) => expr.clone(),

        Expr::Field(field) => {
            let target = rewrite_prefix(&field.target, c, env);
            if target == field.target {
                expr.clone()
            } else {
                Expr::Field(Rc::new(FieldAccess {
                    target,
                    ..(**field).clone()
                }))
            }
        },

        Expr::Call(call) => {
            let target = call.target.as_ref().map(|target| rewrite_prefix(target, c, env));
            let args = rewrite_exprs(&call.args, c, env);
            if target == call.target && args == call.args {
                expr.clone()
            } else {
                Expr::Call(Rc::new(Call {
                    target,
                    args,
                    ..(**call).clone()
                }))
            }
        },

        Expr::New(new) => {
            let ty = rewrite_type_node(&new.ty, c, env);
            let args = rewrite_exprs(&new.args, c, env);
            if ty == new.ty && args == new.args {
                expr.clone()
            } else {
                Expr::New(Rc::new(New {
                    ty,
                    args,
                    annotation: new.annotation.clone(),
                }))
            }
        },

        Expr::NewArray(new_array) => {
            let elem = rewrite_type_node(&new_array.elem, c, env);
            let dims = rewrite_exprs(&new_array.dims, c, env);
            if elem == new_array.elem && dims == new_array.dims {
                expr.clone()
            } else {
                Expr::NewArray(Rc::new(NewArray {
                    elem,
                    dims,
                    ..(**new_array).clone()
                }))
            }
        },

        Expr::ArrayAccess(access) => {
            let array = rewrite_expr(&access.array, c, env);
            let index = rewrite_expr(&access.index, c, env);
            if array == access.array && index == access.index {
                expr.clone()
            } else {
                Expr::ArrayAccess(Rc::new(ArrayAccess {
                    array,
                    index,
                    annotation: access.annotation.clone(),
                }))
            }
        },

        Expr::Unary(unary) => {
            let operand = rewrite_expr(&unary.operand, c, env);
            if operand == unary.operand {
                expr.clone()
            } else {
                Expr::Unary(Rc::new(Unary {
                    operand,
                    ..(**unary).clone()
                }))
            }
        },

        Expr::Binary(bin) => {
            let lhs = rewrite_expr(&bin.lhs, c, env);
            let rhs = rewrite_expr(&bin.rhs, c, env);
            if lhs == bin.lhs && rhs == bin.rhs {
                expr.clone()
            } else {
                Expr::Binary(Rc::new(Binary {
                    lhs,
                    rhs,
                    ..(**bin).clone()
                }))
            }
        },

        Expr::Assign(assign) => {
            let target = rewrite_expr(&assign.target, c, env);
            let value = rewrite_expr(&assign.value, c, env);
            if target == assign.target && value == assign.value {
                expr.clone()
            } else {
                Expr::Assign(Rc::new(Assign {
                    target,
                    value,
                    ..(**assign).clone()
                }))
            }
        },

        Expr::Cast(cast) => {
            let ty = rewrite_type_node(&cast.ty, c, env);
            let inner = rewrite_expr(&cast.expr, c, env);
            if ty == cast.ty && inner == cast.expr {
                expr.clone()
            } else {
                Expr::Cast(Rc::new(Cast {
                    ty,
                    expr: inner,
                    annotation: cast.annotation.clone(),
                }))
            }
        },

        Expr::InstanceOf(instance_of) => {
            let inner = rewrite_expr(&instance_of.expr, c, env);
            let ty = rewrite_type_node(&instance_of.ty, c, env);
            if ty == instance_of.ty && inner == instance_of.expr {
                expr.clone()
            } else {
                Expr::InstanceOf(Rc::new(InstanceOf {
                    expr: inner,
                    ty,
                    annotation: instance_of.annotation.clone(),
                }))
            }
        },

        Expr::Conditional(cond) => {
            let cond_expr = rewrite_expr(&cond.cond, c, env);
            let then_expr = rewrite_expr(&cond.then_expr, c, env);
            let else_expr = rewrite_expr(&cond.else_expr, c, env);
            if cond_expr == cond.cond && then_expr == cond.then_expr && else_expr == cond.else_expr {
                expr.clone()
            } else {
                Expr::Conditional(Rc::new(Conditional {
                    cond: cond_expr,
                    then_expr,
                    else_expr,
                    annotation: cond.annotation.clone(),
                }))
            }
        },

        Expr::Special(special) => {
            let qualifier = special.qualifier.as_ref().map(|q| rewrite_type_node(q, c, env));
            if qualifier == special.qualifier {
                expr.clone()
            } else {
                Expr::Special(Rc::new(Special {
                    qualifier,
                    ..(**special).clone()
                }))
            }
        },

        Expr::Ambiguous(amb) => {
            let prefix = amb.prefix.as_ref().map(|prefix| rewrite_prefix(prefix, c, env));
            if prefix == amb.prefix {
                expr.clone()
            } else {
                Expr::Ambiguous(Rc::new(AmbExpr {
                    prefix,
                    ..(**amb).clone()
                }))
            }
        },
    };

    v.leave_expr(env, expr, new, child)
}

pub fn rewrite_prefix<A: Annotation, V: Rewriter<A>>(prefix: &Prefix<A>, v: &mut V, env: &mut V::Env) -> Prefix<A> {
    if let Some(replaced) = v.override_prefix(env, prefix) {
        return replaced;
    }

    let mut child = v.enter_prefix(env, prefix);

    let new = match prefix {
        Prefix::Expr(expr_prefix) => {
            let expr = rewrite_expr(&expr_prefix.expr, &mut child, env);
            if expr == expr_prefix.expr {
                prefix.clone()
            } else {
                Prefix::expr(expr)
            }
        },

        Prefix::Type(ty_prefix) => {
            let ty = rewrite_type_node(&ty_prefix.ty, &mut child, env);
            if ty == ty_prefix.ty {
                prefix.clone()
            } else {
                Prefix::ty(ty)
            }
        },

        Prefix::Package(..) => prefix.clone(),

        Prefix::Ambiguous(amb) => {
            let inner = amb.prefix.as_ref().map(|p| rewrite_prefix(p, &mut child, env));
            if inner == amb.prefix {
                prefix.clone()
            } else {
                Prefix::Ambiguous(Rc::new(AmbPrefix {
                    prefix: inner,
                    ..(**amb).clone()
                }))
            }
        },
    };

    v.leave_prefix(env, prefix, new, child)
}

pub fn rewrite_type_nodes<A: Annotation, V: Rewriter<A>>(types: &[TypeNode<A>], v: &mut V, env: &mut V::Env) -> Vec<TypeNode<A>> {
    types.iter().map(|ty| rewrite_type_node(ty, v, env)).collect()
}

pub fn rewrite_type_node<A: Annotation, V: Rewriter<A>>(ty: &TypeNode<A>, v: &mut V, env: &mut V::Env) -> TypeNode<A> {
    if let Some(replaced) = v.override_type_node(env, ty) {
        return replaced;
    }

    let mut child = v.enter_type_node(env, ty);

    let new = match ty {
        TypeNode::Array(array) => {
            let elem = rewrite_type_node(&array.elem, &mut child, env);
            if elem == array.elem {
                ty.clone()
            } else {
                TypeNode::Array(Rc::new(ArrayTypeNode {
                    elem,
                    annotation: array.annotation.clone(),
                }))
            }
        },

        TypeNode::Ambiguous(amb) => {
            let prefix = amb.prefix.as_ref().map(|p| rewrite_prefix(p, &mut child, env));
            if prefix == amb.prefix {
                ty.clone()
            } else {
                TypeNode::Ambiguous(Rc::new(AmbTypeNode {
                    prefix,
                    ..(**amb).clone()
                }))
            }
        },

        TypeNode::Primitive(..) | TypeNode::Canonical(..) => ty.clone(),
    };

    v.leave_type_node(env, ty, new, child)
}

fn same_all<T>(a: &[T], b: &[T], same: impl Fn(&T, &T) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| same(x, y))
}
