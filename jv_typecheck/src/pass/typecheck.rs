//! Annotates disambiguated code with types and checks it against the rules of the
//! language. Every node of the result carries a [Typed] annotation.

mod expr;

use self::expr::typecheck_expr;
use crate::{
    annotation::{DeclRef, Typed},
    context::{Context, LabelKind},
    def::{ClassId, CodeId, ProcId},
    goal::{GoalId, GoalKind, GoalRun, GoalState, GoalTarget},
    job::Compiler,
    pass::{finish_code_pass, log_deferred, log_error, stmt_context, PassLog, SharedLog},
    result::{NameError, TypeError, TypeResult},
    ty::Type,
};
use jv_common::span::*;
use jv_syn::{
    visit::{rewrite_member, Rewriter},
    CtorCall, Expr, FieldDecl, Flags, Formal, Ident, Jump, LocalDecl, Member, ProcDecl, ProcKind, SpecialKind, Stmt,
    TypeNode,
};
use std::rc::Rc;

#[derive(Clone)]
pub(crate) struct TypeChecker {
    ctx: Context,
    log: SharedLog,

    code: CodeId,
    class: ClassId,

    /// Return type of the method or constructor being checked. Initializers can't return.
    ret: Option<Type>,

    /// Checked exceptions the code may throw.
    throws: Rc<Vec<Type>>,
}

impl TypeChecker {
    fn error(&self, err: impl Into<TypeError>) {
        log_error(&self.log, err);
    }

    /// Gives up on this attempt if a goal the result depends on asked to be retried, so
    /// nothing is recorded from placeholder values. Call after the goal was attempted.
    fn depend(&self, comp: &mut Compiler, kind: GoalKind, target: GoalTarget) {
        let goal = comp.goal(kind, target);
        if comp.goal_state(goal) == GoalState::New {
            log_deferred(&self.log);
        }
    }

    /// Reports throwing `ty` here unless the code declares it.
    fn check_thrown(&self, comp: &mut Compiler, ty: &Type, span: &Span) {
        if !comp.is_checked_exception(ty) {
            return;
        }

        let throws = self.throws.clone();
        if !throws.iter().any(|declared| comp.is_subtype(ty, declared)) {
            self.error(TypeError::UnreportedException {
                ty: ty.clone(),
                span: span.clone(),
            });
        }
    }

    fn check_condition(&self, comp: &mut Compiler, cond: &Expr<Typed>) {
        let ty = &cond.annotation().ty;
        if !comp.is_implicit_castable(ty, &Type::BOOLEAN) {
            self.error(TypeError::TypeMismatch {
                expected: Type::BOOLEAN,
                actual: ty.clone(),
                span: cond.span().clone(),
            });
        }
    }

    fn check_assignable(&self, comp: &mut Compiler, value: &Expr<Typed>, to: &Type) {
        let value_annotation = value.annotation();
        if !comp.is_assignable(&value_annotation.ty, value_annotation.constant.as_ref(), to) {
            self.error(TypeError::TypeMismatch {
                expected: to.clone(),
                actual: value_annotation.ty.clone(),
                span: value.span().clone(),
            });
        }
    }

    /// Creates the definition of a local or formal, unless a local of that name is already
    /// in scope.
    fn declare_local(&self, comp: &mut Compiler, name: &Ident, flags: Flags, ty: Type) -> Option<DeclRef> {
        if let Some(existing) = self.ctx.find_local(name.as_str()) {
            self.error(NameError::AlreadyDeclared {
                new: name.clone(),
                existing: existing.span.clone(),
            });
            return None;
        }

        let local = comp.defs.add_local(name.name.clone(), flags, ty, name.span.clone());
        Some(DeclRef::Local(local))
    }

    fn check_local_decl(&mut self, comp: &mut Compiler, decl: &Rc<LocalDecl<Typed>>) -> Stmt<Typed> {
        let ty = decl.ty.annotation().ty.clone();
        if let Some(init) = &decl.init {
            self.check_assignable(comp, init, &ty);
        }

        let mut annotation = Typed::new(decl.annotation.span.clone(), ty.clone());
        if let Some(local) = self.declare_local(comp, &decl.name, decl.flags, ty) {
            annotation = annotation.with_decl(local);
        }

        Stmt::LocalDecl(Rc::new(LocalDecl {
            annotation,
            ..(**decl).clone()
        }))
    }

    fn check_return(&self, comp: &mut Compiler, value: Option<&Expr<Typed>>, span: &Span) {
        let expected = self.ret.clone();
        let ok = match (&expected, value) {
            (Some(ret), None) => ret.is_void(),
            (Some(ret), Some(value)) if !ret.is_void() => {
                let annotation = value.annotation();
                comp.is_assignable(&annotation.ty, annotation.constant.as_ref(), ret)
            },
            _ => false,
        };

        if !ok {
            self.error(TypeError::InvalidReturn {
                expected: expected.unwrap_or(Type::VOID),
                actual: value.map(|value| value.annotation().ty.clone()),
                span: span.clone(),
            });
        }
    }

    fn check_jump(&self, kind: LabelKind, jump: &Jump<Typed>) {
        let label = jump.label.as_ref().map(|label| label.as_str());
        if self.ctx.find_label(kind, label).is_some() {
            return;
        }

        self.error(TypeError::InvalidJump {
            kind: match kind {
                LabelKind::Break => "break",
                LabelKind::Continue => "continue",
            },
            label: jump.label.clone(),
            span: jump.annotation.span.clone(),
        });
    }

    fn check_throw(&self, comp: &mut Compiler, expr: &Expr<Typed>) {
        let ty = expr.annotation().ty.clone();
        if !comp.is_throwable(&ty) {
            self.error(TypeError::NotThrowable {
                ty,
                span: expr.span().clone(),
            });
            return;
        }
        self.check_thrown(comp, &ty, expr.span());
    }

    fn ctor_call_target(&self, comp: &mut Compiler, kind: SpecialKind) -> Option<ClassId> {
        match kind {
            SpecialKind::This => Some(self.class),
            SpecialKind::Super => comp.superclass(self.class).and_then(|ty| ty.as_class()),
        }
    }

    fn check_ctor_call(&self, comp: &mut Compiler, call: &Rc<CtorCall<Typed>>) -> TypeResult<Stmt<Typed>> {
        let span = call.annotation.span.clone();
        let target = match self.ctor_call_target(comp, call.kind) {
            Some(target) => target,
            None => return Ok(Stmt::CtorCall(call.clone())),
        };

        let args: Vec<Type> = call.args.iter().map(|arg| arg.annotation().ty.clone()).collect();
        let ctor = comp.find_constructor(target, &args, self.class, &span)?;
        let sig = ctor.sig(comp);
        self.depend(comp, GoalKind::Signature, GoalTarget::Proc(ctor.def));
        for thrown in &sig.throws {
            self.check_thrown(comp, thrown, &span);
        }

        let annotation = Typed::new(span, Type::VOID).with_decl(DeclRef::Proc(ctor.def));
        Ok(Stmt::CtorCall(Rc::new(CtorCall {
            annotation,
            ..(**call).clone()
        })))
    }

    fn typecheck_stmt(&mut self, comp: &mut Compiler, stmt: Stmt<Typed>) -> Stmt<Typed> {
        match &stmt {
            Stmt::LocalDecl(decl) => return self.check_local_decl(comp, decl),

            Stmt::If(if_stmt) => self.check_condition(comp, &if_stmt.cond),
            Stmt::While(while_stmt) => self.check_condition(comp, &while_stmt.cond),
            Stmt::Do(do_stmt) => self.check_condition(comp, &do_stmt.cond),
            Stmt::For(for_stmt) => {
                if let Some(cond) = &for_stmt.cond {
                    self.check_condition(comp, cond);
                }
            },

            Stmt::Return(ret) => self.check_return(comp, ret.value.as_ref(), &ret.annotation.span),
            Stmt::Break(jump) => self.check_jump(LabelKind::Break, jump),
            Stmt::Continue(jump) => self.check_jump(LabelKind::Continue, jump),
            Stmt::Throw(throw) => self.check_throw(comp, &throw.expr),

            Stmt::CtorCall(call) => {
                return match self.check_ctor_call(comp, call) {
                    Ok(checked) => checked,
                    Err(err) => {
                        self.error(err);
                        stmt.clone()
                    },
                }
            },

            Stmt::Block(..) | Stmt::Expr(..) | Stmt::Labeled(..) | Stmt::Empty(..) => {},
        }

        stmt
    }

    fn typecheck_field(&mut self, comp: &mut Compiler, field: &Rc<FieldDecl<Typed>>) -> Member<Typed> {
        let field_id = match self.code {
            CodeId::Field(id) => id,
            other => unreachable!("field declaration checked as {:?}", other),
        };

        let ty = comp.field_type(field_id);
        if let Some(init) = &field.init {
            self.check_assignable(comp, init, &ty);
        }

        let annotation = Typed::new(field.annotation.span.clone(), ty).with_decl(DeclRef::Field(field_id));
        Member::Field(Rc::new(FieldDecl {
            annotation,
            ..(**field).clone()
        }))
    }

    /// Constructors that don't start with an explicit constructor call implicitly call the
    /// superclass constructor without arguments.
    fn check_implicit_super(&mut self, comp: &mut Compiler, proc_decl: &ProcDecl<Typed>) {
        let starts_with_call = proc_decl
            .body
            .as_ref()
            .and_then(|body| body.stmts.first())
            .map(|first| matches!(first, Stmt::CtorCall(..)))
            .unwrap_or(false);
        if starts_with_call {
            return;
        }

        let superclass = match comp.superclass(self.class) {
            Some(superclass) => superclass,
            None => return,
        };
        if let Some(superclass_id) = superclass.as_class() {
            let span = proc_decl.name.span.clone();
            if comp.find_constructor(superclass_id, &[], self.class, &span).is_err() {
                self.error(TypeError::NoSuperConstructor { superclass, span });
            }
        }
    }

    fn typecheck_proc(&mut self, comp: &mut Compiler, proc_decl: &Rc<ProcDecl<Typed>>) -> Member<Typed> {
        let proc_id: ProcId = match self.code {
            CodeId::Proc(id) => id,
            other => unreachable!("method declaration checked as {:?}", other),
        };

        if proc_decl.kind == ProcKind::Constructor && proc_decl.body.is_some() {
            self.check_implicit_super(comp, proc_decl);
        }

        let ret = self.ret.clone().unwrap_or(Type::VOID);
        let annotation = Typed::new(proc_decl.annotation.span.clone(), ret).with_decl(DeclRef::Proc(proc_id));
        Member::Proc(Rc::new(ProcDecl {
            annotation,
            ..(**proc_decl).clone()
        }))
    }
}

impl Rewriter<Typed> for TypeChecker {
    type Env = Compiler;

    fn leave_member(&mut self, comp: &mut Compiler, _old: &Member<Typed>, new: Member<Typed>, _child: Self) -> Member<Typed> {
        match &new {
            Member::Field(field) => self.typecheck_field(comp, field),
            Member::Proc(proc_decl) => self.typecheck_proc(comp, proc_decl),
            Member::Initializer(..) => new,
            Member::Class(class) => unreachable!("member class {} checked as code", class.name),
        }
    }

    fn leave_formal(&mut self, comp: &mut Compiler, _old: &Rc<Formal<Typed>>, new: Rc<Formal<Typed>>) -> Rc<Formal<Typed>> {
        let ty = new.ty.annotation().ty.clone();
        let decl = self.declare_local(comp, &new.name, new.flags, ty.clone());

        let local = match &decl {
            Some(DeclRef::Local(local)) => Some(*local),
            _ => None,
        };
        self.ctx = self.ctx.add_local(new.name.name.clone(), local, new.name.span.clone());

        let mut annotation = Typed::new(new.annotation.span.clone(), ty);
        annotation.decl = decl;
        Rc::new(Formal {
            annotation,
            ..(*new).clone()
        })
    }

    fn enter_stmt(&mut self, _comp: &mut Compiler, stmt: &Stmt<Typed>) -> Self {
        Self {
            ctx: stmt_context(&self.ctx, stmt),
            ..self.clone()
        }
    }

    fn leave_stmt(&mut self, comp: &mut Compiler, _old: &Stmt<Typed>, new: Stmt<Typed>, _child: Self) -> Stmt<Typed> {
        self.typecheck_stmt(comp, new)
    }

    fn add_decls(&mut self, _comp: &mut Compiler, stmt: &Stmt<Typed>) {
        if let Stmt::LocalDecl(decl) = stmt {
            let local = match &decl.annotation.decl {
                Some(DeclRef::Local(local)) => Some(*local),
                _ => None,
            };
            self.ctx = self.ctx.add_local(decl.name.name.clone(), local, decl.name.span.clone());
        }
    }

    fn leave_expr(&mut self, comp: &mut Compiler, _old: &Expr<Typed>, new: Expr<Typed>, _child: Self) -> Expr<Typed> {
        match typecheck_expr(comp, self, &new) {
            Ok(annotation) => new.with_annotation(annotation),
            Err(err) => {
                self.error(err);
                let span = new.span().clone();
                new.with_annotation(Typed::from(span))
            },
        }
    }

    fn leave_type_node(&mut self, comp: &mut Compiler, _old: &TypeNode<Typed>, new: TypeNode<Typed>, _child: Self) -> TypeNode<Typed> {
        let span = new.span().clone();
        let ty = match &new {
            TypeNode::Primitive(primitive) => Type::Primitive(primitive.kind.into()),
            TypeNode::Array(array) => {
                let elem = array.elem.annotation().ty.clone();
                comp.defs.array_of(elem)
            },
            TypeNode::Canonical(..) | TypeNode::Ambiguous(..) => return new,
        };

        new.with_annotation(Typed::new(span, ty))
    }
}

/// Goal body: checks the disambiguated code of a member.
pub fn run(comp: &mut Compiler, goal: GoalId, code: CodeId) -> GoalRun {
    let member = match comp.code_member(code, GoalKind::Disambiguated) {
        Some(member) => member,
        None => unreachable!("{:?} has no code", code),
    };

    let class = comp.defs.code_container(code);
    let (ret, throws) = match code {
        CodeId::Proc(proc_id) => {
            let sig = comp.proc_sig(proc_id);
            (Some(sig.ret.clone()), Rc::new(sig.throws.clone()))
        },
        CodeId::Field(..) | CodeId::Init(..) => (None, Rc::new(Vec::new())),
    };

    let log = PassLog::shared();
    let mut checker = TypeChecker {
        ctx: comp.code_context(code),
        log: log.clone(),
        code,
        class,
        ret,
        throws,
    };

    let result = rewrite_member(&member, &mut checker, comp);
    finish_code_pass(comp, goal, code, &log, result)
}
