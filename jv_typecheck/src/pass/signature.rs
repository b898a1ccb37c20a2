//! Resolves the declared types of fields and the signatures of methods and constructors.

use crate::{
    annotation::Typed,
    context::Context,
    def::{FieldId, FieldSource, ProcId, ProcSource},
    goal::{GoalId, GoalRun},
    job::Compiler,
    pass::{disambiguate::resolve_type, hierarchies_settled},
    result::TypeError,
    ty::{ProcSig, Type},
};
use jv_common::span::*;
use jv_syn::{ProcKind, TypeNode};
use std::rc::Rc;

/// Collects the errors of one signature. A name that can't be resolved while an enclosing
/// hierarchy is still unknown makes the whole goal wait instead.
struct SigResolver {
    ctx: Context,
    errors: Vec<TypeError>,
    deferred: bool,
}

impl SigResolver {
    fn new(ctx: Context) -> Self {
        Self {
            ctx,
            errors: Vec::new(),
            deferred: false,
        }
    }

    fn resolve(&mut self, comp: &mut Compiler, node: &TypeNode<Typed>) -> Type {
        match resolve_type(comp, &self.ctx, node) {
            Ok(ty) => ty,
            Err(err) => {
                if hierarchies_settled(comp, &self.ctx) {
                    self.errors.push(err);
                } else {
                    self.deferred = true;
                }
                Type::Unknown
            },
        }
    }

    fn finish(self, comp: &mut Compiler) -> GoalRun {
        if self.deferred {
            return GoalRun::Deferred;
        }

        if self.errors.is_empty() {
            return GoalRun::Success;
        }

        for err in self.errors {
            comp.report(err);
        }
        GoalRun::Failed
    }
}

pub fn run_field(comp: &mut Compiler, goal: GoalId, field: FieldId) -> GoalRun {
    let field_def = comp.defs.field(field);
    let container = field_def.container;

    let (ty, run) = match field_def.source.clone() {
        FieldSource::Binary(external) => (comp.type_from_name(&external.ty), GoalRun::Success),

        FieldSource::Source(decl) => {
            let mut resolver = SigResolver::new(comp.class_context(container));
            let ty = resolver.resolve(comp, &decl.ty);
            (ty, resolver.finish(comp))
        },
    };

    if run != GoalRun::Deferred {
        comp.defs.field_mut(field).ty.update_by(ty, goal);
    }
    run
}

pub fn run_proc(comp: &mut Compiler, goal: GoalId, proc_id: ProcId) -> GoalRun {
    let proc_def = comp.defs.proc(proc_id);
    let container = proc_def.container;

    let (sig, run) = match proc_def.source.clone() {
        ProcSource::DefaultCtor => {
            let sig = ProcSig {
                ret: Type::VOID,
                formals: Vec::new(),
                throws: Vec::new(),
            };
            (sig, GoalRun::Success)
        },

        ProcSource::Binary(external) => {
            let sig = ProcSig {
                ret: comp.type_from_name(&external.ret),
                formals: external.formals.iter().map(|name| comp.type_from_name(name)).collect(),
                throws: external.throws.iter().map(|name| comp.type_from_name(name)).collect(),
            };
            (sig, GoalRun::Success)
        },

        ProcSource::Source(decl) => {
            let mut resolver = SigResolver::new(comp.class_context(container));

            let ret = match (decl.kind, &decl.ret) {
                (ProcKind::Method, Some(ret)) => resolver.resolve(comp, ret),
                _ => Type::VOID,
            };

            let formals = decl
                .formals
                .iter()
                .map(|formal| resolver.resolve(comp, &formal.ty))
                .collect();

            let mut throws = Vec::new();
            for node in &decl.throws {
                let ty = resolver.resolve(comp, node);
                if !comp.is_throwable(&ty) {
                    resolver.errors.push(TypeError::NotThrowable {
                        ty: ty.clone(),
                        span: node.span().clone(),
                    });
                }
                throws.push(ty);
            }

            let sig = ProcSig { ret, formals, throws };
            (sig, resolver.finish(comp))
        },
    };

    if run != GoalRun::Deferred {
        comp.defs.proc_mut(proc_id).sig.update_by(Rc::new(sig), goal);
    }
    run
}
