//! Class-level rules that don't depend on any code: legal modifier combinations, unique
//! member declarations, overriding, abstract methods and the default constructor.

use crate::{
    def::{ClassId, ProcId},
    goal::{GoalId, GoalRun},
    job::{is_default_ctor, Compiler},
    result::{NameError, TypeError},
};
use jv_common::span::*;
use jv_syn::{Flags, Ident};
use tracing::debug;

pub fn run(comp: &mut Compiler, goal: GoalId, class: ClassId) -> GoalRun {
    if comp.defs.class(class).is_binary() {
        return GoalRun::Success;
    }

    let mut errors = Vec::new();
    check_modifiers(comp, class, &mut errors);
    check_duplicates(comp, class, &mut errors);
    check_overrides(comp, class, &mut errors);
    check_abstract_implemented(comp, class, &mut errors);
    check_default_ctor(comp, class, &mut errors);

    if errors.is_empty() {
        return GoalRun::Success;
    }

    debug!("{}: {} conformance errors", comp.goal_name(goal), errors.len());
    for err in errors {
        comp.report(err);
    }
    GoalRun::Failed
}

fn has_multiple_access(flags: Flags) -> bool {
    [Flags::PUBLIC, Flags::PROTECTED, Flags::PRIVATE]
        .iter()
        .filter(|access| flags.contains(**access))
        .count()
        > 1
}

fn invalid_modifiers(flags: Flags, what: String, span: &Span) -> TypeError {
    TypeError::InvalidModifiers {
        flags,
        what,
        span: span.clone(),
    }
}

fn check_modifiers(comp: &Compiler, class: ClassId, errors: &mut Vec<TypeError>) {
    let class_def = comp.defs.class(class);
    let class_flags = class_def.flags;
    let is_interface = class_def.is_interface();

    if has_multiple_access(class_flags) || (class_flags.is_abstract() && class_flags.is_final()) {
        let what = format!("class `{}`", class_def.name);
        errors.push(invalid_modifiers(class_flags, what, &class_def.span));
    }

    for field in &class_def.fields {
        let field_def = comp.defs.field(*field);
        if has_multiple_access(field_def.flags) || field_def.flags.is_abstract() {
            let what = format!("field `{}`", field_def.name);
            errors.push(invalid_modifiers(field_def.flags, what, &field_def.span));
        }
    }

    for ctor in &class_def.ctors {
        let ctor_def = comp.defs.proc(*ctor);
        let flags = ctor_def.flags;
        if has_multiple_access(flags) || flags.intersects(Flags::ABSTRACT | Flags::STATIC | Flags::FINAL) {
            let what = format!("constructor of `{}`", class_def.name);
            errors.push(invalid_modifiers(flags, what, &ctor_def.span));
        }
    }

    for method in &class_def.methods {
        let method_def = comp.defs.proc(*method);
        let decl = match method_def.decl() {
            Some(decl) => decl,
            None => continue,
        };
        let flags = method_def.flags;
        let name = method_def.name.clone();

        let bodiless = flags.is_abstract() || flags.is_native() || is_interface;
        match (bodiless, &decl.body) {
            (true, Some(_)) => errors.push(TypeError::UnexpectedBody {
                name,
                span: method_def.span.clone(),
            }),
            (false, None) => errors.push(TypeError::MissingBody {
                name,
                span: method_def.span.clone(),
            }),
            _ => {},
        }

        if has_multiple_access(flags) {
            let what = format!("method `{}`", method_def.name);
            errors.push(invalid_modifiers(flags, what, &method_def.span));
        } else if flags.is_abstract() && flags.intersects(Flags::PRIVATE | Flags::STATIC | Flags::FINAL | Flags::NATIVE) {
            let what = format!("abstract method `{}`", method_def.name);
            errors.push(invalid_modifiers(flags, what, &method_def.span));
        } else if flags.is_abstract() && !class_flags.is_abstract() {
            let what = format!("method `{}` in non-abstract class `{}`", method_def.name, class_def.name);
            errors.push(invalid_modifiers(flags, what, &method_def.span));
        }
    }
}

fn already_declared(name: &str, span: &Span, existing: &Span) -> TypeError {
    NameError::AlreadyDeclared {
        new: Ident::new(name, span.clone()),
        existing: existing.clone(),
    }
    .into()
}

fn check_duplicates(comp: &mut Compiler, class: ClassId, errors: &mut Vec<TypeError>) {
    let class_def = comp.defs.class(class);

    let fields = class_def.fields.clone();
    for (i, field) in fields.iter().enumerate() {
        let field_def = comp.defs.field(*field);
        let earlier = fields[..i]
            .iter()
            .map(|other| comp.defs.field(*other))
            .find(|other| other.name == field_def.name);

        if let Some(earlier) = earlier {
            errors.push(already_declared(&field_def.name, &field_def.span, &earlier.span));
        }
    }

    let procs: Vec<ProcId> = class_def.methods.iter().chain(class_def.ctors.iter()).copied().collect();
    for (i, proc_id) in procs.iter().enumerate() {
        let sig = comp.proc_sig(*proc_id);
        for other in &procs[..i] {
            let (proc_def, other_def) = (comp.defs.proc(*proc_id), comp.defs.proc(*other));
            if proc_def.kind != other_def.kind || proc_def.name != other_def.name {
                continue;
            }

            let (name, span, existing) = (proc_def.name.clone(), proc_def.span.clone(), other_def.span.clone());
            if comp.proc_sig(*other).same_formals(&sig) {
                errors.push(already_declared(&name, &span, &existing));
                break;
            }
        }
    }
}

/// Methods declared by the supertypes of `class` that a method named `name` with the
/// formals of `method` would override.
fn overridden_methods(comp: &mut Compiler, class: ClassId, method: ProcId) -> Vec<ProcId> {
    let name = comp.defs.proc(method).name.clone();
    let sig = comp.proc_sig(method);

    let mut overridden = Vec::new();
    for supertype in comp.supertype_closure(class).into_iter().skip(1) {
        let candidates: Vec<ProcId> = comp
            .defs
            .class(supertype)
            .methods
            .iter()
            .copied()
            .filter(|candidate| {
                let candidate_def = comp.defs.proc(*candidate);
                candidate_def.name == name && !candidate_def.flags.is_private()
            })
            .collect();

        for candidate in candidates {
            if comp.proc_sig(candidate).same_formals(&sig) {
                overridden.push(candidate);
            }
        }
    }
    overridden
}

fn check_overrides(comp: &mut Compiler, class: ClassId, errors: &mut Vec<TypeError>) {
    let methods = comp.defs.class(class).methods.clone();

    for method in methods {
        for overridden in overridden_methods(comp, class, method) {
            if let Err(reason) = comp.check_override(method, overridden) {
                let method_def = comp.defs.proc(method);
                let overridden_def = comp.defs.proc(overridden);

                errors.push(TypeError::InvalidOverride {
                    method: method_def.name.clone(),
                    overridden: comp.defs.class_type(overridden_def.container),
                    reason,
                    span: method_def.span.clone(),
                    overridden_span: overridden_def.span.clone(),
                });
                break;
            }
        }
    }
}

fn check_abstract_implemented(comp: &mut Compiler, class: ClassId, errors: &mut Vec<TypeError>) {
    let class_def = comp.defs.class(class);
    if class_def.flags.is_abstract() {
        return;
    }
    let (class_name, class_span) = (class_def.full_name.clone(), class_def.span.clone());

    let closure = comp.supertype_closure(class);

    let mut implemented = Vec::new();
    for candidate_class in &closure {
        if comp.defs.class(*candidate_class).is_interface() {
            continue;
        }

        let methods = comp.defs.class(*candidate_class).methods.clone();
        for method in methods {
            if !comp.defs.proc(method).flags.is_abstract() {
                let name = comp.defs.proc(method).name.clone();
                implemented.push((name, comp.proc_sig(method)));
            }
        }
    }

    let mut reported = Vec::new();
    for candidate_class in &closure {
        let methods = comp.defs.class(*candidate_class).methods.clone();
        for method in methods {
            let method_def = comp.defs.proc(method);
            if !method_def.flags.is_abstract() {
                continue;
            }

            let name = method_def.name.clone();
            let container = method_def.container;
            let sig = comp.proc_sig(method);

            let is_implemented = implemented
                .iter()
                .chain(reported.iter())
                .any(|(other_name, other_sig)| *other_name == name && other_sig.same_formals(&sig));
            if is_implemented {
                continue;
            }

            errors.push(TypeError::AbstractNotImplemented {
                class: class_name.clone(),
                method: name.clone(),
                container: comp.defs.class_type(container),
                sig: sig.clone(),
                span: class_span.clone(),
            });
            reported.push((name, sig));
        }
    }
}

fn check_default_ctor(comp: &mut Compiler, class: ClassId, errors: &mut Vec<TypeError>) {
    let ctors = comp.defs.class(class).ctors.clone();
    if !ctors.iter().any(|ctor| is_default_ctor(comp, *ctor)) {
        return;
    }

    let superclass = match comp.superclass(class) {
        Some(superclass) => superclass,
        None => return,
    };
    let superclass_id = match superclass.as_class() {
        Some(id) => id,
        None => return,
    };

    let span = comp.defs.class(class).span.clone();
    if comp.find_constructor(superclass_id, &[], class, &span).is_err() {
        errors.push(TypeError::NoSuperConstructor { superclass, span });
    }
}
