//! Resolves the names in a class header to the types of its direct supertypes.

use crate::{
    annotation::Typed,
    classpath::ExternalClass,
    def::{ClassId, ClassSource},
    goal::{GoalId, GoalRun},
    job::Compiler,
    pass::{disambiguate::resolve_type, hierarchies_settled},
    result::{SupertypeError, TypeError},
    ty::Type,
};
use jv_common::span::*;
use jv_syn::{ClassDecl, TypeNode};
use std::rc::Rc;
use tracing::trace;

/// Goal body: records the declared superclass and interfaces of `class`.
pub fn run(comp: &mut Compiler, goal: GoalId, class: ClassId) -> GoalRun {
    let result = match comp.defs.class(class).source.clone() {
        ClassSource::Binary(external) => Ok(binary_supertypes(comp, &external)),
        ClassSource::Source { decl, .. } => source_supertypes(comp, class, &decl),
    };

    let (superclass, interfaces, errors) = match result {
        Ok(supertypes) => supertypes,
        Err(Deferred) => return GoalRun::Deferred,
    };

    trace!(
        "supertypes of {}: {:?} {:?}",
        comp.defs.class(class).full_name,
        superclass,
        interfaces
    );

    let class_def = comp.defs.class_mut(class);
    class_def.superclass.update_by(superclass, goal);
    class_def.interfaces.update_by(interfaces, goal);

    if errors.is_empty() {
        GoalRun::Success
    } else {
        for err in errors {
            comp.report(err);
        }
        GoalRun::Failed
    }
}

/// A name in the header couldn't be resolved yet.
struct Deferred;

type Supertypes = (Option<Type>, Vec<Type>, Vec<TypeError>);

fn binary_supertypes(comp: &mut Compiler, external: &Rc<ExternalClass>) -> Supertypes {
    let superclass = external
        .superclass
        .as_ref()
        .map(|name| comp.type_from_name(name))
        .filter(|ty| !ty.is_unknown());

    let interfaces = external
        .interfaces
        .iter()
        .map(|name| comp.type_from_name(name))
        .filter(|ty| !ty.is_unknown())
        .collect();

    (superclass, interfaces, Vec::new())
}

fn source_supertypes(comp: &mut Compiler, class: ClassId, decl: &Rc<ClassDecl<Typed>>) -> Result<Supertypes, Deferred> {
    let ctx = comp.outer_context(class);
    let full_name = comp.defs.class(class).full_name.clone();
    let is_interface = comp.defs.class(class).is_interface();

    let mut errors = Vec::new();

    let resolve = |comp: &mut Compiler, errors: &mut Vec<TypeError>, node: &TypeNode<Typed>| {
        match resolve_type(comp, &ctx, node) {
            Ok(ty) => Ok(Some(ty)),
            Err(_) if !hierarchies_settled(comp, &ctx) => Err(Deferred),
            Err(err) => {
                errors.push(err);
                Ok(None)
            },
        }
    };

    let mut superclass = None;
    if let Some(node) = decl.superclass.as_ref().filter(|_| !is_interface) {
        if let Some(ty) = resolve(comp, &mut errors, node)? {
            match check_superclass(comp, &ty) {
                Ok(()) => superclass = Some(ty),
                Err(reason) => errors.push(invalid_supertype(&full_name, ty, reason, node.span())),
            }
        }
    }

    let mut interfaces = Vec::new();
    for node in &decl.interfaces {
        if let Some(ty) = resolve(comp, &mut errors, node)? {
            match check_interface(comp, &ty) {
                Ok(()) => interfaces.push(ty),
                Err(reason) => errors.push(invalid_supertype(&full_name, ty, reason, node.span())),
            }
        }
    }

    if superclass.is_none() && !is_interface && !comp.is_object(class) {
        let object = comp.object_type();
        if !object.is_unknown() {
            superclass = Some(object);
        }
    }

    Ok((superclass, interfaces, errors))
}

fn invalid_supertype(class: &Rc<str>, supertype: Type, reason: SupertypeError, span: &Span) -> TypeError {
    TypeError::InvalidSupertype {
        class: class.clone(),
        supertype,
        reason,
        span: span.clone(),
    }
}

fn check_superclass(comp: &Compiler, ty: &Type) -> Result<(), SupertypeError> {
    let id = ty.as_class().ok_or(SupertypeError::NotAClass)?;
    let superclass = comp.defs.class(id);

    if superclass.is_interface() {
        Err(SupertypeError::ExtendsInterface)
    } else if superclass.flags.is_final() {
        Err(SupertypeError::ExtendsFinal)
    } else {
        Ok(())
    }
}

fn check_interface(comp: &Compiler, ty: &Type) -> Result<(), SupertypeError> {
    let id = ty.as_class().ok_or(SupertypeError::NotAClass)?;

    if comp.defs.class(id).is_interface() {
        Ok(())
    } else {
        Err(SupertypeError::ImplementsClass)
    }
}
