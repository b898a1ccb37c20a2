//! Member lookup: fields, member classes, and overload resolution for methods and
//! constructors.

use crate::{
    def::{ClassId, FieldInstance, ProcId, ProcInstance},
    job::Compiler,
    result::{NameError, NameResult, OverrideError},
    ty::{relations::*, ProcSig, Type},
};
use jv_common::span::Span;
use jv_syn::{Flags, Ident};
use std::rc::Rc;

impl Compiler {
    /// Whether a member with `flags` declared in `container` may be used from code in
    /// `from`.
    pub fn is_accessible(&mut self, flags: Flags, container: ClassId, from: ClassId) -> bool {
        if flags.is_public() {
            return true;
        }

        if self.defs.outermost(container) == self.defs.outermost(from) {
            return true;
        }

        if flags.is_private() {
            return false;
        }

        if self.defs.class(container).package == self.defs.class(from).package {
            return true;
        }

        if flags.is_protected() {
            let mut next = Some(from);
            while let Some(class) = next {
                if self.is_subclass(class, container) {
                    return true;
                }
                next = self.defs.class(class).outer;
            }
        }

        false
    }

    /// A field of `class` or one of its supertypes, declared fields first.
    pub fn find_field_silent(&mut self, class: ClassId, name: &str) -> Option<FieldInstance> {
        for candidate in self.supertype_closure(class) {
            let found = self
                .defs
                .class(candidate)
                .fields
                .iter()
                .copied()
                .find(|field| *self.defs.field(*field).name == *name);

            if let Some(field) = found {
                return Some(FieldInstance::new(field));
            }
        }
        None
    }

    pub fn find_field(&mut self, ty: &Type, name: &Ident, from: ClassId) -> NameResult<FieldInstance> {
        let not_found = || NameError::MemberNotFound {
            base: ty.clone(),
            member: name.clone(),
            args: None,
        };

        let class = ty.as_class().ok_or_else(not_found)?;
        let field = self.find_field_silent(class, name.as_str()).ok_or_else(not_found)?;

        let field_def = self.defs.field(field.def);
        let (flags, container) = (field_def.flags, field_def.container);
        if !self.is_accessible(flags, container, from) {
            return Err(NameError::NotAccessible {
                member: name.clone(),
                container: self.defs.class_type(container),
                access: flags.access_name(),
            });
        }

        Ok(field)
    }

    /// A member class declared in `class`, or inherited by it.
    pub fn find_member_class(&mut self, class: ClassId, name: &str) -> Option<ClassId> {
        if let Some(member) = self.defs.class(class).member_classes.get(name) {
            return Some(*member);
        }

        self.supertype_closure(class)
            .into_iter()
            .find_map(|candidate| self.defs.class(candidate).member_classes.get(name).copied())
    }

    pub fn has_method_named(&mut self, class: ClassId, name: &str) -> bool {
        self.supertype_closure(class).into_iter().any(|candidate| {
            let class_def = self.defs.class(candidate);
            class_def.methods.iter().any(|method| *self.defs.proc(*method).name == *name)
        })
    }

    /// Methods named `name` that `class` declares or inherits, in collection order. A
    /// method hides the methods with the same formals found after it, unless it isn't
    /// accessible from `from`: a private override mustn't hide what it overrides from
    /// code that can't see it. The inaccessible methods are returned separately.
    fn collect_methods(&mut self, class: ClassId, name: &str, from: ClassId) -> (Vec<Candidate>, Vec<Candidate>) {
        let mut visible: Vec<Candidate> = Vec::new();
        let mut unacceptable: Vec<Candidate> = Vec::new();

        for candidate_class in self.supertype_closure(class) {
            let methods: Vec<ProcId> = self
                .defs
                .class(candidate_class)
                .methods
                .iter()
                .copied()
                .filter(|method| *self.defs.proc(*method).name == *name)
                .collect();

            for method in methods {
                let sig = self.proc_sig(method);
                let flags = self.defs.proc(method).flags;

                if !self.is_accessible(flags, candidate_class, from) {
                    unacceptable.push(Candidate { proc_id: method, sig });
                    continue;
                }

                if visible.iter().any(|existing| existing.sig.same_formals(&sig)) {
                    continue;
                }
                visible.push(Candidate { proc_id: method, sig });
            }
        }

        (visible, unacceptable)
    }

    fn is_applicable(&mut self, sig: &ProcSig, args: &[Type]) -> bool {
        sig.formals.len() == args.len()
            && args
                .iter()
                .zip(sig.formals.iter())
                .all(|(arg, formal)| self.is_implicit_castable(arg, formal))
    }

    fn is_more_specific(&mut self, a: &ProcSig, b: &ProcSig) -> bool {
        a.formals
            .iter()
            .zip(b.formals.iter())
            .all(|(a_formal, b_formal)| self.is_implicit_castable(a_formal, b_formal))
    }

    /// Picks the most specific of the applicable candidates.
    fn most_specific(&mut self, applicable: Vec<Candidate>, name: &Ident) -> NameResult<ProcId> {
        let mut maximal = Vec::new();
        for (i, candidate) in applicable.iter().enumerate() {
            let mut dominated = false;
            for (j, other) in applicable.iter().enumerate() {
                if i != j
                    && self.is_more_specific(&other.sig, &candidate.sig)
                    && !self.is_more_specific(&candidate.sig, &other.sig)
                {
                    dominated = true;
                    break;
                }
            }

            if !dominated {
                maximal.push(candidate.clone());
            }
        }

        match maximal.len() {
            0 => unreachable!("a non-empty candidate set always has a maximal element"),
            1 => Ok(maximal[0].proc_id),
            _ => {
                let first = &maximal[0];
                if maximal.iter().all(|candidate| candidate.sig.same_formals(&first.sig)) {
                    // any of them will do, prefer one that has an implementation
                    let chosen = maximal
                        .iter()
                        .find(|candidate| !self.defs.proc(candidate.proc_id).flags.is_abstract())
                        .unwrap_or(first);
                    return Ok(chosen.proc_id);
                }

                Err(NameError::Ambiguous {
                    ident: name.clone(),
                    options: maximal.iter().map(|candidate| self.describe_proc(candidate)).collect(),
                })
            },
        }
    }

    fn describe_proc(&self, candidate: &Candidate) -> Rc<str> {
        let proc_def = self.defs.proc(candidate.proc_id);
        let container = &self.defs.class(proc_def.container).full_name;
        format!("{}.{}{}", container, proc_def.name, candidate.sig.formals_display()).into()
    }

    /// Resolves a call of a method named `name` on a value of type `receiver`.
    pub fn find_method(&mut self, receiver: &Type, name: &Ident, args: &[Type], from: ClassId) -> NameResult<ProcInstance> {
        let not_found = || NameError::MemberNotFound {
            base: receiver.clone(),
            member: name.clone(),
            args: Some(args.to_vec()),
        };

        let class = match receiver {
            Type::Class(class) => class.id,
            Type::Array(..) => match self.object_type().as_class() {
                Some(object) => object,
                None => return Err(not_found()),
            },
            _ => return Err(not_found()),
        };

        let (visible, unacceptable) = self.collect_methods(class, name.as_str(), from);

        let mut applicable = Vec::new();
        for candidate in visible {
            if self.is_applicable(&candidate.sig, args) {
                applicable.push(candidate);
            }
        }

        if applicable.is_empty() {
            for candidate in unacceptable {
                if self.is_applicable(&candidate.sig, args) {
                    let proc_def = self.defs.proc(candidate.proc_id);
                    return Err(NameError::NotAccessible {
                        member: name.clone(),
                        container: self.defs.class_type(proc_def.container),
                        access: proc_def.flags.access_name(),
                    });
                }
            }
            return Err(not_found());
        }

        let method = ProcInstance::new(self.most_specific(applicable, name)?);

        // arrays implement `clone` publicly and it never throws
        match receiver {
            Type::Array(..) if *method.name(self) == *"clone" => {
                let sig = ProcSig {
                    throws: Vec::new(),
                    ..(*method.sig(self)).clone()
                };
                Ok(method.with_flags(Flags::PUBLIC).with_sig(sig))
            },
            _ => Ok(method),
        }
    }

    /// Resolves an instance creation or explicit constructor call for `class`.
    pub fn find_constructor(&mut self, class: ClassId, args: &[Type], from: ClassId, span: &Span) -> NameResult<ProcInstance> {
        let class_name = self.defs.class(class).name.clone();
        let name = Ident::new(&class_name, span.clone());

        let ctors = self.defs.class(class).ctors.clone();
        let mut applicable = Vec::new();
        let mut inaccessible = None;

        for ctor in ctors {
            let sig = self.proc_sig(ctor);
            if !self.is_applicable(&sig, args) {
                continue;
            }

            let flags = self.defs.proc(ctor).flags;
            if self.is_accessible(flags, class, from) {
                applicable.push(Candidate { proc_id: ctor, sig });
            } else {
                inaccessible.get_or_insert(flags);
            }
        }

        if applicable.is_empty() {
            let class_ty = self.defs.class_type(class);
            return Err(match inaccessible {
                Some(flags) => NameError::NotAccessible {
                    member: name,
                    container: class_ty,
                    access: flags.access_name(),
                },
                None => NameError::MemberNotFound {
                    base: class_ty,
                    member: name,
                    args: Some(args.to_vec()),
                },
            });
        }

        Ok(ProcInstance::new(self.most_specific(applicable, &name)?))
    }

    /// Checks that `method` may override `overridden`.
    pub fn check_override(&mut self, method: ProcId, overridden: ProcId) -> Result<(), OverrideError> {
        if method == overridden {
            return Ok(());
        }

        let method_flags = self.defs.proc(method).flags;
        let overridden_flags = self.defs.proc(overridden).flags;

        if method_flags.is_static() != overridden_flags.is_static() {
            return Err(OverrideError::StaticMismatch);
        }

        if overridden_flags.is_final() {
            return Err(OverrideError::Final);
        }

        let method_sig = self.proc_sig(method);
        let overridden_sig = self.proc_sig(overridden);

        if method_sig.ret != overridden_sig.ret {
            // classes compiled elsewhere may already rely on covariant returns
            let covariant = self.defs.proc(overridden).is_binary()
                && method_sig.ret.is_reference()
                && self.is_subtype(&method_sig.ret, &overridden_sig.ret);

            if !covariant {
                return Err(OverrideError::ReturnType {
                    expected: overridden_sig.ret.clone(),
                    actual: method_sig.ret.clone(),
                });
            }
        }

        for thrown in &method_sig.throws {
            if !self.is_checked_exception(thrown) {
                continue;
            }

            let declared = overridden_sig
                .throws
                .iter()
                .any(|overridden_thrown| self.is_subtype(thrown, overridden_thrown));
            if !declared {
                return Err(OverrideError::Throws(thrown.clone()));
            }
        }

        if method_flags.access_rank() < overridden_flags.access_rank() {
            return Err(OverrideError::WeakerAccess {
                expected: overridden_flags.access_name(),
            });
        }

        Ok(())
    }

    /// Whether throwing `ty` has to be declared: every throwable except runtime exceptions
    /// and errors.
    pub fn is_checked_exception(&mut self, ty: &Type) -> bool {
        let throwable = self.well_known(THROWABLE);
        let runtime_exception = self.well_known(RUNTIME_EXCEPTION);
        let error = self.well_known(ERROR);

        !ty.is_unknown()
            && self.is_subtype(ty, &throwable)
            && !self.is_subtype(ty, &runtime_exception)
            && !self.is_subtype(ty, &error)
    }

    pub fn is_throwable(&mut self, ty: &Type) -> bool {
        if ty.is_unknown() {
            return true;
        }

        let throwable = self.well_known(THROWABLE);
        ty.is_reference() && *ty != Type::Null && self.is_subtype(ty, &throwable)
    }
}

#[derive(Clone, Debug)]
struct Candidate {
    proc_id: ProcId,
    sig: Rc<ProcSig>,
}
