//! Creates definitions for everything a source unit declares and registers its classes
//! with the system resolver. Nothing here resolves a name: that's left to the goals.

use crate::{
    annotation::Typed,
    def::{ClassId, ClassSource, FieldSource, ProcSource},
    job::{Compiler, UnitEntry},
    resolve::{unit_resolver, ImportTable, Named, Resolver},
    result::NameError,
};
use jv_syn::{ClassDecl, ClassDeclKind, Flags, Member, ProcKind, Unit};
use std::rc::Rc;
use tracing::debug;

pub(crate) fn declare_unit(comp: &mut Compiler, index: usize, unit: Rc<Unit<Typed>>) -> UnitEntry {
    let package: Option<Rc<str>> = unit.package.as_ref().map(|name| name.join(".").into());
    if let Some(package) = &package {
        comp.system().add_package(package);
    }

    let mut imports = ImportTable::new(package.clone(), comp.system().clone());
    for import in &unit.imports {
        let name = import.name.join(".");
        if import.on_demand {
            imports.add_on_demand(&name);
        } else {
            imports.add_import(&name);
        }
    }
    let resolver = unit_resolver(imports, comp.system().clone(), comp.opts.cache_misses);

    let mut classes = Vec::new();
    for decl in &unit.classes {
        if let Some(class) = declare_class(comp, decl, package.clone(), None, index) {
            classes.push(class);
        }
    }

    debug!("declared unit {} ({}): {} classes", index, unit.file.display(), classes.len());

    UnitEntry {
        unit,
        package,
        resolver,
        classes,
    }
}

fn declare_class(
    comp: &mut Compiler,
    decl: &Rc<ClassDecl<Typed>>,
    package: Option<Rc<str>>,
    outer: Option<ClassId>,
    unit: usize,
) -> Option<ClassId> {
    let name = decl.name.name.clone();
    let full_name: Rc<str> = match (outer, &package) {
        (Some(outer), _) => format!("{}.{}", comp.defs.class(outer).full_name, name).into(),
        (None, Some(package)) => format!("{}.{}", package, name).into(),
        (None, None) => name.clone(),
    };

    if let Some(Named::Class(existing)) = comp.system().installed(&full_name) {
        comp.report(NameError::AlreadyDeclared {
            new: decl.name.clone(),
            existing: comp.defs.class(existing).span.clone(),
        });
        return None;
    }

    let is_interface = decl.kind == ClassDeclKind::Interface;
    let outer_is_interface = outer.map(|outer| comp.defs.class(outer).is_interface()).unwrap_or(false);

    let mut flags = decl.flags;
    if is_interface {
        flags |= Flags::INTERFACE | Flags::ABSTRACT;
        if outer.is_some() {
            flags |= Flags::STATIC;
        }
    }
    if outer_is_interface {
        flags |= Flags::PUBLIC | Flags::STATIC;
    }

    let source = ClassSource::Source {
        decl: decl.clone(),
        unit,
    };
    let id = comp
        .defs
        .add_class(name.clone(), full_name.clone(), package.clone(), flags, outer, decl.name.span.clone(), source);

    comp.system().install(full_name, Named::Class(id));
    if let Some(outer) = outer {
        comp.defs.add_member_class(outer, id);
    }

    let mut has_ctor = false;
    for member in &decl.members {
        match member {
            Member::Field(field) => {
                let mut field_flags = field.flags;
                if is_interface {
                    field_flags |= Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
                }

                let source = FieldSource::Source(field.clone());
                comp.defs
                    .add_field(id, field.name.name.clone(), field_flags, field.name.span.clone(), source);
            },

            Member::Proc(proc_decl) => {
                let mut proc_flags = proc_decl.flags;
                if is_interface && proc_decl.kind == ProcKind::Method {
                    proc_flags |= Flags::PUBLIC;
                    if proc_decl.body.is_none() {
                        proc_flags |= Flags::ABSTRACT;
                    }
                }

                has_ctor |= proc_decl.kind == ProcKind::Constructor;

                let proc_name = match proc_decl.kind {
                    ProcKind::Method => proc_decl.name.name.clone(),
                    ProcKind::Constructor => name.clone(),
                };
                let source = ProcSource::Source(proc_decl.clone());
                comp.defs
                    .add_proc(id, proc_decl.kind, proc_name, proc_flags, proc_decl.name.span.clone(), source);
            },

            Member::Initializer(init) => {
                comp.defs.add_init(id, init.clone());
            },

            Member::Class(inner) => {
                declare_class(comp, inner, package.clone(), Some(id), unit);
            },
        }
    }

    if !is_interface && !has_ctor {
        let ctor_flags = flags.access();
        let span = decl.name.span.clone();
        comp.defs
            .add_proc(id, ProcKind::Constructor, name, ctor_flags, span, ProcSource::DefaultCtor);
    }

    Some(id)
}

/// Checks that every import of a unit names something that exists.
pub(crate) fn check_imports(comp: &mut Compiler, index: usize) {
    let unit = comp.unit(index).unit.clone();
    let system = comp.system().clone();

    for import in &unit.imports {
        let name = import.name.join(".");

        let found = match (import.on_demand, system.find(&mut comp.defs, &name)) {
            (false, Ok(Named::Class(_))) => true,
            (true, Ok(_)) => true,
            _ => false,
        };

        if !found {
            comp.report(NameError::NoClass {
                name,
                span: import.span.clone(),
            });
        }
    }
}
