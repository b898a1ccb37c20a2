//! Puts the checked trees recorded in the code cells back together into units.

use super::Compiler;
use crate::{
    annotation::{DeclRef, Typed},
    def::{ClassId, CodeId, MemberDef, ProcSource},
    pass::disambiguate::class_node,
    ty::Type,
};
use jv_common::span::*;
use jv_syn::{ClassDecl, Member, TypeNode, Unit};
use std::rc::Rc;

pub(super) fn assemble_unit(comp: &Compiler, index: usize) -> Rc<Unit<Typed>> {
    let entry = comp.unit(index);

    let classes = entry
        .classes
        .iter()
        .map(|class| assemble_class(comp, *class))
        .collect();

    Rc::new(Unit {
        file: entry.unit.file.clone(),
        package: entry.unit.package.clone(),
        imports: entry.unit.imports.clone(),
        classes,
        annotation: entry.unit.annotation.clone(),
    })
}

fn supertype_node(comp: &Compiler, ty: &Type, span: Span) -> Option<TypeNode<Typed>> {
    ty.as_class().map(|class| class_node(comp, class, span))
}

fn assemble_class(comp: &Compiler, class: ClassId) -> Rc<ClassDecl<Typed>> {
    let class_def = comp.defs.class(class);
    let decl = match class_def.decl() {
        Some(decl) => decl,
        None => unreachable!("binary class {} in a source unit", class_def.full_name),
    };

    // only an explicit `extends` clause is written back
    let superclass = decl.superclass.as_ref().and_then(|node| {
        let ty = class_def.superclass.latest().cloned().flatten()?;
        supertype_node(comp, &ty, node.span().clone())
    });

    let interfaces = class_def
        .interfaces
        .latest()
        .into_iter()
        .flatten()
        .enumerate()
        .filter_map(|(i, ty)| {
            let span = match decl.interfaces.get(i) {
                Some(node) => node.span().clone(),
                None => class_def.span.clone(),
            };
            supertype_node(comp, ty, span)
        })
        .collect();

    let members = class_def
        .members
        .iter()
        .filter_map(|member| assemble_member(comp, *member))
        .collect();

    let annotation = Typed::new(decl.annotation.span.clone(), comp.defs.class_type(class))
        .with_decl(DeclRef::Class(class));

    Rc::new(ClassDecl {
        flags: decl.flags,
        kind: decl.kind,
        name: decl.name.clone(),
        superclass,
        interfaces,
        members,
        annotation,
    })
}

fn latest_code(comp: &Compiler, code: CodeId) -> Option<Member<Typed>> {
    comp.defs.code_ref(code)?.latest().cloned()
}

fn assemble_member(comp: &Compiler, member: MemberDef) -> Option<Member<Typed>> {
    match member {
        MemberDef::Field(field) => {
            let original = comp.defs.field(field).decl().cloned().map(Member::Field);
            latest_code(comp, CodeId::Field(field)).or(original)
        },

        MemberDef::Proc(proc_id) => {
            let proc_def = comp.defs.proc(proc_id);
            match &proc_def.source {
                ProcSource::Source(decl) => {
                    latest_code(comp, CodeId::Proc(proc_id)).or_else(|| Some(Member::Proc(decl.clone())))
                },
                ProcSource::DefaultCtor | ProcSource::Binary(..) => None,
            }
        },

        MemberDef::Init(init) => latest_code(comp, CodeId::Init(init)),

        MemberDef::Class(class) => Some(Member::Class(assemble_class(comp, class))),
    }
}
