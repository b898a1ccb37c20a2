use super::*;
use crate::{
    classpath::BuiltinClasspath,
    def::{FieldId, ProcId},
    resolve::SystemResolver,
};

fn base() -> Context {
    let system: Rc<dyn Resolver> = Rc::new(SystemResolver::new(BuiltinClasspath::new(), false));
    Context::new(system)
}

fn local_id(ctx: &Context, name: &str) -> Option<LocalId> {
    ctx.find_local(name).and_then(|binding| binding.local)
}

#[test]
fn pushing_leaves_parent_unchanged() {
    let outer = base().push_class(ClassId(0)).push_code(CodeId::Proc(ProcId(0)), false);
    let inner = outer.add_local("x".into(), Some(LocalId(0)), Span::builtin());

    assert!(inner.is_local("x"));
    assert!(!outer.is_local("x"));
}

#[test]
fn inner_local_shadows_outer() {
    let ctx = base()
        .push_class(ClassId(0))
        .push_code(CodeId::Proc(ProcId(0)), false)
        .add_local("x".into(), Some(LocalId(0)), Span::builtin())
        .push_block()
        .add_local("x".into(), Some(LocalId(1)), Span::builtin());

    assert_eq!(Some(LocalId(1)), local_id(&ctx, "x"));
}

#[test]
fn locals_of_enclosing_code_are_hidden_by_class() {
    let ctx = base()
        .push_class(ClassId(0))
        .push_code(CodeId::Proc(ProcId(0)), false)
        .add_local("x".into(), Some(LocalId(0)), Span::builtin())
        .push_class(ClassId(1))
        .push_code(CodeId::Proc(ProcId(1)), false);

    assert!(!ctx.is_local("x"));
    assert_eq!(vec![ClassId(1), ClassId(0)], ctx.classes().collect::<Vec<_>>());
    assert_eq!(Some(ClassId(1)), ctx.current_class());
}

#[test]
fn static_context_follows_innermost_code() {
    let class = base().push_class(ClassId(0));
    assert!(!class.in_static_context());
    assert_eq!(None, class.current_code());

    let static_code = class.push_code(CodeId::Field(FieldId(0)), true).push_block();
    assert!(static_code.in_static_context());
    assert_eq!(Some(CodeId::Field(FieldId(0))), static_code.current_code());

    // an instance member class inside static code
    let nested = static_code.push_class(ClassId(1)).push_code(CodeId::Proc(ProcId(2)), false);
    assert!(!nested.in_static_context());
}

#[test]
fn unlabeled_jump_finds_innermost_target() {
    let ctx = base()
        .push_class(ClassId(0))
        .push_code(CodeId::Proc(ProcId(0)), false)
        .push_break_label(Some("outer".into()))
        .push_break_label(None)
        .push_continue_label(None);

    let label = ctx.find_label(LabelKind::Break, None).unwrap();
    assert_eq!(None, label.name);

    let label = ctx.find_label(LabelKind::Break, Some("outer")).unwrap();
    assert_eq!(Some("outer"), label.name.as_deref());

    assert!(ctx.find_label(LabelKind::Continue, Some("outer")).is_none());
    assert!(ctx.has_label("outer"));
}

#[test]
fn labels_stop_at_code_boundary() {
    let ctx = base()
        .push_class(ClassId(0))
        .push_code(CodeId::Proc(ProcId(0)), false)
        .push_break_label(None)
        .push_class(ClassId(1))
        .push_code(CodeId::Proc(ProcId(1)), false);

    assert!(ctx.find_label(LabelKind::Break, None).is_none());
}

#[test]
fn binding_without_def_is_still_found() {
    let ctx = base()
        .push_class(ClassId(0))
        .push_code(CodeId::Proc(ProcId(0)), false)
        .add_local("y".into(), None, Span::builtin());

    assert!(ctx.is_local("y"));
    assert_eq!(None, local_id(&ctx, "y"));
}
