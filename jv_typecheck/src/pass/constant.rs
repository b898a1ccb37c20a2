use crate::{
    def::{CodeId, FieldId},
    goal::{GoalId, GoalKind, GoalRun},
    job::Compiler,
    ty::{ConstValue, Type},
};
use jv_syn::Member;
use tracing::trace;

/// Goal body: records the compile-time constant value of a field, if it has one. Only
/// final fields of primitive or `String` type initialized with a constant expression do.
pub fn run(comp: &mut Compiler, goal: GoalId, field: FieldId) -> GoalRun {
    let value = field_constant(comp, field);
    trace!("constant value of {}: {:?}", comp.defs.field(field).name, value);

    comp.defs.field_mut(field).constant.update_by(value, goal);
    GoalRun::Success
}

fn field_constant(comp: &mut Compiler, field: FieldId) -> Option<ConstValue> {
    let field_def = comp.defs.field(field);
    if !field_def.flags.is_final() || !field_def.has_init() {
        return None;
    }

    let ty = comp.field_type(field);
    if !ty.is_primitive() && !comp.is_string(&ty) {
        return None;
    }

    // the initializer's checker is a prerequisite, so this is its checked tree
    let init_constant = match comp.code_member(CodeId::Field(field), GoalKind::TypeChecked)? {
        Member::Field(decl) => decl.init.as_ref()?.annotation().constant.clone()?,
        other => unreachable!("code of a field is {}", other),
    };

    match (&ty, init_constant) {
        (Type::Primitive(primitive), value) => value.convert(*primitive),
        (_, value @ ConstValue::String(..)) => Some(value),
        _ => None,
    }
}
