pub mod annotation;
pub mod classpath;
pub mod context;
pub mod def;
pub mod goal;
pub mod job;
pub mod pass;
pub mod reference;
pub mod resolve;
pub mod result;
pub mod ty;

#[cfg(test)]
mod test;

pub use self::{
    annotation::{DeclRef, Typed},
    classpath::{BuiltinClasspath, ExternalClass, TopLevelResolver},
    context::Context,
    def::{ClassId, CodeId, DefTable, FieldId, InitId, LocalId, ProcId},
    goal::{GoalKind, GoalState, GoalTarget},
    job::{compile, CheckedProgram, Compiler},
    reference::Ref,
    result::{NameError, NameResult, TypeError, TypeResult},
    ty::{ConstValue, Primitive, ProcSig, Type},
};
