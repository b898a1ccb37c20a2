//! Checks that a class doesn't inherit from itself. The declared supertypes are confirmed
//! once the hierarchy of every direct supertype has been confirmed.

use crate::{
    def::ClassId,
    goal::{GoalId, GoalKind, GoalRun, GoalState, GoalTarget},
    job::Compiler,
    result::TypeError,
};
use tracing::debug;

pub fn run(comp: &mut Compiler, goal: GoalId, class: ClassId) -> GoalRun {
    let (superclass, interfaces) = comp.declared_supertypes(class);

    let supertype_classes: Vec<ClassId> = superclass
        .iter()
        .chain(interfaces.iter())
        .filter_map(|ty| ty.as_class())
        .collect();

    for supertype in supertype_classes {
        let supertype_goal = comp.goal(GoalKind::Hierarchy, GoalTarget::Class(supertype));
        if comp.require(supertype_goal) {
            continue;
        }

        match comp.goal_state(supertype_goal) {
            GoalState::Running | GoalState::RunningRecursive => {
                let class_def = comp.defs.class(class);
                let (full_name, span) = (class_def.full_name.clone(), class_def.span.clone());
                let keeps_no_superclass = class_def.is_interface() || comp.is_object(class);
                debug!("{} inherits from itself through {}", full_name, comp.defs.class(supertype).full_name);

                comp.report(TypeError::CyclicInheritance { class: full_name, span });

                // break the cycle so lookups through this class terminate
                let fallback = if keeps_no_superclass {
                    None
                } else {
                    Some(comp.object_type()).filter(|ty| !ty.is_unknown())
                };
                let class_def = comp.defs.class_mut(class);
                class_def.superclass.update_by(fallback, goal);
                class_def.interfaces.update_by(Vec::new(), goal);
                return GoalRun::Failed;
            },

            GoalState::Failed => return GoalRun::Failed,

            _ => return GoalRun::Deferred,
        }
    }

    let class_def = comp.defs.class_mut(class);
    class_def.superclass.update_by(superclass, goal);
    class_def.interfaces.update_by(interfaces, goal);
    GoalRun::Success
}
