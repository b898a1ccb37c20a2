mod assemble;

use crate::{
    annotation::Typed,
    classpath::TopLevelResolver,
    context::Context,
    def::{ClassId, CodeId, DefTable, FieldId, ProcId, ProcSource},
    goal::{attempt, CyclicDependency, GoalId, GoalKey, GoalKind, GoalRun, GoalState, GoalTarget, Job, Scheduler},
    pass,
    reference::{force, GoalSet},
    resolve::{Named, Resolver, SystemResolver},
    result::TypeError,
    ty::{ConstValue, ProcSig, Type},
};
use jv_common::{span::*, BuildOptions, ErrorQueue};
use jv_syn::{Member, Unit};
use std::rc::Rc;
use tracing::{debug, info};

/// The result of a successful compilation: every unit rebuilt from its checked members,
/// and the definitions the annotations refer to.
#[derive(Debug)]
pub struct CheckedProgram {
    pub units: Vec<Rc<Unit<Typed>>>,
    pub defs: DefTable,
}

#[derive(Debug)]
pub(crate) struct UnitEntry {
    pub unit: Rc<Unit<Typed>>,
    pub package: Option<Rc<str>>,
    pub resolver: Rc<dyn Resolver>,
    pub classes: Vec<ClassId>,
}

/// Owns everything one compilation works on and runs the goals that fill it in.
#[derive(Debug)]
pub struct Compiler {
    pub opts: BuildOptions,
    pub defs: DefTable,

    scheduler: Scheduler,
    system: Rc<SystemResolver>,
    errors: ErrorQueue,
    units: Vec<UnitEntry>,
}

impl Compiler {
    pub fn new(classpath: impl TopLevelResolver + 'static, opts: BuildOptions) -> Self {
        let system = Rc::new(SystemResolver::new(classpath, opts.cache_misses));

        Self {
            opts,
            defs: DefTable::new(),
            scheduler: Scheduler::new(),
            system,
            errors: ErrorQueue::new(),
            units: Vec::new(),
        }
    }

    pub fn system(&self) -> &Rc<SystemResolver> {
        &self.system
    }

    pub fn errors(&self) -> &ErrorQueue {
        &self.errors
    }

    pub fn report(&mut self, err: impl Into<TypeError>) {
        let err = err.into();
        debug!("error: {}", err);
        self.errors.enqueue(err.to_error_info());
    }

    /// Declares the classes of a parsed unit and returns its index. Every unit of a
    /// compilation must be added before any goal runs.
    pub fn add_unit(&mut self, unit: Unit<Typed>) -> usize {
        let index = self.units.len();
        let entry = pass::decl::declare_unit(self, index, Rc::new(unit));
        self.units.push(entry);
        index
    }

    pub(crate) fn unit(&self, index: usize) -> &UnitEntry {
        &self.units[index]
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn goal_name(&self, goal: GoalId) -> &str {
        self.scheduler.name(goal)
    }

    pub fn goal_state(&self, goal: GoalId) -> GoalState {
        self.scheduler.state(goal)
    }

    /// Finds or creates the goal for some work on a target. A new goal gets the
    /// prerequisites its kind always has.
    pub fn goal(&mut self, kind: GoalKind, target: GoalTarget) -> GoalId {
        let key = GoalKey::new(kind, target);
        if let Some(goal) = self.scheduler.find(&key) {
            return goal;
        }

        let defs = &self.defs;
        let goal = self.scheduler.intern(key, || defs.describe(target));

        for prereq in self.static_prereqs(kind, target) {
            self.scheduler.add_prereq(goal, prereq);
        }
        goal
    }

    fn static_prereqs(&mut self, kind: GoalKind, target: GoalTarget) -> Vec<GoalId> {
        match (kind, target) {
            (GoalKind::Hierarchy, GoalTarget::Class(_)) => vec![self.goal(GoalKind::Supertypes, target)],

            (GoalKind::Members, GoalTarget::Class(class)) => {
                let class_def = self.defs.class(class);
                let mut targets: Vec<_> = class_def.fields.iter().map(|id| GoalTarget::Field(*id)).collect();
                targets.extend(class_def.methods.iter().map(|id| GoalTarget::Proc(*id)));
                targets.extend(class_def.ctors.iter().map(|id| GoalTarget::Proc(*id)));

                let mut prereqs = vec![self.goal(GoalKind::Hierarchy, target)];
                prereqs.extend(targets.into_iter().map(|t| self.goal(GoalKind::Signature, t)));
                prereqs
            },

            (GoalKind::FieldConstant, GoalTarget::Field(field)) => {
                if self.defs.field(field).has_init() {
                    vec![self.goal(GoalKind::TypeChecked, target)]
                } else {
                    Vec::new()
                }
            },

            (GoalKind::TypeChecked, _) => vec![self.goal(GoalKind::Disambiguated, target)],

            (GoalKind::Conformance, GoalTarget::Class(_)) => vec![self.goal(GoalKind::Members, target)],

            (GoalKind::ClassChecked, GoalTarget::Class(class)) => {
                let mut prereqs = vec![self.goal(GoalKind::Conformance, target)];
                for code in self.class_code(class) {
                    prereqs.push(self.goal(GoalKind::TypeChecked, code.goal_target()));
                }

                let member_classes: Vec<_> = self.defs.class(class).member_classes.values().copied().collect();
                for member_class in member_classes {
                    prereqs.push(self.goal(GoalKind::ClassChecked, GoalTarget::Class(member_class)));
                }
                prereqs
            },

            (GoalKind::UnitChecked, GoalTarget::Unit(index)) => {
                let classes = self.units[index].classes.clone();
                classes
                    .into_iter()
                    .map(|class| self.goal(GoalKind::ClassChecked, GoalTarget::Class(class)))
                    .collect()
            },

            _ => Vec::new(),
        }
    }

    /// Source code of a class that gets checked: field declarations, method and
    /// constructor declarations with bodies or without, and initializer blocks.
    pub fn class_code(&self, class: ClassId) -> Vec<CodeId> {
        let class_def = self.defs.class(class);
        let mut code = Vec::new();

        code.extend(class_def.fields.iter().filter(|id| self.defs.field(**id).code.is_some()).map(|id| CodeId::Field(*id)));
        code.extend(
            class_def
                .methods
                .iter()
                .chain(class_def.ctors.iter())
                .filter(|id| self.defs.proc(**id).code.is_some())
                .map(|id| CodeId::Proc(*id)),
        );
        code.extend(class_def.inits.iter().map(|id| CodeId::Init(*id)));
        code
    }

    /// Makes the running goal depend on `goal` and attempts it.
    pub fn require(&mut self, goal: GoalId) -> bool {
        if let Some(current) = self.scheduler.current() {
            if current != goal {
                self.scheduler.add_prereq(current, goal);
            }
        }
        attempt(self, goal)
    }

    /// Like [Compiler::require], but refuses to add a dependency that would make the running
    /// goal depend on itself.
    pub fn require_checked(&mut self, goal: GoalId) -> Result<bool, CyclicDependency> {
        if let Some(current) = self.scheduler.current() {
            self.scheduler.add_prereq_checked(current, goal)?;
        }
        Ok(attempt(self, goal))
    }

    pub fn is_terminal(&mut self, kind: GoalKind, target: GoalTarget) -> bool {
        let goal = self.goal(kind, target);
        self.scheduler.state(goal).is_terminal()
    }

    /// A context for the unit's top level.
    pub fn unit_context(&self, unit: usize) -> Context {
        Context::new(self.units[unit].resolver.clone())
    }

    /// The context inside the body of `class`, with every enclosing class pushed.
    pub fn class_context(&self, class: ClassId) -> Context {
        let outer_ctx = self.outer_context(class);
        outer_ctx.push_class(class)
    }

    /// The context a class's header is resolved in: inside its enclosing classes but not
    /// inside the class itself.
    pub fn outer_context(&self, class: ClassId) -> Context {
        let mut chain = Vec::new();
        let mut next = self.defs.class(class).outer;
        while let Some(outer) = next {
            chain.push(outer);
            next = self.defs.class(outer).outer;
        }

        let outermost = self.defs.outermost(class);
        let unit = match self.defs.class(outermost).unit() {
            Some(unit) => unit,
            None => panic!("{} is not a source class", self.defs.class(class).full_name),
        };

        chain
            .into_iter()
            .rev()
            .fold(self.unit_context(unit), |ctx, outer| ctx.push_class(outer))
    }

    pub fn code_context(&self, code: CodeId) -> Context {
        let class = self.defs.code_container(code);
        self.class_context(class).push_code(code, self.defs.code_is_static(code))
    }

    /// The type of a class in the standard library, or the unknown type if the classpath
    /// doesn't have it.
    pub fn well_known(&mut self, name: &str) -> Type {
        match self.system.find(&mut self.defs, name) {
            Ok(Named::Class(id)) => self.defs.class_type(id),
            _ => Type::Unknown,
        }
    }

    pub fn object_type(&mut self) -> Type {
        self.well_known("java.lang.Object")
    }

    pub fn string_type(&mut self) -> Type {
        self.well_known("java.lang.String")
    }

    pub fn is_string(&mut self, ty: &Type) -> bool {
        !ty.is_unknown() && *ty == self.string_type()
    }

    /// Resolves a type written the way classpath entries write them, e.g. `int`,
    /// `java.lang.String` or `char[]`.
    pub fn type_from_name(&mut self, name: &str) -> Type {
        if let Some(elem) = name.strip_suffix("[]") {
            let elem = self.type_from_name(elem);
            return self.defs.array_of(elem);
        }

        if let Some(primitive) = crate::ty::Primitive::from_name(name) {
            return Type::Primitive(primitive);
        }

        match self.system.find(&mut self.defs, name) {
            Ok(Named::Class(id)) => self.defs.class_type(id),
            _ => {
                debug!("classpath type `{}` not found", name);
                Type::Unknown
            },
        }
    }

    /// The superclass and interfaces as written in the class header, before the hierarchy
    /// has been checked for cycles.
    pub fn declared_supertypes(&mut self, class: ClassId) -> (Option<Type>, Vec<Type>) {
        let goal = self.goal(GoalKind::Supertypes, GoalTarget::Class(class));
        self.require(goal);
        self.supertypes_as_of(class, goal)
    }

    fn supertypes_as_of(&mut self, class: ClassId, goal: GoalId) -> (Option<Type>, Vec<Type>) {
        let view = GoalSet::of(goal);

        self.defs.class_mut(class).superclass.set_resolver(goal);
        self.defs.class_mut(class).interfaces.set_resolver(goal);

        let superclass = force(self, &view, |comp| &mut comp.defs.class_mut(class).superclass).flatten();
        let interfaces = force(self, &view, |comp| &mut comp.defs.class_mut(class).interfaces).unwrap_or_default();
        (superclass, interfaces)
    }

    pub fn superclass(&mut self, class: ClassId) -> Option<Type> {
        self.supertypes(class).0
    }

    pub fn interfaces(&mut self, class: ClassId) -> Vec<Type> {
        self.supertypes(class).1
    }

    /// Supertypes of a class once its hierarchy is known to be acyclic. While that isn't
    /// known yet the declared supertypes are returned.
    pub fn supertypes(&mut self, class: ClassId) -> (Option<Type>, Vec<Type>) {
        let goal = self.goal(GoalKind::Hierarchy, GoalTarget::Class(class));
        self.require(goal);
        self.supertypes_as_of(class, goal)
    }

    /// Superclass first, then interfaces in declaration order.
    pub fn direct_supertypes(&mut self, class: ClassId) -> Vec<Type> {
        let (superclass, interfaces) = self.supertypes(class);
        superclass.into_iter().chain(interfaces).collect()
    }

    pub fn field_type(&mut self, field: FieldId) -> Type {
        let goal = self.goal(GoalKind::Signature, GoalTarget::Field(field));
        self.require(goal);

        self.defs.field_mut(field).ty.set_resolver(goal);
        force(self, &GoalSet::of(goal), |comp| &mut comp.defs.field_mut(field).ty).unwrap_or(Type::Unknown)
    }

    pub fn proc_sig(&mut self, proc_id: ProcId) -> Rc<ProcSig> {
        let goal = self.goal(GoalKind::Signature, GoalTarget::Proc(proc_id));
        self.require(goal);

        self.defs.proc_mut(proc_id).sig.set_resolver(goal);
        let sig = force(self, &GoalSet::of(goal), |comp| &mut comp.defs.proc_mut(proc_id).sig);
        sig.unwrap_or_else(|| {
            let formal_count = self.defs.proc(proc_id).formal_count();
            Rc::new(ProcSig::unknown(formal_count))
        })
    }

    /// The compile-time constant value of a field. Fields whose initializer (indirectly)
    /// depends on the code being checked right now are never constant.
    pub fn field_constant(&mut self, field: FieldId) -> Option<ConstValue> {
        let field_def = self.defs.field(field);
        if field_def.decl().is_none() {
            return field_def.constant.latest().cloned().flatten();
        }

        if !field_def.flags.is_final() || !field_def.has_init() {
            return None;
        }

        let goal = self.goal(GoalKind::FieldConstant, GoalTarget::Field(field));
        match self.require_checked(goal) {
            Ok(true) => {},
            Ok(false) => return None,
            Err(cycle) => {
                debug!("{}", cycle);
                return None;
            },
        }

        self.defs.field_mut(field).constant.set_resolver(goal);
        force(self, &GoalSet::of(goal), |comp| &mut comp.defs.field_mut(field).constant).flatten()
    }

    /// The code of a member as left by the `Disambiguated` or `TypeChecked` goal.
    pub fn code_member(&mut self, code: CodeId, kind: GoalKind) -> Option<Member<Typed>> {
        let goal = self.goal(kind, code.goal_target());
        self.require(goal);

        self.defs.code_ref_mut(code)?.set_resolver(goal);
        force(self, &GoalSet::of(goal), |comp| match comp.defs.code_ref_mut(code) {
            Some(code_ref) => code_ref,
            None => unreachable!("code ref of {:?} disappeared", code),
        })
    }

    /// Runs goals until every unit is checked or no more progress can be made, and
    /// reports anything that was never reached.
    pub fn check_all(&mut self) {
        let unit_goals: Vec<_> = (0..self.units.len())
            .map(|index| self.goal(GoalKind::UnitChecked, GoalTarget::Unit(index)))
            .collect();

        for index in 0..self.units.len() {
            pass::decl::check_imports(self, index);
        }

        for pass in 0..self.opts.max_passes {
            let pending: Vec<_> = self
                .scheduler
                .goals()
                .filter(|goal| !self.scheduler.state(*goal).is_terminal())
                .collect();
            if pending.is_empty() {
                break;
            }

            let goal_count = self.scheduler.len();
            info!("pass {}: {} of {} goals outstanding", pass + 1, pending.len(), goal_count);
            if self.opts.verbose {
                println!("pass {}: {} goals outstanding", pass + 1, pending.len());
            }

            for goal in &pending {
                if !self.scheduler.state(*goal).is_terminal() {
                    attempt(self, *goal);
                }
            }

            let progressed = self.scheduler.len() != goal_count
                || pending.iter().any(|goal| self.scheduler.state(*goal).is_terminal());
            if !progressed {
                debug!("pass {} made no progress", pass + 1);
                break;
            }
        }

        for (index, goal) in unit_goals.into_iter().enumerate() {
            if !self.scheduler.state(goal).is_terminal() {
                let err = TypeError::UnreachedGoal {
                    goal: self.scheduler.name(goal).to_string(),
                    span: Span::zero((*self.units[index].unit.file).clone()),
                };
                self.report(err);
            }
        }
    }

    /// Whether every source constructor, method and field has passed its checks.
    pub fn is_checked(&mut self, unit: usize) -> bool {
        let goal = self.goal(GoalKind::UnitChecked, GoalTarget::Unit(unit));
        self.scheduler.is_reached(goal)
    }

    /// Rebuilds every unit from the checked code of its classes.
    pub fn finish(self) -> Result<CheckedProgram, ErrorQueue> {
        if self.errors.has_errors() {
            return Err(self.errors);
        }

        let units = (0..self.units.len()).map(|index| assemble::assemble_unit(&self, index)).collect();

        Ok(CheckedProgram {
            units,
            defs: self.defs,
        })
    }
}

impl Job for Compiler {
    fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    fn run(&mut self, goal: GoalId) -> GoalRun {
        let key = *self.scheduler.key(goal);

        match (key.kind, key.target) {
            (GoalKind::Supertypes, GoalTarget::Class(class)) => pass::supertypes::run(self, goal, class),
            (GoalKind::Hierarchy, GoalTarget::Class(class)) => pass::hierarchy::run(self, goal, class),
            (GoalKind::Signature, GoalTarget::Field(field)) => pass::signature::run_field(self, goal, field),
            (GoalKind::Signature, GoalTarget::Proc(proc_id)) => pass::signature::run_proc(self, goal, proc_id),
            (GoalKind::FieldConstant, GoalTarget::Field(field)) => pass::constant::run(self, goal, field),
            (GoalKind::Conformance, GoalTarget::Class(class)) => pass::conformance::run(self, goal, class),

            (GoalKind::Disambiguated, target) => pass::disambiguate::run(self, goal, code_of(target)),
            (GoalKind::TypeChecked, target) => {
                let code = code_of(target);
                let container = self.defs.code_container(code);
                let members = self.goal(GoalKind::Members, GoalTarget::Class(container));
                if !self.require(members) {
                    return match self.scheduler.state(members) {
                        GoalState::Failed => GoalRun::Failed,
                        _ => GoalRun::Deferred,
                    };
                }

                pass::typecheck::run(self, goal, code)
            },

            // these only gather prerequisites
            (GoalKind::Members, GoalTarget::Class(_))
            | (GoalKind::ClassChecked, GoalTarget::Class(_))
            | (GoalKind::UnitChecked, GoalTarget::Unit(_)) => GoalRun::Success,

            (kind, target) => unreachable!("no goal {} exists for {:?}", kind, target),
        }
    }
}

fn code_of(target: GoalTarget) -> CodeId {
    match target {
        GoalTarget::Field(id) => CodeId::Field(id),
        GoalTarget::Proc(id) => CodeId::Proc(id),
        GoalTarget::Init(id) => CodeId::Init(id),
        other => unreachable!("{:?} is not code", other),
    }
}

/// Checks a set of parsed units against a classpath.
pub fn compile(
    units: Vec<Unit<Typed>>,
    classpath: impl TopLevelResolver + 'static,
    opts: BuildOptions,
) -> Result<CheckedProgram, ErrorQueue> {
    let mut comp = Compiler::new(classpath, opts);
    for unit in units {
        comp.add_unit(unit);
    }

    comp.check_all();
    comp.finish()
}

pub(crate) fn is_default_ctor(comp: &Compiler, proc_id: ProcId) -> bool {
    matches!(comp.defs.proc(proc_id).source, ProcSource::DefaultCtor)
}
