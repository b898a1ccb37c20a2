#[cfg(test)]
mod test;

use crate::def::{ClassId, FieldId, InitId, ProcId};
use petgraph::{
    algo::has_path_connecting,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use std::{collections::HashMap, fmt};
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GoalId(NodeIndex);

impl GoalId {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GoalKind {
    /// The declared superclass and interfaces of a class have been resolved to types.
    Supertypes,

    /// The class's supertypes are known not to form a cycle.
    Hierarchy,

    /// The declared type of a field, or the signature of a method or constructor.
    Signature,

    /// Every member signature of a class is known.
    Members,

    /// The compile-time constant value of a final field, if it has one.
    FieldConstant,

    Disambiguated,
    TypeChecked,

    /// Override and abstract method implementation checks for a class.
    Conformance,

    ClassChecked,
    UnitChecked,
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GoalTarget {
    Class(ClassId),
    Field(FieldId),
    Proc(ProcId),
    Init(InitId),
    Unit(usize),
}

/// Identity of a goal: two requests for the same kind of work on the same target share
/// one goal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GoalKey {
    pub kind: GoalKind,
    pub target: GoalTarget,
    pub slot: u32,
}

impl GoalKey {
    pub fn new(kind: GoalKind, target: GoalTarget) -> Self {
        Self { kind, target, slot: 0 }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GoalState {
    New,
    Running,

    /// Running, and attempted again before finishing.
    RunningRecursive,

    Success,
    Failed,
}

impl GoalState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GoalState::Success | GoalState::Failed)
    }

    pub fn is_running(self) -> bool {
        matches!(self, GoalState::Running | GoalState::RunningRecursive)
    }
}

/// Outcome of running a goal's body.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GoalRun {
    Success,
    Failed,

    /// Some dependency isn't available yet. The goal goes back to `New` so a later pass
    /// over the program can try it again.
    Deferred,
}

/// Returned when a prerequisite edge would close a cycle in the goal graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CyclicDependency {
    pub goal: String,
    pub prereq: String,
}

impl fmt::Display for CyclicDependency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{0} cannot depend on {1} because {1} already depends on {0}", self.goal, self.prereq)
    }
}

#[derive(Debug)]
struct GoalNode {
    key: GoalKey,
    name: String,
    state: GoalState,
}

/// The goal graph. Nodes are goals, edges point from a goal to its prerequisites.
#[derive(Debug, Default)]
pub struct Scheduler {
    graph: DiGraph<GoalNode, ()>,
    index: HashMap<GoalKey, GoalId>,

    // goals whose bodies are currently executing, innermost last
    running: Vec<GoalId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the goal for `key`, creating it in the `New` state if it doesn't exist yet.
    /// `name` describes the target and is only called for new goals.
    pub fn intern(&mut self, key: GoalKey, name: impl FnOnce() -> String) -> GoalId {
        if let Some(id) = self.index.get(&key) {
            return *id;
        }

        let node = GoalNode {
            key,
            name: format!("{}({})", key.kind, name()),
            state: GoalState::New,
        };
        trace!("new goal {}", node.name);

        let id = GoalId(self.graph.add_node(node));
        self.index.insert(key, id);
        id
    }

    pub fn find(&self, key: &GoalKey) -> Option<GoalId> {
        self.index.get(key).copied()
    }

    pub fn key(&self, goal: GoalId) -> &GoalKey {
        &self.graph[goal.0].key
    }

    pub fn name(&self, goal: GoalId) -> &str {
        &self.graph[goal.0].name
    }

    pub fn state(&self, goal: GoalId) -> GoalState {
        self.graph[goal.0].state
    }

    fn set_state(&mut self, goal: GoalId, state: GoalState) {
        let node = &mut self.graph[goal.0];
        if node.state != state {
            trace!("{}: {:?} -> {:?}", node.name, node.state, state);
            node.state = state;
        }
    }

    pub fn is_reached(&self, goal: GoalId) -> bool {
        self.state(goal) == GoalState::Success
    }

    /// Prerequisites of `goal` in the order they were added.
    pub fn prereqs(&self, goal: GoalId) -> Vec<GoalId> {
        let mut edges: Vec<_> = self
            .graph
            .edges(goal.0)
            .map(|edge| (edge.id(), GoalId(edge.target())))
            .collect();
        edges.sort_by_key(|(edge, _)| edge.index());

        edges.into_iter().map(|(_, prereq)| prereq).collect()
    }

    pub fn add_prereq(&mut self, goal: GoalId, prereq: GoalId) {
        if self.graph.find_edge(goal.0, prereq.0).is_none() {
            self.graph.add_edge(goal.0, prereq.0, ());
        }
    }

    /// Adds a prerequisite edge unless it would make `goal` (indirectly) depend on itself.
    pub fn add_prereq_checked(&mut self, goal: GoalId, prereq: GoalId) -> Result<(), CyclicDependency> {
        if has_path_connecting(&self.graph, prereq.0, goal.0, None) {
            return Err(CyclicDependency {
                goal: self.name(goal).to_string(),
                prereq: self.name(prereq).to_string(),
            });
        }

        self.add_prereq(goal, prereq);
        Ok(())
    }

    /// The innermost goal whose body is executing.
    pub fn current(&self) -> Option<GoalId> {
        self.running.last().copied()
    }

    pub fn goals(&self) -> impl Iterator<Item = GoalId> + '_ {
        self.graph.node_indices().map(GoalId)
    }

    pub fn count(&self, state: GoalState) -> usize {
        self.graph.node_weights().filter(|node| node.state == state).count()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// Anything that owns a goal graph and knows how to run the goals in it.
pub trait Job {
    fn scheduler(&self) -> &Scheduler;
    fn scheduler_mut(&mut self) -> &mut Scheduler;

    /// Executes the body of a goal whose prerequisites have all succeeded.
    fn run(&mut self, goal: GoalId) -> GoalRun;
}

/// Tries to bring `goal` to `Success`, attempting its prerequisites first. Returns whether
/// it succeeded.
///
/// Attempting a goal that is already running doesn't recurse: the goal is marked
/// `RunningRecursive` and the attempt reports failure to the caller. A goal whose
/// prerequisites couldn't be reached only because of such a cycle goes back to `New`,
/// while a failed prerequisite fails the goal too.
pub fn attempt<J: Job + ?Sized>(job: &mut J, goal: GoalId) -> bool {
    match job.scheduler().state(goal) {
        GoalState::Success => return true,
        GoalState::Failed => return false,

        GoalState::Running | GoalState::RunningRecursive => {
            debug!("cyclic attempt of {}", job.scheduler().name(goal));
            job.scheduler_mut().set_state(goal, GoalState::RunningRecursive);
            return false;
        },

        GoalState::New => {},
    }

    job.scheduler_mut().set_state(goal, GoalState::Running);

    for prereq in job.scheduler().prereqs(goal) {
        if attempt(job, prereq) {
            continue;
        }

        let scheduler = job.scheduler_mut();
        let blocked_state = if scheduler.state(prereq) == GoalState::Failed {
            GoalState::Failed
        } else {
            GoalState::New
        };

        debug!(
            "{} blocked by {} ({:?})",
            scheduler.name(goal),
            scheduler.name(prereq),
            scheduler.state(prereq)
        );
        scheduler.set_state(goal, blocked_state);
        return false;
    }

    job.scheduler_mut().running.push(goal);
    let result = job.run(goal);
    let popped = job.scheduler_mut().running.pop();
    assert_eq!(Some(goal), popped, "goal stack must be balanced");

    let scheduler = job.scheduler_mut();
    let state = match result {
        GoalRun::Success => GoalState::Success,
        GoalRun::Failed => GoalState::Failed,
        GoalRun::Deferred => GoalState::New,
    };
    debug!("{}: {:?}", scheduler.name(goal), result);
    scheduler.set_state(goal, state);

    state == GoalState::Success
}
