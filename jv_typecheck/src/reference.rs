//! Memoizing cells for values that are filled in by goals.
//!
//! A [Ref] keeps every value it has been given together with the set of goals (its
//! "view") that value is valid for. Readers ask for the value as of some view, and the
//! cell's resolver goal is attempted when nothing recorded so far covers it.

#[cfg(test)]
mod test;

use crate::goal::{attempt, GoalId, Job};
use std::{collections::BTreeSet, fmt, iter::FromIterator};
use tracing::trace;

/// A set of goals whose effects are considered to be in force.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct GoalSet {
    goals: BTreeSet<GoalId>,
}

impl GoalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(goal: GoalId) -> Self {
        let mut goals = BTreeSet::new();
        goals.insert(goal);
        Self { goals }
    }

    pub fn contains(&self, goal: GoalId) -> bool {
        self.goals.contains(&goal)
    }

    pub fn is_superset(&self, other: &GoalSet) -> bool {
        self.goals.is_superset(&other.goals)
    }

    pub fn insert(&mut self, goal: GoalId) {
        self.goals.insert(goal);
    }

    pub fn with(&self, goal: GoalId) -> Self {
        let mut result = self.clone();
        result.insert(goal);
        result
    }

    pub fn union(&self, other: &GoalSet) -> Self {
        Self {
            goals: self.goals.union(&other.goals).copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GoalId> + '_ {
        self.goals.iter().copied()
    }
}

impl FromIterator<GoalId> for GoalSet {
    fn from_iter<T: IntoIterator<Item = GoalId>>(iter: T) -> Self {
        Self {
            goals: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for GoalSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.goals.iter().map(|goal| goal.index())).finish()
    }
}

#[derive(Clone, Debug)]
struct RefEntry<T> {
    value: T,
    view: GoalSet,
}

#[derive(Clone, Debug)]
pub struct Ref<T> {
    // oldest first
    history: Vec<RefEntry<T>>,
    resolver: Option<GoalId>,
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            resolver: None,
        }
    }
}

impl<T: Clone + PartialEq> Ref<T> {
    /// An empty cell, nothing has been recorded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cell holding a placeholder value that isn't certified by any goal.
    pub fn with_value(value: T) -> Self {
        Self {
            history: vec![RefEntry {
                value,
                view: GoalSet::new(),
            }],
            resolver: None,
        }
    }

    /// A cell whose value is filled in by `resolver`.
    pub fn resolved_by(resolver: GoalId) -> Self {
        Self {
            history: Vec::new(),
            resolver: Some(resolver),
        }
    }

    /// The newest value valid for every goal in `view`.
    pub fn lookup(&self, view: &GoalSet) -> Option<&T> {
        self.history
            .iter()
            .rev()
            .find(|entry| entry.view.is_superset(view))
            .map(|entry| &entry.value)
    }

    /// The newest value, whatever it's valid for.
    pub fn latest(&self) -> Option<&T> {
        self.history.last().map(|entry| &entry.value)
    }

    /// Records `value` as valid for `view`. If an identical value was already recorded,
    /// its entry is replaced by one valid for both views.
    pub fn update(&mut self, value: T, view: GoalSet) {
        let existing = self.history.iter().rposition(|entry| entry.value == value);

        let view = match existing {
            Some(pos) => {
                let old = self.history.remove(pos);
                old.view.union(&view)
            },
            None => view,
        };

        self.history.push(RefEntry { value, view });
    }

    /// Records `value` as the result of running `goal`.
    pub fn update_by(&mut self, value: T, goal: GoalId) {
        self.update(value, GoalSet::of(goal));
    }

    /// Whether any value has ever been recorded.
    pub fn nonnull(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn resolver(&self) -> Option<GoalId> {
        self.resolver
    }

    pub fn set_resolver(&mut self, goal: GoalId) {
        self.resolver = Some(goal);
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Reads a cell of `job` as of `view`, attempting the cell's resolver if no recorded
/// value covers the view yet.
///
/// Never fails: if the resolver can't be reached (it failed, or it's part of a cycle that
/// is still being resolved) the newest recorded value is returned, if there is one. When
/// the resolver succeeds, the value it produced is also recorded for `view` so asking
/// again doesn't attempt anything.
pub fn force<J, T, F>(job: &mut J, view: &GoalSet, cell: F) -> Option<T>
where
    J: Job + ?Sized,
    T: Clone + PartialEq,
    F: Fn(&mut J) -> &mut Ref<T>,
{
    let r = cell(job);
    if let Some(value) = r.lookup(view) {
        return Some(value.clone());
    }

    let resolver = match r.resolver() {
        Some(resolver) => resolver,
        None => return r.latest().cloned(),
    };

    if !attempt(job, resolver) {
        trace!("resolver {} of cell not reached", job.scheduler().name(resolver));
        return cell(job).latest().cloned();
    }

    let r = cell(job);
    let resolved = match r.lookup(&GoalSet::of(resolver)) {
        Some(value) => value.clone(),
        None => match r.latest() {
            Some(value) => value.clone(),
            None => return None,
        },
    };

    r.update(resolved.clone(), view.with(resolver));
    Some(resolved)
}
