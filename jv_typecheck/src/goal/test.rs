use super::*;
use std::collections::HashMap;

#[derive(Default)]
struct TestJob {
    scheduler: Scheduler,
    runs: Vec<GoalId>,
    results: HashMap<GoalId, GoalRun>,

    // goals attempted from inside the body of another goal
    attempts_during_run: HashMap<GoalId, Vec<GoalId>>,
    nested_results: Vec<(GoalId, bool)>,
}

impl TestJob {
    fn goal(&mut self, n: usize) -> GoalId {
        self.scheduler
            .intern(GoalKey::new(GoalKind::UnitChecked, GoalTarget::Unit(n)), || format!("Unit#{}", n))
    }
}

impl Job for TestJob {
    fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    fn run(&mut self, goal: GoalId) -> GoalRun {
        self.runs.push(goal);

        let nested = self.attempts_during_run.get(&goal).cloned().unwrap_or_default();
        for other in nested {
            let reached = attempt(self, other);
            self.nested_results.push((other, reached));
        }

        self.results.get(&goal).copied().unwrap_or(GoalRun::Success)
    }
}

#[test]
fn same_key_interns_same_goal() {
    let mut job = TestJob::default();
    let a = job.goal(1);
    let b = job.goal(1);
    let c = job.goal(2);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(2, job.scheduler.len());
}

#[test]
fn goal_name_combines_kind_and_target() {
    let mut job = TestJob::default();
    let key = GoalKey::new(GoalKind::Supertypes, GoalTarget::Unit(0));
    let goal = job.scheduler.intern(key, || "ClassDef#Foo".to_string());

    assert_eq!("Supertypes(ClassDef#Foo)", job.scheduler.name(goal));

    // the name is only computed once
    let again = job.scheduler.intern(key, || unreachable!());
    assert_eq!(goal, again);
}

#[test]
fn prereqs_run_before_goal_in_order_added() {
    let mut job = TestJob::default();
    let (a, b, c) = (job.goal(1), job.goal(2), job.goal(3));
    job.scheduler.add_prereq(a, c);
    job.scheduler.add_prereq(a, b);

    assert_eq!(vec![c, b], job.scheduler.prereqs(a));

    assert!(attempt(&mut job, a));
    assert_eq!(vec![c, b, a], job.runs);
    assert_eq!(GoalState::Success, job.scheduler.state(a));
}

#[test]
fn reached_goal_is_not_run_again() {
    let mut job = TestJob::default();
    let a = job.goal(1);

    assert!(attempt(&mut job, a));
    assert!(attempt(&mut job, a));
    assert_eq!(vec![a], job.runs);
}

#[test]
fn cycle_through_prereqs_terminates() {
    let mut job = TestJob::default();
    let (a, b) = (job.goal(1), job.goal(2));
    job.scheduler.add_prereq(a, b);
    job.scheduler.add_prereq(b, a);

    assert!(!attempt(&mut job, a));
    assert!(job.runs.is_empty());
    assert_ne!(GoalState::Success, job.scheduler.state(a));
    assert_ne!(GoalState::Success, job.scheduler.state(b));

    // neither goal failed, they're just not reachable
    assert_eq!(GoalState::New, job.scheduler.state(a));
    assert_eq!(GoalState::New, job.scheduler.state(b));
}

#[test]
fn reentrant_attempt_is_short_circuited() {
    let mut job = TestJob::default();
    let a = job.goal(1);
    job.attempts_during_run.insert(a, vec![a]);

    assert!(attempt(&mut job, a));
    assert_eq!(vec![(a, false)], job.nested_results);
    assert_eq!(vec![a], job.runs);
    assert_eq!(GoalState::Success, job.scheduler.state(a));
}

#[test]
fn reentrant_attempt_through_other_goal_terminates() {
    let mut job = TestJob::default();
    let (a, b) = (job.goal(1), job.goal(2));
    job.attempts_during_run.insert(a, vec![b]);
    job.attempts_during_run.insert(b, vec![a]);

    assert!(attempt(&mut job, a));
    assert_eq!(vec![a, b], job.runs);
    assert_eq!(vec![(a, false), (b, true)], job.nested_results);
}

#[test]
fn failed_prereq_fails_dependent_without_running_it() {
    let mut job = TestJob::default();
    let (a, b) = (job.goal(1), job.goal(2));
    job.scheduler.add_prereq(a, b);
    job.results.insert(b, GoalRun::Failed);

    assert!(!attempt(&mut job, a));
    assert_eq!(vec![b], job.runs);
    assert_eq!(GoalState::Failed, job.scheduler.state(a));
    assert_eq!(GoalState::Failed, job.scheduler.state(b));

    // failure is final
    assert!(!attempt(&mut job, a));
    assert_eq!(vec![b], job.runs);
}

#[test]
fn deferred_goal_is_retried() {
    let mut job = TestJob::default();
    let a = job.goal(1);
    job.results.insert(a, GoalRun::Deferred);

    assert!(!attempt(&mut job, a));
    assert_eq!(GoalState::New, job.scheduler.state(a));

    job.results.insert(a, GoalRun::Success);
    assert!(attempt(&mut job, a));
    assert_eq!(vec![a, a], job.runs);
}

#[test]
fn checked_prereq_rejects_cycles() {
    let mut job = TestJob::default();
    let (a, b, c) = (job.goal(1), job.goal(2), job.goal(3));

    assert_eq!(Ok(()), job.scheduler.add_prereq_checked(a, b));
    assert_eq!(Ok(()), job.scheduler.add_prereq_checked(b, c));

    let err = job.scheduler.add_prereq_checked(c, a).unwrap_err();
    assert_eq!("UnitChecked(Unit#3)", err.goal);
    assert_eq!("UnitChecked(Unit#1)", err.prereq);
    assert!(job.scheduler.add_prereq_checked(a, a).is_err());

    // rejected edges were not added
    assert!(job.scheduler.prereqs(c).is_empty());
    assert!(attempt(&mut job, a));
}

#[test]
fn current_goal_tracks_running_body() {
    struct CurrentJob {
        scheduler: Scheduler,
        seen: Vec<Option<GoalId>>,
    }

    impl Job for CurrentJob {
        fn scheduler(&self) -> &Scheduler {
            &self.scheduler
        }

        fn scheduler_mut(&mut self) -> &mut Scheduler {
            &mut self.scheduler
        }

        fn run(&mut self, _goal: GoalId) -> GoalRun {
            let current = self.scheduler.current();
            self.seen.push(current);
            GoalRun::Success
        }
    }

    let mut job = CurrentJob {
        scheduler: Scheduler::new(),
        seen: Vec::new(),
    };
    let a = job.scheduler.intern(GoalKey::new(GoalKind::Members, GoalTarget::Unit(0)), || "a".to_string());

    assert_eq!(None, job.scheduler.current());
    assert!(attempt(&mut job, a));
    assert_eq!(vec![Some(a)], job.seen);
    assert_eq!(None, job.scheduler.current());
}
