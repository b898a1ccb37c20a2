use super::*;
use crate::goal::{GoalKey, GoalKind, GoalRun, GoalTarget, Scheduler};

struct CellJob {
    scheduler: Scheduler,
    cell: Ref<i32>,
    runs: usize,

    // value the resolver records, or None to fail
    produce: Option<i32>,

    // read the cell again from inside the resolver
    reenter: bool,
    reentrant_reads: Vec<Option<i32>>,
}

impl CellJob {
    fn new(produce: Option<i32>) -> (Self, GoalId) {
        let mut scheduler = Scheduler::new();
        let goal = scheduler.intern(GoalKey::new(GoalKind::FieldConstant, GoalTarget::Unit(0)), || "x".to_string());

        let job = Self {
            scheduler,
            cell: Ref::resolved_by(goal),
            runs: 0,
            produce,
            reenter: false,
            reentrant_reads: Vec::new(),
        };
        (job, goal)
    }
}

impl Job for CellJob {
    fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    fn run(&mut self, goal: GoalId) -> GoalRun {
        self.runs += 1;

        if self.reenter {
            let inner = force(self, &GoalSet::of(goal), |job| &mut job.cell);
            self.reentrant_reads.push(inner);
        }

        match self.produce {
            Some(value) => {
                self.cell.update_by(value, goal);
                GoalRun::Success
            },
            None => GoalRun::Failed,
        }
    }
}

fn goal(scheduler: &mut Scheduler, n: usize) -> GoalId {
    scheduler.intern(GoalKey::new(GoalKind::Signature, GoalTarget::Unit(n)), || n.to_string())
}

#[test]
fn empty_ref_has_no_value() {
    let r: Ref<i32> = Ref::new();
    assert!(!r.nonnull());
    assert_eq!(None, r.latest());
    assert_eq!(None, r.lookup(&GoalSet::new()));
}

#[test]
fn placeholder_only_satisfies_empty_view() {
    let mut scheduler = Scheduler::new();
    let g = goal(&mut scheduler, 1);

    let r = Ref::with_value(0);
    assert!(r.nonnull());
    assert_eq!(Some(&0), r.lookup(&GoalSet::new()));
    assert_eq!(None, r.lookup(&GoalSet::of(g)));
}

#[test]
fn old_views_stay_valid_after_update() {
    let mut scheduler = Scheduler::new();
    let (g1, g2) = (goal(&mut scheduler, 1), goal(&mut scheduler, 2));

    let mut r = Ref::new();
    r.update_by(10, g1);
    assert_eq!(Some(&10), r.lookup(&GoalSet::of(g1)));

    r.update_by(20, g2);
    assert_eq!(Some(&10), r.lookup(&GoalSet::of(g1)));
    assert_eq!(Some(&20), r.lookup(&GoalSet::of(g2)));
    assert_eq!(Some(&20), r.latest());
    assert_eq!(None, r.lookup(&[g1, g2].iter().copied().collect()));
}

#[test]
fn identical_values_coalesce() {
    let mut scheduler = Scheduler::new();
    let (g1, g2) = (goal(&mut scheduler, 1), goal(&mut scheduler, 2));

    let mut r = Ref::new();
    r.update_by(5, g1);
    r.update_by(5, g2);
    r.update_by(5, g1);

    assert_eq!(1, r.history_len());
    let both: GoalSet = [g1, g2].iter().copied().collect();
    assert_eq!(Some(&5), r.lookup(&both));
}

#[test]
fn force_runs_resolver_once() {
    let (mut job, g) = CellJob::new(Some(42));

    let first = force(&mut job, &GoalSet::of(g), |job| &mut job.cell);
    let second = force(&mut job, &GoalSet::of(g), |job| &mut job.cell);

    assert_eq!(Some(42), first);
    assert_eq!(first, second);
    assert_eq!(1, job.runs);
}

#[test]
fn force_records_value_for_requested_view() {
    let (mut job, g) = CellJob::new(Some(7));
    let other = goal(&mut job.scheduler, 9);
    let view = GoalSet::of(other);

    assert_eq!(Some(7), force(&mut job, &view, |job| &mut job.cell));
    assert_eq!(Some(&7), job.cell.lookup(&view.with(g)));

    assert_eq!(Some(7), force(&mut job, &view, |job| &mut job.cell));
    assert_eq!(1, job.runs);
}

#[test]
fn force_with_failed_resolver_returns_latest() {
    let (mut job, g) = CellJob::new(None);
    job.cell.update(-1, GoalSet::new());

    assert_eq!(Some(-1), force(&mut job, &GoalSet::of(g), |job| &mut job.cell));
    assert_eq!(Some(-1), force(&mut job, &GoalSet::of(g), |job| &mut job.cell));

    // the failed goal isn't run a second time
    assert_eq!(1, job.runs);
}

#[test]
fn reentrant_force_terminates() {
    let (mut job, g) = CellJob::new(Some(3));
    job.cell.update(0, GoalSet::new());
    job.reenter = true;

    assert_eq!(Some(3), force(&mut job, &GoalSet::of(g), |job| &mut job.cell));

    // the read from inside the resolver got the placeholder instead of recursing
    assert_eq!(vec![Some(0)], job.reentrant_reads);
    assert_eq!(1, job.runs);
}
