//! Goal bodies. The class-level passes fill in one field of a definition each, the code
//! passes rewrite a member's tree and record the result in its code cell.

pub mod conformance;
pub mod constant;
pub mod decl;
pub mod disambiguate;
pub mod hierarchy;
pub mod signature;
pub mod supertypes;
pub mod typecheck;

use crate::{
    annotation::Typed,
    context::Context,
    def::CodeId,
    goal::{GoalId, GoalKind, GoalRun, GoalTarget},
    job::Compiler,
    result::TypeError,
};
use jv_syn::{Member, Stmt};
use std::{cell::RefCell, rc::Rc};
use tracing::debug;

/// Errors a rewriter ran into, and whether it gave up on something that may become
/// available later. Shared by every clone of the rewriter.
#[derive(Debug, Default)]
pub(crate) struct PassLog {
    errors: Vec<TypeError>,
    deferred: bool,
}

pub(crate) type SharedLog = Rc<RefCell<PassLog>>;

impl PassLog {
    pub fn shared() -> SharedLog {
        Rc::new(RefCell::new(PassLog::default()))
    }
}

pub(crate) fn log_error(log: &SharedLog, err: impl Into<TypeError>) {
    log.borrow_mut().errors.push(err.into());
}

pub(crate) fn log_deferred(log: &SharedLog) {
    log.borrow_mut().deferred = true;
}

/// Decides how a code goal ends from what its rewriter logged, recording the rewritten
/// member if it succeeded. Errors found during an attempt that has to be retried are
/// dropped, the retry finds them again.
pub(crate) fn finish_code_pass(
    comp: &mut Compiler,
    goal: GoalId,
    code: CodeId,
    log: &SharedLog,
    result: Member<Typed>,
) -> GoalRun {
    let log = log.take();

    if log.deferred {
        debug!("{} deferred, dropping {} errors", comp.goal_name(goal), log.errors.len());
        return GoalRun::Deferred;
    }

    if !log.errors.is_empty() {
        for err in log.errors {
            comp.report(err);
        }
        return GoalRun::Failed;
    }

    match comp.defs.code_ref_mut(code) {
        Some(code_ref) => code_ref.update_by(result, goal),
        None => unreachable!("{:?} has no code", code),
    }
    GoalRun::Success
}

/// Whether the hierarchy of every class enclosing `ctx` has been settled. Until it has,
/// a name that isn't found may still turn out to be an inherited member class.
pub(crate) fn hierarchies_settled(comp: &mut Compiler, ctx: &Context) -> bool {
    let classes: Vec<_> = ctx.classes().collect();
    classes
        .into_iter()
        .all(|class| comp.is_terminal(GoalKind::Hierarchy, GoalTarget::Class(class)))
}

/// The context the children of `stmt` are visited in: loops are targets for unlabeled
/// `break` and `continue`, labeled statements for labeled ones.
pub(crate) fn stmt_context(ctx: &Context, stmt: &Stmt<Typed>) -> Context {
    match stmt {
        Stmt::Block(..) => ctx.push_block(),

        Stmt::While(..) | Stmt::Do(..) | Stmt::For(..) => ctx
            .push_block()
            .push_break_label(None)
            .push_continue_label(None),

        Stmt::Labeled(labeled) => {
            let label = labeled.label.name.clone();
            let ctx = ctx.push_break_label(Some(label.clone()));
            if labeled.stmt.is_loop() {
                ctx.push_continue_label(Some(label))
            } else {
                ctx
            }
        },

        _ => ctx.clone(),
    }
}
