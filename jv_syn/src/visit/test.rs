use super::*;
use crate::parse_unit;
use jv_common::span::Span;
use std::{cell::RefCell, rc::Rc};

fn unit_from_src(src: &str) -> Rc<Unit<Span>> {
    Rc::new(parse_unit("test", src).unwrap())
}

const SRC: &str = r"
    class A {
        int x = 1 + 2;
        void f(int a) {
            int b = a * 3;
            g(b);
            if (b > 0) { return; }
        }
        class B { int y = 4; }
    }
";

#[derive(Clone)]
struct NoOp;

impl Rewriter<Span> for NoOp {
    type Env = ();
}

#[test]
fn no_op_rewrite_preserves_identity() {
    let unit = unit_from_src(SRC);
    let result = rewrite_unit(&unit, &mut NoOp, &mut ());
    assert!(Rc::ptr_eq(&unit, &result));
}

/// Replaces every int literal 3 with 30.
#[derive(Clone)]
struct ReplaceThree;

impl Rewriter<Span> for ReplaceThree {
    type Env = ();

    fn leave_expr(&mut self, _env: &mut (), _old: &Expr<Span>, new: Expr<Span>, _child: Self) -> Expr<Span> {
        match &new {
            Expr::Literal(lit) if lit.value == LiteralValue::Int(3) => {
                Expr::literal(LiteralValue::Int(30), lit.annotation.clone())
            },
            _ => new,
        }
    }
}

#[test]
fn rewrite_rebuilds_only_changed_path() {
    let unit = unit_from_src(SRC);
    let result = rewrite_unit(&unit, &mut ReplaceThree, &mut ());
    assert!(!Rc::ptr_eq(&unit, &result));

    let old_class = &unit.classes[0];
    let new_class = &result.classes[0];

    // the field initializer and the member class have no 3 in them
    assert!(old_class.members[0] == new_class.members[0]);
    assert!(old_class.members[2] == new_class.members[2]);
    assert!(old_class.members[1] != new_class.members[1]);

    let (old_body, new_body) = match (&old_class.members[1], &new_class.members[1]) {
        (Member::Proc(old), Member::Proc(new)) => (old.body.clone().unwrap(), new.body.clone().unwrap()),
        _ => panic!("expected methods"),
    };

    assert!(old_body.stmts[0] != new_body.stmts[0]);
    assert!(old_body.stmts[1] == new_body.stmts[1]);
    assert!(old_body.stmts[2] == new_body.stmts[2]);

    match &new_body.stmts[0] {
        Stmt::LocalDecl(decl) => assert_eq!("a * 30", decl.init.as_ref().unwrap().to_string()),
        other => panic!("expected local decl, got {}", other),
    }
}

/// Counts entered expressions and skips the children of binary expressions.
#[derive(Clone)]
struct SkipBinary {
    entered: Rc<RefCell<usize>>,
}

impl Rewriter<Span> for SkipBinary {
    type Env = ();

    fn override_expr(&mut self, _env: &mut (), expr: &Expr<Span>) -> Option<Expr<Span>> {
        match expr {
            Expr::Binary(..) => Some(expr.clone()),
            _ => None,
        }
    }

    fn enter_expr(&mut self, _env: &mut (), _expr: &Expr<Span>) -> Self {
        *self.entered.borrow_mut() += 1;
        self.clone()
    }
}

#[test]
fn override_short_circuits_children() {
    let unit = unit_from_src("class A { void f() { g(1 + 2, 3); } }");
    let entered = Rc::new(RefCell::new(0));
    let mut rewriter = SkipBinary { entered: entered.clone() };

    let result = rewrite_unit(&unit, &mut rewriter, &mut ());
    assert!(Rc::ptr_eq(&unit, &result));

    // the call and the literal 3, but nothing inside `1 + 2`
    assert_eq!(2, *entered.borrow());
}

/// Records which names are in scope when each local reference-like name is entered.
#[derive(Clone)]
struct ScopeTracker {
    scope: Vec<String>,
    seen: Rc<RefCell<Vec<(String, Vec<String>)>>>,
}

impl Rewriter<Span> for ScopeTracker {
    type Env = ();

    fn enter_expr(&mut self, _env: &mut (), expr: &Expr<Span>) -> Self {
        if let Expr::Ambiguous(amb) = expr {
            self.seen.borrow_mut().push((amb.name.to_string(), self.scope.clone()));
        }
        self.clone()
    }

    fn add_decls(&mut self, _env: &mut (), stmt: &Stmt<Span>) {
        if let Stmt::LocalDecl(decl) = stmt {
            self.scope.push(decl.name.to_string());
        }
    }
}

#[test]
fn declarations_are_visible_to_following_statements_only() {
    let unit = unit_from_src(
        r"
        class A {
            void f() {
                int a = 1;
                int b = a;
                { int c = b; }
                int d = c;
            }
        }
        ",
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut tracker = ScopeTracker {
        scope: Vec::new(),
        seen: seen.clone(),
    };
    rewrite_unit(&unit, &mut tracker, &mut ());

    let seen = seen.borrow();
    assert_eq!(3, seen.len());
    assert_eq!(("a".to_string(), vec!["a".to_string()]), seen[0]);
    assert_eq!(("b".to_string(), vec!["a".to_string(), "b".to_string()]), seen[1]);
    // `c` was declared in the nested block and isn't visible afterwards
    assert_eq!(("c".to_string(), vec!["a".to_string(), "b".to_string()]), seen[2]);
}
