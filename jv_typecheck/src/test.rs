use crate::{
    annotation::{DeclRef, Typed},
    classpath::BuiltinClasspath,
    job::{compile, CheckedProgram},
    ty::{ConstValue, Type},
};
use jv_common::{BuildOptions, ErrorQueue};
use jv_syn::{parse_unit, Block, ClassDecl, Expr, FieldDecl, Member, Stmt};
use std::rc::Rc;

pub fn try_check_srcs<'a, Srcs>(srcs: Srcs) -> Result<CheckedProgram, ErrorQueue>
where
    Srcs: IntoIterator<Item = (&'a str, &'a str)>,
{
    let units = srcs
        .into_iter()
        .map(|(file, src)| parse_unit(file, src).unwrap())
        .collect();

    compile(units, BuiltinClasspath::new(), BuildOptions::default())
}

pub fn try_check_src(src: &str) -> Result<CheckedProgram, ErrorQueue> {
    try_check_srcs(vec![("Test.java", src)])
}

pub fn check_src(src: &str) -> CheckedProgram {
    match try_check_src(src) {
        Ok(program) => program,
        Err(errors) => panic!("expected source to check, got errors:\n{}", errors),
    }
}

/// Messages of the errors checking `src` reports. It must report at least one.
fn errors_of(src: &str) -> Vec<String> {
    match try_check_src(src) {
        Ok(..) => panic!("expected errors checking source"),
        Err(errors) => errors.into_iter().map(|err| err.message).collect(),
    }
}

fn assert_error(src: &str, expected: &str) {
    let errors = errors_of(src);
    assert!(
        errors.iter().any(|err| err.contains(expected)),
        "expected an error containing `{}`, got: {:#?}",
        expected,
        errors
    );
}

fn class_decl(program: &CheckedProgram, name: &str) -> Rc<ClassDecl<Typed>> {
    program
        .units
        .iter()
        .flat_map(|unit| unit.classes.iter())
        .find(|class| class.name.as_str() == name)
        .cloned()
        .unwrap_or_else(|| panic!("no class named {}", name))
}

fn field_decl(class: &ClassDecl<Typed>, name: &str) -> Rc<FieldDecl<Typed>> {
    class
        .members
        .iter()
        .find_map(|member| match member {
            Member::Field(field) if field.name.as_str() == name => Some(field.clone()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no field named {}", name))
}

fn method_body(class: &ClassDecl<Typed>, name: &str) -> Rc<Block<Typed>> {
    class
        .members
        .iter()
        .find_map(|member| match member {
            Member::Proc(proc) if proc.name.as_str() == name => proc.body.clone(),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no method named {}", name))
}

fn field_init(program: &CheckedProgram, class: &str, field: &str) -> Expr<Typed> {
    let class = class_decl(program, class);
    let field = field_decl(&class, field);
    field.init.clone().unwrap()
}

fn return_value(body: &Block<Typed>) -> Expr<Typed> {
    body.stmts
        .iter()
        .find_map(|stmt| match stmt {
            Stmt::Return(ret) => ret.value.clone(),
            _ => None,
        })
        .unwrap()
}

#[test]
fn field_init_can_call_later_method() {
    let program = check_src("class A { int x = f(); int f() { return 1; } }");

    let init = field_init(&program, "A", "x");
    assert_eq!(Type::INT, init.annotation().ty);
    assert!(matches!(init.annotation().decl, Some(DeclRef::Proc(..))));
}

#[test]
fn mutually_extending_classes_are_cyclic() {
    assert_error("class A extends B {} class B extends A {}", "cyclic inheritance");
}

#[test]
fn self_extending_class_is_cyclic() {
    assert_error("class A extends A {}", "cyclic inheritance");
}

#[test]
fn qualified_name_prefers_class_over_package() {
    let program = try_check_srcs(vec![
        ("p/A.java", "package p; public class A { public static int v = 1; }"),
        ("B.java", "class B { p.A a; int y = p.A.v; }"),
    ])
    .unwrap();

    let class = class_decl(&program, "B");
    let a = field_decl(&class, "a");
    assert_eq!("p.A", a.ty.annotation().ty.to_string());

    let y = field_init(&program, "B", "y");
    assert_eq!(Type::INT, y.annotation().ty);
    assert!(matches!(y.annotation().decl, Some(DeclRef::Field(..))));
}

#[test]
fn overload_picks_most_specific() {
    let program = check_src(
        "class A {
            int m(Object o) { return 1; }
            long m(String s) { return 2; }
            long a = m(\"s\");
            long b = m(null);
            int c = m(new Object());
        }",
    );

    assert_eq!(Type::LONG, field_init(&program, "A", "a").annotation().ty);
    assert_eq!(Type::LONG, field_init(&program, "A", "b").annotation().ty);
    assert_eq!(Type::INT, field_init(&program, "A", "c").annotation().ty);
}

#[test]
fn ambiguous_overload_is_an_error() {
    assert_error(
        "class A {
            void m(Object a, String b) {}
            void m(String a, Object b) {}
            void f() { m(\"a\", \"b\"); }
        }",
        "is ambiguous",
    );
}

#[test]
fn constants_fold_across_forward_references() {
    let program = check_src(
        "class A {
            static final int X = Y * 2;
            static final int Y = B.Z + 1;
            static final String S = \"x\" + X;
        }
        class B { static final int Z = 2; }",
    );

    let x = field_init(&program, "A", "X");
    assert_eq!(Some(ConstValue::Int(6)), x.annotation().constant);

    let s = field_init(&program, "A", "S");
    assert_eq!(Some(ConstValue::String("x6".into())), s.annotation().constant);
}

#[test]
fn non_final_field_is_not_constant() {
    let program = check_src("class A { static int X = 1; static final int Y = X + 1; }");

    let y = field_init(&program, "A", "Y");
    assert_eq!(None, y.annotation().constant);
}

#[test]
fn constant_narrows_to_byte() {
    check_src("class A { byte b = 10; final int i = 20; byte c = i; char ch = 'a' + 1; }");
    assert_error("class A { byte b = 1000; }", "type mismatch");
}

#[test]
fn locals_are_visible_after_declaration() {
    let program = check_src(
        "class A {
            long f(int n) {
                int a = n + 1;
                long b = a * 2L;
                return b;
            }
        }",
    );

    let class = class_decl(&program, "A");
    let ret = return_value(&method_body(&class, "f"));
    assert_eq!(Type::LONG, ret.annotation().ty);
    assert!(matches!(ret.annotation().decl, Some(DeclRef::Local(..))));
}

#[test]
fn local_cannot_be_redeclared() {
    assert_error("class A { void f() { int a = 1; { int a = 2; } } }", "already declared");
}

#[test]
fn unknown_name_is_reported() {
    assert_error("class A { int x = y; }", "`y` was not found");
}

#[test]
fn every_failing_member_is_reported() {
    let errors = errors_of("class A { int x = \"a\"; int y = true; void f() { return 1; } }");
    assert_eq!(3, errors.len(), "{:#?}", errors);
}

#[test]
fn instance_field_in_static_method() {
    assert_error("class A { int x; static int f() { return x; } }", "static context");
    assert_error("class A { static void f() { this.toString(); } }", "static context");
}

#[test]
fn outer_fields_visible_in_member_class() {
    let program = check_src(
        "class O {
            int v;
            class I {
                int g() { return v + O.this.v; }
            }
        }",
    );
    assert_eq!(1, program.units.len());
}

#[test]
fn member_class_names_resolve() {
    check_src(
        "class O {
            static class I { static int x = 1; }
            int a = I.x;
            O.I b = new O.I();
        }",
    );
}

#[test]
fn conditions_must_be_boolean() {
    assert_error("class A { void f() { if (1) {} } }", "type mismatch");
    assert_error("class A { void f() { while (\"s\") {} } }", "type mismatch");
}

#[test]
fn conditional_expression_type() {
    let program = check_src("class A { long x = true ? 1 : 2L; Object o = false ? \"a\" : new Object(); }");
    assert_eq!(Type::LONG, field_init(&program, "A", "x").annotation().ty);
}

#[test]
fn checked_exceptions_must_be_declared() {
    assert_error(
        "class A { void f() { throw new Exception(); } }",
        "must be caught or declared to be thrown",
    );

    check_src("class A { void f() throws Exception { throw new Exception(); } }");
    check_src("class A { void f() { throw new RuntimeException(\"x\"); } }");
}

#[test]
fn called_method_exceptions_must_be_declared() {
    assert_error(
        "class A { void g() throws java.io.IOException {} void f() { g(); } }",
        "must be caught or declared to be thrown",
    );
}

#[test]
fn array_clone_is_public_and_throws_nothing() {
    check_src("class A { Object f(int[] a) { return a.clone(); } }");
    check_src("class B { } class A { Object f(B[][] a) { return a.clone(); } }");

    assert_error(
        "class A { Object f(A a) { return a.clone(); } }",
        "must be caught or declared to be thrown",
    );
}

#[test]
fn jumps_need_targets() {
    assert_error("class A { void f() { break; } }", "outside of a loop");
    assert_error("class A { void f() { while (true) { continue missing; } } }", "does not refer to");

    check_src(
        "class A {
            void f() {
                outer: while (true) {
                    for (int i = 0; i < 10; i++) {
                        if (i == 5) continue outer;
                        break outer;
                    }
                }
            }
        }",
    );
}

#[test]
fn return_types_are_checked() {
    assert_error("class A { int f() { return \"s\"; } }", "cannot return");
    assert_error("class A { void f() { return 1; } }", "void method");
    assert_error("class A { int f() { return; } }", "missing return value");
}

#[test]
fn final_variables_cannot_be_assigned() {
    assert_error("class A { void f() { final int a = 1; a = 2; } }", "final variable `a`");
    assert_error("class A { final int x = 1; void f() { x++; } }", "final variable `x`");

    // blank finals are assigned by constructors
    check_src("class A { final int x; A() { x = 1; } }");
}

#[test]
fn assignment_target_must_be_variable() {
    assert_error("class A { void f() { 1 = 2; } }", "not a variable");
}

#[test]
fn operators_check_operands() {
    assert_error("class A { boolean b = !1; }", "operator `!`");
    assert_error("class A { int x = true + 1; }", "cannot be applied");
    check_src("class A { String s = \"a\" + true + 1 + 'c'; int sh = 1 << 2L; boolean b = 1 < 2.0; }");
}

#[test]
fn casts_are_checked() {
    check_src("class A { int x = (int) 3.5; Object o = \"s\"; String s = (String) o; }");
    assert_error("class A { boolean b = (boolean) 1; }", "cannot cast");
    assert_error("class A { Integer i = (Integer) \"s\"; }", "cannot cast");
}

#[test]
fn arrays() {
    let program = check_src(
        "class A {
            int[] a = new int[3];
            int n = a.length;
            int first = a[0];
            String[][] s = new String[2][];
        }",
    );
    assert_eq!(Type::INT, field_init(&program, "A", "n").annotation().ty);
    assert_eq!(Type::INT, field_init(&program, "A", "first").annotation().ty);

    assert_error("class A { int[] a = new int[3]; int x = a[\"s\"]; }", "type mismatch");
}

#[test]
fn abstract_methods_must_be_implemented() {
    assert_error(
        "abstract class S { abstract void f(); } class C extends S {}",
        "does not implement abstract method",
    );
    assert_error("interface I { void run(); } class C implements I {}", "does not implement abstract method");

    check_src("abstract class S { abstract void f(); } class C extends S { void f() {} }");
}

#[test]
fn abstract_class_cannot_be_instantiated() {
    assert_error("abstract class S {} class C { Object o = new S(); }", "cannot be instantiated");
}

#[test]
fn overrides_are_checked() {
    assert_error(
        "class S { public void f() {} } class C extends S { void f() {} }",
        "weaker access",
    );
    assert_error("class S { int f() { return 1; } } class C extends S { long f() { return 1; } }", "return type");
    assert_error("class S { final void f() {} } class C extends S { void f() {} }", "final");
}

#[test]
fn default_constructor_needs_super_constructor() {
    assert_error("class S { S(int x) {} } class C extends S {}", "no accessible constructor");
    check_src("class S { S(int x) {} } class C extends S { C() { super(1); } }");
}

#[test]
fn invalid_supertypes() {
    assert_error("class C extends String {}", "cannot extend final class");
    assert_error("interface I {} class C extends I {}", "cannot extend interface");
    assert_error("class S {} class C implements S {}", "not an interface");
}

#[test]
fn duplicate_members() {
    assert_error("class A { int x; int x; }", "already declared");
    assert_error("class A { void f(int a) {} void f(int b) {} }", "already declared");
    check_src("class A { void f(int a) {} void f(long b) {} }");
}

#[test]
fn modifiers_are_checked() {
    assert_error("abstract final class A {}", "illegal modifiers");
    assert_error("class A { void f(); }", "must have a body");
    assert_error("class A { abstract void f(); }", "non-abstract class");
}

#[test]
fn imports_resolve() {
    check_src("import java.io.IOException; class A { void f() throws IOException {} }");
    check_src("import java.io.*; class A { void f() throws IOException {} }");
    assert_error("import java.io.Missing; class A {}", "not found");
}

#[test]
fn library_calls() {
    let program = check_src(
        "class A {
            void f() {
                System.out.println(\"hello\");
                int n = \"abc\".length() + Math.max(1, 2);
                String s = String.valueOf(n);
            }
            int m = Integer.MAX_VALUE;
        }",
    );

    let m = field_init(&program, "A", "m");
    assert_eq!(Some(ConstValue::Int(i32::MAX)), m.annotation().constant);
}

#[test]
fn checked_tree_has_no_default_ctor() {
    let program = check_src("class A { int x; }");
    let class = class_decl(&program, "A");
    assert_eq!(1, class.members.len());
    assert!(matches!(class.annotation.decl, Some(DeclRef::Class(..))));
}
