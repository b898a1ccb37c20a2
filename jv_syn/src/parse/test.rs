use crate::{
    ast::*,
    operators::*,
    parse::{type_shape_len, Matcher},
    parse_unit,
    token_tree::*,
    Flags, ParseError, TokenStream,
};
use jv_common::span::Span;

fn tokenize(src: &str) -> TokenStream {
    let tokens = TokenTree::tokenize("test", src).unwrap();
    TokenStream::new(tokens, Span::zero("test"))
}

fn parse_expr(src: &str) -> Expr<Span> {
    let mut tokens = tokenize(src);
    let expr = Expr::parse(&mut tokens).unwrap();
    tokens.finish().unwrap();
    expr
}

fn parse_stmts(src: &str) -> Vec<Stmt<Span>> {
    let mut tokens = tokenize(src);
    let mut stmts = Vec::new();
    while tokens.current().is_some() {
        Stmt::parse_into(&mut tokens, &mut stmts).unwrap();
    }
    stmts
}

fn unit_from_src(src: &str) -> Unit<Span> {
    parse_unit("test", src).unwrap()
}

#[test]
fn binary_ops_respect_precedence() {
    match parse_expr("a + b * c") {
        Expr::Binary(bin) => {
            assert_eq!(BinaryOp::Add, bin.op);
            match &bin.rhs {
                Expr::Binary(rhs) => assert_eq!(BinaryOp::Mul, rhs.op),
                other => panic!("expected multiplication on the rhs, got {}", other),
            }
        },
        other => panic!("expected binary op, got {}", other),
    }
}

#[test]
fn binary_ops_are_left_associative() {
    match parse_expr("a - b - c") {
        Expr::Binary(bin) => {
            assert!(matches!(bin.lhs, Expr::Binary(..)));
            assert!(matches!(bin.rhs, Expr::Ambiguous(..)));
        },
        other => panic!("expected binary op, got {}", other),
    }
}

#[test]
fn assignment_is_right_associative() {
    match parse_expr("a = b = c") {
        Expr::Assign(assign) => {
            assert!(matches!(assign.value, Expr::Assign(..)));
            assert_eq!(None, assign.op);
        },
        other => panic!("expected assignment, got {}", other),
    }
}

#[test]
fn compound_assignment_records_operator() {
    match parse_expr("x += 1") {
        Expr::Assign(assign) => assert_eq!(Some(BinaryOp::Add), assign.op),
        other => panic!("expected assignment, got {}", other),
    }
}

#[test]
fn dotted_name_is_ambiguous_chain() {
    match parse_expr("a.b.c") {
        Expr::Ambiguous(amb) => {
            assert_eq!("c", amb.name.as_str());
            match &amb.prefix {
                Some(Prefix::Ambiguous(prefix)) => {
                    assert_eq!("b", prefix.name.as_str());
                    assert!(matches!(prefix.prefix, Some(Prefix::Ambiguous(..))));
                },
                other => panic!("expected ambiguous prefix, got {:?}", other),
            }
        },
        other => panic!("expected ambiguous name, got {}", other),
    }
}

#[test]
fn qualified_call_has_ambiguous_target() {
    match parse_expr("System.out.println(1, x)") {
        Expr::Call(call) => {
            assert_eq!("println", call.name.as_str());
            assert_eq!(2, call.args.len());
            assert_eq!("System.out", call.target.as_ref().unwrap().to_string());
        },
        other => panic!("expected call, got {}", other),
    }
}

#[test]
fn unqualified_call_has_no_target() {
    match parse_expr("f()") {
        Expr::Call(call) => assert!(call.target.is_none()),
        other => panic!("expected call, got {}", other),
    }
}

#[test]
fn call_on_expression_result() {
    match parse_expr("this.f().g") {
        Expr::Field(field) => {
            assert_eq!("g", field.name.as_str());
            match &field.target {
                Prefix::Expr(target) => assert!(matches!(target.expr, Expr::Call(..))),
                other => panic!("expected expression target, got {}", other),
            }
        },
        other => panic!("expected field access, got {}", other),
    }
}

#[test]
fn primitive_cast_is_parsed_as_cast() {
    match parse_expr("(int) -x") {
        Expr::Cast(cast) => {
            assert_eq!("int", cast.ty.to_string());
            assert!(matches!(cast.expr, Expr::Unary(..)));
        },
        other => panic!("expected cast, got {}", other),
    }
}

#[test]
fn reference_cast_is_parsed_as_cast() {
    match parse_expr("(java.lang.String[]) o") {
        Expr::Cast(cast) => assert_eq!("java.lang.String[]", cast.ty.to_string()),
        other => panic!("expected cast, got {}", other),
    }
}

#[test]
fn parenthesized_name_minus_is_subtraction() {
    assert!(matches!(parse_expr("(a) - b"), Expr::Binary(..)));
}

#[test]
fn new_array_counts_dimensions() {
    match parse_expr("new int[3][]") {
        Expr::NewArray(new_array) => {
            assert_eq!(1, new_array.dims.len());
            assert_eq!(1, new_array.extra_dims);
        },
        other => panic!("expected array creation, got {}", other),
    }
}

#[test]
fn conditional_and_instanceof() {
    match parse_expr("o instanceof String ? 1 : 2") {
        Expr::Conditional(cond) => assert!(matches!(cond.cond, Expr::InstanceOf(..))),
        other => panic!("expected conditional, got {}", other),
    }
}

#[test]
fn min_int_literal_is_allowed_when_negated() {
    match parse_expr("-2147483648") {
        Expr::Literal(lit) => assert_eq!(LiteralValue::Int(i32::MIN), lit.value),
        other => panic!("expected literal, got {}", other),
    }
}

#[test]
fn int_literal_out_of_range_is_an_error() {
    let mut tokens = tokenize("2147483648");
    let err = Expr::<Span>::parse(&mut tokens).unwrap_err();
    assert!(matches!(err.err, ParseError::IntegerTooLarge(..)));
}

#[test]
fn hex_literal_uses_unsigned_range() {
    match parse_expr("0xFFFFFFFF") {
        Expr::Literal(lit) => assert_eq!(LiteralValue::Int(-1), lit.value),
        other => panic!("expected literal, got {}", other),
    }
}

#[test]
fn multiple_declarators_split_into_decls() {
    let stmts = parse_stmts("int a = 1, b[], c;");
    assert_eq!(3, stmts.len());
    match &stmts[1] {
        Stmt::LocalDecl(decl) => {
            assert_eq!("b", decl.name.as_str());
            assert_eq!("int[]", decl.ty.to_string());
        },
        other => panic!("expected local decl, got {}", other),
    }
}

#[test]
fn qualified_type_decl_is_not_expression() {
    let stmts = parse_stmts("java.util.List x; a.b = c;");
    assert!(matches!(stmts[0], Stmt::LocalDecl(..)));
    assert!(matches!(stmts[1], Stmt::Expr(..)));
}

#[test]
fn non_statement_expression_is_rejected() {
    let mut tokens = tokenize("a + b;");
    let mut stmts: Vec<Stmt<Span>> = Vec::new();
    let err = Stmt::parse_into(&mut tokens, &mut stmts).unwrap_err();
    assert!(matches!(err.err, ParseError::InvalidStatement { .. }));
}

#[test]
fn for_loop_with_decl_header() {
    let stmts = parse_stmts("for (int i = 0, j = 1; i < 10; i++, j--) { }");
    match &stmts[0] {
        Stmt::For(for_stmt) => {
            assert_eq!(2, for_stmt.init.len());
            assert!(for_stmt.cond.is_some());
            assert_eq!(2, for_stmt.update.len());
        },
        other => panic!("expected for loop, got {}", other),
    }
}

#[test]
fn labeled_loop_and_jumps() {
    let stmts = parse_stmts("outer: while (true) { break outer; continue; }");
    match &stmts[0] {
        Stmt::Labeled(labeled) => {
            assert_eq!("outer", labeled.label.as_str());
            assert!(labeled.stmt.is_loop());
        },
        other => panic!("expected labeled statement, got {}", other),
    }
}

#[test]
fn dangling_else_binds_to_nearest_if() {
    let stmts = parse_stmts("if (a) if (b) x(); else y();");
    match &stmts[0] {
        Stmt::If(outer) => {
            assert!(outer.else_branch.is_none());
            match &outer.then_branch {
                Stmt::If(inner) => assert!(inner.else_branch.is_some()),
                other => panic!("expected nested if, got {}", other),
            }
        },
        other => panic!("expected if, got {}", other),
    }
}

#[test]
fn parses_unit_header_and_classes() {
    let unit = unit_from_src(
        r"
        package p.q;
        import java.util.List;
        import java.io.*;

        public class A extends B implements I, J {
            private int x = 1, y;
            public static void main(String[] args) throws Exception { }
            A(int x) { this.x = x; }
            static { }
            abstract int f();
            class Inner { }
        }

        interface I extends J { int f(); }
        ",
    );

    assert_eq!("p.q", unit.package.as_ref().unwrap().to_string());
    assert_eq!(2, unit.imports.len());
    assert!(!unit.imports[0].on_demand);
    assert!(unit.imports[1].on_demand);
    assert_eq!(2, unit.classes.len());

    let a = &unit.classes[0];
    assert_eq!("A", a.name.as_str());
    assert!(a.flags.is_public());
    assert_eq!("B", a.superclass.as_ref().unwrap().to_string());
    assert_eq!(2, a.interfaces.len());
    assert_eq!(7, a.members.len());

    match &a.members[2] {
        Member::Proc(main) => {
            assert_eq!(ProcKind::Method, main.kind);
            assert!(main.flags.contains(Flags::PUBLIC | Flags::STATIC));
            assert!(main.ret.as_ref().unwrap().is_void());
            assert_eq!("String[]", main.formals[0].ty.to_string());
            assert_eq!(1, main.throws.len());
        },
        other => panic!("expected method, got {}", other),
    }

    match &a.members[3] {
        Member::Proc(ctor) => {
            assert!(ctor.is_constructor());
            assert!(ctor.ret.is_none());
        },
        other => panic!("expected constructor, got {}", other),
    }

    assert!(matches!(&a.members[4], Member::Initializer(init) if init.is_static));
    assert!(matches!(&a.members[5], Member::Proc(f) if f.body.is_none()));
    assert!(matches!(&a.members[6], Member::Class(..)));

    let i = &unit.classes[1];
    assert!(i.is_interface());
    assert!(i.superclass.is_none());
    assert_eq!(1, i.interfaces.len());
}

#[test]
fn repeated_modifier_is_an_error() {
    let result = parse_unit::<Span>("test", "public public class A { }");
    assert!(result.is_err());
}

#[test]
fn explicit_constructor_calls() {
    let stmts = parse_stmts("super(1); this(2, 3);");
    assert!(matches!(&stmts[0], Stmt::CtorCall(call) if call.kind == SpecialKind::Super));
    assert!(matches!(&stmts[1], Stmt::CtorCall(call) if call.args.len() == 2));
}

#[test]
fn type_shape_covers_name_and_empty_dims() {
    let tokens = TokenTree::tokenize("test", "java.lang.String[][] x").unwrap();
    assert_eq!(Some(7), type_shape_len(&tokens));

    let tokens = TokenTree::tokenize("test", "int[3]").unwrap();
    assert_eq!(Some(1), type_shape_len(&tokens));

    let tokens = TokenTree::tokenize("test", "(a)").unwrap();
    assert_eq!(None, type_shape_len(&tokens));
}

#[test]
fn peeking_does_not_consume() {
    let mut tokens = tokenize("a.this");
    assert!(tokens.peek_is(1, Separator::Dot));
    assert!(tokens.peek_sequence(&[Matcher::AnyIdent, Matcher::Separator(Separator::Dot)]));
    assert!(!tokens.peek_sequence(&[Matcher::AnyIdent, Matcher::AnyIdent]));
    assert_eq!(Some(1), tokens.peek_type_len());

    assert!(tokens.match_one_maybe(Separator::Dot).is_none());
    assert!(tokens.match_one_maybe(Matcher::AnyIdent).is_some());
    assert!(tokens.peek_is(0, Separator::Dot));
}

#[test]
fn qualified_this_expression() {
    match parse_expr("Outer.this") {
        Expr::Special(special) => {
            assert_eq!(SpecialKind::This, special.kind);
            assert_eq!("Outer", special.qualifier.as_ref().unwrap().to_string());
        },
        other => panic!("expected qualified this, got {}", other),
    }
}
