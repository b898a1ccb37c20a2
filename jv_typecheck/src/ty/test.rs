use super::*;
use crate::{classpath::BuiltinClasspath, job::Compiler};
use jv_common::BuildOptions;
use jv_syn::{BinaryOp, UnaryOp};

fn compiler() -> Compiler {
    Compiler::new(BuiltinClasspath::new(), BuildOptions::default())
}

#[test]
fn promote_narrow_types_to_int() {
    for primitive in [Primitive::Byte, Primitive::Short, Primitive::Char, Primitive::Int] {
        assert_eq!(Some(Primitive::Int), primitive.promote());
    }
    assert_eq!(Some(Primitive::Long), Primitive::Long.promote());
    assert_eq!(None, Primitive::Boolean.promote());
}

#[test]
fn promote_binary_picks_wider() {
    assert_eq!(Some(Primitive::Int), Primitive::Byte.promote_binary(Primitive::Char));
    assert_eq!(Some(Primitive::Long), Primitive::Int.promote_binary(Primitive::Long));
    assert_eq!(Some(Primitive::Float), Primitive::Long.promote_binary(Primitive::Float));
    assert_eq!(Some(Primitive::Double), Primitive::Float.promote_binary(Primitive::Double));
    assert_eq!(None, Primitive::Int.promote_binary(Primitive::Boolean));
}

#[test]
fn char_and_short_dont_widen_to_each_other() {
    assert!(!Primitive::Char.widens_to(Primitive::Short));
    assert!(!Primitive::Short.widens_to(Primitive::Char));
    assert!(Primitive::Byte.widens_to(Primitive::Short));
    assert!(!Primitive::Byte.widens_to(Primitive::Char));
}

#[test]
fn int_constant_fits_narrower_types() {
    assert!(ConstValue::Int(127).fits(Primitive::Byte));
    assert!(!ConstValue::Int(128).fits(Primitive::Byte));
    assert!(ConstValue::Int(65535).fits(Primitive::Char));
    assert!(!ConstValue::Int(-1).fits(Primitive::Char));
    assert!(!ConstValue::Long(1).fits(Primitive::Int));
}

#[test]
fn convert_truncates_like_a_cast() {
    assert_eq!(Some(ConstValue::Int(-56)), ConstValue::Int(200).convert(Primitive::Byte));
    assert_eq!(Some(ConstValue::Int(3)), ConstValue::Double(3.9).convert(Primitive::Int));
    assert_eq!(Some(ConstValue::Char('A')), ConstValue::Int(65).convert(Primitive::Char));
    assert_eq!(Some(ConstValue::Long(65)), ConstValue::Char('A').convert(Primitive::Long));
    assert_eq!(None, ConstValue::Boolean(true).convert(Primitive::Int));
}

#[test]
fn fold_int_arithmetic_wraps() {
    let max = ConstValue::Int(i32::MAX);
    let one = ConstValue::Int(1);
    let folded = fold_binary(BinaryOp::Add, &max, &one, &Type::INT, &Type::INT);
    assert_eq!(Some(ConstValue::Int(i32::MIN)), folded);
}

#[test]
fn fold_division_by_zero_is_not_constant() {
    let folded = fold_binary(BinaryOp::Div, &ConstValue::Int(1), &ConstValue::Int(0), &Type::INT, &Type::INT);
    assert_eq!(None, folded);
}

#[test]
fn fold_comparison_gives_boolean() {
    let folded = fold_binary(
        BinaryOp::Lt,
        &ConstValue::Int(1),
        &ConstValue::Long(2),
        &Type::LONG,
        &Type::BOOLEAN,
    );
    assert_eq!(Some(ConstValue::Boolean(true)), folded);
}

#[test]
fn fold_string_concat() {
    let mut comp = compiler();
    let string = comp.string_type();

    let lhs = ConstValue::String("x = ".into());
    let folded = fold_binary(BinaryOp::Add, &lhs, &ConstValue::Int(5), &string, &string);
    assert_eq!(Some(ConstValue::String("x = 5".into())), folded);
}

#[test]
fn fold_unary_ops() {
    assert_eq!(
        Some(ConstValue::Int(-5)),
        fold_unary(UnaryOp::Neg, &ConstValue::Int(5), &Type::INT)
    );
    assert_eq!(
        Some(ConstValue::Boolean(false)),
        fold_unary(UnaryOp::Not, &ConstValue::Boolean(true), &Type::BOOLEAN)
    );
    assert_eq!(
        Some(ConstValue::Int(-1)),
        fold_unary(UnaryOp::BitNot, &ConstValue::Int(0), &Type::INT)
    );
    assert_eq!(None, fold_unary(UnaryOp::PreIncrement, &ConstValue::Int(0), &Type::INT));
}

#[test]
fn assignable_constant_narrowing() {
    let mut comp = compiler();

    assert!(comp.is_assignable(&Type::INT, Some(&ConstValue::Int(10)), &Type::BYTE));
    assert!(!comp.is_assignable(&Type::INT, Some(&ConstValue::Int(1000)), &Type::BYTE));
    assert!(!comp.is_assignable(&Type::INT, None, &Type::BYTE));
    assert!(!comp.is_assignable(&Type::LONG, Some(&ConstValue::Long(1)), &Type::INT));
}

#[test]
fn binary_class_subtypes() {
    let mut comp = compiler();
    let object = comp.object_type();
    let string = comp.string_type();
    let exception = comp.type_from_name("java.lang.RuntimeException");
    let throwable = comp.type_from_name("java.lang.Throwable");
    let comparable = comp.type_from_name("java.lang.Comparable");

    assert!(comp.is_subtype(&string, &object));
    assert!(comp.is_subtype(&string, &comparable));
    assert!(comp.is_subtype(&exception, &throwable));
    assert!(!comp.is_subtype(&throwable, &exception));
    assert!(comp.is_subtype(&Type::Null, &string));
    assert!(!comp.is_subtype(&Type::Null, &Type::INT));
}

#[test]
fn array_subtypes() {
    let mut comp = compiler();
    let object = comp.object_type();
    let string = comp.string_type();
    let string_array = comp.defs.array_of(string);
    let object_array = comp.defs.array_of(object.clone());
    let int_array = comp.defs.array_of(Type::INT);
    let long_array = comp.defs.array_of(Type::LONG);

    assert!(comp.is_subtype(&string_array, &object_array));
    assert!(comp.is_subtype(&int_array, &object));
    assert!(!comp.is_subtype(&int_array, &long_array));
    assert!(!comp.is_subtype(&int_array, &object_array));
}

/// Every primitive, null, a few library classes and interfaces, a three-class chain
/// declared in source, and arrays of some of those.
fn representative_types(comp: &mut Compiler) -> Vec<Type> {
    let unit = jv_syn::parse_unit("Chain.java", "class Base { } class Mid extends Base { } class Leaf extends Mid { }")
        .unwrap();
    comp.add_unit(unit);

    let mut types = vec![Type::Null];
    for primitive in [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Char,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::Void,
    ] {
        types.push(Type::Primitive(primitive));
    }

    for name in [
        "java.lang.Object",
        "java.lang.String",
        "java.lang.Cloneable",
        "java.io.Serializable",
        "java.lang.Exception",
        "java.lang.RuntimeException",
        "Base",
        "Mid",
        "Leaf",
        "int[]",
        "long[]",
        "int[][]",
        "java.lang.Object[]",
        "java.lang.Object[][]",
        "java.lang.String[]",
        "Base[]",
        "Leaf[]",
        "Leaf[][]",
    ] {
        let ty = comp.type_from_name(name);
        assert!(!ty.is_unknown(), "`{}` should resolve", name);
        types.push(ty);
    }

    types
}

#[test]
fn subtype_is_reflexive() {
    let mut comp = compiler();
    for ty in representative_types(&mut comp) {
        assert!(comp.is_subtype(&ty, &ty), "{} should be a subtype of itself", ty);
    }
}

#[test]
fn subtype_is_transitive() {
    let mut comp = compiler();
    let types = representative_types(&mut comp);

    for a in &types {
        for b in &types {
            if !comp.is_subtype(a, b) {
                continue;
            }
            for c in &types {
                if comp.is_subtype(b, c) {
                    assert!(comp.is_subtype(a, c), "{} <: {} <: {} but not {} <: {}", a, b, c, a, c);
                }
            }
        }
    }
}

#[test]
fn subtype_chain_declared_in_source() {
    let mut comp = compiler();
    representative_types(&mut comp);
    let base = comp.type_from_name("Base");
    let leaf = comp.type_from_name("Leaf");
    let leaf_array = comp.type_from_name("Leaf[][]");
    let object_array = comp.type_from_name("java.lang.Object[]");

    assert!(comp.is_subtype(&leaf, &base));
    assert!(!comp.is_subtype(&base, &leaf));
    assert!(comp.is_subtype(&leaf_array, &object_array));
}

#[test]
fn unknown_is_compatible_both_ways() {
    let mut comp = compiler();
    let string = comp.string_type();

    // an unresolved type never adds a second error, so it sits outside the ordering
    assert!(comp.is_subtype(&Type::Unknown, &Type::LONG));
    assert!(comp.is_subtype(&Type::INT, &Type::Unknown));
    assert!(comp.is_subtype(&string, &Type::Unknown));
    assert!(!comp.is_subtype(&Type::INT, &Type::LONG));
}

#[test]
fn castable_references() {
    let mut comp = compiler();
    let object = comp.object_type();
    let string = comp.string_type();
    let integer = comp.type_from_name("java.lang.Integer");
    let runnable = comp.type_from_name("java.lang.Runnable");

    assert!(comp.is_castable(&object, &string));
    assert!(!comp.is_castable(&string, &integer));

    // String is final and doesn't implement Runnable
    assert!(!comp.is_castable(&string, &runnable));
    assert!(comp.is_castable(&runnable, &object));

    assert!(comp.is_castable(&Type::DOUBLE, &Type::CHAR));
    assert!(!comp.is_castable(&Type::BOOLEAN, &Type::INT));
}

#[test]
fn least_common_ancestor_of_classes() {
    let mut comp = compiler();
    let string = comp.string_type();
    let integer = comp.type_from_name("java.lang.Integer");
    let exception = comp.type_from_name("java.lang.Exception");
    let runtime_exception = comp.type_from_name("java.lang.RuntimeException");
    let object = comp.object_type();

    assert_eq!(Some(exception.clone()), comp.least_common_ancestor(&runtime_exception, &exception));
    assert_eq!(Some(string.clone()), comp.least_common_ancestor(&Type::Null, &string));
    assert_eq!(Some(Type::LONG), comp.least_common_ancestor(&Type::INT, &Type::LONG));
    assert_eq!(None, comp.least_common_ancestor(&Type::INT, &string));

    // interfaces they share aren't considered, only the superclass chain
    assert_eq!(Some(object), comp.least_common_ancestor(&string, &integer));
}

#[test]
fn least_common_ancestor_of_arrays() {
    let mut comp = compiler();
    let object = comp.object_type();
    let string = comp.string_type();
    let integer = comp.type_from_name("java.lang.Integer");

    let string_array = comp.defs.array_of(string);
    let integer_array = comp.defs.array_of(integer);
    let object_array = comp.defs.array_of(object.clone());
    assert_eq!(Some(object_array), comp.least_common_ancestor(&string_array, &integer_array));

    let int_array = comp.defs.array_of(Type::INT);
    let long_array = comp.defs.array_of(Type::LONG);
    assert_eq!(Some(object), comp.least_common_ancestor(&int_array, &long_array));
}

#[test]
fn type_display() {
    let mut comp = compiler();
    let string = comp.string_type();
    let array = comp.defs.array_dims(string, 2);

    assert_eq!("java.lang.String[][]", array.to_string());
    assert_eq!("int", Type::INT.to_string());
    assert_eq!("<unknown>", Type::Unknown.to_string());
}
