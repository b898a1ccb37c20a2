//! Classes that aren't compiled from source. The classpath describes them by name only,
//! types included; they become definitions the first time something refers to them.

use crate::ty::ConstValue;
use jv_syn::Flags;
use linked_hash_map::LinkedHashMap;
use std::rc::Rc;

/// Finds top-level classes by fully-qualified name.
pub trait TopLevelResolver {
    fn find_class(&self, name: &str) -> Option<Rc<ExternalClass>>;
    fn package_exists(&self, name: &str) -> bool;
}

#[derive(Clone, Debug)]
pub struct ExternalField {
    pub name: Rc<str>,
    pub flags: Flags,
    pub ty: Rc<str>,
    pub constant: Option<ConstValue>,
}

/// A method or constructor. Types are written the way they are in source, with
/// fully-qualified class names, e.g. `java.lang.String[]`.
#[derive(Clone, Debug)]
pub struct ExternalProc {
    pub name: Rc<str>,
    pub flags: Flags,
    pub ret: Rc<str>,
    pub formals: Vec<Rc<str>>,
    pub throws: Vec<Rc<str>>,
}

#[derive(Clone, Debug)]
pub struct ExternalClass {
    pub name: Rc<str>,
    pub flags: Flags,
    pub superclass: Option<Rc<str>>,
    pub interfaces: Vec<Rc<str>>,
    pub fields: Vec<ExternalField>,
    pub methods: Vec<ExternalProc>,
    pub ctors: Vec<ExternalProc>,
}

fn names(names: &[&str]) -> Vec<Rc<str>> {
    names.iter().map(|name| Rc::from(*name)).collect()
}

impl ExternalClass {
    /// A public class extending `java.lang.Object`.
    pub fn new(name: &str) -> Self {
        let superclass = if name == "java.lang.Object" {
            None
        } else {
            Some(Rc::from("java.lang.Object"))
        };

        Self {
            name: name.into(),
            flags: Flags::PUBLIC,
            superclass,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            ctors: Vec::new(),
        }
    }

    pub fn interface(name: &str) -> Self {
        Self {
            flags: Flags::PUBLIC | Flags::INTERFACE | Flags::ABSTRACT,
            superclass: None,
            ..Self::new(name)
        }
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn field(mut self, flags: Flags, ty: &str, name: &str) -> Self {
        self.fields.push(ExternalField {
            name: name.into(),
            flags,
            ty: ty.into(),
            constant: None,
        });
        self
    }

    pub fn constant(mut self, ty: &str, name: &str, value: ConstValue) -> Self {
        self.fields.push(ExternalField {
            name: name.into(),
            flags: Flags::PUBLIC | Flags::STATIC | Flags::FINAL,
            ty: ty.into(),
            constant: Some(value),
        });
        self
    }

    pub fn method(self, flags: Flags, ret: &str, name: &str, formals: &[&str]) -> Self {
        self.method_throws(flags, ret, name, formals, &[])
    }

    pub fn method_throws(mut self, flags: Flags, ret: &str, name: &str, formals: &[&str], throws: &[&str]) -> Self {
        let flags = if self.flags.is_interface() {
            flags | Flags::PUBLIC | Flags::ABSTRACT
        } else {
            flags
        };

        self.methods.push(ExternalProc {
            name: name.into(),
            flags,
            ret: ret.into(),
            formals: names(formals),
            throws: names(throws),
        });
        self
    }

    pub fn ctor(mut self, flags: Flags, formals: &[&str]) -> Self {
        self.ctors.push(ExternalProc {
            name: self.name.clone(),
            flags,
            ret: "void".into(),
            formals: names(formals),
            throws: Vec::new(),
        });
        self
    }
}

/// The part of the standard library the checker knows about without loading anything.
#[derive(Clone, Debug)]
pub struct BuiltinClasspath {
    classes: LinkedHashMap<Rc<str>, Rc<ExternalClass>>,
}

impl BuiltinClasspath {
    pub fn new() -> Self {
        let public = Flags::PUBLIC;
        let public_static = Flags::PUBLIC | Flags::STATIC;
        let public_final = Flags::PUBLIC | Flags::FINAL;

        const OBJECT: &str = "java.lang.Object";
        const STRING: &str = "java.lang.String";

        let classes = vec![
            ExternalClass::new(OBJECT)
                .ctor(public, &[])
                .method(public, "boolean", "equals", &[OBJECT])
                .method(public, "int", "hashCode", &[])
                .method(public, STRING, "toString", &[])
                .method(public_final, "java.lang.Class", "getClass", &[])
                .method_throws(Flags::PROTECTED, OBJECT, "clone", &[], &["java.lang.CloneNotSupportedException"])
                .method_throws(Flags::PROTECTED, "void", "finalize", &[], &["java.lang.Throwable"])
                .method(public_final, "void", "notify", &[])
                .method_throws(public_final, "void", "wait", &[], &["java.lang.InterruptedException"]),
            ExternalClass::new("java.lang.Class")
                .flags(Flags::FINAL)
                .method(public, STRING, "getName", &[]),
            ExternalClass::new(STRING)
                .flags(Flags::FINAL)
                .implements("java.io.Serializable")
                .implements("java.lang.Comparable")
                .ctor(public, &[])
                .ctor(public, &[STRING])
                .ctor(public, &["char[]"])
                .method(public, "int", "length", &[])
                .method(public, "char", "charAt", &["int"])
                .method(public, "boolean", "equals", &[OBJECT])
                .method(public, "int", "compareTo", &[OBJECT])
                .method(public, STRING, "substring", &["int"])
                .method(public, STRING, "substring", &["int", "int"])
                .method(public, "int", "indexOf", &["int"])
                .method(public, "int", "indexOf", &[STRING])
                .method(public, STRING, "concat", &[STRING])
                .method(public, STRING, "trim", &[])
                .method(public, "char[]", "toCharArray", &[])
                .method(public_static, STRING, "valueOf", &[OBJECT])
                .method(public_static, STRING, "valueOf", &["int"])
                .method(public_static, STRING, "valueOf", &["long"])
                .method(public_static, STRING, "valueOf", &["char"])
                .method(public_static, STRING, "valueOf", &["double"])
                .method(public_static, STRING, "valueOf", &["boolean"]),
            ExternalClass::new("java.lang.System")
                .flags(Flags::FINAL)
                .field(public_static | Flags::FINAL, "java.io.PrintStream", "out")
                .field(public_static | Flags::FINAL, "java.io.PrintStream", "err")
                .method(public_static, "long", "currentTimeMillis", &[])
                .method(public_static, "void", "exit", &["int"])
                .method(
                    public_static,
                    "void",
                    "arraycopy",
                    &[OBJECT, "int", OBJECT, "int", "int"],
                ),
            ExternalClass::new("java.io.PrintStream")
                .method(public, "void", "println", &[])
                .method(public, "void", "println", &["boolean"])
                .method(public, "void", "println", &["char"])
                .method(public, "void", "println", &["int"])
                .method(public, "void", "println", &["long"])
                .method(public, "void", "println", &["float"])
                .method(public, "void", "println", &["double"])
                .method(public, "void", "println", &["char[]"])
                .method(public, "void", "println", &[STRING])
                .method(public, "void", "println", &[OBJECT])
                .method(public, "void", "print", &[STRING])
                .method(public, "void", "print", &[OBJECT])
                .method(public, "void", "print", &["int"])
                .method(public, "void", "print", &["char"]),
            ExternalClass::new("java.lang.Throwable")
                .implements("java.io.Serializable")
                .ctor(public, &[])
                .ctor(public, &[STRING])
                .method(public, STRING, "getMessage", &[])
                .method(public, "void", "printStackTrace", &[]),
            ExternalClass::new("java.lang.Exception")
                .extends("java.lang.Throwable")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.RuntimeException")
                .extends("java.lang.Exception")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.Error")
                .extends("java.lang.Throwable")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.CloneNotSupportedException")
                .extends("java.lang.Exception")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.InterruptedException")
                .extends("java.lang.Exception")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.io.IOException")
                .extends("java.lang.Exception")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.IllegalArgumentException")
                .extends("java.lang.RuntimeException")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.NullPointerException")
                .extends("java.lang.RuntimeException")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.ArithmeticException")
                .extends("java.lang.RuntimeException")
                .ctor(public, &[])
                .ctor(public, &[STRING]),
            ExternalClass::new("java.lang.Number")
                .flags(Flags::ABSTRACT)
                .implements("java.io.Serializable")
                .ctor(public, &[])
                .method(public | Flags::ABSTRACT, "int", "intValue", &[])
                .method(public | Flags::ABSTRACT, "long", "longValue", &[])
                .method(public | Flags::ABSTRACT, "double", "doubleValue", &[]),
            ExternalClass::new("java.lang.Integer")
                .flags(Flags::FINAL)
                .extends("java.lang.Number")
                .implements("java.lang.Comparable")
                .constant("int", "MAX_VALUE", ConstValue::Int(i32::MAX))
                .constant("int", "MIN_VALUE", ConstValue::Int(i32::MIN))
                .ctor(public, &["int"])
                .method(public, "int", "intValue", &[])
                .method(public, "long", "longValue", &[])
                .method(public, "double", "doubleValue", &[])
                .method(public, "int", "compareTo", &[OBJECT])
                .method(public_static, "int", "parseInt", &[STRING])
                .method(public_static, STRING, "toString", &["int"]),
            ExternalClass::new("java.lang.Math")
                .flags(Flags::FINAL)
                .constant("double", "PI", ConstValue::Double(std::f64::consts::PI))
                .method(public_static, "int", "abs", &["int"])
                .method(public_static, "long", "abs", &["long"])
                .method(public_static, "double", "abs", &["double"])
                .method(public_static, "int", "max", &["int", "int"])
                .method(public_static, "long", "max", &["long", "long"])
                .method(public_static, "double", "max", &["double", "double"])
                .method(public_static, "int", "min", &["int", "int"])
                .method(public_static, "double", "sqrt", &["double"]),
            ExternalClass::interface("java.lang.Cloneable"),
            ExternalClass::interface("java.io.Serializable"),
            ExternalClass::interface("java.lang.Comparable").method(Flags::NONE, "int", "compareTo", &[OBJECT]),
            ExternalClass::interface("java.lang.Runnable").method(Flags::NONE, "void", "run", &[]),
        ];

        let mut classpath = Self {
            classes: LinkedHashMap::new(),
        };
        for class in classes {
            classpath = classpath.with_class(class);
        }
        classpath
    }

    pub fn with_class(mut self, class: ExternalClass) -> Self {
        self.classes.insert(class.name.clone(), Rc::new(class));
        self
    }
}

impl Default for BuiltinClasspath {
    fn default() -> Self {
        Self::new()
    }
}

impl TopLevelResolver for BuiltinClasspath {
    fn find_class(&self, name: &str) -> Option<Rc<ExternalClass>> {
        self.classes.get(name).cloned()
    }

    fn package_exists(&self, name: &str) -> bool {
        let prefix = format!("{}.", name);
        self.classes.keys().any(|class| class.starts_with(&prefix))
    }
}
