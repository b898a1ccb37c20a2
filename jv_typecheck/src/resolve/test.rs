use super::*;
use crate::classpath::{BuiltinClasspath, ExternalClass};

fn system() -> Rc<SystemResolver> {
    let classpath = BuiltinClasspath::new()
        .with_class(ExternalClass::new("p.A"))
        .with_class(ExternalClass::new("q.A"))
        .with_class(ExternalClass::new("q.B"));
    Rc::new(SystemResolver::new(classpath, true))
}

fn class_name(defs: &DefTable, named: &Named) -> Rc<str> {
    match named {
        Named::Class(id) => defs.class(*id).full_name.clone(),
        Named::Package(name) => panic!("expected a class, found package {}", name),
    }
}

#[test]
fn system_finds_binary_class_once() {
    let system = system();
    let mut defs = DefTable::new();

    let first = system.find(&mut defs, "java.lang.String").unwrap();
    let second = system.find(&mut defs, "java.lang.String").unwrap();

    assert_eq!(first, second);
    assert_eq!(1, defs.class_count());
    assert_eq!("java.lang.String", &*class_name(&defs, &first));
}

#[test]
fn system_finds_package() {
    let system = system();
    let mut defs = DefTable::new();

    let found = system.find(&mut defs, "java.lang").unwrap();
    assert_eq!(Named::Package(Rc::from("java.lang")), found);
    assert_eq!(0, defs.class_count());
}

#[test]
fn system_reports_missing_class() {
    let system = system();
    let mut defs = DefTable::new();

    let result = system.find(&mut defs, "java.lang.Missing");
    assert_eq!(Err(ResolveError::NoClass("java.lang.Missing".to_string())), result);

    // a miss is remembered but doesn't stop a later install
    let string = system.find(&mut defs, "java.lang.String").unwrap();
    system.install("java.lang.Missing", string.clone());
    assert_eq!(Ok(string), system.find(&mut defs, "java.lang.Missing"));
}

#[test]
fn install_adds_parent_packages() {
    let system = system();
    let mut defs = DefTable::new();
    let string = system.find(&mut defs, "java.lang.String").unwrap();

    system.install("a.b.c.D", string);
    assert!(system.package_exists("a.b.c"));
    assert!(system.package_exists("a.b"));
    assert!(system.package_exists("a"));
    assert!(!system.package_exists("a.b.c.D.e"));
}

#[test]
#[should_panic]
fn install_cannot_rebind() {
    let system = system();
    let mut defs = DefTable::new();
    let string = system.find(&mut defs, "java.lang.String").unwrap();
    let object = system.find(&mut defs, "java.lang.Object").unwrap();

    system.install("x.Y", string);
    system.install("x.Y", object);
}

#[test]
fn imports_prefer_single_type_import() {
    let system = system();
    let mut defs = DefTable::new();

    let mut imports = ImportTable::new(None, system.clone());
    imports.add_import("q.A");
    imports.add_on_demand("p");

    let found = imports.find(&mut defs, "A").unwrap();
    assert_eq!("q.A", &*class_name(&defs, &found));
}

#[test]
fn imports_on_demand_ambiguity() {
    let system = system();
    let mut defs = DefTable::new();

    let mut imports = ImportTable::new(None, system.clone());
    imports.add_on_demand("p");
    imports.add_on_demand("q");

    match imports.find(&mut defs, "A") {
        Err(ResolveError::Ambiguous { name, options }) => {
            assert_eq!("A", name);
            let expected: Vec<Rc<str>> = vec!["p.A".into(), "q.A".into()];
            assert_eq!(expected, options);
        },
        other => panic!("expected ambiguous name, got {:?}", other),
    }

    // only one of them has a B
    let found = imports.find(&mut defs, "B").unwrap();
    assert_eq!("q.B", &*class_name(&defs, &found));
}

#[test]
fn imports_include_java_lang() {
    let system = system();
    let mut defs = DefTable::new();

    let imports = ImportTable::new(Some(Rc::from("p")), system.clone());
    let found = imports.find(&mut defs, "Object").unwrap();
    assert_eq!("java.lang.Object", &*class_name(&defs, &found));

    // own package comes first
    let found = imports.find(&mut defs, "A").unwrap();
    assert_eq!("p.A", &*class_name(&defs, &found));
}

#[test]
fn imports_ignore_qualified_names() {
    let system = system();
    let mut defs = DefTable::new();

    let imports = ImportTable::new(None, system);
    assert!(imports.find(&mut defs, "java.lang.Object").is_err());
}

#[test]
fn unit_resolver_falls_back_to_full_names() {
    let system = system();
    let mut defs = DefTable::new();

    let imports = ImportTable::new(None, system.clone());
    let resolver = unit_resolver(imports, system, true);

    let found = resolver.find(&mut defs, "q.B").unwrap();
    assert_eq!("q.B", &*class_name(&defs, &found));

    let found = resolver.find(&mut defs, "String").unwrap();
    assert_eq!("java.lang.String", &*class_name(&defs, &found));

    assert!(resolver.find(&mut defs, "Missing").is_err());
}

#[test]
fn caching_resolver_remembers_full_name() {
    let system = system();
    let mut defs = DefTable::new();

    let imports = ImportTable::new(None, system);
    let caching = CachingResolver::new(imports, false);

    let found = caching.find(&mut defs, "Integer").unwrap();
    assert_eq!(Some(found.clone()), caching.cached("Integer"));
    assert_eq!(Some(found), caching.cached("java.lang.Integer"));
}
