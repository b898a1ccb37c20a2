//! Name lookup from short or qualified names to classes and packages. Each source unit
//! gets a chain of resolvers: its imports, then member classes of anything found by the
//! system resolver, which knows every source class and loads binary ones on demand.

#[cfg(test)]
mod test;

use crate::{
    classpath::TopLevelResolver,
    def::{ClassId, DefTable},
};
use linked_hash_map::LinkedHashMap;
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt,
    rc::Rc,
};
use tracing::trace;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Named {
    Class(ClassId),
    Package(Rc<str>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolveError {
    NoClass(String),
    Ambiguous { name: String, options: Vec<Rc<str>> },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolveError::NoClass(name) => write!(f, "class `{}` was not found", name),
            ResolveError::Ambiguous { name, options } => {
                write!(f, "`{}` is ambiguous, it could be any of: {}", name, options.join(", "))
            },
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

pub trait Resolver: fmt::Debug {
    /// Looks up a class or package by a simple or dotted name.
    fn find(&self, defs: &mut DefTable, name: &str) -> ResolveResult<Named>;
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn full_name(defs: &DefTable, named: &Named) -> Rc<str> {
    match named {
        Named::Class(id) => defs.class(*id).full_name.clone(),
        Named::Package(name) => name.clone(),
    }
}

/// Owns the global table of fully-qualified names. Source classes are installed up front,
/// binary classes are loaded from the classpath the first time they're asked for.
pub struct SystemResolver {
    classpath: Box<dyn TopLevelResolver>,

    cache: RefCell<HashMap<Rc<str>, Named>>,
    misses: RefCell<HashSet<Rc<str>>>,
    packages: RefCell<HashSet<Rc<str>>>,

    cache_misses: bool,
}

impl fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SystemResolver")
            .field("cache", &self.cache.borrow().len())
            .field("packages", &self.packages.borrow().len())
            .finish()
    }
}

impl SystemResolver {
    pub fn new(classpath: impl TopLevelResolver + 'static, cache_misses: bool) -> Self {
        Self {
            classpath: Box::new(classpath),
            cache: RefCell::new(HashMap::new()),
            misses: RefCell::new(HashSet::new()),
            packages: RefCell::new(HashSet::new()),
            cache_misses,
        }
    }

    /// Binds a fully-qualified name. Rebinding a name to something else is a compiler bug.
    pub fn install(&self, name: impl Into<Rc<str>>, named: Named) {
        let name = name.into();

        if let Some(existing) = self.cache.borrow().get(&name) {
            if *existing != named {
                panic!("`{}` is already bound to {:?}, cannot rebind to {:?}", name, existing, named);
            }
            return;
        }

        trace!("system resolver: {} -> {:?}", name, named);

        if let Some(dot) = name.rfind('.') {
            self.add_package(&name[..dot]);
        }

        self.misses.borrow_mut().remove(&name);
        self.cache.borrow_mut().insert(name, named);
    }

    /// Records that `name` and all of its parent packages exist.
    pub fn add_package(&self, name: &str) {
        let mut prefix = name;
        loop {
            if !self.packages.borrow_mut().insert(Rc::from(prefix)) {
                break;
            }

            match prefix.rfind('.') {
                Some(dot) => prefix = &prefix[..dot],
                None => break,
            }
        }
    }

    pub fn package_exists(&self, name: &str) -> bool {
        self.packages.borrow().contains(name) || self.classpath.package_exists(name)
    }

    /// What a name is bound to so far, without loading anything.
    pub fn installed(&self, name: &str) -> Option<Named> {
        self.cache.borrow().get(name).cloned()
    }
}

impl Resolver for SystemResolver {
    fn find(&self, defs: &mut DefTable, name: &str) -> ResolveResult<Named> {
        if let Some(named) = self.cache.borrow().get(name) {
            return Ok(named.clone());
        }

        if self.misses.borrow().contains(name) {
            return Err(ResolveError::NoClass(name.to_string()));
        }

        if let Some(external) = self.classpath.find_class(name) {
            let id = defs.add_external(external);
            self.install(name, Named::Class(id));
            return Ok(Named::Class(id));
        }

        if self.package_exists(name) {
            self.add_package(name);
            let named = Named::Package(Rc::from(name));
            self.install(name, named.clone());
            return Ok(named);
        }

        if self.cache_misses {
            self.misses.borrow_mut().insert(Rc::from(name));
        }
        Err(ResolveError::NoClass(name.to_string()))
    }
}

/// Remembers what its inner resolver found, under both the name it was asked for and the
/// full name of the result.
#[derive(Debug)]
pub struct CachingResolver {
    inner: Box<dyn Resolver>,
    cache: RefCell<HashMap<Rc<str>, Named>>,
    misses: Option<RefCell<HashSet<Rc<str>>>>,
}

impl CachingResolver {
    pub fn new(inner: impl Resolver + 'static, cache_misses: bool) -> Self {
        Self {
            inner: Box::new(inner),
            cache: RefCell::new(HashMap::new()),
            misses: if cache_misses {
                Some(RefCell::new(HashSet::new()))
            } else {
                None
            },
        }
    }

    pub fn install(&self, name: Rc<str>, named: Named) {
        let mut cache = self.cache.borrow_mut();
        match cache.get(&name) {
            Some(existing) if *existing != named => {
                panic!("`{}` is already cached as {:?}, cannot rebind to {:?}", name, existing, named)
            },
            Some(_) => {},
            None => {
                cache.insert(name, named);
            },
        }
    }

    pub fn cached(&self, name: &str) -> Option<Named> {
        self.cache.borrow().get(name).cloned()
    }
}

impl Resolver for CachingResolver {
    fn find(&self, defs: &mut DefTable, name: &str) -> ResolveResult<Named> {
        if let Some(named) = self.cached(name) {
            return Ok(named);
        }

        if let Some(misses) = &self.misses {
            if misses.borrow().contains(name) {
                return Err(ResolveError::NoClass(name.to_string()));
            }
        }

        match self.inner.find(defs, name) {
            Ok(named) => {
                let full = full_name(defs, &named);
                self.install(Rc::from(name), named.clone());
                if *full != *name {
                    self.install(full, named.clone());
                }
                Ok(named)
            },

            Err(ResolveError::NoClass(missing)) => {
                if let Some(misses) = &self.misses {
                    misses.borrow_mut().insert(Rc::from(name));
                }
                Err(ResolveError::NoClass(missing))
            },

            Err(err) => Err(err),
        }
    }
}

/// Tries `head`, then `tail` if `head` has no class of that name. Ambiguity isn't retried.
#[derive(Debug)]
pub struct CompoundResolver {
    head: Box<dyn Resolver>,
    tail: Box<dyn Resolver>,
}

impl CompoundResolver {
    pub fn new(head: impl Resolver + 'static, tail: impl Resolver + 'static) -> Self {
        Self {
            head: Box::new(head),
            tail: Box::new(tail),
        }
    }
}

impl Resolver for CompoundResolver {
    fn find(&self, defs: &mut DefTable, name: &str) -> ResolveResult<Named> {
        match self.head.find(defs, name) {
            Err(ResolveError::NoClass(_)) => self.tail.find(defs, name),
            result => result,
        }
    }
}

/// Resolves `Outer.Inner` names on top of a resolver that only knows top-level classes, by
/// resolving the prefix and then looking for a member class of the result.
#[derive(Debug)]
pub struct MemberClassResolver {
    inner: Rc<dyn Resolver>,
}

impl MemberClassResolver {
    pub fn new(inner: Rc<dyn Resolver>) -> Self {
        Self { inner }
    }
}

impl Resolver for MemberClassResolver {
    fn find(&self, defs: &mut DefTable, name: &str) -> ResolveResult<Named> {
        let err = match self.inner.find(defs, name) {
            Ok(named) => return Ok(named),
            Err(err) => err,
        };

        let (prefix, member) = match name.rfind('.') {
            Some(dot) => (&name[..dot], &name[dot + 1..]),
            None => return Err(err),
        };

        match self.find(defs, prefix)? {
            Named::Class(outer) => match defs.class(outer).member_classes.get(member) {
                Some(inner) => Ok(Named::Class(*inner)),
                None => Err(ResolveError::NoClass(name.to_string())),
            },
            Named::Package(_) => Err(err),
        }
    }
}

/// The names a source unit can use without qualification: its single-type imports, the
/// classes of its own package, and those of its on-demand imports.
#[derive(Debug)]
pub struct ImportTable {
    package: Option<Rc<str>>,
    single: LinkedHashMap<Rc<str>, Rc<str>>,
    on_demand: Vec<Rc<str>>,
    system: Rc<SystemResolver>,
}

impl ImportTable {
    pub fn new(package: Option<Rc<str>>, system: Rc<SystemResolver>) -> Self {
        Self {
            package,
            single: LinkedHashMap::new(),
            on_demand: vec![Rc::from("java.lang")],
            system,
        }
    }

    pub fn add_import(&mut self, full_name: &str) {
        let simple = match full_name.rfind('.') {
            Some(dot) => &full_name[dot + 1..],
            None => full_name,
        };
        self.single.insert(Rc::from(simple), Rc::from(full_name));
    }

    pub fn add_on_demand(&mut self, package: &str) {
        if !self.on_demand.iter().any(|existing| **existing == *package) {
            self.on_demand.push(Rc::from(package));
        }
    }

    pub fn imports(&self) -> impl Iterator<Item = &Rc<str>> {
        self.single.values()
    }
}

impl Resolver for ImportTable {
    fn find(&self, defs: &mut DefTable, name: &str) -> ResolveResult<Named> {
        if name.contains('.') {
            return Err(ResolveError::NoClass(name.to_string()));
        }

        if let Some(full_name) = self.single.get(name) {
            return self.system.find(defs, full_name);
        }

        let own_package = self.package.as_deref().unwrap_or("");
        if let Ok(Named::Class(id)) = self.system.find(defs, &join_name(own_package, name)) {
            return Ok(Named::Class(id));
        }

        let mut found: Vec<ClassId> = Vec::new();
        for package in &self.on_demand {
            if let Ok(Named::Class(id)) = self.system.find(defs, &join_name(package, name)) {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }

        match found.len() {
            0 => Err(ResolveError::NoClass(name.to_string())),
            1 => Ok(Named::Class(found[0])),
            _ => Err(ResolveError::Ambiguous {
                name: name.to_string(),
                options: found.iter().map(|id| defs.class(*id).full_name.clone()).collect(),
            }),
        }
    }
}

/// The resolver chain used for one source unit.
pub fn unit_resolver(imports: ImportTable, system: Rc<SystemResolver>, cache_misses: bool) -> Rc<dyn Resolver> {
    let system: Rc<dyn Resolver> = system;
    let members = MemberClassResolver::new(system);
    Rc::new(CachingResolver::new(CompoundResolver::new(imports, members), cache_misses))
}
