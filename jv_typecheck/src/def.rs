mod instance;

pub use self::instance::*;
use crate::{
    annotation::Typed,
    classpath::{ExternalClass, ExternalField, ExternalProc},
    goal::GoalTarget,
    reference::Ref,
    ty::{ArrayType, ConstValue, ProcSig, Type},
};
use jv_common::span::*;
use jv_syn::{ClassDecl, FieldDecl, Flags, Initializer, Member, ProcDecl, ProcKind};
use linked_hash_map::LinkedHashMap;
use std::{collections::HashMap, fmt, rc::Rc};

macro_rules! def_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

def_id!(ClassId);
def_id!(FieldId);
def_id!(ProcId);
def_id!(InitId);
def_id!(LocalId);

/// A piece of code that gets disambiguated and checked as a unit: a field's initializer, a
/// method or constructor body, or an initializer block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CodeId {
    Field(FieldId),
    Proc(ProcId),
    Init(InitId),
}

impl CodeId {
    pub fn goal_target(self) -> GoalTarget {
        match self {
            CodeId::Field(id) => GoalTarget::Field(id),
            CodeId::Proc(id) => GoalTarget::Proc(id),
            CodeId::Init(id) => GoalTarget::Init(id),
        }
    }
}

/// Members of a class in the order they were declared.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MemberDef {
    Field(FieldId),
    Proc(ProcId),
    Init(InitId),
    Class(ClassId),
}

#[derive(Clone, Debug)]
pub enum ClassSource {
    Source { decl: Rc<ClassDecl<Typed>>, unit: usize },
    Binary(Rc<ExternalClass>),
}

#[derive(Clone, Debug)]
pub struct ClassDef {
    pub id: ClassId,

    /// The simple name.
    pub name: Rc<str>,

    /// Package and enclosing classes joined with dots.
    pub full_name: Rc<str>,

    pub package: Option<Rc<str>>,
    pub flags: Flags,
    pub outer: Option<ClassId>,
    pub span: Span,
    pub source: ClassSource,

    /// `None` only for the root of the class hierarchy and for interfaces.
    pub superclass: Ref<Option<Type>>,
    pub interfaces: Ref<Vec<Type>>,

    pub members: Vec<MemberDef>,
    pub fields: Vec<FieldId>,
    pub methods: Vec<ProcId>,
    pub ctors: Vec<ProcId>,
    pub inits: Vec<InitId>,
    pub member_classes: LinkedHashMap<Rc<str>, ClassId>,
}

impl ClassDef {
    pub fn is_interface(&self) -> bool {
        self.flags.is_interface()
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.source, ClassSource::Binary(..))
    }

    pub fn decl(&self) -> Option<&Rc<ClassDecl<Typed>>> {
        match &self.source {
            ClassSource::Source { decl, .. } => Some(decl),
            ClassSource::Binary(..) => None,
        }
    }

    pub fn unit(&self) -> Option<usize> {
        match &self.source {
            ClassSource::Source { unit, .. } => Some(*unit),
            ClassSource::Binary(..) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum FieldSource {
    Source(Rc<FieldDecl<Typed>>),
    Binary(ExternalField),
}

#[derive(Clone, Debug)]
pub struct FieldDef {
    pub id: FieldId,
    pub name: Rc<str>,
    pub flags: Flags,
    pub container: ClassId,
    pub span: Span,
    pub source: FieldSource,

    pub ty: Ref<Type>,
    pub constant: Ref<Option<ConstValue>>,

    /// The field declaration as the code goals leave it. Binary fields have no code.
    pub code: Option<Ref<Member<Typed>>>,
}

impl FieldDef {
    pub fn decl(&self) -> Option<&Rc<FieldDecl<Typed>>> {
        match &self.source {
            FieldSource::Source(decl) => Some(decl),
            FieldSource::Binary(..) => None,
        }
    }

    pub fn has_init(&self) -> bool {
        self.decl().map(|decl| decl.init.is_some()).unwrap_or(false)
    }
}

#[derive(Clone, Debug)]
pub enum ProcSource {
    Source(Rc<ProcDecl<Typed>>),
    Binary(ExternalProc),

    /// The constructor a class without any constructors gets.
    DefaultCtor,
}

#[derive(Clone, Debug)]
pub struct ProcDef {
    pub id: ProcId,
    pub kind: ProcKind,
    pub name: Rc<str>,
    pub flags: Flags,
    pub container: ClassId,
    pub span: Span,
    pub source: ProcSource,

    pub sig: Ref<Rc<ProcSig>>,
    pub code: Option<Ref<Member<Typed>>>,
}

impl ProcDef {
    pub fn is_binary(&self) -> bool {
        matches!(self.source, ProcSource::Binary(..))
    }

    pub fn decl(&self) -> Option<&Rc<ProcDecl<Typed>>> {
        match &self.source {
            ProcSource::Source(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn formal_count(&self) -> usize {
        match &self.source {
            ProcSource::Source(decl) => decl.formals.len(),
            ProcSource::Binary(external) => external.formals.len(),
            ProcSource::DefaultCtor => 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct InitDef {
    pub id: InitId,
    pub is_static: bool,
    pub container: ClassId,
    pub span: Span,
    pub decl: Rc<Initializer<Typed>>,
    pub code: Ref<Member<Typed>>,
}

#[derive(Clone, Debug)]
pub struct LocalDef {
    pub id: LocalId,
    pub name: Rc<str>,
    pub flags: Flags,
    pub ty: Type,
    pub span: Span,
}

/// Arena owning every definition of a compilation. Definitions refer to each other by id.
#[derive(Debug, Default)]
pub struct DefTable {
    classes: Vec<ClassDef>,
    fields: Vec<FieldDef>,
    procs: Vec<ProcDef>,
    inits: Vec<InitDef>,
    locals: Vec<LocalDef>,

    arrays: HashMap<Type, Rc<ArrayType>>,
}

impl DefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDef {
        &mut self.classes[id.0]
    }

    pub fn field(&self, id: FieldId) -> &FieldDef {
        &self.fields[id.0]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut FieldDef {
        &mut self.fields[id.0]
    }

    pub fn proc(&self, id: ProcId) -> &ProcDef {
        &self.procs[id.0]
    }

    pub fn proc_mut(&mut self, id: ProcId) -> &mut ProcDef {
        &mut self.procs[id.0]
    }

    pub fn init(&self, id: InitId) -> &InitDef {
        &self.inits[id.0]
    }

    pub fn init_mut(&mut self, id: InitId) -> &mut InitDef {
        &mut self.inits[id.0]
    }

    pub fn local(&self, id: LocalId) -> &LocalDef {
        &self.locals[id.0]
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn class_type(&self, id: ClassId) -> Type {
        Type::class(id, self.class(id).full_name.clone())
    }

    /// The array type with elements of type `elem`. Asking twice for the same element type
    /// gives the same shared array type.
    pub fn array_of(&mut self, elem: Type) -> Type {
        let array = self
            .arrays
            .entry(elem.clone())
            .or_insert_with(|| Rc::new(ArrayType { elem }))
            .clone();
        Type::Array(array)
    }

    pub fn array_dims(&mut self, elem: Type, dims: usize) -> Type {
        (0..dims).fold(elem, |ty, _| self.array_of(ty))
    }

    /// The outermost class enclosing `id`, or `id` itself for a top-level class.
    pub fn outermost(&self, mut id: ClassId) -> ClassId {
        while let Some(outer) = self.class(id).outer {
            id = outer;
        }
        id
    }

    /// Whether `inner` is `outer` or nested inside it.
    pub fn is_enclosed_by(&self, inner: ClassId, outer: ClassId) -> bool {
        let mut next = Some(inner);
        while let Some(id) = next {
            if id == outer {
                return true;
            }
            next = self.class(id).outer;
        }
        false
    }

    pub fn code_container(&self, code: CodeId) -> ClassId {
        match code {
            CodeId::Field(id) => self.field(id).container,
            CodeId::Proc(id) => self.proc(id).container,
            CodeId::Init(id) => self.init(id).container,
        }
    }

    /// Whether code runs without a `this`.
    pub fn code_is_static(&self, code: CodeId) -> bool {
        match code {
            CodeId::Field(id) => self.field(id).flags.is_static(),
            CodeId::Proc(id) => self.proc(id).flags.is_static(),
            CodeId::Init(id) => self.init(id).is_static,
        }
    }

    pub fn code_ref(&self, code: CodeId) -> Option<&Ref<Member<Typed>>> {
        match code {
            CodeId::Field(id) => self.field(id).code.as_ref(),
            CodeId::Proc(id) => self.proc(id).code.as_ref(),
            CodeId::Init(id) => Some(&self.init(id).code),
        }
    }

    pub fn code_ref_mut(&mut self, code: CodeId) -> Option<&mut Ref<Member<Typed>>> {
        match code {
            CodeId::Field(id) => self.field_mut(id).code.as_mut(),
            CodeId::Proc(id) => self.proc_mut(id).code.as_mut(),
            CodeId::Init(id) => Some(&mut self.init_mut(id).code),
        }
    }

    /// Name used for goals and diagnostics, e.g. `ClassDef#p.A` or `ProcDef#A.f`.
    pub fn describe(&self, target: GoalTarget) -> String {
        match target {
            GoalTarget::Class(id) => format!("ClassDef#{}", self.class(id).full_name),
            GoalTarget::Field(id) => {
                let field = self.field(id);
                format!("FieldDef#{}.{}", self.class(field.container).name, field.name)
            },
            GoalTarget::Proc(id) => {
                let proc_def = self.proc(id);
                let name = match proc_def.kind {
                    ProcKind::Method => proc_def.name.clone(),
                    ProcKind::Constructor => Rc::from("<init>"),
                };
                format!("ProcDef#{}.{}", self.class(proc_def.container).name, name)
            },
            GoalTarget::Init(id) => {
                let init = self.init(id);
                let kind = if init.is_static { "<clinit>" } else { "<init-block>" };
                format!("InitDef#{}.{}", self.class(init.container).name, kind)
            },
            GoalTarget::Unit(index) => format!("Unit#{}", index),
        }
    }

    pub fn add_class(
        &mut self,
        name: Rc<str>,
        full_name: Rc<str>,
        package: Option<Rc<str>>,
        flags: Flags,
        outer: Option<ClassId>,
        span: Span,
        source: ClassSource,
    ) -> ClassId {
        let id = ClassId(self.classes.len());
        self.classes.push(ClassDef {
            id,
            name,
            full_name,
            package,
            flags,
            outer,
            span,
            source,
            superclass: Ref::new(),
            interfaces: Ref::new(),
            members: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            ctors: Vec::new(),
            inits: Vec::new(),
            member_classes: LinkedHashMap::new(),
        });
        id
    }

    pub fn add_member_class(&mut self, outer: ClassId, inner: ClassId) {
        let name = self.class(inner).name.clone();
        let outer_def = self.class_mut(outer);
        outer_def.member_classes.insert(name, inner);
        outer_def.members.push(MemberDef::Class(inner));
    }

    pub fn add_field(&mut self, container: ClassId, name: Rc<str>, flags: Flags, span: Span, source: FieldSource) -> FieldId {
        let id = FieldId(self.fields.len());

        let (code, constant) = match &source {
            FieldSource::Source(decl) => {
                let member = Member::Field(decl.clone());
                (Some(Ref::with_value(member)), Ref::new())
            },
            FieldSource::Binary(external) => (None, Ref::with_value(external.constant.clone())),
        };

        self.fields.push(FieldDef {
            id,
            name,
            flags,
            container,
            span,
            source,
            ty: Ref::new(),
            constant,
            code,
        });

        let class = self.class_mut(container);
        class.fields.push(id);
        class.members.push(MemberDef::Field(id));
        id
    }

    pub fn add_proc(
        &mut self,
        container: ClassId,
        kind: ProcKind,
        name: Rc<str>,
        flags: Flags,
        span: Span,
        source: ProcSource,
    ) -> ProcId {
        let id = ProcId(self.procs.len());

        let code = match &source {
            ProcSource::Source(decl) => Some(Ref::with_value(Member::Proc(decl.clone()))),
            _ => None,
        };

        self.procs.push(ProcDef {
            id,
            kind,
            name,
            flags,
            container,
            span,
            source,
            sig: Ref::new(),
            code,
        });

        let class = self.class_mut(container);
        match kind {
            ProcKind::Method => class.methods.push(id),
            ProcKind::Constructor => class.ctors.push(id),
        }
        class.members.push(MemberDef::Proc(id));
        id
    }

    pub fn add_init(&mut self, container: ClassId, decl: Rc<Initializer<Typed>>) -> InitId {
        let id = InitId(self.inits.len());
        self.inits.push(InitDef {
            id,
            is_static: decl.is_static,
            container,
            span: decl.annotation.span.clone(),
            code: Ref::with_value(Member::Initializer(decl.clone())),
            decl,
        });

        let class = self.class_mut(container);
        class.inits.push(id);
        class.members.push(MemberDef::Init(id));
        id
    }

    pub fn add_local(&mut self, name: Rc<str>, flags: Flags, ty: Type, span: Span) -> LocalId {
        let id = LocalId(self.locals.len());
        self.locals.push(LocalDef { id, name, flags, ty, span });
        id
    }

    /// Creates the definitions for a class loaded from the classpath. Its supertypes and
    /// member types are resolved later, by the same goals as source classes.
    pub fn add_external(&mut self, external: Rc<ExternalClass>) -> ClassId {
        let (package, name) = match external.name.rfind('.') {
            Some(dot) => (Some(Rc::from(&external.name[..dot])), Rc::from(&external.name[dot + 1..])),
            None => (None, external.name.clone()),
        };

        let id = self.add_class(
            name,
            external.name.clone(),
            package,
            external.flags,
            None,
            Span::builtin(),
            ClassSource::Binary(external.clone()),
        );

        for field in &external.fields {
            let source = FieldSource::Binary(field.clone());
            self.add_field(id, field.name.clone(), field.flags, Span::builtin(), source);
        }

        for ctor in &external.ctors {
            let source = ProcSource::Binary(ctor.clone());
            let name = external.name.clone();
            self.add_proc(id, ProcKind::Constructor, name, ctor.flags, Span::builtin(), source);
        }

        for method in &external.methods {
            let source = ProcSource::Binary(method.clone());
            self.add_proc(id, ProcKind::Method, method.name.clone(), method.flags, Span::builtin(), source);
        }

        id
    }
}
