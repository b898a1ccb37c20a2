//! The scope chain threaded through tree traversal. A context is a persistent list of
//! frames: pushing returns a new context sharing everything below the new frame, and no
//! frame changes after it's been pushed.

#[cfg(test)]
mod test;

use crate::{
    def::{ClassId, CodeId, FieldInstance, LocalId},
    job::Compiler,
    resolve::{Named, ResolveError, ResolveResult, Resolver},
};
use jv_common::span::Span;
use std::{fmt, iter, rc::Rc};

#[derive(Clone, Debug)]
pub struct LocalBinding {
    pub name: Rc<str>,

    /// Disambiguation only needs to know a local exists, checking also knows its def.
    pub local: Option<LocalId>,

    pub span: Span,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LabelKind {
    Break,
    Continue,
}

#[derive(Clone, Debug)]
pub struct Label {
    pub name: Option<Rc<str>>,
    pub kind: LabelKind,
}

#[derive(Clone)]
pub enum Frame {
    Base { resolver: Rc<dyn Resolver> },
    Class(ClassId),
    Code { code: CodeId, is_static: bool },
    Block,
    Local(LocalBinding),
    Label(Label),
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Frame::Base { .. } => write!(f, "Base"),
            Frame::Class(id) => write!(f, "Class({})", id),
            Frame::Code { code, is_static } => write!(f, "Code({:?}, static: {})", code, is_static),
            Frame::Block => write!(f, "Block"),
            Frame::Local(local) => write!(f, "Local({})", local.name),
            Frame::Label(label) => write!(f, "Label({:?})", label),
        }
    }
}

#[derive(Debug)]
struct Scope {
    frame: Frame,
    parent: Option<Rc<Scope>>,
}

/// A variable a simple name refers to.
#[derive(Clone, Debug)]
pub enum Variable {
    Local(LocalBinding),

    /// A field of `class` or one of its supertypes, where `class` is the innermost
    /// enclosing class that has a field of that name.
    Field { field: FieldInstance, class: ClassId },
}

#[derive(Clone, Debug)]
pub struct Context {
    head: Rc<Scope>,
}

impl Context {
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self {
            head: Rc::new(Scope {
                frame: Frame::Base { resolver },
                parent: None,
            }),
        }
    }

    fn push(&self, frame: Frame) -> Self {
        Self {
            head: Rc::new(Scope {
                frame,
                parent: Some(self.head.clone()),
            }),
        }
    }

    pub fn push_block(&self) -> Self {
        self.push(Frame::Block)
    }

    pub fn push_class(&self, class: ClassId) -> Self {
        self.push(Frame::Class(class))
    }

    pub fn push_code(&self, code: CodeId, is_static: bool) -> Self {
        self.push(Frame::Code { code, is_static })
    }

    pub fn push_break_label(&self, name: Option<Rc<str>>) -> Self {
        self.push(Frame::Label(Label {
            name,
            kind: LabelKind::Break,
        }))
    }

    pub fn push_continue_label(&self, name: Option<Rc<str>>) -> Self {
        self.push(Frame::Label(Label {
            name,
            kind: LabelKind::Continue,
        }))
    }

    pub fn add_local(&self, name: Rc<str>, local: Option<LocalId>, span: Span) -> Self {
        self.push(Frame::Local(LocalBinding { name, local, span }))
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        iter::successors(Some(self.head.as_ref()), |scope| scope.parent.as_deref()).map(|scope| &scope.frame)
    }

    /// Locals and formals of the innermost code. Locals of code in an enclosing class
    /// aren't visible.
    pub fn find_local(&self, name: &str) -> Option<&LocalBinding> {
        for frame in self.frames() {
            match frame {
                Frame::Local(local) if *local.name == *name => return Some(local),
                Frame::Class(..) => return None,
                _ => {},
            }
        }
        None
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.find_local(name).is_some()
    }

    /// The innermost target of a `break` or `continue`, or the one with a matching label.
    pub fn find_label(&self, kind: LabelKind, name: Option<&str>) -> Option<&Label> {
        for frame in self.frames() {
            match frame {
                Frame::Label(label) if label.kind == kind => match (name, &label.name) {
                    (None, None) => return Some(label),
                    (Some(name), Some(label_name)) if **label_name == *name => return Some(label),
                    _ => {},
                },
                Frame::Code { .. } | Frame::Class(..) => return None,
                _ => {},
            }
        }
        None
    }

    /// Whether a label of any kind with this name encloses the current statement.
    pub fn has_label(&self, name: &str) -> bool {
        self.find_label(LabelKind::Break, Some(name)).is_some()
    }

    pub fn current_class(&self) -> Option<ClassId> {
        self.classes().next()
    }

    /// Enclosing classes, innermost first.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.frames().filter_map(|frame| match frame {
            Frame::Class(id) => Some(*id),
            _ => None,
        })
    }

    pub fn current_code(&self) -> Option<CodeId> {
        for frame in self.frames() {
            match frame {
                Frame::Code { code, .. } => return Some(*code),
                Frame::Class(..) => return None,
                _ => {},
            }
        }
        None
    }

    pub fn in_static_context(&self) -> bool {
        for frame in self.frames() {
            match frame {
                Frame::Code { is_static, .. } => return *is_static,
                Frame::Class(..) => return false,
                _ => {},
            }
        }
        false
    }

    pub fn resolver(&self) -> &Rc<dyn Resolver> {
        for frame in self.frames() {
            if let Frame::Base { resolver } = frame {
                return resolver;
            }
        }
        unreachable!("every context has a base frame")
    }

    /// Finds the variable a simple name refers to without reporting anything: locals and
    /// formals first, then fields of each enclosing class, own fields before inherited
    /// ones.
    pub fn find_variable_silent(&self, comp: &mut Compiler, name: &str) -> Option<Variable> {
        if let Some(local) = self.find_local(name) {
            return Some(Variable::Local(local.clone()));
        }

        for class in self.classes() {
            if let Some(field) = comp.find_field_silent(class, name) {
                return Some(Variable::Field { field, class });
            }
        }

        None
    }

    /// Finds the class or package a simple or dotted name refers to: member classes of the
    /// enclosing classes (declared then inherited) innermost first, then the unit's
    /// resolver chain.
    pub fn find_named(&self, comp: &mut Compiler, name: &str) -> ResolveResult<Named> {
        if !name.contains('.') {
            for class in self.classes() {
                if let Some(member) = comp.find_member_class(class, name) {
                    return Ok(Named::Class(member));
                }
            }
        }

        self.resolver().find(&mut comp.defs, name)
    }

    pub fn find_type(&self, comp: &mut Compiler, name: &str) -> ResolveResult<ClassId> {
        match self.find_named(comp, name)? {
            Named::Class(id) => Ok(id),
            Named::Package(_) => Err(ResolveError::NoClass(name.to_string())),
        }
    }

    /// The innermost enclosing class with a method of this name, declared or inherited.
    pub fn find_method_scope(&self, comp: &mut Compiler, name: &str) -> Option<ClassId> {
        let classes: Vec<_> = self.classes().collect();
        classes.into_iter().find(|class| comp.has_method_named(*class, name))
    }
}
