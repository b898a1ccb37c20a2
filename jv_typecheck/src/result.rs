use crate::ty::{ProcSig, Type};
use jv_common::{span::*, DiagnosticLabel, DiagnosticMessage, DiagnosticOutput, ErrorInfo, ErrorKind};
use jv_syn::{BinaryOp, Flags, Ident, UnaryOp};
use std::{fmt, rc::Rc};

#[derive(Debug, Clone)]
pub enum NameError {
    NotFound(Ident),
    NoClass {
        name: String,
        span: Span,
    },
    MemberNotFound {
        base: Type,
        member: Ident,

        // argument types of a failed method or constructor lookup
        args: Option<Vec<Type>>,
    },
    Ambiguous {
        ident: Ident,
        options: Vec<Rc<str>>,
    },
    AlreadyDeclared {
        new: Ident,
        existing: Span,
    },
    NotAccessible {
        member: Ident,
        container: Type,
        access: &'static str,
    },
}

pub type NameResult<T> = Result<T, NameError>;

impl Spanned for NameError {
    fn span(&self) -> &Span {
        match self {
            NameError::NotFound(ident) => &ident.span,
            NameError::NoClass { span, .. } => span,
            NameError::MemberNotFound { member, .. } => &member.span,
            NameError::Ambiguous { ident, .. } => &ident.span,
            NameError::AlreadyDeclared { new, .. } => &new.span,
            NameError::NotAccessible { member, .. } => &member.span,
        }
    }
}

impl DiagnosticOutput for NameError {
    fn title(&self) -> String {
        match self {
            NameError::NotFound(_) => "Name not found".to_string(),
            NameError::NoClass { .. } => "Class not found".to_string(),
            NameError::MemberNotFound { .. } => "Named member not found".to_string(),
            NameError::Ambiguous { .. } => "Name is ambiguous".to_string(),
            NameError::AlreadyDeclared { .. } => "Name already declared".to_string(),
            NameError::NotAccessible { .. } => "Member is not accessible".to_string(),
        }
    }

    fn label(&self) -> Option<DiagnosticLabel> {
        Some(DiagnosticLabel {
            text: Some(self.to_string()),
            span: self.span().clone(),
        })
    }

    fn see_also(&self) -> Vec<DiagnosticMessage> {
        match self {
            NameError::AlreadyDeclared { new, existing } if !existing.is_builtin() => vec![DiagnosticMessage {
                title: format!("`{}` previously declared here", new),
                label: Some(DiagnosticLabel {
                    text: None,
                    span: existing.clone(),
                }),
                notes: Vec::new(),
            }],

            _ => Vec::new(),
        }
    }

    fn notes(&self) -> Vec<String> {
        match self {
            NameError::Ambiguous { ident, options } => options
                .iter()
                .map(|option| format!("`{}` could refer to `{}`", ident, option))
                .collect(),

            _ => Vec::new(),
        }
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NameError::NotFound(ident) => write!(f, "`{}` was not found in this scope", ident),
            NameError::NoClass { name, .. } => write!(f, "class `{}` was not found", name),

            NameError::MemberNotFound { base, member, args: None } => {
                write!(f, "type {} does not have a member named `{}`", base, member)
            },
            NameError::MemberNotFound { base, member, args: Some(args) } => {
                write!(f, "type {} has no applicable `{}`", base, member)?;
                write!(f, "{}", crate::ty::FormalsDisplay(args))
            },

            NameError::Ambiguous { ident, options } => {
                write!(f, "`{}` is ambiguous ({} candidates)", ident, options.len())
            },
            NameError::AlreadyDeclared { new, .. } => write!(f, "`{}` is already declared in this scope", new),
            NameError::NotAccessible { member, container, access } => {
                write!(f, "`{}` has {} access in {}", member, access, container)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SupertypeError {
    ExtendsFinal,
    ExtendsInterface,
    ImplementsClass,
    NotAClass,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum OverrideError {
    StaticMismatch,
    ReturnType { expected: Type, actual: Type },
    Throws(Type),
    WeakerAccess { expected: &'static str },
    Final,
}

#[derive(Debug, Clone)]
pub enum TypeError {
    NameError(NameError),
    TypeMismatch {
        expected: Type,
        actual: Type,
        span: Span,
    },
    InvalidOperand {
        op: UnaryOp,
        operand: Type,
        span: Span,
    },
    InvalidBinaryOperands {
        op: BinaryOp,
        lhs: Type,
        rhs: Type,
        span: Span,
    },
    InvalidCast {
        from: Type,
        to: Type,
        span: Span,
    },
    NotAVariable {
        span: Span,
    },
    AssignToFinal {
        name: Rc<str>,
        span: Span,
    },
    NoCommonAncestor {
        a: Type,
        b: Type,
        span: Span,
    },
    ExpectedType {
        name: String,
        span: Span,
    },
    ExpectedValue {
        name: String,
        span: Span,
    },
    StaticContext {
        name: String,
        span: Span,
    },
    InvalidReturn {
        expected: Type,
        actual: Option<Type>,
        span: Span,
    },
    InvalidJump {
        kind: &'static str,
        label: Option<Ident>,
        span: Span,
    },
    UnreportedException {
        ty: Type,
        span: Span,
    },
    NotThrowable {
        ty: Type,
        span: Span,
    },
    CyclicInheritance {
        class: Rc<str>,
        span: Span,
    },
    InvalidSupertype {
        class: Rc<str>,
        supertype: Type,
        reason: SupertypeError,
        span: Span,
    },
    InvalidOverride {
        method: Rc<str>,
        overridden: Type,
        reason: OverrideError,
        span: Span,
        overridden_span: Span,
    },
    AbstractNotImplemented {
        class: Rc<str>,
        method: Rc<str>,
        container: Type,
        sig: Rc<ProcSig>,
        span: Span,
    },
    AbstractInstantiation {
        ty: Type,
        span: Span,
    },
    InvalidModifiers {
        flags: Flags,
        what: String,
        span: Span,
    },
    MissingBody {
        name: Rc<str>,
        span: Span,
    },
    UnexpectedBody {
        name: Rc<str>,
        span: Span,
    },
    NoSuperConstructor {
        superclass: Type,
        span: Span,
    },
    UnreachedGoal {
        goal: String,
        span: Span,
    },
}

pub type TypeResult<T> = Result<T, TypeError>;

impl From<NameError> for TypeError {
    fn from(err: NameError) -> Self {
        TypeError::NameError(err)
    }
}

impl TypeError {
    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::from_diagnostic(ErrorKind::SemanticError, self)
    }
}

impl Spanned for TypeError {
    fn span(&self) -> &Span {
        match self {
            TypeError::NameError(err) => err.span(),
            TypeError::TypeMismatch { span, .. } => span,
            TypeError::InvalidOperand { span, .. } => span,
            TypeError::InvalidBinaryOperands { span, .. } => span,
            TypeError::InvalidCast { span, .. } => span,
            TypeError::NotAVariable { span } => span,
            TypeError::AssignToFinal { span, .. } => span,
            TypeError::NoCommonAncestor { span, .. } => span,
            TypeError::ExpectedType { span, .. } => span,
            TypeError::ExpectedValue { span, .. } => span,
            TypeError::StaticContext { span, .. } => span,
            TypeError::InvalidReturn { span, .. } => span,
            TypeError::InvalidJump { span, .. } => span,
            TypeError::UnreportedException { span, .. } => span,
            TypeError::NotThrowable { span, .. } => span,
            TypeError::CyclicInheritance { span, .. } => span,
            TypeError::InvalidSupertype { span, .. } => span,
            TypeError::InvalidOverride { span, .. } => span,
            TypeError::AbstractNotImplemented { span, .. } => span,
            TypeError::AbstractInstantiation { span, .. } => span,
            TypeError::InvalidModifiers { span, .. } => span,
            TypeError::MissingBody { span, .. } => span,
            TypeError::UnexpectedBody { span, .. } => span,
            TypeError::NoSuperConstructor { span, .. } => span,
            TypeError::UnreachedGoal { span, .. } => span,
        }
    }
}

impl DiagnosticOutput for TypeError {
    fn title(&self) -> String {
        match self {
            TypeError::NameError(err) => err.title(),
            TypeError::TypeMismatch { .. } => "Type mismatch".to_string(),
            TypeError::InvalidOperand { .. } => "Invalid operand".to_string(),
            TypeError::InvalidBinaryOperands { .. } => "Invalid operands".to_string(),
            TypeError::InvalidCast { .. } => "Invalid cast".to_string(),
            TypeError::NotAVariable { .. } => "Not a variable".to_string(),
            TypeError::AssignToFinal { .. } => "Assignment to final variable".to_string(),
            TypeError::NoCommonAncestor { .. } => "Incompatible types".to_string(),
            TypeError::ExpectedType { .. } => "Expected a type".to_string(),
            TypeError::ExpectedValue { .. } => "Expected a value".to_string(),
            TypeError::StaticContext { .. } => "Instance member used in static context".to_string(),
            TypeError::InvalidReturn { .. } => "Invalid return".to_string(),
            TypeError::InvalidJump { .. } => "Invalid jump".to_string(),
            TypeError::UnreportedException { .. } => "Unreported exception".to_string(),
            TypeError::NotThrowable { .. } => "Not throwable".to_string(),
            TypeError::CyclicInheritance { .. } => "Cyclic inheritance".to_string(),
            TypeError::InvalidSupertype { .. } => "Invalid supertype".to_string(),
            TypeError::InvalidOverride { .. } => "Invalid override".to_string(),
            TypeError::AbstractNotImplemented { .. } => "Abstract method not implemented".to_string(),
            TypeError::AbstractInstantiation { .. } => "Cannot instantiate abstract type".to_string(),
            TypeError::InvalidModifiers { .. } => "Invalid modifiers".to_string(),
            TypeError::MissingBody { .. } => "Missing method body".to_string(),
            TypeError::UnexpectedBody { .. } => "Unexpected method body".to_string(),
            TypeError::NoSuperConstructor { .. } => "No superclass constructor".to_string(),
            TypeError::UnreachedGoal { .. } => "Unresolved dependency".to_string(),
        }
    }

    fn label(&self) -> Option<DiagnosticLabel> {
        match self {
            TypeError::NameError(err) => err.label(),

            _ => Some(DiagnosticLabel {
                text: Some(self.to_string()),
                span: self.span().clone(),
            }),
        }
    }

    fn notes(&self) -> Vec<String> {
        match self {
            TypeError::NameError(err) => err.notes(),
            _ => Vec::new(),
        }
    }

    fn see_also(&self) -> Vec<DiagnosticMessage> {
        match self {
            TypeError::NameError(err) => err.see_also(),

            TypeError::InvalidOverride {
                method,
                overridden,
                overridden_span,
                ..
            } if !overridden_span.is_builtin() => vec![DiagnosticMessage {
                title: format!("`{}.{}` declared here", overridden, method),
                label: Some(DiagnosticLabel {
                    text: None,
                    span: overridden_span.clone(),
                }),
                notes: Vec::new(),
            }],

            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeError::NameError(err) => write!(f, "{}", err),

            TypeError::TypeMismatch { expected, actual, .. } => {
                write!(f, "type mismatch: expected {}, found {}", expected, actual)
            },

            TypeError::InvalidOperand { op, operand, .. } => {
                write!(f, "operator `{}` cannot be applied to {}", op, operand)
            },

            TypeError::InvalidBinaryOperands { op, lhs, rhs, .. } => {
                write!(f, "operator `{}` cannot be applied to {} and {}", op, lhs, rhs)
            },

            TypeError::InvalidCast { from, to, .. } => write!(f, "cannot cast {} to {}", from, to),
            TypeError::NotAVariable { .. } => write!(f, "expression is not a variable"),
            TypeError::AssignToFinal { name, .. } => write!(f, "cannot assign a value to final variable `{}`", name),

            TypeError::NoCommonAncestor { a, b, .. } => {
                write!(f, "types {} and {} have no common supertype", a, b)
            },

            TypeError::ExpectedType { name, .. } => write!(f, "`{}` is not a type", name),
            TypeError::ExpectedValue { name, .. } => write!(f, "`{}` is not a value", name),

            TypeError::StaticContext { name, .. } => {
                write!(f, "`{}` cannot be referenced from a static context", name)
            },

            TypeError::InvalidReturn { expected, actual, .. } => match actual {
                Some(actual) if expected.is_void() => {
                    write!(f, "cannot return a value of type {} from a void method", actual)
                },
                Some(actual) => write!(f, "cannot return {} from a method returning {}", actual, expected),
                None => write!(f, "missing return value of type {}", expected),
            },

            TypeError::InvalidJump { kind, label: Some(label), .. } => {
                write!(f, "`{} {}` does not refer to an enclosing statement", kind, label)
            },
            TypeError::InvalidJump { kind, label: None, .. } => {
                write!(f, "`{}` outside of a loop", kind)
            },

            TypeError::UnreportedException { ty, .. } => {
                write!(f, "exception {} must be caught or declared to be thrown", ty)
            },
            TypeError::NotThrowable { ty, .. } => write!(f, "{} is not a subtype of java.lang.Throwable", ty),

            TypeError::CyclicInheritance { class, .. } => {
                write!(f, "cyclic inheritance involving `{}`", class)
            },

            TypeError::InvalidSupertype { class, supertype, reason, .. } => match reason {
                SupertypeError::ExtendsFinal => {
                    write!(f, "`{}` cannot extend final class {}", class, supertype)
                },
                SupertypeError::ExtendsInterface => {
                    write!(f, "class `{}` cannot extend interface {}", class, supertype)
                },
                SupertypeError::ImplementsClass => {
                    write!(f, "`{}` cannot implement class {}, it is not an interface", class, supertype)
                },
                SupertypeError::NotAClass => write!(f, "supertype of `{}` must be a class, found {}", class, supertype),
            },

            TypeError::InvalidOverride { method, overridden, reason, .. } => {
                write!(f, "`{}` cannot override the method of the same name in {}: ", method, overridden)?;
                match reason {
                    OverrideError::StaticMismatch => write!(f, "static and instance methods cannot override each other"),
                    OverrideError::ReturnType { expected, actual } => {
                        write!(f, "return type {} is not compatible with {}", actual, expected)
                    },
                    OverrideError::Throws(ty) => write!(f, "overridden method does not throw {}", ty),
                    OverrideError::WeakerAccess { expected } => {
                        write!(f, "attempting to assign weaker access privileges, was {}", expected)
                    },
                    OverrideError::Final => write!(f, "overridden method is final"),
                }
            },

            TypeError::AbstractNotImplemented { class, method, container, sig, .. } => write!(
                f,
                "`{}` is not abstract and does not implement abstract method {}{} of {}",
                class,
                method,
                sig.formals_display(),
                container
            ),

            TypeError::AbstractInstantiation { ty, .. } => write!(f, "{} is abstract and cannot be instantiated", ty),
            TypeError::InvalidModifiers { flags, what, .. } => write!(f, "illegal modifiers `{}` for {}", flags, what),
            TypeError::MissingBody { name, .. } => write!(f, "method `{}` must have a body", name),
            TypeError::UnexpectedBody { name, .. } => write!(f, "abstract or native method `{}` cannot have a body", name),

            TypeError::NoSuperConstructor { superclass, .. } => {
                write!(f, "superclass {} has no accessible constructor taking no arguments", superclass)
            },

            TypeError::UnreachedGoal { goal, .. } => {
                write!(f, "could not establish {} because of a cyclic dependency", goal)
            },
        }
    }
}
