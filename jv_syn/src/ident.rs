use jv_common::span::Span;
use jv_common::span::Spanned;
use derivative::*;
use std::fmt;
use std::rc::Rc;

#[derive(Eq, Clone, Derivative)]
#[derivative(PartialEq, Debug, Hash)]
pub struct Ident {
    pub name: Rc<str>,

    #[derivative(Debug = "ignore")]
    #[derivative(PartialEq = "ignore")]
    #[derivative(Hash = "ignore")]
    pub span: Span,
}

impl Ident {
    pub fn new(text: &str, span: impl Into<Span>) -> Self {
        Self {
            name: Rc::from(text),
            span: span.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, name: &str) -> bool {
        &*self.name == name
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, name: &&str) -> bool {
        &*self.name == *name
    }
}

impl Spanned for Ident {
    fn span(&self) -> &Span {
        &self.span
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A dotted name such as a package name or a fully-qualified class name. Never empty.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IdentPath {
    parts: Vec<Ident>,
}

impl IdentPath {
    pub fn new(name: Ident, namespace: impl IntoIterator<Item = Ident>) -> Self {
        let mut parts: Vec<_> = namespace.into_iter().collect();
        parts.push(name);

        Self { parts }
    }

    pub fn from_parts(parts: impl IntoIterator<Item = Ident>) -> Self {
        let parts: Vec<_> = parts.into_iter().collect();
        assert!(!parts.is_empty(), "ident path must have at least one part");
        Self { parts }
    }

    /// Split a dotted string into a path, giving every part the same span.
    pub fn parse_dotted(name: &str, span: &Span) -> Self {
        Self::from_parts(name.split('.').map(|part| Ident::new(part, span.clone())))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Ident> + ExactSizeIterator {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn first(&self) -> &Ident {
        &self.parts[0]
    }

    pub fn last(&self) -> &Ident {
        &self.parts[self.parts.len() - 1]
    }

    pub fn as_slice(&self) -> &[Ident] {
        &self.parts
    }

    /// The path without its last part, or `None` if this is a single name.
    pub fn parent(&self) -> Option<IdentPath> {
        if self.parts.len() == 1 {
            None
        } else {
            Some(Self {
                parts: self.parts[0..self.parts.len() - 1].to_vec(),
            })
        }
    }

    pub fn child(mut self, part: Ident) -> Self {
        self.parts.push(part);
        self
    }

    pub fn is_parent_of(&self, other: &Self) -> bool {
        self.parts.len() < other.parts.len() && other.parts[0..self.parts.len()] == self.parts[..]
    }

    pub fn join(&self, sep: &str) -> String {
        let parts: Vec<&str> = self.parts.iter().map(|p| p.as_str()).collect();
        parts.join(sep)
    }
}

impl From<Ident> for IdentPath {
    fn from(ident: Ident) -> Self {
        Self { parts: vec![ident] }
    }
}

impl Spanned for IdentPath {
    fn span(&self) -> &Span {
        self.last().span()
    }
}

impl fmt::Display for IdentPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}
