use crate::path_relative_to_cwd;
use std::{fmt, path::PathBuf, rc::Rc};

#[cfg(test)]
mod test;

const BUILTIN_FILE: &str = "<builtin>";

/// Zero-based line and column. Ordered by line, then column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// A range of source text, or a position the compiler made up for something that has no
/// source (a classpath class and its members, implicit constructors and so on). Builtin
/// spans share one placeholder file and are never shown as source locations.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Span {
    pub file: Rc<PathBuf>,
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(file: impl Into<PathBuf>, start: Location, end: Location) -> Self {
        Self {
            file: Rc::new(file.into()),
            start,
            end,
        }
    }

    /// Empty span at the start of `file`, used for errors about a whole unit.
    pub fn zero(file: impl Into<PathBuf>) -> Self {
        Self::new(file, Location::zero(), Location::zero())
    }

    pub fn builtin() -> Self {
        Self::zero(BUILTIN_FILE)
    }

    pub fn is_builtin(&self) -> bool {
        self.file.as_os_str() == BUILTIN_FILE
    }

    /// From the start of this span to the end of `other`. Joining onto a builtin span keeps
    /// the source side.
    pub fn to(&self, other: &impl Spanned) -> Self {
        let other = other.span();
        match (self.is_builtin(), other.is_builtin()) {
            (true, false) => other.clone(),
            (false, true) => self.clone(),
            _ => Self {
                file: self.file.clone(),
                start: self.start,
                end: other.end,
            },
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_builtin() {
            return write!(f, "Span({})", BUILTIN_FILE);
        }

        write!(
            f,
            "Span({}:{}:{}..{}:{})",
            path_relative_to_cwd(&self.file).display(),
            self.start.line,
            self.start.col,
            self.end.line,
            self.end.col
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_builtin() {
            return write!(f, "{}", BUILTIN_FILE);
        }

        write!(f, "{}:{}", path_relative_to_cwd(&self.file).display(), self.start)
    }
}

pub trait Spanned {
    fn span(&self) -> &Span;
}

impl Spanned for Span {
    fn span(&self) -> &Span {
        self
    }
}
