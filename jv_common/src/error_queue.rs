#[cfg(test)]
mod test;

use crate::span::Span;
use crate::DiagnosticLabel;
use crate::DiagnosticMessage;
use crate::DiagnosticOutput;
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    SemanticError,
    InternalError,
    PostCompilerError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::SemanticError => "Semantic error",
            ErrorKind::InternalError => "Internal compiler error",
            ErrorKind::PostCompilerError => "Post-compiler error",
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Option<Span>,

    pub see_also: Vec<DiagnosticMessage>,
}

impl ErrorInfo {
    pub fn semantic(message: impl Into<String>, position: Option<Span>) -> Self {
        Self {
            kind: ErrorKind::SemanticError,
            message: message.into(),
            position,
            see_also: Vec::new(),
        }
    }

    pub fn from_diagnostic(kind: ErrorKind, diag: &impl DiagnosticOutput) -> Self {
        let main = diag.main();
        let position = main.label.as_ref().map(|label| label.span.clone());

        Self {
            kind,
            message: diag.to_string(),
            position,
            see_also: diag.see_also(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.position {
            Some(pos) => write!(f, "{}: {}: {}", pos, self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl DiagnosticOutput for ErrorInfo {
    fn title(&self) -> String {
        self.kind.to_string()
    }

    fn label(&self) -> Option<DiagnosticLabel> {
        self.position.as_ref().map(|span| DiagnosticLabel {
            text: Some(self.message.clone()),
            span: span.clone(),
        })
    }

    fn notes(&self) -> Vec<String> {
        match &self.position {
            Some(_) => Vec::new(),
            None => vec![self.message.clone()],
        }
    }

    fn see_also(&self) -> Vec<DiagnosticMessage> {
        self.see_also.clone()
    }
}

/// Diagnostics collected over a whole compilation, in the order they were reported.
/// Reporting the same message at the same position twice only keeps the first.
#[derive(Debug, Clone, Default)]
pub struct ErrorQueue {
    errors: Vec<ErrorInfo>,
}

impl ErrorQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, error: ErrorInfo) {
        let duplicate = self.errors.iter().any(|existing| {
            existing.kind == error.kind
                && existing.message == error.message
                && existing.position == error.position
        });

        if !duplicate {
            self.errors.push(error);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorInfo> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ErrorInfo> {
        self.errors
    }
}

impl IntoIterator for ErrorQueue {
    type Item = ErrorInfo;
    type IntoIter = std::vec::IntoIter<ErrorInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ErrorQueue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}
