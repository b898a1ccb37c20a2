use jv_common::{Backtrace, DiagnosticMessage, DiagnosticOutput, ErrorQueue};
use jv_syn::SyntaxError;
use std::path::PathBuf;
use std::{fmt, io};

#[derive(Debug)]
pub enum CompileError {
    SyntaxError(SyntaxError),
    TypecheckErrors(ErrorQueue),

    InvalidArguments(String),
    ReadSourceFileFailed {
        path: PathBuf,
        msg: String,
    },
    OutputFailed(String, io::Error),
}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> Self {
        CompileError::SyntaxError(err)
    }
}

impl From<ErrorQueue> for CompileError {
    fn from(errors: ErrorQueue) -> Self {
        CompileError::TypecheckErrors(errors)
    }
}

impl DiagnosticOutput for CompileError {
    fn main(&self) -> DiagnosticMessage {
        match self {
            CompileError::SyntaxError(err) => err.main(),
            CompileError::TypecheckErrors(errors) => DiagnosticMessage {
                title: format!("type checking failed with {} error(s)", errors.len()),
                label: None,
                notes: Vec::new(),
            },
            CompileError::InvalidArguments(msg) => DiagnosticMessage {
                title: format!("invalid arguments: {}", msg),
                label: None,
                notes: Vec::new(),
            },
            CompileError::ReadSourceFileFailed { path, msg } => DiagnosticMessage {
                title: format!("failed to read source file {}", path.to_string_lossy()),
                label: None,
                notes: vec![msg.clone()],
            },
            CompileError::OutputFailed(out_name, err) => DiagnosticMessage {
                title: format!("writing output to `{}` failed: {}", out_name, err),
                label: None,
                notes: Vec::new(),
            },
        }
    }

    fn see_also(&self) -> Vec<DiagnosticMessage> {
        match self {
            CompileError::SyntaxError(err) => err.see_also(),
            _ => Vec::new(),
        }
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            CompileError::SyntaxError(err) => err.backtrace(),
            _ => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::SyntaxError(err) => write!(f, "{}", err),
            CompileError::TypecheckErrors(errors) => write!(f, "{}", errors),
            CompileError::InvalidArguments(msg) => write!(f, "{}", msg),
            CompileError::ReadSourceFileFailed { msg, .. } => write!(f, "{}", msg),
            CompileError::OutputFailed(out_name, err) => {
                write!(f, "writing to {} failed: {}", out_name, err)
            },
        }
    }
}
