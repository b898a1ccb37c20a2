pub mod error_queue;
pub mod span;

pub use crate::error_queue::*;
use crate::span::*;
use encoding_rs::{Encoding, UTF_8};
use std::{
    cmp::Ordering,
    env, fmt,
    fs::File,
    io,
    io::Read,
    ops::Deref,
    path::{Path, PathBuf},
};

pub use backtrace::Backtrace;

pub trait DiagnosticOutput: fmt::Display {
    fn title(&self) -> String {
        self.to_string()
    }

    fn label(&self) -> Option<DiagnosticLabel> {
        None
    }

    fn notes(&self) -> Vec<String> {
        Vec::new()
    }

    fn main(&self) -> DiagnosticMessage {
        DiagnosticMessage {
            title: self.title(),
            label: self.label(),
            notes: self.notes(),
        }
    }

    fn see_also(&self) -> Vec<DiagnosticMessage> {
        Vec::new()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        None
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticLabel {
    pub text: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticMessage {
    pub title: String,
    pub notes: Vec<String>,
    pub label: Option<DiagnosticLabel>,
}

impl Ord for DiagnosticLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.span.file.as_ref().cmp(other.span.file.as_ref()) {
            Ordering::Equal => match self.span.end.cmp(&other.span.end) {
                Ordering::Equal => self.span.start.cmp(&other.span.start),
                end_ord => end_ord,
            },
            file_ord => file_ord,
        }
    }
}

impl PartialOrd for DiagnosticLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiagnosticMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label.cmp(&other.label)
    }
}

impl PartialOrd for DiagnosticMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Debug)]
pub struct TracedError<T> {
    pub err: T,
    pub bt: Backtrace,
}

impl<T> TracedError<T> {
    pub fn trace(err: T) -> Self {
        Self {
            err,
            bt: Backtrace::new(),
        }
    }

    pub fn chain<TNext: From<T>>(self) -> TracedError<TNext> {
        TracedError {
            err: self.err.into(),
            bt: self.bt,
        }
    }

    pub fn into_inner(self) -> T {
        self.err
    }
}

impl<T> Deref for TracedError<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.err
    }
}

impl<T: fmt::Display> fmt::Display for TracedError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.err)
    }
}

impl<T: DiagnosticOutput> DiagnosticOutput for TracedError<T> {
    fn main(&self) -> DiagnosticMessage {
        self.err.main()
    }

    fn see_also(&self) -> Vec<DiagnosticMessage> {
        self.err.see_also()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        Some(&self.bt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub verbose: bool,

    // upper bound on whole-program passes over goals that asked to be retried
    pub max_passes: usize,

    // remember failed lookups in resolver caches
    pub cache_misses: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            verbose: false,
            max_passes: 8,
            cache_misses: true,
        }
    }
}

pub fn path_relative_to_cwd(path: &Path) -> &Path {
    env::current_dir()
        .ok()
        .and_then(|cwd| cwd.canonicalize().ok())
        .and_then(|cwd| path.strip_prefix(cwd).ok())
        .unwrap_or(path)
}

pub fn read_source_file(filename: &PathBuf) -> io::Result<String> {
    let mut file = File::open(filename)?;

    let mut file_buf = Vec::new();
    file.read_to_end(&mut file_buf)?;

    let (encoding, _bom_len) = Encoding::for_bom(&file_buf).unwrap_or((UTF_8, 3));

    let (src_str, _replaced) = encoding.decode_with_bom_removal(&file_buf);

    Ok(src_str.to_string())
}
