use crate::span::Span;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a failed expansion. Every kind is fatal for the expression it was
/// reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidReceiverShape,
    MethodNotFound,
    CapabilityMismatch,
    UnknownNamedArgument,
    UnresolvedCapture,
    DuplicateArgument,
    TooManyArguments,
    DuplicateCapture,
    UnresolvedReference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidReceiverShape => "invalid receiver shape",
            ErrorKind::MethodNotFound => "method not found",
            ErrorKind::CapabilityMismatch => "capability mismatch",
            ErrorKind::UnknownNamedArgument => "unknown named argument",
            ErrorKind::UnresolvedCapture => "unresolved capture",
            ErrorKind::DuplicateArgument => "duplicate argument",
            ErrorKind::TooManyArguments => "too many arguments",
            ErrorKind::DuplicateCapture => "duplicate capture",
            ErrorKind::UnresolvedReference => "unresolved reference",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{kind}: {msg}")]
    Sugar { kind: ErrorKind, msg: String, span: Span },

    #[error("Type error: {msg}")]
    Type { msg: String, span: Span },

    #[error("Input error: {msg}")]
    Input { msg: String },

    #[error("Config error: {msg}")]
    Config { msg: String, path: PathBuf },

    #[error("{} errors found", .0.len())]
    Multiple(Vec<CompileError>),
}

impl CompileError {
    pub fn sugar(kind: ErrorKind, msg: impl Into<String>, span: Span) -> Self {
        Self::Sugar { kind, msg: msg.into(), span }
    }

    pub fn type_err(msg: impl Into<String>, span: Span) -> Self {
        Self::Type { msg: msg.into(), span }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input { msg: msg.into() }
    }

    pub fn config(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Config { msg: msg.into(), path }
    }

    /// The sugar classification, if this is an expansion failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CompileError::Sugar { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Sugar { span, .. } | CompileError::Type { span, .. } => Some(*span),
            _ => None,
        }
    }

    /// Every individual error, in report order.
    pub fn flatten(&self) -> Vec<&CompileError> {
        match self {
            CompileError::Multiple(errs) => errs.iter().flat_map(|e| e.flatten()).collect(),
            other => vec![other],
        }
    }
}

/// Accumulates errors for one compilation unit. The traversal abandons an expression once it
/// has reported on it, keeps visiting the rest of the unit, and `finish` makes the collected
/// errors fatal.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompileError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, err: CompileError) {
        self.errors.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn finish(mut self) -> Result<(), CompileError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(CompileError::Multiple(self.errors)),
        }
    }
}

/// Render a CompileError with ariadne for nice terminal output.
pub fn render_error(source: &str, filename: &str, err: &CompileError) -> std::io::Result<()> {
    write_error(source, filename, err, &mut std::io::stderr())
}

/// Like [`render_error`], writing to `out` instead of stderr.
pub fn write_error(source: &str, filename: &str, err: &CompileError, out: &mut impl Write) -> std::io::Result<()> {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        CompileError::Sugar { msg, span, .. } | CompileError::Type { msg, span } => {
            let title = match err {
                CompileError::Sugar { kind, .. } => kind.to_string(),
                _ => "type error".to_string(),
            };
            Report::build(ReportKind::Error, (), span.start)
                .with_message(title)
                .with_label(Label::new(span.range()).with_message(msg))
                .finish()
                .write(Source::from(source), &mut *out)
        }
        CompileError::Input { msg } => writeln!(out, "error [{filename}]: {msg}"),
        CompileError::Config { msg, path } => {
            writeln!(out, "error[config]: {msg}")?;
            writeln!(out, "  --> {}", path.display())
        }
        CompileError::Multiple(errs) => {
            for e in errs {
                write_error(source, filename, e, out)?;
            }
            Ok(())
        }
    }
}
