use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte-offset span into the source text a program was built from. Nodes synthesized without
/// a source location carry the empty span at offset zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self::default()
    }

    pub fn is_dummy(&self) -> bool {
        *self == Self::dummy()
    }

    /// This span, or `fallback` when this one carries no location.
    pub fn or(self, fallback: Span) -> Span {
        if self.is_dummy() { fallback } else { self }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A value annotated with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    #[serde(default)]
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn dummy(node: T) -> Self {
        Self { node, span: Span::dummy() }
    }
}
