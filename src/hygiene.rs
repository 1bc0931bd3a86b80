//! Hygienic names for everything the desugaring pass synthesizes.
//!
//! Generated identifiers live in a namespace source programs cannot reach: they start with
//! `$`, which the lexer never accepts in an identifier. The counter belongs to one
//! compilation, so independent compilations (and tests) never see each other's names.

/// Reserved prefix marking an identifier as synthetic.
pub const SYNTHETIC_PREFIX: char = '$';

#[derive(Debug)]
pub struct Hygiene {
    next: u64,
}

impl Hygiene {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// A fresh identifier, never returned before by this generator.
    pub fn next(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        format!("{SYNTHETIC_PREFIX}{id}")
    }

    /// The identifier the next call to `next` will return.
    pub fn peek(&self) -> String {
        format!("{SYNTHETIC_PREFIX}{}", self.next)
    }
}

impl Default for Hygiene {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_synthetic(name: &str) -> bool {
    name.starts_with(SYNTHETIC_PREFIX)
}

/// Replace every synthetic identifier in `text` by a single placeholder, so two renderings
/// that differ only in counter values compare equal.
pub fn erase_synthetic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == SYNTHETIC_PREFIX {
            out.push(SYNTHETIC_PREFIX);
            out.push('_');
            while chars.peek().is_some_and(|n| n.is_alphanumeric() || *n == '_') {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out
}
