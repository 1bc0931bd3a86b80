//! Expansion of the surface conveniences into core declarations and constructions.
//!
//! A partial application becomes a lambda, a lambda becomes an object literal, and every object
//! literal becomes either an inline anonymous declaration or a hoisted generic one:
//!
//! ```text
//! x~f(3)  ==>  lambda box(b: U32)($1: T box = x, a: U32 = 3) => $1.f(a, consume b) end
//!         ==>  object box let $1: T box; let a: U32; fun box apply(b: U32) => ... end
//!         ==>  ObjectInit { $2 ... }($1, a)
//! ```

pub mod capture;
pub mod hoist;
pub mod lambda;
pub mod partial;

use crate::ast::{DeclOrigin, Expr, ExprKind, LambdaLit, ObjectLit, PartialApp, TypeDecl};
use crate::hygiene::Hygiene;
use crate::span::Spanned;

/// The sugar node kinds this pass rewrites. Closed: each variant has exactly one handler.
#[derive(Debug, Clone)]
pub enum Sugar {
    Partial(Box<PartialApp>),
    Lambda(Box<LambdaLit>),
    Object(Box<ObjectLit>),
}

impl Sugar {
    /// Take the sugar node out of `expr`. The placeholder left behind never survives: the caller
    /// overwrites it with the expansion, or puts the node back with [`Sugar::into_kind`] when
    /// expansion fails. Returns `None` (and leaves `expr` untouched) for core expressions.
    pub fn take(expr: &mut Expr) -> Option<Sugar> {
        if !matches!(expr.kind, ExprKind::Partial(_) | ExprKind::Lambda(_) | ExprKind::Object(_)) {
            return None;
        }
        match std::mem::replace(&mut expr.kind, ExprKind::Error) {
            ExprKind::Partial(app) => Some(Sugar::Partial(app)),
            ExprKind::Lambda(lit) => Some(Sugar::Lambda(lit)),
            ExprKind::Object(lit) => Some(Sugar::Object(lit)),
            _ => None,
        }
    }

    pub fn into_kind(self) -> ExprKind {
        match self {
            Sugar::Partial(app) => ExprKind::Partial(app),
            Sugar::Lambda(lit) => ExprKind::Lambda(lit),
            Sugar::Object(lit) => ExprKind::Object(lit),
        }
    }
}

/// Every declaration the pass generated, in creation order.
#[derive(Debug, Default)]
pub struct Registry {
    /// Declarations promoted to the top level, to be appended to the program.
    pub hoisted: Vec<Spanned<TypeDecl>>,
    pub generated: Vec<(String, DeclOrigin)>,
}

impl Registry {
    pub fn record(&mut self, name: impl Into<String>, origin: DeclOrigin) {
        self.generated.push((name.into(), origin));
    }

    pub fn hoist(&mut self, decl: Spanned<TypeDecl>) {
        self.record(decl.node.name.node.clone(), DeclOrigin::Hoisted);
        self.hoisted.push(decl);
    }

    pub fn len(&self) -> usize {
        self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }
}

/// Per-compilation state shared by every expansion.
#[derive(Debug, Default)]
pub struct SugarCtx {
    pub hygiene: Hygiene,
    pub registry: Registry,
}

impl SugarCtx {
    pub fn new() -> Self {
        Self::default()
    }
}
