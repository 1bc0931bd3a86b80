use std::collections::HashMap;

use crate::ast::{Expr, ExprKind, TypeExpr, TypeParam};
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Local { mutable: bool },
    Param,
    Field { mutable: bool },
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub ty: TypeExpr,
    pub kind: BindingKind,
}

/// Lexical environment of the expression being visited: nested frames of bindings, the type
/// of `this`, and the generic parameters in force.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<HashMap<String, Binding>>,
    pub this_ty: Option<TypeExpr>,
    pub type_params: Vec<TypeParam>,
}

impl Scope {
    pub fn new() -> Self {
        Self { frames: vec![HashMap::new()], this_ty: None, type_params: Vec::new() }
    }

    /// Scope for code inside a declaration whose `this` has type `this_ty`.
    pub fn for_decl(this_ty: TypeExpr, type_params: Vec<TypeParam>) -> Self {
        Self { frames: vec![HashMap::new()], this_ty: Some(this_ty), type_params }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn define(&mut self, name: impl Into<String>, ty: TypeExpr, kind: BindingKind) {
        let name = name.into();
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.clone(), Binding { name, ty, kind });
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// A resolved expression reading `name`: the identifier itself for locals and parameters,
    /// `this.name` for fields.
    pub fn reference(&self, name: &str, span: Span) -> Option<Expr> {
        let binding = self.lookup(name)?;
        let expr = match binding.kind {
            BindingKind::Local { .. } | BindingKind::Param => {
                Expr::new(ExprKind::Ident(name.to_string()), span)
            }
            BindingKind::Field { .. } => {
                let this = Expr::new(ExprKind::This, span);
                let this = match &self.this_ty {
                    Some(t) => this.typed(t.clone()),
                    None => this,
                };
                Expr::new(ExprKind::FieldAccess { object: Box::new(this), field: name.to_string() }, span)
            }
        };
        Some(expr.typed(binding.ty.clone()))
    }

    pub fn type_param(&self, name: &str) -> Option<&TypeParam> {
        self.type_params.iter().find(|tp| tp.name.node == name)
    }

    /// The declared bound of a type parameter in scope.
    pub fn bound_of(&self, name: &str) -> Option<&TypeExpr> {
        self.type_param(name).and_then(|tp| tp.bound.as_ref())
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
