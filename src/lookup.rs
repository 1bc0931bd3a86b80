//! Method and field lookup on nominal types.
//!
//! The desugaring engine only talks to [`MethodLookup`]. [`DeclTable`] implements it over the
//! declarations of a [`Program`], registered before traversal starts, and over every
//! declaration the pass generates, registered as soon as it is complete.

use std::collections::{HashMap, HashSet};

use crate::ast::*;
use crate::cap::Capability;
use crate::types::bindings;

/// A method's signature as seen from a call site.
#[derive(Debug, Clone)]
pub struct MethodSig {
    pub kind: MethodKind,
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub result: Option<TypeExpr>,
    pub raises: bool,
    pub receiver_cap: Capability,
}

impl MethodSig {
    pub fn from_method(m: &Method) -> Self {
        Self {
            kind: m.kind,
            name: m.name.node.clone(),
            type_params: m.type_params.clone(),
            params: m.params.clone(),
            result: m.result.clone(),
            raises: m.raises,
            receiver_cap: m.receiver_cap(),
        }
    }

    /// Apply type-parameter bindings to every parameter and the result type. Default
    /// expressions are left untouched.
    pub fn subst(&self, b: &HashMap<String, TypeExpr>) -> MethodSig {
        let mut sig = self.clone();
        for p in &mut sig.params {
            p.ty = p.ty.subst(b);
        }
        sig.result = sig.result.map(|r| r.subst(b));
        sig
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name.node == name)
    }
}

pub trait MethodLookup {
    /// Signature of `name` on the nominal type `ty`, with the type's own arguments applied.
    fn lookup_method(&self, ty: &TypeExpr, name: &str) -> Option<MethodSig>;

    /// Whether a receiver with capability `actual` may call a method requiring `required`.
    fn cap_satisfies(&self, actual: Capability, required: Capability) -> bool {
        actual.is_sub(required)
    }

    /// Capability of a nominal type written without one.
    fn default_cap(&self, _type_name: &str) -> Option<Capability> {
        None
    }

    fn field_type(&self, _ty: &TypeExpr, _field: &str) -> Option<TypeExpr> {
        None
    }

    /// Make `decl` visible to every later lookup, exactly as if it had been written by hand.
    fn register(&mut self, decl: &TypeDecl);
}

#[derive(Debug, Clone)]
struct DeclInfo {
    cap: Capability,
    type_params: Vec<String>,
    provides: Vec<TypeExpr>,
    fields: Vec<(String, TypeExpr)>,
    methods: Vec<MethodSig>,
}

#[derive(Debug, Default)]
pub struct DeclTable {
    decls: HashMap<String, DeclInfo>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_program(program: &Program) -> Self {
        let mut table = Self::new();
        for decl in &program.decls {
            table.register(&decl.node);
        }
        table
    }

    /// The declaration behind a nominal type and the bindings of its type parameters.
    fn resolve(&self, ty: &TypeExpr) -> Option<(&DeclInfo, HashMap<String, TypeExpr>)> {
        let TypeExpr::Nominal { name, args, .. } = ty else {
            return None;
        };
        let info = self.decls.get(name)?;
        let b = if args.len() == info.type_params.len() {
            bindings(&info.type_params, args)
        } else {
            HashMap::new()
        };
        Some((info, b))
    }

    fn find_method(&self, ty: &TypeExpr, name: &str, seen: &mut HashSet<String>) -> Option<MethodSig> {
        let (info, b) = self.resolve(ty)?;
        if let TypeExpr::Nominal { name: type_name, .. } = ty {
            if !seen.insert(type_name.clone()) {
                return None;
            }
        }
        if let Some(sig) = info.methods.iter().find(|m| m.name == name && m.kind != MethodKind::New) {
            return Some(sig.subst(&b));
        }
        info.provides
            .iter()
            .find_map(|parent| self.find_method(&parent.subst(&b), name, seen))
    }
}

impl MethodLookup for DeclTable {
    fn lookup_method(&self, ty: &TypeExpr, name: &str) -> Option<MethodSig> {
        self.find_method(ty, name, &mut HashSet::new())
    }

    fn default_cap(&self, type_name: &str) -> Option<Capability> {
        self.decls.get(type_name).map(|d| d.cap)
    }

    fn field_type(&self, ty: &TypeExpr, field: &str) -> Option<TypeExpr> {
        let (info, b) = self.resolve(ty)?;
        info.fields.iter().find(|(n, _)| n == field).map(|(_, t)| t.subst(&b))
    }

    fn register(&mut self, decl: &TypeDecl) {
        let info = DeclInfo {
            cap: decl.default_cap(),
            type_params: decl.type_params.iter().map(|tp| tp.name.node.clone()).collect(),
            provides: decl.provides.clone(),
            fields: decl.fields.iter().map(|f| (f.name.node.clone(), f.ty.clone())).collect(),
            methods: decl.methods.iter().map(|m| MethodSig::from_method(&m.node)).collect(),
        };
        self.decls.insert(decl.name.node.clone(), info);
    }
}
