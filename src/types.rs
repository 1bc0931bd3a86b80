use std::collections::HashMap;
use std::fmt;

use crate::ast::TypeExpr;
use crate::cap::Capability;

impl TypeExpr {
    pub fn nominal(name: impl Into<String>) -> Self {
        TypeExpr::Nominal { name: name.into(), args: Vec::new(), cap: None }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Nominal { name: name.into(), args, cap: None }
    }

    pub fn param(name: impl Into<String>) -> Self {
        TypeExpr::Param { name: name.into(), cap: None }
    }

    /// The explicitly written capability, if any.
    pub fn cap(&self) -> Option<Capability> {
        match self {
            TypeExpr::Nominal { cap, .. } | TypeExpr::Param { cap, .. } => *cap,
            TypeExpr::Tuple(_) => None,
        }
    }

    /// The same type re-qualified with `cap`. Tuples carry no capability of their own.
    pub fn with_cap(&self, new_cap: Capability) -> TypeExpr {
        match self {
            TypeExpr::Nominal { name, args, .. } => {
                TypeExpr::Nominal { name: name.clone(), args: args.clone(), cap: Some(new_cap) }
            }
            TypeExpr::Param { name, .. } => TypeExpr::Param { name: name.clone(), cap: Some(new_cap) },
            TypeExpr::Tuple(_) => self.clone(),
        }
    }

    /// Recursively transform all inner types via `f`, rebuilding the structure.
    pub fn map_inner_types(&self, f: &impl Fn(&TypeExpr) -> TypeExpr) -> TypeExpr {
        match self {
            TypeExpr::Nominal { name, args, cap } => TypeExpr::Nominal {
                name: name.clone(),
                args: args.iter().map(f).collect(),
                cap: *cap,
            },
            TypeExpr::Tuple(elems) => TypeExpr::Tuple(elems.iter().map(f).collect()),
            TypeExpr::Param { .. } => self.clone(),
        }
    }

    /// Replace type parameters by the types bound to them. A capability written on the
    /// parameter use overrides the one carried by the replacement.
    pub fn subst(&self, bindings: &HashMap<String, TypeExpr>) -> TypeExpr {
        match self {
            TypeExpr::Param { name, cap } => match bindings.get(name) {
                Some(replacement) => match cap {
                    Some(c) => replacement.with_cap(*c),
                    None => replacement.clone(),
                },
                None => self.clone(),
            },
            _ => self.map_inner_types(&|t| t.subst(bindings)),
        }
    }

    /// Names of every type parameter mentioned anywhere in the type, in first-use order.
    pub fn type_params(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_type_params(&mut out);
        out
    }

    fn collect_type_params(&self, out: &mut Vec<String>) {
        match self {
            TypeExpr::Param { name, .. } => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            TypeExpr::Nominal { args, .. } => {
                for a in args {
                    a.collect_type_params(out);
                }
            }
            TypeExpr::Tuple(elems) => {
                for e in elems {
                    e.collect_type_params(out);
                }
            }
        }
    }
}

/// Bind each name in `params` to the type at the same position in `args`.
pub fn bindings(params: &[String], args: &[TypeExpr]) -> HashMap<String, TypeExpr> {
    params.iter().cloned().zip(args.iter().cloned()).collect()
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Nominal { name, args, cap } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "[")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 { write!(f, ", ")?; }
                        write!(f, "{a}")?;
                    }
                    write!(f, "]")?;
                }
                if let Some(c) = cap {
                    write!(f, " {c}")?;
                }
                Ok(())
            }
            TypeExpr::Param { name, cap } => {
                write!(f, "{name}")?;
                if let Some(c) = cap {
                    write!(f, " {c}")?;
                }
                Ok(())
            }
            TypeExpr::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
        }
    }
}
