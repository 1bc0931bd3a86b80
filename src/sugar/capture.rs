use std::collections::HashSet;

use crate::ast::{CaptureSpec, Expr, Field};
use crate::diagnostics::{CompileError, ErrorKind};
use crate::scope::Scope;
use crate::span::Span;

/// One capture turned into a field of the generated declaration and the argument that
/// initializes it at the construction site.
#[derive(Debug, Clone)]
pub struct BuiltCapture {
    pub field: Field,
    pub arg: Expr,
}

/// Build fields and construction arguments for `captures`, in order.
///
/// Explicit initializers must already be resolved in `scope`; implicit captures read the
/// binding of the same name.
pub fn build(captures: Vec<CaptureSpec>, scope: &Scope, site: Span) -> Result<Vec<BuiltCapture>, CompileError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(captures.len());

    for spec in captures {
        let name = spec.name.node.clone();
        if !seen.insert(name.clone()) {
            return Err(CompileError::sugar(
                ErrorKind::DuplicateCapture,
                format!("'{name}' is captured more than once"),
                site,
            ));
        }

        let arg = match spec.init {
            Some(init) => init,
            None => scope.reference(&name, spec.name.span.or(site)).ok_or_else(|| {
                CompileError::sugar(
                    ErrorKind::UnresolvedCapture,
                    format!("cannot capture '{name}': no such local, parameter or field"),
                    site,
                )
            })?,
        };

        let ty = match spec.ty.or_else(|| arg.ty.clone()) {
            Some(ty) => ty,
            None => {
                return Err(CompileError::type_err(format!("cannot infer type of capture '{name}'"), site));
            }
        };

        out.push(BuiltCapture { field: Field { kind: spec.kind, name: spec.name, ty, init: None }, arg });
    }

    Ok(out)
}
