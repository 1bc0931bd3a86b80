use crate::ast::{APPLY, LambdaLit, Method, MethodKind, ObjectLit};
use crate::span::{Span, Spanned};

/// Rewrite a lambda literal as an object literal with a single `apply` method.
///
/// The lambda's capability becomes both the object's capability and `apply`'s receiver
/// capability; captures carry over unchanged and are built on the common object path.
pub fn expand(lit: LambdaLit, span: Span) -> ObjectLit {
    let apply = Method {
        kind: MethodKind::Fun,
        cap: lit.cap,
        name: Spanned::new(APPLY.to_string(), span),
        type_params: lit.type_params,
        params: lit.params,
        result: lit.result,
        raises: lit.raises,
        body: Some(lit.body),
        synthesized: false,
    };

    ObjectLit {
        cap: lit.cap,
        provides: Vec::new(),
        captures: lit.captures,
        methods: vec![Spanned::new(apply, span)],
    }
}
