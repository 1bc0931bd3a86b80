use crate::ast::*;
use crate::lookup::MethodLookup;
use crate::span::{Span, Spanned};
use crate::sugar::Registry;

/// The enclosing type parameters a literal's fields depend on: every parameter a field type
/// mentions, closed over the bounds of those parameters, in the enclosing binding order.
pub fn referenced_params(fields: &[Field], enclosing: &[TypeParam]) -> Vec<TypeParam> {
    let mut wanted: Vec<String> = Vec::new();
    let mut pending: Vec<String> = fields.iter().flat_map(|f| f.ty.type_params()).collect();

    while let Some(name) = pending.pop() {
        if wanted.contains(&name) {
            continue;
        }
        let Some(tp) = enclosing.iter().find(|tp| tp.name.node == name) else {
            continue;
        };
        if let Some(bound) = &tp.bound {
            pending.extend(bound.type_params());
        }
        wanted.push(name);
    }

    enclosing.iter().filter(|tp| wanted.contains(&tp.name.node)).cloned().collect()
}

/// `new create(f1: T1, ..) => this.f1 = consume f1; ..`, one like-named parameter per field.
pub fn constructor(decl: &TypeDecl, span: Span) -> Method {
    let mut assigns = Vec::with_capacity(decl.fields.len());
    let mut params = Vec::with_capacity(decl.fields.len());
    for field in &decl.fields {
        let name = field.name.node.clone();
        let target = Expr::new(
            ExprKind::FieldAccess { object: Box::new(Expr::new(ExprKind::This, span)), field: name.clone() },
            span,
        )
        .typed(field.ty.clone());
        let value = Expr::new(
            ExprKind::Consume(Box::new(Expr::new(ExprKind::Ident(name.clone()), span).typed(field.ty.clone()))),
            span,
        )
        .typed(field.ty.clone());
        assigns.push(Expr::new(ExprKind::Assign { target: Box::new(target), value: Box::new(value) }, span));
        params.push(Param { name: Spanned::new(name, span), ty: field.ty.clone(), default: None });
    }

    Method {
        kind: MethodKind::New,
        cap: decl.cap,
        name: Spanned::new(CREATE.to_string(), span),
        type_params: Vec::new(),
        params,
        result: None,
        raises: false,
        body: Some(Expr::new(ExprKind::Seq(assigns), span)),
        synthesized: true,
    }
}

/// Finish a generated declaration and produce the expression that replaces the literal.
///
/// A declaration that carries type parameters closes over the enclosing generics and is
/// promoted to the top level; any other stays inline at its use site. Either way it is
/// registered with `lookup` before the site is rewritten.
pub fn finish(
    mut decl: TypeDecl,
    args: Vec<Expr>,
    registry: &mut Registry,
    lookup: &mut dyn MethodLookup,
    span: Span,
) -> Expr {
    let ctor = constructor(&decl, span);
    decl.methods.push(Spanned::new(ctor, span));
    let cap = decl.default_cap();

    if decl.type_params.is_empty() {
        decl.kind = DeclKind::Object;
        decl.origin = DeclOrigin::Anonymous;
        lookup.register(&decl);
        registry.record(decl.name.node.clone(), DeclOrigin::Anonymous);
        let ty = decl.self_type().with_cap(cap);
        return Expr::new(ExprKind::ObjectInit { decl: Box::new(decl), args }, span).typed(ty);
    }

    let has_behaviours = decl.methods.iter().any(|m| m.node.kind == MethodKind::Be);
    decl.kind = if has_behaviours { DeclKind::Actor } else { DeclKind::Class };
    decl.origin = DeclOrigin::Hoisted;
    lookup.register(&decl);
    let ty = decl.self_type();
    registry.hoist(Spanned::new(decl, span));
    Expr::new(ExprKind::Construct { ty: ty.clone(), ctor: CREATE.to_string(), args }, span).typed(ty.with_cap(cap))
}
