use std::collections::HashMap;

use crate::ast::*;
use crate::cap::{Aliasing, Capability};
use crate::diagnostics::{CompileError, ErrorKind};
use crate::hygiene::Hygiene;
use crate::lookup::{MethodLookup, MethodSig};
use crate::pretty::pretty_expr;
use crate::scope::Scope;
use crate::span::{Span, Spanned};
use crate::types::bindings;

/// Reject receivers that are not a single stable reference. Runs before the receiver is
/// resolved, so a compound receiver is never evaluated.
pub fn check_receiver(app: &PartialApp, span: Span) -> Result<(), CompileError> {
    match &app.receiver.kind {
        ExprKind::Ident(_) | ExprKind::This => Ok(()),
        _ => Err(CompileError::sugar(
            ErrorKind::InvalidReceiverShape,
            format!(
                "partial application receiver must be a single reference, found {} `{}`",
                app.receiver.describe(),
                pretty_expr(&app.receiver)
            ),
            span,
        )),
    }
}

/// The nominal type methods are looked up on, and the capability the receiver actually has.
struct ReceiverView {
    lookup_ty: TypeExpr,
    cap: Capability,
}

fn receiver_view(
    recv_ty: &TypeExpr,
    method: &str,
    lookup: &dyn MethodLookup,
    scope: &Scope,
    span: Span,
) -> Result<ReceiverView, CompileError> {
    let nominal_cap = |ty: &TypeExpr| match ty {
        TypeExpr::Nominal { name, cap, .. } => {
            cap.or_else(|| lookup.default_cap(name)).unwrap_or(Capability::Ref)
        }
        _ => Capability::Ref,
    };
    match recv_ty {
        TypeExpr::Nominal { .. } => Ok(ReceiverView { lookup_ty: recv_ty.clone(), cap: nominal_cap(recv_ty) }),
        TypeExpr::Param { name, cap } => match scope.bound_of(name) {
            Some(bound) if matches!(bound, TypeExpr::Nominal { .. }) => Ok(ReceiverView {
                lookup_ty: bound.clone(),
                cap: cap.unwrap_or_else(|| nominal_cap(bound)),
            }),
            _ => Err(CompileError::sugar(
                ErrorKind::MethodNotFound,
                format!("type parameter '{name}' has no bound providing method '{method}'"),
                span,
            )),
        },
        TypeExpr::Tuple(_) => Err(not_found(recv_ty, method, span)),
    }
}

fn not_found(ty: &TypeExpr, method: &str, span: Span) -> CompileError {
    CompileError::sugar(ErrorKind::MethodNotFound, format!("type '{ty}' has no method '{method}'"), span)
}

/// Expand `receiver ~ method(args where name = value)` into a lambda literal.
///
/// The receiver must already be resolved (its `ty` filled in). The returned lambda captures the
/// receiver under a fresh synthetic name, then every supplied argument under its parameter's
/// name; its parameters are the parameters left unsupplied.
pub fn expand(
    app: PartialApp,
    span: Span,
    lookup: &dyn MethodLookup,
    scope: &Scope,
    hygiene: &mut Hygiene,
) -> Result<LambdaLit, CompileError> {
    let method = app.method.node.clone();
    let recv_ty = app.receiver.ty.clone().ok_or_else(|| {
        CompileError::type_err("cannot resolve the type of the partial application receiver", span)
    })?;

    let view = receiver_view(&recv_ty, &method, lookup, scope, span)?;
    let sig = lookup
        .lookup_method(&view.lookup_ty, &method)
        .ok_or_else(|| not_found(&recv_ty, &method, span))?;

    if !lookup.cap_satisfies(view.cap, sig.receiver_cap) {
        return Err(CompileError::sugar(
            ErrorKind::CapabilityMismatch,
            format!(
                "receiver capability '{}' does not satisfy '{}' required by method '{method}'",
                view.cap, sig.receiver_cap
            ),
            span,
        ));
    }

    let (sig, type_params, forwarded) = apply_type_args(sig, app.type_args, span)?;

    // Supplied values indexed by parameter position, plus the order they were written in.
    let mut supplied: Vec<Option<Expr>> = vec![None; sig.params.len()];
    let mut written = Vec::new();
    for (i, arg) in app.args.into_iter().enumerate() {
        if i >= sig.params.len() {
            return Err(CompileError::sugar(
                ErrorKind::TooManyArguments,
                format!(
                    "method '{method}' takes {} parameters but {} arguments were supplied",
                    sig.params.len(),
                    i + 1
                ),
                span,
            ));
        }
        supplied[i] = Some(arg);
        written.push(i);
    }
    for named in app.named {
        let Some(i) = sig.param_index(&named.name.node) else {
            return Err(CompileError::sugar(
                ErrorKind::UnknownNamedArgument,
                format!("method '{method}' has no parameter named '{}'", named.name.node),
                span,
            ));
        };
        if supplied[i].is_some() {
            return Err(CompileError::sugar(
                ErrorKind::DuplicateArgument,
                format!("parameter '{}' of method '{method}' is supplied more than once", named.name.node),
                span,
            ));
        }
        supplied[i] = Some(named.value);
        written.push(i);
    }

    let recv_name = hygiene.next();
    let mut captures = vec![CaptureSpec {
        kind: FieldKind::Let,
        name: Spanned::new(recv_name.clone(), span),
        init: Some(app.receiver),
        ty: Some(recv_ty.with_cap(sig.receiver_cap)),
    }];
    for &i in &written {
        let param = &sig.params[i];
        captures.push(CaptureSpec {
            kind: FieldKind::Let,
            name: Spanned::new(param.name.node.clone(), span),
            init: supplied[i].take(),
            ty: Some(param.ty.clone()),
        });
    }

    let mut params = Vec::new();
    let mut call_args = Vec::with_capacity(sig.params.len());
    for (i, param) in sig.params.iter().enumerate() {
        let arg = Expr::new(ExprKind::Ident(param.name.node.clone()), span);
        let is_supplied = written.contains(&i);
        if is_supplied && param.aliasing() != Aliasing::Unique {
            call_args.push(arg);
        } else {
            call_args.push(Expr::new(ExprKind::Consume(Box::new(arg)), span));
        }
        if !is_supplied {
            params.push(param.clone());
        }
    }

    let body = Expr::new(
        ExprKind::MethodCall {
            receiver: Box::new(Expr::new(ExprKind::Ident(recv_name), span)),
            method: method.clone(),
            type_args: forwarded,
            args: call_args,
            named: Vec::new(),
        },
        span,
    );

    // Sending a message yields the receiver itself, opaquely.
    let (cap, result) = match sig.kind {
        MethodKind::Be => (Capability::Box, Some(recv_ty.with_cap(Capability::Tag))),
        _ => (sig.receiver_cap, sig.result.clone()),
    };

    Ok(LambdaLit { cap: Some(cap), type_params, params, captures, result, raises: sig.raises, body })
}

/// Substitute explicit method type arguments into the signature. Without explicit arguments a
/// generic method keeps its type parameters, which move onto the generated `apply` and are
/// forwarded to the wrapped call.
fn apply_type_args(
    sig: MethodSig,
    type_args: Vec<TypeExpr>,
    span: Span,
) -> Result<(MethodSig, Vec<TypeParam>, Vec<TypeExpr>), CompileError> {
    if type_args.is_empty() {
        let forwarded = sig.type_params.iter().map(|tp| TypeExpr::param(tp.name.node.clone())).collect();
        let type_params = sig.type_params.clone();
        return Ok((sig, type_params, forwarded));
    }
    if type_args.len() != sig.type_params.len() {
        return Err(CompileError::type_err(
            format!(
                "method '{}' expects {} type arguments but {} were supplied",
                sig.name,
                sig.type_params.len(),
                type_args.len()
            ),
            span,
        ));
    }
    let names: Vec<String> = sig.type_params.iter().map(|tp| tp.name.node.clone()).collect();
    let b: HashMap<String, TypeExpr> = bindings(&names, &type_args);
    Ok((sig.subst(&b), Vec::new(), type_args))
}
