//! Depth-first, type-directed traversal of method bodies and field initializers.
//!
//! Resolves identifiers against the lexical scope (bare field names become `this.name`), fills
//! in expression types where they follow from declarations, and hands every sugar node to its
//! expander. Expansion output is never re-visited.

use crate::ast::*;
use crate::cap::Capability;
use crate::diagnostics::{CompileError, Diagnostics, ErrorKind};
use crate::lookup::MethodLookup;
use crate::scope::{BindingKind, Scope};
use crate::span::{Span, Spanned};
use crate::sugar::{Sugar, SugarCtx, capture, hoist, lambda, partial};
use crate::types::bindings;

pub struct ExprPass<'a> {
    lookup: &'a mut dyn MethodLookup,
    ctx: &'a mut SugarCtx,
    diags: &'a mut Diagnostics,
    scope: Scope,
}

/// Rewrite every source declaration of `program` in place. Errors are reported to `diags`;
/// a sugar node that fails to expand is left exactly as written. Generated declarations are
/// registered with `lookup` as they are completed.
pub fn run(program: &mut Program, lookup: &mut dyn MethodLookup, ctx: &mut SugarCtx, diags: &mut Diagnostics) {
    let mut pass = ExprPass { lookup, ctx, diags, scope: Scope::new() };
    for decl in &mut program.decls {
        if decl.node.origin == DeclOrigin::Source {
            pass.visit_decl(&mut decl.node);
        }
    }
}

struct FieldBinding {
    name: String,
    ty: TypeExpr,
    mutable: bool,
}

fn field_bindings(fields: &[Field]) -> Vec<FieldBinding> {
    fields
        .iter()
        .map(|f| FieldBinding { name: f.name.node.clone(), ty: f.ty.clone(), mutable: f.kind == FieldKind::Var })
        .collect()
}

fn decl_scope(this_ty: TypeExpr, type_params: Vec<TypeParam>, fields: &[FieldBinding]) -> Scope {
    let mut scope = Scope::for_decl(this_ty, type_params);
    for f in fields {
        scope.define(f.name.clone(), f.ty.clone(), BindingKind::Field { mutable: f.mutable });
    }
    scope
}

impl<'a> ExprPass<'a> {
    fn visit_decl(&mut self, decl: &mut TypeDecl) {
        let self_ty = decl.self_type();
        let type_params = decl.type_params.clone();
        let fields = field_bindings(&decl.fields);

        for field in &mut decl.fields {
            let Some(init) = &mut field.init else { continue };
            let scope = decl_scope(self_ty.with_cap(Capability::Ref), type_params.clone(), &fields);
            let outer = std::mem::replace(&mut self.scope, scope);
            let result = self.visit(init);
            self.scope = outer;
            if let Err(e) = result {
                self.diags.report(e);
            }
        }

        for method in &mut decl.methods {
            if let Err(e) = self.visit_method(&mut method.node, &self_ty, &type_params, &fields) {
                self.diags.report(e);
            }
        }
    }

    /// Visit a method body in its own scope: the declaration's fields, then the parameters.
    /// Parameter defaults belong to call sites and are not visited.
    fn visit_method(
        &mut self,
        method: &mut Method,
        self_ty: &TypeExpr,
        enclosing: &[TypeParam],
        fields: &[FieldBinding],
    ) -> Result<(), CompileError> {
        let this_cap = method.receiver_cap();
        let Some(body) = &mut method.body else {
            return Ok(());
        };
        let mut type_params = enclosing.to_vec();
        type_params.extend(method.type_params.iter().cloned());

        let mut scope = decl_scope(self_ty.with_cap(this_cap), type_params, fields);
        scope.push();
        for p in &method.params {
            scope.define(p.name.node.clone(), p.ty.clone(), BindingKind::Param);
        }

        let outer = std::mem::replace(&mut self.scope, scope);
        let result = self.visit(body);
        self.scope = outer;
        result
    }

    pub fn visit(&mut self, expr: &mut Expr) -> Result<(), CompileError> {
        let span = expr.span;
        if let Some(sugar) = Sugar::take(expr) {
            let written = sugar.clone();
            match self.expand(sugar, span) {
                Ok(expanded) => *expr = expanded,
                Err(e) => {
                    expr.kind = written.into_kind();
                    return Err(e);
                }
            }
            return Ok(());
        }

        if let ExprKind::Ident(name) = &expr.kind {
            let name = name.clone();
            *expr = self.scope.reference(&name, span).ok_or_else(|| {
                CompileError::sugar(ErrorKind::UnresolvedReference, format!("unknown name '{name}'"), span)
            })?;
            return Ok(());
        }

        let ty = match &mut expr.kind {
            ExprKind::This => self.scope.this_ty.clone(),
            ExprKind::Literal(lit) => match lit {
                Literal::Bool(_) => Some(TypeExpr::nominal("Bool").with_cap(Capability::Val)),
                Literal::Str(_) => Some(TypeExpr::nominal("String").with_cap(Capability::Val)),
                Literal::None => Some(TypeExpr::nominal("None").with_cap(Capability::Val)),
                Literal::Int(_) | Literal::Float(_) => None,
            },
            ExprKind::FieldAccess { object, field } => {
                self.visit(object)?;
                object.ty.as_ref().and_then(|t| self.lookup.field_type(t, field))
            }
            ExprKind::MethodCall { receiver, method, type_args, args, named } => {
                self.visit(receiver)?;
                for a in args.iter_mut() {
                    self.visit(a)?;
                }
                for n in named.iter_mut() {
                    self.visit(&mut n.value)?;
                }
                receiver.ty.as_ref().and_then(|t| self.call_result(t, method, type_args))
            }
            ExprKind::Tuple(items) => {
                for item in items.iter_mut() {
                    self.visit(item)?;
                }
                items.iter().map(|i| i.ty.clone()).collect::<Option<Vec<_>>>().map(TypeExpr::Tuple)
            }
            ExprKind::Seq(items) => {
                self.scope.push();
                for item in items.iter_mut() {
                    if let Err(e) = self.visit(item) {
                        self.diags.report(e);
                    }
                }
                self.scope.pop();
                items.last().and_then(|i| i.ty.clone())
            }
            ExprKind::Let { mutable, name, ty, value } => {
                let visited = self.visit(value);
                let binding_ty = ty.clone().or_else(|| value.ty.clone());
                if let Some(t) = &binding_ty {
                    self.scope.define(name.clone(), t.clone(), BindingKind::Local { mutable: *mutable });
                }
                visited?;
                if binding_ty.is_none() {
                    return Err(CompileError::type_err(format!("cannot infer type of '{name}'"), span));
                }
                binding_ty
            }
            ExprKind::Assign { target, value } => {
                self.visit(target)?;
                self.visit(value)?;
                target.ty.clone()
            }
            ExprKind::Consume(inner) => {
                self.visit(inner)?;
                inner.ty.clone()
            }
            ExprKind::Construct { args, .. } | ExprKind::ObjectInit { args, .. } => {
                for a in args.iter_mut() {
                    self.visit(a)?;
                }
                None
            }
            ExprKind::Error => None,
            ExprKind::Ident(_) | ExprKind::Partial(_) | ExprKind::Lambda(_) | ExprKind::Object(_) => None,
        };

        if ty.is_some() {
            expr.ty = ty;
        }
        Ok(())
    }

    fn call_result(&self, recv_ty: &TypeExpr, method: &str, type_args: &[TypeExpr]) -> Option<TypeExpr> {
        let lookup_ty = match recv_ty {
            TypeExpr::Param { name, .. } => self.scope.bound_of(name)?.clone(),
            other => other.clone(),
        };
        let sig = self.lookup.lookup_method(&lookup_ty, method)?;
        let result = sig.result?;
        if !type_args.is_empty() && type_args.len() == sig.type_params.len() {
            let names: Vec<String> = sig.type_params.iter().map(|tp| tp.name.node.clone()).collect();
            return Some(result.subst(&bindings(&names, type_args)));
        }
        Some(result)
    }

    fn expand(&mut self, sugar: Sugar, span: Span) -> Result<Expr, CompileError> {
        match sugar {
            Sugar::Partial(app) => {
                let mut app = *app;
                partial::check_receiver(&app, span)?;
                self.visit(&mut app.receiver)?;
                let lit = partial::expand(app, span, &*self.lookup, &self.scope, &mut self.ctx.hygiene)?;
                self.expand(Sugar::Lambda(Box::new(lit)), span)
            }
            Sugar::Lambda(lit) => {
                let obj = lambda::expand(*lit, span);
                self.expand(Sugar::Object(Box::new(obj)), span)
            }
            Sugar::Object(lit) => self.object(*lit, span),
        }
    }

    /// Build the declaration for an object literal and the expression instantiating it.
    fn object(&mut self, lit: ObjectLit, span: Span) -> Result<Expr, CompileError> {
        let ObjectLit { cap, provides, mut captures, methods } = lit;

        // Initializers run where the literal is written.
        for c in &mut captures {
            if let Some(init) = &mut c.init {
                self.visit(init)?;
            }
        }
        let built = capture::build(captures, &self.scope, span)?;
        let (fields, args): (Vec<Field>, Vec<Expr>) = built.into_iter().map(|b| (b.field, b.arg)).unzip();

        let enclosing = self.scope.type_params.clone();
        let mut decl = TypeDecl {
            kind: DeclKind::Object,
            name: Spanned::new(self.ctx.hygiene.next(), span),
            type_params: hoist::referenced_params(&fields, &enclosing),
            cap,
            provides,
            fields,
            methods,
            origin: DeclOrigin::Anonymous,
        };

        // Method bodies see the generated fields, never the outer locals.
        let self_ty = decl.self_type();
        let field_scope = field_bindings(&decl.fields);
        for method in &mut decl.methods {
            self.visit_method(&mut method.node, &self_ty, &enclosing, &field_scope)?;
        }

        Ok(hoist::finish(decl, args, &mut self.ctx.registry, &mut *self.lookup, span))
    }
}
