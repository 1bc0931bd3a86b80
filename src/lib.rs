pub mod span;
pub mod diagnostics;
pub mod cap;
pub mod ast;
pub mod types;
pub mod hygiene;
pub mod lookup;
pub mod scope;
pub mod sugar;
pub mod expr;
pub mod pretty;
pub mod config;

use ast::Program;
use diagnostics::{CompileError, Diagnostics};
use lookup::DeclTable;
use sugar::SugarCtx;

/// Expand partial applications, lambdas and object literals in `program` with a fresh
/// compilation context. Hoisted declarations are appended to `program.decls`.
pub fn desugar(program: &mut Program) -> Result<(), CompileError> {
    let mut ctx = SugarCtx::new();
    desugar_with(program, &mut ctx)
}

/// Like [`desugar`], reusing `ctx` so callers can inspect the generated declarations and keep
/// the hygiene counter running across units. A unit with errors gets no hoisted declarations.
pub fn desugar_with(program: &mut Program, ctx: &mut SugarCtx) -> Result<(), CompileError> {
    let mut table = DeclTable::from_program(program);
    let mut diags = Diagnostics::new();
    let first_hoisted = ctx.registry.hoisted.len();
    expr::run(program, &mut table, ctx, &mut diags);
    if diags.is_empty() {
        program.decls.extend(ctx.registry.hoisted[first_hoisted..].iter().cloned());
    }
    diags.finish()
}

/// Read a JSON-encoded program.
pub fn parse_program(json: &str) -> Result<Program, CompileError> {
    serde_json::from_str(json).map_err(|e| CompileError::input(format!("invalid program: {e}")))
}
