// Property tests for partial application.
//
// For any method signature and any legal selection of supplied arguments:
// 1. The supplied and remaining parameters partition the signature.
// 2. Remaining parameters keep declaration order on `apply`.
// 3. Captured fields follow the written order, receiver first.
// 4. Expansion is deterministic.

use proptest::prelude::*;

use capsule::ast::*;
use capsule::pretty::pretty_print;
use capsule::span::Spanned;

/// Parameter count, how many leading parameters are passed positionally, and the named
/// parameters in the order they are written.
#[derive(Debug, Clone)]
struct Selection {
    arity: usize,
    positional: usize,
    named: Vec<usize>,
}

fn arb_selection() -> impl Strategy<Value = Selection> {
    (1..7usize)
        .prop_flat_map(|arity| (Just(arity), 0..=arity))
        .prop_flat_map(|(arity, positional)| {
            let rest = arity - positional;
            (Just(arity), Just(positional), prop::collection::vec(any::<bool>(), rest))
        })
        .prop_flat_map(|(arity, positional, picks)| {
            let named: Vec<usize> =
                picks.iter().enumerate().filter(|&(_, &p)| p).map(|(i, _)| positional + i).collect();
            (Just(arity), Just(positional), Just(named).prop_shuffle())
        })
        .prop_map(|(arity, positional, named)| Selection { arity, positional, named })
}

fn param_name(i: usize) -> String {
    format!("p{i}")
}

fn build(sel: &Selection) -> Program {
    let mut f = Method::fun("f");
    for i in 0..sel.arity {
        f = f.with_param(Param::new(param_name(i), TypeExpr::nominal("U32")));
    }
    let t = TypeDecl::trait_("T").with_method(f);

    let mut app = PartialApp::new(Expr::ident("t"), "f");
    for i in 0..sel.positional {
        app = app.arg(Expr::int(i as i64));
    }
    for &i in &sel.named {
        app = app.named(param_name(i), Expr::int(i as i64));
    }
    let caller = TypeDecl::class("Foo").with_method(
        Method::fun("g").with_param(Param::new("t", TypeExpr::nominal("T"))).with_body(Expr::partial(app)),
    );
    Program { decls: vec![Spanned::dummy(t), Spanned::dummy(caller)] }
}

fn expand(sel: &Selection) -> Program {
    let mut program = build(sel);
    capsule::desugar(&mut program).unwrap_or_else(|e| panic!("{sel:?} failed: {e}"));
    program
}

fn generated(program: &Program) -> (&TypeDecl, &[Expr]) {
    let body = program.decl("Foo").and_then(|d| d.method("g")).and_then(|m| m.body.as_ref()).unwrap();
    match &body.kind {
        ExprKind::ObjectInit { decl, args } => (decl, args),
        other => panic!("expected an inline object, got {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn supplied_and_remaining_partition_the_signature(sel in arb_selection()) {
        let program = expand(&sel);
        let (decl, _) = generated(&program);
        let apply = decl.method(APPLY).unwrap();

        let mut seen: Vec<String> = decl.fields.iter().skip(1).map(|f| f.name.node.clone()).collect();
        seen.extend(apply.params.iter().map(|p| p.name.node.clone()));
        seen.sort();
        let mut all: Vec<String> = (0..sel.arity).map(param_name).collect();
        all.sort();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn remaining_parameters_keep_declaration_order(sel in arb_selection()) {
        let program = expand(&sel);
        let (decl, _) = generated(&program);
        let apply = decl.method(APPLY).unwrap();

        let expected: Vec<String> = (sel.positional..sel.arity)
            .filter(|i| !sel.named.contains(i))
            .map(param_name)
            .collect();
        let actual: Vec<String> = apply.params.iter().map(|p| p.name.node.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn captures_follow_written_order(sel in arb_selection()) {
        let program = expand(&sel);
        let (decl, args) = generated(&program);

        let mut expected: Vec<String> = (0..sel.positional).map(param_name).collect();
        expected.extend(sel.named.iter().map(|&i| param_name(i)));
        let actual: Vec<String> = decl.fields.iter().skip(1).map(|f| f.name.node.clone()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(args.len(), decl.fields.len());
        prop_assert!(matches!(&args[0].kind, ExprKind::Ident(n) if n == "t"));
    }

    #[test]
    fn expansion_is_deterministic(sel in arb_selection()) {
        prop_assert_eq!(pretty_print(&expand(&sel)), pretty_print(&expand(&sel)));
    }
}
