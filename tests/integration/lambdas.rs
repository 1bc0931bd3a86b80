mod common;

use capsule::ast::*;
use capsule::cap::Capability;
use capsule::diagnostics::ErrorKind;
use common::*;

fn apply() -> Method {
    Method::fun("apply")
}

#[test]
fn lambda_minimal() {
    let short = program(vec![foo(vec![], Expr::lambda(LambdaLit::new(Expr::none())))]);
    let full = program(vec![foo(vec![], Expr::object(ObjectLit::new().with_method(apply().with_body(Expr::none()))))]);
    assert_equiv(short, full);
}

#[test]
fn lambda_full() {
    let traits = || {
        vec![
            TypeDecl::trait_("A"),
            TypeDecl::trait_("B"),
            TypeDecl::trait_("C"),
            TypeDecl::trait_("D"),
            TypeDecl::trait_("D2").provides(ty("D")),
        ]
    };
    let params = || vec![Param::new("c", ty_cap("C", Capability::Val)), Param::new("d", ty_cap("D2", Capability::Val))];

    let mut lit = lambda(
        Some(Capability::Iso),
        vec![Param::new("a", ty("A")), Param::new("b", ty("B"))],
        vec![
            CaptureSpec::implicit("c"),
            CaptureSpec::bound("_c", Expr::ident("c")),
            CaptureSpec::bound("_d", Expr::ident("d")).typed(ty_cap("D", Capability::Val)),
        ],
        Expr::ident("a"),
    );
    lit.result = Some(ty("A"));
    let mut short = traits();
    short.push(foo(params(), Expr::lambda(lit)));

    let object = ObjectLit {
        cap: Some(Capability::Iso),
        provides: vec![],
        captures: vec![
            CaptureSpec::bound("c", Expr::ident("c")).typed(ty_cap("C", Capability::Val)),
            CaptureSpec::bound("_c", Expr::ident("c")).typed(ty_cap("C", Capability::Val)),
            CaptureSpec::bound("_d", Expr::ident("d")).typed(ty_cap("D", Capability::Val)),
        ],
        methods: vec![],
    }
    .with_method(
        apply()
            .with_cap(Capability::Iso)
            .with_param(Param::new("a", ty("A")))
            .with_param(Param::new("b", ty("B")))
            .returns(ty("A"))
            .with_body(Expr::ident("a")),
    );
    let mut full = traits();
    full.push(foo(params(), Expr::object(object)));

    assert_equiv(program(short), program(full));
}

#[test]
fn lambda_throw() {
    let mut lit = LambdaLit::new(Expr::error());
    lit.raises = true;
    let short = program(vec![foo(vec![], Expr::lambda(lit))]);
    let full = program(vec![foo(
        vec![],
        Expr::object(ObjectLit::new().with_method(apply().raising().with_body(Expr::error()))),
    )]);
    assert_equiv(short, full);
}

#[test]
fn lambda_with_type_args() {
    let mut lit = LambdaLit::new(Expr::none());
    lit.type_params.push(TypeParam::new("A", Some(ty("T"))));
    let short = program(vec![TypeDecl::trait_("T"), foo(vec![], Expr::lambda(lit))]);
    let full = program(vec![
        TypeDecl::trait_("T"),
        foo(
            vec![],
            Expr::object(ObjectLit::new().with_method(apply().with_type_param("A", Some(ty("T"))).with_body(Expr::none()))),
        ),
    ]);
    assert_equiv(short, full);
}

fn capture_local(mutable: bool) -> (Program, Program) {
    let local = |value: Expr| {
        if mutable {
            Expr::var("x", Some(u32()), value)
        } else {
            Expr::let_("x", Some(u32()), value)
        }
    };
    let short = program(vec![foo(
        vec![],
        Expr::seq(vec![
            local(Expr::int(4)),
            Expr::lambda(lambda(None, vec![], vec![CaptureSpec::implicit("x")], Expr::none())),
        ]),
    )]);
    let full = program(vec![foo(
        vec![],
        Expr::seq(vec![
            local(Expr::int(4)),
            Expr::object(
                ObjectLit::new()
                    .with_capture(CaptureSpec::bound("x", Expr::ident("x")).typed(u32()))
                    .with_method(apply().with_body(Expr::none())),
            ),
        ]),
    )]);
    (short, full)
}

#[test]
fn lambda_capture_local_let() {
    let (short, full) = capture_local(false);
    assert_equiv(short, full);
}

#[test]
fn lambda_capture_local_var() {
    let (short, full) = capture_local(true);
    assert_equiv(short, full);
}

#[test]
fn lambda_capture_parameter() {
    let short = program(vec![foo(
        vec![Param::new("x", u32())],
        Expr::lambda(lambda(None, vec![], vec![CaptureSpec::implicit("x")], Expr::none())),
    )]);
    let full = program(vec![foo(
        vec![Param::new("x", u32())],
        Expr::object(
            ObjectLit::new()
                .with_capture(CaptureSpec::bound("x", Expr::ident("x")).typed(u32()))
                .with_method(apply().with_body(Expr::none())),
        ),
    )]);
    assert_equiv(short, full);
}

fn capture_field(field: Field) -> (Program, Program) {
    let short = TypeDecl::class("Foo").with_field(field.clone()).with_method(
        Method::fun("f").with_body(Expr::lambda(lambda(None, vec![], vec![CaptureSpec::implicit("x")], Expr::none()))),
    );
    let full = TypeDecl::class("Foo").with_field(field).with_method(
        Method::fun("f").with_body(Expr::object(
            ObjectLit::new()
                .with_capture(CaptureSpec::bound("x", Expr::ident("x")).typed(u32()))
                .with_method(apply().with_body(Expr::none())),
        )),
    );
    (program(vec![short]), program(vec![full]))
}

#[test]
fn lambda_capture_field_let() {
    let (short, full) = capture_field(Field::let_("x", u32()).with_init(Expr::int(4)));
    assert_equiv(short, full);
}

#[test]
fn lambda_capture_field_var() {
    let (short, full) = capture_field(Field::var("x", u32()).with_init(Expr::int(4)));
    assert_equiv(short, full);
}

#[test]
fn captured_field_is_read_through_this() {
    let (short, _) = capture_field(Field::let_("x", u32()));
    let (desugared, _) = desugar(short);
    let body = desugared.decl("Foo").and_then(|d| d.method("f")).and_then(|m| m.body.as_ref()).unwrap();
    let ExprKind::ObjectInit { args, .. } = &body.kind else {
        panic!("expected an inline object, got {body:?}");
    };
    assert!(matches!(&args[0].kind, ExprKind::FieldAccess { object, field }
        if field == "x" && matches!(object.kind, ExprKind::This)));
}

#[test]
fn lambda_body_sees_captures_as_fields() {
    let short = program(vec![foo(
        vec![Param::new("x", u32())],
        Expr::lambda(lambda(None, vec![], vec![CaptureSpec::implicit("x")], Expr::ident("x"))),
    )]);
    let (desugared, _) = desugar(short);
    let body = desugared.decl("Foo").and_then(|d| d.method("f")).and_then(|m| m.body.as_ref()).unwrap();
    let ExprKind::ObjectInit { decl, .. } = &body.kind else {
        panic!("expected an inline object");
    };
    let apply_body = decl.method("apply").and_then(|m| m.body.as_ref()).unwrap();
    assert!(matches!(&apply_body.kind, ExprKind::FieldAccess { field, .. } if field == "x"));
    assert_eq!(apply_body.ty, Some(u32()));
}

#[test]
fn lambda_preserves_signature() {
    let mut lit = lambda(
        Some(Capability::Val),
        vec![Param::new("a", u32()).with_default(Expr::int(7)), Param::new("b", ty("String"))],
        vec![],
        Expr::ident("a"),
    );
    lit.type_params.push(TypeParam::new("Q", None));
    lit.result = Some(u32());
    lit.raises = true;
    let (desugared, ctx) = desugar(program(vec![foo(vec![], Expr::lambda(lit))]));

    let body = desugared.decl("Foo").and_then(|d| d.method("f")).and_then(|m| m.body.as_ref()).unwrap();
    let ExprKind::ObjectInit { decl, args } = &body.kind else {
        panic!("expected an inline object");
    };
    assert!(args.is_empty());
    assert!(decl.fields.is_empty());
    assert_eq!(decl.origin, DeclOrigin::Anonymous);
    let apply = decl.method("apply").unwrap();
    assert_eq!(apply.cap, Some(Capability::Val));
    assert_eq!(apply.type_params, vec![TypeParam::new("Q", None)]);
    let params: Vec<_> = apply.params.iter().map(|p| (p.name.node.as_str(), p.default.is_some())).collect();
    assert_eq!(params, [("a", true), ("b", false)]);
    assert_eq!(apply.result, Some(u32()));
    assert!(apply.raises);
    assert_eq!(ctx.registry.generated, vec![("$1".to_string(), DeclOrigin::Anonymous)]);
}

#[test]
fn empty_lambda_still_generates_a_declaration() {
    let (_, ctx) = desugar(program(vec![foo(vec![], Expr::lambda(LambdaLit::new(Expr::none())))]));
    assert_eq!(ctx.registry.len(), 1);
}

#[test]
fn nested_lambdas_get_distinct_names() {
    let inner = Expr::lambda(LambdaLit::new(Expr::none()));
    let outer = Expr::lambda(LambdaLit::new(inner));
    let (_, ctx) = desugar(program(vec![foo(vec![], outer)]));
    let names: Vec<_> = ctx.registry.generated.iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
}

#[test]
fn capture_of_unknown_name_fails() {
    let short = program(vec![foo(
        vec![],
        Expr::lambda(lambda(None, vec![], vec![CaptureSpec::implicit("nope")], Expr::none())),
    )]);
    let (err, ctx) = desugar_err(short);
    assert_eq!(err.kind(), Some(ErrorKind::UnresolvedCapture));
    assert!(ctx.registry.is_empty());
}

#[test]
fn uncaptured_outer_local_is_not_visible() {
    let short = program(vec![foo(
        vec![Param::new("x", u32())],
        Expr::lambda(LambdaLit::new(Expr::ident("x"))),
    )]);
    let (err, _) = desugar_err(short);
    assert_eq!(err.kind(), Some(ErrorKind::UnresolvedReference));
}

#[test]
fn capture_is_taken_by_value_at_construction() {
    // `var x = 1; lambda()(x) => x end; x = 2`: the literal's argument is the value of `x`
    // at the point of construction, and the later assignment targets the local, not the field.
    let short = program(vec![foo(
        vec![],
        Expr::seq(vec![
            Expr::var("x", Some(u32()), Expr::int(1)),
            Expr::lambda(lambda(None, vec![], vec![CaptureSpec::implicit("x")], Expr::ident("x"))),
            Expr::assign(Expr::ident("x"), Expr::int(2)),
        ]),
    )]);
    let (desugared, _) = desugar(short);
    let body = desugared.decl("Foo").and_then(|d| d.method("f")).and_then(|m| m.body.as_ref()).unwrap();
    let ExprKind::Seq(items) = &body.kind else {
        panic!("expected a sequence");
    };
    let ExprKind::ObjectInit { decl, args } = &items[1].kind else {
        panic!("expected an inline object");
    };
    assert!(matches!(&args[0].kind, ExprKind::Ident(n) if n == "x"));
    assert!(decl.field("x").is_some_and(|f| f.init.is_none()));
    assert!(matches!(&items[2].kind, ExprKind::Assign { target, .. }
        if matches!(&target.kind, ExprKind::Ident(n) if n == "x")));
}

#[test]
fn partial_application_of_a_lambda_valued_local() {
    // `let l = lambda(a: U32): U32 => a end; l~apply(3)`
    let mut lit = lambda(None, vec![Param::new("a", u32())], vec![], Expr::ident("a"));
    lit.result = Some(u32());
    let short = program(vec![foo(
        vec![],
        Expr::seq(vec![
            Expr::let_("l", None, Expr::lambda(lit)),
            Expr::partial(PartialApp::new(Expr::ident("l"), APPLY).arg(Expr::int(3))),
        ]),
    )]);
    let (desugared, ctx) = desugar(short);
    assert_eq!(ctx.registry.len(), 2);

    let body = desugared.decl("Foo").and_then(|d| d.method("f")).and_then(|m| m.body.as_ref()).unwrap();
    let ExprKind::Seq(items) = &body.kind else {
        panic!("expected a sequence");
    };
    let ExprKind::ObjectInit { decl, args } = &items[1].kind else {
        panic!("expected an inline object");
    };
    assert!(decl.method(APPLY).is_some_and(|m| m.params.is_empty()));
    assert!(matches!(&args[0].kind, ExprKind::Ident(n) if n == "l"));
}
