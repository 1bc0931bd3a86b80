use serde::{Deserialize, Serialize};

use crate::cap::{Aliasing, Capability};
use crate::span::{Span, Spanned};

/// Name of the single method every lambda declaration receives.
pub const APPLY: &str = "apply";
/// Name of the constructor synthesized for generated declarations.
pub const CREATE: &str = "create";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub decls: Vec<Spanned<TypeDecl>>,
}

impl Program {
    pub fn decl(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.iter().map(|d| &d.node).find(|d| d.name.node == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Trait,
    Primitive,
    Actor,
    Object,
}

impl DeclKind {
    pub fn default_cap(self) -> Capability {
        match self {
            DeclKind::Primitive => Capability::Val,
            DeclKind::Actor => Capability::Tag,
            _ => Capability::Ref,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Trait => "trait",
            DeclKind::Primitive => "primitive",
            DeclKind::Actor => "actor",
            DeclKind::Object => "object",
        }
    }
}

/// Where a declaration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclOrigin {
    #[default]
    Source,
    /// Generated from a literal and kept inline at its use site.
    Anonymous,
    /// Generated from a literal and promoted to a top-level generic declaration.
    Hoisted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub kind: DeclKind,
    pub name: Spanned<String>,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub cap: Option<Capability>,
    #[serde(default)]
    pub provides: Vec<TypeExpr>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub methods: Vec<Spanned<Method>>,
    #[serde(default)]
    pub origin: DeclOrigin,
}

impl TypeDecl {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Spanned::dummy(name.into()),
            type_params: Vec::new(),
            cap: None,
            provides: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            origin: DeclOrigin::Source,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(DeclKind::Class, name)
    }

    pub fn trait_(name: impl Into<String>) -> Self {
        Self::new(DeclKind::Trait, name)
    }

    pub fn with_type_param(mut self, name: impl Into<String>, bound: Option<TypeExpr>) -> Self {
        self.type_params.push(TypeParam::new(name, bound));
        self
    }

    pub fn with_cap(mut self, cap: Capability) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn provides(mut self, ty: TypeExpr) -> Self {
        self.provides.push(ty);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(Spanned::dummy(method));
        self
    }

    pub fn default_cap(&self) -> Capability {
        self.cap.unwrap_or(self.kind.default_cap())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.node == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().map(|m| &m.node).find(|m| m.name.node == name)
    }

    /// The constructor this pass synthesized, if any.
    pub fn constructor(&self) -> Option<&Method> {
        self.methods.iter().map(|m| &m.node).find(|m| m.kind == MethodKind::New && m.synthesized)
    }

    /// The declaration's own type as seen from inside it: every type parameter applied to itself.
    pub fn self_type(&self) -> TypeExpr {
        TypeExpr::Nominal {
            name: self.name.node.clone(),
            args: self.type_params.iter().map(|tp| TypeExpr::param(tp.name.node.clone())).collect(),
            cap: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: Spanned<String>,
    #[serde(default)]
    pub bound: Option<TypeExpr>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>, bound: Option<TypeExpr>) -> Self {
        Self { name: Spanned::dummy(name.into()), bound }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Let,
    Var,
    Embed,
}

impl FieldKind {
    pub fn keyword(self) -> &'static str {
        match self {
            FieldKind::Let => "let",
            FieldKind::Var => "var",
            FieldKind::Embed => "embed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub kind: FieldKind,
    pub name: Spanned<String>,
    pub ty: TypeExpr,
    #[serde(default)]
    pub init: Option<Expr>,
}

impl Field {
    pub fn new(kind: FieldKind, name: impl Into<String>, ty: TypeExpr) -> Self {
        Self { kind, name: Spanned::dummy(name.into()), ty, init: None }
    }

    pub fn let_(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self::new(FieldKind::Let, name, ty)
    }

    pub fn var(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self::new(FieldKind::Var, name, ty)
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Fun,
    Be,
    New,
}

impl MethodKind {
    pub fn keyword(self) -> &'static str {
        match self {
            MethodKind::Fun => "fun",
            MethodKind::Be => "be",
            MethodKind::New => "new",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub kind: MethodKind,
    #[serde(default)]
    pub cap: Option<Capability>,
    pub name: Spanned<String>,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub result: Option<TypeExpr>,
    #[serde(default)]
    pub raises: bool,
    #[serde(default)]
    pub body: Option<Expr>,
    #[serde(default)]
    pub synthesized: bool,
}

impl Method {
    pub fn new(kind: MethodKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            cap: None,
            name: Spanned::dummy(name.into()),
            type_params: Vec::new(),
            params: Vec::new(),
            result: None,
            raises: false,
            body: None,
            synthesized: false,
        }
    }

    pub fn fun(name: impl Into<String>) -> Self {
        Self::new(MethodKind::Fun, name)
    }

    pub fn be(name: impl Into<String>) -> Self {
        Self::new(MethodKind::Be, name)
    }

    pub fn with_cap(mut self, cap: Capability) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn with_type_param(mut self, name: impl Into<String>, bound: Option<TypeExpr>) -> Self {
        self.type_params.push(TypeParam::new(name, bound));
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: TypeExpr) -> Self {
        self.result = Some(ty);
        self
    }

    pub fn raising(mut self) -> Self {
        self.raises = true;
        self
    }

    pub fn with_body(mut self, body: Expr) -> Self {
        self.body = Some(body);
        self
    }

    /// Capability the receiver must have to call this method.
    pub fn receiver_cap(&self) -> Capability {
        self.cap.unwrap_or(match self.kind {
            MethodKind::Fun => Capability::Box,
            MethodKind::Be => Capability::Tag,
            MethodKind::New => Capability::Ref,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: TypeExpr,
    #[serde(default)]
    pub default: Option<Expr>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self { name: Spanned::dummy(name.into()), ty, default: None }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    /// What the callee demands of the argument, read off the declared capability.
    /// A parameter without an explicit capability shares its argument.
    pub fn aliasing(&self) -> Aliasing {
        self.ty.cap().map_or(Aliasing::Shared, Capability::aliasing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    Nominal {
        name: String,
        #[serde(default)]
        args: Vec<TypeExpr>,
        #[serde(default)]
        cap: Option<Capability>,
    },
    Param {
        name: String,
        #[serde(default)]
        cap: Option<Capability>,
    },
    Tuple(Vec<TypeExpr>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
    /// Capability-qualified type, filled in once the expression is resolved.
    #[serde(default)]
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Ident(String),
    This,
    Literal(Literal),
    FieldAccess {
        object: Box<Expr>,
        field: String,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        #[serde(default)]
        type_args: Vec<TypeExpr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        named: Vec<NamedArg>,
    },
    /// `receiver ~ method[type_args](args where name = value)`
    Partial(Box<PartialApp>),
    Lambda(Box<LambdaLit>),
    Object(Box<ObjectLit>),
    Tuple(Vec<Expr>),
    Seq(Vec<Expr>),
    Error,
    Let {
        #[serde(default)]
        mutable: bool,
        name: String,
        #[serde(default)]
        ty: Option<TypeExpr>,
        value: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Consume(Box<Expr>),
    /// `Name[args].ctor(args)` on a named declaration.
    Construct {
        ty: TypeExpr,
        ctor: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// An anonymous declaration instantiated where it is written.
    ObjectInit {
        decl: Box<TypeDecl>,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedArg {
    pub name: Spanned<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialApp {
    pub receiver: Expr,
    pub method: Spanned<String>,
    #[serde(default)]
    pub type_args: Vec<TypeExpr>,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub named: Vec<NamedArg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambdaLit {
    #[serde(default)]
    pub cap: Option<Capability>,
    #[serde(default)]
    pub type_params: Vec<TypeParam>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub captures: Vec<CaptureSpec>,
    #[serde(default)]
    pub result: Option<TypeExpr>,
    #[serde(default)]
    pub raises: bool,
    pub body: Expr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectLit {
    #[serde(default)]
    pub cap: Option<Capability>,
    #[serde(default)]
    pub provides: Vec<TypeExpr>,
    #[serde(default)]
    pub captures: Vec<CaptureSpec>,
    #[serde(default)]
    pub methods: Vec<Spanned<Method>>,
}

/// One value a literal takes from its surroundings.
///
/// Without an initializer the capture reads the in-scope binding called `name` when the
/// literal is evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSpec {
    #[serde(default)]
    pub kind: FieldKind,
    pub name: Spanned<String>,
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
}

impl CaptureSpec {
    pub fn implicit(name: impl Into<String>) -> Self {
        Self { kind: FieldKind::Let, name: Spanned::dummy(name.into()), init: None, ty: None }
    }

    pub fn bound(name: impl Into<String>, init: Expr) -> Self {
        Self { kind: FieldKind::Let, name: Spanned::dummy(name.into()), init: Some(init), ty: None }
    }

    pub fn typed(mut self, ty: TypeExpr) -> Self {
        self.ty = Some(ty);
        self
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span, ty: None }
    }

    pub fn dummy(kind: ExprKind) -> Self {
        Self::new(kind, Span::dummy())
    }

    pub fn typed(mut self, ty: TypeExpr) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::dummy(ExprKind::Ident(name.into()))
    }

    pub fn this() -> Self {
        Self::dummy(ExprKind::This)
    }

    pub fn int(value: i64) -> Self {
        Self::dummy(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn none() -> Self {
        Self::dummy(ExprKind::Literal(Literal::None))
    }

    pub fn error() -> Self {
        Self::dummy(ExprKind::Error)
    }

    pub fn field(object: Expr, field: impl Into<String>) -> Self {
        Self::dummy(ExprKind::FieldAccess { object: Box::new(object), field: field.into() })
    }

    pub fn call(receiver: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::dummy(ExprKind::MethodCall {
            receiver: Box::new(receiver),
            method: method.into(),
            type_args: Vec::new(),
            args,
            named: Vec::new(),
        })
    }

    pub fn consume(inner: Expr) -> Self {
        Self::dummy(ExprKind::Consume(Box::new(inner)))
    }

    pub fn seq(items: Vec<Expr>) -> Self {
        Self::dummy(ExprKind::Seq(items))
    }

    pub fn tuple(items: Vec<Expr>) -> Self {
        Self::dummy(ExprKind::Tuple(items))
    }

    pub fn let_(name: impl Into<String>, ty: Option<TypeExpr>, value: Expr) -> Self {
        Self::dummy(ExprKind::Let { mutable: false, name: name.into(), ty, value: Box::new(value) })
    }

    pub fn var(name: impl Into<String>, ty: Option<TypeExpr>, value: Expr) -> Self {
        Self::dummy(ExprKind::Let { mutable: true, name: name.into(), ty, value: Box::new(value) })
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::dummy(ExprKind::Assign { target: Box::new(target), value: Box::new(value) })
    }

    pub fn construct(ty: TypeExpr, ctor: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::dummy(ExprKind::Construct { ty, ctor: ctor.into(), args })
    }

    pub fn partial(app: PartialApp) -> Self {
        Self::dummy(ExprKind::Partial(Box::new(app)))
    }

    pub fn lambda(lit: LambdaLit) -> Self {
        Self::dummy(ExprKind::Lambda(Box::new(lit)))
    }

    pub fn object(lit: ObjectLit) -> Self {
        Self::dummy(ExprKind::Object(Box::new(lit)))
    }

    /// Short description of the expression's shape, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::Ident(_) => "an identifier",
            ExprKind::This => "this",
            ExprKind::Literal(_) => "a literal",
            ExprKind::FieldAccess { .. } => "a field access",
            ExprKind::MethodCall { .. } => "a method call",
            ExprKind::Partial(_) => "a partial application",
            ExprKind::Lambda(_) => "a lambda",
            ExprKind::Object(_) | ExprKind::ObjectInit { .. } => "an object literal",
            ExprKind::Tuple(_) => "a tuple",
            ExprKind::Seq(_) => "a sequence",
            ExprKind::Error => "an error",
            ExprKind::Let { .. } => "a local declaration",
            ExprKind::Assign { .. } => "an assignment",
            ExprKind::Consume(_) => "a consume",
            ExprKind::Construct { .. } => "a constructor call",
        }
    }
}

impl PartialApp {
    pub fn new(receiver: Expr, method: impl Into<String>) -> Self {
        Self {
            receiver,
            method: Spanned::dummy(method.into()),
            type_args: Vec::new(),
            args: Vec::new(),
            named: Vec::new(),
        }
    }

    pub fn arg(mut self, value: Expr) -> Self {
        self.args.push(value);
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.named.push(NamedArg { name: Spanned::dummy(name.into()), value });
        self
    }

    pub fn type_arg(mut self, ty: TypeExpr) -> Self {
        self.type_args.push(ty);
        self
    }
}

impl LambdaLit {
    pub fn new(body: Expr) -> Self {
        Self {
            cap: None,
            type_params: Vec::new(),
            params: Vec::new(),
            captures: Vec::new(),
            result: None,
            raises: false,
            body,
        }
    }
}

impl ObjectLit {
    pub fn new() -> Self {
        Self { cap: None, provides: Vec::new(), captures: Vec::new(), methods: Vec::new() }
    }

    pub fn with_capture(mut self, capture: CaptureSpec) -> Self {
        self.captures.push(capture);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(Spanned::dummy(method));
        self
    }
}

impl Default for ObjectLit {
    fn default() -> Self {
        Self::new()
    }
}
