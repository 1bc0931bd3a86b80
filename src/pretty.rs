use crate::ast::*;

/// Pretty-print a `Program` as core source text. Synthetic identifiers are printed verbatim.
pub fn pretty_print(program: &Program) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_program(program);
    pp.buf
}

/// Render a single expression on one line.
pub fn pretty_expr(expr: &Expr) -> String {
    let mut pp = PrettyPrinter::new();
    pp.emit_expr(expr);
    pp.buf
}

struct PrettyPrinter {
    buf: String,
    indent: usize,
}

impl PrettyPrinter {
    fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
        }
    }

    fn write(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent -= 1;
    }

    // ── Declarations ─────────────────────────────────────────────────

    fn emit_program(&mut self, program: &Program) {
        for (i, decl) in program.decls.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.emit_decl(&decl.node);
        }
    }

    fn emit_decl(&mut self, decl: &TypeDecl) {
        self.emit_decl_header(decl);
        self.newline();
        self.indent();
        for field in &decl.fields {
            self.write_indent();
            self.emit_field(field);
            self.newline();
        }
        for method in &decl.methods {
            self.write_indent();
            self.emit_method(&method.node);
            self.newline();
        }
        self.dedent();
    }

    fn emit_decl_header(&mut self, decl: &TypeDecl) {
        self.write(decl.kind.keyword());
        if let Some(cap) = decl.cap {
            self.write(" ");
            self.write(cap.keyword());
        }
        self.write(" ");
        self.write(&decl.name.node);
        self.emit_type_params(&decl.type_params);
        self.emit_provides(&decl.provides);
    }

    fn emit_provides(&mut self, provides: &[TypeExpr]) {
        if provides.is_empty() {
            return;
        }
        self.write(" is ");
        for (i, p) in provides.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_type_expr(p);
        }
    }

    fn emit_field(&mut self, field: &Field) {
        self.write(field.kind.keyword());
        self.write(" ");
        self.write(&field.name.node);
        self.write(": ");
        self.emit_type_expr(&field.ty);
        if let Some(init) = &field.init {
            self.write(" = ");
            self.emit_expr(init);
        }
    }

    fn emit_method(&mut self, method: &Method) {
        self.write(method.kind.keyword());
        if let Some(cap) = method.cap {
            self.write(" ");
            self.write(cap.keyword());
        }
        self.write(" ");
        self.write(&method.name.node);
        self.emit_type_params(&method.type_params);
        self.emit_params(&method.params);
        if let Some(result) = &method.result {
            self.write(": ");
            self.emit_type_expr(result);
        }
        if method.raises {
            self.write(" ?");
        }
        if let Some(body) = &method.body {
            self.write(" => ");
            self.emit_expr(body);
        }
    }

    // ── Types ────────────────────────────────────────────────────────

    fn emit_type_expr(&mut self, te: &TypeExpr) {
        self.write(&te.to_string());
    }

    fn emit_type_params(&mut self, type_params: &[TypeParam]) {
        if type_params.is_empty() {
            return;
        }
        self.write("[");
        for (i, tp) in type_params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&tp.name.node);
            if let Some(bound) = &tp.bound {
                self.write(": ");
                self.emit_type_expr(bound);
            }
        }
        self.write("]");
    }

    fn emit_type_args(&mut self, type_args: &[TypeExpr]) {
        if type_args.is_empty() {
            return;
        }
        self.write("[");
        for (i, ty) in type_args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_type_expr(ty);
        }
        self.write("]");
    }

    fn emit_params(&mut self, params: &[Param]) {
        self.write("(");
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&p.name.node);
            self.write(": ");
            self.emit_type_expr(&p.ty);
            if let Some(default) = &p.default {
                self.write(" = ");
                self.emit_expr(default);
            }
        }
        self.write(")");
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn emit_args(&mut self, args: &[Expr], named: &[NamedArg]) {
        self.write("(");
        for (i, a) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expr(a);
        }
        if !named.is_empty() {
            if !args.is_empty() {
                self.write(" ");
            }
            self.write("where ");
            for (i, n) in named.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write(&n.name.node);
                self.write(" = ");
                self.emit_expr(&n.value);
            }
        }
        self.write(")");
    }

    fn emit_capture(&mut self, capture: &CaptureSpec) {
        if capture.kind != FieldKind::Let {
            self.write(capture.kind.keyword());
            self.write(" ");
        }
        self.write(&capture.name.node);
        if let Some(ty) = &capture.ty {
            self.write(": ");
            self.emit_type_expr(ty);
        }
        if let Some(init) = &capture.init {
            self.write(" = ");
            self.emit_expr(init);
        }
    }

    fn emit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(name) => self.write(name),
            ExprKind::This => self.write("this"),
            ExprKind::Literal(lit) => match lit {
                Literal::Int(n) => self.write(&n.to_string()),
                Literal::Float(f) => self.write(&format!("{f:?}")),
                Literal::Bool(b) => self.write(if *b { "true" } else { "false" }),
                Literal::Str(s) => self.write(&format!("\"{}\"", escape_string(s))),
                Literal::None => self.write("None"),
            },
            ExprKind::FieldAccess { object, field } => {
                self.emit_expr(object);
                self.write(".");
                self.write(field);
            }
            ExprKind::MethodCall { receiver, method, type_args, args, named } => {
                self.emit_expr(receiver);
                self.write(".");
                self.write(method);
                self.emit_type_args(type_args);
                self.emit_args(args, named);
            }
            ExprKind::Partial(app) => {
                self.emit_expr(&app.receiver);
                self.write("~");
                self.write(&app.method.node);
                self.emit_type_args(&app.type_args);
                self.emit_args(&app.args, &app.named);
            }
            ExprKind::Lambda(lit) => {
                self.write("lambda");
                if let Some(cap) = lit.cap {
                    self.write(" ");
                    self.write(cap.keyword());
                }
                self.emit_type_params(&lit.type_params);
                self.emit_params(&lit.params);
                if !lit.captures.is_empty() {
                    self.write("(");
                    for (i, c) in lit.captures.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.emit_capture(c);
                    }
                    self.write(")");
                }
                if let Some(result) = &lit.result {
                    self.write(": ");
                    self.emit_type_expr(result);
                }
                if lit.raises {
                    self.write(" ?");
                }
                self.write(" => ");
                self.emit_expr(&lit.body);
                self.write(" end");
            }
            ExprKind::Object(lit) => {
                self.write("object");
                if let Some(cap) = lit.cap {
                    self.write(" ");
                    self.write(cap.keyword());
                }
                self.emit_provides(&lit.provides);
                for c in &lit.captures {
                    self.write(" let ");
                    self.emit_capture(c);
                    self.write(";");
                }
                for m in &lit.methods {
                    self.write(" ");
                    self.emit_method(&m.node);
                    self.write(";");
                }
                self.write(" end");
            }
            ExprKind::Tuple(items) => {
                self.write("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_expr(item);
                }
                self.write(")");
            }
            ExprKind::Seq(items) => {
                self.write("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write("; ");
                    }
                    self.emit_expr(item);
                }
                self.write(")");
            }
            ExprKind::Error => self.write("error"),
            ExprKind::Let { mutable, name, ty, value } => {
                self.write(if *mutable { "var " } else { "let " });
                self.write(name);
                if let Some(ty) = ty {
                    self.write(": ");
                    self.emit_type_expr(ty);
                }
                self.write(" = ");
                self.emit_expr(value);
            }
            ExprKind::Assign { target, value } => {
                self.emit_expr(target);
                self.write(" = ");
                self.emit_expr(value);
            }
            ExprKind::Consume(inner) => {
                self.write("consume ");
                self.emit_expr(inner);
            }
            ExprKind::Construct { ty, ctor, args } => {
                self.emit_type_expr(ty);
                self.write(".");
                self.write(ctor);
                self.emit_args(args, &[]);
            }
            ExprKind::ObjectInit { decl, args } => {
                self.emit_decl_header(decl);
                self.write(" {");
                for f in &decl.fields {
                    self.write(" ");
                    self.emit_field(f);
                    self.write(";");
                }
                for m in &decl.methods {
                    self.write(" ");
                    self.emit_method(&m.node);
                    self.write(";");
                }
                self.write(" }");
                self.emit_args(args, &[]);
            }
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
