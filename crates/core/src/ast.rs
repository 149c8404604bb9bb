//! Declaration model for Go source files.
//!
//! These types are produced by the parser and consumed by the spy
//! generator. They cover the declaration level of Go only: function bodies
//! and initializer expressions are skipped during parsing, while synthesized
//! method bodies use the small [`Stmt`] / [`Expr`] subset defined here.

use std::fmt;

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

// ──────────────────────────────────────────────
// Files and declarations
// ──────────────────────────────────────────────

/// One parsed `.go` file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

/// `import alias "path"`. `name` is `Some(".")` / `Some("_")` for dot and
/// blank imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<String>,
    /// Import path without quotes.
    pub path: String,
    pub line: u32,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// `type X ...` or `type ( ... )`
    Type(TypeDecl),
    /// `func ...`, with or without a receiver
    Func(FuncDecl),
    /// `var ...` / `const ...`
    Value(ValueDecl),
}

impl Decl {
    pub fn prov(&self) -> &Provenance {
        match self {
            Decl::Type(td) => &td.prov,
            Decl::Func(fd) => &fd.prov,
            Decl::Value(vd) => &vd.prov,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub specs: Vec<TypeSpec>,
    /// Written with parentheses (`type ( ... )`).
    pub grouped: bool,
    pub prov: Provenance,
}

/// One named type inside a type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub type_params: Vec<Field>,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
    pub line: u32,
}

impl TypeSpec {
    /// The interface literal this spec declares, if any. Aliases never
    /// count: an alias names an existing type rather than declaring one.
    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match (&self.ty, self.alias) {
            (TypeExpr::Interface(i), false) => Some(i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: String,
    pub type_params: Vec<Field>,
    pub sig: Signature,
    /// `None` for parsed functions (bodies are skipped) and for
    /// body-less declarations.
    pub body: Option<Block>,
    pub prov: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Var,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueDecl {
    pub kind: ValueKind,
    pub specs: Vec<ValueSpec>,
    pub prov: Provenance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub ty: Option<TypeExpr>,
}

// ──────────────────────────────────────────────
// Types
// ──────────────────────────────────────────────

/// A parameter, result, receiver or type-parameter group: zero or more
/// names sharing one type. No names means a single anonymous entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl Field {
    pub fn anonymous(ty: TypeExpr) -> Self {
        Field {
            names: Vec::new(),
            ty,
        }
    }

    pub fn named(names: &[&str], ty: TypeExpr) -> Self {
        Field {
            names: names.iter().map(|n| (*n).to_owned()).collect(),
            ty,
        }
    }

    /// Number of positional entries this group stands for.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Name(String),
    Qualified {
        pkg: String,
        name: String,
    },
    /// `List[int]`, `pkg.Map[K, V]`
    Generic {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// Length is kept as source text (`3`, `N`, `...`, `2*N`).
    Array {
        len: String,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(Signature),
    Interface(InterfaceType),
    Struct(StructType),
    /// Variadic parameter type `...T`.
    Ellipsis(Box<TypeExpr>),
    Paren(Box<TypeExpr>),
    /// Constraint type set `~int | string`.
    Union(Vec<TypeTerm>),
}

impl TypeExpr {
    pub fn name(n: &str) -> Self {
        TypeExpr::Name(n.to_owned())
    }

    pub fn qualified(pkg: &str, name: &str) -> Self {
        TypeExpr::Qualified {
            pkg: pkg.to_owned(),
            name: name.to_owned(),
        }
    }

    pub fn pointer(elem: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(elem))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(elem))
    }

    /// Visit every package qualifier referenced by this type, in order.
    pub fn for_each_qualifier<'a>(&'a self, f: &mut dyn FnMut(&'a str)) {
        match self {
            TypeExpr::Name(_) => {}
            TypeExpr::Qualified { pkg, .. } => f(pkg),
            TypeExpr::Generic { base, args } => {
                base.for_each_qualifier(f);
                for a in args {
                    a.for_each_qualifier(f);
                }
            }
            TypeExpr::Pointer(t)
            | TypeExpr::Slice(t)
            | TypeExpr::Ellipsis(t)
            | TypeExpr::Paren(t)
            | TypeExpr::Array { elem: t, .. }
            | TypeExpr::Chan { elem: t, .. } => t.for_each_qualifier(f),
            TypeExpr::Map { key, value } => {
                key.for_each_qualifier(f);
                value.for_each_qualifier(f);
            }
            TypeExpr::Func(sig) => sig.for_each_qualifier(f),
            TypeExpr::Interface(i) => {
                for elem in &i.elems {
                    match elem {
                        InterfaceElem::Method(m) => m.sig.for_each_qualifier(f),
                        InterfaceElem::Embedded(t) => t.for_each_qualifier(f),
                    }
                }
            }
            TypeExpr::Struct(s) => {
                for field in &s.fields {
                    field.ty.for_each_qualifier(f);
                }
            }
            TypeExpr::Union(terms) => {
                for term in terms {
                    term.ty.for_each_qualifier(f);
                }
            }
        }
    }

    /// Same walk as [`TypeExpr::for_each_qualifier`], allowing rewrites.
    pub fn for_each_qualifier_mut(&mut self, f: &mut dyn FnMut(&mut String)) {
        match self {
            TypeExpr::Name(_) => {}
            TypeExpr::Qualified { pkg, .. } => f(pkg),
            TypeExpr::Generic { base, args } => {
                base.for_each_qualifier_mut(f);
                for a in args {
                    a.for_each_qualifier_mut(f);
                }
            }
            TypeExpr::Pointer(t)
            | TypeExpr::Slice(t)
            | TypeExpr::Ellipsis(t)
            | TypeExpr::Paren(t)
            | TypeExpr::Array { elem: t, .. }
            | TypeExpr::Chan { elem: t, .. } => t.for_each_qualifier_mut(f),
            TypeExpr::Map { key, value } => {
                key.for_each_qualifier_mut(f);
                value.for_each_qualifier_mut(f);
            }
            TypeExpr::Func(sig) => sig.for_each_qualifier_mut(f),
            TypeExpr::Interface(i) => {
                for elem in &mut i.elems {
                    match elem {
                        InterfaceElem::Method(m) => m.sig.for_each_qualifier_mut(f),
                        InterfaceElem::Embedded(t) => t.for_each_qualifier_mut(f),
                    }
                }
            }
            TypeExpr::Struct(s) => {
                for field in &mut s.fields {
                    field.ty.for_each_qualifier_mut(f);
                }
            }
            TypeExpr::Union(terms) => {
                for term in terms {
                    term.ty.for_each_qualifier_mut(f);
                }
            }
        }
    }
}

impl Signature {
    pub fn for_each_qualifier<'a>(&'a self, f: &mut dyn FnMut(&'a str)) {
        for field in self.params.iter().chain(&self.results) {
            field.ty.for_each_qualifier(f);
        }
    }

    pub fn for_each_qualifier_mut(&mut self, f: &mut dyn FnMut(&mut String)) {
        for field in self.params.iter_mut().chain(&mut self.results) {
            field.ty.for_each_qualifier_mut(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterfaceType {
    pub elems: Vec<InterfaceElem>,
}

impl InterfaceType {
    /// Explicitly declared methods, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSpec> {
        self.elems.iter().filter_map(|e| match e {
            InterfaceElem::Method(m) => Some(m),
            InterfaceElem::Embedded(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    Method(MethodSpec),
    /// Embedded interface or type-set term; carries no explicit signature.
    Embedded(TypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    pub sig: Signature,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructType {
    pub fields: Vec<StructField>,
}

/// A struct field line. No names means an embedded field.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Tag literal exactly as written, quotes included.
    pub tag: Option<String>,
}

impl StructField {
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        StructField {
            names: vec![name.to_owned()],
            ty,
            tag: None,
        }
    }
}

// ──────────────────────────────────────────────
// Statements (synthesized bodies only)
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `lhs = rhs`
    Assign { lhs: Expr, rhs: Expr },
    /// Expression statement, e.g. `f.mu.Lock()`
    Expr(Expr),
    /// `defer call`
    Defer(Expr),
    /// `return a, b`
    Return(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Selector(Box<Expr>, String),
    Call { func: Box<Expr>, args: Vec<Expr> },
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident(name.to_owned())
    }

    /// `self.name`
    pub fn field(self, name: &str) -> Self {
        Expr::Selector(Box::new(self), name.to_owned())
    }

    /// `self()` with no arguments.
    pub fn call(self) -> Self {
        Expr::Call {
            func: Box::new(self),
            args: Vec::new(),
        }
    }
}

// ──────────────────────────────────────────────
// Single-line printing (gofmt spelling)
// ──────────────────────────────────────────────

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.names.join(", "), self.ty)
        }
    }
}

/// Prints a field list without the surrounding brackets.
pub struct FieldList<'a>(pub &'a [Field]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, self.0, ", ")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", FieldList(&self.params))?;
        match self.results.as_slice() {
            [] => Ok(()),
            [only] if only.names.is_empty() => write!(f, " {}", only.ty),
            results => write!(f, " ({})", FieldList(results)),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(n) => f.write_str(n),
            TypeExpr::Qualified { pkg, name } => write!(f, "{}.{}", pkg, name),
            TypeExpr::Generic { base, args } => {
                write!(f, "{}[", base)?;
                write_joined(f, args, ", ")?;
                f.write_str("]")
            }
            TypeExpr::Pointer(t) => write!(f, "*{}", t),
            TypeExpr::Slice(t) => write!(f, "[]{}", t),
            TypeExpr::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {}", elem),
                ChanDir::Send => write!(f, "chan<- {}", elem),
                ChanDir::Recv => write!(f, "<-chan {}", elem),
            },
            TypeExpr::Func(sig) => write!(f, "func{}", sig),
            TypeExpr::Interface(i) => {
                if i.elems.is_empty() {
                    return f.write_str("interface{}");
                }
                f.write_str("interface{ ")?;
                for (idx, elem) in i.elems.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("; ")?;
                    }
                    match elem {
                        InterfaceElem::Method(m) => write!(f, "{}{}", m.name, m.sig)?,
                        InterfaceElem::Embedded(t) => write!(f, "{}", t)?,
                    }
                }
                f.write_str(" }")
            }
            TypeExpr::Struct(s) => {
                if s.fields.is_empty() {
                    return f.write_str("struct{}");
                }
                f.write_str("struct{ ")?;
                for (idx, field) in s.fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("; ")?;
                    }
                    if !field.names.is_empty() {
                        write!(f, "{} ", field.names.join(", "))?;
                    }
                    write!(f, "{}", field.ty)?;
                    if let Some(tag) = &field.tag {
                        write!(f, " {}", tag)?;
                    }
                }
                f.write_str(" }")
            }
            TypeExpr::Ellipsis(t) => write!(f, "...{}", t),
            TypeExpr::Paren(t) => write!(f, "({})", t),
            TypeExpr::Union(terms) => {
                for (idx, term) in terms.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" | ")?;
                    }
                    if term.tilde {
                        f.write_str("~")?;
                    }
                    write!(f, "{}", term.ty)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(n) => f.write_str(n),
            Expr::Selector(x, sel) => write!(f, "{}.{}", x, sel),
            Expr::Call { func, args } => {
                write!(f, "{}(", func)?;
                write_joined(f, args, ", ")?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            Stmt::Expr(e) => write!(f, "{}", e),
            Stmt::Defer(e) => write!(f, "defer {}", e),
            Stmt::Return(values) if values.is_empty() => f.write_str("return"),
            Stmt::Return(values) => {
                f.write_str("return ")?;
                write_joined(f, values, ", ")
            }
        }
    }
}
