//! fm-core: Go declaration model and parser for fm.
//!
//! Reads a directory of Go sources into per-package declaration lists that
//! the spy generator in `fm-codegen` transforms.
//!
//! # Public API
//!
//! - [`PackageParser`] / [`SrcFileParser`] -- load a directory into packages
//! - [`parse_source()`] -- lex and parse a single file
//! - [`ParseError`], [`LoadError`] -- error types
//! - AST types: [`SourceFile`], [`Decl`], [`TypeSpec`], [`InterfaceType`],
//!   [`Signature`], [`Field`], [`TypeExpr`], and the synthesized-body
//!   types [`Stmt`] / [`Expr`]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{
    Block, ChanDir, Decl, Expr, Field, FuncDecl, ImportSpec, InterfaceElem, InterfaceType,
    MethodSpec, Provenance, Signature, SourceFile, Stmt, StructField, StructType, TypeDecl,
    TypeExpr, TypeSpec, TypeTerm, ValueDecl, ValueKind, ValueSpec,
};
pub use error::{LoadError, ParseError};
pub use loader::{is_src_file, Package, PackageParser, ParsedFile, SrcFileParser};
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use parser::parse_source;
