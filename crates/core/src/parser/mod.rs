//! Recursive-descent parser for the declaration level of Go source files.
//! Function bodies and initializer expressions are skipped by bracket
//! matching; everything a declaration's *shape* depends on is kept.

use crate::ast::SourceFile;
use crate::error::ParseError;
use crate::lexer::{self, Spanned, Token};

mod decls;
mod types;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    /// Token `n` positions ahead of the current one (clamped to `Eof`).
    fn peek_at(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(&self.filename, self.cur_line(), msg)
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    /// Consume `tok` if it is next.
    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Token, what: &str) -> Result<(), ParseError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {:?}", what, self.peek())))
        }
    }

    fn expect_word(&mut self, expected: &str) -> Result<u32, ParseError> {
        let line = self.cur_line();
        if self.is_word(expected) {
            self.advance();
            Ok(line)
        } else {
            Err(self.err(format!("expected '{}', got {:?}", expected, self.peek())))
        }
    }

    /// An identifier that is not a Go keyword.
    fn take_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Word(w) if !lexer::is_keyword(&w) => {
                self.advance();
                Ok(w)
            }
            other => Err(self.err(format!("expected identifier, got {:?}", other))),
        }
    }

    fn take_str(&mut self) -> Result<String, ParseError> {
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(self.err(format!("expected string literal, got {:?}", self.peek())))
        }
    }

    /// A declaration or group entry ends at `;`, or right before a closing
    /// `)` / `}` / end of input.
    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Semicolon => {
                self.advance();
                Ok(())
            }
            Token::RParen | Token::RBrace | Token::Eof => Ok(()),
            other => Err(self.err(format!("expected ';' or newline, got {:?}", other))),
        }
    }

    fn skip_semicolons(&mut self) {
        while self.eat(&Token::Semicolon) {}
    }

    /// `X` or `( X; X; ... )`. Returns the items and whether the group was
    /// parenthesized.
    fn parse_group<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(Vec<T>, bool), ParseError> {
        if !self.eat(&Token::LParen) {
            return Ok((vec![item(self)?], false));
        }
        let mut items = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek() == &Token::RParen {
                break;
            }
            items.push(item(self)?);
            self.expect_terminator()?;
        }
        self.expect(&Token::RParen, ")")?;
        Ok((items, true))
    }

    // -- File ---------------------------------------------------

    fn parse_file(&mut self) -> Result<SourceFile, ParseError> {
        self.skip_semicolons();
        self.expect_word("package")?;
        let package = self.take_ident()?;
        self.expect_terminator()?;

        let mut imports = Vec::new();
        loop {
            self.skip_semicolons();
            if !self.is_word("import") {
                break;
            }
            self.advance();
            let (specs, _) = self.parse_group(Self::parse_import_spec)?;
            imports.extend(specs);
            self.expect_terminator()?;
        }

        let mut decls = Vec::new();
        loop {
            self.skip_semicolons();
            if self.peek() == &Token::Eof {
                break;
            }
            decls.push(self.parse_decl()?);
            if self.peek() != &Token::Eof {
                self.expect(&Token::Semicolon, ";")?;
            }
        }

        Ok(SourceFile {
            package,
            imports,
            decls,
        })
    }
}

/// Parse an already-lexed token stream into a [`SourceFile`].
pub fn parse(tokens: &[Spanned], filename: &str) -> Result<SourceFile, ParseError> {
    let mut p = Parser::new(tokens, filename);
    p.parse_file()
}

/// Lex and parse Go source text.
pub fn parse_source(src: &str, filename: &str) -> Result<SourceFile, ParseError> {
    let tokens = lexer::lex(src, filename)?;
    parse(&tokens, filename)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn parse_ok(src: &str) -> SourceFile {
        parse_source(src, "test.go").unwrap_or_else(|e| panic!("parse failed: {}", e))
    }

    fn only_type_spec(file: &SourceFile) -> &TypeSpec {
        match file.decls.as_slice() {
            [Decl::Type(td)] => &td.specs[0],
            other => panic!("expected one type decl, got {:?}", other),
        }
    }

    #[test]
    fn parses_package_and_imports() {
        let file = parse_ok(
            r#"package fm

import "fmt"
import (
	"go/ast"
	tok "go/token"
	_ "embed"
	. "strings"
)
"#,
        );
        assert_eq!(file.package, "fm");
        let paths: Vec<_> = file.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["fmt", "go/ast", "go/token", "embed", "strings"]);
        assert_eq!(file.imports[2].name.as_deref(), Some("tok"));
        assert_eq!(file.imports[3].name.as_deref(), Some("_"));
        assert_eq!(file.imports[4].name.as_deref(), Some("."));
        assert!(file.decls.is_empty());
    }

    #[test]
    fn parses_interface_with_grouped_and_named_results() {
        let file = parse_ok(
            r#"package example

// Doer does things, sometimes repeatedly
type Doer interface {
	DoIt(task string, repeat bool) (int, error)
	DoItAgain(task, prefix string) (count int, err error)
}
"#,
        );
        let spec = only_type_spec(&file);
        assert_eq!(spec.name, "Doer");
        assert_eq!(spec.line, 4);
        let iface = spec.as_interface().expect("interface");
        let methods: Vec<_> = iface.methods().collect();
        assert_eq!(methods.len(), 2);

        let do_it = &methods[0];
        assert_eq!(do_it.name, "DoIt");
        assert_eq!(
            do_it.sig.params,
            vec![
                Field::named(&["task"], TypeExpr::name("string")),
                Field::named(&["repeat"], TypeExpr::name("bool")),
            ]
        );
        assert_eq!(
            do_it.sig.results,
            vec![
                Field::anonymous(TypeExpr::name("int")),
                Field::anonymous(TypeExpr::name("error")),
            ]
        );

        let again = &methods[1];
        assert_eq!(
            again.sig.params,
            vec![Field::named(&["task", "prefix"], TypeExpr::name("string"))]
        );
        assert_eq!(again.sig.results[0].names, vec!["count"]);
    }

    #[test]
    fn parses_anonymous_parameters() {
        let file =
            parse_ok("package p\ntype R interface { Read([]byte, int) (n int, err error) }\n");
        let iface = only_type_spec(&file).as_interface().unwrap();
        let m = iface.methods().next().unwrap();
        assert_eq!(
            m.sig.params,
            vec![
                Field::anonymous(TypeExpr::slice(TypeExpr::name("byte"))),
                Field::anonymous(TypeExpr::name("int")),
            ]
        );
    }

    #[test]
    fn parses_embedded_interfaces() {
        let file = parse_ok(
            "package p\ntype RW interface {\n\tio.Reader\n\tWriter\n\tClose() error\n}\n",
        );
        let iface = only_type_spec(&file).as_interface().unwrap();
        assert_eq!(iface.elems.len(), 3);
        assert_eq!(
            iface.elems[0],
            InterfaceElem::Embedded(TypeExpr::qualified("io", "Reader"))
        );
        assert_eq!(iface.elems[1], InterfaceElem::Embedded(TypeExpr::name("Writer")));
        assert_eq!(iface.methods().count(), 1);
    }

    #[test]
    fn parses_struct_types_and_skips_function_bodies() {
        let file = parse_ok(
            r#"package example

type RealDoer struct {
	Name, Alias string `json:"name"`
	*Base
	sync.Mutex
	buf [4]byte
}

// DoIt does all the hard work
func (r *RealDoer) DoIt(task string, repeat bool) (int, error) {
	if repeat {
		return len(task), nil
	}
	m := map[string]int{"a": 1}
	_ = m
	return 0, nil
}

func helper() {}

const someConst = 1
var (
	a, b int = 1, 2
	fn = func() { println("x") }
)
"#,
        );
        assert_eq!(file.decls.len(), 5);
        match &file.decls[0] {
            Decl::Type(td) => match &td.specs[0].ty {
                TypeExpr::Struct(s) => {
                    assert_eq!(s.fields.len(), 4);
                    assert_eq!(s.fields[0].names, vec!["Name", "Alias"]);
                    assert_eq!(s.fields[0].tag.as_deref(), Some("`json:\"name\"`"));
                    assert!(s.fields[1].names.is_empty());
                    assert_eq!(s.fields[1].ty, TypeExpr::pointer(TypeExpr::name("Base")));
                    assert_eq!(s.fields[2].ty, TypeExpr::qualified("sync", "Mutex"));
                    assert_eq!(s.fields[3].ty.to_string(), "[4]byte");
                }
                other => panic!("expected struct, got {:?}", other),
            },
            other => panic!("expected type decl, got {:?}", other),
        }
        match &file.decls[1] {
            Decl::Func(f) => {
                assert_eq!(f.name, "DoIt");
                assert!(f.recv.is_some());
                assert_eq!(f.prov.line, 11);
                assert!(f.body.is_none());
            }
            other => panic!("expected func, got {:?}", other),
        }
        assert!(matches!(&file.decls[2], Decl::Func(f) if f.name == "helper"));
        match &file.decls[3] {
            Decl::Value(v) => {
                assert_eq!(v.kind, ValueKind::Const);
                assert_eq!(v.specs[0].names, vec!["someConst"]);
            }
            other => panic!("expected const, got {:?}", other),
        }
        match &file.decls[4] {
            Decl::Value(v) => {
                assert_eq!(v.kind, ValueKind::Var);
                assert_eq!(v.specs.len(), 2);
                assert_eq!(v.specs[0].ty, Some(TypeExpr::name("int")));
                assert_eq!(v.specs[1].names, vec!["fn"]);
            }
            other => panic!("expected var, got {:?}", other),
        }
    }

    #[test]
    fn parses_grouped_type_declarations() {
        let file = parse_ok(
            "package p\ntype (\n\tA interface{ M() }\n\tB struct{}\n\tC = A\n)\n",
        );
        match &file.decls[0] {
            Decl::Type(td) => {
                assert!(td.grouped);
                assert_eq!(td.specs.len(), 3);
                assert!(td.specs[0].as_interface().is_some());
                assert!(td.specs[2].alias);
            }
            other => panic!("expected type decl, got {:?}", other),
        }
    }

    #[test]
    fn parses_generic_interfaces_and_constraints() {
        let file = parse_ok(
            r#"package p

type Number interface {
	~int | ~float64
}

type Store[K comparable, V any] interface {
	Get(key K) (V, bool)
	Put(key K, value V)
	Each(fn func(K, V) bool)
}

type Matrix [3][3]float64
"#,
        );
        let Decl::Type(number) = &file.decls[0] else {
            panic!("expected type decl");
        };
        let iface = number.specs[0].as_interface().unwrap();
        assert_eq!(iface.methods().count(), 0);
        assert_eq!(
            iface.elems[0],
            InterfaceElem::Embedded(TypeExpr::Union(vec![
                TypeTerm {
                    tilde: true,
                    ty: TypeExpr::name("int")
                },
                TypeTerm {
                    tilde: true,
                    ty: TypeExpr::name("float64")
                },
            ]))
        );

        let Decl::Type(store) = &file.decls[1] else {
            panic!("expected type decl");
        };
        let spec = &store.specs[0];
        assert_eq!(
            spec.type_params,
            vec![
                Field::named(&["K"], TypeExpr::name("comparable")),
                Field::named(&["V"], TypeExpr::name("any")),
            ]
        );
        let each = spec.as_interface().unwrap().methods().nth(2).unwrap();
        assert_eq!(each.sig.to_string(), "(fn func(K, V) bool)");

        let Decl::Type(matrix) = &file.decls[2] else {
            panic!("expected type decl");
        };
        assert!(matrix.specs[0].type_params.is_empty());
        assert_eq!(matrix.specs[0].ty.to_string(), "[3][3]float64");
    }

    #[test]
    fn parses_complex_parameter_types() {
        let file = parse_ok(
            r#"package p

type Complex interface {
	Handle(ctx context.Context, ch <-chan []*ast.File, out chan<- error, opts ...Option) func() error
	Lookup(m map[string][]int, xs [2]string) (List[int], error)
	Wrap(List[string]) interface{}
}
"#,
        );
        let iface = only_type_spec(&file).as_interface().unwrap();
        let sigs: Vec<_> = iface.methods().map(|m| m.sig.to_string()).collect();
        assert_eq!(
            sigs,
            vec![
                "(ctx context.Context, ch <-chan []*ast.File, out chan<- error, opts ...Option) \
                 func() error",
                "(m map[string][]int, xs [2]string) (List[int], error)",
                "(List[string]) interface{}",
            ]
        );
    }

    #[test]
    fn rejects_duplicate_methods() {
        let err = parse_source(
            "package p\ntype D interface {\n\tM()\n\tM(int)\n}\n",
            "dup.go",
        )
        .unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("duplicate method M"));
    }

    #[test]
    fn rejects_mixed_named_and_unnamed_parameters() {
        let err = parse_source("package p\ntype D interface { M(a int, string) }\n", "mixed.go")
            .unwrap_err();
        assert!(err.message.contains("mixed named and unnamed parameters"));
    }

    #[test]
    fn reports_missing_package_clause() {
        let err = parse_source("type A int\n", "nopkg.go").unwrap_err();
        assert_eq!(err.file, "nopkg.go");
        assert!(err.message.contains("expected 'package'"));
    }

    #[test]
    fn reports_statements_outside_functions() {
        let err = parse_source("package p\nx := 1\n", "stmt.go").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
