//! gofmt-style printing of generated declarations.
//!
//! Struct fields are aligned the way gofmt aligns them: names and types
//! form columns within a section; a section ends after a field whose type
//! spans several lines and around embedded fields.

use fm_core::ast::FieldList;
use fm_core::{
    Decl, FuncDecl, InterfaceElem, StructField, TypeDecl, TypeExpr, TypeSpec, ValueDecl,
    ValueKind,
};

use crate::imports::Import;

/// First line of every generated file.
pub const HEADER: &str = "// Code generated by fm. DO NOT EDIT.";

/// Render a complete generated file for `package`.
pub fn render_file(package: &str, imports: &[Import], decls: &[Decl]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\npackage ");
    out.push_str(package);
    out.push('\n');

    match imports {
        [] => {}
        [only] => {
            out.push_str("\nimport ");
            out.push_str(&import_spec(only));
            out.push('\n');
        }
        many => {
            out.push_str("\nimport (\n");
            for import in many {
                out.push('\t');
                out.push_str(&import_spec(import));
                out.push('\n');
            }
            out.push_str(")\n");
        }
    }

    for decl in decls {
        out.push('\n');
        out.push_str(&render_decl(decl));
    }
    out
}

fn import_spec(import: &Import) -> String {
    match &import.name {
        Some(name) => format!("{} \"{}\"", name, import.path),
        None => format!("\"{}\"", import.path),
    }
}

/// Render one top-level declaration, terminated by a newline.
pub fn render_decl(decl: &Decl) -> String {
    let lines = match decl {
        Decl::Type(td) => type_decl_lines(td),
        Decl::Func(fd) => func_decl_lines(fd),
        Decl::Value(vd) => value_decl_lines(vd),
    };
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn indent(depth: usize) -> String {
    "\t".repeat(depth)
}

// -- Declarations ---------------------------------------------

fn type_decl_lines(td: &TypeDecl) -> Vec<String> {
    match (td.grouped, td.specs.as_slice()) {
        (false, [spec]) => {
            let mut lines = type_spec_lines(spec, 0);
            lines[0] = format!("type {}", lines[0]);
            lines
        }
        _ => {
            let mut lines = vec!["type (".to_owned()];
            for spec in &td.specs {
                let mut spec_lines = type_spec_lines(spec, 1);
                spec_lines[0] = format!("{}{}", indent(1), spec_lines[0]);
                lines.extend(spec_lines);
            }
            lines.push(")".to_owned());
            lines
        }
    }
}

/// `Name[T any] <type>`; the first line carries no indentation.
fn type_spec_lines(spec: &TypeSpec, depth: usize) -> Vec<String> {
    let mut head = spec.name.clone();
    if !spec.type_params.is_empty() {
        head.push_str(&format!("[{}]", FieldList(&spec.type_params)));
    }
    head.push_str(if spec.alias { " = " } else { " " });
    let mut lines = type_lines(&spec.ty, depth);
    lines[0] = format!("{}{}", head, lines[0]);
    lines
}

fn func_decl_lines(fd: &FuncDecl) -> Vec<String> {
    let mut head = "func ".to_owned();
    if let Some(recv) = &fd.recv {
        head.push_str(&format!("({}) ", recv));
    }
    head.push_str(&fd.name);
    if !fd.type_params.is_empty() {
        head.push_str(&format!("[{}]", FieldList(&fd.type_params)));
    }
    head.push_str(&fd.sig.to_string());

    let Some(body) = &fd.body else {
        return vec![head];
    };
    if body.stmts.is_empty() {
        return vec![format!("{} {{}}", head)];
    }
    let mut lines = vec![format!("{} {{", head)];
    lines.extend(body.stmts.iter().map(|s| format!("{}{}", indent(1), s)));
    lines.push("}".to_owned());
    lines
}

fn value_decl_lines(vd: &ValueDecl) -> Vec<String> {
    let keyword = match vd.kind {
        ValueKind::Var => "var",
        ValueKind::Const => "const",
    };
    let spec_text = |names: &[String], ty: &Option<TypeExpr>| match ty {
        Some(ty) => format!("{} {}", names.join(", "), ty),
        None => names.join(", "),
    };
    match vd.specs.as_slice() {
        [spec] => vec![format!("{} {}", keyword, spec_text(&spec.names, &spec.ty))],
        specs => {
            let mut lines = vec![format!("{} (", keyword)];
            for spec in specs {
                lines.push(format!("{}{}", indent(1), spec_text(&spec.names, &spec.ty)));
            }
            lines.push(")".to_owned());
            lines
        }
    }
}

// -- Types ----------------------------------------------------

/// A type starting mid-line at nesting `depth`. Struct and interface
/// literals with members span several lines; later lines carry their own
/// indentation.
fn type_lines(ty: &TypeExpr, depth: usize) -> Vec<String> {
    match ty {
        TypeExpr::Struct(s) if !s.fields.is_empty() => {
            let mut lines = vec!["struct {".to_owned()];
            lines.extend(field_lines(&s.fields, depth + 1));
            lines.push(format!("{}}}", indent(depth)));
            lines
        }
        TypeExpr::Interface(i) if !i.elems.is_empty() => {
            let mut lines = vec!["interface {".to_owned()];
            for elem in &i.elems {
                let text = match elem {
                    InterfaceElem::Method(m) => format!("{}{}", m.name, m.sig),
                    InterfaceElem::Embedded(t) => t.to_string(),
                };
                lines.push(format!("{}{}", indent(depth + 1), text));
            }
            lines.push(format!("{}}}", indent(depth)));
            lines
        }
        other => vec![other.to_string()],
    }
}

struct Row {
    /// Empty for an embedded field.
    names: String,
    ty: Vec<String>,
    tag: Option<String>,
}

fn field_lines(fields: &[StructField], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut section: Vec<Row> = Vec::new();
    for field in fields {
        let row = Row {
            names: field.names.join(", "),
            ty: type_lines(&field.ty, depth),
            tag: field.tag.clone(),
        };
        if row.names.is_empty() {
            flush_section(&mut section, depth, &mut lines);
            section.push(row);
            flush_section(&mut section, depth, &mut lines);
            continue;
        }
        let spans_lines = row.ty.len() > 1;
        section.push(row);
        if spans_lines {
            flush_section(&mut section, depth, &mut lines);
        }
    }
    flush_section(&mut section, depth, &mut lines);
    lines
}

fn flush_section(section: &mut Vec<Row>, depth: usize, out: &mut Vec<String>) {
    let name_width = section
        .iter()
        .map(|r| r.names.chars().count())
        .max()
        .unwrap_or(0);
    let type_width = section
        .iter()
        .filter(|r| r.tag.is_some())
        .map(|r| r.ty[0].chars().count())
        .max()
        .unwrap_or(0);

    for row in section.drain(..) {
        let mut first = indent(depth);
        if !row.names.is_empty() {
            first.push_str(&format!("{:<width$} ", row.names, width = name_width));
        }
        match &row.tag {
            Some(tag) => {
                first.push_str(&format!("{:<width$} {}", row.ty[0], tag, width = type_width))
            }
            None => first.push_str(&row.ty[0]),
        }
        out.push(first);
        out.extend(row.ty.into_iter().skip(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SpyGenerator;
    use crate::imports;
    use crate::SpyOptions;
    use fm_core::parse_source;

    fn generated(src: &str, opts: SpyOptions) -> String {
        let file = parse_source(src, "x.go").expect("parse");
        let g = SpyGenerator::new(opts).generate_decls(&file.decls);
        let scope = imports::ImportScope::default().with_file("x.go", &file.imports);
        let resolved = imports::resolve(&scope, g.decls);
        render_file("p_test", &resolved.imports, &resolved.decls)
    }

    #[test]
    fn doer_spy_renders_like_gofmt() {
        let out = generated(
            "package p\ntype Doer interface { DoIt(task string) error }\n",
            SpyOptions::default(),
        );
        let want = "\
// Code generated by fm. DO NOT EDIT.

package p_test

type FakeDoer struct {
\tDoIt_Called bool
\tDoIt_Input  struct {
\t\tArg0 string
\t}
\tDoIt_Output struct {
\t\tRet0 error
\t}
}

func (f *FakeDoer) DoIt(task string) error {
\tf.DoIt_Called = true
\tf.DoIt_Input.Arg0 = task
\treturn f.DoIt_Output.Ret0
}
";
        assert_eq!(out, want);
    }

    #[test]
    fn thread_safe_spy_imports_sync_and_locks() {
        let out = generated(
            "package p\ntype Resetter interface { Reset() }\n",
            SpyOptions {
                thread_safe: true,
                ..SpyOptions::default()
            },
        );
        let want = "\
// Code generated by fm. DO NOT EDIT.

package p_test

import \"sync\"

type FakeResetter struct {
\tmu           sync.Mutex
\tReset_Called bool
}

func (f *FakeResetter) Reset() {
\tf.mu.Lock()
\tdefer f.mu.Unlock()
\tf.Reset_Called = true
}
";
        assert_eq!(out, want);
    }

    #[test]
    fn zero_method_contract_renders_empty_struct() {
        let out = generated("package p\ntype Marker interface{}\n", SpyOptions::default());
        assert!(out.ends_with("\ntype FakeMarker struct{}\n"), "{}", out);
    }

    #[test]
    fn import_block_for_several_packages() {
        let out = generated(
            r#"package p
import (
	"context"
	pg "github.com/jackc/pgx/v5"
)
type Repo interface { Find(ctx context.Context, c *pg.Conn) }
"#,
            SpyOptions::default(),
        );
        assert!(
            out.contains("import (\n\t\"context\"\n\tpg \"github.com/jackc/pgx/v5\"\n)\n"),
            "{}",
            out
        );
        assert!(out.contains("\t\tArg1 *pg.Conn\n"), "{}", out);
    }

    #[test]
    fn generic_spy_carries_type_params() {
        let out = generated(
            "package p\ntype Store[K comparable, V any] interface { Put(k K, v V) }\n",
            SpyOptions::default(),
        );
        assert!(out.contains("type FakeStore[K comparable, V any] struct {\n"), "{}", out);
        assert!(out.contains("func (f *FakeStore[K, V]) Put(k K, v V) {\n"), "{}", out);
    }

    #[test]
    fn sections_break_after_multiline_fields_and_at_embedded_fields() {
        let fields = vec![
            StructField::new("A", TypeExpr::name("bool")),
            StructField::new(
                "Long",
                TypeExpr::Struct(fm_core::StructType {
                    fields: vec![StructField::new("X", TypeExpr::name("int"))],
                }),
            ),
            StructField::new("B", TypeExpr::name("int")),
            StructField::new("Longer", TypeExpr::name("string")),
            StructField {
                names: vec![],
                ty: TypeExpr::qualified("sync", "Mutex"),
                tag: None,
            },
            StructField {
                names: vec!["C".into()],
                ty: TypeExpr::name("int"),
                tag: Some("`json:\"c\"`".into()),
            },
            StructField {
                names: vec!["Dee".into()],
                ty: TypeExpr::name("string"),
                tag: Some("`json:\"d\"`".into()),
            },
        ];
        assert_eq!(
            field_lines(&fields, 1),
            vec![
                "\tA    bool",
                "\tLong struct {",
                "\t\tX int",
                "\t}",
                "\tB      int",
                "\tLonger string",
                "\tsync.Mutex",
                "\tC   int    `json:\"c\"`",
                "\tDee string `json:\"d\"`",
            ]
        );
    }

    #[test]
    fn value_and_grouped_type_decls() {
        let file = parse_source(
            "package p\nvar (\n\ta int\n\tb, c string\n)\ntype (\n\tX int\n\tY = X\n)\n",
            "x.go",
        )
        .expect("parse");
        assert_eq!(render_decl(&file.decls[0]), "var (\n\ta int\n\tb, c string\n)\n");
        assert_eq!(render_decl(&file.decls[1]), "type (\n\tX int\n\tY = X\n)\n");
    }
}
