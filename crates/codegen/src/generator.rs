//! Declaration generator: spies for every contract of a package.

use std::fmt;

use fm_core::{Decl, InterfaceElem, Package, Provenance, TypeDecl};
use serde::Serialize;
use tracing::debug;

use crate::method::{synthesize_method, Receiver};
use crate::record::synthesize_record;
use crate::select::{as_contract_decl, contracts};
use crate::SpyOptions;

/// Why a contract element produced no spy member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Embedded interface or type-set term: its method set is not
    /// spelled out in the declaration.
    Embedded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Embedded => f.write_str("embedded"),
        }
    }
}

/// A contract element that was left out of the generated spy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedConstruct {
    pub contract: String,
    /// Source spelling of the element, e.g. `io.Reader`.
    pub element: String,
    pub reason: SkipReason,
}

/// Output of one generator pass over a package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    /// Per spy: the record type, then one method per contract method.
    pub decls: Vec<Decl>,
    pub skipped: Vec<SkippedConstruct>,
    /// Spy type names, in generation order.
    pub spies: Vec<String>,
}

/// Turns the declarations of a package into spy declarations.
pub trait DeclGenerator {
    fn generate(&self, package: &Package) -> Generation;
}

/// The default generator.
#[derive(Debug, Clone, Default)]
pub struct SpyGenerator {
    opts: SpyOptions,
}

impl SpyGenerator {
    pub fn new(opts: SpyOptions) -> Self {
        SpyGenerator { opts }
    }

    pub fn options(&self) -> &SpyOptions {
        &self.opts
    }

    /// Generate spies for `decls`, in encounter order.
    pub fn generate_decls<'a>(&self, decls: impl IntoIterator<Item = &'a Decl>) -> Generation {
        let mut out = Generation::default();
        for td in decls.into_iter().filter_map(as_contract_decl) {
            self.generate_group(td, &mut out);
        }
        out
    }

    fn generate_group(&self, td: &TypeDecl, out: &mut Generation) {
        for (spec, iface) in contracts(td) {
            let prov = Provenance {
                file: td.prov.file.clone(),
                line: spec.line,
            };
            let record = synthesize_record(spec, iface, &self.opts);
            debug!(contract = %spec.name, spy = %record.name, "synthesized spy");
            out.spies.push(record.name.clone());
            out.decls.push(Decl::Type(TypeDecl {
                specs: vec![record],
                grouped: false,
                prov: prov.clone(),
            }));

            let recv = Receiver::for_spy(spec, iface, &self.opts);
            for elem in &iface.elems {
                match elem {
                    InterfaceElem::Method(m) => {
                        let method_prov = Provenance {
                            file: prov.file.clone(),
                            line: m.line,
                        };
                        out.decls.push(Decl::Func(synthesize_method(
                            &recv,
                            m,
                            &self.opts,
                            method_prov,
                        )));
                    }
                    InterfaceElem::Embedded(ty) => {
                        let skipped = SkippedConstruct {
                            contract: spec.name.clone(),
                            element: ty.to_string(),
                            reason: SkipReason::Embedded,
                        };
                        debug!(
                            contract = %skipped.contract,
                            element = %skipped.element,
                            "skipping embedded element"
                        );
                        out.skipped.push(skipped);
                    }
                }
            }
        }
    }
}

impl DeclGenerator for SpyGenerator {
    fn generate(&self, package: &Package) -> Generation {
        self.generate_decls(package.decls())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_core::{parse_source, FuncDecl, TypeExpr};

    fn generate(src: &str, opts: SpyOptions) -> Generation {
        let file = parse_source(src, "x.go").expect("parse");
        SpyGenerator::new(opts).generate_decls(&file.decls)
    }

    fn shape(g: &Generation) -> Vec<String> {
        g.decls
            .iter()
            .map(|d| match d {
                Decl::Type(td) => format!("type {}", td.specs[0].name),
                Decl::Func(FuncDecl { name, .. }) => format!("func {}", name),
                Decl::Value(_) => "value".to_owned(),
            })
            .collect()
    }

    #[test]
    fn record_then_methods_in_encounter_order() {
        let g = generate(
            "package p
type Impl struct{}
type (
	A interface {
		One()
		Two() error
	}
	B interface{ Three(x int) }
)
func helper() {}
type C interface{}
",
            SpyOptions::default(),
        );
        assert_eq!(
            shape(&g),
            vec![
                "type FakeA",
                "func One",
                "func Two",
                "type FakeB",
                "func Three",
                "type FakeC",
            ]
        );
        assert_eq!(g.spies, vec!["FakeA", "FakeB", "FakeC"]);
        assert!(g.skipped.is_empty());
    }

    #[test]
    fn embedded_elements_are_reported_not_fatal() {
        let g = generate(
            "package p
type ReadCloser interface {
	io.Reader
	Close() error
	~int | string
}
",
            SpyOptions::default(),
        );
        assert_eq!(shape(&g), vec!["type FakeReadCloser", "func Close"]);
        assert_eq!(
            g.skipped,
            vec![
                SkippedConstruct {
                    contract: "ReadCloser".into(),
                    element: "io.Reader".into(),
                    reason: SkipReason::Embedded,
                },
                SkippedConstruct {
                    contract: "ReadCloser".into(),
                    element: "~int | string".into(),
                    reason: SkipReason::Embedded,
                },
            ]
        );
    }

    #[test]
    fn generated_decls_carry_source_provenance() {
        let g = generate(
            "package p\n\ntype Doer interface {\n\tDoIt()\n}\n",
            SpyOptions::default(),
        );
        let Decl::Type(td) = &g.decls[0] else {
            panic!("expected record first");
        };
        assert_eq!(td.prov.file, "x.go");
        assert_eq!(td.prov.line, 3);
        let Decl::Func(f) = &g.decls[1] else {
            panic!("expected method second");
        };
        assert_eq!(f.prov.line, 4);
        assert!(matches!(
            f.recv.as_ref().map(|r| &r.ty),
            Some(TypeExpr::Pointer(_))
        ));
    }

    #[test]
    fn skipped_constructs_serialize_snake_case() {
        let s = SkippedConstruct {
            contract: "RW".into(),
            element: "io.Writer".into(),
            reason: SkipReason::Embedded,
        };
        let v = serde_json::to_value(&s).expect("serialize");
        assert_eq!(v["reason"], "embedded");
        assert_eq!(v["element"], "io.Writer");
    }
}
