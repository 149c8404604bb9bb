//! Record-type synthesis: the struct a spy records calls into.

use fm_core::{Field, InterfaceType, MethodSpec, StructField, StructType, TypeExpr, TypeSpec};

use crate::flatten::{captured_type, flatten};
use crate::{
    SpyOptions, ARG_PREFIX, CALLED_SUFFIX, INPUT_SUFFIX, LOCK_FIELD, OUTPUT_SUFFIX, RET_PREFIX,
};

pub fn called_field(method: &str) -> String {
    format!("{}{}", method, CALLED_SUFFIX)
}

pub fn input_field(method: &str) -> String {
    format!("{}{}", method, INPUT_SUFFIX)
}

pub fn output_field(method: &str) -> String {
    format!("{}{}", method, OUTPUT_SUFFIX)
}

pub fn arg_field(index: usize) -> String {
    format!("{}{}", ARG_PREFIX, index)
}

pub fn ret_field(index: usize) -> String {
    format!("{}{}", RET_PREFIX, index)
}

/// Build the spy struct for `contract`.
///
/// ```go
/// type FakeDoer struct {
/// 	DoIt_Called bool
/// 	DoIt_Input  struct {
/// 		Arg0 string
/// 	}
/// 	DoIt_Output struct {
/// 		Ret0 error
/// 	}
/// }
/// ```
///
/// Type parameters of a generic contract are carried over unchanged.
/// Embedded elements contribute nothing.
pub fn synthesize_record(
    contract: &TypeSpec,
    iface: &InterfaceType,
    opts: &SpyOptions,
) -> TypeSpec {
    let mut fields = Vec::new();
    if opts.thread_safe {
        fields.push(StructField::new(LOCK_FIELD, TypeExpr::qualified("sync", "Mutex")));
    }
    for method in iface.methods() {
        fields.extend(method_fields(method));
    }
    TypeSpec {
        name: opts.spy_name(&contract.name),
        type_params: contract.type_params.clone(),
        alias: false,
        ty: TypeExpr::Struct(StructType { fields }),
        line: contract.line,
    }
}

fn method_fields(method: &MethodSpec) -> Vec<StructField> {
    let mut fields = vec![StructField::new(
        &called_field(&method.name),
        TypeExpr::name("bool"),
    )];
    if !method.sig.params.is_empty() {
        fields.push(StructField::new(
            &input_field(&method.name),
            capture_struct(&method.sig.params, arg_field),
        ));
    }
    if !method.sig.results.is_empty() {
        fields.push(StructField::new(
            &output_field(&method.name),
            capture_struct(&method.sig.results, ret_field),
        ));
    }
    fields
}

fn capture_struct(list: &[Field], name: fn(usize) -> String) -> TypeExpr {
    let fields = flatten(list)
        .into_iter()
        .map(|slot| StructField::new(&name(slot.index), captured_type(slot.ty)))
        .collect();
    TypeExpr::Struct(StructType { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{as_contract_decl, contracts};
    use fm_core::parse_source;

    fn record_for(src: &str, opts: &SpyOptions) -> TypeSpec {
        let file = parse_source(src, "x.go").expect("parse");
        let td = as_contract_decl(&file.decls[0]).expect("contract");
        let (spec, iface) = contracts(td).next().expect("interface");
        synthesize_record(spec, iface, opts)
    }

    fn field_lines(spec: &TypeSpec) -> Vec<String> {
        let TypeExpr::Struct(s) = &spec.ty else {
            panic!("not a struct: {:?}", spec.ty);
        };
        s.fields
            .iter()
            .map(|f| format!("{} {}", f.names.join(", "), f.ty))
            .collect()
    }

    #[test]
    fn doer_record_layout() {
        let rec = record_for(
            "package p\ntype Doer interface { DoIt(task string) error }\n",
            &SpyOptions::default(),
        );
        assert_eq!(rec.name, "FakeDoer");
        assert_eq!(
            field_lines(&rec),
            vec![
                "DoIt_Called bool",
                "DoIt_Input struct{ Arg0 string }",
                "DoIt_Output struct{ Ret0 error }",
            ]
        );
    }

    #[test]
    fn no_params_no_results_only_called_flag() {
        let rec = record_for("package p\ntype R interface { Reset() }\n", &SpyOptions::default());
        assert_eq!(field_lines(&rec), vec!["Reset_Called bool"]);
    }

    #[test]
    fn grouped_names_flatten_with_running_index() {
        let rec = record_for(
            "package p\ntype F interface { Foo(a, b string, c int) (n int, err error) }\n",
            &SpyOptions::default(),
        );
        assert_eq!(
            field_lines(&rec),
            vec![
                "Foo_Called bool",
                "Foo_Input struct{ Arg0 string; Arg1 string; Arg2 int }",
                "Foo_Output struct{ Ret0 int; Ret1 error }",
            ]
        );
    }

    #[test]
    fn zero_method_contract_is_an_empty_struct() {
        let rec = record_for("package p\ntype Marker interface{}\n", &SpyOptions::default());
        assert!(field_lines(&rec).is_empty());
    }

    #[test]
    fn thread_safe_prepends_lock_field() {
        let opts = SpyOptions {
            thread_safe: true,
            ..SpyOptions::default()
        };
        let rec = record_for("package p\ntype R interface { Reset() }\n", &opts);
        assert_eq!(field_lines(&rec), vec!["mu sync.Mutex", "Reset_Called bool"]);

        let empty = record_for("package p\ntype Marker interface{}\n", &opts);
        assert_eq!(field_lines(&empty), vec!["mu sync.Mutex"]);
    }

    #[test]
    fn embedded_elements_are_omitted_and_variadics_become_slices() {
        let rec = record_for(
            "package p
type RW interface {
	io.Reader
	Log(format string, args ...any)
}
",
            &SpyOptions::default(),
        );
        assert_eq!(
            field_lines(&rec),
            vec!["Log_Called bool", "Log_Input struct{ Arg0 string; Arg1 []any }"]
        );
    }

    #[test]
    fn prefix_and_type_params_carry_over() {
        let opts = SpyOptions {
            prefix: "Spy".into(),
            thread_safe: false,
        };
        let rec = record_for(
            "package p\ntype Store[K comparable, V any] interface { Get(k K) V }\n",
            &opts,
        );
        assert_eq!(rec.name, "SpyStore");
        assert_eq!(rec.type_params.len(), 2);
        assert_eq!(rec.type_params[0].names, vec!["K"]);
    }
}
