//! Method-body synthesis: one recording method per contract method.

use std::collections::HashSet;

use fm_core::{
    Block, Expr, Field, FuncDecl, InterfaceType, MethodSpec, Provenance, Signature, Stmt,
    TypeExpr, TypeSpec,
};

use crate::flatten::{flatten, Slot};
use crate::record::{arg_field, called_field, input_field, output_field, ret_field};
use crate::{SpyOptions, LOCK_FIELD, RECEIVER};

/// Receiver shared by every method of one spy.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: String,
    /// `*FakeDoer`, or `*FakeStore[K, V]` for generic contracts.
    pub ty: TypeExpr,
    /// Type parameter names bound by the receiver, `K` and `V` above.
    pub type_params: Vec<String>,
}

impl Receiver {
    pub fn for_spy(contract: &TypeSpec, iface: &InterfaceType, opts: &SpyOptions) -> Self {
        let base = TypeExpr::Name(opts.spy_name(&contract.name));
        let type_params: Vec<String> = flatten(&contract.type_params)
            .iter()
            .filter_map(|slot| slot.name.map(str::to_owned))
            .collect();
        let args: Vec<TypeExpr> = type_params.iter().map(|n| TypeExpr::name(n)).collect();
        let ty = if args.is_empty() {
            base
        } else {
            TypeExpr::Generic {
                base: Box::new(base),
                args,
            }
        };
        Receiver {
            name: receiver_name(contract, iface),
            ty: TypeExpr::pointer(ty),
            type_params,
        }
    }

    fn expr(&self) -> Expr {
        Expr::ident(&self.name)
    }
}

/// `f`, unless a parameter, result or type parameter of the contract is
/// already called that; then the first free name of `fake`, `spy`, `f0`,
/// `f1`, ...
pub fn receiver_name(contract: &TypeSpec, iface: &InterfaceType) -> String {
    let taken: HashSet<&str> = iface
        .methods()
        .flat_map(|m| m.sig.params.iter().chain(&m.sig.results))
        .chain(&contract.type_params)
        .flat_map(|field| field.names.iter().map(String::as_str))
        .collect();
    for candidate in [RECEIVER, "fake", "spy"] {
        if !taken.contains(candidate) {
            return candidate.to_owned();
        }
    }
    let mut n = 0usize;
    loop {
        let candidate = format!("{}{}", RECEIVER, n);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Parameters as declared, or all renamed `arg<i>` when any of them is
/// anonymous or blank and so could not be recorded. Names in `reserved`
/// (results, receiver, type parameters) share the parameters' scope, so
/// the prefix grows underscores until no renamed parameter hits one.
pub fn callable_params(params: &[Field], reserved: &HashSet<&str>) -> Vec<Field> {
    let slots = flatten(params);
    if !slots.iter().any(Slot::is_unnamed) {
        return params.to_vec();
    }
    let mut prefix = String::from("arg");
    let clashes = |prefix: &str| {
        (0..slots.len()).any(|i| reserved.contains(format!("{}{}", prefix, i).as_str()))
    };
    while clashes(&prefix) {
        prefix.push('_');
    }
    let mut index = 0usize;
    let mut renamed = Vec::with_capacity(params.len());
    for field in params {
        let mut names = Vec::with_capacity(field.arity());
        for _ in 0..field.arity() {
            names.push(format!("{}{}", prefix, index));
            index += 1;
        }
        renamed.push(Field {
            names,
            ty: field.ty.clone(),
        });
    }
    renamed
}

/// Build the recording method for `method`:
///
/// ```go
/// func (f *FakeDoer) DoIt(task string) error {
/// 	f.DoIt_Called = true
/// 	f.DoIt_Input.Arg0 = task
/// 	return f.DoIt_Output.Ret0
/// }
/// ```
///
/// In thread-safe mode the body opens with `f.mu.Lock()` and
/// `defer f.mu.Unlock()`.
pub fn synthesize_method(
    recv: &Receiver,
    method: &MethodSpec,
    opts: &SpyOptions,
    prov: Provenance,
) -> FuncDecl {
    let reserved: HashSet<&str> = method
        .sig
        .results
        .iter()
        .flat_map(|field| field.names.iter().map(String::as_str))
        .chain(recv.type_params.iter().map(String::as_str))
        .chain([recv.name.as_str()])
        .collect();
    let params = callable_params(&method.sig.params, &reserved);
    let this = recv.expr();
    let mut stmts = Vec::new();

    if opts.thread_safe {
        let lock = this.clone().field(LOCK_FIELD);
        stmts.push(Stmt::Expr(lock.clone().field("Lock").call()));
        stmts.push(Stmt::Defer(lock.field("Unlock").call()));
    }

    stmts.push(Stmt::Assign {
        lhs: this.clone().field(&called_field(&method.name)),
        rhs: Expr::ident("true"),
    });

    let input = this.clone().field(&input_field(&method.name));
    for slot in flatten(&params) {
        if let Some(name) = slot.name {
            stmts.push(Stmt::Assign {
                lhs: input.clone().field(&arg_field(slot.index)),
                rhs: Expr::ident(name),
            });
        }
    }

    let results = flatten(&method.sig.results);
    if !results.is_empty() {
        let output = this.field(&output_field(&method.name));
        stmts.push(Stmt::Return(
            results
                .iter()
                .map(|slot| output.clone().field(&ret_field(slot.index)))
                .collect(),
        ));
    }

    FuncDecl {
        recv: Some(Field::named(&[recv.name.as_str()], recv.ty.clone())),
        name: method.name.clone(),
        type_params: Vec::new(),
        sig: Signature {
            params,
            results: method.sig.results.clone(),
        },
        body: Some(Block { stmts }),
        prov,
    }
}
