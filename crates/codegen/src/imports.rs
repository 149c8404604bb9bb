//! Import resolution for generated files.
//!
//! Package qualifiers used by a generated declaration are matched against
//! the imports of the source file that declared its contract. `sync` is
//! always resolvable since the lock field needs it. Files of one package
//! may bind the same qualifier to different paths; the generated file
//! imports each path once and renames clashing qualifiers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use fm_core::{Decl, ImportSpec, Package};
use tracing::debug;

/// One line of the generated import block.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Import {
    /// Explicit alias, only when it differs from the assumed package name.
    pub name: Option<String>,
    pub path: String,
}

impl Import {
    pub fn path(path: &str) -> Self {
        Import {
            name: None,
            path: path.to_owned(),
        }
    }

    /// The qualifier this import binds in the generated file.
    fn local_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| assumed_name(&self.path))
    }
}

/// Qualifiers known without a source import.
const BUILTIN: &[(&str, &str)] = &[("sync", "sync")];

/// Imports visible to each source file of a package.
#[derive(Debug, Clone, Default)]
pub struct ImportScope<'a> {
    files: Vec<(String, &'a [ImportSpec])>,
}

impl<'a> ImportScope<'a> {
    pub fn of_package(package: &'a Package) -> Self {
        ImportScope {
            files: package
                .files
                .iter()
                .map(|f| (f.path.display().to_string(), f.file.imports.as_slice()))
                .collect(),
        }
    }

    pub fn with_file(mut self, file: impl Into<String>, imports: &'a [ImportSpec]) -> Self {
        self.files.push((file.into(), imports));
        self
    }

    /// Path bound to `qualifier` in `file`. Declarations from a file the
    /// scope does not know see the first binding of any file.
    fn lookup(&self, file: &str, qualifier: &str) -> Option<String> {
        let own = self
            .files
            .iter()
            .find(|(name, _)| name == file)
            .and_then(|(_, imports)| binding(imports, qualifier));
        own.or_else(|| {
            self.files
                .iter()
                .find_map(|(_, imports)| binding(imports, qualifier))
        })
        .or_else(|| {
            BUILTIN
                .iter()
                .find(|(q, _)| *q == qualifier)
                .map(|(_, path)| (*path).to_owned())
        })
    }
}

fn binding(imports: &[ImportSpec], qualifier: &str) -> Option<String> {
    imports
        .iter()
        .find(|spec| match spec.name.as_deref() {
            Some("." | "_") => false,
            Some(alias) => alias == qualifier,
            None => assumed_name(&spec.path) == qualifier,
        })
        .map(|spec| spec.path.clone())
}

/// Imports needed by a generated file, sorted by path, and its
/// declarations with qualifiers renamed where two paths would otherwise
/// share one.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
}

/// Resolve the qualifiers of `decls` within `scope`. The first declaration
/// to use a path fixes its local name; a later path wanting a name already
/// in use gets `<name>2`, `<name>3`, ... Qualifiers with no matching import
/// are left as written and get no import.
pub fn resolve(scope: &ImportScope<'_>, mut decls: Vec<Decl>) -> Resolution {
    let mut by_path: BTreeMap<String, Import> = BTreeMap::new();
    let mut bound: HashMap<String, String> = HashMap::new();

    for decl in &mut decls {
        let file = decl.prov().file.clone();
        let mut wanted = BTreeSet::new();
        collect_qualifiers(decl, &mut |q| {
            wanted.insert(q.to_owned());
        });

        let mut renames: HashMap<String, String> = HashMap::new();
        for qualifier in wanted {
            let Some(path) = scope.lookup(&file, &qualifier) else {
                debug!(qualifier = %qualifier, file = %file, "no import found for qualifier");
                continue;
            };
            let local = match by_path.get(&path) {
                Some(import) => import.local_name(),
                None => {
                    let local = free_name(&qualifier, &bound);
                    bound.insert(local.clone(), path.clone());
                    let name = (local != assumed_name(&path)).then(|| local.clone());
                    by_path.insert(path.clone(), Import { name, path });
                    local
                }
            };
            if local != qualifier {
                renames.insert(qualifier, local);
            }
        }

        if !renames.is_empty() {
            debug!(file = %file, renames = ?renames, "renaming clashing qualifiers");
            rename_qualifiers(decl, &renames);
        }
    }

    Resolution {
        imports: by_path.into_values().collect(),
        decls,
    }
}

fn free_name(wanted: &str, bound: &HashMap<String, String>) -> String {
    if !bound.contains_key(wanted) {
        return wanted.to_owned();
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{}{}", wanted, n);
        if !bound.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn collect_qualifiers<'a>(decl: &'a Decl, f: &mut dyn FnMut(&'a str)) {
    match decl {
        Decl::Type(td) => {
            for spec in &td.specs {
                for tp in &spec.type_params {
                    tp.ty.for_each_qualifier(f);
                }
                spec.ty.for_each_qualifier(f);
            }
        }
        Decl::Func(fd) => {
            if let Some(recv) = &fd.recv {
                recv.ty.for_each_qualifier(f);
            }
            for tp in &fd.type_params {
                tp.ty.for_each_qualifier(f);
            }
            fd.sig.for_each_qualifier(f);
        }
        Decl::Value(vd) => {
            for spec in &vd.specs {
                if let Some(ty) = &spec.ty {
                    ty.for_each_qualifier(f);
                }
            }
        }
    }
}

fn rename_qualifiers(decl: &mut Decl, renames: &HashMap<String, String>) {
    let f: &mut dyn FnMut(&mut String) = &mut |q| {
        if let Some(local) = renames.get(q.as_str()) {
            q.clone_from(local);
        }
    };
    match decl {
        Decl::Type(td) => {
            for spec in &mut td.specs {
                for tp in &mut spec.type_params {
                    tp.ty.for_each_qualifier_mut(f);
                }
                spec.ty.for_each_qualifier_mut(f);
            }
        }
        Decl::Func(fd) => {
            if let Some(recv) = &mut fd.recv {
                recv.ty.for_each_qualifier_mut(f);
            }
            for tp in &mut fd.type_params {
                tp.ty.for_each_qualifier_mut(f);
            }
            fd.sig.for_each_qualifier_mut(f);
        }
        Decl::Value(vd) => {
            for spec in &mut vd.specs {
                if let Some(ty) = &mut spec.ty {
                    ty.for_each_qualifier_mut(f);
                }
            }
        }
    }
}

/// Package name Go tooling assumes for an import path: the last element,
/// skipping a trailing major-version element (`/v2`), without a `go-`
/// prefix, cut at the first non-identifier character (`yaml.v3` → `yaml`).
pub fn assumed_name(path: &str) -> String {
    let mut elems = path.rsplit('/');
    let mut base = elems.next().unwrap_or(path);
    if is_major_version(base) {
        if let Some(parent) = elems.next() {
            base = parent;
        }
    }
    let base = base.strip_prefix("go-").unwrap_or(base);
    let end = base
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(base.len());
    base[..end].to_owned()
}

fn is_major_version(elem: &str) -> bool {
    elem.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}
