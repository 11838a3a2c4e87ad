//! Per-unit symbol table and scope resolution.
//!
//! The table is rebuilt for every unit and thrown away afterwards; nothing is
//! shared across units. Scopes and symbols live in arenas addressed by
//! [`ScopeId`] and [`SymbolId`].

mod resolver;

pub use resolver::resolve;

use crate::constants::IMPLICIT_OBJECT_MEMBERS;
use crate::tree::{NodePath, Span};
use compact_str::CompactString;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;

/// Identifies a lexical scope within one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a symbol within one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    /// The unit itself.
    Unit,
    /// A class body.
    Type,
    /// A method (parameters and locals).
    Member,
}

/// What a symbol declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    /// A class.
    Type,
    /// A field.
    Field,
    /// A method.
    Method,
    /// A method parameter.
    Parameter,
    /// A local variable or caught exception.
    Local,
}

impl SymbolKind {
    /// Names of different namespaces may coexist in one scope.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::Type => Namespace::Type,
            Self::Method => Namespace::Method,
            Self::Field | Self::Parameter | Self::Local => Namespace::Value,
        }
    }
}

/// Name spaces that may reuse the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Fields, parameters, locals.
    Value,
    /// Methods.
    Method,
    /// Classes.
    Type,
}

/// Whether a declaration can be reached from outside the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    /// Reachable (or possibly reachable) from outside.
    Public,
    /// Only reachable from inside the unit.
    NonPublic,
}

/// A named declaration.
#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    /// Arena id.
    pub id: SymbolId,
    /// Declared name.
    pub name: CompactString,
    /// Kind of declaration.
    pub kind: SymbolKind,
    /// Computed visibility.
    pub visibility: Visibility,
    /// Set when `visibility` is `Public` only because it could not be proven
    /// otherwise.
    pub ambiguous: bool,
    /// Scope the name is declared in.
    pub declaring_scope: ScopeId,
    /// Path of the declaring node.
    pub declaration: NodePath,
    /// Source position of the declaring node.
    pub span: Option<Span>,
}

/// A lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Arena id.
    pub id: ScopeId,
    /// What introduced the scope.
    pub kind: ScopeKind,
    /// Enclosing scope, `None` for the unit scope.
    pub parent: Option<ScopeId>,
    /// Directly nested scopes.
    pub children: Vec<ScopeId>,
    /// Path of the introducing node.
    pub node: NodePath,
    /// For type scopes: the type has a supertype declared outside the unit.
    pub opaque: bool,
    names: FxHashMap<CompactString, SmallVec<[SymbolId; 2]>>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>, node: NodePath) -> Self {
        Self {
            id,
            kind,
            parent,
            children: Vec::new(),
            node,
            opaque: false,
            names: FxHashMap::default(),
        }
    }

    /// Whether any symbol with `name` is declared directly in this scope.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }
}

/// A pre-existing problem in the input, recorded but never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Anomaly {
    /// Two declarations share a name and namespace within one scope.
    DuplicateDeclaration {
        /// Scope holding both declarations.
        scope: ScopeId,
        /// The shared name.
        name: CompactString,
        /// Path of the later declaration.
        path: NodePath,
    },
}

/// Result of resolving one unit.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    scope_of_node: FxHashMap<NodePath, ScopeId>,
    symbol_of_node: FxHashMap<NodePath, SymbolId>,
    references: FxHashMap<SymbolId, Vec<NodePath>>,
    unresolved: FxHashMap<CompactString, Vec<NodePath>>,
    duplicated: FxHashSet<SymbolId>,
    anomalies: Vec<Anomaly>,
    hierarchy: DiGraph<ScopeId, ()>,
    type_nodes: FxHashMap<ScopeId, NodeIndex>,
}

impl ScopeTree {
    /// The unit scope.
    #[must_use]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Looks up a scope.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// All scopes, unit scope first.
    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Looks up a symbol.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// All symbols in declaration order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbols declared directly in `scope`, in declaration order.
    pub fn symbols_in_scope(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> + '_ {
        self.symbols
            .iter()
            .filter(move |s| s.declaring_scope == scope)
    }

    /// Scope introduced by the class or method node at `path`.
    #[must_use]
    pub fn scope_of(&self, path: &NodePath) -> Option<ScopeId> {
        self.scope_of_node.get(path).copied()
    }

    /// Symbol declared by the node at `path`.
    #[must_use]
    pub fn symbol_at(&self, path: &NodePath) -> Option<SymbolId> {
        self.symbol_of_node.get(path).copied()
    }

    /// Innermost scope enclosing the node at `path`.
    #[must_use]
    pub fn innermost_scope(&self, path: &NodePath) -> ScopeId {
        let mut current = Some(path.clone());
        while let Some(p) = current {
            if let Some(scope) = self.scope_of(&p) {
                return scope;
            }
            current = p.parent();
        }
        self.root()
    }

    /// Identifier uses bound to `symbol`.
    #[must_use]
    pub fn references(&self, symbol: SymbolId) -> &[NodePath] {
        self.references.get(&symbol).map_or(&[], Vec::as_slice)
    }

    /// Identifier uses named `name` that could not be bound.
    #[must_use]
    pub fn unresolved(&self, name: &str) -> &[NodePath] {
        self.unresolved.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether `symbol` shares its name and namespace with another
    /// declaration of the same scope.
    #[must_use]
    pub fn is_duplicated(&self, symbol: SymbolId) -> bool {
        self.duplicated.contains(&symbol)
    }

    /// Pre-existing anomalies found while resolving.
    #[must_use]
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Whether `ancestor` is `scope` or encloses it.
    #[must_use]
    pub fn encloses(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.scope(id).parent;
        }
        false
    }

    /// Whether one of the scopes encloses the other.
    #[must_use]
    pub fn are_related(&self, a: ScopeId, b: ScopeId) -> bool {
        self.encloses(a, b) || self.encloses(b, a)
    }

    /// Type scopes `ty` inherits from inside the unit, excluding itself.
    #[must_use]
    pub fn type_ancestors(&self, ty: ScopeId) -> Vec<ScopeId> {
        let Some(&start) = self.type_nodes.get(&ty) else {
            return Vec::new();
        };
        let mut dfs = Dfs::new(&self.hierarchy, start);
        let mut out = Vec::new();
        while let Some(n) = dfs.next(&self.hierarchy) {
            if n != start {
                out.push(self.hierarchy[n]);
            }
        }
        out
    }

    /// Type scopes inside the unit inheriting from `ty`, excluding itself.
    #[must_use]
    pub fn type_descendants(&self, ty: ScopeId) -> Vec<ScopeId> {
        let Some(&start) = self.type_nodes.get(&ty) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.hierarchy);
        let mut dfs = Dfs::new(reversed, start);
        let mut out = Vec::new();
        while let Some(n) = dfs.next(reversed) {
            if n != start {
                out.push(self.hierarchy[n]);
            }
        }
        out
    }

    /// Whether a type scope, or any type it inherits from inside the unit,
    /// has a supertype declared outside the unit.
    #[must_use]
    pub fn is_opaque(&self, ty: ScopeId) -> bool {
        self.scope(ty).opaque
            || self
                .type_ancestors(ty)
                .into_iter()
                .any(|a| self.scope(a).opaque)
    }

    /// True iff no symbol named `name` is visible from `scope`: the scope
    /// itself, every enclosing scope, and for every type on that chain the
    /// types it inherits from inside the unit. Names of unresolved uses and
    /// the members every class inherits implicitly count as taken.
    #[must_use]
    pub fn is_name_free(&self, scope: ScopeId, name: &str) -> bool {
        if IMPLICIT_OBJECT_MEMBERS.contains(&name) || self.unresolved.contains_key(name) {
            return false;
        }
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if s.declares(name) {
                return false;
            }
            if s.kind == ScopeKind::Type
                && self
                    .type_ancestors(id)
                    .into_iter()
                    .any(|a| self.scope(a).declares(name))
            {
                return false;
            }
            current = s.parent;
        }
        true
    }

    /// True iff no scope nested in `scope`, and no type inheriting from it
    /// inside the unit (nor anything nested in such a type), declares `name`.
    #[must_use]
    pub fn is_name_free_below(&self, scope: ScopeId, name: &str) -> bool {
        let mut roots = vec![scope];
        if self.scope(scope).kind == ScopeKind::Type {
            roots.extend(self.type_descendants(scope));
        }
        let mut seen = FxHashSet::default();
        let mut stack: Vec<ScopeId> = Vec::new();
        for root in roots {
            stack.extend(self.scope(root).children.iter().copied());
            if root != scope && self.scope(root).declares(name) {
                return false;
            }
        }
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let s = self.scope(id);
            if s.declares(name) {
                return false;
            }
            stack.extend(s.children.iter().copied());
        }
        true
    }

    /// Whether a type scope strictly inside `to`, on the chain from `from`
    /// up to `to`, has a supertype outside the unit. Inherited members of such
    /// a type may shadow names declared in `to`. Also true when `to` does not
    /// enclose `from`.
    #[must_use]
    pub fn has_opaque_type_between(&self, from: ScopeId, to: ScopeId) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            if id == to {
                return false;
            }
            let s = self.scope(id);
            if s.kind == ScopeKind::Type && self.is_opaque(id) {
                return true;
            }
            current = s.parent;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build::*;
    use crate::tree::Modifier;

    #[test]
    fn test_name_free_checks_enclosing_and_nested() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("FOO", "String", &[Modifier::Private], Some(string("x"))),
                    method(
                        "m",
                        "void",
                        &[],
                        vec![param("p", "int")],
                        vec![local("counter", "int", Some(lit("0")))],
                    ),
                ],
            )],
        );
        let scopes = resolve(&unit);
        let class_scope = scopes.scope_of(&NodePath::from_indices(&[0])).unwrap();
        let method_scope = scopes.scope_of(&NodePath::from_indices(&[0, 1])).unwrap();
        assert!(!scopes.is_name_free(class_scope, "FOO"));
        assert!(!scopes.is_name_free(method_scope, "FOO"));
        assert!(!scopes.is_name_free(method_scope, "p"));
        assert!(scopes.is_name_free(class_scope, "counter"));
        assert!(!scopes.is_name_free_below(class_scope, "counter"));
        assert!(scopes.is_name_free_below(class_scope, "FOO"));
        assert!(!scopes.is_name_free(class_scope, "toString"));
    }

    #[test]
    fn test_inherited_member_blocks_name() {
        let unit = unit(
            "T",
            vec![
                class(
                    "Base",
                    &[],
                    vec![field("FOO", "String", &[Modifier::Private], None)],
                ),
                subclass("T", &[Modifier::Public], "Base", vec![]),
            ],
        );
        let scopes = resolve(&unit);
        let t = scopes.scope_of(&NodePath::from_indices(&[1])).unwrap();
        let base = scopes.scope_of(&NodePath::from_indices(&[0])).unwrap();
        assert!(!scopes.is_name_free(t, "FOO"));
        assert_eq!(scopes.type_ancestors(t), vec![base]);
        assert_eq!(scopes.type_descendants(base), vec![t]);
        assert!(!scopes.is_opaque(t));
    }

    #[test]
    fn test_external_supertype_is_opaque() {
        let unit = unit(
            "T",
            vec![subclass(
                "T",
                &[Modifier::Public],
                "java.util.AbstractList",
                vec![class("Inner", &[Modifier::Private], vec![])],
            )],
        );
        let scopes = resolve(&unit);
        let t = scopes.scope_of(&NodePath::from_indices(&[0])).unwrap();
        let inner = scopes.scope_of(&NodePath::from_indices(&[0, 0])).unwrap();
        assert!(scopes.is_opaque(t));
        assert!(!scopes.has_opaque_type_between(inner, t));
        assert!(scopes.has_opaque_type_between(inner, scopes.root()));
    }
}
