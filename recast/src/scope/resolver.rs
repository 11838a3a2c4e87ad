use super::{
    Anomaly, Namespace, Scope, ScopeId, ScopeKind, ScopeTree, Symbol, SymbolId, SymbolKind,
    Visibility,
};
use crate::tree::{Modifier, Node, NodeKind, NodePath, SourceUnit};
use compact_str::CompactString;
use petgraph::graph::DiGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Builds the scope tree of `unit`.
///
/// Two linear passes: the first declares every scope and symbol, the second
/// binds identifier uses to declarations by name, following lexical scoping
/// and the type hierarchy inside the unit. Uses that cannot be bound with
/// certainty are recorded as unresolved.
#[must_use]
pub fn resolve(unit: &SourceUnit) -> ScopeTree {
    let mut declarer = Declarer::new();
    let root = declarer.tree.root();
    declarer.declare_children(&unit.root, &mut NodePath::root(), root, false, false);
    let mut tree = declarer.finish();

    let mut binder = Binder {
        tree: &mut tree,
        frames: Vec::new(),
    };
    binder.bind(&unit.root, &mut NodePath::root());

    tracing::trace!(
        unit = %unit.name,
        scopes = tree.scopes.len(),
        symbols = tree.symbols.len(),
        unresolved = tree.unresolved.len(),
        "resolved scopes"
    );
    tree
}

struct TypeDecl {
    scope: ScopeId,
    supertypes: Vec<String>,
}

struct Declarer {
    tree: ScopeTree,
    types: Vec<TypeDecl>,
    types_by_name: FxHashMap<CompactString, SmallVec<[ScopeId; 1]>>,
}

impl Declarer {
    fn new() -> Self {
        let unit_scope = Scope::new(ScopeId(0), ScopeKind::Unit, None, NodePath::root());
        Self {
            tree: ScopeTree {
                scopes: vec![unit_scope],
                symbols: Vec::new(),
                scope_of_node: FxHashMap::default(),
                symbol_of_node: FxHashMap::default(),
                references: FxHashMap::default(),
                unresolved: FxHashMap::default(),
                duplicated: FxHashSet::default(),
                anomalies: Vec::new(),
                hierarchy: DiGraph::new(),
                type_nodes: FxHashMap::default(),
            },
            types: Vec::new(),
            types_by_name: FxHashMap::default(),
        }
    }

    fn new_scope(&mut self, kind: ScopeKind, parent: ScopeId, node: &NodePath) -> ScopeId {
        let id = ScopeId(u32::try_from(self.tree.scopes.len()).unwrap_or(u32::MAX));
        self.tree
            .scopes
            .push(Scope::new(id, kind, Some(parent), node.clone()));
        self.tree.scopes[parent.index()].children.push(id);
        self.tree.scope_of_node.insert(node.clone(), id);
        id
    }

    fn declare(
        &mut self,
        node: &Node,
        path: &NodePath,
        kind: SymbolKind,
        scope: ScopeId,
        visibility: Visibility,
        ambiguous: bool,
    ) {
        let Some(name) = node.name() else {
            return;
        };
        let name = CompactString::from(name);
        let id = SymbolId(u32::try_from(self.tree.symbols.len()).unwrap_or(u32::MAX));

        // Locals of sibling blocks share the member scope and may reuse names.
        let namespace = kind.namespace();
        let is_member = matches!(kind, SymbolKind::Type | SymbolKind::Field | SymbolKind::Method);
        let clash = self.tree.scopes[scope.index()]
            .names
            .get(&name)
            .into_iter()
            .flatten()
            .copied()
            .filter(|_| is_member)
            .find(|other| self.tree.symbols[other.index()].kind.namespace() == namespace);
        if let Some(other) = clash {
            tracing::debug!(%name, %path, "duplicate declaration in one scope");
            self.tree.duplicated.insert(other);
            self.tree.duplicated.insert(id);
            self.tree.anomalies.push(Anomaly::DuplicateDeclaration {
                scope,
                name: name.clone(),
                path: path.clone(),
            });
        }

        self.tree.symbols.push(Symbol {
            id,
            name: name.clone(),
            kind,
            visibility,
            ambiguous,
            declaring_scope: scope,
            declaration: path.clone(),
            span: node.span,
        });
        self.tree.scopes[scope.index()]
            .names
            .entry(name)
            .or_default()
            .push(id);
        self.tree.symbol_of_node.insert(path.clone(), id);
    }

    /// `contained`: the enclosing type is private or local (possibly
    /// transitively), so its members cannot be named from outside the unit.
    fn declare_children(
        &mut self,
        node: &Node,
        path: &mut NodePath,
        scope: ScopeId,
        in_body: bool,
        contained: bool,
    ) {
        for (i, child) in node.children.iter().enumerate() {
            path.push(i);
            self.declare_node(child, path, scope, in_body, contained);
            path.pop();
        }
    }

    fn declare_node(
        &mut self,
        node: &Node,
        path: &mut NodePath,
        scope: ScopeId,
        in_body: bool,
        contained: bool,
    ) {
        match &node.kind {
            NodeKind::Class {
                name,
                extends,
                implements,
                ..
            } => {
                let (visibility, ambiguous) = if in_body {
                    (Visibility::NonPublic, false)
                } else {
                    self.member_visibility(node, scope, contained)
                };
                let contained =
                    contained || in_body || node.has_modifier(Modifier::Private);
                self.declare(node, path, SymbolKind::Type, scope, visibility, ambiguous);
                let type_scope = self.new_scope(ScopeKind::Type, scope, path);
                self.types.push(TypeDecl {
                    scope: type_scope,
                    supertypes: extends.iter().chain(implements).cloned().collect(),
                });
                self.types_by_name
                    .entry(name.clone())
                    .or_default()
                    .push(type_scope);
                self.declare_children(node, path, type_scope, false, contained);
            }
            NodeKind::Field { .. } => {
                let (visibility, ambiguous) = self.member_visibility(node, scope, contained);
                self.declare(node, path, SymbolKind::Field, scope, visibility, ambiguous);
                self.declare_children(node, path, scope, in_body, contained);
            }
            NodeKind::Method { .. } => {
                let (visibility, ambiguous) = self.member_visibility(node, scope, contained);
                self.declare(node, path, SymbolKind::Method, scope, visibility, ambiguous);
                let member = self.new_scope(ScopeKind::Member, scope, path);
                self.declare_children(node, path, member, true, contained);
            }
            NodeKind::Parameter { .. } => {
                self.declare(
                    node,
                    path,
                    SymbolKind::Parameter,
                    scope,
                    Visibility::NonPublic,
                    false,
                );
            }
            NodeKind::LocalVar { .. } | NodeKind::Catch { .. } => {
                self.declare(node, path, SymbolKind::Local, scope, Visibility::NonPublic, false);
                self.declare_children(node, path, scope, in_body, contained);
            }
            _ => self.declare_children(node, path, scope, in_body, contained),
        }
    }

    /// Visibility of a member (or nested type) declared directly in `scope`.
    fn member_visibility(&self, node: &Node, scope: ScopeId, contained: bool) -> (Visibility, bool) {
        if node.has_modifier(Modifier::Private) {
            return (Visibility::NonPublic, false);
        }
        if !contained {
            return (Visibility::Public, false);
        }
        // A non-private member of a type nobody outside can name is still
        // reachable if it overrides something the type inherits.
        let declaring_type_has_supertypes = self
            .types
            .iter()
            .find(|t| t.scope == scope)
            .is_some_and(|t| !t.supertypes.is_empty());
        if declaring_type_has_supertypes {
            (Visibility::Public, true)
        } else {
            (Visibility::NonPublic, false)
        }
    }

    fn finish(mut self) -> ScopeTree {
        for ty in &self.types {
            let index = self.tree.hierarchy.add_node(ty.scope);
            self.tree.type_nodes.insert(ty.scope, index);
        }
        for ty in &self.types {
            for supertype in &ty.supertypes {
                // Qualified or generic names are matched on their simple name.
                let simple = simple_type_name(supertype);
                match self.types_by_name.get(simple).map(SmallVec::as_slice) {
                    Some([target]) if *target != ty.scope => {
                        let from = self.tree.type_nodes[&ty.scope];
                        let to = self.tree.type_nodes[target];
                        self.tree.hierarchy.add_edge(from, to, ());
                    }
                    _ => self.tree.scopes[ty.scope.index()].opaque = true,
                }
            }
        }
        self.tree
    }
}

fn simple_type_name(ty: &str) -> &str {
    let base = ty.split('<').next().unwrap_or(ty);
    base.rsplit('.').next().unwrap_or(base).trim()
}

enum Frame {
    Type(ScopeId),
    Locals(Vec<(CompactString, SymbolId)>),
}

enum Lookup {
    Found(SymbolId),
    NotFound,
    Opaque,
}

struct Binder<'t> {
    tree: &'t mut ScopeTree,
    frames: Vec<Frame>,
}

impl Binder<'_> {
    fn bind_children(&mut self, node: &Node, path: &mut NodePath) {
        for (i, child) in node.children.iter().enumerate() {
            path.push(i);
            self.bind(child, path);
            path.pop();
        }
    }

    fn locals_mark(&self) -> Option<usize> {
        match self.frames.last() {
            Some(Frame::Locals(locals)) => Some(locals.len()),
            _ => None,
        }
    }

    fn truncate_locals(&mut self, mark: Option<usize>) {
        if let (Some(mark), Some(Frame::Locals(locals))) = (mark, self.frames.last_mut()) {
            locals.truncate(mark);
        }
    }

    fn add_local(&mut self, node: &Node, path: &NodePath) {
        let (Some(name), Some(id)) = (node.name(), self.tree.symbol_at(path)) else {
            return;
        };
        if let Some(Frame::Locals(locals)) = self.frames.last_mut() {
            locals.push((CompactString::from(name), id));
        }
    }

    fn bind(&mut self, node: &Node, path: &mut NodePath) {
        match &node.kind {
            NodeKind::Class { .. } => {
                let Some(scope) = self.tree.scope_of(path) else {
                    return;
                };
                self.frames.push(Frame::Type(scope));
                self.bind_children(node, path);
                self.frames.pop();
            }
            NodeKind::Method { .. } => {
                self.frames.push(Frame::Locals(Vec::new()));
                for (i, child) in node.children.iter().enumerate() {
                    path.push(i);
                    if matches!(child.kind, NodeKind::Parameter { .. }) {
                        self.add_local(child, path);
                    } else {
                        self.bind(child, path);
                    }
                    path.pop();
                }
                self.frames.pop();
            }
            NodeKind::Block => {
                let mark = self.locals_mark();
                self.bind_children(node, path);
                self.truncate_locals(mark);
            }
            NodeKind::LocalVar { .. } => {
                self.bind_children(node, path);
                self.add_local(node, path);
            }
            NodeKind::Catch { .. } => {
                let mark = self.locals_mark();
                self.add_local(node, path);
                self.bind_children(node, path);
                self.truncate_locals(mark);
            }
            NodeKind::Name { name } => {
                let found = self.lookup(name, Namespace::Value, false);
                self.record(name, path, found);
            }
            NodeKind::Call { name, has_receiver } => {
                let found = match node.children.first() {
                    None if *has_receiver => None,
                    Some(receiver) if *has_receiver => {
                        if matches!(receiver.kind, NodeKind::This) {
                            self.lookup(name, Namespace::Method, true)
                        } else {
                            None
                        }
                    }
                    _ => self.lookup(name, Namespace::Method, false),
                };
                self.record(name, path, found);
                self.bind_children(node, path);
            }
            NodeKind::FieldAccess { name } => {
                let found = match node.children.first().map(|t| &t.kind) {
                    Some(NodeKind::This) => self.lookup(name, Namespace::Value, true),
                    _ => None,
                };
                self.record(name, path, found);
                self.bind_children(node, path);
            }
            _ => self.bind_children(node, path),
        }
    }

    fn record(&mut self, name: &CompactString, path: &NodePath, found: Option<SymbolId>) {
        match found {
            Some(id) => self
                .tree
                .references
                .entry(id)
                .or_default()
                .push(path.clone()),
            None => {
                tracing::trace!(%name, %path, "unresolved reference");
                self.tree
                    .unresolved
                    .entry(name.clone())
                    .or_default()
                    .push(path.clone());
            }
        }
    }

    /// Walks frames innermost-out. With `own_type_only`, stops after the
    /// innermost type frame (member access through `this`).
    fn lookup(&self, name: &str, namespace: Namespace, own_type_only: bool) -> Option<SymbolId> {
        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Locals(locals) => {
                    if own_type_only || namespace != Namespace::Value {
                        continue;
                    }
                    if let Some((_, id)) = locals.iter().rev().find(|(n, _)| n == name) {
                        return Some(*id);
                    }
                }
                Frame::Type(scope) => match self.lookup_in_type(*scope, name, namespace) {
                    Lookup::Found(id) => return Some(id),
                    Lookup::Opaque => return None,
                    Lookup::NotFound if own_type_only => return None,
                    Lookup::NotFound => {}
                },
            }
        }
        None
    }

    fn lookup_in_type(&self, ty: ScopeId, name: &str, namespace: Namespace) -> Lookup {
        let find = |scope: ScopeId| {
            self.tree.scope(scope).names.get(name).and_then(|ids| {
                ids.iter()
                    .copied()
                    .find(|id| self.tree.symbol(*id).kind.namespace() == namespace)
                    .filter(|id| {
                        let kind = self.tree.symbol(*id).kind;
                        matches!(kind, SymbolKind::Field | SymbolKind::Method)
                    })
            })
        };
        if let Some(id) = find(ty) {
            return Lookup::Found(id);
        }
        for ancestor in self.tree.type_ancestors(ty) {
            if let Some(id) = find(ancestor) {
                return Lookup::Found(id);
            }
        }
        if self.tree.is_opaque(ty) {
            Lookup::Opaque
        } else {
            Lookup::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build::*;

    fn path(indices: &[u32]) -> NodePath {
        NodePath::from_indices(indices)
    }

    #[test]
    fn test_private_method_call_is_bound() {
        // class TestClass {
        //     public String foo_foo() { return bar_bar(); }
        //     private String bar_bar() { return "bar_bar"; }
        // }
        let unit = unit(
            "TestClass",
            vec![class(
                "TestClass",
                &[],
                vec![
                    method(
                        "foo_foo",
                        "String",
                        &[Modifier::Public],
                        vec![],
                        vec![ret(Some(call("bar_bar", vec![])))],
                    ),
                    method(
                        "bar_bar",
                        "String",
                        &[Modifier::Private],
                        vec![],
                        vec![ret(Some(string("bar_bar")))],
                    ),
                ],
            )],
        );
        let scopes = resolve(&unit);
        let bar = scopes.symbol_at(&path(&[0, 1])).unwrap();
        assert_eq!(scopes.symbol(bar).visibility, Visibility::NonPublic);
        assert_eq!(scopes.references(bar), &[path(&[0, 0, 0, 0, 0])]);
        let foo = scopes.symbol_at(&path(&[0, 0])).unwrap();
        assert_eq!(scopes.symbol(foo).visibility, Visibility::Public);
    }

    #[test]
    fn test_local_shadows_field_only_inside_its_block() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("count", "int", &[Modifier::Private], None),
                    method(
                        "m",
                        "void",
                        &[],
                        vec![],
                        vec![
                            block(vec![
                                local("count", "int", Some(lit("1"))),
                                expr_stmt(name("count")),
                            ]),
                            expr_stmt(name("count")),
                        ],
                    ),
                ],
            )],
        );
        let scopes = resolve(&unit);
        let field = scopes.symbol_at(&path(&[0, 0])).unwrap();
        let local = scopes.symbol_at(&path(&[0, 1, 0, 0, 0])).unwrap();
        assert_eq!(scopes.references(local), &[path(&[0, 1, 0, 0, 1, 0])]);
        assert_eq!(scopes.references(field), &[path(&[0, 1, 0, 1, 0])]);
    }

    #[test]
    fn test_foreign_receiver_is_unresolved() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![method(
                    "m",
                    "void",
                    &[],
                    vec![param("other", "T")],
                    vec![expr_stmt(method_call(name("other"), "helper_fn", vec![]))],
                )],
            )],
        );
        let scopes = resolve(&unit);
        assert_eq!(scopes.unresolved("helper_fn").len(), 1);
        let other = scopes.symbol_at(&path(&[0, 0, 0])).unwrap();
        assert_eq!(scopes.references(other).len(), 1);
    }

    #[test]
    fn test_duplicate_methods_are_recorded() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    method("do_it", "void", &[Modifier::Private], vec![], vec![]),
                    method(
                        "do_it",
                        "void",
                        &[Modifier::Private],
                        vec![param("x", "int")],
                        vec![],
                    ),
                    field("do_it", "int", &[Modifier::Private], None),
                ],
            )],
        );
        let scopes = resolve(&unit);
        assert_eq!(scopes.anomalies().len(), 1);
        let first = scopes.symbol_at(&path(&[0, 0])).unwrap();
        let field = scopes.symbol_at(&path(&[0, 2])).unwrap();
        assert!(scopes.is_duplicated(first));
        assert!(!scopes.is_duplicated(field));
    }

    #[test]
    fn test_members_of_private_nested_type() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[Modifier::Public],
                vec![
                    class(
                        "Plain",
                        &[Modifier::Private],
                        vec![method("run_it", "void", &[], vec![], vec![])],
                    ),
                    Node::new(
                        NodeKind::Class {
                            name: "Task".into(),
                            modifiers: vec![Modifier::Private],
                            extends: None,
                            implements: vec!["Runnable".to_owned()],
                        },
                        vec![method("run_it", "void", &[], vec![], vec![])],
                    ),
                ],
            )],
        );
        let scopes = resolve(&unit);
        let plain = scopes.symbol(scopes.symbol_at(&path(&[0, 0, 0])).unwrap());
        assert_eq!(plain.visibility, Visibility::NonPublic);
        let task = scopes.symbol(scopes.symbol_at(&path(&[0, 1, 0])).unwrap());
        assert_eq!(task.visibility, Visibility::Public);
        assert!(task.ambiguous);
    }

    #[test]
    fn test_inherited_field_through_opaque_type_is_unresolved() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("limit_value", "int", &[Modifier::Private], None),
                    subclass(
                        "Inner",
                        &[Modifier::Private],
                        "Thread",
                        vec![method(
                            "m",
                            "void",
                            &[],
                            vec![],
                            vec![expr_stmt(name("limit_value"))],
                        )],
                    ),
                ],
            )],
        );
        let scopes = resolve(&unit);
        assert_eq!(scopes.unresolved("limit_value").len(), 1);
        let field = scopes.symbol_at(&path(&[0, 0])).unwrap();
        assert!(scopes.references(field).is_empty());
    }

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name("java.util.List<String>"), "List");
        assert_eq!(simple_type_name("Base"), "Base");
    }
}
