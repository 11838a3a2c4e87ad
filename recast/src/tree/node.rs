use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::path::NodePath;

/// Declaration modifier as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// `static`
    Static,
    /// `final`
    Final,
    /// `abstract`
    Abstract,
}

impl Modifier {
    /// Source keyword for this modifier.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Static => "static",
            Self::Final => "final",
            Self::Abstract => "abstract",
        }
    }
}

/// Source position reported by the parser that produced the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed column.
    pub column: u32,
}

/// The payload of a node. Child layout per kind is fixed:
///
/// | kind          | children                          |
/// |---------------|-----------------------------------|
/// | `Unit`        | type declarations                 |
/// | `Class`       | members                           |
/// | `Field`       | `[initializer?]`                  |
/// | `Method`      | `[parameters..., body?]`          |
/// | `LocalVar`    | `[initializer?]`                  |
/// | `If`          | `[cond, then, else?]`             |
/// | `While`       | `[cond, body]`                    |
/// | `Try`         | `[block, catch..., finally?]`     |
/// | `Catch`       | `[block]`                         |
/// | `FieldAccess` | `[target]`                        |
/// | `Call`        | `[receiver?, args...]`            |
/// | `New`         | args                              |
/// | `Binary`      | `[lhs, rhs]`                      |
/// | `Assign`      | `[target, value]`                 |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Compilation unit root.
    Unit {
        /// Package declaration, if any.
        #[serde(default)]
        package: Option<String>,
    },
    /// Class declaration (top-level, nested or local).
    Class {
        /// Simple name.
        name: CompactString,
        /// Declared modifiers.
        #[serde(default)]
        modifiers: Vec<Modifier>,
        /// Superclass, if any.
        #[serde(default)]
        extends: Option<String>,
        /// Implemented interfaces.
        #[serde(default)]
        implements: Vec<String>,
    },
    /// Field declaration.
    Field {
        /// Field name.
        name: CompactString,
        /// Declared modifiers.
        #[serde(default)]
        modifiers: Vec<Modifier>,
        /// Declared type as written.
        ty: String,
    },
    /// Method declaration.
    Method {
        /// Method name.
        name: CompactString,
        /// Declared modifiers.
        #[serde(default)]
        modifiers: Vec<Modifier>,
        /// Return type as written.
        return_type: String,
    },
    /// Formal parameter.
    Parameter {
        /// Parameter name.
        name: CompactString,
        /// Declared type.
        ty: String,
    },
    /// Statement block.
    Block,
    /// Local variable declaration.
    LocalVar {
        /// Variable name.
        name: CompactString,
        /// Declared type.
        ty: String,
    },
    /// Expression statement.
    ExprStmt,
    /// `return`
    Return,
    /// `throw`
    Throw,
    /// `if`
    If,
    /// `while`
    While,
    /// `try`
    Try,
    /// `catch` clause.
    Catch {
        /// Name of the caught exception variable.
        param: CompactString,
        /// Caught exception types (more than one for multi-catch).
        types: Vec<String>,
    },
    /// `finally` clause.
    Finally,
    /// String literal.
    StringLit {
        /// Unescaped value.
        value: String,
    },
    /// Any other literal (number, boolean, char, null), kept verbatim.
    Literal {
        /// Literal text as written.
        text: String,
    },
    /// Simple identifier use.
    Name {
        /// Referenced name.
        name: CompactString,
    },
    /// `this`
    This,
    /// `target.name`
    FieldAccess {
        /// Accessed member name.
        name: CompactString,
    },
    /// Method invocation.
    Call {
        /// Invoked method name.
        name: CompactString,
        /// Whether the first child is the receiver.
        #[serde(default)]
        has_receiver: bool,
    },
    /// Instance creation.
    New {
        /// Instantiated type.
        ty: String,
    },
    /// Binary operation.
    Binary {
        /// Operator as written.
        op: String,
    },
    /// Prefix unary operation.
    Unary {
        /// Operator as written.
        op: String,
    },
    /// Assignment, plain or compound.
    Assign {
        /// Operator as written (`=`, `+=`, ...).
        op: String,
    },
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,
    /// Child nodes, laid out according to `kind`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Position in the original source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Node {
    /// Creates a node without position information.
    #[must_use]
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            span: None,
        }
    }

    /// Builder-style method to attach a source position.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Some(Span { line, column });
        self
    }

    /// The name carried by this node, for kinds that carry one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Class { name, .. }
            | NodeKind::Field { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::Parameter { name, .. }
            | NodeKind::LocalVar { name, .. }
            | NodeKind::Name { name }
            | NodeKind::FieldAccess { name }
            | NodeKind::Call { name, .. } => Some(name.as_str()),
            NodeKind::Catch { param, .. } => Some(param.as_str()),
            _ => None,
        }
    }

    /// Replaces the name carried by this node. Returns `false` when the kind
    /// carries no name.
    pub fn set_name(&mut self, new_name: &str) -> bool {
        match &mut self.kind {
            NodeKind::Class { name, .. }
            | NodeKind::Field { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::Parameter { name, .. }
            | NodeKind::LocalVar { name, .. }
            | NodeKind::Name { name }
            | NodeKind::FieldAccess { name }
            | NodeKind::Call { name, .. } => {
                *name = CompactString::from(new_name);
                true
            }
            NodeKind::Catch { param, .. } => {
                *param = CompactString::from(new_name);
                true
            }
            _ => false,
        }
    }

    /// Declared modifiers (empty for kinds without modifiers).
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        match &self.kind {
            NodeKind::Class { modifiers, .. }
            | NodeKind::Field { modifiers, .. }
            | NodeKind::Method { modifiers, .. } => modifiers,
            _ => &[],
        }
    }

    /// Whether the node declares `modifier`.
    #[must_use]
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers().contains(&modifier)
    }

    /// Whether this is a string literal.
    #[must_use]
    pub fn is_string_literal(&self) -> bool {
        matches!(self.kind, NodeKind::StringLit { .. })
    }

    /// Value of a string literal node.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::StringLit { value } => Some(value),
            _ => None,
        }
    }

    /// Receiver of a call node.
    #[must_use]
    pub fn call_receiver(&self) -> Option<&Node> {
        match self.kind {
            NodeKind::Call {
                has_receiver: true, ..
            } => self.children.first(),
            _ => None,
        }
    }

    /// Arguments of a call or `new` node, with the index of the first one.
    #[must_use]
    pub fn call_args(&self) -> (usize, &[Node]) {
        match self.kind {
            NodeKind::Call {
                has_receiver: true, ..
            } => (1, self.children.get(1..).unwrap_or(&[])),
            NodeKind::Call { .. } | NodeKind::New { .. } => (0, &self.children),
            _ => (0, &[]),
        }
    }

    /// Parameters and body of a method declaration.
    #[must_use]
    pub fn method_parts(&self) -> (&[Node], Option<&Node>) {
        if !matches!(self.kind, NodeKind::Method { .. }) {
            return (&[], None);
        }
        match self.children.last() {
            Some(last) if matches!(last.kind, NodeKind::Block) => {
                (&self.children[..self.children.len() - 1], Some(last))
            }
            _ => (&self.children, None),
        }
    }

    /// Resolves `path` relative to this node.
    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        path.indices()
            .iter()
            .try_fold(self, |node, &i| node.children.get(i as usize))
    }

    /// Mutable counterpart of [`Node::get`].
    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        path.indices()
            .iter()
            .try_fold(self, |node, &i| node.children.get_mut(i as usize))
    }

    /// Pre-order traversal. The callback receives each node's path (relative
    /// to `self`), the node, and its parent.
    pub fn walk<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&NodePath, &'a Node, Option<&'a Node>),
    {
        fn go<'a, F>(node: &'a Node, path: &mut NodePath, parent: Option<&'a Node>, f: &mut F)
        where
            F: FnMut(&NodePath, &'a Node, Option<&'a Node>),
        {
            f(path, node, parent);
            for (i, child) in node.children.iter().enumerate() {
                path.push(i);
                go(child, path, Some(node), f);
                path.pop();
            }
        }
        go(self, &mut NodePath::root(), None, f);
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }
}
