//! Terse constructors for building trees by hand.
//!
//! ```
//! use recast::tree::build::*;
//! use recast::tree::Modifier;
//!
//! let unit = unit("Test", vec![class(
//!     "Test",
//!     &[Modifier::Public],
//!     vec![method(
//!         "f",
//!         "void",
//!         &[Modifier::Public],
//!         vec![],
//!         vec![expr_stmt(call("info", vec![string("hello")]))],
//!     )],
//! )]);
//! assert_eq!(unit.root.children.len(), 1);
//! ```

use super::node::{Modifier, Node, NodeKind};
use super::SourceUnit;
use compact_str::CompactString;

/// A unit named `name` holding the given type declarations.
#[must_use]
pub fn unit(name: &str, types: Vec<Node>) -> SourceUnit {
    SourceUnit::new(name, types)
}

/// A class declaration.
#[must_use]
pub fn class(name: &str, modifiers: &[Modifier], members: Vec<Node>) -> Node {
    Node::new(
        NodeKind::Class {
            name: CompactString::from(name),
            modifiers: modifiers.to_vec(),
            extends: None,
            implements: Vec::new(),
        },
        members,
    )
}

/// A class declaration with a superclass.
#[must_use]
pub fn subclass(name: &str, modifiers: &[Modifier], extends: &str, members: Vec<Node>) -> Node {
    Node::new(
        NodeKind::Class {
            name: CompactString::from(name),
            modifiers: modifiers.to_vec(),
            extends: Some(extends.to_owned()),
            implements: Vec::new(),
        },
        members,
    )
}

/// A field declaration.
#[must_use]
pub fn field(name: &str, ty: &str, modifiers: &[Modifier], init: Option<Node>) -> Node {
    Node::new(
        NodeKind::Field {
            name: CompactString::from(name),
            modifiers: modifiers.to_vec(),
            ty: ty.to_owned(),
        },
        init.into_iter().collect(),
    )
}

/// A method declaration with a body.
#[must_use]
pub fn method(
    name: &str,
    return_type: &str,
    modifiers: &[Modifier],
    params: Vec<Node>,
    body: Vec<Node>,
) -> Node {
    let mut children = params;
    children.push(block(body));
    Node::new(
        NodeKind::Method {
            name: CompactString::from(name),
            modifiers: modifiers.to_vec(),
            return_type: return_type.to_owned(),
        },
        children,
    )
}

/// A formal parameter.
#[must_use]
pub fn param(name: &str, ty: &str) -> Node {
    Node::new(
        NodeKind::Parameter {
            name: CompactString::from(name),
            ty: ty.to_owned(),
        },
        Vec::new(),
    )
}

/// A statement block.
#[must_use]
pub fn block(stmts: Vec<Node>) -> Node {
    Node::new(NodeKind::Block, stmts)
}

/// A local variable declaration.
#[must_use]
pub fn local(name: &str, ty: &str, init: Option<Node>) -> Node {
    Node::new(
        NodeKind::LocalVar {
            name: CompactString::from(name),
            ty: ty.to_owned(),
        },
        init.into_iter().collect(),
    )
}

/// An expression statement.
#[must_use]
pub fn expr_stmt(expr: Node) -> Node {
    Node::new(NodeKind::ExprStmt, vec![expr])
}

/// A `return` statement.
#[must_use]
pub fn ret(expr: Option<Node>) -> Node {
    Node::new(NodeKind::Return, expr.into_iter().collect())
}

/// A `throw` statement.
#[must_use]
pub fn throw(expr: Node) -> Node {
    Node::new(NodeKind::Throw, vec![expr])
}

/// An `if` statement.
#[must_use]
pub fn if_stmt(cond: Node, then: Node, otherwise: Option<Node>) -> Node {
    let mut children = vec![cond, then];
    children.extend(otherwise);
    Node::new(NodeKind::If, children)
}

/// A `while` statement.
#[must_use]
pub fn while_stmt(cond: Node, body: Node) -> Node {
    Node::new(NodeKind::While, vec![cond, body])
}

/// A `try` statement.
#[must_use]
pub fn try_stmt(body: Vec<Node>, catches: Vec<Node>) -> Node {
    let mut children = vec![block(body)];
    children.extend(catches);
    Node::new(NodeKind::Try, children)
}

/// A `catch` clause.
#[must_use]
pub fn catch(param: &str, ty: &str, body: Vec<Node>) -> Node {
    Node::new(
        NodeKind::Catch {
            param: CompactString::from(param),
            types: vec![ty.to_owned()],
        },
        vec![block(body)],
    )
}

/// A `finally` clause.
#[must_use]
pub fn finally(body: Vec<Node>) -> Node {
    Node::new(NodeKind::Finally, vec![block(body)])
}

/// A string literal.
#[must_use]
pub fn string(value: &str) -> Node {
    Node::new(
        NodeKind::StringLit {
            value: value.to_owned(),
        },
        Vec::new(),
    )
}

/// A non-string literal, kept verbatim.
#[must_use]
pub fn lit(text: &str) -> Node {
    Node::new(
        NodeKind::Literal {
            text: text.to_owned(),
        },
        Vec::new(),
    )
}

/// An identifier use.
#[must_use]
pub fn name(name: &str) -> Node {
    Node::new(
        NodeKind::Name {
            name: CompactString::from(name),
        },
        Vec::new(),
    )
}

/// `this`
#[must_use]
pub fn this() -> Node {
    Node::new(NodeKind::This, Vec::new())
}

/// `target.name`
#[must_use]
pub fn field_access(target: Node, name: &str) -> Node {
    Node::new(
        NodeKind::FieldAccess {
            name: CompactString::from(name),
        },
        vec![target],
    )
}

/// A receiver-less call.
#[must_use]
pub fn call(name: &str, args: Vec<Node>) -> Node {
    Node::new(
        NodeKind::Call {
            name: CompactString::from(name),
            has_receiver: false,
        },
        args,
    )
}

/// `receiver.name(args)`
#[must_use]
pub fn method_call(receiver: Node, name: &str, args: Vec<Node>) -> Node {
    let mut children = vec![receiver];
    children.extend(args);
    Node::new(
        NodeKind::Call {
            name: CompactString::from(name),
            has_receiver: true,
        },
        children,
    )
}

/// `new ty(args)`
#[must_use]
pub fn new_object(ty: &str, args: Vec<Node>) -> Node {
    Node::new(NodeKind::New { ty: ty.to_owned() }, args)
}

/// A binary operation.
#[must_use]
pub fn binary(op: &str, lhs: Node, rhs: Node) -> Node {
    Node::new(NodeKind::Binary { op: op.to_owned() }, vec![lhs, rhs])
}

/// A prefix unary operation.
#[must_use]
pub fn unary(op: &str, operand: Node) -> Node {
    Node::new(NodeKind::Unary { op: op.to_owned() }, vec![operand])
}

/// A plain assignment.
#[must_use]
pub fn assign(target: Node, value: Node) -> Node {
    Node::new(NodeKind::Assign { op: "=".to_owned() }, vec![target, value])
}
