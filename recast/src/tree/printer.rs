//! Debug printer rendering a tree as Java-like text.
//!
//! Output is canonical (four-space indentation, one member or statement per
//! line), not formatting-preserving. It exists to make diagnostics and test
//! expectations readable.

use super::node::{Modifier, Node, NodeKind};
use super::SourceUnit;

const INDENT: &str = "    ";

/// Renders a whole unit.
#[must_use]
pub fn render_unit(unit: &SourceUnit) -> String {
    let mut printer = Printer::default();
    if let NodeKind::Unit {
        package: Some(package),
    } = &unit.root.kind
    {
        printer.out.push_str(&format!("package {package};\n\n"));
    }
    for (i, ty) in unit.root.children.iter().enumerate() {
        if i > 0 {
            printer.out.push('\n');
        }
        printer.declaration(ty);
    }
    printer.out
}

/// Renders a single expression on one line.
#[must_use]
pub fn render_expr(node: &Node) -> String {
    let mut printer = Printer::default();
    printer.expr(node);
    printer.out
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn line_start(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn modifiers(&mut self, modifiers: &[Modifier]) {
        for modifier in modifiers {
            self.out.push_str(modifier.keyword());
            self.out.push(' ');
        }
    }

    fn declaration(&mut self, node: &Node) {
        self.line_start();
        match &node.kind {
            NodeKind::Class {
                name,
                modifiers,
                extends,
                implements,
            } => {
                self.modifiers(modifiers);
                self.out.push_str("class ");
                self.out.push_str(name);
                if let Some(parent) = extends {
                    self.out.push_str(" extends ");
                    self.out.push_str(parent);
                }
                if !implements.is_empty() {
                    self.out.push_str(" implements ");
                    self.out.push_str(&implements.join(", "));
                }
                self.out.push_str(" {\n");
                self.depth += 1;
                for member in &node.children {
                    self.declaration(member);
                }
                self.depth -= 1;
                self.line_start();
                self.out.push_str("}\n");
            }
            NodeKind::Field {
                name,
                modifiers,
                ty,
            } => {
                self.modifiers(modifiers);
                self.out.push_str(&format!("{ty} {name}"));
                if let Some(init) = node.children.first() {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push_str(";\n");
            }
            NodeKind::Method {
                name,
                modifiers,
                return_type,
            } => {
                self.modifiers(modifiers);
                self.out.push_str(&format!("{return_type} {name}("));
                let (params, body) = node.method_parts();
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    if let NodeKind::Parameter { name, ty } = &p.kind {
                        self.out.push_str(&format!("{ty} {name}"));
                    }
                }
                self.out.push(')');
                match body {
                    Some(block) => {
                        self.out.push(' ');
                        self.block(block);
                        self.out.push('\n');
                    }
                    None => self.out.push_str(";\n"),
                }
            }
            _ => {
                // Statements are accepted here so local classes print too.
                self.out.truncate(self.out.trim_end_matches(INDENT).len());
                self.stmt(node);
            }
        }
    }

    fn block(&mut self, block: &Node) {
        self.out.push_str("{\n");
        self.depth += 1;
        for stmt in &block.children {
            self.stmt(stmt);
        }
        self.depth -= 1;
        self.line_start();
        self.out.push('}');
    }

    /// Renders a statement used as the body of `if`/`while`.
    fn nested(&mut self, node: &Node) {
        if matches!(node.kind, NodeKind::Block) {
            self.block(node);
        } else {
            self.out.push_str("{\n");
            self.depth += 1;
            self.stmt(node);
            self.depth -= 1;
            self.line_start();
            self.out.push('}');
        }
    }

    fn stmt(&mut self, node: &Node) {
        if matches!(node.kind, NodeKind::Class { .. }) {
            self.declaration(node);
            return;
        }
        self.line_start();
        match &node.kind {
            NodeKind::Block => self.block(node),
            NodeKind::LocalVar { name, ty } => {
                self.out.push_str(&format!("{ty} {name}"));
                if let Some(init) = node.children.first() {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push(';');
            }
            NodeKind::ExprStmt => {
                if let Some(expr) = node.children.first() {
                    self.expr(expr);
                }
                self.out.push(';');
            }
            NodeKind::Return => {
                self.out.push_str("return");
                if let Some(expr) = node.children.first() {
                    self.out.push(' ');
                    self.expr(expr);
                }
                self.out.push(';');
            }
            NodeKind::Throw => {
                self.out.push_str("throw ");
                if let Some(expr) = node.children.first() {
                    self.expr(expr);
                }
                self.out.push(';');
            }
            NodeKind::If => self.if_chain(node),
            NodeKind::While => {
                self.out.push_str("while (");
                if let Some(cond) = node.children.first() {
                    self.expr(cond);
                }
                self.out.push_str(") ");
                if let Some(body) = node.children.get(1) {
                    self.nested(body);
                }
            }
            NodeKind::Try => self.try_stmt(node),
            _ => {
                self.expr(node);
                self.out.push(';');
            }
        }
        self.out.push('\n');
    }

    fn if_chain(&mut self, node: &Node) {
        self.out.push_str("if (");
        if let Some(cond) = node.children.first() {
            self.expr(cond);
        }
        self.out.push_str(") ");
        if let Some(then) = node.children.get(1) {
            self.nested(then);
        }
        if let Some(otherwise) = node.children.get(2) {
            self.out.push_str(" else ");
            if matches!(otherwise.kind, NodeKind::If) {
                self.if_chain(otherwise);
            } else {
                self.nested(otherwise);
            }
        }
    }

    fn try_stmt(&mut self, node: &Node) {
        self.out.push_str("try ");
        for child in &node.children {
            match &child.kind {
                NodeKind::Block => self.block(child),
                NodeKind::Catch { param, types } => {
                    self.out
                        .push_str(&format!(" catch ({} {param}) ", types.join(" | ")));
                    if let Some(block) = child.children.first() {
                        self.block(block);
                    }
                }
                NodeKind::Finally => {
                    self.out.push_str(" finally ");
                    if let Some(block) = child.children.first() {
                        self.block(block);
                    }
                }
                _ => {}
            }
        }
    }

    /// Renders `node` wrapped in parentheses when it would otherwise bind
    /// looser than a member access.
    fn operand(&mut self, node: &Node) {
        if matches!(
            node.kind,
            NodeKind::Binary { .. } | NodeKind::Assign { .. } | NodeKind::Unary { .. }
        ) {
            self.out.push('(');
            self.expr(node);
            self.out.push(')');
        } else {
            self.expr(node);
        }
    }

    fn args(&mut self, args: &[Node]) {
        self.out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(arg);
        }
        self.out.push(')');
    }

    fn expr(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::StringLit { value } => self.out.push_str(&quote(value)),
            NodeKind::Literal { text } => self.out.push_str(text),
            NodeKind::Name { name } => self.out.push_str(name),
            NodeKind::This => self.out.push_str("this"),
            NodeKind::FieldAccess { name } => {
                if let Some(target) = node.children.first() {
                    self.operand(target);
                    self.out.push('.');
                }
                self.out.push_str(name);
            }
            NodeKind::Call { name, .. } => {
                if let Some(receiver) = node.call_receiver() {
                    self.operand(receiver);
                    self.out.push('.');
                }
                self.out.push_str(name);
                self.args(node.call_args().1);
            }
            NodeKind::New { ty } => {
                self.out.push_str("new ");
                self.out.push_str(ty);
                self.args(&node.children);
            }
            NodeKind::Binary { op } | NodeKind::Assign { op } => {
                if let [lhs, rhs] = node.children.as_slice() {
                    self.expr(lhs);
                    self.out.push_str(&format!(" {op} "));
                    if matches!(rhs.kind, NodeKind::Binary { .. }) {
                        self.operand(rhs);
                    } else {
                        self.expr(rhs);
                    }
                }
            }
            NodeKind::Unary { op } => {
                self.out.push_str(op);
                if let Some(operand) = node.children.first() {
                    self.operand(operand);
                }
            }
            other => self.out.push_str(&format!("/* {other:?} */")),
        }
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
