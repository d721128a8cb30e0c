// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! AST unparser: converts a [`ParseTree`] back to Luma source text.
//!
//! The output is valid Luma that re-parses to a structurally identical
//! tree, which is what the round-trip tests rely on. To keep that
//! property trivial the unparser fully parenthesizes unary and binary
//! expressions instead of reconstructing minimal parentheses from the
//! precedence table.
//!
//! String literals are re-escaped conservatively: printable ASCII is
//! emitted as-is, everything else as `\DDD` decimal escapes (always
//! three digits, so a following digit cannot extend the escape).

use std::fmt::Write as _;

use crate::ast::{
    AstArena, Expr, ExprId, FuncSigId, GenericParam, ParseTree, Stmt, StmtId, TableEntry, Type,
    TypeId, UnaryOp,
};
use crate::intern::{StringPool, Symbol};

/// Renders a parse tree as Luma source text.
#[must_use]
pub fn unparse(tree: &ParseTree, pool: &StringPool) -> String {
    let mut unparser = Unparser {
        arena: &tree.arena,
        pool,
        out: String::new(),
        level: 0,
    };
    for &stmt in tree.root_block() {
        unparser.stmt(stmt);
    }
    unparser.out
}

struct Unparser<'a> {
    arena: &'a AstArena,
    pool: &'a StringPool,
    out: String,
    level: usize,
}

impl Unparser<'_> {
    fn indent(&mut self) {
        for _ in 0..self.level {
            self.out.push_str("  ");
        }
    }

    fn name(&mut self, sym: Symbol) {
        let text = self.pool.resolve_lossy(sym).into_owned();
        self.out.push_str(&text);
    }

    /// Writes the statements of a block one level deeper.
    fn block_body(&mut self, id: StmtId) {
        self.level += 1;
        match self.arena.stmt(id) {
            Stmt::Block(stmts) => {
                for &stmt in &stmts.clone() {
                    self.stmt(stmt);
                }
            }
            _ => self.stmt(id),
        }
        self.level -= 1;
    }

    fn stmt(&mut self, id: StmtId) {
        match self.arena.stmt(id).clone() {
            Stmt::Expr(e) => {
                self.indent();
                self.expr(e);
                self.out.push_str(";\n");
            }
            Stmt::Block(stmts) => {
                for &stmt in &stmts {
                    self.stmt(stmt);
                }
            }
            Stmt::Return(values) => {
                self.indent();
                self.out.push_str("return");
                if !values.is_empty() {
                    self.out.push(' ');
                    self.expr_list(&values);
                }
                self.out.push_str(";\n");
            }
            Stmt::Break => {
                self.indent();
                self.out.push_str("break;\n");
            }
            Stmt::Assign { targets, values } => {
                self.indent();
                self.expr_list(&targets);
                self.out.push_str(" = ");
                self.expr_list(&values);
                self.out.push_str(";\n");
            }
            Stmt::Local { decls, values } => {
                self.indent();
                self.out.push_str("local ");
                for (i, decl) in decls.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.name(decl.name);
                    if let Some(ty) = decl.ty {
                        self.out.push_str(": ");
                        self.ty(ty);
                    }
                }
                if !values.is_empty() {
                    self.out.push_str(" = ");
                    self.expr_list(&values);
                }
                self.out.push_str(";\n");
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.indent();
                self.out.push_str("if ");
                self.if_chain(condition, then_branch, else_branch);
            }
            Stmt::While { condition, body } => {
                self.indent();
                self.out.push_str("while ");
                self.expr(condition);
                self.out.push_str(" do\n");
                self.block_body(body);
                self.indent();
                self.out.push_str("end\n");
            }
            Stmt::Repeat { body, condition } => {
                self.indent();
                self.out.push_str("repeat\n");
                self.block_body(body);
                self.indent();
                self.out.push_str("until ");
                self.expr(condition);
                self.out.push('\n');
            }
            Stmt::ForNum {
                name,
                start,
                end,
                step,
                body,
            } => {
                self.indent();
                self.out.push_str("for ");
                self.name(name);
                self.out.push_str(" = ");
                self.expr(start);
                self.out.push_str(", ");
                self.expr(end);
                if let Some(step) = step {
                    self.out.push_str(", ");
                    self.expr(step);
                }
                self.out.push_str(" do\n");
                self.block_body(body);
                self.indent();
                self.out.push_str("end\n");
            }
            Stmt::ForGen { names, iter, body } => {
                self.indent();
                self.out.push_str("for ");
                for (i, &name) in names.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.name(name);
                }
                self.out.push_str(" in ");
                self.expr(iter);
                self.out.push_str(" do\n");
                self.block_body(body);
                self.indent();
                self.out.push_str("end\n");
            }
            Stmt::Function {
                name,
                signature,
                body,
            } => {
                self.indent();
                self.out.push_str("function ");
                self.name(name);
                self.signature(signature);
                self.out.push('\n');
                self.block_body(body);
                self.indent();
                self.out.push_str("end\n");
            }
            Stmt::Struct {
                name,
                generics,
                fields,
            } => {
                self.indent();
                self.out.push_str("struct ");
                self.name(name);
                self.generic_params(&generics);
                self.out.push('\n');
                self.level += 1;
                for (i, field) in fields.iter().enumerate() {
                    self.indent();
                    self.name(field.name);
                    self.out.push_str(": ");
                    self.ty(field.ty);
                    if i + 1 < fields.len() {
                        self.out.push(',');
                    }
                    self.out.push('\n');
                }
                self.level -= 1;
                self.indent();
                self.out.push_str("end\n");
            }
            Stmt::Trait {
                name,
                generics,
                methods,
            } => {
                self.indent();
                self.out.push_str("trait ");
                self.name(name);
                self.generic_params(&generics);
                self.out.push('\n');
                self.level += 1;
                for method in &methods {
                    self.indent();
                    self.out.push_str("function ");
                    self.name(method.name);
                    self.signature(method.signature);
                    self.out.push('\n');
                }
                self.level -= 1;
                self.indent();
                self.out.push_str("end\n");
            }
            Stmt::Impl {
                generics,
                target_name,
                target_args,
                trait_name,
                trait_args,
                functions,
            } => {
                self.indent();
                self.out.push_str("impl");
                self.generic_params(&generics);
                self.out.push(' ');
                if let Some(trait_name) = trait_name {
                    self.name(trait_name);
                    self.type_args(&trait_args);
                    self.out.push_str(" for ");
                }
                self.name(target_name);
                self.type_args(&target_args);
                self.out.push('\n');
                self.level += 1;
                for &function in &functions {
                    self.stmt(function);
                }
                self.level -= 1;
                self.indent();
                self.out.push_str("end\n");
            }
            Stmt::TypeAlias { name, ty } => {
                self.indent();
                self.out.push_str("type ");
                self.name(name);
                self.out.push_str(" = ");
                self.ty(ty);
                self.out.push_str(";\n");
            }
        }
    }

    /// Renders `cond then ... [elseif|else ...] end`; the caller has
    /// already written `if ` (or `elseif `).
    fn if_chain(&mut self, condition: ExprId, then_branch: StmtId, else_branch: Option<StmtId>) {
        self.expr(condition);
        self.out.push_str(" then\n");
        self.block_body(then_branch);
        match else_branch {
            None => {
                self.indent();
                self.out.push_str("end\n");
            }
            Some(else_id) => match self.arena.stmt(else_id).clone() {
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    self.indent();
                    self.out.push_str("elseif ");
                    self.if_chain(condition, then_branch, else_branch);
                }
                _ => {
                    self.indent();
                    self.out.push_str("else\n");
                    self.block_body(else_id);
                    self.indent();
                    self.out.push_str("end\n");
                }
            },
        }
    }

    fn expr_list(&mut self, exprs: &[ExprId]) {
        for (i, &expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr);
        }
    }

    fn expr(&mut self, id: ExprId) {
        match self.arena.expr(id).clone() {
            Expr::Nil => self.out.push_str("nil"),
            Expr::Bool(true) => self.out.push_str("true"),
            Expr::Bool(false) => self.out.push_str("false"),
            Expr::Number(n) => {
                let _ = write!(self.out, "{n}");
            }
            Expr::String(sym) => self.string_literal(sym),
            Expr::Variable(name) => self.name(name),
            Expr::Vararg => self.out.push_str("..."),
            Expr::Binary { op, lhs, rhs } => {
                self.out.push('(');
                self.expr(lhs);
                let _ = write!(self.out, " {op} ");
                self.expr(rhs);
                self.out.push(')');
            }
            Expr::Unary { op, operand } => {
                self.out.push('(');
                self.out.push_str(op.symbol());
                if op == UnaryOp::Not {
                    self.out.push(' ');
                }
                self.expr(operand);
                self.out.push(')');
            }
            Expr::Call { callee, args } => {
                self.expr(callee);
                self.out.push('(');
                self.expr_list(&args);
                self.out.push(')');
            }
            Expr::Index { target, index } => {
                self.expr(target);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            Expr::Field { target, name } => {
                self.expr(target);
                self.out.push('.');
                self.name(name);
            }
            Expr::Function { signature, body } => {
                self.out.push_str("function");
                self.signature(signature);
                self.out.push('\n');
                self.block_body(body);
                self.indent();
                self.out.push_str("end");
            }
            Expr::Table { entries } => {
                self.out.push('{');
                self.entries(&entries);
                self.out.push('}');
            }
            Expr::StructInit { name, entries } => {
                self.expr(name);
                self.out.push_str(" { ");
                self.entries(&entries);
                self.out.push_str(" }");
            }
            // Error nodes only appear in failed parses, which are not
            // unparsed; keep the output well-formed regardless.
            Expr::Error => self.out.push_str("nil"),
        }
    }

    fn entries(&mut self, entries: &[TableEntry]) {
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if let Some(key) = entry.key {
                self.expr(key);
                self.out.push_str(": ");
            }
            self.expr(entry.value);
        }
    }

    fn string_literal(&mut self, sym: Symbol) {
        let bytes = self.pool.resolve(sym).to_vec();
        self.out.push('"');
        for b in bytes {
            match b {
                b'"' => self.out.push_str("\\\""),
                b'\\' => self.out.push_str("\\\\"),
                b'\n' => self.out.push_str("\\n"),
                b'\r' => self.out.push_str("\\r"),
                b'\t' => self.out.push_str("\\t"),
                0x20..=0x7E => self.out.push(b as char),
                other => {
                    // Always three digits so a following digit cannot
                    // extend the escape.
                    let _ = write!(self.out, "\\{other:03}");
                }
            }
        }
        self.out.push('"');
    }

    fn ty(&mut self, id: TypeId) {
        match self.arena.ty(id).clone() {
            Type::Void => self.out.push_str("void"),
            Type::Nil => self.out.push_str("nil"),
            Type::Bool => self.out.push_str("bool"),
            Type::Number => self.out.push_str("number"),
            Type::String => self.out.push_str("string"),
            Type::Array(inner) => {
                self.out.push('[');
                self.ty(inner);
                self.out.push(']');
            }
            Type::User { name, args } => {
                self.name(name);
                self.type_args(&args);
            }
            Type::Generic(name) => self.name(name),
            Type::Function(sig) => {
                self.out.push_str("function");
                self.signature(sig);
            }
        }
    }

    fn type_args(&mut self, args: &[TypeId]) {
        if args.is_empty() {
            return;
        }
        self.out.push('<');
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.ty(arg);
        }
        self.out.push('>');
    }

    fn signature(&mut self, id: FuncSigId) {
        let sig = self.arena.signature(id).clone();
        self.generic_params(&sig.generics);
        self.out.push('(');
        for (i, param) in sig.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.name(param.name);
            self.out.push_str(": ");
            self.ty(param.ty);
        }
        self.out.push(')');
        if !sig.returns.is_empty() {
            self.out.push_str(": ");
            for (i, &ret) in sig.returns.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.ty(ret);
            }
        }
    }

    fn generic_params(&mut self, generics: &[GenericParam]) {
        if generics.is_empty() {
            return;
        }
        self.out.push('<');
        for (i, generic) in generics.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.name(generic.name);
            if !generic.constraints.is_empty() {
                self.out.push_str(": ");
                for (j, &constraint) in generic.constraints.iter().enumerate() {
                    if j > 0 {
                        self.out.push_str(" + ");
                    }
                    self.ty(constraint);
                }
            }
        }
        self.out.push('>');
    }
}
