// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Debug dumps for tokens and the AST.
//!
//! These are the formats the `luma` driver writes with `--dump-tokens`
//! and `--dump-ast`:
//!
//! - Tokens: a header `--- TOKENS (N) ---` followed by `LINE KIND TEXT`
//!   columns, one token per row.
//! - AST: an indented tree, two spaces per level, one statement per
//!   line using the surface keywords (`BLOCK`, `IF c THEN`,
//!   `STRUCT name`, ...); expressions and types are rendered inline.
//!
//! The AST dump carries no source spans, which also makes it the
//! canonical span-free form the round-trip tests compare.

use std::fmt::Write as _;

use crate::ast::{
    AstArena, Expr, ExprId, FuncSigId, GenericParam, ParseTree, Stmt, StmtId, TableEntry, Type,
    TypeId, UnaryOp,
};
use crate::intern::{StringPool, Symbol};
use crate::source_analysis::Token;

/// Renders a token stream as a table.
#[must_use]
pub fn dump_tokens(tokens: &[Token], pool: &StringPool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- TOKENS ({}) ---", tokens.len());
    let _ = writeln!(out, "{:<4} {:<15} {}", "LINE", "KIND", "TEXT");
    let _ = writeln!(out, "------------------------------");
    for token in tokens {
        let _ = writeln!(
            out,
            "{:<4} {:<15} '{}'",
            token.line(),
            token.kind().dump_name(),
            pool.resolve_lossy(token.text()),
        );
    }
    let _ = writeln!(out, "------------------------------");
    out.push('\n');
    out
}

/// Renders a parse tree as an indented statement tree.
#[must_use]
pub fn dump_ast(tree: &ParseTree, pool: &StringPool) -> String {
    let mut dumper = Dumper {
        arena: &tree.arena,
        pool,
        out: String::new(),
    };
    dumper.stmt(tree.root, 0);
    dumper.out
}

struct Dumper<'a> {
    arena: &'a AstArena,
    pool: &'a StringPool,
    out: String,
}

impl Dumper<'_> {
    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str("  ");
        }
    }

    fn name(&self, sym: Symbol) -> String {
        self.pool.resolve_lossy(sym).into_owned()
    }

    fn stmt(&mut self, id: StmtId, level: usize) {
        self.indent(level);
        match self.arena.stmt(id).clone() {
            Stmt::Expr(e) => {
                let e = self.expr(e);
                let _ = writeln!(self.out, "EXPR {e}");
            }
            Stmt::Block(stmts) => {
                self.out.push_str("BLOCK\n");
                for &stmt in &stmts {
                    self.stmt(stmt, level + 1);
                }
                self.indent(level);
                self.out.push_str("END BLOCK\n");
            }
            Stmt::Return(values) => {
                let values = self.expr_list(&values);
                let _ = writeln!(self.out, "RETURN {values}");
            }
            Stmt::Break => self.out.push_str("BREAK\n"),
            Stmt::Assign { targets, values } => {
                let targets = self.expr_list(&targets);
                let values = self.expr_list(&values);
                let _ = writeln!(self.out, "ASSIGN {targets} = {values}");
            }
            Stmt::Local { decls, values } => {
                self.out.push_str("LOCAL ");
                for (i, decl) in decls.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let name = self.name(decl.name);
                    self.out.push_str(&name);
                    if let Some(ty) = decl.ty {
                        let ty = self.ty(ty);
                        let _ = write!(self.out, ": {ty}");
                    }
                }
                if !values.is_empty() {
                    let values = self.expr_list(&values);
                    let _ = write!(self.out, " = {values}");
                }
                self.out.push('\n');
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.expr(condition);
                let _ = writeln!(self.out, "IF {condition} THEN");
                self.stmt(then_branch, level + 1);
                if let Some(else_branch) = else_branch {
                    self.indent(level);
                    self.out.push_str("ELSE\n");
                    self.stmt(else_branch, level + 1);
                }
            }
            Stmt::While { condition, body } => {
                let condition = self.expr(condition);
                let _ = writeln!(self.out, "WHILE {condition} DO");
                self.stmt(body, level + 1);
            }
            Stmt::Repeat { body, condition } => {
                self.out.push_str("REPEAT\n");
                self.stmt(body, level + 1);
                self.indent(level);
                let condition = self.expr(condition);
                let _ = writeln!(self.out, "UNTIL {condition}");
            }
            Stmt::ForNum {
                name,
                start,
                end,
                step,
                body,
            } => {
                let name = self.name(name);
                let start = self.expr(start);
                let end = self.expr(end);
                let _ = write!(self.out, "FOR {name} = {start}, {end}");
                if let Some(step) = step {
                    let step = self.expr(step);
                    let _ = write!(self.out, ", {step}");
                }
                self.out.push_str(" DO\n");
                self.stmt(body, level + 1);
            }
            Stmt::ForGen { names, iter, body } => {
                self.out.push_str("FOR ");
                for (i, &name) in names.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let name = self.name(name);
                    self.out.push_str(&name);
                }
                let iter = self.expr(iter);
                let _ = writeln!(self.out, " IN {iter} DO");
                self.stmt(body, level + 1);
            }
            Stmt::Function {
                name,
                signature,
                body,
            } => {
                let name = self.name(name);
                let sig = self.signature(signature);
                let _ = writeln!(self.out, "FUNCTION {name}{sig}");
                self.stmt(body, level + 1);
                self.indent(level);
                self.out.push_str("END FUNC\n");
            }
            Stmt::Struct {
                name,
                generics,
                fields,
            } => {
                let name = self.name(name);
                let generics = self.generic_params(&generics);
                let _ = writeln!(self.out, "STRUCT {name}{generics}");
                for field in &fields {
                    self.indent(level + 1);
                    let field_name = self.name(field.name);
                    let ty = self.ty(field.ty);
                    let _ = writeln!(self.out, "{field_name}: {ty}");
                }
                self.indent(level);
                self.out.push_str("END STRUCT\n");
            }
            Stmt::Trait {
                name,
                generics,
                methods,
            } => {
                let name = self.name(name);
                let generics = self.generic_params(&generics);
                let _ = writeln!(self.out, "TRAIT {name}{generics}");
                for method in &methods {
                    self.indent(level + 1);
                    let method_name = self.name(method.name);
                    let sig = self.signature(method.signature);
                    let _ = writeln!(self.out, "fn {method_name}{sig}");
                }
                self.indent(level);
                self.out.push_str("END TRAIT\n");
            }
            Stmt::Impl {
                generics,
                target_name,
                target_args,
                trait_name,
                trait_args,
                functions,
            } => {
                let generics = self.generic_params(&generics);
                let _ = write!(self.out, "IMPL{generics} ");
                if let Some(trait_name) = trait_name {
                    let trait_name = self.name(trait_name);
                    let trait_args = self.type_args(&trait_args);
                    let _ = write!(self.out, "{trait_name}{trait_args} FOR ");
                }
                let target_name = self.name(target_name);
                let target_args = self.type_args(&target_args);
                let _ = writeln!(self.out, "{target_name}{target_args}");
                for &function in &functions {
                    self.stmt(function, level + 1);
                }
                self.indent(level);
                self.out.push_str("END IMPL\n");
            }
            Stmt::TypeAlias { name, ty } => {
                let name = self.name(name);
                let ty = self.ty(ty);
                let _ = writeln!(self.out, "TYPE {name} = {ty}");
            }
        }
    }

    fn expr_list(&self, exprs: &[ExprId]) -> String {
        exprs
            .iter()
            .map(|&e| self.expr(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expr(&self, id: ExprId) -> String {
        match self.arena.expr(id) {
            Expr::Nil => "nil".to_string(),
            Expr::Bool(true) => "true".to_string(),
            Expr::Bool(false) => "false".to_string(),
            Expr::Number(n) => format!("{n}"),
            Expr::String(sym) => format!("\"{}\"", self.pool.resolve_lossy(*sym)),
            Expr::Variable(name) => self.name(*name),
            Expr::Vararg => "...".to_string(),
            Expr::Binary { op, lhs, rhs } => {
                format!("({} {op} {})", self.expr(*lhs), self.expr(*rhs))
            }
            Expr::Unary { op, operand } => {
                let spacer = if *op == UnaryOp::Not { " " } else { "" };
                format!("({}{spacer}{})", op.symbol(), self.expr(*operand))
            }
            Expr::Call { callee, args } => {
                format!("{}({})", self.expr(*callee), self.expr_list(args))
            }
            Expr::Index { target, index } => {
                format!("{}[{}]", self.expr(*target), self.expr(*index))
            }
            Expr::Field { target, name } => {
                format!("{}.{}", self.expr(*target), self.name(*name))
            }
            Expr::Function { signature, .. } => {
                format!("fn{} {{ ... }}", self.signature(*signature))
            }
            Expr::Table { entries } => format!("{{{}}}", self.entries(entries, "=", "[", "]")),
            Expr::StructInit { name, entries } => {
                format!(
                    "{} {{ {} }}",
                    self.expr(*name),
                    self.entries(entries, " = ", "", "")
                )
            }
            Expr::Error => "<error>".to_string(),
        }
    }

    fn entries(&self, entries: &[TableEntry], sep: &str, open: &str, close: &str) -> String {
        entries
            .iter()
            .map(|entry| match entry.key {
                Some(key) => format!("{open}{}{close}{sep}{}", self.expr(key), self.expr(entry.value)),
                None => self.expr(entry.value),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn ty(&self, id: TypeId) -> String {
        match self.arena.ty(id) {
            Type::Void => "void".to_string(),
            Type::Nil => "nil".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Number => "number".to_string(),
            Type::String => "string".to_string(),
            Type::Array(inner) => format!("[{}]", self.ty(*inner)),
            Type::User { name, args } => format!("{}{}", self.name(*name), self.type_args(args)),
            Type::Generic(name) => self.name(*name),
            Type::Function(sig) => format!("fn{}", self.signature(*sig)),
        }
    }

    fn type_args(&self, args: &[TypeId]) -> String {
        if args.is_empty() {
            return String::new();
        }
        let rendered = args.iter().map(|&a| self.ty(a)).collect::<Vec<_>>();
        format!("<{}>", rendered.join(", "))
    }

    fn signature(&self, id: FuncSigId) -> String {
        let sig = self.arena.signature(id);
        let mut out = self.generic_params(&sig.generics);
        out.push('(');
        for (i, param) in sig.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}: {}", self.name(param.name), self.ty(param.ty));
        }
        out.push(')');
        if !sig.returns.is_empty() {
            out.push_str(" -> ");
            if sig.returns.len() > 1 {
                out.push('(');
            }
            for (i, &ret) in sig.returns.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&self.ty(ret));
            }
            if sig.returns.len() > 1 {
                out.push(')');
            }
        }
        out
    }

    fn generic_params(&self, generics: &[GenericParam]) -> String {
        if generics.is_empty() {
            return String::new();
        }
        let mut out = String::from("<");
        for (i, generic) in generics.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.name(generic.name));
            if !generic.constraints.is_empty() {
                out.push_str(": ");
                for (j, &constraint) in generic.constraints.iter().enumerate() {
                    if j > 0 {
                        out.push_str(" + ");
                    }
                    out.push_str(&self.ty(constraint));
                }
            }
        }
        out.push('>');
        out
    }
}
