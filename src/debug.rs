//! Readable AST dumps for tests and debugging.
//!
//! Symbols only render through an [`Interner`], so everything here pairs a
//! node with one. [`dump_module`] produces a stable structural rendering:
//! it contains no module id, file id, or span, which makes it usable for
//! structural-equality assertions between separately parsed trees.

use std::fmt;

use crate::ast::decl::{Class, Enum, Function, FunctionKind, Var, Visibility};
use crate::ast::expr::{Expr, ExprKind, Path, Value};
use crate::ast::module::{Definition, Module};
use crate::ast::stmt::{Block, Stmt, StmtKind};
use crate::ast::types::{TypeRef, TypeRefKind};
use crate::intern::Interner;

pub trait DisplayWith {
    fn fmt_with(&self, interner: &Interner, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn with<'a>(&'a self, interner: &'a Interner) -> WithInterner<'a, Self> {
        WithInterner {
            target: self,
            interner,
        }
    }
}

pub struct WithInterner<'a, T: ?Sized> {
    pub target: &'a T,
    pub interner: &'a Interner,
}

impl<'a, T: DisplayWith + ?Sized> fmt::Display for WithInterner<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.target.fmt_with(self.interner, f)
    }
}

impl<'a> DisplayWith for Path<'a> {
    fn fmt_with(&self, interner: &Interner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", interner.resolve(seg.name))?;
        }
        Ok(())
    }
}

impl<'a> DisplayWith for TypeRef<'a> {
    fn fmt_with(&self, interner: &Interner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeRefKind::Bool => write!(f, "bool"),
            TypeRefKind::Char => write!(f, "char"),
            TypeRefKind::String => write!(f, "string"),
            TypeRefKind::Void => write!(f, "void"),
            TypeRefKind::Error => write!(f, "error"),
            TypeRefKind::Int(kind) => write!(f, "{}", kind.name()),
            TypeRefKind::Float(kind) => write!(f, "{}", kind.name()),
            TypeRefKind::Array { elem, size } => {
                elem.fmt_with(interner, f)?;
                match size {
                    None => write!(f, "[]"),
                    Some(expr) => {
                        write!(f, "[")?;
                        expr.fmt_with(interner, f)?;
                        write!(f, "]")
                    }
                }
            }
            TypeRefKind::Identity(path) => path.fmt_with(interner, f),
        }
    }
}

impl<'a> DisplayWith for Expr<'a> {
    fn fmt_with(&self, interner: &Interner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Value(value) => match value {
                Value::Bool(v) => write!(f, "{v}"),
                Value::Int { value, unsigned } => {
                    write!(f, "{value}{}", if *unsigned { "u" } else { "" })
                }
                Value::Float(v) => write!(f, "{v}"),
                Value::Char(c) => write!(f, "'{c}'"),
                Value::Str(sym) => write!(f, "\"{}\"", interner.resolve(*sym)),
                Value::Null => write!(f, "null"),
            },
            ExprKind::VarRef(var_ref) => var_ref.path.fmt_with(interner, f),
            ExprKind::Call(call) => {
                if call.constructor {
                    write!(f, "new ")?;
                }
                call.path.fmt_with(interner, f)?;
                write!(f, "(")?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    arg.fmt_with(interner, f)?;
                }
                write!(f, ")")
            }
            ExprKind::Unary { op, operand } => {
                write!(f, "({} ", op.text())?;
                operand.fmt_with(interner, f)?;
                write!(f, ")")
            }
            ExprKind::Binary { op, left, right } => {
                write!(f, "({} ", op.text())?;
                left.fmt_with(interner, f)?;
                write!(f, " ")?;
                right.fmt_with(interner, f)?;
                write!(f, ")")
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                write!(f, "(? ")?;
                cond.fmt_with(interner, f)?;
                write!(f, " ")?;
                then_expr.fmt_with(interner, f)?;
                write!(f, " ")?;
                else_expr.fmt_with(interner, f)?;
                write!(f, ")")
            }
            ExprKind::Index { base, index } => {
                base.fmt_with(interner, f)?;
                write!(f, "[")?;
                index.fmt_with(interner, f)?;
                write!(f, "]")
            }
        }
    }
}

/// Structural dump of a whole module, stable across parses of the same
/// bytes.
pub fn dump_module(module: &Module<'_>, interner: &Interner) -> String {
    let mut out = String::new();
    let mut w = Writer {
        out: &mut out,
        interner,
        indent: 0,
    };
    w.line(&format!("namespace {}", interner.resolve(module.namespace)));
    for def in module.definitions() {
        w.definition(def);
    }
    out
}

struct Writer<'w> {
    out: &'w mut String,
    interner: &'w Interner,
    indent: usize,
}

impl<'w> Writer<'w> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn inline<T: DisplayWith + ?Sized>(&self, value: &T) -> String {
        format!("{}", value.with(self.interner))
    }

    fn scopes(&self, var_like: Visibility, constant: bool) -> String {
        let mut text = String::new();
        if var_like != Visibility::Default {
            text.push_str(var_like.text());
            text.push(' ');
        }
        if constant {
            text.push_str("const ");
        }
        text
    }

    fn comment(&mut self, comment: Option<crate::intern::Symbol>) {
        if let Some(text) = comment {
            let rendered = self.interner.resolve(text).to_string();
            self.line(&format!("// {rendered}"));
        }
    }

    fn definition(&mut self, def: &Definition<'_>) {
        match def {
            Definition::Comment { text, .. } => {
                let rendered = self.interner.resolve(*text).to_string();
                self.line(&format!("// {rendered}"));
            }
            Definition::Import(import) => {
                self.comment(import.comment);
                let mut text = format!("import \"{}\"", self.interner.resolve(import.name));
                if let Some(alias) = import.alias {
                    text.push_str(&format!(" as \"{}\"", self.interner.resolve(alias)));
                }
                self.line(&text);
            }
            Definition::GlobalVar(var) => self.var("global", var),
            Definition::Function(function) => self.function(function),
            Definition::Class(class) => self.class(class),
            Definition::Enum(enm) => self.enumeration(enm),
        }
    }

    fn var(&mut self, label: &str, var: &Var<'_>) {
        self.comment(var.comment);
        let mut text = format!(
            "{label} {}{} {}",
            self.scopes(var.scopes.visibility, var.scopes.constant),
            self.inline(var.ty),
            self.interner.resolve(var.name)
        );
        if let Some(init) = var.init {
            text.push_str(" = ");
            text.push_str(&self.inline(init));
        }
        self.line(&text);
    }

    fn function(&mut self, function: &Function<'_>) {
        self.comment(function.comment);
        let label = match function.kind {
            FunctionKind::Free => "fn",
            FunctionKind::Constructor => "ctor",
            FunctionKind::Method => "method",
            FunctionKind::Virtual => "virtual",
        };
        let params = function
            .params
            .iter()
            .map(|p| format!("{} {}", self.inline(p.ty), self.interner.resolve(p.name)))
            .collect::<Vec<_>>()
            .join(", ");
        self.line(&format!(
            "{label} {}{} {}({})",
            self.scopes(function.scopes.visibility, function.scopes.constant),
            self.inline(function.return_type),
            self.interner.resolve(function.name),
            params
        ));
        if let Some(body) = function.body.get() {
            self.indent += 1;
            self.block(body);
            self.indent -= 1;
        }
    }

    fn class(&mut self, class: &Class<'_>) {
        self.comment(class.comment);
        let supers = class
            .super_types
            .iter()
            .map(|s| self.inline(*s))
            .collect::<Vec<_>>()
            .join(", ");
        let header = if supers.is_empty() {
            format!(
                "{} {}{}",
                class.kind.keyword(),
                self.scopes(class.scopes.visibility, class.scopes.constant),
                self.interner.resolve(class.name)
            )
        } else {
            format!(
                "{} {}{} : {}",
                class.kind.keyword(),
                self.scopes(class.scopes.visibility, class.scopes.constant),
                self.interner.resolve(class.name),
                supers
            )
        };
        self.line(&header);
        self.indent += 1;
        for &attr in class.attributes {
            self.var("attr", attr);
        }
        for &ctor in class.constructors {
            self.function(ctor);
        }
        if let Some(ctor) = class.default_constructor {
            self.line(&format!(
                "default-ctor {}",
                self.interner.resolve(ctor.name)
            ));
        }
        for &method in class.methods {
            self.function(method);
        }
        self.indent -= 1;
    }

    fn enumeration(&mut self, enm: &Enum<'_>) {
        self.comment(enm.comment);
        self.line(&format!(
            "enum {}{}",
            self.scopes(enm.scopes.visibility, enm.scopes.constant),
            self.interner.resolve(enm.name)
        ));
        self.indent += 1;
        for &entry in enm.entries {
            self.line(&format!(
                "{} = {}",
                self.interner.resolve(entry.name),
                entry.index
            ));
        }
        self.indent -= 1;
    }

    fn block(&mut self, block: &Block<'_>) {
        for stmt in block.iter() {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt<'_>) {
        match &stmt.kind {
            StmtKind::VarDecl(var) => self.var("local", var),
            StmtKind::Assign(assign) => {
                let text = format!(
                    "{} = {}",
                    self.inline(&assign.target.path),
                    self.inline(assign.value)
                );
                self.line(&text);
            }
            StmtKind::Expr(expr) => {
                let text = self.inline(*expr);
                self.line(&text);
            }
            StmtKind::Return(value) => match value {
                Some(expr) => {
                    let text = format!("return {}", self.inline(*expr));
                    self.line(&text);
                }
                None => self.line("return"),
            },
            StmtKind::Fail(fail) => match fail.payload {
                Some(payload) => {
                    let text = format!("fail {}", self.inline(payload));
                    self.line(&text);
                }
                None => self.line("fail"),
            },
            StmtKind::Break => self.line("break"),
            StmtKind::Continue => self.line("continue"),
            StmtKind::Delete(target) => {
                let text = format!("delete {}", self.inline(&target.path));
                self.line(&text);
            }
            StmtKind::Block(block) => {
                self.line("block");
                self.indent += 1;
                self.block(block);
                self.indent -= 1;
            }
            StmtKind::If(if_stmt) => {
                let text = format!("if {}", self.inline(if_stmt.cond));
                self.line(&text);
                self.indent += 1;
                self.stmt(if_stmt.then_stmt);
                self.indent -= 1;
                for elsif in if_stmt.elsifs {
                    let text = format!("elsif {}", self.inline(elsif.cond));
                    self.line(&text);
                    self.indent += 1;
                    self.stmt(elsif.stmt);
                    self.indent -= 1;
                }
                if let Some(else_stmt) = if_stmt.else_stmt {
                    self.line("else");
                    self.indent += 1;
                    self.stmt(else_stmt);
                    self.indent -= 1;
                }
            }
            StmtKind::Switch(switch) => {
                let text = format!("switch {}", self.inline(switch.scrutinee));
                self.line(&text);
                self.indent += 1;
                for case in switch.cases {
                    let text = format!("case {}", self.inline(case.value));
                    self.line(&text);
                    self.indent += 1;
                    self.block(case.block);
                    self.indent -= 1;
                }
                if let Some(default) = switch.default {
                    self.line("default");
                    self.indent += 1;
                    self.block(default);
                    self.indent -= 1;
                }
                self.indent -= 1;
            }
            StmtKind::Loop(loop_stmt) => {
                self.line("loop");
                self.indent += 1;
                if let Some(init) = loop_stmt.init {
                    self.line("init");
                    self.indent += 1;
                    self.block(init);
                    self.indent -= 1;
                }
                if let Some(cond) = loop_stmt.cond {
                    let text = format!("cond {}", self.inline(cond));
                    self.line(&text);
                }
                if let Some(post) = loop_stmt.post {
                    self.line("post");
                    self.indent += 1;
                    self.block(post);
                    self.indent -= 1;
                }
                self.line("body");
                self.indent += 1;
                self.stmt(loop_stmt.body);
                self.indent -= 1;
                self.indent -= 1;
            }
            StmtKind::Handle(handle) => {
                let text = format!(
                    "handle {}",
                    self.interner.resolve(handle.error_var.name)
                );
                self.line(&text);
                self.indent += 1;
                self.block(handle.block);
                self.indent -= 1;
            }
        }
    }
}
