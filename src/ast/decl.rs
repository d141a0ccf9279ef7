//! Declarations: variables, functions, classes, enums, and the resolved
//! reference target [`Def`].

use crate::ast::expr::Expr;
use crate::ast::stmt::Block;
use crate::ast::types::TypeRef;
use crate::intern::Symbol;
use crate::source::Span;
use std::cell::Cell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// No keyword: visible inside the declaring namespace.
    #[default]
    Default,
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn text(self) -> &'static str {
        match self {
            Visibility::Default => "",
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// Visibility plus modifiers, parsed as an unordered declaration prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeSet {
    pub visibility: Visibility,
    pub constant: bool,
}

impl ScopeSet {
    pub fn public() -> Self {
        ScopeSet {
            visibility: Visibility::Public,
            constant: false,
        }
    }
}

/// Lifecycle classification of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Global,
    Attribute,
    EnumEntry,
    Param,
    Local,
    /// The hidden `error error` parameter, or a handle block's fresh
    /// error variable.
    ErrorHandler,
}

pub struct Var<'a> {
    pub span: Span,
    pub name: Symbol,
    pub ty: &'a TypeRef<'a>,
    pub scopes: ScopeSet,
    pub kind: VarKind,
    pub init: Option<&'a Expr<'a>>,
    /// 1-based entry index for enum entries, parameter position for params,
    /// zero otherwise.
    pub index: u32,
    pub comment: Option<Symbol>,
    pub owner_class: Cell<Option<&'a Class<'a>>>,
    pub owner_enum: Cell<Option<&'a Enum<'a>>>,
    pub module_id: Cell<u64>,
}

impl<'a> Var<'a> {
    pub fn is_constant(&self) -> bool {
        self.scopes.constant
    }
}

impl<'a> fmt::Debug for Var<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Free,
    Constructor,
    Method,
    /// Interface method signature without a body.
    Virtual,
}

pub struct Function<'a> {
    pub span: Span,
    pub name: Symbol,
    pub return_type: &'a TypeRef<'a>,
    /// Declared parameters, excluding the hidden error handler.
    pub params: &'a [&'a Var<'a>],
    /// Hidden first parameter of type `error`, synthesised by the builder.
    pub error_handler: &'a Var<'a>,
    pub scopes: ScopeSet,
    pub kind: FunctionKind,
    pub body: Cell<Option<&'a Block<'a>>>,
    /// Every local of the body in declaration order, for downstream
    /// stack allocation.
    pub locals: Cell<&'a [&'a Var<'a>]>,
    pub class: Cell<Option<&'a Class<'a>>>,
    pub module_id: Cell<u64>,
    pub comment: Option<Symbol>,
}

impl<'a> Function<'a> {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_method(&self) -> bool {
        matches!(
            self.kind,
            FunctionKind::Constructor | FunctionKind::Method | FunctionKind::Virtual
        )
    }
}

impl<'a> fmt::Debug for Function<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Struct,
    Class,
    Interface,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Struct => "struct",
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
        }
    }
}

pub struct Class<'a> {
    pub span: Span,
    pub name: Symbol,
    pub kind: ClassKind,
    pub scopes: ScopeSet,
    /// Dense id assigned by the builder; keys the per-class symbol tables.
    pub id: u32,
    pub super_types: &'a [&'a TypeRef<'a>],
    pub attributes: &'a [&'a Var<'a>],
    pub methods: &'a [&'a Function<'a>],
    pub constructors: &'a [&'a Function<'a>],
    /// Present iff the user declared no constructor.
    pub default_constructor: Option<&'a Function<'a>>,
    pub module_id: Cell<u64>,
    pub comment: Option<Symbol>,
}

impl<'a> fmt::Debug for Class<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

pub struct Enum<'a> {
    pub span: Span,
    pub name: Symbol,
    pub scopes: ScopeSet,
    pub id: u32,
    pub super_types: &'a [&'a TypeRef<'a>],
    /// Entries in declaration order; each carries its 1-based index.
    pub entries: &'a [&'a Var<'a>],
    pub module_id: Cell<u64>,
    pub comment: Option<Symbol>,
}

impl<'a> Enum<'a> {
    pub fn entry(&self, name: Symbol) -> Option<&'a Var<'a>> {
        self.entries.iter().copied().find(|e| e.name == name)
    }
}

impl<'a> fmt::Debug for Enum<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enum")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A resolved reference target.
#[derive(Debug, Clone, Copy)]
pub enum Def<'a> {
    Var(&'a Var<'a>),
    Function(&'a Function<'a>),
    Class(&'a Class<'a>),
    Enum(&'a Enum<'a>),
}

impl<'a> Def<'a> {
    pub fn name(&self) -> Symbol {
        match self {
            Def::Var(v) => v.name,
            Def::Function(f) => f.name,
            Def::Class(c) => c.name,
            Def::Enum(e) => e.name,
        }
    }

    pub fn as_var(&self) -> Option<&'a Var<'a>> {
        match self {
            Def::Var(v) => Some(v),
            _ => None,
        }
    }
}
