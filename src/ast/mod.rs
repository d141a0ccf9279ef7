pub mod builder;
pub mod decl;
pub mod expr;
pub mod module;
pub mod stmt;
pub mod types;

pub use builder::AstBuilder;
pub use decl::{Class, ClassKind, Def, Enum, Function, FunctionKind, ScopeSet, Var, VarKind, Visibility};
pub use expr::{BinaryOp, Call, Expr, ExprKind, Path, PathSeg, UnaryOp, Value, VarRef};
pub use module::{Definition, Identity, Import, Module, ModuleSet, Namespace};
pub use stmt::{
    AssignStmt, Block, Elsif, FailStmt, HandleStmt, IfStmt, LoopStmt, Stmt, StmtKind, SwitchCase,
    SwitchStmt,
};
pub use types::{FloatKind, IntKind, Type, TypeRef, TypeRefKind};
