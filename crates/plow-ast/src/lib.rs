//! Immutable program tree for the plow lowering core.
//!
//! Nodes are built through per-node builders that validate them against their
//! descriptors. There are no mutators: an edit rebuilds a node from a builder
//! seeded with the old one (`MethodBuilder::from(&method)`), and passes
//! rebuild whole subtrees through [`visit::Rewriter`].

pub mod error;
pub use error::ConstructionError;

// Expressions and their struct-shaped payloads
pub mod expression;
pub use expression::{
    BinaryOperator, Expression, FieldAccess, FieldAccessBuilder, MethodCall, MethodCallBuilder,
    NewInstance, NumberValue, PostfixOperator, PrefixOperator, Variable, VariableBuilder,
};

pub mod statement;
pub use statement::{Block, BlockBuilder, Statement};

pub mod member;
pub use member::{
    Field, FieldBuilder, InitializerBlock, InitializerBlockBuilder, Member, Method, MethodBuilder,
};

pub mod unit;
pub use unit::{CompilationUnit, CompilationUnitBuilder, Program, Type, TypeBuilder};

// Traversal and bottom-up rebuilding
pub mod visit;
pub use visit::{Rewriter, Visitor};

pub mod ast_utils;

#[cfg(test)]
#[path = "tests/node_tests.rs"]
mod node_tests;
#[cfg(test)]
#[path = "tests/visit_tests.rs"]
mod visit_tests;
