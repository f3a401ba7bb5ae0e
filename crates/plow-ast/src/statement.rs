//! Statement nodes.

use crate::error::ConstructionError;
use crate::expression::{Expression, Variable};
use plow_common::SourcePosition;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `expression;`
    Expression {
        expression: Expression,
        position: SourcePosition,
    },

    /// `Type name = initializer;`
    VariableDeclaration {
        variable: Variable,
        initializer: Option<Expression>,
        position: SourcePosition,
    },

    /// `return expression;`
    Return {
        expression: Option<Expression>,
        position: SourcePosition,
    },

    Block(Block),

    If {
        condition: Expression,
        then_statement: Box<Statement>,
        else_statement: Option<Box<Statement>>,
        position: SourcePosition,
    },

    While {
        condition: Expression,
        body: Box<Statement>,
        position: SourcePosition,
    },

    Break {
        label: Option<Arc<str>>,
        position: SourcePosition,
    },

    Continue {
        label: Option<Arc<str>>,
        position: SourcePosition,
    },

    /// `label: body`
    Labeled {
        label: Arc<str>,
        body: Box<Statement>,
        position: SourcePosition,
    },

    /// `assert condition : message;`
    Assert {
        condition: Expression,
        message: Option<Expression>,
        position: SourcePosition,
    },

    Throw {
        expression: Expression,
        position: SourcePosition,
    },
}

impl Statement {
    /// An expression statement without a source position.
    pub fn expression(expression: Expression) -> Self {
        Statement::Expression {
            expression,
            position: SourcePosition::NONE,
        }
    }

    pub fn return_value(expression: Option<Expression>) -> Self {
        Statement::Return {
            expression,
            position: SourcePosition::NONE,
        }
    }

    pub fn position(&self) -> &SourcePosition {
        match self {
            Statement::Block(block) => block.position(),
            Statement::Expression { position, .. }
            | Statement::VariableDeclaration { position, .. }
            | Statement::Return { position, .. }
            | Statement::If { position, .. }
            | Statement::While { position, .. }
            | Statement::Break { position, .. }
            | Statement::Continue { position, .. }
            | Statement::Labeled { position, .. }
            | Statement::Assert { position, .. }
            | Statement::Throw { position, .. } => position,
        }
    }
}

// =============================================================================
// Block
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub(crate) statements: Vec<Statement>,
    pub(crate) position: SourcePosition,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Block {
            statements,
            position: SourcePosition::NONE,
        }
    }

    pub fn builder() -> BlockBuilder {
        BlockBuilder::default()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

#[derive(Clone, Debug, Default)]
pub struct BlockBuilder {
    statements: Vec<Statement>,
    position: SourcePosition,
}

impl BlockBuilder {
    pub fn statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn statements(mut self, statements: Vec<Statement>) -> Self {
        self.statements = statements;
        self
    }

    pub fn position(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    pub fn build(self) -> Result<Block, ConstructionError> {
        Ok(Block {
            statements: self.statements,
            position: self.position,
        })
    }
}

impl From<&Block> for BlockBuilder {
    fn from(block: &Block) -> Self {
        BlockBuilder {
            statements: block.statements.clone(),
            position: block.position.clone(),
        }
    }
}
