//! Type members: methods, fields and initializer blocks.

use crate::error::ConstructionError;
use crate::expression::{Expression, Variable};
use crate::statement::Block;
use plow_common::SourcePosition;
use plow_types::{FieldDescriptor, MethodDescriptor};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Method(Method),
    Field(Field),
    InitializerBlock(InitializerBlock),
}

impl Member {
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Member::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Member::Method(method) => method.descriptor().is_static(),
            Member::Field(field) => field.descriptor().is_static(),
            Member::InitializerBlock(block) => block.is_static(),
        }
    }

    pub fn position(&self) -> &SourcePosition {
        match self {
            Member::Method(method) => method.position(),
            Member::Field(field) => field.position(),
            Member::InitializerBlock(block) => block.position(),
        }
    }
}

// =============================================================================
// Method
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub(crate) descriptor: Arc<MethodDescriptor>,
    pub(crate) parameters: Vec<Variable>,
    pub(crate) body: Option<Block>,
    pub(crate) position: SourcePosition,
    pub(crate) mangled_name: Option<Arc<str>>,
}

impl Method {
    pub fn builder() -> MethodBuilder {
        MethodBuilder::default()
    }

    pub fn descriptor(&self) -> &Arc<MethodDescriptor> {
        &self.descriptor
    }

    pub fn parameters(&self) -> &[Variable] {
        &self.parameters
    }

    pub fn body(&self) -> Option<&Block> {
        self.body.as_ref()
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    /// Target-language name, stamped by call-site mangling.
    pub fn mangled_name(&self) -> Option<&Arc<str>> {
        self.mangled_name.as_ref()
    }

    pub fn is_abstract(&self) -> bool {
        self.descriptor.is_abstract()
    }

    /// A builder seeded with this node, without copying its body.
    pub fn into_builder(self) -> MethodBuilder {
        MethodBuilder {
            descriptor: Some(self.descriptor),
            parameters: self.parameters,
            body: self.body,
            position: self.position,
            mangled_name: self.mangled_name,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MethodBuilder {
    descriptor: Option<Arc<MethodDescriptor>>,
    parameters: Vec<Variable>,
    body: Option<Block>,
    position: SourcePosition,
    mangled_name: Option<Arc<str>>,
}

impl MethodBuilder {
    pub fn descriptor(mut self, descriptor: Arc<MethodDescriptor>) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn parameters(mut self, parameters: Vec<Variable>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn body(mut self, body: Option<Block>) -> Self {
        self.body = body;
        self
    }

    pub fn statements(mut self, statements: Vec<crate::Statement>) -> Self {
        self.body = Some(Block::new(statements));
        self
    }

    pub fn position(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    pub fn mangled_name(mut self, mangled_name: Option<Arc<str>>) -> Self {
        self.mangled_name = mangled_name;
        self
    }

    pub fn build(self) -> Result<Method, ConstructionError> {
        let descriptor = self.descriptor.ok_or(ConstructionError::MissingField {
            node: "Method",
            field: "descriptor",
        })?;
        let method = || descriptor.name().to_string();

        if descriptor.is_bridge() {
            let target = descriptor
                .bridge_target()
                .ok_or_else(|| ConstructionError::BridgeWithoutTarget { method: method() })?;
            if target.is_abstract() {
                return Err(ConstructionError::BridgeToAbstractTarget {
                    method: method(),
                    target: target.name().to_string(),
                });
            }
        }

        if descriptor.is_abstract() || descriptor.is_native() {
            if self.body.is_some() {
                let kind = if descriptor.is_abstract() {
                    "abstract"
                } else {
                    "native"
                };
                return Err(ConstructionError::UnexpectedBody {
                    method: method(),
                    kind,
                });
            }
        } else if self.body.is_none() {
            return Err(ConstructionError::MissingBody { method: method() });
        }

        if descriptor.parameters().len() != self.parameters.len() {
            return Err(ConstructionError::ParameterCount {
                method: method(),
                expected: descriptor.parameters().len(),
                found: self.parameters.len(),
            });
        }

        Ok(Method {
            descriptor,
            parameters: self.parameters,
            body: self.body,
            position: self.position,
            mangled_name: self.mangled_name,
        })
    }
}

impl From<&Method> for MethodBuilder {
    fn from(method: &Method) -> Self {
        MethodBuilder {
            descriptor: Some(method.descriptor.clone()),
            parameters: method.parameters.clone(),
            body: method.body.clone(),
            position: method.position.clone(),
            mangled_name: method.mangled_name.clone(),
        }
    }
}

// =============================================================================
// Field
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub(crate) descriptor: Arc<FieldDescriptor>,
    pub(crate) initializer: Option<Expression>,
    pub(crate) position: SourcePosition,
}

impl Field {
    pub fn builder() -> FieldBuilder {
        FieldBuilder::default()
    }

    pub fn descriptor(&self) -> &Arc<FieldDescriptor> {
        &self.descriptor
    }

    pub fn initializer(&self) -> Option<&Expression> {
        self.initializer.as_ref()
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    pub fn into_builder(self) -> FieldBuilder {
        FieldBuilder {
            descriptor: Some(self.descriptor),
            initializer: self.initializer,
            position: self.position,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FieldBuilder {
    descriptor: Option<Arc<FieldDescriptor>>,
    initializer: Option<Expression>,
    position: SourcePosition,
}

impl FieldBuilder {
    pub fn descriptor(mut self, descriptor: Arc<FieldDescriptor>) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn initializer(mut self, initializer: Option<Expression>) -> Self {
        self.initializer = initializer;
        self
    }

    pub fn take_initializer(&mut self) -> Option<Expression> {
        self.initializer.take()
    }

    pub fn position(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    pub fn build(self) -> Result<Field, ConstructionError> {
        let descriptor = self.descriptor.ok_or(ConstructionError::MissingField {
            node: "Field",
            field: "descriptor",
        })?;
        Ok(Field {
            descriptor,
            initializer: self.initializer,
            position: self.position,
        })
    }
}

impl From<&Field> for FieldBuilder {
    fn from(field: &Field) -> Self {
        FieldBuilder {
            descriptor: Some(field.descriptor.clone()),
            initializer: field.initializer.clone(),
            position: field.position.clone(),
        }
    }
}

// =============================================================================
// InitializerBlock
// =============================================================================

/// `static { ... }` or an instance initializer `{ ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct InitializerBlock {
    pub(crate) is_static: bool,
    pub(crate) block: Block,
    pub(crate) position: SourcePosition,
}

impl InitializerBlock {
    pub fn builder() -> InitializerBlockBuilder {
        InitializerBlockBuilder::default()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn into_block(self) -> Block {
        self.block
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }
}

#[derive(Clone, Debug, Default)]
pub struct InitializerBlockBuilder {
    is_static: bool,
    block: Option<Block>,
    position: SourcePosition,
}

impl InitializerBlockBuilder {
    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    pub fn position(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    pub fn build(self) -> Result<InitializerBlock, ConstructionError> {
        let block = self.block.ok_or(ConstructionError::MissingField {
            node: "InitializerBlock",
            field: "block",
        })?;
        Ok(InitializerBlock {
            is_static: self.is_static,
            block,
            position: self.position,
        })
    }
}

impl From<&InitializerBlock> for InitializerBlockBuilder {
    fn from(block: &InitializerBlock) -> Self {
        InitializerBlockBuilder {
            is_static: block.is_static,
            block: Some(block.block.clone()),
            position: block.position.clone(),
        }
    }
}
