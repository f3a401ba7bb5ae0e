use thiserror::Error;

/// A builder was asked to produce a node that would be malformed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("{node} is missing its {field}")]
    MissingField {
        node: &'static str,
        field: &'static str,
    },
    #[error("bridge `{method}` has no forwarding target")]
    BridgeWithoutTarget { method: String },
    #[error("bridge `{method}` forwards to abstract `{target}`")]
    BridgeToAbstractTarget { method: String, target: String },
    #[error("{kind} method `{method}` cannot have a body")]
    UnexpectedBody { method: String, kind: &'static str },
    #[error("method `{method}` needs a body")]
    MissingBody { method: String },
    #[error("method `{method}` declares {expected} parameters, found {found}")]
    ParameterCount {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("call to `{method}` expects {expected} arguments, found {found}")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },
}
