//! Concrete operator installed by the binary.

/// Implements every operator port on top of the infrastructure layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Operator;
