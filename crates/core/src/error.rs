//! Error types for the instruction core.
//!
//! Memory access and instruction execution are infallible. Everything that can
//! go wrong is a caller mistake detected while building an instruction or while
//! restoring a snapshot.

use crate::registers::Reg16;

/// Construction-time contract violations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InstructionError {
    #[error("bit index {0} is out of range (expected 0-7)")]
    BitOutOfRange(u8),
    #[error("unknown register `{0}`")]
    UnknownRegister(String),
    #[error("unknown register operand code {0:#04x}")]
    UnknownRegisterCode(u8),
    #[error("{0} does not accept an immediate operand")]
    ImmediateOperand(&'static str),
    #[error("{0} cannot be used as an indirect memory pointer")]
    UnsupportedIndirectPair(Reg16),
}

/// Failures while decoding a [`Snapshot`](crate::snapshot::Snapshot).
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot memory image is {0} bytes, expected 65536")]
    MemorySize(usize),
    #[error("unsupported snapshot version {0}")]
    Version(u64),
}
