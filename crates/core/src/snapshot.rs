//! Copies of CPU and memory state taken between instructions.
//!
//! The register file and memory unit are owned by whichever thread runs the
//! instructions. Other threads (debuggers, UI) observe them through a
//! [`Snapshot`] captured at an instruction boundary, never by sharing the live
//! state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SnapshotError;
use crate::mmu::{MemoryUnit, MEMORY_SIZE};
use crate::registers::RegisterFile;

/// Format version written by [`Snapshot::to_json`]
pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registers: RegisterFile,
    pub memory: Vec<u8>,
    pub ready: bool,
}

impl Snapshot {
    pub fn capture(regs: &RegisterFile, mmu: &MemoryUnit) -> Self {
        Self {
            registers: regs.clone(),
            memory: mmu.as_slice().to_vec(),
            ready: mmu.is_system_ready(),
        }
    }

    /// Overwrite `regs` and `mmu` with this snapshot.
    pub fn restore(&self, regs: &mut RegisterFile, mmu: &mut MemoryUnit) -> Result<(), SnapshotError> {
        if self.memory.len() != MEMORY_SIZE {
            return Err(SnapshotError::MemorySize(self.memory.len()));
        }
        *regs = self.registers.clone();
        mmu.load(0x0000, &self.memory);
        mmu.set_system_ready(self.ready);
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "version": SNAPSHOT_VERSION,
            "registers": self.registers,
            "memory": self.memory,
            "ready": self.ready,
        })
    }

    pub fn from_json(v: &Value) -> Result<Self, SnapshotError> {
        let version = v.get("version").and_then(Value::as_u64).unwrap_or(0);
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version(version));
        }
        let snapshot: Snapshot = serde_json::from_value(v.clone())?;
        if snapshot.memory.len() != MEMORY_SIZE {
            return Err(SnapshotError::MemorySize(snapshot.memory.len()));
        }
        Ok(snapshot)
    }
}
