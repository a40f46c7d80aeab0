//! Game Boy memory management unit
//!
//! A flat 64 KiB address space. Every `u16` is a valid address, so byte and
//! word access can never fail. Bank switching and memory-mapped I/O belong to
//! collaborators layered on top through the [`Memory`] trait.
//!
//! # Readiness
//!
//! The unit carries a readiness gate driven by the boot sequence. A fresh unit
//! and a freshly reset unit are [`Readiness::NotReady`]; the boot sequence calls
//! [`MemoryUnit::set_system_ready`] once memory content can be trusted. The
//! gate never blocks access: reads and writes while not ready are carried out
//! and reported on the MMU log category.

use crate::logging::{log, LogCategory, LogLevel};

/// Size of the addressable space
pub const MEMORY_SIZE: usize = 0x10000;

/// Byte-addressable memory as seen by instructions.
pub trait Memory {
    fn read_byte(&self, addr: u16) -> u8;

    fn write_byte(&mut self, addr: u16, val: u8);

    /// Little-endian: low byte at `addr`, high byte at `addr + 1` (wrapping).
    fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write_word(&mut self, addr: u16, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }
}

/// Readiness gate of the memory unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

/// Flat 64 KiB memory with a readiness gate
#[derive(Clone)]
pub struct MemoryUnit {
    bytes: Box<[u8; MEMORY_SIZE]>,
    ready: Readiness,
}

impl MemoryUnit {
    /// Power-on state: all zero, not ready.
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; MEMORY_SIZE]),
            ready: Readiness::NotReady,
        }
    }

    /// Zero every cell. The unit stays unready until the boot sequence
    /// calls [`set_system_ready`](Self::set_system_ready) again.
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        self.ready = Readiness::NotReady;
        log(LogCategory::Mmu, LogLevel::Debug, || {
            "MMU: reset, memory cleared".to_string()
        });
    }

    pub fn set_system_ready(&mut self, ready: bool) {
        let next = if ready {
            Readiness::Ready
        } else {
            Readiness::NotReady
        };
        if next != self.ready {
            log(LogCategory::Mmu, LogLevel::Debug, || {
                format!("MMU: readiness {:?} -> {:?}", self.ready, next)
            });
        }
        self.ready = next;
    }

    pub fn is_system_ready(&self) -> bool {
        self.ready == Readiness::Ready
    }

    pub fn readiness(&self) -> Readiness {
        self.ready
    }

    /// Copy `data` starting at `addr`, wrapping past 0xFFFF.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let mut cursor = addr;
        for &byte in data {
            self.bytes[cursor as usize] = byte;
            cursor = cursor.wrapping_add(1);
        }
        log(LogCategory::Mmu, LogLevel::Debug, || {
            format!("MMU: loaded {} byte(s) at {:04X}", data.len(), addr)
        });
    }

    /// Borrow the whole address space.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }

    fn trace_unready(&self, access: &str, addr: u16) {
        if self.ready == Readiness::NotReady {
            log(LogCategory::Mmu, LogLevel::Trace, || {
                format!("MMU: {} at {:04X} while not ready", access, addr)
            });
        }
    }
}

impl Default for MemoryUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryUnit")
            .field("ready", &self.ready)
            .field("size", &MEMORY_SIZE)
            .finish()
    }
}

impl Memory for MemoryUnit {
    fn read_byte(&self, addr: u16) -> u8 {
        self.trace_unready("read", addr);
        self.bytes[addr as usize]
    }

    fn write_byte(&mut self, addr: u16, val: u8) {
        self.trace_unready("write", addr);
        self.bytes[addr as usize] = val;
    }
}
