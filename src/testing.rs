//! In-memory LT8491 used by the unit tests.

use crate::{lt8491::registers::DEFAULT_ADDRESS, transport::Transport};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FakeError {
    #[error("no ack from 0x{0:02X}")]
    Nack(u8),
    #[error("injected failure at 0x{0:02X}")]
    Injected(u8),
}

/// A 256 byte register file answering at [`DEFAULT_ADDRESS`].
///
/// Reads that start at a register in `fail_once` error out once; reads that
/// start at a register in `stalled` never complete.
pub struct FakeBus {
    mem: [u8; 256],
    fail_once: HashSet<u8>,
    fail_always: HashSet<u8>,
    stalled: HashSet<u8>,
    /// Overrides the value a read of this command returns, leaving writes intact.
    read_override: Vec<(u8, Vec<u8>)>,
    writes: Vec<(u8, Vec<u8>)>,
    reads: Vec<u8>,
}

impl FakeBus {
    pub fn new() -> Self {
        FakeBus {
            mem: [0; 256],
            fail_once: HashSet::new(),
            fail_always: HashSet::new(),
            stalled: HashSet::new(),
            read_override: Vec::new(),
            writes: Vec::new(),
            reads: Vec::new(),
        }
    }

    pub fn set_byte(&mut self, command: u8, value: u8) {
        self.mem[command as usize] = value;
    }

    pub fn set_word(&mut self, command: u8, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.mem[command as usize] = lo;
        self.mem[command as usize + 1] = hi;
    }

    pub fn byte(&self, command: u8) -> u8 {
        self.mem[command as usize]
    }

    pub fn fail_once(&mut self, command: u8) {
        self.fail_once.insert(command);
    }

    pub fn fail_always(&mut self, command: u8) {
        self.fail_always.insert(command);
    }

    pub fn stall(&mut self, command: u8) {
        self.stalled.insert(command);
    }

    pub fn override_word(&mut self, command: u8, value: u16) {
        self.read_override.push((command, value.to_le_bytes().to_vec()));
    }

    pub fn writes(&self) -> &[(u8, Vec<u8>)] {
        &self.writes
    }

    /// Commands read so far, in order.
    pub fn reads(&self) -> &[u8] {
        &self.reads
    }
}

impl Transport for FakeBus {
    type Error = FakeError;

    async fn read(&mut self, address: u8, command: u8, buf: &mut [u8]) -> Result<(), FakeError> {
        if address != DEFAULT_ADDRESS {
            return Err(FakeError::Nack(address));
        }
        if self.stalled.contains(&command) {
            std::future::pending::<()>().await;
        }
        self.reads.push(command);
        if self.fail_once.remove(&command) || self.fail_always.contains(&command) {
            return Err(FakeError::Injected(command));
        }
        if let Some((_, data)) = self.read_override.iter().find(|(c, _)| *c == command) {
            buf.copy_from_slice(data);
            return Ok(());
        }
        let start = command as usize;
        buf.copy_from_slice(&self.mem[start..start + buf.len()]);
        Ok(())
    }

    async fn write(&mut self, address: u8, command: u8, data: &[u8]) -> Result<(), FakeError> {
        if address != DEFAULT_ADDRESS {
            return Err(FakeError::Nack(address));
        }
        if self.fail_always.contains(&command) {
            return Err(FakeError::Injected(command));
        }
        let start = command as usize;
        self.mem[start..start + data.len()].copy_from_slice(data);
        self.writes.push((command, data.to_vec()));
        Ok(())
    }
}
