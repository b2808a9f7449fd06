//! Register window double that records every access and replays a scripted
//! sequence of FLAGS values.

use super::{Register, RegisterWindow};
use crate::constants::flags::FLAG_DONE_MASK;
use std::collections::VecDeque;
use std::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read(Register),
    Write(Register, u32),
}

pub(crate) struct ScriptedWindow {
    pub accesses: Vec<Access>,
    flags: VecDeque<u32>, // consumed one per FLAGS read
    pub idle_flags: u32,  // returned once the script runs dry
    pub data_out: u32,
}

impl ScriptedWindow {
    /// Every FLAGS read reports DONE
    pub fn completing() -> Self {
        Self::with_idle_flags(FLAG_DONE_MASK)
    }

    pub fn with_idle_flags(idle_flags: u32) -> Self {
        Self {
            accesses: Vec::new(),
            flags: VecDeque::new(),
            idle_flags,
            data_out: 0,
        }
    }

    pub fn script_flags(&mut self, values: &[u32]) {
        self.flags.extend(values.iter().copied());
    }

    pub fn writes(&self) -> Vec<(Register, u32)> {
        self.accesses
            .iter()
            .filter_map(|access| match access {
                Access::Write(reg, value) => Some((*reg, *value)),
                Access::Read(_) => None,
            })
            .collect()
    }

    /// Words written to INSTRUCT, in order
    pub fn instruction_words(&self) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|(reg, _)| *reg == Register::Instruct)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn reads_of(&self, target: Register) -> usize {
        self.accesses
            .iter()
            .filter(|access| **access == Access::Read(target))
            .count()
    }
}

impl RegisterWindow for ScriptedWindow {
    fn read(&mut self, reg: Register) -> u32 {
        self.accesses.push(Access::Read(reg));
        match reg {
            Register::Flags => self.flags.pop_front().unwrap_or(self.idle_flags),
            Register::DataOut => self.data_out,
            Register::Instruct | Register::Enable => 0,
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.accesses.push(Access::Write(reg, value));
    }
}
