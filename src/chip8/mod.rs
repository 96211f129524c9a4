//! The full implementation of the chip8 emulator, from the opcodes to an option to pretty
//! print them.
mod chipset;
mod opcodes;
mod print;

use std::convert::TryFrom;

use crate::{
    definitions::memory,
    display::DisplayBuffer,
    memory::Memory,
    opcode::{ChipOpcodes, Opcode, Opcodes, Operation},
    CoreError,
};

/// reexport chipset structs and data for simpler usage
pub use chipset::*;

/// Runs a single, already fetched opcode. Opcodes without a meaning are
/// skipped with a warning, they never fail the cycle.
///
/// # Example
/// ```rust
/// # use emu8::{chip8::{self, CpuState}, display::DisplayBuffer, memory::Memory, opcode::Operation};
/// let mut state = CpuState::default();
/// let mut mem = Memory::new();
/// let mut display = DisplayBuffer::new();
///
/// chip8::execute(0x60FF, &mut state, &mut mem, &mut display)?;
/// chip8::execute(0x7001, &mut state, &mut mem, &mut display)?;
/// assert_eq!(0, state.registers()[0]);
///
/// // 8XYF doesn't exist
/// let op = chip8::execute(0x801F, &mut state, &mut mem, &mut display)?;
/// assert_eq!(Operation::None, op);
/// # Ok::<(), emu8::CoreError>(())
/// ```
pub fn execute(
    opcode: Opcode,
    state: &mut CpuState,
    memory: &mut Memory,
    display: &mut DisplayBuffer,
) -> Result<Operation, CoreError> {
    let decoded = match Opcodes::try_from(opcode) {
        Ok(decoded) => decoded,
        Err(err) => {
            log::warn!("{} Skipping it.", err);
            return Ok(Operation::None);
        }
    };

    log::debug!("opcode {:#06X} {:?}", opcode, decoded);
    opcodes::Executor::new(state, memory, display).calc(&decoded)
}

/// A single cycle: while an `FX0A` is pending the keyboard is polled,
/// otherwise the opcode at the program counter is fetched, the counter moves
/// past it and the opcode gets executed.
pub fn step(
    state: &mut CpuState,
    memory: &mut Memory,
    display: &mut DisplayBuffer,
) -> Result<Operation, CoreError> {
    if let Some(x) = state.awaiting_key {
        return Ok(match state.keyboard.first_pressed() {
            Some(key) => {
                log::debug!("key {:#X} pressed, storing it in V{:X}", key, x);
                state.registers[x] = key as u8;
                state.awaiting_key = None;
                Operation::None
            }
            None => {
                log::trace!("V{:X} is still waiting for a key press", x);
                Operation::Wait
            }
        });
    }

    let pointer = state.program_counter as usize;
    let opcode = memory.opcode(pointer)?;
    if opcode == 0 {
        return Err(CoreError::FetchFault { pointer });
    }

    state.program_counter = state
        .program_counter
        .wrapping_add(memory::opcodes::SIZE as u16);
    execute(opcode, state, memory, display)
}

/// Counts the delay and sound timers down by one, called once per rendered frame.
pub fn tick_timers(state: &mut CpuState) {
    state.delay_timer.tick();
    state.sound_timer.tick();
}

/// split up tests into an other file for simpler implementation
#[cfg(test)]
mod tests;
