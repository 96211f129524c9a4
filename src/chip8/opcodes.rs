use crate::{
    definitions::{cpu, display},
    display::DisplayBuffer,
    memory::Memory,
    opcode::{
        AddConst, Arithmetic, ArithmeticOpcode, Call, ChipOpcodes, Draw, Jump, JumpOffset, Key,
        KeyOpcode, Misc, MiscOpcode, Operation, ProgramCounter, ProgramCounterStep, Random,
        SetConst, SetIndex, SkipEqualConst, SkipEqualRegister, SkipNotEqualConst,
        SkipNotEqualRegister, System,
    },
    CoreError,
};

use super::CpuState;

/// Runs decoded opcodes against a borrowed machine state for the duration
/// of a single cycle.
pub(super) struct Executor<'a> {
    state: &'a mut CpuState,
    memory: &'a mut Memory,
    display: &'a mut DisplayBuffer,
}

impl<'a> Executor<'a> {
    pub(super) fn new(
        state: &'a mut CpuState,
        memory: &'a mut Memory,
        display: &'a mut DisplayBuffer,
    ) -> Self {
        Self {
            state,
            memory,
            display,
        }
    }

    #[inline]
    fn set_flag(&mut self, flag: bool) {
        self.state.registers[cpu::register::LAST] = flag as u8;
    }

    /// Stores the result first and the flag last, so that `VF` holds the
    /// flag even when it was the target.
    #[inline]
    fn store_flagged(&mut self, x: usize, result: u8, flag: bool) {
        self.state.registers[x] = result;
        self.set_flag(flag);
    }

    fn key_pressed(&self, x: usize) -> bool {
        let key = self.state.registers[x] as usize;
        self.state.keyboard.is_pressed(key).unwrap_or_else(|| {
            log::warn!("V{:X} holds {:#X}, which is not a key, treating it as released.", x, key);
            false
        })
    }
}

impl ProgramCounter for Executor<'_> {
    fn step(&mut self, step: ProgramCounterStep) {
        self.state.program_counter = step.apply(self.state.program_counter);
    }
}

impl ChipOpcodes for Executor<'_> {
    fn zero(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), CoreError> {
        match opcode {
            System::Clear => {
                // 00E0
                // clear display
                self.display.clear();
                Ok((ProgramCounterStep::Next, Operation::Clear))
            }
            System::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.state.pop_stack()?;
                Ok((ProgramCounterStep::Jump(pc), Operation::None))
            }
        }
    }

    fn one(&self, opcode: &Jump) -> Result<ProgramCounterStep, CoreError> {
        // 1NNN
        // Jumps to address NNN.
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn two(&mut self, opcode: &Call) -> Result<ProgramCounterStep, CoreError> {
        // 2NNN
        // Calls subroutine at NNN, the program counter already points past the call
        self.state.push_stack(self.state.program_counter)?;
        Ok(ProgramCounterStep::Jump(opcode.nnn))
    }

    fn three(&self, opcode: &SkipEqualConst) -> Result<ProgramCounterStep, CoreError> {
        // 3XNN
        // Skips the next instruction if VX equals NN.
        Ok(ProgramCounterStep::cond(
            self.state.registers[opcode.x] == opcode.nn,
        ))
    }

    fn four(&self, opcode: &SkipNotEqualConst) -> Result<ProgramCounterStep, CoreError> {
        // 4XNN
        // Skips the next instruction if VX doesn't equal NN.
        Ok(ProgramCounterStep::cond(
            self.state.registers[opcode.x] != opcode.nn,
        ))
    }

    fn five(&self, opcode: &SkipEqualRegister) -> Result<ProgramCounterStep, CoreError> {
        // 5XY0
        // Skips the next instruction if VX equals VY.
        let registers = &self.state.registers;
        Ok(ProgramCounterStep::cond(
            registers[opcode.x] == registers[opcode.y],
        ))
    }

    fn six(&mut self, opcode: &SetConst) -> Result<ProgramCounterStep, CoreError> {
        // 6XNN
        // Sets VX to NN.
        self.state.registers[opcode.x] = opcode.nn;
        Ok(ProgramCounterStep::Next)
    }

    fn seven(&mut self, opcode: &AddConst) -> Result<ProgramCounterStep, CoreError> {
        // 7XNN
        // Adds NN to VX. (Carry flag is not changed)
        let register = &mut self.state.registers[opcode.x];
        *register = register.wrapping_add(opcode.nn);
        Ok(ProgramCounterStep::Next)
    }

    fn eight(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, CoreError> {
        let Arithmetic { ops, x, y } = *opcode;
        let vx = self.state.registers[x];
        let vy = self.state.registers[y];
        // the shifts either work in place or on VY
        let shift_source = if self.state.quirks.legacy_shift { vx } else { vy };

        match ops {
            // 8XY0
            ArithmeticOpcode::Assign => self.state.registers[x] = vy,
            // 8XY1
            ArithmeticOpcode::Or => self.state.registers[x] = vx | vy,
            // 8XY2
            ArithmeticOpcode::And => self.state.registers[x] = vx & vy,
            // 8XY3
            ArithmeticOpcode::Xor => self.state.registers[x] = vx ^ vy,
            ArithmeticOpcode::Add => {
                // 8XY4
                // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
                let (res, carry) = vx.overflowing_add(vy);
                self.store_flagged(x, res, carry);
            }
            ArithmeticOpcode::Sub => {
                // 8XY5
                // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
                // isn't.
                self.store_flagged(x, vx.wrapping_sub(vy), vx >= vy);
            }
            ArithmeticOpcode::ShiftRight => {
                // 8XY6
                // Stores the least significant bit in VF and then shifts to the right by 1.
                self.store_flagged(x, shift_source >> 1, shift_source & 0x01 == 0x01);
            }
            ArithmeticOpcode::SubReverse => {
                // 8XY7
                // Sets VX to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
                // isn't.
                self.store_flagged(x, vy.wrapping_sub(vx), vx <= vy);
            }
            ArithmeticOpcode::ShiftLeft => {
                // 8XYE
                // Stores the most significant bit in VF and then shifts to the left by 1.
                self.store_flagged(x, shift_source << 1, shift_source & 0x80 == 0x80);
            }
        }
        Ok(ProgramCounterStep::Next)
    }

    fn nine(&self, opcode: &SkipNotEqualRegister) -> Result<ProgramCounterStep, CoreError> {
        // 9XY0
        // Skips the next instruction if VX doesn't equal VY.
        let registers = &self.state.registers;
        Ok(ProgramCounterStep::cond(
            registers[opcode.x] != registers[opcode.y],
        ))
    }

    fn a(&mut self, opcode: &SetIndex) -> Result<ProgramCounterStep, CoreError> {
        // ANNN
        // Sets I to the address NNN.
        self.state.index_register = opcode.nnn;
        Ok(ProgramCounterStep::Next)
    }

    fn b(&self, opcode: &JumpOffset) -> Result<ProgramCounterStep, CoreError> {
        // BNNN
        // Jumps to the address NNN plus V0 (or VX with the quirk).
        let register = if self.state.quirks.jump_with_vx {
            opcode.x
        } else {
            0
        };
        let offset = self.state.registers[register] as u16;
        Ok(ProgramCounterStep::Jump(opcode.nnn + offset))
    }

    fn c(&mut self, opcode: &Random) -> Result<ProgramCounterStep, CoreError> {
        // CXNN
        // Sets VX to the result of a bitwise and operation on a random number and NN.

        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand: [u8; 1] = [0];
        self.state.rng.fill_bytes(&mut rand);
        self.state.registers[opcode.x] = opcode.nn & rand[0];
        Ok(ProgramCounterStep::Next)
    }

    fn d(&mut self, opcode: &Draw) -> Result<(ProgramCounterStep, Operation), CoreError> {
        // DXYN
        // Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
        // pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
        // value doesn’t change after the execution of this instruction. VF is set to 1 if any
        // screen pixels are flipped from set to unset when the sprite is drawn, and to 0 if that
        // doesn’t happen.
        const BYTE: usize = 8;

        let index = self.state.index_register as usize;
        // only the starting position wraps, the sprite itself is clipped
        let coorx = self.state.registers[opcode.x] as usize % display::WIDTH;
        let coory = self.state.registers[opcode.y] as usize % display::HEIGHT;

        // Set VF to 0
        self.set_flag(false);
        let mut collision = false;

        for i in 0..opcode.n {
            let y = coory + i;
            if y >= display::HEIGHT {
                break;
            }

            let row = self.memory.read(index + i)?;

            for j in 0..BYTE {
                let x = coorx + j;
                if x >= display::WIDTH {
                    break;
                }

                let mask = 0x80 >> j;
                if row & mask != mask {
                    continue;
                }

                if let Some(true) = self.display.flip(y, x) {
                    collision = true;
                }
            }
        }

        self.set_flag(collision);
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn e(&self, opcode: &Key) -> Result<ProgramCounterStep, CoreError> {
        let pressed = self.key_pressed(opcode.x);
        let step = match opcode.ops {
            // EX9E
            // Skips the next instruction if the key stored in VX is pressed.
            KeyOpcode::Pressed => ProgramCounterStep::cond(pressed),
            // EXA1
            // Skips the next instruction if the key stored in VX isn't pressed.
            KeyOpcode::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        Ok(step)
    }

    fn f(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), CoreError> {
        let x = opcode.x;
        let vx = self.state.registers[x];
        let mut op = Operation::None;

        match opcode.ops {
            MiscOpcode::GetDelayTimer => {
                // FX07
                // Sets VX to the value of the delay timer.
                self.state.registers[x] = self.state.delay_timer.get_value() as u8;
            }
            MiscOpcode::AwaitKeyPress => {
                // FX0A
                // A key press is awaited, and then stored in VX. The cycle driver polls the
                // keyboard until then, the program counter already points past this opcode.
                match self.state.keyboard.first_pressed() {
                    Some(key) => self.state.registers[x] = key as u8,
                    None => {
                        log::debug!("V{:X} is waiting for a key press", x);
                        self.state.awaiting_key = Some(x);
                        op = Operation::Wait;
                    }
                }
            }
            MiscOpcode::SetDelayTimer => {
                // FX15
                // Sets the delay timer to VX.
                self.state.delay_timer.set_value(vx as u16);
            }
            MiscOpcode::SetSoundTimer => {
                // FX18
                // Sets the sound timer to VX.
                self.state.sound_timer.set_value(vx as u16);
            }
            MiscOpcode::AddVxToI => {
                // FX1E
                // Adds VX to I. VF is set when the sum leaves the byte range.
                let index = self.state.index_register;
                let sum = index as u32 + vx as u32;
                self.state.index_register = index.wrapping_add(vx as u16);
                self.set_flag(sum > u8::MAX as u32);
            }
            MiscOpcode::SetIToSprite => {
                // FX29
                // Sets I to the location of the sprite for the character in VX. Characters 0-F (in
                // hexadecimal) are represented by a 4x5 font.
                self.state.index_register = (display::fontset::LOCATION
                    + display::fontset::GLYPH_SIZE * vx as usize)
                    as u16;
            }
            MiscOpcode::StoreBCD => {
                // FX33
                // Stores the binary-coded decimal representation of VX, with the hundreds digit at
                // I, the tens digit at I+1 and the ones digit at I+2.
                let bcd = [
                    vx / 100,     // 246u8 / 100 => 2
                    vx / 10 % 10, // 246u8 / 10 => 24 % 10 => 4
                    vx % 10,      // 246u8 % 10 => 6
                ];
                self.memory
                    .write_slice(self.state.index_register as usize, &bcd)?;
            }
            MiscOpcode::StoreV0ToVx => {
                // FX55
                // Stores V0 to VX (including VX) in memory starting at address I.
                let index = self.state.index_register as usize;
                self.memory
                    .write_slice(index, &self.state.registers[..=x])?;
                self.advance_index(x);
            }
            MiscOpcode::FillV0ToVx => {
                // FX65
                // Fills V0 to VX (including VX) with values from memory starting at address I.
                let index = self.state.index_register as usize;
                let data = self.memory.read_slice(index, x + 1)?;
                self.state.registers[..=x].copy_from_slice(data);
                self.advance_index(x);
            }
        }
        Ok((ProgramCounterStep::Next, op))
    }
}

impl Executor<'_> {
    /// `I` moves past the registers touched by `FX55` / `FX65` when the quirk is on.
    fn advance_index(&mut self, x: usize) {
        if self.state.quirks.load_store_increment {
            let by = (x + 1) as u16;
            self.state.index_register = self.state.index_register.wrapping_add(by);
        }
    }
}
