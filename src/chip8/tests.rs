use {
    super::{ChipSet, CpuState},
    crate::{
        definitions::{cpu, display, memory},
        memory::Memory,
        opcode::{Opcode, Operation},
        quirks::Quirks,
        resources::Rom,
        CoreError, StackError,
    },
    rand::rngs::mock::StepRng,
};

const ROM_NAME: &str = "TEST";

/// The first byte the mocked random number generator hands out.
const RANDOM_BYTE: u8 = 0x42;

/// Builds an opcode of the form `TXYN`.
fn xyn(t: u16, x: usize, y: usize, n: u16) -> Opcode {
    t << (3 * 4) ^ (x as u16) << (2 * 4) ^ (y as u16) << 4 ^ n
}

/// Builds an opcode of the form `TXNN`.
fn xnn(t: u16, x: usize, nn: u8) -> Opcode {
    t << (3 * 4) ^ (x as u16) << (2 * 4) ^ nn as u16
}

pub(super) fn program(opcodes: &[Opcode]) -> Rom {
    let data: Vec<u8> = opcodes.iter().flat_map(|opcode| opcode.to_be_bytes()).collect();
    Rom::new(ROM_NAME, data)
}

pub(super) fn setup_chip_with(opcodes: &[Opcode], quirks: Quirks) -> ChipSet {
    let state = CpuState::with_rng(quirks, Box::new(StepRng::new(RANDOM_BYTE as u64, 0)));
    let mut chip = ChipSet::with_state(program(opcodes), state);
    // fill up register with random values
    chip.state.registers = rand::random();
    chip
}

pub(super) fn setup_chip(opcodes: &[Opcode]) -> ChipSet {
    setup_chip_with(opcodes, Quirks::default())
}

/// will setup the default configured chip
pub(super) fn get_default_chip() -> ChipSet {
    setup_chip(&[])
}

#[inline]
/// Will write the opcode to the memory location specified
pub(super) fn write_opcode_to_memory(memory: &mut Memory, from: usize, opcode: Opcode) {
    write_slice_to_memory(memory, from, &opcode.to_be_bytes());
}

#[inline]
/// Will write the slice to the memory location specified
pub(super) fn write_slice_to_memory(memory: &mut Memory, from: usize, data: &[u8]) {
    memory
        .write_slice(from, data)
        .expect("test data fits into memory");
}

/// Writes the opcode at the program counter and runs a single cycle.
fn run_opcode(chip: &mut ChipSet, opcode: Opcode) -> Result<Operation, CoreError> {
    let pc = chip.state.program_counter as usize;
    write_opcode_to_memory(&mut chip.memory, pc, opcode);
    chip.next()
}

fn pc(chip: &ChipSet) -> usize {
    chip.state.program_counter as usize
}

#[test]
/// testing internal functionality of popping and pushing into the stack
fn test_push_pop_stack() {
    let mut chip = get_default_chip();

    // check empty initial stack
    assert!(chip.state.stack.is_empty());

    let next_counter = 0x0133 + cpu::PROGRAM_COUNTER as u16;

    for i in 0..cpu::stack::SIZE as u16 {
        assert_eq!(Ok(()), chip.state.push_stack(next_counter + i * 8));
    }
    // check for the correct error
    assert_eq!(Err(StackError::Overflow), chip.state.push_stack(next_counter));

    assert_eq!(cpu::stack::SIZE, chip.state.stack.len());
    for i in (0..cpu::stack::SIZE as u16).rev() {
        assert_eq!(Ok(next_counter + i * 8), chip.state.pop_stack());
    }
    assert!(chip.state.stack.is_empty());
    assert_eq!(Err(StackError::Underflow), chip.state.pop_stack());
}

#[test]
fn test_initial_state() {
    let chip = setup_chip(&[0x00E0]);
    assert_eq!(cpu::PROGRAM_COUNTER, pc(&chip));
    assert_eq!(0, chip.state.index_register);
    assert_eq!(0, chip.state.get_delay_timer());
    assert_eq!(0, chip.state.get_sound_timer());
    assert_eq!(None, chip.state.awaiting_key());
    assert_eq!(ROM_NAME, chip.name());
    assert_eq!(Ok(0x00E0), chip.memory.opcode(cpu::PROGRAM_COUNTER));
    assert_eq!(0, chip.display.lit());
}

#[test]
fn test_seeded_chips_agree() {
    let quirks = Quirks::default();
    let mut left = ChipSet::with_seed(program(&[0xC0FF, 0x1200]), quirks, 7);
    let mut right = ChipSet::with_seed(program(&[0xC0FF, 0x1200]), quirks, 7);
    for _ in 0..20 {
        left.next().expect("program runs");
        right.next().expect("program runs");
        assert_eq!(left.state.registers[0], right.state.registers[0]);
    }
}

#[test]
/// an all zero opcode halts the chip without moving the program counter
fn test_fetch_zero_opcode() {
    let mut chip = get_default_chip();
    assert_eq!(
        Err(CoreError::FetchFault {
            pointer: cpu::PROGRAM_COUNTER
        }),
        chip.next()
    );
    assert_eq!(cpu::PROGRAM_COUNTER, pc(&chip));
}

#[test]
fn test_fetch_out_of_bounds() {
    let mut chip = get_default_chip();
    let fault = CoreError::MemoryFault {
        pointer: memory::SIZE,
        len: memory::SIZE,
    };

    chip.state.program_counter = (memory::SIZE - 1) as u16;
    assert_eq!(Err(fault), chip.next());

    chip.state.program_counter = memory::SIZE as u16;
    assert_eq!(Err(fault), chip.next());
}

#[test]
/// opcodes without a meaning are skipped
fn test_unknown_opcodes_are_skipped() {
    for opcode in [0x0123, 0x800F, 0xE1FF, 0xF1FF] {
        let mut chip = get_default_chip();
        let registers = chip.state.registers;
        assert_eq!(Ok(Operation::None), run_opcode(&mut chip, opcode));
        assert_eq!(cpu::PROGRAM_COUNTER + memory::opcodes::SIZE, pc(&chip));
        assert_eq!(registers, chip.state.registers);
    }
}

#[test]
fn test_tick_timers() {
    let mut chip = get_default_chip();
    chip.state.delay_timer.set_value(2);
    chip.state.sound_timer.set_value(1);

    chip.tick_timers();
    assert_eq!(1, chip.state.get_delay_timer());
    assert_eq!(0, chip.state.get_sound_timer());

    chip.tick_timers();
    chip.tick_timers();
    assert_eq!(0, chip.state.get_delay_timer());
    assert_eq!(0, chip.state.get_sound_timer());
}

mod zero {
    use super::*;

    #[test]
    /// test clear display opcode
    /// `0x00E0`
    fn test_clear_display_opcode() {
        let mut chip = get_default_chip();
        for i in 0..display::HEIGHT {
            chip.display.flip(i, i);
        }
        assert_ne!(0, chip.display.lit());

        assert_eq!(Ok(Operation::Clear), run_opcode(&mut chip, 0x00E0));

        assert_eq!(0, chip.display.lit());
        assert_eq!(cpu::PROGRAM_COUNTER + memory::opcodes::SIZE, pc(&chip));
    }

    #[test]
    /// `00E0` followed by `1202` keeps spinning on the jump
    fn test_clear_and_spin() {
        let mut chip = setup_chip(&[0x00E0, 0x1202]);
        chip.display.flip(3, 3);
        for _ in 0..100 {
            assert!(chip.next().is_ok());
        }
        assert_eq!(0, chip.display.lit());
        assert_eq!(0x202, pc(&chip));
    }

    #[test]
    /// test return from subroutine
    /// `0x00EE`
    fn test_return_subroutine() {
        let mut chip = setup_chip(&[0x2206, 0x6001]);
        write_opcode_to_memory(&mut chip.memory, 0x206, 0x00EE);

        assert_eq!(Ok(Operation::None), chip.next());
        assert_eq!(0x206, pc(&chip));
        assert_eq!(Ok(Operation::None), chip.next());
        assert_eq!(0x202, pc(&chip));

        // continues right after the call
        chip.next().expect("6001 runs");
        assert_eq!(1, chip.state.registers[0]);
    }

    #[test]
    fn test_return_empty_stack() {
        let mut chip = setup_chip(&[0x00EE]);
        assert_eq!(
            Err(CoreError::Stack(StackError::Underflow)),
            chip.next()
        );
    }
}

mod one {
    use super::*;

    #[test]
    /// test a simple jump to the next address
    /// `1NNN`
    fn test_jump_address() {
        let mut chip = get_default_chip();
        assert_eq!(Ok(Operation::None), run_opcode(&mut chip, 0x1234));
        assert_eq!(0x234, pc(&chip));
    }
}

mod two {
    use super::*;

    #[test]
    /// `2NNN`
    fn test_call_subroutine() {
        let mut chip = get_default_chip();
        assert_eq!(Ok(Operation::None), run_opcode(&mut chip, 0x2345));
        assert_eq!(0x345, pc(&chip));
        assert_eq!(&[0x202], chip.state.stack());
    }

    #[test]
    /// nested calls return to the instruction after the first call
    fn test_call_return_depths() {
        let spin = cpu::PROGRAM_COUNTER + memory::opcodes::SIZE;
        for depth in 1..=cpu::stack::SIZE {
            // the subroutine at 0x204 counts V0 up and recurses until V0 == depth
            let mut chip = setup_chip(&[
                0x2204,
                0x1202,
                0x7001,
                xnn(0x3, 0x0, depth as u8),
                0x2204,
                0x00EE,
            ]);
            chip.state.registers[0x0] = 0;

            let mut deepest = 0;
            for _ in 0..(8 * depth) {
                chip.next().expect("calls and returns stay in bounds");
                deepest = deepest.max(chip.state.stack().len());
                if pc(&chip) == spin && chip.state.stack().is_empty() {
                    break;
                }
            }
            assert_eq!(depth, deepest, "depth {}", depth);
            assert_eq!(depth as u8, chip.state.registers[0x0]);
            assert!(chip.state.stack().is_empty(), "depth {}", depth);
            assert_eq!(spin, pc(&chip), "depth {}", depth);
        }
    }

    #[test]
    fn test_call_overflow() {
        // calls itself forever
        let mut chip = setup_chip(&[0x2200]);
        for _ in 0..cpu::stack::SIZE {
            assert!(chip.next().is_ok());
        }
        assert_eq!(Err(CoreError::Stack(StackError::Overflow)), chip.next());
    }
}

mod three {
    use super::*;

    #[test]
    /// `3XNN`
    fn test_skip_equal_const() {
        for (value, skip) in [(0x12, true), (0x13, false)] {
            let mut chip = get_default_chip();
            chip.state.registers[0x4] = value;
            assert!(run_opcode(&mut chip, xnn(0x3, 0x4, 0x12)).is_ok());
            let steps = if skip { 2 } else { 1 };
            assert_eq!(
                cpu::PROGRAM_COUNTER + steps * memory::opcodes::SIZE,
                pc(&chip)
            );
        }
    }
}

mod four {
    use super::*;

    #[test]
    /// `4XNN`
    fn test_skip_not_equal_const() {
        for (value, skip) in [(0x12, false), (0x13, true)] {
            let mut chip = get_default_chip();
            chip.state.registers[0xA] = value;
            assert!(run_opcode(&mut chip, xnn(0x4, 0xA, 0x12)).is_ok());
            let steps = if skip { 2 } else { 1 };
            assert_eq!(
                cpu::PROGRAM_COUNTER + steps * memory::opcodes::SIZE,
                pc(&chip)
            );
        }
    }
}

mod five {
    use super::*;

    #[test]
    /// `5XY0`, the low nibble is ignored
    fn test_skip_equal_register() {
        for n in [0x0, 0x1, 0xF] {
            for (right, skip) in [(0x12, true), (0x21, false)] {
                let mut chip = get_default_chip();
                chip.state.registers[0x1] = 0x12;
                chip.state.registers[0x2] = right;
                assert!(run_opcode(&mut chip, xyn(0x5, 0x1, 0x2, n)).is_ok());
                let steps = if skip { 2 } else { 1 };
                assert_eq!(
                    cpu::PROGRAM_COUNTER + steps * memory::opcodes::SIZE,
                    pc(&chip)
                );
            }
        }
    }
}

mod six {
    use super::*;

    #[test]
    /// `6XNN`
    fn test_set_vx_to_nn() {
        let mut chip = get_default_chip();
        assert!(run_opcode(&mut chip, xnn(0x6, 0x7, 0xAB)).is_ok());
        assert_eq!(0xAB, chip.state.registers[0x7]);
    }
}

mod seven {
    use super::*;

    #[test]
    /// `7XNN`, the carry is dropped and `VF` left alone
    fn test_add_wraps_without_flag() {
        let mut chip = setup_chip(&[0x60FF, 0x7001]);
        let flag = chip.state.registers[cpu::register::LAST];
        chip.next().expect("60FF runs");
        chip.next().expect("7001 runs");
        assert_eq!(0, chip.state.registers[0]);
        assert_eq!(flag, chip.state.registers[cpu::register::LAST]);
    }
}

mod eight {
    use super::*;

    const LAST: usize = cpu::register::LAST;

    fn run(chip: &mut ChipSet, x: usize, y: usize, n: u16) {
        assert_eq!(Ok(Operation::None), run_opcode(chip, xyn(0x8, x, y, n)));
    }

    #[test]
    /// `8XY0` - `8XY3`
    fn test_assign_and_bit_ops() {
        let data = [
            (0x0, 0b1100_1010, 0b1010_0110, 0b1010_0110),
            (0x1, 0b1100_1010, 0b1010_0110, 0b1110_1110),
            (0x2, 0b1100_1010, 0b1010_0110, 0b1000_0010),
            (0x3, 0b1100_1010, 0b1010_0110, 0b0110_1100),
        ];
        for (n, left, right, result) in data {
            let mut chip = get_default_chip();
            chip.state.registers[0x1] = left;
            chip.state.registers[0x2] = right;
            let flag = chip.state.registers[LAST];
            run(&mut chip, 0x1, 0x2, n);
            assert_eq!(result, chip.state.registers[0x1]);
            assert_eq!(right, chip.state.registers[0x2]);
            assert_eq!(flag, chip.state.registers[LAST]);
        }
    }

    #[test]
    /// `8XY4`
    fn test_add_with_carry() {
        for (left, right, sum, carry) in [(0x10, 0x20, 0x30, 0), (0xFF, 0x02, 0x01, 1)] {
            let mut chip = get_default_chip();
            chip.state.registers[0x3] = left;
            chip.state.registers[0x4] = right;
            run(&mut chip, 0x3, 0x4, 0x4);
            assert_eq!(sum, chip.state.registers[0x3]);
            assert_eq!(carry, chip.state.registers[LAST]);
        }
    }

    #[test]
    /// `8XY5`, `VF` is set when there is no borrow
    fn test_sub() {
        for (left, right, diff, flag) in [
            (0x30, 0x20, 0x10, 1),
            (0x20, 0x20, 0x00, 1),
            (0x20, 0x30, 0xF0, 0),
        ] {
            let mut chip = get_default_chip();
            chip.state.registers[0x3] = left;
            chip.state.registers[0x4] = right;
            run(&mut chip, 0x3, 0x4, 0x5);
            assert_eq!(diff, chip.state.registers[0x3]);
            assert_eq!(flag, chip.state.registers[LAST]);
        }
    }

    #[test]
    /// `8XY7`
    fn test_sub_reverse() {
        for (left, right, diff, flag) in [
            (0x05, 0x03, 0xFE, 0),
            (0x03, 0x05, 0x02, 1),
            (0x07, 0x07, 0x00, 1),
        ] {
            let mut chip = get_default_chip();
            chip.state.registers[0x3] = left;
            chip.state.registers[0x4] = right;
            run(&mut chip, 0x3, 0x4, 0x7);
            assert_eq!(diff, chip.state.registers[0x3]);
            assert_eq!(flag, chip.state.registers[LAST]);
        }
    }

    #[test]
    /// `8XY6` and `8XYE` shift `VX` in place
    fn test_shifts_legacy() {
        let mut chip = get_default_chip();
        chip.state.registers[0x1] = 0b0000_0101;
        chip.state.registers[0x2] = 0xFF;
        run(&mut chip, 0x1, 0x2, 0x6);
        assert_eq!(0b0000_0010, chip.state.registers[0x1]);
        assert_eq!(1, chip.state.registers[LAST]);

        run(&mut chip, 0x1, 0x2, 0x6);
        assert_eq!(0b0000_0001, chip.state.registers[0x1]);
        assert_eq!(0, chip.state.registers[LAST]);

        chip.state.registers[0x1] = 0b1000_0001;
        run(&mut chip, 0x1, 0x2, 0xE);
        assert_eq!(0b0000_0010, chip.state.registers[0x1]);
        assert_eq!(1, chip.state.registers[LAST]);

        run(&mut chip, 0x1, 0x2, 0xE);
        assert_eq!(0b0000_0100, chip.state.registers[0x1]);
        assert_eq!(0, chip.state.registers[LAST]);
    }

    #[test]
    /// `8XY6` and `8XYE` shift `VY` into `VX`
    fn test_shifts_from_vy() {
        let mut chip = get_default_chip();
        chip.state.quirks = Quirks::cosmac();
        chip.state.registers[0x1] = 0;
        chip.state.registers[0x2] = 0b1000_0011;

        run(&mut chip, 0x1, 0x2, 0x6);
        assert_eq!(0b0100_0001, chip.state.registers[0x1]);
        assert_eq!(1, chip.state.registers[LAST]);

        run(&mut chip, 0x1, 0x2, 0xE);
        assert_eq!(0b0000_0110, chip.state.registers[0x1]);
        assert_eq!(1, chip.state.registers[LAST]);
        assert_eq!(0b1000_0011, chip.state.registers[0x2]);
    }

    #[test]
    /// the flag wins when `VF` is the target, it is computed from the old values
    fn test_flag_written_last() {
        let mut chip = get_default_chip();
        chip.state.registers[LAST] = 0xFF;
        chip.state.registers[0x0] = 0x01;
        run(&mut chip, LAST, 0x0, 0x4);
        assert_eq!(1, chip.state.registers[LAST]);

        chip.state.registers[LAST] = 0x01;
        chip.state.registers[0x0] = 0x02;
        run(&mut chip, LAST, 0x0, 0x5);
        assert_eq!(0, chip.state.registers[LAST]);

        chip.state.registers[LAST] = 0b0000_0010;
        run(&mut chip, LAST, 0x0, 0x6);
        assert_eq!(0, chip.state.registers[LAST]);

        // `VF` as the source operand
        chip.state.registers[LAST] = 0x80;
        chip.state.registers[0x0] = 0x80;
        run(&mut chip, 0x0, LAST, 0x4);
        assert_eq!(0x00, chip.state.registers[0x0]);
        assert_eq!(1, chip.state.registers[LAST]);
    }
}

mod nine {
    use super::*;

    #[test]
    /// `9XY0`, the low nibble is ignored
    fn test_skip_not_equal_register() {
        for n in [0x0, 0x8] {
            for (right, skip) in [(0x12, false), (0x21, true)] {
                let mut chip = get_default_chip();
                chip.state.registers[0x1] = 0x12;
                chip.state.registers[0x2] = right;
                assert!(run_opcode(&mut chip, xyn(0x9, 0x1, 0x2, n)).is_ok());
                let steps = if skip { 2 } else { 1 };
                assert_eq!(
                    cpu::PROGRAM_COUNTER + steps * memory::opcodes::SIZE,
                    pc(&chip)
                );
            }
        }
    }
}

mod a {
    use super::*;

    #[test]
    /// `ANNN`
    fn test_set_index() {
        let mut chip = get_default_chip();
        assert!(run_opcode(&mut chip, 0xA123).is_ok());
        assert_eq!(0x123, chip.state.index_register);
    }
}

mod b {
    use super::*;

    #[test]
    /// `BNNN`
    fn test_jump_with_v0() {
        let mut chip = get_default_chip();
        chip.state.registers[0x0] = 0x10;
        chip.state.registers[0x3] = 0x04;
        assert!(run_opcode(&mut chip, 0xB300).is_ok());
        assert_eq!(0x310, pc(&chip));
    }

    #[test]
    /// `BXNN` with the quirk
    fn test_jump_with_vx() {
        let mut chip = setup_chip_with(&[], Quirks::super_chip());
        chip.state.registers[0x0] = 0x10;
        chip.state.registers[0x3] = 0x04;
        assert!(run_opcode(&mut chip, 0xB300).is_ok());
        assert_eq!(0x304, pc(&chip));
    }

    #[test]
    /// a jump past the memory faults on the next fetch
    fn test_jump_out_of_memory() {
        let mut chip = get_default_chip();
        chip.state.registers[0x0] = 0xFF;
        assert!(run_opcode(&mut chip, 0xBFFF).is_ok());
        assert_eq!(0x10FE, pc(&chip));
        assert_eq!(
            Err(CoreError::MemoryFault {
                pointer: 0x10FE,
                len: memory::SIZE
            }),
            chip.next()
        );
    }
}

mod c {
    use super::*;

    #[test]
    /// `CXNN`
    fn test_random_masked() {
        for (nn, expected) in [(0xFF, RANDOM_BYTE), (0x0F, RANDOM_BYTE & 0x0F), (0x00, 0)] {
            let mut chip = get_default_chip();
            assert!(run_opcode(&mut chip, xnn(0xC, 0x1, nn)).is_ok());
            assert_eq!(expected, chip.state.registers[0x1]);
        }
    }
}

mod d {
    use super::*;

    const LAST: usize = cpu::register::LAST;

    /// the rows of the `0` glyph
    const ZERO_GLYPH: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    fn setup(x: u8, y: u8, index: u16) -> ChipSet {
        let mut chip = get_default_chip();
        chip.state.registers[0x0] = x;
        chip.state.registers[0x1] = y;
        chip.state.index_register = index;
        chip
    }

    fn row_is(chip: &ChipSet, row: usize, from: usize, byte: u8) {
        for bit in 0..8 {
            let expected = byte & (0x80 >> bit) != 0;
            assert_eq!(expected, chip.display.get(row, from + bit), "row {} bit {}", row, bit);
        }
    }

    #[test]
    /// `DXYN`
    fn test_draw_glyph() {
        let mut chip = setup(0, 0, 0);
        assert_eq!(Ok(Operation::Draw), run_opcode(&mut chip, 0xD015));

        for (row, byte) in ZERO_GLYPH.iter().enumerate() {
            row_is(&chip, row, 0, *byte);
        }
        assert_eq!(14, chip.display.lit());
        assert_eq!(0, chip.state.registers[LAST]);
        assert_eq!(0, chip.state.index_register);
    }

    #[test]
    /// the coordinates are read before `VF` is reset
    fn test_draw_at_flag_register() {
        let mut chip = setup(0, 2, 0);
        chip.state.registers[LAST] = 3;
        assert_eq!(Ok(Operation::Draw), run_opcode(&mut chip, 0xDF11));
        row_is(&chip, 2, 3, ZERO_GLYPH[0]);
        assert_eq!(4, chip.display.lit());
        assert_eq!(0, chip.state.registers[LAST]);

        let mut chip = setup(0, 0, 0);
        chip.state.registers[LAST] = 5;
        assert_eq!(Ok(Operation::Draw), run_opcode(&mut chip, 0xD0F1));
        row_is(&chip, 5, 0, ZERO_GLYPH[0]);
        assert_eq!(4, chip.display.lit());
        assert_eq!(0, chip.state.registers[LAST]);
    }

    #[test]
    /// drawing the same sprite twice restores the display
    fn test_draw_twice() {
        let mut chip = setup(10, 12, 0);
        let before = chip.display.clone();

        assert!(run_opcode(&mut chip, 0xD015).is_ok());
        assert_eq!(0, chip.state.registers[LAST]);
        assert!(run_opcode(&mut chip, 0xD015).is_ok());
        assert_eq!(1, chip.state.registers[LAST]);
        assert_eq!(before, chip.display);
    }

    #[test]
    /// a single collision keeps `VF` set for the rest of the sprite
    fn test_collision_is_sticky() {
        let mut chip = setup(0, 0, 0);
        // only the first row of the glyph
        assert!(run_opcode(&mut chip, 0xD011).is_ok());
        assert_eq!(0, chip.state.registers[LAST]);

        assert!(run_opcode(&mut chip, 0xD015).is_ok());
        assert_eq!(1, chip.state.registers[LAST]);
        row_is(&chip, 0, 0, 0x00);
        row_is(&chip, 4, 0, 0xF0);
    }

    #[test]
    /// sprites are clipped at the right and the bottom edge
    fn test_draw_clipped() {
        let mut chip = setup(
            (display::WIDTH - 2) as u8,
            (display::HEIGHT - 2) as u8,
            0,
        );
        assert!(run_opcode(&mut chip, 0xD015).is_ok());

        assert!(chip.display.get(30, 62));
        assert!(chip.display.get(30, 63));
        assert!(chip.display.get(31, 62));
        assert!(!chip.display.get(31, 63));
        // nothing wrapped around
        assert_eq!(3, chip.display.lit());
    }

    #[test]
    /// the start position wraps around the display once
    fn test_draw_start_wraps() {
        let mut chip = setup(
            (display::WIDTH + 2) as u8,
            (display::HEIGHT + 1) as u8,
            0,
        );
        assert!(run_opcode(&mut chip, 0xD011).is_ok());
        row_is(&chip, 1, 2, 0xF0);
        assert_eq!(4, chip.display.lit());
    }

    #[test]
    fn test_draw_reads_past_memory() {
        let mut chip = setup(0, 0, (memory::SIZE - 2) as u16);
        assert_eq!(
            Err(CoreError::MemoryFault {
                pointer: memory::SIZE,
                len: memory::SIZE
            }),
            run_opcode(&mut chip, 0xD013)
        );
    }
}

mod e {
    use super::*;

    #[test]
    /// `EX9E` and `EXA1`
    fn test_skip_on_key() {
        let data = [
            (0x9E, true, true),
            (0x9E, false, false),
            (0xA1, true, false),
            (0xA1, false, true),
        ];
        for (nn, pressed, skip) in data {
            let mut chip = get_default_chip();
            chip.state.registers[0x2] = 0x5;
            chip.set_key(0x5, pressed);
            assert!(run_opcode(&mut chip, xnn(0xE, 0x2, nn)).is_ok());
            let steps = if skip { 2 } else { 1 };
            assert_eq!(
                cpu::PROGRAM_COUNTER + steps * memory::opcodes::SIZE,
                pc(&chip)
            );
        }
    }

    #[test]
    /// a register holding something other than a key reads as released
    fn test_skip_on_invalid_key() {
        for (nn, steps) in [(0x9E, 1), (0xA1, 2)] {
            let mut chip = get_default_chip();
            chip.set_keyboard(&[true; 16]);
            chip.state.registers[0x2] = 0x20;
            assert!(run_opcode(&mut chip, xnn(0xE, 0x2, nn)).is_ok());
            assert_eq!(
                cpu::PROGRAM_COUNTER + steps * memory::opcodes::SIZE,
                pc(&chip)
            );
        }
    }
}

mod f {
    use super::*;

    const LAST: usize = cpu::register::LAST;

    #[test]
    /// `FX07`, `FX15` and `FX18`
    fn test_timers() {
        let mut chip = get_default_chip();
        chip.state.registers[0x1] = 0x20;
        assert!(run_opcode(&mut chip, 0xF115).is_ok());
        assert!(run_opcode(&mut chip, 0xF118).is_ok());
        assert_eq!(0x20, chip.state.get_delay_timer());
        assert_eq!(0x20, chip.state.get_sound_timer());

        for _ in 0..5 {
            chip.tick_timers();
        }
        assert!(run_opcode(&mut chip, 0xF207).is_ok());
        assert_eq!(0x1B, chip.state.registers[0x2]);
    }

    #[test]
    /// `FX0A` with a key already pressed
    fn test_await_key_pressed() {
        let mut chip = get_default_chip();
        chip.set_key(0xC, true);
        chip.set_key(0xE, true);
        assert_eq!(Ok(Operation::None), run_opcode(&mut chip, 0xF30A));
        assert_eq!(0xC, chip.state.registers[0x3]);
        assert_eq!(None, chip.state.awaiting_key());
    }

    #[test]
    /// `FX0A` waits across cycles until a key shows up
    fn test_await_key_polling() {
        let mut chip = setup_chip(&[0xF50A, 0x6101]);
        chip.state.registers[0x5] = 0xAA;
        chip.state.delay_timer.set_value(10);

        assert_eq!(Ok(Operation::Wait), chip.next());
        assert_eq!(Some(0x5), chip.state.awaiting_key());

        for _ in 0..10 {
            assert_eq!(Ok(Operation::Wait), chip.next());
            chip.tick_timers();
            assert_eq!(0x202, pc(&chip));
            assert_eq!(0xAA, chip.state.registers[0x5]);
        }
        // the timers kept running
        assert_eq!(0, chip.state.get_delay_timer());

        chip.set_key(0x5, true);
        assert_eq!(Ok(Operation::None), chip.next());
        assert_eq!(0x5, chip.state.registers[0x5]);
        assert_eq!(None, chip.state.awaiting_key());
        assert_eq!(0x202, pc(&chip));

        // execution continues normally
        chip.next().expect("6101 runs");
        assert_eq!(0x1, chip.state.registers[0x1]);
        assert_eq!(0x204, pc(&chip));
    }

    #[test]
    /// `FX1E`, `VF` reports the sum leaving the byte range
    fn test_add_to_index() {
        for (index, value, result, flag) in [
            (0x010, 0x20, 0x030, 0),
            (0x0F0, 0x20, 0x110, 1),
            (0x0DF, 0x20, 0x0FF, 0),
            (0xFFF, 0x01, 0x1000, 1),
        ] {
            let mut chip = get_default_chip();
            chip.state.index_register = index;
            chip.state.registers[0x1] = value;
            assert!(run_opcode(&mut chip, 0xF11E).is_ok());
            assert_eq!(result, chip.state.index_register);
            assert_eq!(flag, chip.state.registers[LAST]);
        }
    }

    #[test]
    /// `FX29`
    fn test_sprite_location() {
        for value in 0..0x10u8 {
            let mut chip = get_default_chip();
            chip.state.registers[0x1] = value;
            assert!(run_opcode(&mut chip, 0xF129).is_ok());
            assert_eq!(value as u16 * 5, chip.state.index_register);
        }
    }

    #[test]
    /// `FX33`
    fn test_bcd() {
        for (value, digits) in [(246, [2, 4, 6]), (7, [0, 0, 7]), (100, [1, 0, 0])] {
            let mut chip = get_default_chip();
            chip.state.index_register = 0x300;
            chip.state.registers[0x1] = value;
            assert!(run_opcode(&mut chip, 0xF133).is_ok());
            assert_eq!(Ok(&digits[..]), chip.memory.read_slice(0x300, 3));
            assert_eq!(0x300, chip.state.index_register);
        }
    }

    #[test]
    fn test_bcd_out_of_memory() {
        let mut chip = get_default_chip();
        chip.state.index_register = (memory::SIZE - 1) as u16;
        assert!(matches!(
            run_opcode(&mut chip, 0xF133),
            Err(CoreError::MemoryFault { .. })
        ));
    }

    #[test]
    /// `FX55` then clearing the registers then `FX65`
    fn test_store_and_fill_round_trip() {
        let mut chip = get_default_chip();
        let x = 0x5;
        let registers = chip.state.registers;
        chip.state.index_register = 0x300;

        assert!(run_opcode(&mut chip, xnn(0xF, x, 0x55)).is_ok());
        assert_eq!(Ok(&registers[..=x]), chip.memory.read_slice(0x300, x + 1));
        assert_eq!(Ok(0), chip.memory.read(0x300 + x + 1));

        chip.state.registers[..=x].fill(0);
        assert!(run_opcode(&mut chip, xnn(0xF, x, 0x65)).is_ok());

        assert_eq!(registers, chip.state.registers);
        assert_eq!(0x300, chip.state.index_register);
    }

    #[test]
    /// `FX55` and `FX65` move `I` with the quirk
    fn test_store_and_fill_increment() {
        let mut chip = setup_chip_with(&[], Quirks::cosmac());
        chip.state.index_register = 0x300;
        assert!(run_opcode(&mut chip, 0xF355).is_ok());
        assert_eq!(0x304, chip.state.index_register);
        assert!(run_opcode(&mut chip, 0xF065).is_ok());
        assert_eq!(0x305, chip.state.index_register);
    }

    #[test]
    fn test_store_out_of_memory() {
        let mut chip = get_default_chip();
        chip.state.index_register = (memory::SIZE - 2) as u16;
        let before = chip.memory.clone();
        assert_eq!(
            Err(CoreError::MemoryFault {
                pointer: memory::SIZE,
                len: memory::SIZE
            }),
            run_opcode(&mut chip, 0xF255)
        );
        // the opcode itself was written, nothing else changed
        let mut expected = before;
        write_opcode_to_memory(&mut expected, cpu::PROGRAM_COUNTER, 0xF255);
        assert_eq!(expected, chip.memory);
    }
}
