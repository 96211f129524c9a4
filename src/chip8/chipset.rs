use std::fmt;

use {
    crate::{
        definitions::cpu,
        devices::Keyboard,
        display::DisplayBuffer,
        memory::Memory,
        opcode::Operation,
        quirks::Quirks,
        resources::Rom,
        timer::Timer,
        CoreError, StackError,
    },
    rand::{rngs::StdRng, RngCore, SeedableRng},
    tinyvec::ArrayVec,
};

/// The register and timer state of the processor. Memory and the display
/// buffer live next to it, so that every cycle can borrow all three
/// independently.
pub struct CpuState {
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions. In an addition operation, `VF` is the carry flag, while in subtraction, it
    /// is the "no borrow" flag. In the draw instruction `VF` is set upon pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; here we are using `16`.
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer<u16>,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub(super) sound_timer: Timer<u16>,
    pub(super) keyboard: Keyboard,
    /// The register an `FX0A` is waiting to fill.
    pub(super) awaiting_key: Option<usize>,
    pub(super) quirks: Quirks,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl CpuState {
    /// Zeroed registers, the program counter at `0x200` and an entropy
    /// seeded random number generator.
    pub fn new(quirks: Quirks) -> Self {
        Self::with_rng(quirks, Box::new(StdRng::from_entropy()))
    }

    /// Same as [`new`](CpuState::new), with a reproducible random sequence.
    pub fn with_seed(quirks: Quirks, seed: u64) -> Self {
        Self::with_rng(quirks, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_rng(quirks: Quirks, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER as u16,
            stack: ArrayVec::new(),
            delay_timer: Timer::new(0),
            sound_timer: Timer::new(0),
            keyboard: Keyboard::new(),
            awaiting_key: None,
            quirks,
            rng,
        }
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            None => {
                log::debug!("push {:#06X} (depth {})", pointer, self.stack.len());
                Ok(())
            }
            Some(_) => Err(StackError::Overflow),
        }
    }

    /// Will pop the last return address from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        let pointer = self.stack.pop().ok_or(StackError::Underflow)?;
        log::debug!("pop {:#06X} (depth {})", pointer, self.stack.len());
        Ok(pointer)
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut [u8] {
        &mut self.registers
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn set_index_register(&mut self, index: u16) {
        self.index_register = index;
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, pointer: u16) {
        self.program_counter = pointer;
    }

    /// The return addresses, the last entry is the top of the stack.
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u16 {
        self.delay_timer.get_value()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u16 {
        self.sound_timer.get_value()
    }

    /// Will write keyboard data into internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool]) {
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// The register a pending `FX0A` will store the next key press in.
    pub fn awaiting_key(&self) -> Option<usize> {
        self.awaiting_key
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new(Quirks::default())
    }
}

impl fmt::Debug for CpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuState")
            .field("registers", &self.registers)
            .field("index_register", &self.index_register)
            .field("program_counter", &self.program_counter)
            .field("stack", &self.stack)
            .field("delay_timer", &self.delay_timer)
            .field("sound_timer", &self.sound_timer)
            .field("keyboard", &self.keyboard)
            .field("awaiting_key", &self.awaiting_key)
            .field("quirks", &self.quirks)
            .finish_non_exhaustive()
    }
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
#[derive(Debug)]
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    pub(super) state: CpuState,
    /// - `0x000-0x04F` - The built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Memory,
    pub(super) display: DisplayBuffer,
}

impl ChipSet {
    /// will create a new chipset object with the default quirks
    pub fn new(rom: Rom) -> Self {
        Self::with_state(rom, CpuState::default())
    }

    pub fn with_quirks(rom: Rom, quirks: Quirks) -> Self {
        Self::with_state(rom, CpuState::new(quirks))
    }

    /// Creates a chipset whose `CXNN` results are reproducible.
    pub fn with_seed(rom: Rom, quirks: Quirks, seed: u64) -> Self {
        Self::with_state(rom, CpuState::with_seed(quirks, seed))
    }

    /// Loads the rom into fresh memory next to the given state.
    pub fn with_state(rom: Rom, state: CpuState) -> Self {
        let mut memory = Memory::new();
        let loaded = memory.load_program(rom.get_data());
        log::info!("Loaded '{}' ({} bytes).", rom.get_name(), loaded);

        Self {
            name: rom.get_name().to_string(),
            state,
            memory,
            display: DisplayBuffer::new(),
        }
    }

    /// will advance the program by a single step
    pub fn next(&mut self) -> Result<Operation, CoreError> {
        super::step(&mut self.state, &mut self.memory, &mut self.display)
    }

    /// Counts both timers down, once per rendered frame.
    pub fn tick_timers(&mut self) {
        super::tick_timers(&mut self.state)
    }

    /// Will write keyboard data into internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool]) {
        self.state.set_keyboard(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.state.set_key(key, to)
    }

    /// Will return a immutable slice of the current display configuration
    pub fn get_display(&self) -> &[Vec<bool>] {
        self.display.pixels()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }
}
