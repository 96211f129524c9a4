//! The flat byte addressable ram of the chip.
use crate::{
    definitions::{cpu, display::fontset, memory},
    opcode::{self, Opcode},
    CoreError,
};

/// - `0x000-0x04F` - The built in `4x5` pixel font set (`0-F`)
/// - `0x050-0x1FF` - Unused interpreter space
/// - `0x200-0xFFF` - Program ROM and work RAM
///
/// Every access is bounds checked, touching an address past `0xFFF` results
/// in a [`CoreError::MemoryFault`].
#[derive(Clone, PartialEq)]
pub struct Memory {
    data: Box<[u8; memory::SIZE]>,
}

impl Memory {
    /// Creates zeroed memory with the font set loaded.
    pub fn new() -> Self {
        let mut data = Box::new([0; memory::SIZE]);
        data[fontset::LOCATION..(fontset::LOCATION + fontset::FONTSET.len())]
            .copy_from_slice(&fontset::FONTSET);
        Self { data }
    }

    #[inline]
    fn fault(&self, pointer: usize) -> CoreError {
        CoreError::MemoryFault {
            pointer,
            len: self.data.len(),
        }
    }

    /// Reads a single byte.
    ///
    /// # Example
    /// ```rust
    /// # use emu8::memory::Memory;
    /// let mem = Memory::new();
    /// // first row of the `0` glyph
    /// assert_eq!(Ok(0xF0), mem.read(0x000));
    /// assert!(mem.read(0x1000).is_err());
    /// ```
    pub fn read(&self, pointer: usize) -> Result<u8, CoreError> {
        self.data
            .get(pointer)
            .copied()
            .ok_or_else(|| self.fault(pointer))
    }

    /// Writes a single byte.
    pub fn write(&mut self, pointer: usize, value: u8) -> Result<(), CoreError> {
        match self.data.get_mut(pointer) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(self.fault(pointer)),
        }
    }

    /// Reads `len` bytes starting at `pointer`.
    pub fn read_slice(&self, pointer: usize, len: usize) -> Result<&[u8], CoreError> {
        let end = pointer + len;
        if end > self.data.len() {
            // report the first address that is out of bounds
            return Err(self.fault(pointer.max(self.data.len())));
        }
        Ok(&self.data[pointer..end])
    }

    /// Writes all of `data` starting at `pointer`, nothing is written if the
    /// data doesn't fit.
    pub fn write_slice(&mut self, pointer: usize, data: &[u8]) -> Result<(), CoreError> {
        let end = pointer + data.len();
        if end > self.data.len() {
            return Err(self.fault(pointer.max(self.data.len())));
        }
        self.data[pointer..end].copy_from_slice(data);
        Ok(())
    }

    /// Will fetch the big endian opcode at `pointer` and `pointer + 1`.
    pub fn opcode(&self, pointer: usize) -> Result<Opcode, CoreError> {
        opcode::build_opcode(&self.data[..], pointer)
    }

    /// Will write the rom data into the program space, everything that doesn't
    /// fit is dropped. Returns the amount of bytes written.
    pub fn load_program(&mut self, rom: &[u8]) -> usize {
        let len = rom.len().min(cpu::PROGRAM_SIZE);
        if len < rom.len() {
            log::warn!(
                "Rom is {} bytes large, truncating it to {} bytes.",
                rom.len(),
                len
            );
        }
        self.data[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + len)].copy_from_slice(&rom[..len]);
        len
    }

    /// Will return the raw memory.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}
