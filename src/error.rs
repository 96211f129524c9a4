use thiserror::Error;

/// The fatal conditions a single cycle can run into. None of them can be
/// retried on the cycle level, the driving loop is expected to halt.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum CoreError {
    #[error("Fetched an all zero instruction at {pointer:#06X}.")]
    FetchFault { pointer: usize },
    #[error("Memory access at {pointer:#06X} is outside of the {len} byte address space.")]
    MemoryFault { pointer: usize, len: usize },
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Overflow,
    #[error("Stack is empty!")]
    Underflow,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(u16),
}

/// Everything that can go wrong while getting a rom into memory.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unable to read the rom '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to read the rom archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}
