//! Decoding of the two byte instructions into typed opcodes, plus the
//! trait an interpreter implements to run them.
use std::convert::{TryFrom, TryInto};

use crate::{CoreError, OpcodeError};

pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// everything but the low nibble
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the high byte
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the group nibble
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the low nibble, `N`
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the low byte, `NN`
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the address part, `NNN`
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

const BITS_PER_BYTE: u16 = 0x8;
const BITS_PER_NIBBLE: u16 = BITS_PER_BYTE / 2;

/// A raw, undecoded instruction.
pub type Opcode = u16;

/// Reads the big endian instruction stored at `pointer` and `pointer + 1`.
///
/// The error names the first byte that lies outside of `data`.
///
/// # Example
/// ```rust
/// # use emu8::opcode::*;
/// # use emu8::CoreError;
/// let bytes = [0x00, 0xEE, 0x1E, 0xDA];
/// assert_eq!(Ok(0x00EE), build_opcode(&bytes, 0));
/// assert_eq!(Ok(0x1EDA), build_opcode(&bytes, 2));
/// assert_eq!(
///     Err(CoreError::MemoryFault { pointer: 4, len: 4 }),
///     build_opcode(&bytes, 3)
/// );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, CoreError> {
    match (data.get(pointer), data.get(pointer + 1)) {
        (Some(&high), Some(&low)) => Ok(Opcode::from_be_bytes([high, low])),
        (None, _) => Err(CoreError::MemoryFault {
            pointer,
            len: data.len(),
        }),
        (Some(_), None) => Err(CoreError::MemoryFault {
            pointer: pointer + 1,
            len: data.len(),
        }),
    }
}

/// Field extraction on a raw instruction. Letters follow the usual
/// notation: `T` group, `X`/`Y` register indices, `N`, `NN` and `NNN`
/// immediates of one, two and three nibbles.
pub trait OpcodeTrait {
    /// `T___`
    fn t(&self) -> usize;

    /// `_NNN`, always an address
    fn nnn(&self) -> u16;

    /// `_XNN`
    fn xnn(&self) -> (usize, u8);

    /// `_XYN`, the `N` doubles as sub opcode for groups 8
    fn xyn(&self) -> (usize, usize, usize);

    /// `_XY_`
    fn xy(&self) -> (usize, usize);

    /// `_X__`
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// ```rust
    /// # use emu8::opcode::*;
    /// assert_eq!(0xD, 0xD12Fu16.t());
    /// ```
    fn t(&self) -> usize {
        ((self & OPCODE_MASK_F000) >> (BITS_PER_BYTE + BITS_PER_NIBBLE)) as usize
    }

    /// ```rust
    /// # use emu8::opcode::*;
    /// assert_eq!(0x12F, 0xD12Fu16.nnn());
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// ```rust
    /// # use emu8::opcode::*;
    /// assert_eq!((0x1, 0x2F), 0xD12Fu16.xnn());
    /// ```
    fn xnn(&self) -> (usize, u8) {
        (self.x(), (self & OPCODE_MASK_00FF) as u8)
    }

    /// ```rust
    /// # use emu8::opcode::*;
    /// assert_eq!((0x1, 0x2, 0xF), 0xD12Fu16.xyn());
    /// ```
    fn xyn(&self) -> (usize, usize, usize) {
        let (x, y) = self.xy();
        (x, y, (self & OPCODE_MASK_000F) as usize)
    }

    /// ```rust
    /// # use emu8::opcode::*;
    /// assert_eq!((0x1, 0x2), 0xD12Fu16.xy());
    /// ```
    fn xy(&self) -> (usize, usize) {
        const Y_MASK: u16 = OPCODE_MASK_00FF & OPCODE_MASK_FFF0;
        (self.x(), ((self & Y_MASK) >> BITS_PER_NIBBLE) as usize)
    }

    /// ```rust
    /// # use emu8::opcode::*;
    /// assert_eq!(0x1, 0xD12Fu16.x());
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BITS_PER_BYTE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip can take after an opcode was
/// executed. The fetch has already moved the counter past the opcode.
pub enum ProgramCounterStep {
    /// Continue with the following opcode
    Next,
    /// Skip the following opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use emu8::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Maps the step onto the program counter it is applied to.
    ///
    /// # Example
    /// ```rust
    /// # use emu8::opcode::ProgramCounterStep;
    /// assert_eq!(0x202, ProgramCounterStep::Next.apply(0x202));
    /// assert_eq!(0x204, ProgramCounterStep::Skip.apply(0x202));
    /// assert_eq!(0x400, ProgramCounterStep::Jump(0x400).apply(0x202));
    /// ```
    #[inline]
    pub fn apply(&self, pc: u16) -> u16 {
        match *self {
            ProgramCounterStep::Next => pc,
            ProgramCounterStep::Skip => pc.wrapping_add(crate::definitions::memory::opcodes::SIZE as u16),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Conversion target for the decoding macros, keeps the `TryFrom` impls
/// off the public opcode types.
#[repr(transparent)]
struct TryIntoHandler<T>(T);

#[inline]
fn err<T>(value: Opcode) -> Result<T, OpcodeError> {
    Err(OpcodeError::InvalidOpcode(value))
}

#[inline]
fn try_into<To, From>(val: From, value: Opcode) -> Result<To, OpcodeError>
where
    From: TryInto<TryIntoHandler<To>>,
{
    let inner: TryIntoHandler<To> = val.try_into().or_else(|_| err(value))?;
    Ok(inner.0)
}

/// Wires a decoding closure into `TryFrom<$type_from>`.
macro_rules! implTryIntoInner {
    ( $type_name:ty : $type_from:ty : $inner:expr) => {
        impl TryFrom<$type_from> for TryIntoHandler<$type_name> {
            type Error = ();

            fn try_from(value: $type_from) -> Result<Self, Self::Error> {
                let inner: Result<$type_name, ()> = ($inner)(value);
                Ok(Self(inner?))
            }
        }
    };
}

macro_rules! implTryIntoEnum {
    ($type_name:ty : $type_from:ty : $( $key:literal => $val:expr ),+ $(,)? ) => {
        implTryIntoInner!(
            $type_name : $type_from :
            |value: $type_from| {
                match value {
                    $(
                        $key => Ok($val),
                    )+
                    _ => Err(()),
                }
            }
        );
    };
}

macro_rules! implTryIntoXNN {
    ($type_name:ident) => {
        implTryIntoInner!(
            $type_name : Opcode :
            |value: Opcode| {
                let (x, nn) = value.xnn();
                Ok($type_name { x, nn })
            }
        );
    };
}

macro_rules! implTryIntoNNN {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let nnn = value.nnn();
                Ok($type_name { nnn })
            }
        }
    };
}

/// the low nibble is not consulted, `5XY1` runs as `5XY0`
macro_rules! implTryIntoXY {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let (x, y) = value.xy();
                Ok($type_name { x, y })
            }
        }
    };
}

macro_rules! implTryIntoXNNE {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let (x, nn) = value.xnn();
                let ops = try_into(nn, value).map_err(|_| ())?;
                Ok($type_name { ops, x })
            }
        }
    };
}

macro_rules! implTryIntoXYN {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let (x, y, n) = value.xyn();
                Ok($type_name { x, y, n })
            }
        }
    };
}

macro_rules! implTryIntoXYNE {
    ($type_name:ident) => {
        implTryIntoInner! {
            $type_name: Opcode :
            |value: Opcode| {
                let (x, y, n) = value.xyn();
                let ops = try_into(n, value).map_err(|_| ())?;
                Ok($type_name { ops, x, y })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    /// Clears the display
    Clear,
    /// Returns from the subroutine
    Return,
}

// only the low byte is matched, `01E0` clears the screen as well
implTryIntoEnum!(System : u8 :
    // 00E0
    0xE0 => System::Clear,
    // 00EE
    0xEE => System::Return,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub nnn: u16,
}

implTryIntoNNN!(Jump);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub nnn: u16,
}

implTryIntoNNN!(Call);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipEqualConst {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(SkipEqualConst);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipNotEqualConst {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(SkipNotEqualConst);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipEqualRegister {
    pub x: usize,
    pub y: usize,
}

implTryIntoXY!(SkipEqualRegister);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetConst {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(SetConst);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddConst {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(AddConst);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOpcode {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

implTryIntoEnum!(ArithmeticOpcode : usize :
    // 8XY0
    0x0 => ArithmeticOpcode::Assign,
    // 8XY1
    0x1 => ArithmeticOpcode::Or,
    // 8XY2
    0x2 => ArithmeticOpcode::And,
    // 8XY3
    0x3 => ArithmeticOpcode::Xor,
    // 8XY4
    0x4 => ArithmeticOpcode::Add,
    // 8XY5
    0x5 => ArithmeticOpcode::Sub,
    // 8XY6
    0x6 => ArithmeticOpcode::ShiftRight,
    // 8XY7
    0x7 => ArithmeticOpcode::SubReverse,
    // 8XYE
    0xE => ArithmeticOpcode::ShiftLeft,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arithmetic {
    pub ops: ArithmeticOpcode,
    pub x: usize,
    pub y: usize,
}

implTryIntoXYNE!(Arithmetic);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipNotEqualRegister {
    pub x: usize,
    pub y: usize,
}

implTryIntoXY!(SkipNotEqualRegister);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetIndex {
    pub nnn: u16,
}

implTryIntoNNN!(SetIndex);

/// `BNNN` keeps the `x` nibble around for the jump with `VX` quirk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpOffset {
    pub x: usize,
    pub nnn: u16,
}

implTryIntoInner! {
    JumpOffset: Opcode :
    |value: Opcode| {
        Ok(JumpOffset { x: value.x(), nnn: value.nnn() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Random {
    pub x: usize,
    pub nn: u8,
}

implTryIntoXNN!(Random);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub x: usize,
    pub y: usize,
    pub n: usize,
}

implTryIntoXYN!(Draw);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOpcode {
    Pressed,
    NotPressed,
}

implTryIntoEnum!(KeyOpcode : u8 :
    // EX9E
    0x9E => KeyOpcode::Pressed,
    // EXA1
    0xA1 => KeyOpcode::NotPressed,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub ops: KeyOpcode,
    pub x: usize,
}

implTryIntoXNNE!(Key);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOpcode {
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddVxToI,
    SetIToSprite,
    StoreBCD,
    StoreV0ToVx,
    FillV0ToVx,
}

implTryIntoEnum!(MiscOpcode : u8 :
    // FX07
    0x07 => MiscOpcode::GetDelayTimer,
    // FX0A
    0x0A => MiscOpcode::AwaitKeyPress,
    // FX15
    0x15 => MiscOpcode::SetDelayTimer,
    // FX18
    0x18 => MiscOpcode::SetSoundTimer,
    // FX1E
    0x1E => MiscOpcode::AddVxToI,
    // FX29
    0x29 => MiscOpcode::SetIToSprite,
    // FX33
    0x33 => MiscOpcode::StoreBCD,
    // FX55
    0x55 => MiscOpcode::StoreV0ToVx,
    // FX65
    0x65 => MiscOpcode::FillV0ToVx,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misc {
    pub ops: MiscOpcode,
    pub x: usize,
}

implTryIntoXNNE!(Misc);

/// A fully decoded opcode, one variant per opcode group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcodes {
    Zero(System),
    One(Jump),
    Two(Call),
    Three(SkipEqualConst),
    Four(SkipNotEqualConst),
    Five(SkipEqualRegister),
    Six(SetConst),
    Seven(AddConst),
    Eight(Arithmetic),
    Nine(SkipNotEqualRegister),
    A(SetIndex),
    B(JumpOffset),
    C(Random),
    D(Draw),
    E(Key),
    F(Misc),
}

impl TryFrom<Opcode> for Opcodes {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let res = match value.t() {
            0x0 => Opcodes::Zero(try_into(value.xnn().1, value)?),
            0x1 => Opcodes::One(try_into(value, value)?),
            0x2 => Opcodes::Two(try_into(value, value)?),
            0x3 => Opcodes::Three(try_into(value, value)?),
            0x4 => Opcodes::Four(try_into(value, value)?),
            0x5 => Opcodes::Five(try_into(value, value)?),
            0x6 => Opcodes::Six(try_into(value, value)?),
            0x7 => Opcodes::Seven(try_into(value, value)?),
            0x8 => Opcodes::Eight(try_into(value, value)?),
            0x9 => Opcodes::Nine(try_into(value, value)?),
            0xA => Opcodes::A(try_into(value, value)?),
            0xB => Opcodes::B(try_into(value, value)?),
            0xC => Opcodes::C(try_into(value, value)?),
            0xD => Opcodes::D(try_into(value, value)?),
            0xE => Opcodes::E(try_into(value, value)?),
            0xF => Opcodes::F(try_into(value, value)?),
            _ => return err(value),
        };
        Ok(res)
    }
}

/// Anything owning a program counter the decoded steps can be applied to.
pub trait ProgramCounter {
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// What the frame loop has to react to after a cycle.
pub enum Operation {
    None,
    /// `FX0A` is blocking until a key goes down
    Wait,
    /// The display buffer changed
    Draw,
    /// The display buffer went blank
    Clear,
}

/// The instruction set, one handler per opcode group. Handlers report how
/// the program counter moves on, [`calc`](ChipOpcodes::calc) applies it.
///
/// `VF` is always written after the result register, so `X = F` ends with
/// the flag.
pub trait ChipOpcodes: ProgramCounter {
    /// Dispatches a decoded opcode and applies the resulting step.
    fn calc(&mut self, opcode: &Opcodes) -> Result<Operation, CoreError> {
        let mut operation = Operation::None;
        let step_op = |(step, op)| {
            operation = op;
            step
        };

        let step = match opcode {
            Opcodes::Zero(opcode) => self.zero(opcode).map(step_op),
            Opcodes::One(opcode) => self.one(opcode),
            Opcodes::Two(opcode) => self.two(opcode),
            Opcodes::Three(opcode) => self.three(opcode),
            Opcodes::Four(opcode) => self.four(opcode),
            Opcodes::Five(opcode) => self.five(opcode),
            Opcodes::Six(opcode) => self.six(opcode),
            Opcodes::Seven(opcode) => self.seven(opcode),
            Opcodes::Eight(opcode) => self.eight(opcode),
            Opcodes::Nine(opcode) => self.nine(opcode),
            Opcodes::A(opcode) => self.a(opcode),
            Opcodes::B(opcode) => self.b(opcode),
            Opcodes::C(opcode) => self.c(opcode),
            Opcodes::D(opcode) => self.d(opcode).map(step_op),
            Opcodes::E(opcode) => self.e(opcode),
            Opcodes::F(opcode) => self.f(opcode).map(step_op),
        }?;

        self.step(step);
        Ok(operation)
    }

    /// `00E0` clears the screen, `00EE` pops the return address.
    fn zero(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), CoreError>;

    /// `1NNN`: `PC = NNN`
    fn one(&self, opcode: &Jump) -> Result<ProgramCounterStep, CoreError>;

    /// `2NNN`: push `PC`, then `PC = NNN`
    fn two(&mut self, opcode: &Call) -> Result<ProgramCounterStep, CoreError>;

    /// `3XNN`: skip when `VX == NN`
    fn three(&self, opcode: &SkipEqualConst) -> Result<ProgramCounterStep, CoreError>;

    /// `4XNN`: skip when `VX != NN`
    fn four(&self, opcode: &SkipNotEqualConst) -> Result<ProgramCounterStep, CoreError>;

    /// `5XY_`: skip when `VX == VY`
    fn five(&self, opcode: &SkipEqualRegister) -> Result<ProgramCounterStep, CoreError>;

    /// `6XNN`: `VX = NN`
    fn six(&mut self, opcode: &SetConst) -> Result<ProgramCounterStep, CoreError>;

    /// `7XNN`: `VX += NN`, wrapping, `VF` untouched
    fn seven(&mut self, opcode: &AddConst) -> Result<ProgramCounterStep, CoreError>;

    /// Register arithmetic, `8XYT`.
    ///
    /// | T | effect | VF |
    /// |---|--------|----|
    /// | 0 | `VX = VY` | |
    /// | 1 | `VX \|= VY` | |
    /// | 2 | `VX &= VY` | |
    /// | 3 | `VX ^= VY` | |
    /// | 4 | `VX += VY` | carry |
    /// | 5 | `VX -= VY` | `VX >= VY` |
    /// | 6 | `VX >>= 1` | bit shifted out |
    /// | 7 | `VX = VY - VX` | `VX <= VY` |
    /// | E | `VX <<= 1` | bit shifted out |
    ///
    /// The shifts read `VY` instead of `VX` unless the legacy shift quirk is
    /// set.
    fn eight(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, CoreError>;

    /// `9XY_`: skip when `VX != VY`
    fn nine(&self, opcode: &SkipNotEqualRegister) -> Result<ProgramCounterStep, CoreError>;

    /// `ANNN`: `I = NNN`
    fn a(&mut self, opcode: &SetIndex) -> Result<ProgramCounterStep, CoreError>;

    /// `BNNN`: `PC = NNN + V0`, or `VX` with the matching quirk
    fn b(&self, opcode: &JumpOffset) -> Result<ProgramCounterStep, CoreError>;

    /// `CXNN`: `VX = random & NN`
    fn c(&mut self, opcode: &Random) -> Result<ProgramCounterStep, CoreError>;

    /// `DXYN`: xors the `N` byte sprite at `I` onto the screen at
    /// `(VX, VY)`. `VF` tells whether a lit pixel went dark.
    fn d(&mut self, opcode: &Draw) -> Result<(ProgramCounterStep, Operation), CoreError>;

    /// `EX9E` skips when the key `VX` is down, `EXA1` when it is up.
    fn e(&self, opcode: &Key) -> Result<ProgramCounterStep, CoreError>;

    /// Timers, input and memory, `FXTT`.
    ///
    /// - `07`: `VX = delay`
    /// - `0A`: block until a key is pressed, store it in `VX`
    /// - `15`: `delay = VX`
    /// - `18`: `sound = VX`
    /// - `1E`: `I += VX`, `VF` set when the sum passes `0xFF`
    /// - `29`: `I = VX * 5`, the font glyph of `VX`
    /// - `33`: decimal digits of `VX` to `I..I + 3`
    /// - `55`: `V0..=VX` to memory at `I`
    /// - `65`: memory at `I` to `V0..=VX`
    fn f(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), CoreError>;
}
