//! The pretty print implementation of the [`ChipSet`](super::ChipSet).
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::*;
use crate::definitions::cpu;
use once_cell::sync::Lazy;
use std::fmt;

/// The amount of entries per printed row, for memory these are opcodes
/// (two bytes each).
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

const PIXEL_LIT: char = '#';
const PIXEL_UNLIT: char = '.';

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// Drops the trailing line break.
fn trim_last_line(text: &mut String) {
    if let Some(index) = text.rfind(END_OF_LINE) {
        text.truncate(index);
    }
}

macro_rules! intformat {
    () => {
        // The formatted string will be 2 symbols for the prefix (0x)
        // and 4 for the rest long.
        "{:#06X}"
    };
}

static INTEGER_LEN: Lazy<usize> = Lazy::new(|| format!(intformat!(), 0u8).len());

static POINTER_LEN: Lazy<usize> = Lazy::new(|| {
    let mut line = String::new();
    // writing into a string can't fail
    let _ = pointer_print::formatter(&mut line, 0, 0);
    line.len()
});

/// a line length (This is a bit bigger then the actual line will be)
static LENLINE: Lazy<usize> =
    Lazy::new(|| INDENT_SIZE + HEX_PRINT_STEP * (*INTEGER_LEN + 1) + 1 + *POINTER_LEN);

/// Handles all the printing of the pointer values.
mod pointer_print {
    use std::fmt::{self, Write};

    /// will format the pointers according to definition
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> fmt::Result {
        write!(
            line,
            concat!(intformat!(), " - ", intformat!(), " :"),
            from, to
        )
    }
}

/// Handles all the opcode prints
mod opcode_print {
    use super::{integer_print, pointer_print, Lazy, HEX_PRINT_STEP};
    use crate::{definitions::memory, opcode::Opcode};
    use std::fmt::{self, Write};

    /// The internal length of the given data
    /// as the data is stored as u8 and an opcode
    /// is u16 long
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;
    /// The values that are used when there are at least two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// Prepares the line that will be used for rows of only zeros.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let mut formatted = String::new();
        let _ = integer_print::formatter(&mut formatted, 0u16);
        let length =
            formatted.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1) - FILLER_BASE.len();
        let filler = " ".repeat(length / 2);

        format!(
            "{}{}{}{}{}",
            formatted, filler, FILLER_BASE, filler, formatted
        )
    });

    /// this struct will simulate a single row of opcodes (only in this context)
    struct Row {
        from: usize,
        to: usize,
        data: [Opcode; HEX_PRINT_STEP],
        only_null: bool,
    }

    /// using the fmt::Display` for simple printing of the data later on
    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::with_capacity(*super::LENLINE);
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');

            if self.only_null {
                res.push_str(&ZERO_FILLER);
            } else {
                let entries: Vec<String> = self
                    .data
                    .iter()
                    .map(|entry| format!(intformat!(), entry))
                    .collect();
                res.push_str(&entries.join(" "));
            }
            write!(f, "{}", res)
        }
    }

    /// will pretty print the content of the raw memory, consecutive rows of
    /// zeros are folded into a single one
    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / POINTER_INCREMENT);

        for (index, chunk) in memory.chunks(POINTER_INCREMENT).enumerate() {
            let from = index * POINTER_INCREMENT;
            let to = from + chunk.len() - 1;

            let mut data = [0; HEX_PRINT_STEP];
            for (entry, bytes) in data.iter_mut().zip(chunk.chunks(memory::opcodes::SIZE)) {
                *entry = bytes
                    .iter()
                    .fold(0, |opcode, &byte| (opcode << 8) | byte as Opcode);
            }
            let only_null = data.iter().all(|&entry| entry == 0);

            let mut row = Row {
                from,
                to,
                data,
                only_null,
            };

            if only_null {
                if let Some(last_row) = rows.last() {
                    if last_row.only_null {
                        row.from = last_row.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row)
        }

        let mut string = String::with_capacity((*super::LENLINE + 1) * rows.len());
        for row in rows {
            super::indent_helper(&mut string, indent);
            write!(string, "{}{}", row, super::END_OF_LINE)?;
        }
        super::trim_last_line(&mut string);
        Ok(string)
    }
}

/// handles printing of any and all of integers.
mod integer_print {
    use super::{pointer_print, HEX_PRINT_STEP};
    use num_traits::Unsigned;
    use std::fmt::{self, Write};

    /// will format all integer types
    pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        write!(line, intformat!(), data)
    }

    /// will pretty print all the integer data given
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        let mut res = String::with_capacity(*super::LENLINE * (data.len() / HEX_PRINT_STEP + 1));
        for (index, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = index * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            for entry in chunk {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
            res.push(super::END_OF_LINE);
        }
        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// Handles all the boolean data types.
mod bool_print {
    use super::{pointer_print, Lazy, END_OF_LINE, HEX_PRINT_STEP};
    use std::fmt;

    /// the prepared true string
    static TRUE: Lazy<String> = Lazy::new(|| formatter("true"));
    /// the prepared false string
    static FALSE: Lazy<String> = Lazy::new(|| formatter("false"));

    /// a function to keep the correct format length
    fn formatter(message: &str) -> String {
        format!("{:<width$}", message, width = *super::INTEGER_LEN)
    }

    /// will pretty print all the boolean data given
    /// the offset will be calculated automatically from
    /// the data block
    pub(super) fn printer(data: &[bool], indent: usize) -> Result<String, fmt::Error> {
        let mut res = String::with_capacity(*super::LENLINE * (data.len() / HEX_PRINT_STEP + 1));

        let check_type = |val: bool| if val { &*TRUE } else { &*FALSE };

        for (index, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = index * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            let mut line = String::new();
            for value in chunk {
                line.push(' ');
                line.push_str(check_type(*value));
            }
            res.push_str(line.trim_end());
            res.push(END_OF_LINE);
        }
        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// Renders the display buffer as text art, one line per row.
fn display_printer(pixels: &[Vec<bool>], indent: usize) -> String {
    let mut res = String::with_capacity(pixels.len() * (indent + display_width(pixels) + 1));
    for row in pixels {
        indent_helper(&mut res, indent);
        res.extend(
            row.iter()
                .map(|&lit| if lit { PIXEL_LIT } else { PIXEL_UNLIT }),
        );
        res.push(END_OF_LINE);
    }
    trim_last_line(&mut res);
    res
}

fn display_width(pixels: &[Vec<bool>]) -> usize {
    pixels.first().map(Vec::len).unwrap_or(0)
}

/// A single indented value.
fn value_printer<T>(value: T) -> Result<String, fmt::Error>
where
    T: fmt::UpperHex + num_traits::Unsigned + Copy,
{
    let mut res = String::with_capacity(*INTEGER_LEN + INDENT_SIZE);
    indent_helper(&mut res, INDENT_SIZE);
    integer_print::formatter(&mut res, value)?;
    Ok(res)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = &self.state;

        // prepare the rom name
        let mut nam = String::with_capacity(INDENT_SIZE + self.name.len());
        indent_helper(&mut nam, INDENT_SIZE);
        nam.push_str(&self.name);

        let prc = value_printer(state.program_counter)?;
        let idx = value_printer(state.index_register)?;
        let del = value_printer(state.get_delay_timer())?;
        let snd = value_printer(state.get_sound_timer())?;

        let mem = opcode_print::printer(self.memory.as_slice(), INDENT_SIZE)?;
        let key = bool_print::printer(state.get_keyboard(), INDENT_SIZE)?;

        // handle stack specially as it needs to be filled up if empty
        let mut stack = [0u16; cpu::stack::SIZE];
        stack[..state.stack.len()].copy_from_slice(&state.stack);
        let sta = integer_print::printer(&stack, INDENT_SIZE)?;

        let reg = integer_print::printer(&state.registers, INDENT_SIZE)?;
        let dis = display_printer(self.display.pixels(), INDENT_SIZE);

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex Register :\n{}\n\
                \tDelay Timer :\n{}\n\
                \tSound Timer :\n{}\n\
                \tMemory :\n{}\n\
                \tKeyboard :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                \tDisplay :\n{}\n\
                }}",
            nam, prc, idx, del, snd, mem, key, sta, reg, dis
        )
    }
}
