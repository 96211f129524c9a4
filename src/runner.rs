use crate::{
    chip8::ChipSet,
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
    CoreError,
};

/// Runs one rendered frame: copies the keyboard into the chip, runs `cycles`
/// cycles and ticks the timers once. The last cycle that touched the screen
/// decides how it is presented, a clear blanks it, a draw hands over the
/// pixels. The first failing cycle ends the frame, the timers are not ticked
/// in that case.
///
/// Returns the operation of the last cycle that ran.
pub fn run_frame<D, K>(
    chip: &mut ChipSet,
    display: &mut D,
    keyboard: &K,
    cycles: usize,
) -> Result<Operation, CoreError>
where
    D: DisplayCommands + ?Sized,
    K: KeyboardCommands + ?Sized,
{
    chip.set_keyboard(keyboard.get_keyboard());

    let mut last_op = Operation::None;
    let mut screen = None;
    for _ in 0..cycles {
        last_op = chip.next()?;
        if matches!(last_op, Operation::Draw | Operation::Clear) {
            screen = Some(last_op);
        }
    }

    chip.tick_timers();

    match screen {
        Some(Operation::Clear) => display.clear_display(),
        /* draw the screen */
        Some(_) => display.display(chip.get_display()),
        None => {}
    }
    Ok(last_op)
}
