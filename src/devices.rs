use crate::definitions::keyboard;

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear_display(&mut self);
    /// Will display all from the pixels, the slice is row major
    fn display(&mut self, pixels: &[Vec<bool>]);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for writing the keyboard data
pub trait KeyboardCommands {
    fn get_keyboard(&self) -> &[bool];
}

/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// Sets a single key, keys outside of `0-F` are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        match self.keys.get_mut(key) {
            Some(entry) => *entry = to,
            None => log::warn!("Ignoring key {:#X} outside of the keypad.", key),
        }
    }

    /// Will overwrite the whole snapshot.
    pub fn set_mult(&mut self, keys: &[bool]) {
        if keys.len() != self.keys.len() {
            log::warn!(
                "Got {} keys for a {} key keypad, copying the overlapping part.",
                keys.len(),
                self.keys.len()
            );
        }
        let len = keys.len().min(self.keys.len());
        self.keys = [false; keyboard::SIZE];
        self.keys[..len].copy_from_slice(&keys[..len]);
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }

    /// Returns if the key is pressed, `None` for a key outside of `0-F`.
    pub fn is_pressed(&self, key: usize) -> Option<bool> {
        self.keys.get(key).copied()
    }

    /// The lowest pressed key.
    pub fn first_pressed(&self) -> Option<usize> {
        self.keys.iter().position(|&pressed| pressed)
    }
}
