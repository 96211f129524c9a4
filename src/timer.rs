use num_traits::{CheckedSub, Unsigned};

/// Represents a timer inside of the chip infrastructure, it will count down
/// to zero from whatever number it was given. The countdown is driven from
/// the outside, one [`tick`](Timer::tick) per rendered frame (60 Hz).
///
/// # Example
/// ```rust
/// # use emu8::timer::Timer;
/// let mut timer: Timer<u16> = Timer::new(2);
/// timer.tick();
/// timer.tick();
/// timer.tick();
/// assert_eq!(0, timer.get_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer<T> {
    value: T,
}

impl<T> Timer<T>
where
    T: Unsigned + CheckedSub + Copy,
{
    /// Will create a new timer with the given value.
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> T {
        self.value
    }

    /// Counts down by one, the timer stays at zero once reached.
    pub fn tick(&mut self) {
        self.value = self.value.checked_sub(&T::one()).unwrap_or_else(T::zero);
    }

    /// If the timer is still running.
    pub fn is_active(&self) -> bool {
        !self.value.is_zero()
    }
}
