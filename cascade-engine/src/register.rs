// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A clocked register.
//!
//! During the settle phase a model reads [`Reg::out`] and computes the value
//! for the next cycle with [`Reg::set_next`]. The commit phase calls
//! [`Reg::latch`] so the new value only becomes visible in the next cycle.

use std::cell::Cell;

#[derive(Debug)]
pub struct Reg<T>
where
    T: Copy,
{
    reset_value: T,
    out: Cell<T>,
    next: Cell<T>,
}

impl<T> Reg<T>
where
    T: Copy,
{
    #[must_use]
    pub fn new(reset_value: T) -> Self {
        Self {
            reset_value,
            out: Cell::new(reset_value),
            next: Cell::new(reset_value),
        }
    }

    /// The value held this cycle.
    #[must_use]
    pub fn out(&self) -> T {
        self.out.get()
    }

    #[must_use]
    pub fn next(&self) -> T {
        self.next.get()
    }

    pub fn set_next(&self, value: T) {
        self.next.set(value);
    }

    /// Clock edge. A register whose next value was not set holds its value.
    pub fn latch(&self) {
        self.out.set(self.next.get());
    }

    pub fn reset(&self) {
        self.out.set(self.reset_value);
        self.next.set(self.reset_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_visible_after_latch() {
        let reg = Reg::new(0u32);
        reg.set_next(5);
        assert_eq!(reg.out(), 0);
        reg.latch();
        assert_eq!(reg.out(), 5);

        // Holds when nothing new is set
        reg.latch();
        assert_eq!(reg.out(), 5);

        reg.reset();
        assert_eq!(reg.out(), 0);
        assert_eq!(reg.next(), 0);
    }
}
