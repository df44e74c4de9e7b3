//! Fixed-depth value history for signals that are observed late.
//!
//! Several VIC-II signals reach their consumer one or more cycles after the
//! chip changed them: the BA line is only trusted by the c-access logic once
//! it has been low for three cycles, the graphics sequencer shifts out data
//! fetched two cycles earlier, and the renderer sees the register file as it
//! was at the end of the previous cycle.

/// A value together with the values it held during the last `N - 1` cycles.
///
/// `write` replaces the value of the current cycle and `advance` is called
/// once at the end of every cycle. A value written in cycle `t` is returned by
/// `read(k)` during cycle `t + k`. Without a write the current value carries
/// over unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedRegister<T: Copy, const N: usize> {
    history: [T; N],
}

impl<T: Copy, const N: usize> DelayedRegister<T, N> {
    /// Creates a register whose whole history holds `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            history: [value; N],
        }
    }

    /// Sets the value for the current cycle.
    pub fn write(&mut self, value: T) {
        self.history[0] = value;
    }

    /// Value as of now.
    #[must_use]
    pub fn current(&self) -> T {
        self.history[0]
    }

    /// Value at the end of the previous cycle.
    #[must_use]
    pub fn delayed(&self) -> T {
        self.read(1)
    }

    /// Value at the end of cycle `now - k`.
    ///
    /// `k` must be smaller than `N`.
    #[must_use]
    pub fn read(&self, k: usize) -> T {
        self.history[k]
    }

    /// Mutable access to the current value.
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.history[0]
    }

    /// Mutable access to the value of the previous cycle.
    ///
    /// The renderer uses this to let a register change show up part way
    /// through an 8-pixel chunk.
    pub fn delayed_mut(&mut self) -> &mut T {
        &mut self.history[1]
    }

    /// Ages the history by one cycle.
    pub fn advance(&mut self) {
        self.history.copy_within(0..N - 1, 1);
    }

    /// Overwrites the whole history with `value`.
    pub fn clear(&mut self, value: T) {
        self.history = [value; N];
    }
}

impl<T: Copy + Default, const N: usize> Default for DelayedRegister<T, N> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
