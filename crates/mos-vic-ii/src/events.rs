//! Deferred chip actions.
//!
//! Some side effects of a cycle only become visible a little later: the
//! interrupt line follows the IRR/IMR registers with a delay, the light-pen
//! latch fires one cycle after the input edge, and the border flip-flop
//! shadows catch up at the end of the cycle. These are queued here.
//!
//! Every action owns two adjacent bits. Bit `2A` is the staging bit and bit
//! `2A + 1` the due bit. A drain fires everything that is due and then moves
//! staged actions into the due position, so an action scheduled with
//! [`DelayQueue::schedule_next`] fires at the next drain and one scheduled
//! with [`DelayQueue::schedule_after_next`] fires at the drain after that.

/// An action the chip performs at the start of a later cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Drive the interrupt line from `IRR & IMR`.
    UpdateIrqLine,
    /// Copy the border flip-flops into their delayed shadows.
    UpdateFlipflops,
    /// Enter display state if the current line is a bad line.
    SetDisplayState,
    /// Latch the light-pen coordinates.
    LightpenTransition,
    /// Clear the sprite-sprite collision register ($D01E).
    ClearSpriteSpriteCollision,
    /// Clear the sprite-background collision register ($D01F).
    ClearSpriteBackgroundCollision,
}

impl Action {
    /// All actions in drain order.
    pub const ALL: [Action; 6] = [
        Action::UpdateIrqLine,
        Action::UpdateFlipflops,
        Action::SetDisplayState,
        Action::LightpenTransition,
        Action::ClearSpriteSpriteCollision,
        Action::ClearSpriteBackgroundCollision,
    ];

    const fn index(self) -> u32 {
        match self {
            Action::UpdateIrqLine => 0,
            Action::UpdateFlipflops => 1,
            Action::SetDisplayState => 2,
            Action::LightpenTransition => 3,
            Action::ClearSpriteSpriteCollision => 4,
            Action::ClearSpriteBackgroundCollision => 5,
        }
    }

    const fn stage_bit(self) -> u16 {
        1 << (2 * self.index())
    }

    const fn due_bit(self) -> u16 {
        1 << (2 * self.index() + 1)
    }
}

/// Odd bits: the due half of every pair.
const DUE_MASK: u16 = 0xAAAA;

/// The set of actions fired by one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet(u16);

impl ActionSet {
    #[cfg(test)]
    const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, action: Action) -> bool {
        self.0 & action.due_bit() != 0
    }

    /// Fired actions in drain order.
    pub fn iter(self) -> impl Iterator<Item = Action> {
        Action::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

/// Shifting bit-vector of pending actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayQueue {
    bits: u16,
}

impl DelayQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Fires `action` at the next drain.
    ///
    /// Used for events raised by the chip itself while it executes a cycle.
    pub fn schedule_next(&mut self, action: Action) {
        self.bits |= action.due_bit();
    }

    /// Fires `action` at the second drain from now.
    ///
    /// Used for events raised from outside between two cycles (register
    /// writes, input edges), which the chip only notices one cycle later.
    pub fn schedule_after_next(&mut self, action: Action) {
        self.bits |= action.stage_bit();
    }

    /// Whether `action` is staged or due.
    #[cfg(test)]
    const fn is_pending(&self, action: Action) -> bool {
        self.bits & (action.stage_bit() | action.due_bit()) != 0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Removes and returns the due actions, then promotes staged ones.
    pub fn drain(&mut self) -> ActionSet {
        let due = self.bits & DUE_MASK;
        self.bits = (self.bits << 1) & DUE_MASK;
        ActionSet(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_fires_on_first_drain() {
        let mut queue = DelayQueue::new();
        queue.schedule_next(Action::UpdateIrqLine);
        let fired = queue.drain();
        assert!(fired.contains(Action::UpdateIrqLine));
        assert!(queue.is_empty());
    }

    #[test]
    fn after_next_waits_one_drain() {
        let mut queue = DelayQueue::new();
        queue.schedule_after_next(Action::LightpenTransition);
        assert!(queue.drain().is_empty());
        assert!(queue.is_pending(Action::LightpenTransition));
        assert!(queue.drain().contains(Action::LightpenTransition));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn due_bit_does_not_leak_into_next_action() {
        let mut queue = DelayQueue::new();
        queue.schedule_next(Action::UpdateIrqLine);
        queue.drain();
        assert!(!queue.is_pending(Action::UpdateFlipflops));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn drain_order_is_fixed() {
        let mut queue = DelayQueue::new();
        queue.schedule_next(Action::ClearSpriteBackgroundCollision);
        queue.schedule_next(Action::UpdateIrqLine);
        queue.schedule_next(Action::SetDisplayState);
        let order: Vec<_> = queue.drain().iter().collect();
        assert_eq!(
            order,
            vec![
                Action::UpdateIrqLine,
                Action::SetDisplayState,
                Action::ClearSpriteBackgroundCollision
            ]
        );
    }

    #[test]
    fn same_action_in_both_stages() {
        let mut queue = DelayQueue::new();
        queue.schedule_next(Action::UpdateIrqLine);
        queue.schedule_after_next(Action::UpdateIrqLine);
        assert!(queue.drain().contains(Action::UpdateIrqLine));
        assert!(queue.drain().contains(Action::UpdateIrqLine));
        assert!(queue.is_empty());
    }
}
