use std::time::Duration;

/// Result of delivering one tick to the active state.
#[derive(Debug, PartialEq, Eq)]
pub enum Transition<S> {
    /// Keep the current top.
    Stay,
    /// Suspend the current top beneath a new state.
    Push(S),
    /// Discard the current top and resume the one beneath it.
    Pop,
}

/// Behaviour driven by a [`PushdownMachine`].
pub trait TickState<C>: Sized {
    /// Advances the state by `elapsed` and reports the transition to apply.
    fn update(&mut self, elapsed: Duration, context: &mut C) -> Transition<Self>;
}

/// Last-in-first-out stack of states where only the top receives ticks.
#[derive(Debug)]
pub struct PushdownMachine<S> {
    stack: Vec<S>,
}

impl<S> PushdownMachine<S> {
    /// Creates an empty machine.
    #[must_use]
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Installs `state` as the new top, suspending the previous one.
    pub fn push(&mut self, state: S) {
        self.stack.push(state);
    }

    /// Removes the top state; the state beneath resumes without re-entry.
    pub fn pop(&mut self) -> Option<S> {
        self.stack.pop()
    }

    /// Discards every state at once without teardown notifications.
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// State that receives the next tick.
    #[must_use]
    pub fn top(&self) -> Option<&S> {
        self.stack.last()
    }

    /// Number of stacked states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Reports whether the machine holds no states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Delivers one tick to the top state. Empty machines ignore the tick.
    pub fn update<C>(&mut self, elapsed: Duration, context: &mut C)
    where
        S: TickState<C>,
    {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        match top.update(elapsed, context) {
            Transition::Stay => {}
            Transition::Push(next) => self.push(next),
            Transition::Pop => {
                let _ = self.pop();
            }
        }
    }
}

impl<S> Default for PushdownMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}
