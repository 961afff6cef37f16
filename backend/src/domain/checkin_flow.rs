//! Display flow for the front-desk check-in screen.
//!
//! The screen cycles `Idle -> Searching -> {Found, NotFound, Error} -> Idle`;
//! a result stays visible for a fixed number of seconds with the countdown
//! shown to the operator, then the screen resets itself for the next
//! person. Dismissing the result or starting a renewal stops the countdown.
//! The type is pure and advanced by explicit `tick` calls, so clients own
//! the timer and tests need no real clock.

/// Seconds a check-in result stays on screen before auto-reset.
pub const DEFAULT_DISPLAY_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Waiting for a DNI to be entered.
    Idle,
    /// A lookup is in flight.
    Searching,
    /// A member was found; the result card is on screen.
    Found,
    /// No member matched; the negative result is on screen.
    NotFound,
    /// The lookup failed; the error notice is on screen.
    Error,
}

/// How a lookup finished, fed back into the flow by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found,
    NotFound,
    Error,
}

#[derive(Debug, Clone)]
pub struct CheckInFlow {
    state: FlowState,
    /// Seconds until the displayed result auto-resets; `None` while no
    /// countdown runs (idle, searching, or paused for a renewal).
    countdown: Option<u32>,
    display_secs: u32,
}

impl Default for CheckInFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckInFlow {
    pub fn new() -> Self {
        Self::with_display_secs(DEFAULT_DISPLAY_SECS)
    }

    pub fn with_display_secs(display_secs: u32) -> Self {
        Self {
            state: FlowState::Idle,
            countdown: None,
            display_secs: display_secs.max(1),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Seconds shown on the "hides in Ns" badge, when a countdown runs.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    /// A new lookup starts. Also cancels whatever result was on screen,
    /// since the operator typed a new DNI over it.
    pub fn begin_search(&mut self) {
        self.state = FlowState::Searching;
        self.countdown = None;
    }

    /// The in-flight lookup finished; show its result and start the
    /// display countdown. Ignored when no search is in flight.
    pub fn resolve(&mut self, outcome: SearchOutcome) {
        if self.state != FlowState::Searching {
            return;
        }
        self.state = match outcome {
            SearchOutcome::Found => FlowState::Found,
            SearchOutcome::NotFound => FlowState::NotFound,
            SearchOutcome::Error => FlowState::Error,
        };
        self.countdown = Some(self.display_secs);
    }

    /// One second elapsed. At zero the screen resets to idle.
    pub fn tick(&mut self) {
        match self.countdown {
            Some(1) => {
                self.state = FlowState::Idle;
                self.countdown = None;
            }
            Some(n) => self.countdown = Some(n - 1),
            None => {}
        }
    }

    /// Operator closed the result card.
    pub fn dismiss(&mut self) {
        self.state = FlowState::Idle;
        self.countdown = None;
    }

    /// A renewal was started from the displayed result; keep the card up
    /// and stop the countdown until the follow-up search resolves.
    pub fn begin_renewal(&mut self) {
        self.countdown = None;
    }
}
