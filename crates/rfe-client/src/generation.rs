//! Request generations for async fetches that commit into shared state.
//!
//! Every fetch takes a [`Ticket`] before it suspends. When the result comes
//! back, it is committed only if no newer fetch was started in the meantime.

/// Identifies one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw generation number, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic generation counter.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    /// Create a counter with no fetch issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, superseding any in flight.
    pub fn begin(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    /// Whether `ticket` belongs to the latest fetch.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }

    /// Supersede any fetch in flight without starting a new one.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    /// The latest generation number.
    pub fn current(&self) -> u64 {
        self.current
    }
}
