/// Identifies one issued request; later requests carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

/// Orders overlapping async requests so an older response never overwrites a newer one.
///
/// Every request takes a ticket when it is issued. When its response arrives it
/// is applied only if no request issued after it has already been applied.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    issued: u64,
    applied: Option<u64>,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Returns `true` and records the ticket when its response may be applied
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        if self.applied.is_some_and(|applied| applied >= ticket.0) {
            return false;
        }
        self.applied = Some(ticket.0);
        true
    }

    /// Whether a response for `ticket` would still be applied, without recording it
    #[must_use]
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        !self.applied.is_some_and(|applied| applied >= ticket.0)
    }

    /// Whether `ticket` is the most recently issued request
    #[must_use]
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }
}
