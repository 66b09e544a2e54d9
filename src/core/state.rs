//! Per-request endpoint detection state.

/// Outcome of looking for the paired marker in the raw request.
///
/// Stored as `Option<EndpointState>` on the request context, where `None`
/// means detection has not run yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointState {
    /// Marker was present and stripped before the host parsed the request.
    Consumed,
    /// Marker was absent (an empty marker value counts as absent).
    Absent,
    /// Site is in standard mode; paired detection does not apply.
    NotApplicable,
}

impl EndpointState {
    /// Tri-state view: `Some(true)`, `Some(false)`, or `None` when not applicable.
    #[inline]
    pub const fn as_option(&self) -> Option<bool> {
        match self {
            Self::Consumed => Some(true),
            Self::Absent => Some(false),
            Self::NotApplicable => None,
        }
    }

    #[inline]
    pub const fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed)
    }
}
