/// Why the client is contacting the tracker.
///
/// At most one event is pending at a time. The readiness logic overwrites it, the
/// tier list consumes it once a tracker acknowledged it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnnounceEvent {
    /// Regular interval announce, no `event` field.
    None,
    #[default]
    Started,
    Stopped,
    Completed,
    /// The download finished before any tracker acknowledged `started`.
    /// Sent as `started`, and the tracker never hears `completed`.
    StartedAfterCompletion,
}

impl AnnounceEvent {
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            AnnounceEvent::None => None,
            AnnounceEvent::Started | AnnounceEvent::StartedAfterCompletion => Some("started"),
            AnnounceEvent::Stopped => Some("stopped"),
            AnnounceEvent::Completed => Some("completed"),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AnnounceEvent::Stopped | AnnounceEvent::Completed)
    }

    /// A tracker acknowledged the event.
    pub fn after_success(self) -> Self {
        AnnounceEvent::None
    }

    /// Every URL of the tier carrying this event failed.
    pub fn after_tier_exhausted(self) -> Self {
        if self.is_terminal() {
            AnnounceEvent::None
        } else {
            self
        }
    }

    /// The download is complete but `started` was never acknowledged.
    pub fn completed_before_start(self) -> Self {
        match self {
            AnnounceEvent::Started => AnnounceEvent::StartedAfterCompletion,
            other => other,
        }
    }
}
