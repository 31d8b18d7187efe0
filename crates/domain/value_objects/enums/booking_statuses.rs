use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Refused,
    Paid,
    Completed,
    Disputed,
    Cancelled,
}

/// Everything that can move a booking from one status to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    Accept,
    Refuse,
    ConfirmPayment,
    Complete,
    Cancel,
    OpenDispute,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Refused => "refused",
            BookingStatus::Paid => "paid",
            BookingStatus::Completed => "completed",
            BookingStatus::Disputed => "disputed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "accepted" => Some(BookingStatus::Accepted),
            "refused" => Some(BookingStatus::Refused),
            "paid" => Some(BookingStatus::Paid),
            "completed" => Some(BookingStatus::Completed),
            "disputed" => Some(BookingStatus::Disputed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// `disputed` counts as terminal here: only the admin side may act on it.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Refused
                | BookingStatus::Completed
                | BookingStatus::Cancelled
                | BookingStatus::Disputed
        )
    }

    /// Returns the status reached by applying `event`, or `None` when the
    /// event is not allowed from the current status.
    pub fn apply(self, event: BookingEvent) -> Option<BookingStatus> {
        use BookingEvent as E;
        use BookingStatus as S;

        match (self, event) {
            (S::Pending, E::Accept) => Some(S::Accepted),
            (S::Pending, E::Refuse) => Some(S::Refused),
            (S::Accepted, E::ConfirmPayment) => Some(S::Paid),
            (S::Paid, E::Complete) => Some(S::Completed),
            (S::Accepted | S::Paid, E::OpenDispute) => Some(S::Disputed),
            (status, E::Cancel) if !status.is_terminal() => Some(S::Cancelled),
            _ => None,
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for BookingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let event = match self {
            BookingEvent::Accept => "accept",
            BookingEvent::Refuse => "refuse",
            BookingEvent::ConfirmPayment => "confirm_payment",
            BookingEvent::Complete => "complete",
            BookingEvent::Cancel => "cancel",
            BookingEvent::OpenDispute => "open_dispute",
        };
        write!(f, "{}", event)
    }
}
