//! Ticket status derivation
//!
//! A ticket never stores its status. It is derived from the payment
//! outcome (`success`: null while pending, 1 when paid, 0 when failed) and
//! from `used_at`, which is set once the ticket has been scanned.

use serde::Serialize;
use std::fmt;

/// Display status of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Pending,
    Failed,
    Used,
}

/// Derive the status of a ticket
///
/// `used_at` wins over the payment outcome: a scanned ticket is `Used` even
/// if its payment is recorded as failed or pending. Any `success` value
/// other than 0 or 1 is treated as a failed payment.
pub fn resolve(success: Option<i64>, used_at: Option<&str>) -> TicketStatus {
    if used_at.is_some() {
        return TicketStatus::Used;
    }

    match success {
        None => TicketStatus::Pending,
        Some(1) => TicketStatus::Active,
        Some(_) => TicketStatus::Failed,
    }
}

/// How a status is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    pub label: &'static str,
    pub text_color: &'static str,
    pub badge: &'static str,
}

const ACTIVE: StatusPresentation = StatusPresentation {
    label: "Active",
    text_color: "text-green-500",
    badge: "bg-green-500/10 border-green-500",
};

const PENDING: StatusPresentation = StatusPresentation {
    label: "Pending",
    text_color: "text-amber-500",
    badge: "bg-amber-500/10 border-amber-500",
};

const FAILED: StatusPresentation = StatusPresentation {
    label: "Failed",
    text_color: "text-red-500",
    badge: "bg-red-500/10 border-red-500",
};

const USED: StatusPresentation = StatusPresentation {
    label: "Used",
    text_color: "text-gray-400",
    badge: "bg-gray-500/10 border-gray-500",
};

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Active,
        TicketStatus::Pending,
        TicketStatus::Failed,
        TicketStatus::Used,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "active",
            TicketStatus::Pending => "pending",
            TicketStatus::Failed => "failed",
            TicketStatus::Used => "used",
        }
    }

    pub fn presentation(&self) -> &'static StatusPresentation {
        match self {
            TicketStatus::Active => &ACTIVE,
            TicketStatus::Pending => &PENDING,
            TicketStatus::Failed => &FAILED,
            TicketStatus::Used => &USED,
        }
    }

    /// Only an active ticket should show a scannable QR code
    pub fn is_scannable(&self) -> bool {
        matches!(self, TicketStatus::Active)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USED_AT: &str = "2025-07-15 18:02:11";

    #[test]
    fn test_payment_outcomes_without_scan() {
        assert_eq!(resolve(None, None), TicketStatus::Pending);
        assert_eq!(resolve(Some(1), None), TicketStatus::Active);
        assert_eq!(resolve(Some(0), None), TicketStatus::Failed);
        assert_eq!(resolve(Some(7), None), TicketStatus::Failed);
    }

    #[test]
    fn test_used_takes_precedence() {
        for success in [None, Some(0), Some(1), Some(-1)] {
            assert_eq!(resolve(success, Some(USED_AT)), TicketStatus::Used);
        }
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let first = resolve(Some(1), None);
        let second = resolve(Some(1), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_status_has_distinct_presentation() {
        let labels: std::collections::HashSet<_> = TicketStatus::ALL
            .iter()
            .map(|status| status.presentation().label)
            .collect();
        assert_eq!(labels.len(), TicketStatus::ALL.len());
        assert_eq!(TicketStatus::Used.to_string(), "used");
        assert!(TicketStatus::Active.is_scannable());
        assert!(!TicketStatus::Pending.is_scannable());
    }
}
