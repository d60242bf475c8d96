use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockrecon_core::{DomainError, DomainResult};

/// Purchase order status lifecycle.
///
/// ```text
/// draft -> submitted | cancelled
/// submitted -> accepted | cancelled
/// accepted -> in_progress | cancelled
/// in_progress -> shipped | cancelled
/// shipped -> delivered | cancelled
/// delivered, cancelled: terminal
/// ```
///
/// Upstream call sites name some states differently (`approved` for
/// `accepted`, `complete` for `delivered`); both spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Submitted,
    #[serde(alias = "approved")]
    Accepted,
    InProgress,
    Shipped,
    #[serde(alias = "complete", alias = "completed")]
    Delivered,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub const ALL: [PurchaseOrderStatus; 7] = [
        PurchaseOrderStatus::Draft,
        PurchaseOrderStatus::Submitted,
        PurchaseOrderStatus::Accepted,
        PurchaseOrderStatus::InProgress,
        PurchaseOrderStatus::Shipped,
        PurchaseOrderStatus::Delivered,
        PurchaseOrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Submitted => "submitted",
            PurchaseOrderStatus::Accepted => "accepted",
            PurchaseOrderStatus::InProgress => "in_progress",
            PurchaseOrderStatus::Shipped => "shipped",
            PurchaseOrderStatus::Delivered => "delivered",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Delivered | PurchaseOrderStatus::Cancelled
        )
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;

        if self.is_terminal() {
            return false;
        }
        if next == Cancelled {
            return true;
        }

        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, Accepted)
                | (Accepted, InProgress)
                | (InProgress, Shipped)
                | (Shipped, Delivered)
        )
    }

    /// Validate a transition and return the new status.
    pub fn transition_to(self, next: PurchaseOrderStatus) -> DomainResult<PurchaseOrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_transition(self.as_str(), next.as_str()))
        }
    }
}

impl core::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "draft" => Ok(PurchaseOrderStatus::Draft),
            "submitted" => Ok(PurchaseOrderStatus::Submitted),
            "accepted" | "approved" => Ok(PurchaseOrderStatus::Accepted),
            "in_progress" => Ok(PurchaseOrderStatus::InProgress),
            "shipped" => Ok(PurchaseOrderStatus::Shipped),
            "delivered" | "complete" | "completed" => Ok(PurchaseOrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(PurchaseOrderStatus::Cancelled),
            _ => Err(DomainError::validation(format!(
                "unknown purchase order status '{s}'"
            ))),
        }
    }
}

/// Whitelist of statuses whose orders still count as committed production.
///
/// Draft and cancelled orders never contribute, whatever the whitelist says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPolicy {
    statuses: Vec<PurchaseOrderStatus>,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            statuses: vec![
                PurchaseOrderStatus::Accepted,
                PurchaseOrderStatus::InProgress,
                PurchaseOrderStatus::Delivered,
            ],
        }
    }
}

impl EligibilityPolicy {
    pub fn new(statuses: impl IntoIterator<Item = PurchaseOrderStatus>) -> DomainResult<Self> {
        let mut out: Vec<PurchaseOrderStatus> = Vec::new();
        for status in statuses {
            if matches!(
                status,
                PurchaseOrderStatus::Draft | PurchaseOrderStatus::Cancelled
            ) {
                return Err(DomainError::validation(format!(
                    "{status} orders cannot feed production inventory"
                )));
            }
            if !out.contains(&status) {
                out.push(status);
            }
        }
        if out.is_empty() {
            return Err(DomainError::validation("eligibility whitelist is empty"));
        }
        out.sort();
        Ok(Self { statuses: out })
    }

    /// Parse a comma-separated whitelist such as `approved,in_progress,complete`.
    pub fn parse_list(list: &str) -> DomainResult<Self> {
        let statuses = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PurchaseOrderStatus::from_str)
            .collect::<DomainResult<Vec<_>>>()?;
        Self::new(statuses)
    }

    pub fn is_eligible(&self, status: PurchaseOrderStatus) -> bool {
        self.statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn happy_path_walks_the_whole_lifecycle() {
        let mut status = PurchaseOrderStatus::Draft;
        for next in [
            PurchaseOrderStatus::Submitted,
            PurchaseOrderStatus::Accepted,
            PurchaseOrderStatus::InProgress,
            PurchaseOrderStatus::Shipped,
            PurchaseOrderStatus::Delivered,
        ] {
            status = status.transition_to(next).unwrap();
        }
        assert_eq!(status, PurchaseOrderStatus::Delivered);
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let err = PurchaseOrderStatus::Draft
            .transition_to(PurchaseOrderStatus::Accepted)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::invalid_transition("draft", "accepted")
        );
    }

    #[test]
    fn every_non_terminal_state_can_be_cancelled() {
        for status in PurchaseOrderStatus::ALL {
            assert_eq!(
                status.can_transition_to(PurchaseOrderStatus::Cancelled),
                !status.is_terminal(),
                "{status}"
            );
        }
    }

    #[test]
    fn call_site_aliases_parse() {
        assert_eq!(
            "approved".parse::<PurchaseOrderStatus>().unwrap(),
            PurchaseOrderStatus::Accepted
        );
        assert_eq!(
            "Complete".parse::<PurchaseOrderStatus>().unwrap(),
            PurchaseOrderStatus::Delivered
        );
        assert_eq!(
            "in-progress".parse::<PurchaseOrderStatus>().unwrap(),
            PurchaseOrderStatus::InProgress
        );
        assert!("lost".parse::<PurchaseOrderStatus>().is_err());
    }

    #[test]
    fn serde_accepts_aliases() {
        let s: PurchaseOrderStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(s, PurchaseOrderStatus::Accepted);
        assert_eq!(
            serde_json::to_string(&PurchaseOrderStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn default_policy_matches_reference_whitelist() {
        let policy = EligibilityPolicy::default();
        assert_eq!(
            policy,
            EligibilityPolicy::parse_list("approved, in_progress, complete").unwrap()
        );
        assert!(!policy.is_eligible(PurchaseOrderStatus::Draft));
        assert!(!policy.is_eligible(PurchaseOrderStatus::Cancelled));
        assert!(!policy.is_eligible(PurchaseOrderStatus::Shipped));
    }

    #[test]
    fn policy_refuses_draft_and_cancelled() {
        assert!(EligibilityPolicy::parse_list("approved,draft").is_err());
        assert!(EligibilityPolicy::parse_list("cancelled").is_err());
        assert!(EligibilityPolicy::parse_list(" , ").is_err());
    }

    proptest! {
        #[test]
        fn terminal_states_never_move(idx in 0usize..7, next in 0usize..7) {
            let from = PurchaseOrderStatus::ALL[idx];
            let to = PurchaseOrderStatus::ALL[next];
            if from.is_terminal() {
                prop_assert!(from.transition_to(to).is_err());
            }
            prop_assert!(!from.can_transition_to(from));
        }
    }
}
