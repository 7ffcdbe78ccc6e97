//! Caller identity and capability checks.
//!
//! Authentication lives outside this service. Callers arrive as an opaque
//! identity plus role, and the engine only asks capability questions of it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of the caller within the company, as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    /// Full administrative access.
    Admin,
    /// Can post, reverse, and reconcile.
    Accountant,
    /// Can submit business-event postings but not reverse or reconcile.
    Clerk,
    /// Read-only access to reports.
    Viewer,
}

impl std::str::FromStr for CallerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "accountant" => Ok(Self::Accountant),
            "clerk" => Ok(Self::Clerk),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("Unknown caller role: {s}")),
        }
    }
}

/// Identity of the caller of an engine operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Opaque caller ID issued by the upstream identity provider.
    pub caller_id: Uuid,
    /// The caller's role.
    pub role: CallerRole,
}

impl CallerIdentity {
    /// Creates a new caller identity.
    #[must_use]
    pub const fn new(caller_id: Uuid, role: CallerRole) -> Self {
        Self { caller_id, role }
    }

    /// Returns true if the caller may post journal entries.
    #[must_use]
    pub fn can_post(&self) -> bool {
        matches!(
            self.role,
            CallerRole::Admin | CallerRole::Accountant | CallerRole::Clerk
        )
    }

    /// Returns true if the caller may reverse posted entries.
    #[must_use]
    pub fn can_reverse(&self) -> bool {
        matches!(self.role, CallerRole::Admin | CallerRole::Accountant)
    }

    /// Returns true if the caller may run bank reconciliation.
    #[must_use]
    pub fn can_reconcile(&self) -> bool {
        matches!(self.role, CallerRole::Admin | CallerRole::Accountant)
    }

    /// Returns true if the caller may manage accounts and dimensions.
    #[must_use]
    pub fn can_manage_directory(&self) -> bool {
        matches!(self.role, CallerRole::Admin | CallerRole::Accountant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(CallerRole::Admin, true, true)]
    #[case(CallerRole::Accountant, true, true)]
    #[case(CallerRole::Clerk, true, false)]
    #[case(CallerRole::Viewer, false, false)]
    fn test_capabilities(
        #[case] role: CallerRole,
        #[case] can_post: bool,
        #[case] can_reverse: bool,
    ) {
        let caller = CallerIdentity::new(Uuid::new_v4(), role);
        assert_eq!(caller.can_post(), can_post);
        assert_eq!(caller.can_reverse(), can_reverse);
        assert_eq!(caller.can_reconcile(), can_reverse);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(CallerRole::from_str("admin").unwrap(), CallerRole::Admin);
        assert_eq!(
            CallerRole::from_str("Accountant").unwrap(),
            CallerRole::Accountant
        );
        assert!(CallerRole::from_str("root").is_err());
    }
}
