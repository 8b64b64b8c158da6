// ==========================================
// Foundry QC Tracker - domain type definitions
// ==========================================
// Production stages, user roles and capabilities
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Stage - production stage of a pipe
// ==========================================
// Order matters: a pipe moves CCM -> ... -> Finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "CCM")]
    Ccm,
    Annealing,
    Zinc,
    Cutting,
    Hydrotest,
    Cement,
    Coating,
    Finish,
}

impl Stage {
    /// All stages in production order
    pub const ALL: [Stage; 8] = [
        Stage::Ccm,
        Stage::Annealing,
        Stage::Zinc,
        Stage::Cutting,
        Stage::Hydrotest,
        Stage::Cement,
        Stage::Coating,
        Stage::Finish,
    ];

    /// Name as stored in `pipe_stages.stage_name`
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ccm => "CCM",
            Stage::Annealing => "Annealing",
            Stage::Zinc => "Zinc",
            Stage::Cutting => "Cutting",
            Stage::Hydrotest => "Hydrotest",
            Stage::Cement => "Cement",
            Stage::Coating => "Coating",
            Stage::Finish => "Finish",
        }
    }

    /// Parse a stage name (case-insensitive); unknown names yield None
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim();
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(needle))
    }

    /// Zero-based position in the production sequence
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Capability - what a role may do
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    View,       // list and detail pages
    Edit,       // create / update records
    Approve,    // delete records, approve decisions
    Administer, // settings
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::View => write!(f, "VIEW"),
            Capability::Edit => write!(f, "EDIT"),
            Capability::Approve => write!(f, "APPROVE"),
            Capability::Administer => write!(f, "ADMINISTER"),
        }
    }
}

// ==========================================
// Role - user role
// ==========================================
// A role is a fixed capability set, no inheritance chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
    Operator,
    Viewer,
}

impl Role {
    /// Capability set granted to the role
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::View,
                Capability::Edit,
                Capability::Approve,
                Capability::Administer,
            ],
            Role::Supervisor => &[Capability::View, Capability::Edit, Capability::Approve],
            Role::Operator => &[Capability::View, Capability::Edit],
            Role::Viewer => &[Capability::View],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Operator => "operator",
            Role::Viewer => "viewer",
        }
    }

    /// Parse a role name; unknown values fall back to Viewer
    pub fn from_str_or_viewer(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "supervisor" => Role::Supervisor,
            "operator" => Role::Operator,
            _ => Role::Viewer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Actor - who performs an operation
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    /// Anonymous read-only actor
    pub fn anonymous() -> Self {
        Self::new("anonymous", Role::Viewer)
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}

// ==========================================
// Page - one page of a list query
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.per_page == 0 {
            return 0;
        }
        (self.total + self.per_page as i64 - 1) / self.per_page as i64
    }
}

/// Largest page a caller may request
pub const MAX_PER_PAGE: u32 = 500;

/// Page request; page numbers start at 1, per_page is clamped to 1..=MAX_PER_PAGE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1).saturating_mul(self.per_page as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_parse() {
        assert_eq!(Stage::ALL.len(), 8);
        assert_eq!(Stage::ALL[0], Stage::Ccm);
        assert_eq!(Stage::ALL[7], Stage::Finish);
        assert!(Stage::Ccm < Stage::Finish);
        assert_eq!(Stage::parse("ccm"), Some(Stage::Ccm));
        assert_eq!(Stage::parse(" Hydrotest "), Some(Stage::Hydrotest));
        assert_eq!(Stage::parse("Melting"), None);
        assert_eq!(Stage::Coating.index(), 6);
    }

    #[test]
    fn test_stage_serde_uses_stored_names() {
        assert_eq!(serde_json::to_string(&Stage::Ccm).unwrap(), "\"CCM\"");
        assert_eq!(serde_json::to_string(&Stage::Zinc).unwrap(), "\"Zinc\"");
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.can(Capability::Administer));
        assert!(Role::Supervisor.can(Capability::Approve));
        assert!(!Role::Supervisor.can(Capability::Administer));
        assert!(Role::Operator.can(Capability::Edit));
        assert!(!Role::Operator.can(Capability::Approve));
        assert!(Role::Viewer.can(Capability::View));
        assert!(!Role::Viewer.can(Capability::Edit));
    }

    #[test]
    fn test_page_math() {
        let req = PageRequest::new(0, 20);
        assert_eq!(req.page, 1);
        assert_eq!(req.offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
        assert_eq!(PageRequest::new(1, 0).per_page, 1);

        let page: Page<i32> = Page {
            items: vec![],
            page: 1,
            per_page: 20,
            total: 41,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_page_request_bounds_caller_values() {
        let req = PageRequest::new(u32::MAX, u32::MAX);
        assert_eq!(req.per_page, MAX_PER_PAGE);
        assert_eq!(req.offset(), (u32::MAX as i64 - 1) * MAX_PER_PAGE as i64);
    }

    #[test]
    fn test_role_parse_falls_back_to_viewer() {
        assert_eq!(Role::from_str_or_viewer("Supervisor"), Role::Supervisor);
        assert_eq!(Role::from_str_or_viewer("root"), Role::Viewer);
        assert_eq!(Role::from_str_or_viewer(""), Role::Viewer);
    }
}
