use crate::error::Result;
use crate::matrix::IdentityMatrix;
use serde::{Deserialize, Serialize};

/// One row of the country headquarters roster.
///
/// The three `*_hq` fields are references into the contact-group namespace
/// and may be empty when a country has no current assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadquartersRecord {
    pub country_name: String,
    pub country_code: String,
    pub aliens_hq: String,
    pub predators_hq: String,
    pub monsters_hq: String,
}

/// One row of a contact file: an invader key plus up to three raw
/// (pre-canonicalization) contact identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRecord {
    pub invader_key: String,
    pub attack: String,
    pub defense: String,
    pub healing: String,
}

impl ContactRecord {
    /// Raw identity string for a role; empty means unassigned.
    pub fn role_field(&self, role: Role) -> &str {
        match role {
            Role::Attack => &self.attack,
            Role::Defense => &self.defense,
            Role::Healing => &self.healing,
        }
    }
}

/// A named contact group: one group per contact file, name taken from the
/// file's first row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactGroup {
    pub name: String,
    pub contacts: Vec<ContactRecord>,
}

/// Responsibility slot filled by at most one identity per contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Attack,
    Defense,
    Healing,
}

impl Role {
    /// All roles, in the order assignments are emitted.
    pub const ALL: [Role; 3] = [Role::Attack, Role::Defense, Role::Healing];

    /// Label used in the flat report's `Role` column.
    pub fn report_label(&self) -> &'static str {
        match self {
            Role::Attack => "attack_role",
            Role::Defense => "defense_role",
            Role::Healing => "healing_role",
        }
    }

    /// Single-letter initial used in matrix cells.
    pub fn initial(&self) -> char {
        match self {
            Role::Attack => 'A',
            Role::Defense => 'D',
            Role::Healing => 'H',
        }
    }
}

/// One resolved (country, species, role, identity) tuple produced by the
/// directory join. `email` is already canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAssignment {
    pub country_code: String,
    pub invader_species: String,
    pub role: Role,
    pub email: String,
}

/// Boundary port for the emitted report artifacts. The filesystem adapter
/// lives in `report`; tests substitute an in-memory capture.
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    /// Write the flat role report; returns the path written.
    async fn write_flat_report(&self, assignments: &[ResolvedAssignment]) -> Result<String>;

    /// Write one identity's matrix report; returns the path written.
    async fn write_identity_matrix(&self, matrix: &IdentityMatrix) -> Result<String>;

    /// Write the sorted list of unique canonical emails; returns the path written.
    async fn write_unique_emails(&self, emails: &[String]) -> Result<String>;
}
