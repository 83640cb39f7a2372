//! Matrix Projector: pivots resolved assignments into per-identity
//! (group × invader-species) presence grids.

use crate::contacts::ContactSet;
use crate::directory::canonicalize_email;
use crate::types::{ResolvedAssignment, Role};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Presence grid for one canonical identity.
///
/// Rows and columns span the *global* universe: every loaded group name and
/// every observed invader key, identical across all identities in a run.
/// Cells the identity does not occupy render as empty, not omitted.
#[derive(Debug, Clone)]
pub struct IdentityMatrix {
    pub email: String,
    pub local_part: String,
    pub group_names: Vec<String>,
    pub invader_keys: Vec<String>,
    /// Role initials per cell, indexed `[group][invader]`; `BTreeSet` keeps
    /// the serialized form in A < D < H order.
    pub cells: Vec<Vec<BTreeSet<char>>>,
}

impl IdentityMatrix {
    /// Rendered form of one cell, e.g. `"AD"` or `""`.
    pub fn cell_text(&self, group_idx: usize, invader_idx: usize) -> String {
        self.cells[group_idx][invader_idx].iter().collect()
    }
}

/// Portion of an email before the `@`, used both as the matrix file label
/// and as the attribution key when filling cells.
pub fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Distinct canonical identities, in the order assignments first mention
/// them.
pub fn distinct_identities(assignments: &[ResolvedAssignment]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut identities = Vec::new();
    for assignment in assignments {
        if seen.insert(assignment.email.clone()) {
            identities.push(assignment.email.clone());
        }
    }
    identities
}

/// Build one `IdentityMatrix` per distinct identity.
///
/// A cell earns a role initial when the contact's raw field, once
/// canonicalized, belongs to the same identity — so a field written with or
/// without the domain suffix (or with the known misspelling) attributes to
/// one person rather than fragmenting across variants.
pub fn project_matrices(
    assignments: &[ResolvedAssignment],
    contacts: &ContactSet,
) -> Vec<IdentityMatrix> {
    let group_names = contacts.group_names();
    let invader_keys = contacts.invader_keys();
    let key_index: HashMap<&str, usize> = invader_keys
        .iter()
        .enumerate()
        .map(|(idx, key)| (key.as_str(), idx))
        .collect();

    distinct_identities(assignments)
        .into_iter()
        .map(|email| {
            let local = local_part(&email).to_string();
            let mut cells = vec![vec![BTreeSet::new(); invader_keys.len()]; group_names.len()];

            for (group_idx, group) in contacts.iter().enumerate() {
                for contact in &group.contacts {
                    let Some(&invader_idx) = key_index.get(contact.invader_key.as_str()) else {
                        continue;
                    };
                    for role in Role::ALL {
                        let raw = contact.role_field(role).trim();
                        if raw.is_empty() {
                            continue;
                        }
                        if local_part(&canonicalize_email(raw)) == local {
                            cells[group_idx][invader_idx].insert(role.initial());
                        }
                    }
                }
            }

            IdentityMatrix {
                email,
                local_part: local,
                group_names: group_names.clone(),
                invader_keys: invader_keys.clone(),
                cells,
            }
        })
        .collect()
}
