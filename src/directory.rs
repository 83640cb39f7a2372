//! Directory Builder: joins the headquarters roster against the loaded
//! contact groups and derives canonical role assignments.

use crate::constants::{
    is_monster_species, ALIENS, EMAIL_DOMAIN, EXPECTED_SPECIES_PER_COUNTRY, MONSTER_SPECIES,
    PREDATORS,
};
use crate::contacts::ContactSet;
use crate::roster::Roster;
use crate::types::{ContactRecord, ResolvedAssignment, Role};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Canonicalize a raw contact identity: repair the recurring `capatain`
/// misspelling, then append the default domain when the value does not
/// already end in `.com` (case-insensitive). Idempotent; empty input stays
/// empty.
pub fn canonicalize_email(raw: &str) -> String {
    let repaired = raw.replace("capatain", "captain");
    if repaired.is_empty() {
        return repaired;
    }
    if repaired.to_lowercase().ends_with(".com") {
        repaired
    } else {
        format!("{repaired}{EMAIL_DOMAIN}")
    }
}

/// Build the full directory of resolved assignments.
///
/// Per headquarters record: the aliens and predators references match
/// contact rows keyed by the literal category name and resolve to that
/// literal; the monsters reference matches rows keyed by any species in the
/// fixed catalog and resolves to the specific species. References that name
/// no loaded group are an expected state of the data and produce nothing.
pub fn build_directory(roster: &Roster, contacts: &ContactSet) -> Vec<ResolvedAssignment> {
    let mut assignments = Vec::new();

    for hq in roster.iter() {
        for (category, group_ref) in [(ALIENS, &hq.aliens_hq), (PREDATORS, &hq.predators_hq)] {
            let Some(group) = contacts.get(group_ref) else {
                debug!(country = %hq.country_code, reference = %group_ref, "unresolved group reference");
                continue;
            };
            for contact in group.contacts.iter().filter(|c| c.invader_key == category) {
                emit_roles(&mut assignments, &hq.country_code, category, contact);
            }
        }

        let Some(group) = contacts.get(&hq.monsters_hq) else {
            debug!(country = %hq.country_code, reference = %hq.monsters_hq, "unresolved monster group reference");
            continue;
        };
        // Iterate the catalog in its fixed order so output is deterministic;
        // contact rows keyed outside the catalog never match.
        for species in MONSTER_SPECIES {
            for contact in group.contacts.iter().filter(|c| c.invader_key == species) {
                emit_roles(&mut assignments, &hq.country_code, species, contact);
            }
        }
        for contact in &group.contacts {
            if !is_monster_species(&contact.invader_key) {
                debug!(
                    group = %group.name,
                    invader_key = %contact.invader_key,
                    "contact row outside the monster catalog"
                );
            }
        }
    }

    assignments
}

fn emit_roles(
    assignments: &mut Vec<ResolvedAssignment>,
    country_code: &str,
    invader_species: &str,
    contact: &ContactRecord,
) {
    for role in Role::ALL {
        let raw = contact.role_field(role).trim();
        if raw.is_empty() {
            continue;
        }
        assignments.push(ResolvedAssignment {
            country_code: country_code.to_string(),
            invader_species: invader_species.to_string(),
            role,
            email: canonicalize_email(raw),
        });
    }
}

/// Post-join sanity check from the reference data: each fully staffed
/// country covers aliens, predators, and all ten monster species.
pub fn warn_species_coverage(assignments: &[ResolvedAssignment]) {
    let mut by_country: HashMap<&str, HashSet<&str>> = HashMap::new();
    for assignment in assignments {
        by_country
            .entry(assignment.country_code.as_str())
            .or_default()
            .insert(assignment.invader_species.as_str());
    }
    for (country, species) in &by_country {
        if species.len() != EXPECTED_SPECIES_PER_COUNTRY {
            warn!(
                country = %country,
                species = species.len(),
                expected = EXPECTED_SPECIES_PER_COUNTRY,
                "country does not cover the full invader-species set"
            );
        }
    }
}
