//! Fixed vocabulary shared across the pipeline: invader category names,
//! the closed monster-species catalog, and report conventions.

use once_cell::sync::Lazy;
use std::collections::HashSet;

// Broad invader categories; these join on their literal name
pub const ALIENS: &str = "aliens";
pub const PREDATORS: &str = "predators";

/// Domain suffix appended to bare contact identities.
pub const EMAIL_DOMAIN: &str = "@avengers.com";

/// Extension of eligible contact files inside the contacts folder.
pub const CONTACT_FILE_EXT: &str = "txt";

/// The closed monster-species catalog. The `monsters_hq` reference on a
/// headquarters record matches contact rows keyed by any of these species,
/// and the resolved species is the specific key, never a category literal.
pub const MONSTER_SPECIES: [&str; 10] = [
    "d&d_beholder",
    "d&d_devil",
    "d&d_lich",
    "d&d_mind_flayer",
    "d&d_vampire",
    "d&d_red_dragon",
    "d&d_hill_giant",
    "d&d_treant",
    "d&d_werewolf",
    "d&d_yuan-ti",
];

pub static MONSTER_SPECIES_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| MONSTER_SPECIES.iter().copied().collect());

/// aliens + predators + the ten monster species
pub const EXPECTED_SPECIES_PER_COUNTRY: usize = 12;

pub fn is_monster_species(invader_key: &str) -> bool {
    MONSTER_SPECIES_SET.contains(invader_key)
}
