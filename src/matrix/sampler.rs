//! Test matrix sampling
//!
//! Testing every supported version would make the matrix grow with every
//! release, so each family is reduced to its oldest version, its newest
//! version and one random version in between.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::version::key::sort_versions;

/// Pick the oldest, the newest and one random interior version.
///
/// Returns the picks oldest first. Inputs with two or fewer distinct versions
/// are returned whole.
pub fn sample<R: Rng + ?Sized>(versions: &[String], rng: &mut R) -> Vec<String> {
    let mut sorted = versions.to_vec();
    sort_versions(&mut sorted);

    if sorted.len() <= 2 {
        return sorted;
    }

    let interior = &sorted[1..sorted.len() - 1];
    let mut picked = vec![sorted[0].clone()];
    picked.extend(interior.choose(rng).cloned());
    picked.push(sorted[sorted.len() - 1].clone());

    picked
}
