//! Co-occurrence expansion: members sharing a group → directed pairs
//!
//! For a group with members `M`, every ordered pair `(M[i], M[j])` with
//! `i != j` is emitted, so a group of n members yields n·(n−1) pairs.
//! Groups are visited in order of first appearance; members keep row order.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::join::{Pair, dedup_pairs};
use crate::table::Table;

/// Member lists per group key, in first-appearance order.
///
/// Rows with an absent group or member value are skipped. Duplicate
/// memberships are kept as separate entries.
pub fn group_members<'a>(
    links: &'a Table,
    group_key: &str,
    member_key: &str,
) -> Result<Vec<(&'a str, Vec<&'a str>)>> {
    let g = links.column_index(group_key)?;
    let m = links.column_index(member_key)?;

    let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for row in links.rows() {
        let (Some(group), Some(member)) = (row[g].as_deref(), row[m].as_deref()) else {
            continue;
        };
        let slot = *slots.entry(group).or_insert_with(|| {
            groups.push((group, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(member);
    }
    Ok(groups)
}

/// Ordered 2-permutations of `members` (i outer, j inner, i ≠ j).
pub fn permutations(members: &[&str]) -> Vec<Pair> {
    let n = members.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1));
    for (i, a) in members.iter().enumerate() {
        for (j, b) in members.iter().enumerate() {
            if i != j {
                pairs.push((a.to_string(), b.to_string()));
            }
        }
    }
    pairs
}

/// Expand every group into its permutation pairs.
///
/// No deduplication happens here: callers that may hold duplicate
/// (group, member) rows must remove them first. Pairs repeated across
/// groups are all kept.
pub fn expand(links: &Table, group_key: &str, member_key: &str) -> Result<Vec<Pair>> {
    let groups = group_members(links, group_key, member_key)?;
    let batches: Vec<Vec<Pair>> = groups
        .iter()
        .map(|(_, members)| permutations(members))
        .collect();
    let pairs = batches.concat();
    log::debug!(
        "{}: {} groups expanded into {} pairs",
        links.name(),
        groups.len(),
        pairs.len()
    );
    Ok(pairs)
}

/// Set-semantics expansion: each group's members are reduced to their first
/// occurrences, and the final pair list is deduplicated globally.
pub fn expand_unique(links: &Table, group_key: &str, member_key: &str) -> Result<Vec<Pair>> {
    let groups = group_members(links, group_key, member_key)?;
    let batches: Vec<Vec<Pair>> = groups
        .iter()
        .map(|(_, members)| {
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            let unique: Vec<&str> = members.iter().copied().filter(|m| seen.insert(*m)).collect();
            permutations(&unique)
        })
        .collect();
    let mut pairs = batches.concat();
    let removed = dedup_pairs(&mut pairs);
    log::debug!(
        "{}: {} groups expanded into {} distinct pairs ({removed} repeats removed)",
        links.name(),
        groups.len(),
        pairs.len()
    );
    Ok(pairs)
}
