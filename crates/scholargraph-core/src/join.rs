//! Relationship joiner: equi-joins over tables and (start, end) pair lists
//!
//! Unresolved references are never an error. An inner join simply drops
//! rows without a partner; the number dropped is logged so silent filtering
//! stays observable.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::extract::NodeTable;
use crate::table::Table;

/// Directed edge as (start id, end id).
pub type Pair = (String, String);

/// Identifier set of one emitted node type.
pub type IdSet = FxHashSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Keep only left rows with at least one matching right row.
    Inner,
    /// Keep every left row; unmatched right columns are absent.
    Left,
}

/// Equi-join `left` and `right` on `left_key == right_key`.
///
/// Output columns are the left columns followed by the right columns. The
/// right key is dropped when it has the same name as the left key; any
/// other clashing right column gets a `_right` suffix. A left row matching
/// k right rows yields k output rows, in right-table order. Absent keys
/// never match.
pub fn join(
    left: &Table,
    right: &Table,
    left_key: &str,
    right_key: &str,
    kind: JoinKind,
) -> Result<Table> {
    let lk = left.column_index(left_key)?;
    let rk = right.column_index(right_key)?;

    let right_cols: Vec<usize> = (0..right.columns().len())
        .filter(|&i| !(i == rk && left_key == right_key))
        .collect();

    let mut columns = left.columns().to_vec();
    for &i in &right_cols {
        let name = &right.columns()[i];
        if columns.contains(name) {
            columns.push(format!("{name}_right"));
        } else {
            columns.push(name.clone());
        }
    }

    let mut index: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, row) in right.rows().iter().enumerate() {
        if let Some(key) = row[rk].as_deref() {
            index.entry(key).or_default().push(i);
        }
    }

    let mut out = Table::new(format!("{}+{}", left.name(), right.name()), columns);
    let mut unmatched = 0usize;
    for row in left.rows() {
        match row[lk].as_deref().and_then(|k| index.get(k)) {
            Some(matches) => {
                for &m in matches {
                    let mut joined = row.clone();
                    joined.extend(right_cols.iter().map(|&i| right.rows()[m][i].clone()));
                    out.push(joined);
                }
            }
            None => {
                unmatched += 1;
                if kind == JoinKind::Left {
                    let mut joined = row.clone();
                    joined.resize(row.len() + right_cols.len(), None);
                    out.push(joined);
                }
            }
        }
    }

    if unmatched > 0 && kind == JoinKind::Inner {
        log::info!(
            "{} x {} on {left_key}={right_key}: dropped {unmatched} of {} rows without a match",
            left.name(),
            right.name(),
            left.len()
        );
    } else {
        log::debug!(
            "{} x {} on {left_key}={right_key}: {} rows ({unmatched} unmatched)",
            left.name(),
            right.name(),
            out.len()
        );
    }
    Ok(out)
}

/// Project two columns into (start, end) pairs. Rows with an absent
/// endpoint are dropped.
pub fn project_pairs(table: &Table, start: &str, end: &str) -> Result<Vec<Pair>> {
    let s = table.column_index(start)?;
    let e = table.column_index(end)?;
    let pairs: Vec<Pair> = table
        .rows()
        .iter()
        .filter_map(|row| Some((row[s].clone()?, row[e].clone()?)))
        .collect();
    let incomplete = table.len() - pairs.len();
    if incomplete > 0 {
        log::debug!(
            "{}: skipped {incomplete} rows with an empty {start} or {end}",
            table.name()
        );
    }
    Ok(pairs)
}

/// Remove repeated pairs, keeping first occurrences. Returns how many were
/// removed.
pub fn dedup_pairs(pairs: &mut Vec<Pair>) -> usize {
    let before = pairs.len();
    let mut seen: FxHashSet<Pair> = FxHashSet::default();
    pairs.retain(|p| seen.insert(p.clone()));
    before - pairs.len()
}

/// Identifier set of an extracted node type.
pub fn id_set(nodes: &NodeTable) -> IdSet {
    nodes.ids().map(str::to_string).collect()
}

/// Drop pairs whose start or end is not a known identifier. Returns how
/// many were dropped.
pub fn retain_closed(pairs: &mut Vec<Pair>, start_ids: &IdSet, end_ids: &IdSet) -> usize {
    let before = pairs.len();
    pairs.retain(|(s, e)| start_ids.contains(s) && end_ids.contains(e));
    before - pairs.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_join_multiplicity() {
        let left = Table::from_rows("l", &["k", "a"], &[&["1", "x"]]);
        let right = Table::from_rows(
            "r",
            &["k", "b"],
            &[&["1", "p"], &["1", "q"], &["1", "r"], &["2", "s"]],
        );
        let out = join(&left, &right, "k", "k", JoinKind::Inner).unwrap();
        assert_eq!(out.columns(), &["k", "a", "b"]);
        assert_eq!(out.len(), 3);
        let bs: Vec<_> = out.column_values("b").unwrap().collect();
        assert_eq!(bs, vec![Some("p"), Some("q"), Some("r")]);
    }

    #[test]
    fn inner_join_drops_unmatched_and_absent_keys() {
        let left = Table::from_rows("l", &["k"], &[&["1"], &["9"], &[""]]);
        let right = Table::from_rows("r", &["k", "v"], &[&["1", "a"], &["", "b"]]);
        let out = join(&left, &right, "k", "k", JoinKind::Inner).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn left_join_fills_absent() {
        let left = Table::from_rows("pubs", &["publication_ID"], &[&["P1"], &["P2"]]);
        let right = Table::from_rows(
            "pub2venue",
            &["publication_ID", "venue_ID"],
            &[&["P1", "V1"]],
        );
        let out = join(&left, &right, "publication_ID", "publication_ID", JoinKind::Left).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows()[1], vec![Some("P2".into()), None]);
    }

    #[test]
    fn different_key_names_keep_both_and_suffix_clashes() {
        let left = Table::from_rows("cites", &["publication_ID", "doi"], &[&["P1", "D2"]]);
        let right = Table::from_rows("pubs", &["publication_ID", "doi"], &[&["P2", "D2"]]);
        let out = join(&left, &right, "doi", "doi", JoinKind::Inner).unwrap();
        assert_eq!(out.columns(), &["publication_ID", "doi", "publication_ID_right"]);

        let out = join(&left, &right, "doi", "publication_ID", JoinKind::Inner).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn project_pairs_skips_incomplete() {
        let t = Table::from_rows("t", &["s", "e"], &[&["a", "b"], &["c", ""]]);
        let pairs = project_pairs(&t, "s", "e").unwrap();
        assert_eq!(pairs, vec![("a".to_string(), "b".to_string())]);
    }

    #[test]
    fn dedup_pairs_keeps_first() {
        let mut pairs = vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
            ("a".to_string(), "b".to_string()),
        ];
        assert_eq!(dedup_pairs(&mut pairs), 1);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "b");
    }

    #[test]
    fn retain_closed_filters_dangling() {
        let starts: IdSet = ["P1".to_string()].into_iter().collect();
        let ends: IdSet = ["P1".to_string(), "P2".to_string()].into_iter().collect();
        let mut pairs = vec![
            ("P1".to_string(), "P2".to_string()),
            ("P3".to_string(), "P2".to_string()),
            ("P1".to_string(), "P9".to_string()),
        ];
        assert_eq!(retain_closed(&mut pairs, &starts, &ends), 2);
        assert_eq!(pairs.len(), 1);
    }
}
