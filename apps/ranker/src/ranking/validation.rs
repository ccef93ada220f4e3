use std::collections::HashSet;

use thiserror::Error;

use crate::ranking::models::RankingEntry;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("ranking is empty")]
    Empty,

    #[error("entry at position {0} has no filename")]
    MissingFilename(usize),

    #[error("ranking mentions unknown file '{0}'")]
    UnknownFilename(String),

    #[error("file '{0}' is ranked more than once")]
    DuplicateFilename(String),

    #[error("ranking has {actual} entries but {expected} candidates were submitted")]
    CountMismatch { expected: usize, actual: usize },

    #[error("ranks are not unique and contiguous from 1 (got {0:?})")]
    NonContiguousRanks(Vec<u32>),

    #[error("match_percentage {value} for '{filename}' is outside 0..=100")]
    PercentageOutOfRange { filename: String, value: i64 },
}

/// Checks a parsed ranking against the documents that were submitted.
///
/// Rules:
/// - at least one entry
/// - every filename present, known and ranked once
/// - one entry per submitted candidate
/// - ranks are exactly 1..=n
/// - match_percentage within 0..=100
///
/// Returns the entries ordered by ascending rank.
pub fn validate_ranking(
    mut entries: Vec<RankingEntry>,
    filenames: &[String],
) -> Result<Vec<RankingEntry>, StructuralError> {
    if entries.is_empty() {
        return Err(StructuralError::Empty);
    }

    let known: HashSet<&str> = filenames.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    for (position, entry) in entries.iter().enumerate() {
        let filename = entry.filename.trim();
        if filename.is_empty() {
            return Err(StructuralError::MissingFilename(position));
        }
        if !known.contains(filename) {
            return Err(StructuralError::UnknownFilename(filename.to_string()));
        }
        if !seen.insert(filename) {
            return Err(StructuralError::DuplicateFilename(filename.to_string()));
        }
        if !(0..=100).contains(&entry.match_percentage) {
            return Err(StructuralError::PercentageOutOfRange {
                filename: filename.to_string(),
                value: entry.match_percentage,
            });
        }
    }

    if entries.len() != filenames.len() {
        return Err(StructuralError::CountMismatch {
            expected: filenames.len(),
            actual: entries.len(),
        });
    }

    let mut ranks: Vec<u32> = entries.iter().map(|e| e.rank).collect();
    ranks.sort_unstable();
    let contiguous = ranks
        .iter()
        .enumerate()
        .all(|(i, &rank)| rank as usize == i + 1);
    if !contiguous {
        return Err(StructuralError::NonContiguousRanks(ranks));
    }

    for entry in &mut entries {
        entry.filename = entry.filename.trim().to_string();
    }
    entries.sort_by_key(|e| e.rank);
    Ok(entries)
}
