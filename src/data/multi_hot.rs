use std::collections::BTreeSet;

use crate::error::DataError;

/// Encodes a set of label ids as a fixed-width binary indicator vector.
pub fn encode(label_ids: &BTreeSet<usize>, size: usize) -> Result<Vec<u8>, DataError> {
    let mut row = vec![0u8; size];
    for &id in label_ids {
        let slot = row
            .get_mut(id)
            .ok_or(DataError::IndexOutOfRange { id, size })?;
        *slot = 1;
    }
    Ok(row)
}

/// Recovers the set of ids flagged in an indicator vector. Inverse of
/// [`encode`].
pub fn decode(row: &[u8]) -> BTreeSet<usize> {
    row.iter()
        .enumerate()
        .filter(|&(_, &flag)| flag != 0)
        .map(|(id, _)| id)
        .collect()
}
