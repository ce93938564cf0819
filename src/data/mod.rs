pub mod eval;
pub mod multi_hot;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Number of attributes in the observed label space.
pub const LABEL_SPACE: usize = 3474;

/// A single attribute label, split out of its raw `category::detail` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: usize,
    pub category: String,
    pub detail: String,
}

impl Label {
    pub fn from_attribute(id: usize, attribute: &str) -> Result<Self, DataError> {
        let (category, detail) = parse_attribute(attribute)?;
        Ok(Self {
            id,
            category: category.to_owned(),
            detail: detail.to_owned(),
        })
    }
}

/// Splits a raw attribute name into its `category::detail` components.
pub fn parse_attribute(name: &str) -> Result<(&str, &str), DataError> {
    name.split_once("::")
        .filter(|(category, detail)| !category.is_empty() && !detail.is_empty())
        .ok_or_else(|| DataError::MalformedAttribute(name.to_owned()))
}

/// One annotated record: an image id and the set of attribute ids applied to
/// it. Ids must be valid indices into the label space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub label_ids: BTreeSet<usize>,
}

impl Annotation {
    pub fn new(id: impl Into<String>, label_ids: impl IntoIterator<Item = usize>) -> Self {
        Self {
            id: id.into(),
            label_ids: label_ids.into_iter().collect(),
        }
    }

    /// Parses the space-separated `attribute_ids` field of a raw annotation
    /// row, e.g. `"13 522 1043"`.
    pub fn from_attribute_ids(id: impl Into<String>, raw: &str) -> Result<Self, DataError> {
        let label_ids = raw
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<usize>()
                    .map_err(|_| DataError::MalformedLabelIds(raw.to_owned()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            id: id.into(),
            label_ids,
        })
    }
}
