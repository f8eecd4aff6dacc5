//! Header matching for the canonical analytics fields.
//!
//! Exports name their columns freely ("Views", "Impressions CTR (%)", "Video
//! publish time"), so each field is located by case-insensitive substring
//! search over an ordered synonym list.

use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer};

use crate::config::Synonyms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Views,
    Likes,
    Comments,
    Ctr,
    WatchTime,
    PublishTime,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Views,
        Field::Likes,
        Field::Comments,
        Field::Ctr,
        Field::WatchTime,
        Field::PublishTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Views => "views",
            Field::Likes => "likes",
            Field::Comments => "comments",
            Field::Ctr => "ctr",
            Field::WatchTime => "watch_time",
            Field::PublishTime => "publish_time",
        }
    }

    pub fn default_candidates(self) -> &'static [&'static str] {
        match self {
            Field::Views => &["views"],
            Field::Likes => &["like"],
            Field::Comments => &["comment"],
            Field::Ctr => &["ctr"],
            Field::WatchTime => &["average view duration", "watch"],
            Field::PublishTime => &["publish"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Returns the first column containing any candidate, ignoring case.
///
/// Columns are the outer loop: an earlier column wins over a later one even if
/// the later one matches an earlier candidate. Empty candidates never match.
pub fn resolve<'a, C, S>(columns: &'a [C], candidates: &[S]) -> Option<&'a str>
where
    C: AsRef<str>,
    S: AsRef<str>,
{
    let lowered = candidates
        .iter()
        .map(|c| c.as_ref().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>();
    columns.iter().map(|c| c.as_ref()).find(|column| {
        let column = column.to_lowercase();
        lowered.iter().any(|candidate| column.contains(candidate.as_str()))
    })
}

/// Column chosen for each canonical field, or `None` when unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    resolved: BTreeMap<Field, Option<String>>,
}

impl FieldMap {
    pub fn resolve<C: AsRef<str>>(columns: &[C], synonyms: &Synonyms) -> Self {
        let resolved = Field::ALL
            .iter()
            .map(|&field| {
                let column = resolve(columns, synonyms.candidates(field)).map(str::to_string);
                (field, column)
            })
            .collect();
        Self { resolved }
    }

    pub fn column(&self, field: Field) -> Option<&str> {
        self.resolved.get(&field).and_then(|c| c.as_deref())
    }

    pub fn is_resolved(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> + '_ {
        Field::ALL.into_iter().map(|field| (field, self.column(field)))
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(field, column)| (field.name(), column)))
    }
}
