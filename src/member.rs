//! Member input records.
//!
//! A `Member` is one person as exported by the persistence layer. Every
//! relationship field is an optional identifier reference; none of them is
//! trusted to be present, consistent, or even to point at a record that
//! exists. The graph builder is responsible for making sense of them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::NameOrder;

/// Recorded gender of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One person record as delivered by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Member {
    /// Identifier, unique within one family tree.
    pub id: String,
    /// Display name.
    #[serde(alias = "name")]
    pub full_name: String,
    /// Explicit family name, when the source keeps it separately.
    #[serde(alias = "surname")]
    pub last_name: Option<String>,
    pub gender: Gender,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    /// Free-form birth date; only the year is used.
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    #[serde(alias = "isAlive")]
    pub alive: Option<bool>,
    pub father_id: Option<String>,
    pub mother_id: Option<String>,
    /// Legacy generic parent link, used when father/mother are unknown.
    pub parent_id: Option<String>,
    pub spouse_id: Option<String>,
    pub children_ids: Vec<String>,
    /// Opaque image reference, passed through untouched.
    #[serde(alias = "avatar")]
    pub image: Option<String>,
    /// Family tree this record claims to belong to.
    pub family_tree_id: Option<String>,
}

impl Member {
    /// Create a member with just an identifier and a name.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn with_father(mut self, id: impl Into<String>) -> Self {
        self.father_id = Some(id.into());
        self
    }

    pub fn with_mother(mut self, id: impl Into<String>) -> Self {
        self.mother_id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, id: impl Into<String>) -> Self {
        self.parent_id = Some(id.into());
        self
    }

    pub fn with_spouse(mut self, id: impl Into<String>) -> Self {
        self.spouse_id = Some(id.into());
        self
    }

    pub fn with_children<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Birth year, falling back to the year found in `birth_date`.
    pub fn birth(&self) -> Option<i32> {
        self.birth_year
            .or_else(|| self.birth_date.as_deref().and_then(year_of))
    }

    /// Death year, falling back to the year found in `death_date`.
    pub fn death(&self) -> Option<i32> {
        self.death_year
            .or_else(|| self.death_date.as_deref().and_then(year_of))
    }

    /// Whether the member is alive. Without an explicit flag, anyone with a
    /// recorded death is considered deceased.
    pub fn is_alive(&self) -> bool {
        self.alive.unwrap_or_else(|| {
            self.death().is_none()
                && self.death_date.as_deref().is_none_or(|d| d.trim().is_empty())
        })
    }

    /// Family name used as the primary display sort key.
    pub fn family_name(&self, order: NameOrder) -> &str {
        if let Some(last) = self.last_name.as_deref().map(str::trim) {
            if !last.is_empty() {
                return last;
            }
        }
        let mut words = self.full_name.split_whitespace();
        let word = match order {
            NameOrder::FamilyFirst => words.next(),
            NameOrder::FamilyLast => words.next_back(),
        };
        word.unwrap_or("")
    }
}

/// Extract a four-digit year from a date string such as `1890-05-02`,
/// `02/05/1890` or `1890`.
fn year_of(date: &str) -> Option<i32> {
    date.split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 4)
        .and_then(|part| part.parse().ok())
}

/// Seniority order: earliest known birth year first (unknown last), then name,
/// then identifier.
pub fn cmp_by_birth(a: &Member, b: &Member) -> Ordering {
    match (a.birth(), b.birth()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.full_name.cmp(&b.full_name))
    .then_with(|| a.id.cmp(&b.id))
}

/// Display order inside one generation: family name, then full name, then
/// identifier.
pub fn cmp_by_name(a: &Member, b: &Member, order: NameOrder) -> Ordering {
    a.family_name(order)
        .cmp(b.family_name(order))
        .then_with(|| a.full_name.cmp(&b.full_name))
        .then_with(|| a.id.cmp(&b.id))
}
