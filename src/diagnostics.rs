//! Recovered data irregularities.
//!
//! The engine never fails on inconsistent relationship data. Each repair is
//! recorded as a [`Diagnostic`] and returned alongside the result so callers
//! can log or surface it.

use serde::Serialize;

use crate::graph::LinkKind;

/// Relationship field of a member record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationField {
    #[serde(rename = "fatherId")]
    Father,
    #[serde(rename = "motherId")]
    Mother,
    #[serde(rename = "parentId")]
    Parent,
    #[serde(rename = "spouseId")]
    Spouse,
    #[serde(rename = "childrenIds")]
    Children,
}

/// One recovered condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Diagnostic {
    /// A relationship points at an identifier absent from the input set.
    DanglingReference {
        member: String,
        field: RelationField,
        target: String,
    },
    /// A record belongs to another family tree and was left out.
    ForeignMember {
        member: String,
        family_tree_id: String,
    },
    /// A member names itself as its own spouse.
    SelfReference { member: String, field: RelationField },
    /// `parentId` disagrees with the resolved father/mother and was ignored.
    ParentConflict {
        member: String,
        kept: Vec<String>,
        ignored: String,
    },
    /// A `childrenIds` entry would give the child a third parent.
    ExcessParents { member: String, ignored_parent: String },
    /// A parent→child edge closed a cycle and was removed.
    CycleDetected {
        parent: String,
        child: String,
        link: LinkKind,
    },
    /// A member with parents under different roots was attached once.
    AmbiguousAttachment {
        member: String,
        attached_under: String,
        root: String,
        also_child_of: Vec<String>,
    },
    /// A member unreachable from every root was promoted to a root.
    RetroactiveRoot { member: String },
}

impl Diagnostic {
    /// The member the diagnostic is mainly about.
    pub fn member(&self) -> &str {
        match self {
            Self::DanglingReference { member, .. }
            | Self::ForeignMember { member, .. }
            | Self::SelfReference { member, .. }
            | Self::ParentConflict { member, .. }
            | Self::ExcessParents { member, .. }
            | Self::AmbiguousAttachment { member, .. }
            | Self::RetroactiveRoot { member } => member,
            Self::CycleDetected { child, .. } => child,
        }
    }
}

/// Collector for diagnostics of one build.
#[derive(Debug, Default)]
pub struct Diagnostics {
    family_tree_id: String,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(family_tree_id: impl Into<String>) -> Self {
        Self {
            family_tree_id: family_tree_id.into(),
            entries: Vec::new(),
        }
    }

    /// Record a diagnostic and emit it as a warning.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            family_tree = %self.family_tree_id,
            member = diagnostic.member(),
            ?diagnostic,
            "recovered lineage data irregularity"
        );
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
