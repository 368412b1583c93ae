//! GraphBuilder - flat member records to a cross-referenced family graph.
//!
//! Relationship fields are resolved in passes of decreasing precedence:
//!
//! 1. `fatherId` / `motherId` on the child
//! 2. legacy `parentId` on the child, only when no father/mother resolved
//! 3. `childrenIds` on the parent, inferring the missing back-reference
//! 4. `spouseId`, recorded symmetrically
//!
//! A reference to an identifier outside the input set is dropped and
//! reported; it never fails the build.

use std::collections::{HashMap, HashSet};

use super::edge::LinkKind;
use super::family::FamilyGraph;
use super::node::NodeId;
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, RelationField};
use crate::error::{HierarchyError, Result};
use crate::member::Member;

/// Relationship fields of one record, detached from the member so the graph
/// can be mutated while they are walked.
#[derive(Debug, Default)]
struct RawLinks {
    father: Option<String>,
    mother: Option<String>,
    parent: Option<String>,
    spouse: Option<String>,
    children: Vec<String>,
}

impl RawLinks {
    fn of(member: &Member) -> Self {
        Self {
            father: member.father_id.clone(),
            mother: member.mother_id.clone(),
            parent: member.parent_id.clone(),
            spouse: member.spouse_id.clone(),
            children: member.children_ids.clone(),
        }
    }
}

/// Builds a [`FamilyGraph`] for one family tree.
pub struct GraphBuilder<'a> {
    family_tree_id: &'a str,
    config: &'a EngineConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(family_tree_id: &'a str, config: &'a EngineConfig) -> Self {
        Self {
            family_tree_id,
            config,
        }
    }

    /// Build the graph. Fails only on malformed records.
    pub fn build(
        &self,
        members: Vec<Member>,
        diagnostics: &mut Diagnostics,
    ) -> Result<FamilyGraph> {
        validate(&members)?;

        let mut members: Vec<Member> = members
            .into_iter()
            .filter(|member| self.belongs_to_tree(member, diagnostics))
            .collect();
        // Arena order is identifier order, so input order never matters.
        members.sort_by(|a, b| a.id.cmp(&b.id));

        let mut graph = FamilyGraph::with_capacity(
            self.family_tree_id,
            members.len(),
            members.len() * 2,
        );
        let mut links = Vec::with_capacity(members.len());
        for member in members {
            let raw = RawLinks::of(&member);
            if let Some(id) = graph.add_member(member) {
                links.push((id, raw));
            }
        }

        self.resolve_explicit_parents(&mut graph, &links, diagnostics);
        let ignored = self.resolve_legacy_parents(&mut graph, &links, diagnostics);
        self.resolve_children_lists(&mut graph, &links, &ignored, diagnostics);
        self.resolve_spouses(&mut graph, &links, diagnostics);

        tracing::debug!(
            family_tree = self.family_tree_id,
            nodes = graph.node_count(),
            parent_edges = graph.edge_count(),
            "family graph built"
        );
        Ok(graph)
    }

    fn belongs_to_tree(&self, member: &Member, diagnostics: &mut Diagnostics) -> bool {
        if !self.config.enforce_family_tree {
            return true;
        }
        match member.family_tree_id.as_deref().map(str::trim) {
            Some(tree) if !tree.is_empty() && tree != self.family_tree_id => {
                diagnostics.record(Diagnostic::ForeignMember {
                    member: member.id.clone(),
                    family_tree_id: tree.to_string(),
                });
                false
            }
            _ => true,
        }
    }

    /// Resolve a reference, reporting it if it dangles.
    fn resolve(
        &self,
        graph: &FamilyGraph,
        member: NodeId,
        field: RelationField,
        target: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> Option<NodeId> {
        let target = target.map(str::trim).filter(|t| !t.is_empty())?;
        let resolved = graph.lookup(target);
        if resolved.is_none() {
            diagnostics.record(Diagnostic::DanglingReference {
                member: graph.member_id(member).to_string(),
                field,
                target: target.to_string(),
            });
        }
        resolved
    }

    fn record_self_parent(
        graph: &FamilyGraph,
        id: NodeId,
        kind: LinkKind,
        diagnostics: &mut Diagnostics,
    ) {
        let member = graph.member_id(id).to_string();
        diagnostics.record(Diagnostic::CycleDetected {
            parent: member.clone(),
            child: member,
            link: kind,
        });
    }

    fn resolve_explicit_parents(
        &self,
        graph: &mut FamilyGraph,
        links: &[(NodeId, RawLinks)],
        diagnostics: &mut Diagnostics,
    ) {
        for (child, raw) in links {
            let child = *child;
            let father =
                self.resolve(graph, child, RelationField::Father, raw.father.as_deref(), diagnostics);
            let mut mother =
                self.resolve(graph, child, RelationField::Mother, raw.mother.as_deref(), diagnostics);

            if let (Some(f), Some(m)) = (father, mother) {
                if f == m {
                    diagnostics.record(Diagnostic::ParentConflict {
                        member: graph.member_id(child).to_string(),
                        kept: vec![graph.member_id(f).to_string()],
                        ignored: graph.member_id(m).to_string(),
                    });
                    mother = None;
                }
            }

            for (parent, kind) in [(father, LinkKind::Father), (mother, LinkKind::Mother)] {
                let Some(parent) = parent else { continue };
                if parent == child {
                    Self::record_self_parent(graph, child, kind, diagnostics);
                    continue;
                }
                graph.link_parent(parent, child, kind);
            }
        }
    }

    /// Returns the `(parent, child)` pairs whose `parentId` lost to an
    /// explicit father/mother, so `childrenIds` cannot reintroduce them.
    fn resolve_legacy_parents(
        &self,
        graph: &mut FamilyGraph,
        links: &[(NodeId, RawLinks)],
        diagnostics: &mut Diagnostics,
    ) -> HashSet<(NodeId, NodeId)> {
        let mut ignored = HashSet::new();
        for (child, raw) in links {
            let child = *child;
            let Some(parent) =
                self.resolve(graph, child, RelationField::Parent, raw.parent.as_deref(), diagnostics)
            else {
                continue;
            };
            if parent == child {
                Self::record_self_parent(graph, child, LinkKind::Parent, diagnostics);
                continue;
            }

            let existing = graph.parents(child);
            if existing.contains(&parent) {
                continue;
            }
            if !existing.is_empty() {
                diagnostics.record(Diagnostic::ParentConflict {
                    member: graph.member_id(child).to_string(),
                    kept: existing
                        .iter()
                        .map(|&p| graph.member_id(p).to_string())
                        .collect(),
                    ignored: graph.member_id(parent).to_string(),
                });
                ignored.insert((parent, child));
                continue;
            }
            graph.link_parent(parent, child, LinkKind::Parent);
        }
        ignored
    }

    fn resolve_children_lists(
        &self,
        graph: &mut FamilyGraph,
        links: &[(NodeId, RawLinks)],
        ignored: &HashSet<(NodeId, NodeId)>,
        diagnostics: &mut Diagnostics,
    ) {
        for (parent, raw) in links {
            let parent = *parent;
            let mut listed = HashSet::new();
            for child_ref in &raw.children {
                let Some(child) = self.resolve(
                    graph,
                    parent,
                    RelationField::Children,
                    Some(child_ref.as_str()),
                    diagnostics,
                ) else {
                    continue;
                };
                if !listed.insert(child) {
                    continue;
                }
                if child == parent {
                    Self::record_self_parent(graph, parent, LinkKind::ChildList, diagnostics);
                    continue;
                }
                if graph.has_link(parent, child) || ignored.contains(&(parent, child)) {
                    continue;
                }
                if graph.parent_count(child) >= 2 {
                    diagnostics.record(Diagnostic::ExcessParents {
                        member: graph.member_id(child).to_string(),
                        ignored_parent: graph.member_id(parent).to_string(),
                    });
                    continue;
                }
                graph.link_parent(parent, child, LinkKind::ChildList);
            }
        }
    }

    fn resolve_spouses(
        &self,
        graph: &mut FamilyGraph,
        links: &[(NodeId, RawLinks)],
        diagnostics: &mut Diagnostics,
    ) {
        for (member, raw) in links {
            let member = *member;
            let Some(spouse) =
                self.resolve(graph, member, RelationField::Spouse, raw.spouse.as_deref(), diagnostics)
            else {
                continue;
            };
            if spouse == member {
                diagnostics.record(Diagnostic::SelfReference {
                    member: graph.member_id(member).to_string(),
                    field: RelationField::Spouse,
                });
                continue;
            }
            graph.link_spouses(member, spouse);
        }
    }
}

/// Reject records without an identifier or a name, and duplicate identifiers.
fn validate(members: &[Member]) -> Result<()> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        if member.id.trim().is_empty() {
            return Err(HierarchyError::MissingField { index, field: "id" });
        }
        if member.full_name.trim().is_empty() {
            return Err(HierarchyError::MissingField {
                index,
                field: "fullName",
            });
        }
        if let Some(&first) = seen.get(member.id.as_str()) {
            return Err(HierarchyError::DuplicateIdentifier {
                index,
                id: member.id.clone(),
                first,
            });
        }
        seen.insert(member.id.as_str(), index);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(members: Vec<Member>) -> (FamilyGraph, Vec<Diagnostic>) {
        let config = EngineConfig::default();
        let mut diagnostics = Diagnostics::new("tree");
        let graph = GraphBuilder::new("tree", &config)
            .build(members, &mut diagnostics)
            .unwrap();
        (graph, diagnostics.into_vec())
    }

    fn id(graph: &FamilyGraph, member: &str) -> NodeId {
        graph.lookup(member).unwrap()
    }

    #[test]
    fn test_father_and_mother_links() {
        let (graph, diagnostics) = build(vec![
            Member::new("c", "Child").with_father("f").with_mother("m"),
            Member::new("f", "Father"),
            Member::new("m", "Mother"),
        ]);
        assert!(diagnostics.is_empty());
        let c = id(&graph, "c");
        assert_eq!(graph.parents(c), vec![id(&graph, "f"), id(&graph, "m")]);
        assert_eq!(graph.children(id(&graph, "f")), vec![c]);
        assert_eq!(graph.link(id(&graph, "m"), c).map(|l| l.kind), Some(LinkKind::Mother));
    }

    #[test]
    fn test_children_list_infers_parent() {
        let (graph, diagnostics) = build(vec![
            Member::new("f", "F").with_children(["g"]),
            Member::new("g", "G"),
        ]);
        assert!(diagnostics.is_empty());
        let (f, g) = (id(&graph, "f"), id(&graph, "g"));
        assert_eq!(graph.parents(g), vec![f]);
        assert_eq!(graph.link(f, g).map(|l| l.kind), Some(LinkKind::ChildList));
    }

    #[test]
    fn test_children_list_consistent_with_father() {
        let (graph, _) = build(vec![
            Member::new("f", "F").with_children(["g"]),
            Member::new("g", "G").with_father("f"),
        ]);
        let (f, g) = (id(&graph, "f"), id(&graph, "g"));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.link(f, g).map(|l| l.kind), Some(LinkKind::Father));
    }

    #[test]
    fn test_father_beats_parent_id() {
        let (graph, diagnostics) = build(vec![
            Member::new("c", "C").with_father("f").with_parent("p"),
            Member::new("f", "F"),
            Member::new("p", "P").with_children(["c"]),
        ]);
        let c = id(&graph, "c");
        assert_eq!(graph.parents(c), vec![id(&graph, "f")]);
        assert!(matches!(
            &diagnostics[..],
            [Diagnostic::ParentConflict { member, ignored, .. }] if member == "c" && ignored == "p"
        ));
    }

    #[test]
    fn test_parent_id_used_without_father() {
        let (graph, diagnostics) = build(vec![
            Member::new("c", "C").with_parent("p"),
            Member::new("p", "P"),
        ]);
        assert!(diagnostics.is_empty());
        let (p, c) = (id(&graph, "p"), id(&graph, "c"));
        assert_eq!(graph.link(p, c).map(|l| l.kind), Some(LinkKind::Parent));
    }

    #[test]
    fn test_parent_id_fallback_when_father_dangles() {
        let (graph, diagnostics) = build(vec![
            Member::new("c", "C").with_father("ghost").with_parent("p"),
            Member::new("p", "P"),
        ]);
        assert_eq!(graph.parents(id(&graph, "c")), vec![id(&graph, "p")]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DanglingReference {
                member: "c".into(),
                field: RelationField::Father,
                target: "ghost".into(),
            }]
        );
    }

    #[test]
    fn test_third_parent_is_rejected() {
        let (graph, diagnostics) = build(vec![
            Member::new("c", "C").with_father("f").with_mother("m"),
            Member::new("f", "F"),
            Member::new("m", "M"),
            Member::new("x", "X").with_children(["c"]),
        ]);
        assert_eq!(graph.parent_count(id(&graph, "c")), 2);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::ExcessParents {
                member: "c".into(),
                ignored_parent: "x".into(),
            }]
        );
    }

    #[test]
    fn test_spouse_is_symmetric() {
        let (graph, diagnostics) = build(vec![
            Member::new("h", "H").with_spouse("i"),
            Member::new("i", "I"),
            Member::new("s", "S").with_spouse("s"),
        ]);
        let (h, i) = (id(&graph, "h"), id(&graph, "i"));
        assert_eq!(graph.spouses(h), &[i]);
        assert_eq!(graph.spouses(i), &[h]);
        assert!(matches!(&diagnostics[..], [Diagnostic::SelfReference { member, .. }] if member == "s"));
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let (graph, diagnostics) = build(vec![Member::new("a", "A").with_father("a")]);
        assert_eq!(graph.edge_count(), 0);
        assert!(matches!(
            &diagnostics[..],
            [Diagnostic::CycleDetected { link: LinkKind::Father, .. }]
        ));
    }

    #[test]
    fn test_same_father_and_mother() {
        let (graph, diagnostics) = build(vec![
            Member::new("c", "C").with_father("p").with_mother("p"),
            Member::new("p", "P"),
        ]);
        assert_eq!(graph.parent_count(id(&graph, "c")), 1);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let members = vec![
            Member::new("b", "B").with_father("a"),
            Member::new("a", "A").with_spouse("c"),
            Member::new("c", "C").with_children(["b"]),
        ];
        let mut reversed = members.clone();
        reversed.reverse();

        let (first, _) = build(members);
        let (second, _) = build(reversed);
        assert_eq!(first.parent_child_pairs(), second.parent_child_pairs());
        assert_eq!(first.spouse_pairs(), second.spouse_pairs());
        assert_eq!(first.member_id(NodeId(0)), "a");
    }

    #[test]
    fn test_foreign_members_dropped() {
        let mut foreign = Member::new("x", "X");
        foreign.family_tree_id = Some("other".into());
        let mut local = Member::new("a", "A").with_father("x");
        local.family_tree_id = Some("tree".into());

        let (graph, diagnostics) = build(vec![local, foreign]);
        assert_eq!(graph.node_count(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::ForeignMember { .. }));
        assert!(matches!(diagnostics[1], Diagnostic::DanglingReference { .. }));
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let config = EngineConfig::default();
        let mut diagnostics = Diagnostics::new("tree");
        let err = GraphBuilder::new("tree", &config)
            .build(vec![Member::new("a", "A"), Member::new("b", "  ")], &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, HierarchyError::MissingField { index: 1, field: "fullName" }));
    }

    #[test]
    fn test_duplicate_identifier_is_fatal() {
        let config = EngineConfig::default();
        let mut diagnostics = Diagnostics::new("tree");
        let err = GraphBuilder::new("tree", &config)
            .build(vec![Member::new("a", "A"), Member::new("a", "B")], &mut diagnostics)
            .unwrap_err();
        assert!(matches!(
            err,
            HierarchyError::DuplicateIdentifier { index: 1, first: 0, .. }
        ));
    }
}
