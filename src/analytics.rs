use crate::ir::{GraphModel, Node};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Serving role of a member, ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServingRole {
    Unknown,
    Member,
    Assistant,
    Leader,
}

impl ServingRole {
    /// Missing or unrecognised roles are `Unknown`.
    pub fn from_role(role: Option<&str>) -> Self {
        match role.map(str::trim) {
            Some(role) if role.eq_ignore_ascii_case("leader") => Self::Leader,
            Some(role) if role.eq_ignore_ascii_case("assistant") => Self::Assistant,
            Some(role) if role.eq_ignore_ascii_case("member") => Self::Member,
            _ => Self::Unknown,
        }
    }
}

/// Head counts of the people serving in a set of groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingSummary {
    pub total_serving: usize,
    pub leaders: usize,
    pub assistants: usize,
    pub members: usize,
}

/// Counts the unique people serving in `selected` nodes, or in every node of
/// the graph when the selection is missing or empty.
///
/// People are identified by full name; members without one are skipped. A
/// person serving in several groups counts once, under their highest role.
/// Anyone who is neither a leader nor a member is counted as an assistant.
pub fn summarize(graph: &GraphModel, selected: Option<&[&str]>) -> ServingSummary {
    let nodes: Vec<&Node> = match selected {
        Some(ids) if !ids.is_empty() => {
            let wanted: HashSet<&str> = ids.iter().copied().collect();
            graph
                .nodes()
                .iter()
                .filter(|node| wanted.contains(node.id.as_str()))
                .collect()
        }
        _ => graph.nodes().iter().collect(),
    };

    let mut people: HashMap<&str, ServingRole> = HashMap::new();
    for member in nodes.iter().flat_map(|node| &node.members) {
        let Some(name) = member.full_name.as_deref().filter(|name| !name.trim().is_empty()) else {
            continue;
        };
        let role = ServingRole::from_role(member.role.as_deref());
        let best = people.entry(name).or_insert(role);
        *best = (*best).max(role);
    }

    let mut summary = ServingSummary {
        total_serving: people.len(),
        ..ServingSummary::default()
    };
    for role in people.values() {
        match role {
            ServingRole::Leader => summary.leaders += 1,
            ServingRole::Member => summary.members += 1,
            ServingRole::Assistant | ServingRole::Unknown => summary.assistants += 1,
        }
    }
    tracing::trace!(nodes = nodes.len(), people = summary.total_serving, "serving summary");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_all;
    use crate::ir::{GroupRecord, Member};

    fn member(id: i64, name: Option<&str>, role: Option<&str>) -> Member {
        Member {
            id,
            role: role.map(str::to_string),
            full_name: name.map(str::to_string),
        }
    }

    fn graph() -> GraphModel {
        let mut worship = GroupRecord::new(1, "Worship", None);
        worship.members = vec![
            member(1, Some("Ada Lovelace"), Some("Member")),
            member(2, Some("Grace Hopper"), Some("Leader")),
            member(3, Some("Alan Turing"), None),
        ];
        let mut media = GroupRecord::new(2, "Media", Some(1));
        media.members = vec![
            member(1, Some("Ada Lovelace"), Some("Assistant")),
            member(2, Some("Grace Hopper"), Some("Member")),
            member(4, Some("Edsger Dijkstra"), Some("Member")),
            member(5, None, Some("Leader")),
            member(6, Some("  "), Some("Leader")),
        ];
        build_all(&[worship, media])
    }

    #[test]
    fn roles_rank_by_priority() {
        assert!(ServingRole::Leader > ServingRole::Assistant);
        assert!(ServingRole::Assistant > ServingRole::Member);
        assert!(ServingRole::Member > ServingRole::Unknown);
        assert_eq!(ServingRole::from_role(Some(" leader ")), ServingRole::Leader);
        assert_eq!(ServingRole::from_role(Some("Coach")), ServingRole::Unknown);
        assert_eq!(ServingRole::from_role(None), ServingRole::Unknown);
    }

    #[test]
    fn people_count_once_under_their_highest_role() {
        let summary = summarize(&graph(), None);
        assert_eq!(
            summary,
            ServingSummary {
                total_serving: 4,
                leaders: 1,
                assistants: 2,
                members: 1,
            }
        );
    }

    #[test]
    fn selection_limits_the_counted_groups() {
        let summary = summarize(&graph(), Some(&["group-2"][..]));
        assert_eq!(summary.total_serving, 3);
        assert_eq!(summary.assistants, 1);
        assert_eq!(summary.members, 2);
        assert_eq!(summary.leaders, 0);
    }

    #[test]
    fn empty_selection_counts_everything() {
        assert_eq!(summarize(&graph(), Some(&[][..])), summarize(&graph(), None));
        assert_eq!(summarize(&GraphModel::empty(), None), ServingSummary::default());
    }

    #[test]
    fn summary_serializes_camel_case() {
        let json = serde_json::to_value(summarize(&graph(), None)).unwrap();
        assert_eq!(json["totalServing"], 4);
        assert_eq!(json["leaders"], 1);
    }
}
