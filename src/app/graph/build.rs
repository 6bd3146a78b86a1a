use std::collections::{HashMap, HashSet};

use eframe::egui::{Vec2, vec2};
use tracing::{info, warn};

use crate::colors::ColorAssigner;
use crate::requirements::Entity;

use super::super::ViewModel;
use super::{
    GraphEdge, GraphModel, GraphNode, NodeKind, REQUIREMENT_PREFIX, SourceGroup, TAG_PREFIX,
};

fn source_anchor(index: usize, group_count: usize, radius: f32) -> Vec2 {
    if group_count <= 1 {
        return Vec2::ZERO;
    }

    let angle = (index as f32 / group_count as f32) * std::f32::consts::TAU
        - std::f32::consts::FRAC_PI_2;
    vec2(angle.cos(), angle.sin()) * radius
}

pub(in crate::app) fn build_graph_model(
    entities: &[Entity],
    colors: &ColorAssigner,
    anchor_radius: f32,
) -> GraphModel {
    let mut model = GraphModel::default();
    if entities.is_empty() {
        return model;
    }

    let mut group_by_document: HashMap<&str, usize> = HashMap::new();
    let mut documents: Vec<&str> = Vec::new();
    let mut memberships: Vec<(usize, Vec<&str>)> = Vec::with_capacity(entities.len());
    let mut seen_entities = HashSet::new();

    for entity in entities {
        if !seen_entities.insert(entity.id.as_str()) {
            warn!(entity = %entity.id, "skipping requirement with duplicate id");
            continue;
        }

        let document = entity.source_document();
        let group = *group_by_document.entry(document).or_insert_with(|| {
            documents.push(document);
            documents.len() - 1
        });

        let index = model.nodes.len();
        let id = format!("{REQUIREMENT_PREFIX}{}", entity.id);
        model.index_by_id.insert(id.clone(), index);
        model.nodes.push(GraphNode {
            id,
            label: entity.title.clone(),
            kind: NodeKind::Requirement {
                entity_id: entity.id.clone(),
                title: entity.title.clone(),
                source_document: document.to_owned(),
                group,
            },
        });

        let tag_names = entity.tags.iter().map(|tag| tag.name.as_str()).collect();
        memberships.push((index, tag_names));
    }

    model.groups = documents
        .iter()
        .enumerate()
        .map(|(index, document)| SourceGroup {
            document: (*document).to_owned(),
            color: colors.color_for(document),
            anchor: source_anchor(index, documents.len(), anchor_radius),
            members: Vec::new(),
        })
        .collect();

    for (requirement, tag_names) in &memberships {
        for name in tag_names {
            let tag_id = format!("{TAG_PREFIX}{name}");
            let tag = match model.index_by_id.get(&tag_id) {
                Some(&existing) => existing,
                None => {
                    let index = model.nodes.len();
                    model.index_by_id.insert(tag_id.clone(), index);
                    model.nodes.push(GraphNode {
                        id: tag_id,
                        label: (*name).to_owned(),
                        kind: NodeKind::Tag {
                            name: (*name).to_owned(),
                            color: colors.color_for(name),
                        },
                    });
                    index
                }
            };

            model.edges.push(GraphEdge::HasTag {
                source: *requirement,
                target: tag,
            });
        }
    }

    for node in 0..model.nodes.len() {
        if let Some(group) = model.group_of(node) {
            model.groups[group].members.push(node);
        }
    }

    for (group_index, group) in model.groups.iter().enumerate() {
        let members = &group.members;
        for (offset, &a) in members.iter().enumerate() {
            for &b in &members[offset + 1..] {
                model.edges.push(GraphEdge::SameSource {
                    a,
                    b,
                    group: group_index,
                });
            }
        }
    }

    model.tags_of = vec![Vec::new(); model.nodes.len()];
    model.members_of = vec![Vec::new(); model.nodes.len()];
    model.incident = vec![Vec::new(); model.nodes.len()];
    for (edge_index, edge) in model.edges.iter().enumerate() {
        let (from, to) = edge.endpoints();
        model.incident[from].push(edge_index);
        model.incident[to].push(edge_index);
        if let GraphEdge::HasTag { source, target } = *edge
            && !model.tags_of[source].contains(&target)
        {
            model.tags_of[source].push(target);
            model.members_of[target].push(source);
        }
    }

    model
}

impl ViewModel {
    pub(in crate::app) fn rebuild_graph(&mut self) {
        if let Some(mut previous) = self.simulation.take() {
            previous.stop();
        }

        self.graph_revision = self.graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.interaction = Default::default();
        self.model = build_graph_model(
            &self.entities,
            &self.colors,
            self.layout_config.anchor_radius,
        );

        info!(
            requirements = self.entities.len(),
            nodes = self.model.nodes.len(),
            edges = self.model.edges.len(),
            sources = self.model.groups.len(),
            "rebuilt requirement graph"
        );

        if !self.model.is_empty() {
            self.simulation = Some(self.layout.start(&self.model, self.layout_config));
        }
        self.graph_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::UNKNOWN_SOURCE;

    fn build(entities: &[Entity]) -> GraphModel {
        build_graph_model(entities, &ColorAssigner::new(Some(11)), 300.0)
    }

    fn edge_pairs(model: &GraphModel) -> Vec<(String, String)> {
        model
            .edges
            .iter()
            .map(|edge| {
                let (a, b) = edge.endpoints();
                (model.nodes[a].id.clone(), model.nodes[b].id.clone())
            })
            .collect()
    }

    #[test]
    fn empty_input_gives_empty_model() {
        let model = build(&[]);
        assert!(model.is_empty());
        assert!(model.edges.is_empty());
        assert!(model.groups.is_empty());
    }

    #[test]
    fn two_requirements_sharing_tag_and_document() {
        let model = build(&[
            Entity::new("1", "Login").with_tags(&["UI"]).with_source("doc1"),
            Entity::new("2", "Profile").with_tags(&["UI"]).with_source("doc1"),
        ]);

        let ids = model
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["req:1", "req:2", "tag:UI"]);
        assert_eq!(model.edges.len(), 3);
        assert_eq!(
            edge_pairs(&model),
            [
                ("req:1".to_owned(), "tag:UI".to_owned()),
                ("req:2".to_owned(), "tag:UI".to_owned()),
                ("req:1".to_owned(), "req:2".to_owned()),
            ]
        );
        assert_eq!(model.edge_document(2), Some("doc1"));
        assert_eq!(model.edge_document(0), None);
    }

    #[test]
    fn three_in_one_document_give_three_pairs() {
        let model = build(&[
            Entity::new("1", "A").with_source("doc"),
            Entity::new("2", "B").with_source("doc"),
            Entity::new("3", "C").with_source("doc"),
        ]);

        assert_eq!(model.same_source_count(), 3);
        let mut pairs = edge_pairs(&model);
        pairs.sort();
        assert_eq!(
            pairs,
            [
                ("req:1".to_owned(), "req:2".to_owned()),
                ("req:1".to_owned(), "req:3".to_owned()),
                ("req:2".to_owned(), "req:3".to_owned()),
            ]
        );
    }

    #[test]
    fn counts_follow_group_sizes_and_tag_memberships() {
        let entities = [
            Entity::new("1", "A").with_tags(&["x", "y"]).with_source("d1"),
            Entity::new("2", "B").with_tags(&["y"]).with_source("d1"),
            Entity::new("3", "C").with_tags(&["z", "X"]).with_source("d1"),
            Entity::new("4", "D").with_source("d1"),
            Entity::new("5", "E").with_tags(&["x"]).with_source("d2"),
            Entity::new("6", "F").with_source("d2"),
            Entity::new("7", "G").with_tags(&["y"]),
            Entity::new("8", "H").with_tags(&["z", "z"]).with_source("d3"),
        ];
        let model = build(&entities);

        // x, y, z and X are distinct tag names.
        assert_eq!(model.nodes.len(), entities.len() + 4);
        let memberships: usize = entities.iter().map(|entity| entity.tags.len()).sum();
        assert_eq!(model.has_tag_count(), memberships);
        // d1 has 4 members, d2 has 2, the unknown source and d3 have 1 each.
        assert_eq!(model.same_source_count(), 6 + 1);
        let z = model.index_by_id["tag:z"];
        assert_eq!(model.members_of[z].len(), 2);

        let mut unordered = HashSet::new();
        for edge in &model.edges {
            if let GraphEdge::SameSource { a, b, .. } = *edge {
                assert!(unordered.insert((a.min(b), a.max(b))));
            }
        }
    }

    #[test]
    fn node_ids_are_unique_and_edges_resolve() {
        let model = build(&[
            Entity::new("UI", "Named like a tag").with_tags(&["UI"]),
            Entity::new("2", "Other").with_tags(&["UI", "Backend"]),
        ]);

        let unique = model
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(unique.len(), model.nodes.len());
        for edge in &model.edges {
            let (a, b) = edge.endpoints();
            assert!(a < model.nodes.len() && b < model.nodes.len());
        }
        for (id, &index) in &model.index_by_id {
            assert_eq!(&model.nodes[index].id, id);
        }
    }

    #[test]
    fn missing_source_documents_cluster_together() {
        let model = build(&[
            Entity::new("1", "A"),
            Entity::new("2", "B").with_source("  "),
            Entity::new("3", "C").with_source("doc"),
        ]);

        assert_eq!(model.groups.len(), 2);
        assert_eq!(model.groups[0].document, UNKNOWN_SOURCE);
        assert_eq!(model.groups[0].members, [0, 1]);
        assert_eq!(model.same_source_count(), 1);
        assert_eq!(model.edge_document(0), Some(UNKNOWN_SOURCE));
    }

    #[test]
    fn tagless_requirement_has_no_tag_edges() {
        let model = build(&[Entity::new("1", "Lonely").with_source("doc")]);
        assert_eq!(model.nodes.len(), 1);
        assert!(model.edges.is_empty());
        assert!(model.tags_of[0].is_empty());
    }

    #[test]
    fn duplicate_ids_are_skipped_and_repeated_tags_keep_their_edges() {
        let model = build(&[
            Entity::new("1", "A").with_tags(&["UI", "UI"]),
            Entity::new("1", "A again").with_tags(&["Other"]),
        ]);

        assert_eq!(model.nodes.len(), 2);
        assert_eq!(model.has_tag_count(), 2);
        assert_eq!(model.nodes[0].label, "A");
        let ui = model.index_by_id["tag:UI"];
        assert_eq!(model.tags_of[0], [ui]);
        assert_eq!(model.members_of[ui], [0]);
        assert_eq!(model.incident[ui].len(), 2);
    }

    #[test]
    fn anchors_are_evenly_spaced_on_a_circle() {
        let model = build(&[
            Entity::new("1", "A").with_source("a"),
            Entity::new("2", "B").with_source("b"),
            Entity::new("3", "C").with_source("c"),
            Entity::new("4", "D").with_source("d"),
        ]);

        assert_eq!(model.groups.len(), 4);
        for group in &model.groups {
            assert!((group.anchor.length() - 300.0).abs() < 0.01);
        }
        let first = model.groups[0].anchor;
        let second = model.groups[1].anchor;
        assert!((first - second).length() > 300.0);

        let single = build(&[Entity::new("1", "A").with_source("only")]);
        assert_eq!(single.groups[0].anchor, Vec2::ZERO);
    }

    #[test]
    fn adjacency_tables_match_edges() {
        let model = build(&[
            Entity::new("1", "A").with_tags(&["t"]).with_source("d"),
            Entity::new("2", "B").with_tags(&["t"]).with_source("d"),
        ]);

        let tag = model.index_by_id["tag:t"];
        assert_eq!(model.members_of[tag], [0, 1]);
        assert_eq!(model.tags_of[0], [tag]);
        assert_eq!(model.incident[0].len(), 2);
        assert_eq!(model.incident[tag].len(), 2);
    }
}
