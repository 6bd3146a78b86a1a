use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::graph::{GraphModel, NodeKind};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Nodes whose requirement title or tag name fuzzily matches `query`.
pub(in crate::app) fn search_matches(model: &GraphModel, query: &str) -> HashSet<usize> {
    let query = query.trim();
    if query.is_empty() {
        return HashSet::new();
    }

    let matcher = SkimMatcherV2::default();
    model
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let text = match &node.kind {
                NodeKind::Requirement { title, .. } => title.as_str(),
                NodeKind::Tag { name, .. } => name.as_str(),
            };
            fuzzy_match_score(&matcher, text, query).map(|_| index)
        })
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = Arc::new(search_matches(&self.model, query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build_graph_model;
    use crate::colors::ColorAssigner;
    use crate::requirements::Entity;

    fn sample_model() -> GraphModel {
        build_graph_model(
            &[
                Entity::new("1", "Login screen").with_tags(&["UI"]),
                Entity::new("2", "Export report").with_tags(&["Reporting"]),
            ],
            &ColorAssigner::new(Some(3)),
            300.0,
        )
    }

    #[test]
    fn matches_titles_and_tag_names() {
        let model = sample_model();

        let login = search_matches(&model, "lgn");
        assert!(login.contains(&model.index_by_id["req:1"]));
        assert!(!login.contains(&model.index_by_id["req:2"]));

        let reporting = search_matches(&model, "report");
        assert!(reporting.contains(&model.index_by_id["req:2"]));
        assert!(reporting.contains(&model.index_by_id["tag:Reporting"]));

        let ui = search_matches(&model, "ui");
        assert!(ui.contains(&model.index_by_id["tag:UI"]));
    }

    #[test]
    fn blank_or_unmatched_query_matches_nothing() {
        let model = sample_model();
        assert!(search_matches(&model, "   ").is_empty());
        assert!(search_matches(&model, "zzqx").is_empty());
    }
}
