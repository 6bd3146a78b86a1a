//! Name to color lookup shared by the graph and the tag chips.
//!
//! Names that mention a known category (priority levels, requirement kinds)
//! always map to that category's color. Any other name gets a color drawn
//! from [`PALETTE`] the first time it is seen and keeps it for the lifetime
//! of the assigner. Lookups ignore case.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use eframe::egui::Color32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct CategoryRule {
    needle: &'static str,
    color: Color32,
}

// Ordered: the first matching needle wins, so longer needles that contain
// shorter ones come first.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        needle: "critical",
        color: Color32::from_rgb(183, 28, 28),
    },
    CategoryRule {
        needle: "high",
        color: Color32::from_rgb(229, 57, 53),
    },
    CategoryRule {
        needle: "medium",
        color: Color32::from_rgb(251, 140, 0),
    },
    CategoryRule {
        needle: "low",
        color: Color32::from_rgb(67, 160, 71),
    },
    CategoryRule {
        needle: "non-functional",
        color: Color32::from_rgb(94, 53, 177),
    },
    CategoryRule {
        needle: "functional",
        color: Color32::from_rgb(30, 136, 229),
    },
    CategoryRule {
        needle: "security",
        color: Color32::from_rgb(216, 27, 96),
    },
    CategoryRule {
        needle: "performance",
        color: Color32::from_rgb(0, 137, 123),
    },
    CategoryRule {
        needle: "usability",
        color: Color32::from_rgb(124, 179, 66),
    },
    CategoryRule {
        needle: "compliance",
        color: Color32::from_rgb(109, 76, 65),
    },
];

pub const PALETTE: [Color32; 12] = [
    Color32::from_rgb(66, 133, 244),
    Color32::from_rgb(171, 71, 188),
    Color32::from_rgb(38, 166, 154),
    Color32::from_rgb(255, 167, 38),
    Color32::from_rgb(236, 64, 122),
    Color32::from_rgb(141, 110, 99),
    Color32::from_rgb(92, 107, 192),
    Color32::from_rgb(156, 204, 101),
    Color32::from_rgb(41, 182, 246),
    Color32::from_rgb(255, 112, 67),
    Color32::from_rgb(120, 144, 156),
    Color32::from_rgb(212, 225, 87),
];

struct PaletteState {
    cache: HashMap<String, Color32>,
    used: HashSet<usize>,
    rng: StdRng,
}

/// Process-wide color service. Construct once and hand out `Rc` clones.
pub struct ColorAssigner {
    state: RefCell<PaletteState>,
}

impl ColorAssigner {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: RefCell::new(PaletteState {
                cache: HashMap::new(),
                used: HashSet::new(),
                rng,
            }),
        }
    }

    pub fn color_for(&self, name: &str) -> Color32 {
        let key = name.to_lowercase();

        if let Some(rule) = CATEGORY_RULES
            .iter()
            .find(|rule| key.contains(rule.needle))
        {
            return rule.color;
        }

        let mut state = self.state.borrow_mut();
        if let Some(color) = state.cache.get(&key) {
            return *color;
        }

        let mut available = (0..PALETTE.len())
            .filter(|index| !state.used.contains(index))
            .collect::<Vec<_>>();
        if available.is_empty() {
            state.used.clear();
            available = (0..PALETTE.len()).collect();
        }

        let pick = available[state.rng.gen_range(0..available.len())];
        state.used.insert(pick);
        let color = PALETTE[pick];
        state.cache.insert(key, color);
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_any_case_gets_same_color() {
        let colors = ColorAssigner::new(Some(7));
        let first = colors.color_for("Dashboard");
        assert_eq!(colors.color_for("dashboard"), first);
        assert_eq!(colors.color_for("DASHBOARD"), first);
        assert_eq!(colors.color_for("Dashboard"), first);
    }

    #[test]
    fn category_rules_win_and_ignore_case() {
        let colors = ColorAssigner::new(Some(1));
        assert_eq!(colors.color_for("Security"), colors.color_for("security"));
        assert_eq!(colors.color_for("High Priority"), CATEGORY_RULES[1].color);
        assert_eq!(colors.color_for("Non-Functional"), CATEGORY_RULES[4].color);
        assert_eq!(colors.color_for("functional"), CATEGORY_RULES[5].color);
        assert!(colors.state.borrow().cache.is_empty());
    }

    #[test]
    fn category_needles_match_inside_longer_names() {
        let colors = ColorAssigner::new(Some(1));
        assert_eq!(colors.color_for("Workflow"), CATEGORY_RULES[3].color);
        assert_eq!(colors.color_for("Highlighting"), CATEGORY_RULES[1].color);
    }

    #[test]
    fn palette_is_used_up_before_repeating() {
        let colors = ColorAssigner::new(Some(42));
        let issued = (0..PALETTE.len())
            .map(|index| colors.color_for(&format!("tag-{index}")))
            .collect::<HashSet<_>>();
        assert_eq!(issued.len(), PALETTE.len());
    }

    #[test]
    fn exhausted_palette_starts_a_new_cycle() {
        let colors = ColorAssigner::new(Some(3));
        for index in 0..PALETTE.len() {
            colors.color_for(&format!("tag-{index}"));
        }
        assert_eq!(colors.state.borrow().used.len(), PALETTE.len());

        let extra = colors.color_for("one-more");
        assert!(PALETTE.contains(&extra));
        assert_eq!(colors.state.borrow().used.len(), 1);
        assert_eq!(colors.color_for("tag-0"), colors.color_for("TAG-0"));
    }
}
