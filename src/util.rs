use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::Color32;

pub fn truncate_label(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut truncated = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>()
        .trim_end()
        .to_owned();
    truncated.push('…');
    truncated
}

pub fn color_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_labels_only() {
        assert_eq!(truncate_label("  Login  ", 10), "Login");
        assert_eq!(truncate_label("Password reset flow", 10), "Password…");
        assert_eq!(truncate_label("Ünïcödé títle", 6).chars().count(), 6);
    }

    #[test]
    fn hex_is_lowercase_rgb() {
        assert_eq!(color_hex(Color32::from_rgb(255, 16, 0)), "#ff1000");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("req:1");
        assert_eq!(first, stable_pair("req:1"));
        assert_ne!(first, stable_pair("req:2"));
        for (x, y) in [first, stable_pair("tag:UI")] {
            assert!((-1.0..=1.0).contains(&x));
            assert!((-1.0..=1.0).contains(&y));
        }
    }
}
