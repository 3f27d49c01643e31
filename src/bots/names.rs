//! Bot display names.
//!
//! Drawn in order per session, suffixed once the table runs out so names
//! stay unique within a roster.

const NAMES: &[&str] = &[
    "Chip", "Pixel", "Gizmo", "Widget", "Sprocket", "Byte", "Echo", "Nova",
    "Zippy", "Cog", "Bolt", "Dot", "Rune", "Quark", "Blip", "Fizz",
];

/// Name for the `index`-th bot admitted to a session.
#[must_use]
pub fn bot_name(index: usize) -> String {
    let base = NAMES[index % NAMES.len()];
    if index < NAMES.len() {
        base.to_string()
    } else {
        format!("{}{}", base, index / NAMES.len() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_unique_across_wraps() {
        let mut names: Vec<String> = (0..40).map(bot_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 40);
    }

    #[test]
    fn test_first_names_have_no_suffix() {
        assert_eq!(bot_name(0), "Chip");
        assert_eq!(bot_name(15), "Fizz");
        assert_eq!(bot_name(16), "Chip2");
    }
}
