//! Category tags and their German display labels.

/// Known category tags with their display labels.
///
/// The tag vocabulary is open; tags outside this table display as-is.
pub const KNOWN_CATEGORIES: &[(&str, &str)] = &[
    ("women", "Damen"),
    ("men", "Herren"),
    ("accessories", "Accessoires"),
    ("beauty", "Beauty"),
    ("unisex", "Unisex"),
];

/// Display label for a category tag.
pub fn category_label(tag: &str) -> &str {
    KNOWN_CATEGORIES
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, label)| *label)
        .unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(category_label("women"), "Damen");
        assert_eq!(category_label("accessories"), "Accessoires");
    }

    #[test]
    fn test_unknown_tag_displays_as_is() {
        assert_eq!(category_label("kids"), "kids");
    }
}
