/// Numeric value of a free-text discount.
///
/// Takes the first maximal run of ASCII digits ("Bis zu 50%" is 50, "30,5%"
/// is 30). Text without digits is 0; a run too long for `u32` saturates.
pub fn extract_discount(text: &str) -> u32 {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())
        .map(|run| run.parse().unwrap_or(u32::MAX))
        .unwrap_or(0)
}
