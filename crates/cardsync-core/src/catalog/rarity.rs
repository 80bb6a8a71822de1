/// Translate a catalog rarity label into the local rarity name.
///
/// Labels without a translation pass through unchanged.
pub fn local_rarity(label: &str) -> &str {
    match label {
        "One Diamond" => "Common",
        "Two Diamond" => "Uncommon",
        "Three Diamond" => "Rare",
        "Four Diamond" => "Double Rare",
        "One Star" => "Art Rare",
        "Two Star" => "Special Art Rare",
        "Three Star" => "Immersive Rare",
        "One Shiny" => "Shiny Rare",
        "Two Shiny" => "Double Shiny Rare",
        "Crown" => "Crown Rare",
        other => other,
    }
}
