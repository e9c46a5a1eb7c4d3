//! Country flag emoji lookup.

/// Shown for countries without an entry.
pub const DEFAULT_FLAG: &str = "🏳️";

/// Flag emoji for a country display name, as spelled in the ranking data.
pub fn flag_for(country: &str) -> &'static str {
    match country {
        "United States" => "🇺🇸",
        "United Kingdom" => "🇬🇧",
        "China (Mainland)" => "🇨🇳",
        "Japan" => "🇯🇵",
        "Germany" => "🇩🇪",
        "France" => "🇫🇷",
        "Canada" => "🇨🇦",
        "Australia" => "🇦🇺",
        "Netherlands" => "🇳🇱",
        "Switzerland" => "🇨🇭",
        "Sweden" => "🇸🇪",
        "Italy" => "🇮🇹",
        "South Korea" => "🇰🇷",
        "Hong Kong SAR" => "🇭🇰",
        "Singapore" => "🇸🇬",
        "Belgium" => "🇧🇪",
        "Denmark" => "🇩🇰",
        "Finland" => "🇫🇮",
        "Norway" => "🇳🇴",
        "Austria" => "🇦🇹",
        "Spain" => "🇪🇸",
        "Ireland" => "🇮🇪",
        "Brazil" => "🇧🇷",
        "Argentina" => "🇦🇷",
        "Chile" => "🇨🇱",
        "Mexico" => "🇲🇽",
        "Russia" => "🇷🇺",
        "India" => "🇮🇳",
        "Malaysia" => "🇲🇾",
        "Taiwan" => "🇹🇼",
        "New Zealand" => "🇳🇿",
        "South Africa" => "🇿🇦",
        "Qatar" => "🇶🇦",
        "Saudi Arabia" => "🇸🇦",
        _ => DEFAULT_FLAG,
    }
}
