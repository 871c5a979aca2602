//! String inflection for the table-to-model naming convention.
//!
//! `orders` → `Order`, `line_items` → `LineItem`, `people` → `Person`.

use heck::ToUpperCamelCase;

/// Words with no distinct singular form.
const UNCOUNTABLE: &[&str] = &[
    "audio",
    "data",
    "deer",
    "equipment",
    "feedback",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
    "traffic",
];

/// Plurals that no suffix rule covers.
const IRREGULAR: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("buses", "bus"),
    ("caches", "cache"),
    ("campuses", "campus"),
    ("children", "child"),
    ("criteria", "criterion"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("halves", "half"),
    ("heroes", "hero"),
    ("indices", "index"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("matrices", "matrix"),
    ("men", "man"),
    ("mice", "mouse"),
    ("movies", "movie"),
    ("oxen", "ox"),
    ("people", "person"),
    ("potatoes", "potato"),
    ("shelves", "shelf"),
    ("statuses", "status"),
    ("teeth", "tooth"),
    ("vertices", "vertex"),
    ("viruses", "virus"),
    ("wives", "wife"),
    ("wolves", "wolf"),
    ("women", "woman"),
];

/// Suffix rules, tried in order; the first match wins.
const SUFFIXES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("sses", "ss"),
    ("shes", "sh"),
    ("ches", "ch"),
    ("xes", "x"),
    ("zzes", "zz"),
    ("ss", "ss"),
    ("us", "us"),
    ("is", "is"),
    ("s", ""),
];

/// Returns the singular form of a (snake_case) plural word.
///
/// Only the last `_`-separated segment is inflected, so `line_items` becomes
/// `line_item`. Words that are already singular come back unchanged.
#[must_use]
pub fn singular(word: &str) -> String {
    match word.rsplit_once('_') {
        Some((head, tail)) => format!("{head}_{}", singular_word(tail)),
        None => singular_word(word),
    }
}

fn singular_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return String::from(word);
    }
    if let Some((_, single)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return match_first_case(word, single);
    }
    for (suffix, replacement) in SUFFIXES {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            let stem = &word[..word.len() - suffix.len()];
            return format!("{stem}{replacement}");
        }
    }
    String::from(word)
}

/// Carries the case of the first letter of `original` over to `word`.
fn match_first_case(original: &str, word: &str) -> String {
    let mut chars = word.chars();
    match (original.chars().next(), chars.next()) {
        (Some(o), Some(first)) if o.is_ascii_uppercase() => {
            first.to_ascii_uppercase().to_string() + chars.as_str()
        }
        _ => String::from(word),
    }
}

/// Returns the studly caps form of a word: `line_item` → `LineItem`.
#[must_use]
pub fn studly(word: &str) -> String {
    word.to_upper_camel_case()
}
