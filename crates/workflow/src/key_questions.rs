//! The default key-question catalogue tracked during requirement gathering.

use plancraft_core::{KeyQuestion, KeyQuestions};

/// `(category, what a complete answer covers)`.
pub const CATALOGUE: [(&str, &str); 7] = [
    ("room_types", "Which rooms are needed and how many of each"),
    (
        "occupants",
        "How many people will live here, household makeup, and future plans",
    ),
    (
        "lifestyle",
        "Social versus private space, cooking habits, working from home",
    ),
    (
        "space_preferences",
        "Open or enclosed spaces, daylight requirements",
    ),
    ("functional_needs", "Dedicated storage, hobby spaces"),
    ("environment", "Noise sensitivity, outdoor space such as a balcony"),
    ("other", "Any remaining special requirements"),
];

/// Every catalogue category, all starting `unknown`.
pub fn default_key_questions() -> KeyQuestions {
    KeyQuestions::new(
        CATALOGUE
            .iter()
            .map(|(category, details)| KeyQuestion::unknown(*category, *details))
            .collect(),
    )
}

/// Whether `category` names a catalogue entry.
pub fn is_known_category(category: &str) -> bool {
    CATALOGUE.iter().any(|(c, _)| *c == category)
}
