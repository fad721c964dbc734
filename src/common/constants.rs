/// Canonical bronze field names. Each populated field is exposed as
/// `{field}_raw` / `{field}_source` in the flat mapping.
pub const THC_CONTENT: &str = "thc_content";
pub const CBD_CONTENT: &str = "cbd_content";
pub const FLOWERING_TIME: &str = "flowering_time";
pub const HEIGHT: &str = "height";
pub const YIELD: &str = "yield";
pub const GENETICS: &str = "genetics";
pub const EFFECTS: &str = "effects";
pub const FLAVORS: &str = "flavors";
pub const DESCRIPTION: &str = "description";
pub const RATING_VISUAL: &str = "rating_visual";
pub const DIFFICULTY: &str = "difficulty";
pub const META_DESCRIPTION: &str = "meta_description";
pub const PAGE_TITLE: &str = "page_title";
pub const STRUCTURED_NAME: &str = "structured_name";
pub const STRUCTURED_DESCRIPTION: &str = "structured_description";
pub const EFFECTS_CONTEXT: &str = "effects_context";
pub const FLAVORS_CONTEXT: &str = "flavors_context";
pub const GROWING_CONTEXT: &str = "growing_context";

pub const RAW_SUFFIX: &str = "_raw";
pub const SOURCE_SUFFIX: &str = "_source";

// Provenance labels
pub const SOURCE_DESCRIPTIONS: &str = "Product descriptions";
pub const SOURCE_DESCRIPTION_CONTEXT: &str = "Description context";
pub const SOURCE_PATTERN: &str = "Pattern matching";
pub const SOURCE_IMAGE_ALT: &str = "Image alt text";
pub const SOURCE_VISUAL_ELEMENTS: &str = "Visual elements";
pub const SOURCE_VISUAL_INDICATOR: &str = "Visual indicator";
pub const SOURCE_META_TAG: &str = "HTML meta tag";
pub const SOURCE_TITLE_TAG: &str = "HTML title tag";
pub const SOURCE_JSON_LD: &str = "JSON-LD structured data";
pub const SOURCE_UNKNOWN: &str = "Unknown";

pub fn table_source(table_number: usize) -> String {
    format!("Table {}", table_number)
}

/// A table needs at least this many of these words to count as a spec table
pub const SPEC_TABLE_KEYWORDS: &[&str] = &[
    "thc", "cbd", "flowering", "height", "yield", "genetics", "sativa", "indica",
];
pub const SPEC_TABLE_MIN_KEYWORDS: usize = 2;

/// Table label synonyms, checked in order; the first field with a matching
/// substring claims the row.
pub const TABLE_FIELD_SYNONYMS: &[(&str, &[&str])] = &[
    (THC_CONTENT, &["thc", "thc content", "thc level", "thc %", "thc percentage"]),
    (CBD_CONTENT, &["cbd", "cbd content", "cbd level", "cbd %", "cbd percentage"]),
    (
        FLOWERING_TIME,
        &["flowering time", "flowering period", "flower time", "bloom time", "flowering"],
    ),
    (HEIGHT, &["height", "plant height", "size", "grows to", "tall"]),
    (YIELD, &["yield", "harvest", "production", "output"]),
    (
        GENETICS,
        &["genetics", "genetic background", "lineage", "breeding", "cross"],
    ),
    (EFFECTS, &["effects", "effect", "high", "buzz"]),
    (FLAVORS, &["flavor", "flavour", "taste", "aroma", "smell"]),
];

pub const DESCRIPTION_SELECTORS: &[&str] = &[
    ".product-description",
    ".strain-description",
    ".description",
    ".product-details",
    ".strain-info",
    ".product-content",
    "[class*=\"description\"]",
    "[class*=\"details\"]",
];

pub const EFFECT_KEYWORDS: &[&str] = &[
    "relaxing", "euphoric", "uplifting", "energetic", "creative", "focused", "happy", "sleepy",
];
pub const FLAVOR_KEYWORDS: &[&str] = &[
    "citrus", "lemon", "berry", "sweet", "earthy", "pine", "diesel", "fruity",
];
pub const GROWING_KEYWORDS: &[&str] = &[
    "indoor", "outdoor", "hydro", "soil", "climate", "temperature",
];

/// Sentence-context categories mined from descriptions, in scan order
pub const CONTEXT_CATEGORIES: &[(&str, &[&str])] = &[
    (EFFECTS_CONTEXT, EFFECT_KEYWORDS),
    (FLAVORS_CONTEXT, FLAVOR_KEYWORDS),
    (GROWING_CONTEXT, GROWING_KEYWORDS),
];

/// Effect keyword -> canonical label, in output order
pub const EFFECT_LABELS: &[(&str, &str)] = &[
    ("relaxing", "Relaxed"),
    ("euphoric", "Euphoric"),
    ("uplifting", "Uplifted"),
    ("energetic", "Energetic"),
    ("creative", "Creative"),
    ("focused", "Focused"),
    ("happy", "Happy"),
    ("sleepy", "Sleepy"),
];

/// Flavor keyword -> canonical label, in output order
pub const FLAVOR_LABELS: &[(&str, &str)] = &[
    ("citrus", "Citrus"),
    ("lemon", "Lemon"),
    ("orange", "Orange"),
    ("berry", "Berry"),
    ("sweet", "Sweet"),
    ("earthy", "Earthy"),
    ("pine", "Pine"),
    ("diesel", "Diesel"),
    ("skunk", "Skunk"),
    ("fruity", "Fruity"),
];

/// Bronze fields that drive the confidence score and their weights
pub const CONFIDENCE_WEIGHTS: &[(&str, u32)] = &[
    (HEIGHT, 2),
    (FLOWERING_TIME, 3),
    (THC_CONTENT, 3),
    (CBD_CONTENT, 2),
    (GENETICS, 2),
    (EFFECTS, 1),
    (FLAVORS, 1),
];

/// Dataset column carrying the human-readable cultivar name
pub const STRAIN_NAME_COLUMN: &str = "strain_name";
