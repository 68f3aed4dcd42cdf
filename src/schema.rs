//! Column schema for the smartwatch telemetry table.
//!
//! Everything the pipeline knows about the input columns lives here as static
//! tables: the semantic type and coercion policy of each column, the
//! physiological range checks, and the Activity Level spelling corrections.

/// Literal token the source data uses to mark a bad reading.
pub const ERROR_TOKEN: &str = "ERROR";

/// Raw tokens read as missing values when loading the CSV. Matched against
/// the whole cell, case-sensitively.
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub const USER_ID: &str = "User ID";
pub const HEART_RATE: &str = "Heart Rate (BPM)";
pub const STEP_COUNT: &str = "Step Count";
pub const BLOOD_OXYGEN: &str = "Blood Oxygen Level (%)";
pub const SLEEP_DURATION: &str = "Sleep Duration (hours)";
pub const STRESS_LEVEL: &str = "Stress Level";
pub const ACTIVITY_LEVEL: &str = "Activity Level";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Integer,
    Float,
    Categorical,
}

/// What to do with a value that does not parse as the column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionPolicy {
    /// Replace the value with a missing marker.
    Coerce,
    /// Abort the pipeline.
    Strict,
    /// Leave the raw text untouched.
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: SemanticType,
    pub policy: CoercionPolicy,
}

impl ColumnSpec {
    const fn new(name: &'static str, kind: SemanticType, policy: CoercionPolicy) -> Self {
        Self { name, kind, policy }
    }
}

/// Required columns, in the order the CSV header lists them.
pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new(USER_ID, SemanticType::Integer, CoercionPolicy::Strict),
    ColumnSpec::new(HEART_RATE, SemanticType::Float, CoercionPolicy::Coerce),
    ColumnSpec::new(BLOOD_OXYGEN, SemanticType::Float, CoercionPolicy::Coerce),
    ColumnSpec::new(STEP_COUNT, SemanticType::Float, CoercionPolicy::Coerce),
    ColumnSpec::new(SLEEP_DURATION, SemanticType::Float, CoercionPolicy::Coerce),
    ColumnSpec::new(ACTIVITY_LEVEL, SemanticType::Categorical, CoercionPolicy::Keep),
    ColumnSpec::new(STRESS_LEVEL, SemanticType::Float, CoercionPolicy::Coerce),
];

/// Inclusive bounds for one numeric column. `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRule {
    pub column: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeRule {
    pub fn violates(&self, value: f64) -> bool {
        self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max)
    }
}

/// A named group of rules removed together, reported as one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeCheck {
    pub label: &'static str,
    pub rules: &'static [RangeRule],
}

pub const RANGE_CHECKS: &[RangeCheck] = &[
    RangeCheck {
        label: "HEART RATE CHECK",
        rules: &[RangeRule {
            column: HEART_RATE,
            min: Some(30.0),
            max: Some(220.0),
        }],
    },
    RangeCheck {
        label: "BLOOD OXY CHECK",
        rules: &[RangeRule {
            column: BLOOD_OXYGEN,
            min: None,
            max: Some(100.0),
        }],
    },
    RangeCheck {
        label: "NEG VALS CHECK",
        rules: &[
            RangeRule {
                column: STEP_COUNT,
                min: Some(0.0),
                max: None,
            },
            RangeRule {
                column: SLEEP_DURATION,
                min: Some(0.0),
                max: None,
            },
        ],
    },
];

/// Misspelled Activity Level labels and their corrections.
pub const ACTIVITY_CORRECTIONS: &[(&str, &str)] = &[
    ("Actve", "Active"),
    ("Highly Active", "Highly_Active"),
    ("Seddentary", "Sedentary"),
];

/// Labels expected after correction. Others are kept but logged.
pub const KNOWN_ACTIVITY_LEVELS: &[&str] = &["Sedentary", "Active", "Highly_Active"];

pub fn column_names() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().map(|spec| spec.name)
}
