//! Closed vocabularies for the categorical columns.
//!
//! Order matters for the UI only: the first entry is the selector default.

pub const WORKCLASS: &[&str] = &[
    "Private",
    "Self-emp-not-inc",
    "Self-emp-inc",
    "Federal-gov",
    "Local-gov",
    "State-gov",
    "Without-pay",
    "Never-worked",
];

pub const EDUCATION: &[&str] = &[
    "Preschool",
    "1st-4th",
    "5th-6th",
    "7th-8th",
    "9th",
    "10th",
    "11th",
    "12th",
    "HS-grad",
    "Some-college",
    "Assoc-voc",
    "Assoc-acdm",
    "Bachelors",
    "Masters",
    "Prof-school",
    "Doctorate",
];

pub const MARITAL_STATUS: &[&str] = &[
    "Married-civ-spouse",
    "Divorced",
    "Never-married",
    "Separated",
    "Widowed",
    "Married-spouse-absent",
    "Married-AF-spouse",
];

pub const OCCUPATION: &[&str] = &[
    "Tech-support",
    "Craft-repair",
    "Other-service",
    "Sales",
    "Exec-managerial",
    "Prof-specialty",
    "Handlers-cleaners",
    "Machine-op-inspct",
    "Adm-clerical",
    "Farming-fishing",
    "Transport-moving",
    "Priv-house-serv",
    "Protective-serv",
    "Armed-Forces",
];

pub const RELATIONSHIP: &[&str] = &[
    "Wife",
    "Own-child",
    "Husband",
    "Not-in-family",
    "Other-relative",
    "Unmarried",
];

pub const RACE: &[&str] = &["White", "Asian-Pac-Islander", "Amer-Indian-Eskimo", "Other", "Black"];

pub const SEX: &[&str] = &["Male", "Female"];

pub const NATIVE_COUNTRY: &[&str] = &[
    "United-States",
    "India",
    "Mexico",
    "Philippines",
    "Germany",
    "Canada",
    "China",
    "Japan",
    "England",
    "Italy",
    "France",
];
