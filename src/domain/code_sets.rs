//! The fixed answer sets offered by the categorical questions of the form.
//!
//! The stored value of a categorical field is always the `code`; the `label` is what the user sees.
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CodeOption {
    pub code: &'static str,
    pub label: &'static str,
}

const fn option(code: &'static str, label: &'static str) -> CodeOption {
    CodeOption { code, label }
}

pub static GENDER: &[CodeOption] = &[
    option("female", "Female"),
    option("male", "Male"),
    option("non-binary", "Non-binary"),
    option("other", "Another gender identity"),
    option("prefer-not-to-say", "Prefer not to say"),
];

pub static ETHNICITY: &[CodeOption] = &[
    option("asian", "Asian or Asian British"),
    option("black", "Black, Black British, Caribbean or African"),
    option("mixed", "Mixed or multiple ethnic groups"),
    option("white", "White"),
    option("other", "Other ethnic group"),
    option("prefer-not-to-say", "Prefer not to say"),
];

pub static DISABILITY: &[CodeOption] = &[
    option("yes", "Yes"),
    option("no", "No"),
    option("prefer-not-to-say", "Prefer not to say"),
];

pub static NHS_SATISFACTION: &[CodeOption] = &[
    option("very-satisfied", "Very satisfied"),
    option("quite-satisfied", "Quite satisfied"),
    option("neither", "Neither satisfied nor dissatisfied"),
    option("quite-dissatisfied", "Quite dissatisfied"),
    option("very-dissatisfied", "Very dissatisfied"),
];

pub static EDUCATION: &[CodeOption] = &[
    option("none", "No formal qualifications"),
    option("gcse", "GCSEs or equivalent"),
    option("a-level", "A levels or equivalent"),
    option("degree", "Undergraduate degree"),
    option("postgraduate", "Postgraduate degree"),
    option("other", "Other qualification"),
];

/// All code sets, keyed by the form field they belong to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSets {
    pub gender: &'static [CodeOption],
    pub ethnicity: &'static [CodeOption],
    pub disability: &'static [CodeOption],
    pub nhs_satisfaction: &'static [CodeOption],
    pub education: &'static [CodeOption],
}

pub static ALL: CodeSets = CodeSets {
    gender: GENDER,
    ethnicity: ETHNICITY,
    disability: DISABILITY,
    nhs_satisfaction: NHS_SATISFACTION,
    education: EDUCATION,
};
