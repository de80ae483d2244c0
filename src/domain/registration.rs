use serde::{Deserialize, Serialize};

/// A single registration as submitted through the multi-step form.
///
/// The struct carries no invariant of its own: every field can be empty. It is the raw projection
/// of what the browser sent, with contact details and the year of birth trimmed and checkboxes
/// turned into booleans. Deciding
/// whether the registration is acceptable is the job of [`validate_submission`].
///
/// Field names are serialised in camelCase, matching both the form field names and the keys of the
/// records in the submissions file. A field missing from a stored record reads back as empty or
/// `false`.
///
/// [`validate_submission`]: crate::domain::validate_submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Registration {
    // Eligibility
    pub can_attend: bool,
    pub is_eligible: bool,
    // Contact details
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub post_code: String,
    // About you
    pub gender: String,
    pub dob_day: String,
    pub dob_month: String,
    pub dob_year: String,
    pub ethnicity: String,
    pub disability: String,
    pub nhs_satisfaction: String,
    pub education: String,
    // Consent
    pub data_consent: bool,
    pub future_contact: bool,
}
