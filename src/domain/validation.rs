use crate::domain::Registration;
use unicode_segmentation::UnicodeSegmentation;

/// Runs every step of the form through its validator, in the order the user fills them in:
/// eligibility, contact details, about you and consent.
///
/// The returned messages keep that order. An empty `Vec` means the registration can be stored;
/// anything else must be shown back to the user in full, so that all the mistakes can be fixed in a
/// single round trip.
pub fn validate_submission(registration: &Registration) -> Vec<String> {
    let mut errors = validate_eligibility(registration);
    errors.extend(validate_contact(registration));
    errors.extend(validate_about_you(registration));
    errors.extend(validate_consent(registration));
    errors
}

pub fn validate_eligibility(registration: &Registration) -> Vec<String> {
    let mut errors = Vec::new();
    if !registration.can_attend {
        errors.push("You must confirm you can attend all dates.".to_string());
    }
    if !registration.is_eligible {
        errors.push("You must confirm you are eligible to attend.".to_string());
    }
    errors
}

pub fn validate_contact(registration: &Registration) -> Vec<String> {
    let mut errors = Vec::new();
    require(&mut errors, &registration.first_name, "First name");
    require(&mut errors, &registration.last_name, "Last name");
    // The only email rule is the presence of an `@`.
    if !is_present(&registration.email) || !registration.email.contains('@') {
        errors.push("A valid email address is required.".to_string());
    }
    require(&mut errors, &registration.phone, "Phone number");
    require(&mut errors, &registration.address1, "Address line 1");
    require(&mut errors, &registration.city, "City");
    require(&mut errors, &registration.post_code, "Post code");
    errors
}

pub fn validate_about_you(registration: &Registration) -> Vec<String> {
    let mut errors = Vec::new();
    require_answer(&mut errors, &registration.gender, "Gender");
    require_answer(&mut errors, &registration.dob_day, "Day of birth");
    require_answer(&mut errors, &registration.dob_month, "Month of birth");
    if !is_present(&registration.dob_year) {
        errors.push("Year of birth is required.".to_string());
    } else if !is_four_digit_year(&registration.dob_year) {
        errors.push("Please enter a valid 4-digit year.".to_string());
    }
    require_answer(&mut errors, &registration.ethnicity, "Ethnic group");
    require_answer(&mut errors, &registration.disability, "Disability status");
    require_answer(&mut errors, &registration.nhs_satisfaction, "NHS satisfaction response");
    require_answer(&mut errors, &registration.education, "Educational qualification");
    errors
}

pub fn validate_consent(registration: &Registration) -> Vec<String> {
    let mut errors = Vec::new();
    if !registration.data_consent {
        errors.push("You must consent to the use of your data.".to_string());
    }
    errors
}

/// Free text counts as missing when it is blank once trimmed.
fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn require(errors: &mut Vec<String>, value: &str, label: &str) {
    if !is_present(value) {
        errors.push(format!("{label} is required."));
    }
}

/// Answers picked from a list, and the day and month of birth, only need to have been sent.
fn require_answer(errors: &mut Vec<String>, value: &str, label: &str) {
    if value.is_empty() {
        errors.push(format!("{label} is required."));
    }
}

/// Exactly four user-perceived characters, each of them an ASCII digit.
fn is_four_digit_year(value: &str) -> bool {
    let value = value.trim();
    value.graphemes(true).count() == 4 && value.chars().all(|c| c.is_ascii_digit())
}
