pub mod code_sets;
mod registration;
mod validation;

pub use registration::Registration;
pub use validation::{
    validate_about_you, validate_consent, validate_contact, validate_eligibility,
    validate_submission,
};
