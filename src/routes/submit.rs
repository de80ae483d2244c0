use crate::domain::{validate_submission, Registration};
use crate::session_state::TypedSession;
use crate::startup::DebugMode;
use crate::submission_store::{StoreError, SubmissionStore};
use crate::telemetry::spawn_blocking_with_tracing;
use crate::utils::{e400, e500, e500_verbose, error_chain_fmt, see_other};
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::FlashMessage;
use anyhow::Context;
use std::sync::Arc;

/// The fields posted by the registration form. Every field is optional on the wire: a missing
/// field is read as empty and left for the validators to report.
#[derive(serde::Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FormData {
    csrf_token: String,
    // Checkboxes are only sent when ticked, with the value `on`.
    can_attend: Option<String>,
    is_eligible: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    address1: String,
    address2: String,
    city: String,
    post_code: String,
    gender: String,
    dob_day: String,
    dob_month: String,
    dob_year: String,
    ethnicity: String,
    disability: String,
    nhs_satisfaction: String,
    education: String,
    data_consent: Option<String>,
    future_contact: Option<String>,
}

/// Contact details and the year of birth are free text and get trimmed. Answers picked from a list,
/// and the day and month of birth, are taken as sent.
impl From<FormData> for Registration {
    fn from(form: FormData) -> Self {
        Self {
            can_attend: is_ticked(&form.can_attend),
            is_eligible: is_ticked(&form.is_eligible),
            first_name: trimmed(form.first_name),
            last_name: trimmed(form.last_name),
            email: trimmed(form.email),
            phone: trimmed(form.phone),
            address1: trimmed(form.address1),
            address2: trimmed(form.address2),
            city: trimmed(form.city),
            post_code: trimmed(form.post_code),
            gender: form.gender,
            dob_day: form.dob_day,
            dob_month: form.dob_month,
            dob_year: trimmed(form.dob_year),
            ethnicity: form.ethnicity,
            disability: form.disability,
            nhs_satisfaction: form.nhs_satisfaction,
            education: form.education,
            data_consent: is_ticked(&form.data_consent),
            future_contact: is_ticked(&form.future_contact),
        }
    }
}

fn is_ticked(checkbox: &Option<String>) -> bool {
    checkbox.as_deref() == Some("on")
}

fn trimmed(s: String) -> String {
    s.trim().to_string()
}

#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("Failed to store the registration.")]
    StoreError(#[from] StoreError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// # Post/Redirect/Get
/// A rejected registration sends the user back to the form with one error flash message per
/// problem and its answers kept as the session draft; an accepted one is stored, the draft dropped
/// and the user lands on the confirmation page. Either way the answer is a `303 See Other`, so
/// reloading the next page never re-submits the form.
///
/// A post without the CSRF token the form was rendered with is refused with a `400` before
/// anything is validated.
///
/// Personal details stay out of the span: only the id the registration was stored under is
/// recorded.
#[tracing::instrument(
    name = "Registering a participant",
    skip(form, session, store, debug),
    fields(submission_id = tracing::field::Empty)
)]
pub async fn submit(
    form: web::Form<FormData>,
    session: TypedSession,
    store: web::Data<SubmissionStore>,
    debug: web::Data<DebugMode>,
) -> Result<HttpResponse, actix_web::Error> {
    let form = form.into_inner();
    match session.get_csrf_token().map_err(e500)? {
        Some(token) if token == form.csrf_token => {}
        _ => {
            tracing::warn!("Registration refused: missing or mismatched CSRF token");
            return Err(e400("The form has expired. Reload the page and submit it again."));
        }
    }
    let registration: Registration = form.into();

    let errors = validate_submission(&registration);
    if !errors.is_empty() {
        tracing::info!(error_count = errors.len(), "Registration rejected");
        for error in errors {
            FlashMessage::error(error).send();
        }
        if let Err(e) = session.insert_draft(&registration) {
            tracing::warn!(error.message = %e, "The answers could not be kept for the next attempt");
        }
        return Ok(see_other("/"));
    }

    match store_registration(store.into_inner(), registration).await {
        Ok(submission_id) => {
            tracing::Span::current().record("submission_id", &submission_id);
            session.clear_draft();
            Ok(see_other("/success"))
        }
        Err(e) if debug.0 => Err(e500_verbose(e)),
        Err(e) => Err(e500(e)),
    }
}

/// The store blocks on a file lock, so it runs on the blocking thread pool.
async fn store_registration(
    store: Arc<SubmissionStore>,
    registration: Registration,
) -> Result<u64, SubmitError> {
    let submission_id = spawn_blocking_with_tracing(move || store.append(registration))
        .await
        .context("Failed to spawn blocking task.")??;
    Ok(submission_id)
}
