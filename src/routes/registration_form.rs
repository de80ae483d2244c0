use crate::domain::code_sets;
use crate::session_state::TypedSession;
use crate::utils::e500;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use anyhow::Context as anyhow_ctx;
use tera::{Context, Tera};

/// Renders the multi-step registration form.
///
/// The validation errors of the previous attempt, if any, travel as error-level flash messages and
/// are listed at the top of the form in the order they were raised. The answers of that attempt
/// come back filled in from the session draft.
pub async fn registration_form(
    flash_messages: IncomingFlashMessages,
    session: TypedSession,
    templates: web::Data<&Tera>,
) -> Result<HttpResponse, actix_web::Error> {
    let errors: Vec<&str> = flash_messages
        .iter()
        .filter(|m| m.level() == Level::Error)
        .map(|m| m.content())
        .collect();
    let csrf_token = session.csrf_token().map_err(e500)?;
    let draft = session.get_draft().map_err(e500)?.unwrap_or_default();

    let mut template_context = Context::new();
    template_context.insert("errors", &errors);
    template_context.insert("csrf_token", &csrf_token);
    template_context.insert("draft", &draft);
    template_context.insert("code_sets", &code_sets::ALL);
    let html_body = templates
        .render("form.html", &template_context)
        .context("Error rendering registration form html")
        .map_err(e500)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html_body))
}
