use crate::utils::e500;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use anyhow::Context as anyhow_ctx;
use tera::{Context, Tera};

pub async fn success(templates: web::Data<&Tera>) -> Result<HttpResponse, actix_web::Error> {
    let html_body = templates
        .render("success.html", &Context::new())
        .context("Error rendering success html")
        .map_err(e500)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html_body))
}
