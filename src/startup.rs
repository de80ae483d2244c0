use crate::configuration::Settings;
use crate::routes;
use crate::submission_store::SubmissionStore;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{dev::Server, web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, Secret};
use std::io::ErrorKind;
use std::net::TcpListener;
use tera::Tera;
use tracing_actix_web::TracingLogger;

/// The HTML templates are compiled into the binary and parsed once, on first use.
pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("form.html", include_str!("../templates/form.html")),
        ("success.html", include_str!("../templates/success.html")),
    ])
    .expect("Failed to parse the HTML templates");
    tera
});

/// Whether error responses may carry the full error chain.
#[derive(Clone, Copy, Debug)]
pub struct DebugMode(pub bool);

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, std::io::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        //Retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();

        let store = SubmissionStore::new(configuration.storage.data_file);
        let server = run(
            listener,
            store,
            configuration.application.secret_key,
            configuration.application.debug,
            configuration.application.secure_cookies,
        )?;

        // We "save" the bound port in one of `Application`'s fields.
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that this function only returns when the
    /// application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    store: SubmissionStore,
    secret_key: Secret<String>,
    debug: bool,
    secure_cookies: bool,
) -> Result<Server, std::io::Error> {
    let key = Key::try_from(secret_key.expose_secret().as_bytes()).map_err(|e| {
        std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("The secret key cannot sign cookies: {e}"),
        )
    })?;
    let message_store = CookieMessageStore::builder(key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    // `web::Data` wraps its content in an `Arc`: every worker shares the same store.
    let store = web::Data::new(store);
    let templates = web::Data::new(&*TEMPLATES);
    let debug = web::Data::new(DebugMode(debug));
    let server = HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(TracingLogger::default())
            .route("/", web::get().to(routes::registration_form))
            .route("/submit", web::post().to(routes::submit))
            .route("/success", web::get().to(routes::success))
            .route("/health_check", web::get().to(routes::health_check))
            .app_data(store.clone())
            .app_data(templates.clone())
            .app_data(debug.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
