use crate::domain::Registration;
use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::future::{ready, Ready};

/// Upper bound on the serialised draft. The whole session has to fit in one cookie, which browsers
/// cap at 4KB once encrypted and encoded.
const MAX_DRAFT_BYTES: usize = 1536;

/// The session of a visitor filling in the form, with typed accessors for what we keep in it:
/// * the CSRF token the form has to post back;
/// * the draft of the last rejected submission, so the form comes back filled in.
pub struct TypedSession(Session);

impl TypedSession {
    const CSRF_TOKEN_KEY: &'static str = "csrf_token";
    const DRAFT_KEY: &'static str = "draft";

    /// The token of this session, created on first use.
    pub fn csrf_token(&self) -> Result<String, anyhow::Error> {
        if let Some(token) = self.get_csrf_token()? {
            return Ok(token);
        }
        let token = generate_csrf_token();
        self.0.insert(Self::CSRF_TOKEN_KEY, &token)?;
        Ok(token)
    }

    pub fn get_csrf_token(&self) -> Result<Option<String>, anyhow::Error> {
        Ok(self.0.get(Self::CSRF_TOKEN_KEY)?)
    }

    /// Keeps `draft` for the next rendering of the form. A draft too large for the session cookie
    /// is refused and any older draft dropped.
    pub fn insert_draft(&self, draft: &Registration) -> Result<(), anyhow::Error> {
        let size = serde_json::to_string(draft)?.len();
        if size > MAX_DRAFT_BYTES {
            self.clear_draft();
            anyhow::bail!(
                "The draft takes {size} bytes, more than the {MAX_DRAFT_BYTES} a session can hold."
            );
        }
        self.0.insert(Self::DRAFT_KEY, draft)?;
        Ok(())
    }

    pub fn get_draft(&self) -> Result<Option<Registration>, anyhow::Error> {
        Ok(self.0.get(Self::DRAFT_KEY)?)
    }

    pub fn clear_draft(&self) {
        self.0.remove(Self::DRAFT_KEY);
    }
}

impl FromRequest for TypedSession {
    // This is a complicated way of saying "We return the same error returned by the
    // implementation of `FromRequest` for `Session`".
    type Error = <Session as FromRequest>::Error;
    // Rust does not yet support the `async` syntax in traits. From request expects a `Future` as
    // return type to allow for extractors that need to perform asynchronous operations.
    // We do not have any, so we wrap `TypedSession` into `Ready` to convert it into a `Future`
    // that resolves to the wrapped value the first time it's polled by the executor.
    type Future = Ready<Result<TypedSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(TypedSession(req.get_session())))
    }
}

/// Generate a random 32-characters-long case-sensitive token.
fn generate_csrf_token() -> String {
    let mut rng = thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(32)
        .collect()
}
