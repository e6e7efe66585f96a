use rocket::http::Cookie;
use rocket::request::{self, FromRequest, Outcome, Request};

const SESSION_COOKIE: &str = "session_id";

/// The upload session for the current request, carried in a private (signed
/// and encrypted) cookie. First request without one gets a fresh session id
/// set on the response; subsequent requests reuse it.
pub struct UploadSession(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UploadSession {
    type Error = std::convert::Infallible;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let cookies = req.cookies();

        if let Some(cookie) = cookies.get_private(SESSION_COOKIE) {
            return Outcome::Success(UploadSession(cookie.value().to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        cookies.add_private(Cookie::new(SESSION_COOKIE, id.clone()));
        Outcome::Success(UploadSession(id))
    }
}
