use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};

/// Maximally permissive CORS: any origin, any method, any header, credentials
/// allowed. Mirrors the upstream development configuration; the wildcard
/// origin combined with credentials is flagged in DESIGN.md rather than
/// tightened here.
pub struct PermissiveCors;

#[rocket::async_trait]
impl Fairing for PermissiveCors {
    fn info(&self) -> Info {
        Info {
            name: "Permissive CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _req: &'r Request<'_>, res: &mut Response<'r>) {
        res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        res.set_header(Header::new("Access-Control-Allow-Methods", "*"));
        res.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/// Catch-all preflight responder; the fairing above attaches the headers.
#[rocket::options("/<_path..>", rank = 20)]
pub fn preflight(_path: std::path::PathBuf) -> rocket::http::Status {
    rocket::http::Status::NoContent
}
