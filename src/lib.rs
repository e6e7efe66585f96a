pub mod capability;
pub mod cors;
pub mod db;
pub mod documents;
pub mod routes;
pub mod session;
pub mod storage;

use capability::{AppCapabilities, Capability};
use rocket::fairing::AdHoc;
use rocket::fs::FileServer;
use rocket::serde::json::{json, Json, Value};
use rocket::{catch, catchers, Request};
use rocket_dyn_templates::Template;

/// Development placeholder for the session-signing key. 256-bit hex so Rocket
/// accepts it in any profile; override with `SESSION_SECRET` outside of local
/// development.
const DEV_SESSION_SECRET: &str =
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

// --- JSON error catchers ---

#[catch(404)]
fn not_found(_req: &Request) -> Json<Value> {
    Json(json!({"error": "Not found", "code": "NOT_FOUND"}))
}

#[catch(413)]
fn payload_too_large(_req: &Request) -> Json<Value> {
    Json(json!({"error": "Payload too large", "code": "PAYLOAD_TOO_LARGE"}))
}

#[catch(422)]
fn unprocessable(_req: &Request) -> Json<Value> {
    Json(json!({"error": "Invalid request body", "code": "UNPROCESSABLE_ENTITY"}))
}

#[catch(500)]
fn internal_error(_req: &Request) -> Json<Value> {
    Json(json!({"error": "Internal server error", "code": "INTERNAL_ERROR"}))
}

/// Startup hook: runs exactly once, after the server has started accepting
/// connections. Database trouble is logged and tolerated — the HTTP surface
/// (including the health probes) must stay up regardless, otherwise
/// `/database/health` could never report the database as unhealthy.
fn init_database_on_liftoff() -> AdHoc {
    AdHoc::on_liftoff("Database init", |rocket| {
        Box::pin(async move {
            let Some(caps) = rocket.state::<AppCapabilities>() else {
                return;
            };
            match &caps.database {
                Capability::Unavailable(reason) => {
                    eprintln!("⚠️  Database not available - running without database storage ({reason})");
                }
                Capability::Loaded(db) => {
                    eprintln!("Initializing database...");
                    match db.init_schema() {
                        Ok(()) => match db.probe() {
                            Ok(true) => {
                                eprintln!("✅ Database initialized and connected successfully!")
                            }
                            Ok(false) => eprintln!("❌ Database connection test failed!"),
                            Err(e) => eprintln!("❌ Database connection test failed: {e}"),
                        },
                        Err(e) => eprintln!("❌ Database initialization failed: {e}"),
                    }
                }
            }
        })
    })
}

pub fn build_rocket(caps: AppCapabilities) -> rocket::Rocket<rocket::Build> {
    let secret =
        std::env::var("SESSION_SECRET").unwrap_or_else(|_| DEV_SESSION_SECRET.to_string());
    let figment = rocket::Config::figment().merge(("secret_key", secret));

    let documents_enabled = caps.documents_enabled();

    let mut rocket = rocket::custom(figment)
        .manage(caps)
        .attach(Template::fairing())
        .attach(cors::PermissiveCors)
        .attach(init_database_on_liftoff())
        .mount(
            "/",
            rocket::routes![
                routes::home,
                routes::favicon,
                routes::health,
                routes::database_health,
                cors::preflight,
            ],
        )
        .register(
            "/",
            catchers![not_found, payload_too_large, unprocessable, internal_error],
        );

    if documents_enabled {
        rocket = rocket.mount(
            "/api",
            rocket::routes![
                documents::upload_document,
                documents::list_documents,
                documents::get_document,
                documents::delete_document,
            ],
        );
    } else {
        eprintln!("⚡ Document routes disabled (missing database or upload storage)");
    }

    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());
    if std::path::Path::new(&static_dir).is_dir() {
        eprintln!("📁 Serving static assets from {}", static_dir);
        rocket = rocket.mount("/static", FileServer::from(&static_dir));
    } else {
        eprintln!("⚡ No static asset directory at {}", static_dir);
    }

    rocket
}
