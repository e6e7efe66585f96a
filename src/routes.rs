use crate::capability::{AppCapabilities, Capability};
use crate::db::DbError;
use rocket::serde::json::{json, Json, Value};
use rocket::{get, State};
use rocket_dyn_templates::{context, Template};

/// Main application page.
#[get("/")]
pub fn home() -> Template {
    Template::render(
        "index",
        context! {
            title: "Tax Advisor - PDF Upload System",
        },
    )
}

/// Stub response for the well-known icon path, so browsers probing it do not
/// generate not-found noise.
#[get("/favicon.ico")]
pub fn favicon() -> Json<Value> {
    Json(json!({"message": "No favicon available"}))
}

/// Liveness probe: always healthy, independent of any optional subsystem.
#[get("/health")]
pub fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "message": "Tax Advisor API is running"}))
}

/// Maps a connectivity-probe result to its status payload: the probe
/// answered (`healthy`/`unhealthy`) or failed outright (`error` with the
/// underlying message).
fn probe_status(result: Result<bool, DbError>) -> Value {
    match result {
        Ok(true) => json!({
            "status": "healthy",
            "message": "Database connection successful",
        }),
        Ok(false) => json!({
            "status": "unhealthy",
            "message": "Database connection failed",
        }),
        Err(e) => json!({
            "status": "error",
            "message": format!("Database error: {e}"),
        }),
    }
}

/// Database health probe. Four distinguishable outcomes: the subsystem was
/// never loaded (`unavailable`), or one of the three probe statuses.
#[get("/database/health")]
pub fn database_health(caps: &State<AppCapabilities>) -> Json<Value> {
    match &caps.database {
        Capability::Unavailable(_) => Json(json!({
            "status": "unavailable",
            "message": "Database components not loaded",
        })),
        Capability::Loaded(db) => Json(probe_status(db.probe())),
    }
}
