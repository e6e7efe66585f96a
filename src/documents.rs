use crate::capability::AppCapabilities;
use crate::db;
use crate::session::UploadSession;
use crate::storage::DocumentStore;
use rocket::data::ToByteUnit;
use rocket::http::{ContentType, Status};
use rocket::serde::json::{json, Json, Value};
use rocket::{delete, get, post, Data, State};
use sha2::{Digest, Sha256};

const MAX_UPLOAD: u64 = 10; // mebibytes

/// These routes are only mounted when both the database and the document
/// store negotiated as loaded; the guards below cover the impossible gap.
fn subsystems(
    caps: &AppCapabilities,
) -> Result<(&db::Db, &DocumentStore), (Status, Json<Value>)> {
    match (caps.database.loaded(), caps.documents.loaded()) {
        (Some(database), Some(store)) => Ok((database, store)),
        _ => Err((
            Status::ServiceUnavailable,
            Json(json!({"error": "Document storage not available", "code": "UNAVAILABLE"})),
        )),
    }
}

fn db_error(e: db::DbError) -> (Status, Json<Value>) {
    (
        Status::InternalServerError,
        Json(json!({"error": e.to_string(), "code": "INTERNAL_ERROR"})),
    )
}

#[post("/documents?<filename>", data = "<file>")]
pub async fn upload_document(
    caps: &State<AppCapabilities>,
    session: UploadSession,
    content_type: Option<&ContentType>,
    filename: Option<String>,
    file: Data<'_>,
) -> (Status, Json<Value>) {
    let (database, store) = match subsystems(caps) {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };

    if content_type != Some(&ContentType::PDF) {
        return (
            Status::UnsupportedMediaType,
            Json(json!({"error": "Only application/pdf uploads are accepted", "code": "UNSUPPORTED_MEDIA_TYPE"})),
        );
    }

    let bytes = match file.open(MAX_UPLOAD.mebibytes()).into_bytes().await {
        Ok(capped) if capped.is_complete() => capped.into_inner(),
        Ok(_) => {
            return (
                Status::PayloadTooLarge,
                Json(json!({"error": "Upload exceeds size limit", "code": "PAYLOAD_TOO_LARGE"})),
            )
        }
        Err(e) => {
            return (
                Status::InternalServerError,
                Json(json!({"error": format!("Failed to read upload: {e}"), "code": "INTERNAL_ERROR"})),
            )
        }
    };

    if !bytes.starts_with(b"%PDF") {
        return (
            Status::BadRequest,
            Json(json!({"error": "File is not a PDF document", "code": "VALIDATION_ERROR"})),
        );
    }

    let id = uuid::Uuid::new_v4().to_string();
    let filename = filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("{id}.pdf"));
    let sha256 = hex::encode(Sha256::digest(&bytes));
    let uploaded_at = chrono::Utc::now().to_rfc3339();

    let stored_path = match store.store(&session.0, &id, &bytes) {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(e) => {
            return (
                Status::InternalServerError,
                Json(json!({"error": format!("Failed to store document: {e}"), "code": "INTERNAL_ERROR"})),
            )
        }
    };

    if let Err(e) = db::insert_document(
        database,
        &id,
        &session.0,
        &filename,
        &stored_path,
        &sha256,
        bytes.len() as i64,
        "application/pdf",
        &uploaded_at,
    ) {
        // Keep row and file consistent: drop the orphaned file.
        let _ = store.remove(&stored_path);
        return db_error(e);
    }

    (
        Status::Created,
        Json(json!({
            "id": id,
            "session_id": session.0,
            "filename": filename,
            "sha256": sha256,
            "size_bytes": bytes.len(),
            "content_type": "application/pdf",
            "uploaded_at": uploaded_at,
        })),
    )
}

#[get("/documents")]
pub fn list_documents(
    caps: &State<AppCapabilities>,
    session: UploadSession,
) -> (Status, Json<Value>) {
    let (database, _) = match subsystems(caps) {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };

    match db::list_documents(database, &session.0) {
        Ok(docs) => (Status::Ok, Json(json!(docs))),
        Err(e) => db_error(e),
    }
}

#[get("/documents/<id>")]
pub fn get_document(
    caps: &State<AppCapabilities>,
    session: UploadSession,
    id: &str,
) -> (Status, Json<Value>) {
    let (database, _) = match subsystems(caps) {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };

    match db::get_document(database, id, &session.0) {
        Ok(Some(doc)) => (Status::Ok, Json(doc)),
        Ok(None) => (
            Status::NotFound,
            Json(json!({"error": "Document not found", "code": "NOT_FOUND"})),
        ),
        Err(e) => db_error(e),
    }
}

#[delete("/documents/<id>")]
pub fn delete_document(
    caps: &State<AppCapabilities>,
    session: UploadSession,
    id: &str,
) -> (Status, Json<Value>) {
    let (database, store) = match subsystems(caps) {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };

    match db::delete_document(database, id, &session.0) {
        Ok(Some(stored_path)) => {
            if let Err(e) = store.remove(&stored_path) {
                eprintln!("Warning: failed to remove stored file {stored_path}: {e}");
            }
            (Status::Ok, Json(json!({"deleted": id})))
        }
        Ok(None) => (
            Status::NotFound,
            Json(json!({"error": "Document not found", "code": "NOT_FOUND"})),
        ),
        Err(e) => db_error(e),
    }
}
