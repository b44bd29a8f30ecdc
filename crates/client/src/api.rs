//! REST client for the timetable backend.
//!
//! Wraps the `/api` collections (courses, lecturers, rooms, groups,
//! departments, timetables) and the auth endpoints using [`reqwest`].
//! Every response body is decoded into a typed contract from
//! [`timetabler_core::models`]; a body that does not match fails with
//! [`ApiError::Decode`] instead of leaking untyped JSON to callers.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use timetabler_core::error::CoreError;
use timetabler_core::models::{
    BulkUploadReport, Course, CreateCourse, CreateDepartment, CreateLecturer, CreateRoom,
    CreateStudentGroup, CreateTimetable, Department, Lecturer, LoginRequest, Room, StudentGroup,
    Timetable, TimetableDetail, TokenResponse, UpdateCourse, UpdateLecturer, UpdateRoom,
    UpdateStudentGroup, User,
};
use timetabler_core::session::Session;
use timetabler_core::types::DbId;
use validator::Validate;

use crate::config::ClientConfig;

const CSV_MIME: &str = "text/csv";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_MIME: &str = "application/vnd.ms-excel";

// ---------------------------------------------------------------------------
// Resource contracts
// ---------------------------------------------------------------------------

/// A REST collection under `/api/{COLLECTION}/`.
pub trait Resource: DeserializeOwned {
    /// Path segment of the collection, e.g. `"courses"`.
    const COLLECTION: &'static str;
    /// Body of `POST /api/{COLLECTION}/`.
    type Create: Serialize + Validate;
}

/// A collection that accepts `PUT /api/{COLLECTION}/{id}`.
pub trait Updatable: Resource {
    type Update: Serialize + Validate;
}

/// A collection that accepts `POST /api/{COLLECTION}/bulk-upload`.
pub trait BulkImportable: Resource {}

impl Resource for Course {
    const COLLECTION: &'static str = "courses";
    type Create = CreateCourse;
}

impl Updatable for Course {
    type Update = UpdateCourse;
}

impl BulkImportable for Course {}

impl Resource for Lecturer {
    const COLLECTION: &'static str = "lecturers";
    type Create = CreateLecturer;
}

impl Updatable for Lecturer {
    type Update = UpdateLecturer;
}

impl BulkImportable for Lecturer {}

impl Resource for Room {
    const COLLECTION: &'static str = "rooms";
    type Create = CreateRoom;
}

impl Updatable for Room {
    type Update = UpdateRoom;
}

impl BulkImportable for Room {}

impl Resource for StudentGroup {
    const COLLECTION: &'static str = "groups";
    type Create = CreateStudentGroup;
}

impl Updatable for StudentGroup {
    type Update = UpdateStudentGroup;
}

impl BulkImportable for StudentGroup {}

impl Resource for Department {
    const COLLECTION: &'static str = "departments";
    type Create = CreateDepartment;
}

impl Resource for Timetable {
    const COLLECTION: &'static str = "timetables";
    type Create = CreateTimetable;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one timetable backend.
///
/// Holds no credentials: every authenticated call takes the caller's
/// [`Session`].
#[derive(Debug, Clone)]
pub struct TimetablerApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected locally (invalid payload, no session, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body does not match the expected contract.
    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl TimetablerApi {
    /// Create a client for the backend at `base_url` (e.g. `http://host:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Create a client honouring the configured request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- auth ----

    /// Sign in by username and fetch the profile.
    ///
    /// Returns a fully populated [`Session`].
    pub async fn login(&self, username: &str) -> Result<Session, ApiError> {
        let endpoint = self.url("auth/login");
        let response = self
            .client
            .post(&endpoint)
            .json(&LoginRequest {
                username: username.to_string(),
            })
            .send()
            .await?;
        let token: TokenResponse = Self::decode(&endpoint, response).await?;

        let mut session = Session::with_token(token.access_token);
        let user = self.me(&session).await?;
        tracing::info!(username = %user.username, role = %user.role, "Signed in");
        session.set_user(user);
        Ok(session)
    }

    /// `GET /api/auth/me`: the profile of the token holder.
    pub async fn me(&self, session: &Session) -> Result<User, ApiError> {
        self.get_json(session, "auth/me").await
    }

    // ---- generic collection operations ----

    /// `GET /api/{collection}/`
    pub async fn list<R: Resource>(&self, session: &Session) -> Result<Vec<R>, ApiError> {
        self.get_json(session, &format!("{}/", R::COLLECTION)).await
    }

    /// `GET /api/{collection}/{id}`
    pub async fn get<R: Resource>(&self, session: &Session, id: DbId) -> Result<R, ApiError> {
        self.get_json(session, &format!("{}/{id}", R::COLLECTION))
            .await
    }

    /// `POST /api/{collection}/` after validating the payload locally.
    pub async fn create<R: Resource>(
        &self,
        session: &Session,
        payload: &R::Create,
    ) -> Result<R, ApiError> {
        payload.validate().map_err(CoreError::from)?;
        let endpoint = self.url(&format!("{}/", R::COLLECTION));
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(session.require_token()?)
            .json(payload)
            .send()
            .await?;
        let created: R = Self::decode(&endpoint, response).await?;
        tracing::info!(collection = R::COLLECTION, "Created entity");
        Ok(created)
    }

    /// `PUT /api/{collection}/{id}` after validating the payload locally.
    pub async fn update<R: Updatable>(
        &self,
        session: &Session,
        id: DbId,
        payload: &R::Update,
    ) -> Result<R, ApiError> {
        payload.validate().map_err(CoreError::from)?;
        let endpoint = self.url(&format!("{}/{id}", R::COLLECTION));
        let response = self
            .client
            .put(&endpoint)
            .bearer_auth(session.require_token()?)
            .json(payload)
            .send()
            .await?;
        Self::decode(&endpoint, response).await
    }

    /// `DELETE /api/{collection}/{id}`
    pub async fn delete<R: Resource>(&self, session: &Session, id: DbId) -> Result<(), ApiError> {
        let endpoint = self.url(&format!("{}/{id}", R::COLLECTION));
        let response = self
            .client
            .delete(&endpoint)
            .bearer_auth(session.require_token()?)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        tracing::info!(collection = R::COLLECTION, id, "Deleted entity");
        Ok(())
    }

    /// `POST /api/{collection}/bulk-upload` with a CSV or Excel file.
    ///
    /// The MIME type is chosen from the file extension because the backend
    /// rejects anything that is not CSV or Excel.
    pub async fn bulk_upload<R: BulkImportable>(
        &self,
        session: &Session,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<BulkUploadReport, ApiError> {
        let mime = spreadsheet_mime(file_name)?;
        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let endpoint = self.url(&format!("{}/bulk-upload", R::COLLECTION));
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(session.require_token()?)
            .multipart(form)
            .send()
            .await?;
        let report: BulkUploadReport = Self::decode(&endpoint, response).await?;

        tracing::info!(
            collection = R::COLLECTION,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            errors = report.error_count(),
            "Bulk upload processed",
        );
        Ok(report)
    }

    // ---- timetables ----

    /// `GET /api/timetables/{id}` including the generated slots.
    pub async fn timetable_detail(
        &self,
        session: &Session,
        id: DbId,
    ) -> Result<TimetableDetail, ApiError> {
        self.get_json(session, &format!("timetables/{id}")).await
    }

    /// `POST /api/timetables/{id}/activate`: make this the active timetable.
    ///
    /// The backend deactivates every other timetable.
    pub async fn activate_timetable(
        &self,
        session: &Session,
        id: DbId,
    ) -> Result<Timetable, ApiError> {
        let endpoint = self.url(&format!("timetables/{id}/activate"));
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(session.require_token()?)
            .send()
            .await?;
        let timetable: Timetable = Self::decode(&endpoint, response).await?;
        tracing::info!(timetable_id = id, "Activated timetable");
        Ok(timetable)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
    ) -> Result<T, ApiError> {
        let endpoint = self.url(path);
        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(session.require_token()?)
            .send()
            .await?;
        Self::decode(&endpoint, response).await
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or an [`ApiError::Status`] with the body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Decode a successful JSON body into the expected contract.
    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| {
            tracing::warn!(endpoint, error = %source, "Response does not match contract");
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }
}

/// MIME type the backend expects for a spreadsheet upload.
pub fn spreadsheet_mime(file_name: &str) -> Result<&'static str, CoreError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => Ok(CSV_MIME),
        Some("xlsx") => Ok(XLSX_MIME),
        Some("xls") => Ok(XLS_MIME),
        _ => Err(CoreError::Validation(format!(
            "{file_name}: file must be CSV or Excel format"
        ))),
    }
}
