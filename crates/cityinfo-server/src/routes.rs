use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cityinfo_core::pagination::{DEFAULT_PAGE_SIZE, PageRequest};
use cityinfo_core::{AppError, CityFilter, CityStore};

use crate::auth::require_bearer_token;
use crate::dto::{
    AuthenticationRequest, CityDto, CityWithoutPointsOfInterestDto, GetCityQuery, HealthResponse,
    ListCitiesQuery,
};
use crate::error::ApiError;
use crate::files::{
    ALLOWED_UPLOAD_CONTENT_TYPE, INVALID_UPLOAD_MESSAGE, MAX_UPLOAD_BYTES, UPLOAD_SUCCESS_MESSAGE,
    validate_upload,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::version;

/// Header carrying the JSON-encoded pagination metadata of list responses.
pub const PAGINATION_HEADER: HeaderName = HeaderName::from_static("x-pagination");

/// Request body cap for uploads: the file limit plus room for multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/{version}/cities", get(list_cities))
        .route("/api/{version}/cities/{city_id}", get(get_city))
        .route("/api/{version}/files/{file_id}", get(download_file))
        .route(
            "/api/{version}/files",
            post(upload_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer_token,
        ));

    let public = Router::new()
        .route("/api/authentication/authenticate", post(authenticate))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/authentication/authenticate",
    request_body = AuthenticationRequest,
    responses(
        (status = 200, description = "Signed bearer token", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    tag = "authentication"
)]
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<AuthenticationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .credentials
        .validate(body.user_name.as_deref(), body.password.as_deref())
        .ok_or_else(|| {
            tracing::warn!(user = ?body.user_name, "Credential check failed");
            AppError::Unauthorized("Invalid username or password".to_string())
        })?;

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = user.user_id, "Issued token");

    Ok(token)
}

// ---------------------------------------------------------------------------
// Cities
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/{version}/cities",
    params(
        ("version" = String, Path, description = "API version segment, e.g. v1 or v2"),
        ListCitiesQuery,
    ),
    responses(
        (status = 200, description = "Page of cities; metadata in the X-Pagination header",
            body = [CityWithoutPointsOfInterestDto],
            headers(("x-pagination" = String, description = "JSON pagination metadata"))),
        (status = 400, description = "Unsupported API version", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "cities"
)]
pub async fn list_cities(
    State(state): State<Arc<AppState>>,
    Path(api_version): Path<String>,
    Query(query): Query<ListCitiesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    version::CITIES.resolve(&api_version)?;

    let filter = CityFilter::new(query.name.as_deref(), query.search_query.as_deref());
    let page = PageRequest::new(
        query.page_number.unwrap_or(1),
        query.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
    );

    let (cities, metadata) = state.cities.list_cities(&filter, page).await?;

    let mut headers = version::CITIES.headers();
    let encoded = serde_json::to_string(&metadata).map_err(AppError::from)?;
    let value = HeaderValue::from_str(&encoded)
        .map_err(|e| AppError::Generic(format!("Invalid pagination header: {e}")))?;
    headers.insert(PAGINATION_HEADER, value);

    let body: Vec<CityWithoutPointsOfInterestDto> = cities
        .into_iter()
        .map(CityWithoutPointsOfInterestDto::from)
        .collect();

    Ok((headers, axum::Json(body)))
}

#[utoipa::path(
    get,
    path = "/api/{version}/cities/{city_id}",
    params(
        ("version" = String, Path, description = "API version segment, e.g. v1 or v2"),
        ("city_id" = i32, Path, description = "City ID"),
        GetCityQuery,
    ),
    responses(
        (status = 200, description = "City, with points of interest when requested", body = CityDto),
        (status = 400, description = "Unsupported API version", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "cities"
)]
pub async fn get_city(
    State(state): State<Arc<AppState>>,
    Path((api_version, city_id)): Path<(String, i32)>,
    Query(query): Query<GetCityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    version::CITIES.resolve(&api_version)?;

    let include_points_of_interest = query.include_points_of_interest.unwrap_or(false);
    let city = state
        .cities
        .get_city(city_id, include_points_of_interest)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("City {city_id}")))?;

    let headers = version::CITIES.headers();
    let response = if include_points_of_interest {
        (headers, axum::Json(CityDto::from(city))).into_response()
    } else {
        (headers, axum::Json(CityWithoutPointsOfInterestDto::from(city))).into_response()
    };

    Ok(response)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/{version}/files/{file_id}",
    params(
        ("version" = String, Path, description = "API version segment; v0.1 is deprecated"),
        ("file_id" = String, Path, description = "File ID (the demo artifact is always served)"),
    ),
    responses(
        (status = 200, description = "File contents, typed by extension"),
        (status = 400, description = "Unsupported API version", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((api_version, file_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    version::FILE_DOWNLOAD.resolve(&api_version)?;
    tracing::debug!(%file_id, "Serving download artifact");

    let file = state.files.read_artifact().await?;

    let mut headers = version::FILE_DOWNLOAD.headers();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(file.content_type));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.file_name))
        .map_err(|e| AppError::Generic(format!("Invalid file name header: {e}")))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, file.bytes))
}

#[utoipa::path(
    post,
    path = "/api/{version}/files",
    params(
        ("version" = String, Path, description = "API version segment, e.g. v1"),
    ),
    request_body(content = crate::dto::UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = String, content_type = "text/plain"),
        (status = 400, description = "No file or invalid input", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path(api_version): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    version::FILE_UPLOAD.resolve(&api_version)?;

    let invalid = |reason: String| {
        tracing::warn!("Upload rejected: {reason}");
        AppError::Validation(INVALID_UPLOAD_MESSAGE.to_string())
    };

    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid(format!("multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if content_type.as_deref() != Some(ALLOWED_UPLOAD_CONTENT_TYPE) {
            return Err(invalid(format!("content type {content_type:?}")).into());
        }

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| invalid(format!("read error: {e}")))?
        {
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(invalid(format!("file exceeds {MAX_UPLOAD_BYTES} bytes")).into());
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) = upload.ok_or_else(|| invalid("no file field".to_string()))?;
    validate_upload(data.len(), content_type.as_deref())
        .map_err(|_| invalid(format!("file of {} bytes", data.len())))?;

    let path = state.files.store_upload(&data).await?;
    tracing::info!(path = %path.display(), bytes = data.len(), "Stored upload");

    Ok((version::FILE_UPLOAD.headers(), UPLOAD_SUCCESS_MESSAGE))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_status = match state.cities.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            "error"
        }
    };

    let status = if store_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if store_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        store: store_status,
    };

    (status, axum::Json(response))
}
