// Axum API Server Module
//
// Purpose: REST API over the crop advisor (crop, fertilizer and yield
// recommendations plus the static fertilizer and companion-crop tables).
// Every POST body is accepted as JSON or as an HTML form.

#[cfg(feature = "api")]
use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, FromRequest, Path, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Form, Router,
};

#[cfg(feature = "api")]
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use crate::companions::{companion_plan, main_crops};
#[cfg(feature = "api")]
use crate::error::RecommendError;
#[cfg(feature = "api")]
use crate::fertilizer::{catalog, schedule};
#[cfg(feature = "api")]
use crate::recommender::CropAdvisor;
#[cfg(feature = "api")]
use crate::request::{
    required, required_text, CropRequest, FertilizerRequest, SiteConditions, YieldRequest,
};

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<CropAdvisor>,
}

#[cfg(feature = "api")]
impl AppState {
    /// Load all model artifacts; fails if a required artifact is missing or invalid
    pub fn new(artifact_dir: &std::path::Path) -> anyhow::Result<Self> {
        tracing::info!("Initializing crop advisor...");
        let advisor = CropAdvisor::load(artifact_dir)?;
        Ok(Self::from_advisor(advisor))
    }

    pub fn from_advisor(advisor: CropAdvisor) -> Self {
        Self { advisor: Arc::new(advisor) }
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Model-backed endpoints
        .route("/api/crops/recommend", post(recommend_crop))
        .route("/api/fertilizers/recommend", post(recommend_fertilizer))
        .route("/api/fertilizers/rules", post(recommend_fertilizer_by_rules))
        .route("/api/yield/predict", post(predict_yield))

        // Static tables
        // The schedule route is static and takes priority over :name
        .route("/api/fertilizers/schedule", get(fertilizer_schedule))
        .route("/api/fertilizers/:name", get(get_fertilizer))
        .route("/api/companions/:crop", get(get_companions))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request Bodies
// ============================================================================

/// JSON or `application/x-www-form-urlencoded`, chosen by content type
#[cfg(feature = "api")]
pub struct JsonOrForm<T>(pub T);

#[cfg(feature = "api")]
#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send + 'static,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e: FormRejection| AppError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// Number from a JSON number or a numeric string; blank counts as absent
#[cfg(feature = "api")]
fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(v)) => Ok(Some(v)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", s))),
    }
}

/// Loosely-typed site measurements as submitted
#[cfg(feature = "api")]
#[derive(Debug, Default, Deserialize)]
pub struct ConditionsBody {
    #[serde(rename = "N", default, deserialize_with = "flexible_f64")]
    pub nitrogen: Option<f64>,
    #[serde(rename = "P", default, deserialize_with = "flexible_f64")]
    pub phosphorus: Option<f64>,
    #[serde(rename = "K", default, deserialize_with = "flexible_f64")]
    pub potassium: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub ph: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub rainfall: Option<f64>,
}

#[cfg(feature = "api")]
impl ConditionsBody {
    fn into_conditions(self) -> Result<SiteConditions, RecommendError> {
        Ok(SiteConditions {
            nitrogen: required(self.nitrogen, "N")?,
            phosphorus: required(self.phosphorus, "P")?,
            potassium: required(self.potassium, "K")?,
            temperature: required(self.temperature, "temperature")?,
            humidity: required(self.humidity, "humidity")?,
            ph: required(self.ph, "ph")?,
            rainfall: required(self.rainfall, "rainfall")?,
        })
    }
}

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct CropBody {
    #[serde(flatten)]
    pub conditions: ConditionsBody,
    pub soil: Option<String>,
    pub prev_crop: Option<String>,
    pub prev_duration: Option<String>,
    pub rec_duration: Option<String>,
    pub season: Option<String>,
}

#[cfg(feature = "api")]
impl TryFrom<CropBody> for CropRequest {
    type Error = RecommendError;

    fn try_from(body: CropBody) -> Result<Self, Self::Error> {
        Ok(CropRequest {
            conditions: body.conditions.into_conditions()?,
            soil: required_text(body.soil, "soil")?,
            prev_crop: required_text(body.prev_crop, "prev_crop")?,
            prev_duration: required_text(body.prev_duration, "prev_duration")?,
            rec_duration: required_text(body.rec_duration, "rec_duration")?,
            season: required_text(body.season, "season")?,
        })
    }
}

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct YieldBody {
    #[serde(flatten)]
    pub conditions: ConditionsBody,
    pub soil: Option<String>,
    pub season: Option<String>,
    pub prev_crop: Option<String>,
    pub prev_duration: Option<String>,
    pub crop: Option<String>,
}

#[cfg(feature = "api")]
impl TryFrom<YieldBody> for YieldRequest {
    type Error = RecommendError;

    fn try_from(body: YieldBody) -> Result<Self, Self::Error> {
        Ok(YieldRequest {
            conditions: body.conditions.into_conditions()?,
            soil: required_text(body.soil, "soil")?,
            season: required_text(body.season, "season")?,
            prev_crop: required_text(body.prev_crop, "prev_crop")?,
            prev_duration: required_text(body.prev_duration, "prev_duration")?,
            crop: required_text(body.crop, "crop")?,
        })
    }
}

/// Fertilizer form: nutrients and temperature default to 0, soil and crop are required
#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct FertilizerBody {
    #[serde(rename = "N", default, deserialize_with = "flexible_f64")]
    pub nitrogen: Option<f64>,
    #[serde(rename = "P", default, deserialize_with = "flexible_f64")]
    pub phosphorus: Option<f64>,
    #[serde(rename = "K", default, deserialize_with = "flexible_f64")]
    pub potassium: Option<f64>,
    #[serde(rename = "Temperature", alias = "temperature", default, deserialize_with = "flexible_f64")]
    pub temperature: Option<f64>,
    pub soil_type: Option<String>,
    #[serde(rename = "Crop", alias = "crop_type")]
    pub crop_type: Option<String>,
}

#[cfg(feature = "api")]
impl TryFrom<FertilizerBody> for FertilizerRequest {
    type Error = RecommendError;

    fn try_from(body: FertilizerBody) -> Result<Self, Self::Error> {
        Ok(FertilizerRequest {
            nitrogen: body.nitrogen.unwrap_or(0.0),
            phosphorus: body.phosphorus.unwrap_or(0.0),
            potassium: body.potassium.unwrap_or(0.0),
            temperature: body.temperature.unwrap_or(0.0),
            soil_type: required_text(body.soil_type, "soil_type")?,
            crop_type: required_text(body.crop_type, "Crop")?,
        })
    }
}

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub stage: String,
    /// "organic" (default) or anything else for non-organic
    #[serde(alias = "type")]
    pub kind: Option<String>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "models": state.advisor.summary(),
    }))
}

#[cfg(feature = "api")]
async fn recommend_crop(
    State(state): State<AppState>,
    JsonOrForm(body): JsonOrForm<CropBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = CropRequest::try_from(body)?;
    tracing::debug!("Crop recommendation for soil={} season={}", request.soil, request.season);

    let recommendation = state.advisor.recommend_crop(&request)?;
    Ok(Json(serde_json::json!(recommendation)))
}

#[cfg(feature = "api")]
async fn recommend_fertilizer(
    State(state): State<AppState>,
    JsonOrForm(body): JsonOrForm<FertilizerBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = FertilizerRequest::try_from(body)?;
    let advice = state.advisor.recommend_fertilizer(&request);
    Ok(Json(serde_json::json!(advice)))
}

#[cfg(feature = "api")]
async fn recommend_fertilizer_by_rules(
    State(state): State<AppState>,
    JsonOrForm(body): JsonOrForm<FertilizerBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = FertilizerRequest::try_from(body)?;
    let advice = state.advisor.recommend_fertilizer_by_rules(&request);
    Ok(Json(serde_json::json!(advice)))
}

#[cfg(feature = "api")]
async fn predict_yield(
    State(state): State<AppState>,
    JsonOrForm(body): JsonOrForm<YieldBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = YieldRequest::try_from(body)?;
    let prediction = state.advisor.predict_yield(&request)?;
    Ok(Json(serde_json::json!(prediction)))
}

#[cfg(feature = "api")]
async fn fertilizer_schedule(Query(query): Query<ScheduleQuery>) -> Json<serde_json::Value> {
    let kind = query.kind.as_deref().unwrap_or("organic");
    let advice = schedule::schedule(&query.crop, &query.stage, kind);
    Json(serde_json::json!(advice))
}

#[cfg(feature = "api")]
async fn get_fertilizer(Path(name): Path<String>) -> Result<Json<serde_json::Value>, AppError> {
    catalog::lookup(&name)
        .map(|profile| Json(serde_json::json!(profile)))
        .ok_or_else(|| AppError::NotFound(format!("Fertilizer '{}' not found", name)))
}

#[cfg(feature = "api")]
async fn get_companions(Path(crop): Path<String>) -> Result<Json<serde_json::Value>, AppError> {
    companion_plan(&crop)
        .map(|plan| Json(serde_json::json!(plan)))
        .ok_or_else(|| {
            let available: Vec<&str> = main_crops().collect();
            AppError::NotFound(format!(
                "No companion plan for '{}'. Available: {}",
                crop,
                available.join(", ")
            ))
        })
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
}

#[cfg(feature = "api")]
impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        if err.is_input_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Unavailable(err.to_string())
        }
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
