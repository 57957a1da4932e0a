use super::AppState;
use crate::utils::error::{RasterError, Result};
use crate::utils::validation::require_country_code;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Web 邊界錯誤：輸入錯誤 400、上游錯誤原樣轉出、其餘 500
#[derive(Debug)]
pub enum ApiError {
    Raster(RasterError),
    Multipart(MultipartError),
}

impl From<RasterError> for ApiError {
    fn from(err: RasterError) -> Self {
        Self::Raster(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Raster(RasterError::InvalidArgument { message }) => {
                tracing::warn!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::Raster(RasterError::UpstreamError { status, body }) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, body).into_response()
            }
            Self::Raster(err) => {
                tracing::error!(
                    "❌ Request failed: {} (Category: {:?})",
                    err,
                    err.category()
                );
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Multipart(err) => {
                tracing::warn!("Rejected multipart body: {}", err);
                err.into_response()
            }
        }
    }
}

type ApiResult = std::result::Result<Response, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct CountryQuery {
    #[serde(rename = "countryCode", alias = "iso3")]
    pub country_code: Option<String>,
}

impl CountryQuery {
    /// 未提供時使用設定的預設國碼；提供但為空白則拒絕
    fn resolve(&self, default_code: &str) -> Result<String> {
        match &self.country_code {
            Some(code) => require_country_code(code).map(str::to_string),
            None => Ok(default_code.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveGraphicsQuery {
    #[serde(rename = "countryCode", alias = "iso3")]
    pub country_code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct SaveLayerRequest {
    #[serde(rename = "type")]
    pub layer_type: Option<String>,
    pub features: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveLayerResponse {
    pub id: Option<u64>,
    pub message: &'static str,
    #[serde(rename = "type")]
    pub layer_type: String,
}

fn json_or_no_content<T: Serialize>(items: Vec<T>) -> Response {
    if items.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(items).into_response()
    }
}

fn png_response(png: Vec<u8>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        png,
    )
        .into_response()
}

/// 去掉會破壞 `filename="..."` 的字元
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect()
}

/// `map.tif` → `map.png`；無法辨識時使用 `converted.png`
pub fn png_file_name(original: Option<&str>) -> String {
    let Some(original) = original.map(sanitize_file_name) else {
        return "converted.png".to_string();
    };
    let lower = original.to_ascii_lowercase();
    for ext in [".tiff", ".tif"] {
        if lower.ends_with(ext) {
            return format!("{}.png", &original[..original.len() - ext.len()]);
        }
    }
    "converted.png".to_string()
}

pub async fn status() -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}

pub async fn raster_metadata(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult {
    let code = query.resolve(&state.default_country_code)?;
    Ok(match state.pipeline.fetch_raster_metadata(&code).await? {
        Some(document) => Json(document).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn raster_files(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult {
    let code = query.resolve(&state.default_country_code)?;
    let files = state.pipeline.get_raster_file_list(&code).await?;
    Ok(json_or_no_content(files))
}

pub async fn density_images(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult {
    let code = query.resolve(&state.default_country_code)?;
    let images = state.pipeline.get_population_images(&code).await?;
    Ok(json_or_no_content(images))
}

pub async fn raster_png(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult {
    let code = query.resolve(&state.default_country_code)?;
    tracing::info!("🗺️ Converting raster for {}", code);
    let png = state.pipeline.get_raster_as_png(&code).await?;
    Ok(png_response(
        png,
        &format!("{}_map.png", sanitize_file_name(&code)),
    ))
}

pub async fn convert_url(State(state): State<AppState>, Query(query): Query<UrlQuery>) -> ApiResult {
    let url = query.url.unwrap_or_default();
    let png = state.pipeline.download_and_convert(&url).await?;
    Ok(png_response(png, "converted.png"))
}

pub async fn convert_upload(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = png_file_name(field.file_name());
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(RasterError::invalid_argument("uploaded file is empty").into());
        }

        tracing::info!("📤 Converting upload ({} bytes) to {}", bytes.len(), filename);
        let png = state.pipeline.convert_bytes(bytes.to_vec()).await?;
        return Ok(png_response(png, &filename));
    }

    Err(RasterError::invalid_argument("multipart field 'file' is required").into())
}

pub async fn save_layer(
    State(state): State<AppState>,
    Json(request): Json<SaveLayerRequest>,
) -> ApiResult {
    let (Some(layer_type), Some(features)) = (request.layer_type, request.features) else {
        return Err(
            RasterError::invalid_argument("missing required fields: type and features").into(),
        );
    };

    let saved = state.layers.save_layer(&layer_type, &features).await?;
    Ok(Json(SaveLayerResponse {
        id: saved.id,
        message: "Layer saved successfully",
        layer_type: saved.layer_type,
    })
    .into_response())
}

pub async fn list_layers(State(state): State<AppState>) -> ApiResult {
    Ok(Json(state.layers.list_layers().await?).into_response())
}

pub async fn layers_by_type(
    State(state): State<AppState>,
    Path(layer_type): Path<String>,
) -> ApiResult {
    Ok(Json(state.layers.layers_by_type(&layer_type).await?).into_response())
}

pub async fn delete_layer(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    if state.layers.delete_layer(id).await? {
        Ok(Json(json!({ "message": "Layer deleted successfully" })).into_response())
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Layer not found" })),
        )
            .into_response())
    }
}

/// 取得人口密度影像並以 `name`（預設為國碼）存檔
pub async fn save_graphics(
    State(state): State<AppState>,
    Query(query): Query<SaveGraphicsQuery>,
) -> ApiResult {
    let code = CountryQuery {
        country_code: query.country_code,
    }
    .resolve(&state.default_country_code)?;
    let name = query
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| code.clone());

    let images = state.pipeline.get_population_images(&code).await?;
    let saved = state
        .graphics
        .save_population_graphics(&name, &images)
        .await?;
    Ok(json_or_no_content(saved))
}

pub async fn graphics_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    Ok(Json(state.graphics.graphics_by_name(&query.name).await?).into_response())
}

pub async fn delete_graphics(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult {
    let deleted = state.graphics.delete_graphics_by_name(&query.name).await?;
    Ok(Json(json!({ "deleted": deleted })).into_response())
}

pub async fn graphic_urls(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult {
    let urls = state.graphics.graphic_urls_by_year(query.year).await?;
    Ok(json_or_no_content(urls))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_file_name() {
        assert_eq!(png_file_name(Some("mex.tif")), "mex.png");
        assert_eq!(png_file_name(Some("MEX_2020.TIFF")), "MEX_2020.png");
        assert_eq!(png_file_name(Some("photo.jpg")), "converted.png");
        assert_eq!(png_file_name(None), "converted.png");
        assert_eq!(png_file_name(Some("a\"b.tif")), "ab.png");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("M\"X"), "MX");
        assert_eq!(sanitize_file_name("MEX\r\n"), "MEX");
        assert_eq!(sanitize_file_name("a\\b"), "ab");
    }

    #[test]
    fn test_country_query_resolution() {
        let absent = CountryQuery::default();
        assert_eq!(absent.resolve("MEX").unwrap(), "MEX");

        let given = CountryQuery {
            country_code: Some(" COL ".to_string()),
        };
        assert_eq!(given.resolve("MEX").unwrap(), "COL");

        let blank = CountryQuery {
            country_code: Some("  ".to_string()),
        };
        assert!(matches!(
            blank.resolve("MEX"),
            Err(RasterError::InvalidArgument { .. })
        ));
    }
}
