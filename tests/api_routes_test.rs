use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use city_raster::utils::validation::Validate;
use city_raster::{build_router, AppConfig, AppState};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use tower::ServiceExt;

/// 以 TOML 設定檔建立 router，provider 指向 mock server
fn router_from_toml(server: &MockServer) -> Result<Router> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[server]
cors_origins = ["http://localhost:5173"]

[provider]
raster_endpoint = "{}"
density_endpoint = "{}"
default_country_code = "COL"

[http]
connect_timeout_secs = 2
read_timeout_secs = 5
"#,
        server.url("/pop/WPGP"),
        server.url("/pop_density/pd_ic_1km"),
    )?;

    let config = AppConfig::from_file(file.path())?;
    config.validate()?;

    let state = AppState::from_config(&config)?;
    Ok(build_router(state, &config.server)?)
}

async fn read_json(router: &Router, req: Request<Body>) -> Result<(StatusCode, Value)> {
    let resp = router.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_configured_default_country_code_is_used() -> Result<()> {
    let server = MockServer::start();
    let provider = server.mock(|when, then| {
        when.method(GET).path("/pop/WPGP").query_param("iso3", "COL");
        then.status(200).json_body(json!({"data": [{"id": 1}]}));
    });
    let router = router_from_toml(&server)?;

    let req = Request::builder().uri("/raster").body(Body::empty())?;
    let (status, body) = read_json(&router, req).await?;

    provider.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": [{"id": 1}]}));

    // data 中沒有 files，檔案清單為空
    let req = Request::builder().uri("/raster/files").body(Body::empty())?;
    let (status, _) = read_json(&router, req).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn test_graphics_lifecycle() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/pop_density/pd_ic_1km")
            .query_param("iso3", "MEX");
        then.status(200).json_body(json!({"data": [
            {"popyear": 2018, "url_img": "http://x/2018.png"},
            {"popyear": "2020", "url_img": "http://x/2020.png"}
        ]}));
    });
    let router = router_from_toml(&server)?;

    let req = Request::builder()
        .method("POST")
        .uri("/graphics?iso3=MEX&name=Mexico")
        .body(Body::empty())?;
    let (status, saved) = read_json(&router, req).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved.as_array().map(Vec::len), Some(2));

    let req = Request::builder()
        .uri("/graphics?name=Mexico")
        .body(Body::empty())?;
    let (_, found) = read_json(&router, req).await?;
    assert_eq!(found[1]["year"], 2020);
    assert_eq!(found[1]["url"], "http://x/2020.png");

    let req = Request::builder()
        .method("DELETE")
        .uri("/graphics?name=Mexico")
        .body(Body::empty())?;
    let (_, deleted) = read_json(&router, req).await?;
    assert_eq!(deleted, json!({"deleted": 2}));

    let req = Request::builder()
        .uri("/graphics/urls?year=2020")
        .body(Body::empty())?;
    let (status, _) = read_json(&router, req).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn test_layer_requires_type_and_features() -> Result<()> {
    let server = MockServer::start();
    let router = router_from_toml(&server)?;

    let req = Request::builder()
        .method("POST")
        .uri("/layers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"type": "pob"}).to_string()))?;
    let (status, body) = read_json(&router, req).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("features"));

    let req = Request::builder().uri("/layers").body(Body::empty())?;
    let (status, layers) = read_json(&router, req).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(layers, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_cors_allows_configured_origin_only() -> Result<()> {
    let server = MockServer::start();
    let router = router_from_toml(&server)?;

    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/layers")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
    };

    let resp = router.clone().oneshot(preflight("http://localhost:5173")?).await?;
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );

    let resp = router.clone().oneshot(preflight("http://localhost:3000")?).await?;
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    Ok(())
}
