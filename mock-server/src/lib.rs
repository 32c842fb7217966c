//! Stand-in for the GDP backend, for integration tests and local runs.
//!
//! Serves every path the client catalog uses under `/api`, with canned
//! payloads shaped like the real backend's. Every request is recorded
//! (method, raw percent-encoded path, body length) before it is routed, and
//! `MockOptions` can delay responses or force a path to answer with a soft
//! failure or an error status.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
    body::{to_bytes, Body},
    extract::{Multipart, Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const PROVINCES: [&str; 31] = [
    "北京市", "天津市", "上海市", "重庆市", "内蒙古自治区", "广西壮族自治区",
    "西藏自治区", "宁夏回族自治区", "新疆维吾尔自治区", "河北省", "山西省",
    "辽宁省", "吉林省", "黑龙江省", "江苏省", "浙江省", "安徽省", "福建省",
    "江西省", "山东省", "河南省", "湖北省", "湖南省", "广东省", "海南省",
    "四川省", "贵州省", "云南省", "陕西省", "甘肃省", "青海省",
];

pub const TABLES: [&str; 6] = [
    "人口数据",
    "地方财政支出数据",
    "季度数据",
    "季度指数数据",
    "年度数据",
    "消费品数据",
];

/// Year keys are data column names, so a bare year and a `年`-suffixed one
/// can both appear.
pub const SPATIAL_YEARS: [&str; 4] = ["2021", "2022", "2023", "2024年"];

const CUSTOM_PREDICTION_FILES: [&str; 4] = ["population", "consumption", "gdp", "financial"];

/// A request as the server saw it, before routing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub method: String,
    /// Path as sent on the wire, still percent-encoded.
    pub path: String,
    pub body_len: usize,
    #[serde(default)]
    pub content_type: Option<String>,
}

pub type RequestLog = Arc<RwLock<Vec<RecordedRequest>>>;

/// Injected behaviour, keyed by the raw (percent-encoded) request path.
#[derive(Clone, Debug, Default)]
pub struct MockOptions {
    pub delay: Duration,
    pub path_delays: HashMap<String, Duration>,
    pub soft_failures: HashMap<String, String>,
    pub error_statuses: HashMap<String, u16>,
    /// Largest request body accepted; `None` means no limit.
    pub body_limit: Option<usize>,
}

impl MockOptions {
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay_path(mut self, path: &str, delay: Duration) -> Self {
        self.path_delays.insert(path.to_string(), delay);
        self
    }

    pub fn soft_failure(mut self, path: &str, message: &str) -> Self {
        self.soft_failures.insert(path.to_string(), message.to_string());
        self
    }

    pub fn error_status(mut self, path: &str, status: u16) -> Self {
        self.error_statuses.insert(path.to_string(), status);
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }
}

#[derive(Clone, Default)]
pub struct AppState {
    log: RequestLog,
    options: Arc<MockOptions>,
}

impl AppState {
    pub fn new(options: MockOptions) -> Self {
        Self {
            log: RequestLog::default(),
            options: Arc::new(options),
        }
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/{table}", get(table_data))
        .route("/spatial/available-years", get(spatial_years))
        .route("/spatial/data/{year}", get(spatial_data))
        .route("/spatial/stats/{year}", get(spatial_stats))
        .route("/spatial/refresh", post(spatial_refresh))
        .route("/gdp/historical/{province}", get(gdp_historical))
        .route("/gdp/predict/{province}", get(gdp_predict))
        .route("/gdp/metrics/{province}", get(gdp_metrics))
        .route("/gdp/predict_custom", post(gdp_predict_custom));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record_and_inject))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn record_and_inject(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let options = &state.options;
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();
    let bytes = match to_bytes(body, options.body_limit.unwrap_or(usize::MAX)).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(method = %parts.method, %path, error = %err, "unreadable request body");
            return bad_request("无法读取请求体");
        }
    };
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    info!(method = %parts.method, %path, body_len = bytes.len(), "request");
    state.log.write().await.push(RecordedRequest {
        method: parts.method.to_string(),
        path: path.clone(),
        body_len: bytes.len(),
        content_type,
    });

    let delay = options.path_delays.get(&path).copied().unwrap_or(options.delay);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if let Some(status) = options.error_statuses.get(&path) {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"success": false, "message": "injected failure"})))
            .into_response();
    }
    if let Some(message) = options.soft_failures.get(&path) {
        return Json(json!({"code": -1, "message": message})).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn is_province(name: &str) -> bool {
    PROVINCES.contains(&name)
}

fn invalid_province(province: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "message": format!("省份名称 '{province}' 无效")})),
    )
        .into_response()
}

/// Deterministic GDP figure for a province and year.
fn gdp_value(province: &str, year: i32) -> f64 {
    let seed = province.chars().map(u32::from).sum::<u32>() % 5000;
    let base = 2000.0 + f64::from(seed);
    let growth = 1.07_f64.powi(year - 2005);
    (base * growth * 100.0).round() / 100.0
}

async fn table_data(Path(table): Path<String>) -> Response {
    if !TABLES.contains(&table.as_str()) {
        return (StatusCode::NOT_FOUND, Json(json!({"code": 404, "msg": "表不存在"})))
            .into_response();
    }
    let rows: Vec<Value> = PROVINCES
        .iter()
        .take(3)
        .map(|province| {
            json!({
                "地区": province,
                "2023年": format!("{:.2}", gdp_value(province, 2023)),
                "2022年": format!("{:.2}", gdp_value(province, 2022)),
            })
        })
        .collect();
    let total = rows.len();
    Json(json!({"code": 0, "msg": "ok", "data": rows, "total": total})).into_response()
}

async fn spatial_years() -> Json<Value> {
    Json(json!({"available_years": SPATIAL_YEARS}))
}

async fn spatial_data(Path(year): Path<String>) -> Response {
    if !SPATIAL_YEARS.contains(&year.as_str()) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "type": "FeatureCollection",
                "features": [],
                "message": format!("未找到 {year} 的预处理数据，请先访问 /api/spatial/refresh 生成数据"),
                "action_required": true,
            })),
        )
            .into_response();
    }
    let features: Vec<Value> = PROVINCES
        .iter()
        .take(3)
        .map(|province| {
            json!({
                "type": "Feature",
                "properties": {"name": province, "gdp": gdp_value(province, 2023), "lisa_type": "不显著"},
                "geometry": null,
            })
        })
        .collect();
    Json(json!({"type": "FeatureCollection", "features": features})).into_response()
}

async fn spatial_stats(Path(year): Path<String>) -> Response {
    if !SPATIAL_YEARS.contains(&year.as_str()) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("未找到 {year} 的数据"),
                "solution": "请先访问 /api/spatial/refresh 生成空间分析数据",
            })),
        )
            .into_response();
    }
    Json(json!({
        "year": year,
        "province_count": PROVINCES.len(),
        "gdp_total": 1_260_582.1,
        "gdp_avg": 40_664.0,
        "gdp_max": 135_673.2,
        "gdp_min": 2_392.7,
        "moran_I": 0.274,
        "moran_p": 0.01,
        "lisa_distribution": {"不显著": 25, "HH": 4, "LL": 2},
        "gi_distribution": {"不显著": 24, "热点": 5, "冷点": 2},
    }))
    .into_response()
}

async fn spatial_refresh() -> Json<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    Json(json!({
        "status": "success",
        "message": "空间分析数据刷新完成",
        "timestamp": timestamp.to_string(),
    }))
}

fn series(province: &str, years: std::ops::RangeInclusive<i32>) -> Value {
    let data: Vec<Value> = years
        .map(|year| json!({"year": year, "gdp": gdp_value(province, year)}))
        .collect();
    json!({"success": true, "province": province, "data": data})
}

async fn gdp_historical(Path(province): Path<String>) -> Response {
    if !is_province(&province) {
        return invalid_province(&province);
    }
    Json(series(&province, 2005..=2024)).into_response()
}

async fn gdp_predict(Path(province): Path<String>) -> Response {
    if !is_province(&province) {
        return invalid_province(&province);
    }
    Json(series(&province, 2025..=2026)).into_response()
}

async fn gdp_metrics(Path(province): Path<String>) -> Response {
    if !is_province(&province) {
        return invalid_province(&province);
    }
    Json(json!({
        "success": true,
        "province": province,
        "metrics": {
            "saved_at": "2025-12-07T10:30:00",
            "num_epochs": 5,
            "hyperparams": {"hidden_size": 8, "num_layers": 2, "predict_steps": 2, "window_size": 6},
            "metrics": {
                "train_loss": [0.5, 0.4, 0.3, 0.25, 0.2],
                "test_loss": [0.52, 0.42, 0.32, 0.27, 0.22],
            },
        },
    }))
    .into_response()
}

async fn gdp_predict_custom(mut multipart: Multipart) -> Response {
    let mut province = None;
    let mut files: Vec<String> = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_string();
                let is_file = field.file_name().is_some();
                let Ok(text) = field.text().await else {
                    return bad_request("无法读取上传内容");
                };
                if is_file {
                    files.push(name);
                } else if name == "province" {
                    province = Some(text);
                }
            }
            Ok(None) => break,
            Err(_) => return bad_request("无法解析上传表单"),
        }
    }

    if CUSTOM_PREDICTION_FILES.iter().any(|f| !files.iter().any(|got| got == f)) {
        return bad_request("必须提供四个CSV文件：population, consumption, gdp, financial");
    }
    let Some(province) = province else {
        return bad_request("缺少省份参数");
    };
    Json(series(&province, 2025..=2026)).into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"success": false, "message": message}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gdp_value_grows_each_year() {
        let a = gdp_value("云南省", 2020);
        let b = gdp_value("云南省", 2021);
        assert!(b > a);
        assert_eq!(gdp_value("云南省", 2020), a);
    }

    #[test]
    fn series_covers_inclusive_range() {
        let value = series("云南省", 2005..=2024);
        assert_eq!(value["data"].as_array().unwrap().len(), 20);
        assert_eq!(value["data"][0]["year"], 2005);
        assert_eq!(value["province"], "云南省");
    }

    #[test]
    fn options_builders_key_by_raw_path() {
        let options = MockOptions::default()
            .delay(Duration::from_millis(5))
            .delay_path("/api/gdp/predict/x", Duration::from_millis(50))
            .soft_failure("/api/spatial/available-years", "暂无数据")
            .error_status("/api/spatial/refresh", 503)
            .body_limit(1024);
        assert_eq!(options.delay, Duration::from_millis(5));
        assert_eq!(options.path_delays["/api/gdp/predict/x"], Duration::from_millis(50));
        assert_eq!(options.soft_failures["/api/spatial/available-years"], "暂无数据");
        assert_eq!(options.error_statuses["/api/spatial/refresh"], 503);
        assert_eq!(options.body_limit, Some(1024));
        assert_eq!(MockOptions::default().body_limit, None);
    }

    #[test]
    fn recorded_request_serializes() {
        let recorded = RecordedRequest {
            method: "GET".into(),
            path: "/api/gdp/predict/Yunnan".into(),
            body_len: 0,
            content_type: None,
        };
        let json = serde_json::to_value(&recorded).unwrap();
        assert_eq!(json["path"], "/api/gdp/predict/Yunnan");
        assert_eq!(json["body_len"], 0);
    }
}
