//! Typed views of backend payloads, and the custom-prediction upload.
//!
//! # Design
//! The API layer returns raw responses. These DTOs are for callers that want
//! to decode a body with `HttpResponse::json`. Fields the backend may omit
//! are `Option` or `#[serde(default)]`; unknown fields are ignored so a newer
//! backend does not break older clients.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::http::{FilePart, MultipartForm, RequestBody};

/// Rows of a statistics table (`/人口数据` and friends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub total: u64,
}

/// One year of GDP, observed or predicted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GdpPoint {
    pub year: i32,
    pub gdp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpSeries {
    pub success: bool,
    pub province: String,
    pub data: Vec<GdpPoint>,
}

/// `/gdp/historical/{province}`.
pub type GdpHistorical = GdpSeries;

/// `/gdp/predict/{province}` and `/gdp/predict_custom`.
pub type GdpPrediction = GdpSeries;

/// `/gdp/metrics/{province}`: training curves saved alongside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpMetrics {
    pub success: bool,
    pub province: String,
    pub metrics: TrainingMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    #[serde(default)]
    pub saved_at: Option<String>,
    #[serde(default)]
    pub num_epochs: Option<u32>,
    #[serde(default)]
    pub hyperparams: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialYears {
    pub available_years: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialYearStats {
    pub year: String,
    pub province_count: u32,
    pub gdp_total: f64,
    pub gdp_avg: f64,
    pub gdp_max: f64,
    pub gdp_min: f64,
    #[serde(rename = "moran_I")]
    pub moran_i: Option<f64>,
    pub moran_p: Option<f64>,
    #[serde(default)]
    pub lisa_distribution: BTreeMap<String, u32>,
    #[serde(default)]
    pub gi_distribution: BTreeMap<String, u32>,
}

/// `POST /spatial/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl RefreshOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

/// Error body the GDP endpoints send with 4xx/5xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFailure {
    pub success: bool,
    pub message: String,
}

/// One CSV file for a custom prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvUpload {
    pub file_name: String,
    pub contents: Bytes,
}

impl CsvUpload {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }
}

/// The four CSV inputs the predictor needs, plus the target province.
///
/// Each CSV must contain a column named after the province; the backend
/// checks that, not this type.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomPredictionForm {
    pub province: String,
    pub population: CsvUpload,
    pub consumption: CsvUpload,
    pub gdp: CsvUpload,
    pub financial: CsvUpload,
}

impl CustomPredictionForm {
    pub fn into_body(self) -> RequestBody {
        let mut form = MultipartForm::new().text("province", self.province);
        for (field, upload) in [
            ("population", self.population),
            ("consumption", self.consumption),
            ("gdp", self.gdp),
            ("financial", self.financial),
        ] {
            form = form.file(FilePart {
                field: field.to_string(),
                file_name: upload.file_name,
                content_type: "text/csv".to_string(),
                bytes: upload.contents,
            });
        }
        RequestBody::Multipart(form)
    }
}

impl From<CustomPredictionForm> for RequestBody {
    fn from(form: CustomPredictionForm) -> Self {
        form.into_body()
    }
}
