//! The operation catalog: one `Endpoint` per backend capability.
//!
//! # Design
//! Each variant knows its method, its path and its body, and nothing else.
//! `Endpoint::into_request` produces the `HttpRequest` without doing any I/O;
//! `GdpClient` hands that request to the transport.
//!
//! Free-form path parameters (province names, spatial year keys) are
//! percent-encoded as a single segment, so `"Hong Kong/Macau"` can never split
//! the path. The statistics tables are fixed Chinese paths and are left as-is
//! here; the URL parser encodes them on the wire.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::http::{HttpMethod, HttpRequest, RequestBody};

pub const POPULATION_PATH: &str = "/人口数据";
pub const FINANCIAL_EXPENDITURE_PATH: &str = "/地方财政支出数据";
pub const QUARTERLY_PATH: &str = "/季度数据";
pub const QUARTERLY_INDEX_PATH: &str = "/季度指数数据";
pub const ANNUAL_PATH: &str = "/年度数据";
pub const CONSUMER_GOODS_PATH: &str = "/消费品数据";

/// Characters left alone by `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `value` for use as one path segment.
///
/// A whole-segment `.` or `..` is escaped too. The transport refuses to send
/// such a segment, since URL normalization would collapse it either way.
pub fn encode_segment(value: &str) -> String {
    match value {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(value, PATH_SEGMENT).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    PopulationData,
    FinancialExpenditureData,
    QuarterlyData,
    QuarterlyIndexData,
    AnnualData,
    ConsumerGoodsData,
    /// `year` is a key as listed by `SpatialAvailableYears`, e.g. `"2023"`
    /// or `"2023年"`.
    SpatialAnalysisData { year: String },
    SpatialAvailableYears,
    SpatialYearStats { year: String },
    RefreshSpatialData,
    GdpHistoricalData { province: String },
    GdpPrediction { province: String },
    GdpMetrics { province: String },
    /// Body is forwarded exactly as given.
    GdpCustomPrediction { body: RequestBody },
}

impl Endpoint {
    /// Stable snake_case name, used in logs and test vectors.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::PopulationData => "population_data",
            Endpoint::FinancialExpenditureData => "financial_expenditure_data",
            Endpoint::QuarterlyData => "quarterly_data",
            Endpoint::QuarterlyIndexData => "quarterly_index_data",
            Endpoint::AnnualData => "annual_data",
            Endpoint::ConsumerGoodsData => "consumer_goods_data",
            Endpoint::SpatialAnalysisData { .. } => "spatial_analysis_data",
            Endpoint::SpatialAvailableYears => "spatial_available_years",
            Endpoint::SpatialYearStats { .. } => "spatial_year_stats",
            Endpoint::RefreshSpatialData => "refresh_spatial_data",
            Endpoint::GdpHistoricalData { .. } => "gdp_historical_data",
            Endpoint::GdpPrediction { .. } => "gdp_prediction",
            Endpoint::GdpMetrics { .. } => "gdp_metrics",
            Endpoint::GdpCustomPrediction { .. } => "gdp_custom_prediction",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::RefreshSpatialData | Endpoint::GdpCustomPrediction { .. } => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }

    /// Path relative to the base URL, with parameters substituted.
    pub fn path(&self) -> String {
        match self {
            Endpoint::PopulationData => POPULATION_PATH.to_string(),
            Endpoint::FinancialExpenditureData => FINANCIAL_EXPENDITURE_PATH.to_string(),
            Endpoint::QuarterlyData => QUARTERLY_PATH.to_string(),
            Endpoint::QuarterlyIndexData => QUARTERLY_INDEX_PATH.to_string(),
            Endpoint::AnnualData => ANNUAL_PATH.to_string(),
            Endpoint::ConsumerGoodsData => CONSUMER_GOODS_PATH.to_string(),
            Endpoint::SpatialAnalysisData { year } => {
                format!("/spatial/data/{}", encode_segment(year))
            }
            Endpoint::SpatialAvailableYears => "/spatial/available-years".to_string(),
            Endpoint::SpatialYearStats { year } => {
                format!("/spatial/stats/{}", encode_segment(year))
            }
            Endpoint::RefreshSpatialData => "/spatial/refresh".to_string(),
            Endpoint::GdpHistoricalData { province } => {
                format!("/gdp/historical/{}", encode_segment(province))
            }
            Endpoint::GdpPrediction { province } => {
                format!("/gdp/predict/{}", encode_segment(province))
            }
            Endpoint::GdpMetrics { province } => {
                format!("/gdp/metrics/{}", encode_segment(province))
            }
            Endpoint::GdpCustomPrediction { .. } => "/gdp/predict_custom".to_string(),
        }
    }

    pub fn into_request(self) -> HttpRequest {
        let path = self.path();
        match self {
            Endpoint::GdpCustomPrediction { body } => HttpRequest::post(path, body),
            Endpoint::RefreshSpatialData => HttpRequest::post(path, RequestBody::Empty),
            _ => HttpRequest::get(path),
        }
    }
}
