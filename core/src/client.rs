//! The API access layer: one async method per backend capability.
//!
//! Every method issues exactly one `Transport::send` and returns its result
//! untouched. Nothing is unwrapped, retried or cached here; soft failures and
//! transport errors are handled (and surfaced) by the transport alone.

use crate::catalog::Endpoint;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpResponse, RequestBody};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct GdpClient {
    transport: Transport,
}

impl GdpClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Client over a transport with the default notifier and interceptor.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Transport::builder(config).build().map(Self::new)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub async fn call(&self, endpoint: Endpoint) -> Result<HttpResponse, ApiError> {
        tracing::debug!(operation = endpoint.name(), "api call");
        self.transport.send(endpoint.into_request()).await
    }

    pub async fn population_data(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::PopulationData).await
    }

    pub async fn financial_expenditure_data(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::FinancialExpenditureData).await
    }

    pub async fn quarterly_data(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::QuarterlyData).await
    }

    pub async fn quarterly_index_data(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::QuarterlyIndexData).await
    }

    pub async fn annual_data(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::AnnualData).await
    }

    pub async fn consumer_goods_data(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::ConsumerGoodsData).await
    }

    pub async fn spatial_analysis_data(&self, year: i32) -> Result<HttpResponse, ApiError> {
        self.spatial_analysis_data_for_key(&year.to_string()).await
    }

    /// Same as `spatial_analysis_data`, for a key taken verbatim from
    /// `spatial_available_years` (the backend also lists keys like `"2023年"`).
    pub async fn spatial_analysis_data_for_key(&self, year: &str) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::SpatialAnalysisData {
            year: year.to_string(),
        })
        .await
    }

    pub async fn spatial_available_years(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::SpatialAvailableYears).await
    }

    pub async fn spatial_year_stats(&self, year: i32) -> Result<HttpResponse, ApiError> {
        self.spatial_year_stats_for_key(&year.to_string()).await
    }

    pub async fn spatial_year_stats_for_key(&self, year: &str) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::SpatialYearStats {
            year: year.to_string(),
        })
        .await
    }

    /// `POST /spatial/refresh` with an empty body.
    pub async fn refresh_spatial_data(&self) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::RefreshSpatialData).await
    }

    pub async fn gdp_historical_data(&self, province: &str) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::GdpHistoricalData {
            province: province.to_string(),
        })
        .await
    }

    pub async fn gdp_prediction(&self, province: &str) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::GdpPrediction {
            province: province.to_string(),
        })
        .await
    }

    pub async fn gdp_metrics(&self, province: &str) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::GdpMetrics {
            province: province.to_string(),
        })
        .await
    }

    /// Body goes out exactly as given; see `CustomPredictionForm` for the
    /// multipart layout the backend expects.
    pub async fn gdp_custom_prediction(
        &self,
        body: impl Into<RequestBody>,
    ) -> Result<HttpResponse, ApiError> {
        self.call(Endpoint::GdpCustomPrediction { body: body.into() })
            .await
    }
}
