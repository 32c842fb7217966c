//! Async client for the GDP statistics and prediction backend.
//!
//! # Overview
//! `GdpClient` exposes one method per backend capability (statistics tables,
//! spatial analysis, GDP history/prediction/metrics). Each method builds a
//! request from the `Endpoint` catalog and hands it to the shared `Transport`,
//! which owns the base URL, the timeout and all user-visible notifications.
//!
//! # Design
//! - The catalog is sans-IO: `Endpoint::into_request` returns plain data, so
//!   every path and body can be checked without a server.
//! - `Transport` is built once and shared by clone; nothing in it changes
//!   after construction.
//! - Notifications go through the `Notifier` trait, keeping the transport
//!   independent of any particular UI.
//! - Soft failures (2xx with the sentinel status in the body) resolve as
//!   `Ok`; transport failures return `Err`. Both notify exactly once.
//!
//! ```no_run
//! # async fn demo() -> Result<(), gdp_api_core::ApiError> {
//! use gdp_api_core::{ClientConfig, GdpClient, GdpPrediction};
//!
//! let client = GdpClient::from_config(ClientConfig::default())?;
//! let response = client.gdp_prediction("云南省").await?;
//! let prediction: GdpPrediction = response.json()?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod notifier;
pub mod routes;
pub mod transport;
pub mod types;

pub use catalog::{encode_segment, Endpoint};
pub use client::GdpClient;
pub use config::ClientConfig;
pub use envelope::SoftFailurePolicy;
pub use error::ApiError;
pub use http::{FilePart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use notifier::{Notification, Notifier, RecordingNotifier, TracingNotifier, NETWORK_ERROR_MESSAGE};
pub use routes::{Resolved, RouteTable, View};
pub use transport::{PassThrough, RequestInterceptor, Transport, TransportBuilder};
pub use types::{
    BackendFailure, CsvUpload, CustomPredictionForm, GdpHistorical, GdpMetrics, GdpPoint,
    GdpPrediction, GdpSeries, RefreshOutcome, SpatialYearStats, SpatialYears, TableData,
    TrainingMetrics,
};
