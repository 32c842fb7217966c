//! Route table for the visualization views.
//!
//! Views themselves live outside this crate. The table only maps URL paths
//! to views, redirects the root to the map, and records which catalog
//! operations each view calls.

use crate::catalog::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Map,
    Comparison,
    Heatmap,
    Population,
    Predict,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Map,
        View::Comparison,
        View::Heatmap,
        View::Population,
        View::Predict,
    ];

    pub fn path(self) -> &'static str {
        match self {
            View::Map => "/map",
            View::Comparison => "/comparison",
            View::Heatmap => "/heatmap",
            View::Population => "/population",
            View::Predict => "/predict",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            View::Map => "Map",
            View::Comparison => "Comparison",
            View::Heatmap => "Heatmap",
            View::Population => "Population",
            View::Predict => "Predict",
        }
    }

    /// Catalog operations the view is assumed to issue, going by what each
    /// page displays; the page components themselves are not part of this
    /// crate. Parameterized operations carry placeholder arguments.
    pub fn endpoints(self) -> Vec<Endpoint> {
        match self {
            View::Map => vec![
                Endpoint::SpatialAvailableYears,
                Endpoint::SpatialAnalysisData { year: String::new() },
                Endpoint::SpatialYearStats { year: String::new() },
                Endpoint::RefreshSpatialData,
            ],
            View::Comparison => vec![
                Endpoint::AnnualData,
                Endpoint::QuarterlyData,
                Endpoint::QuarterlyIndexData,
            ],
            View::Heatmap => vec![
                Endpoint::FinancialExpenditureData,
                Endpoint::ConsumerGoodsData,
            ],
            View::Population => vec![Endpoint::PopulationData],
            View::Predict => vec![
                Endpoint::GdpHistoricalData { province: String::new() },
                Endpoint::GdpPrediction { province: String::new() },
                Endpoint::GdpMetrics { province: String::new() },
                Endpoint::GdpCustomPrediction {
                    body: crate::http::RequestBody::Empty,
                },
            ],
        }
    }
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    View(View),
    Redirect(&'static str),
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    default_view: View,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            default_view: View::Map,
        }
    }
}

impl RouteTable {
    pub fn new(default_view: View) -> Self {
        Self { default_view }
    }

    pub fn default_view(&self) -> View {
        self.default_view
    }

    /// Query strings and fragments are ignored, as is one trailing slash.
    pub fn resolve(&self, path: &str) -> Option<Resolved> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() || path == "/" {
            return Some(Resolved::Redirect(self.default_view.path()));
        }
        let path = path.strip_suffix('/').unwrap_or(path);
        View::ALL
            .into_iter()
            .find(|view| view.path() == path)
            .map(Resolved::View)
    }

    /// Follows a redirect to the view it lands on.
    pub fn view_for(&self, path: &str) -> Option<View> {
        match self.resolve(path)? {
            Resolved::View(view) => Some(view),
            Resolved::Redirect(target) => self.view_for(target),
        }
    }
}
