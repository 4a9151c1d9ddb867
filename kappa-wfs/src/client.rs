use std::time::Duration;

use reqwest::blocking::Client;

use kappa_core::geojson::FeatureCollection;

use crate::error::WfsError;

/// Fixed per-request timeout; pages that take longer fail the fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A WFS feature layer that can be read in pages.
pub trait FeatureSource {
    /// Total number of features the layer will serve.
    fn total_features(&self) -> Result<u64, WfsError>;

    /// One page of features, sorted by a stable identifier field.
    fn fetch_page(&self, offset: u64, count: u64) -> Result<FeatureCollection, WfsError>;
}

/// Feature layer behind a WFS 1.1.0 endpoint, read with `GetFeature`
/// requests in JSON output format.
pub struct HttpFeatureSource {
    client: Client,
    url: String,
    layer: String,
    sort_field: String,
}

impl HttpFeatureSource {
    pub fn new(url: &str, layer: &str) -> Result<Self, WfsError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(HttpFeatureSource {
            client,
            url: url.to_string(),
            layer: layer.to_string(),
            sort_field: "OBJECTID".to_string(),
        })
    }

    pub fn with_sort_field(mut self, field: &str) -> Self {
        self.sort_field = field.to_string();
        self
    }

    fn get_feature(&self, params: &[(&str, String)]) -> Result<FeatureCollection, WfsError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("service", "WFS"),
                ("version", "1.1.0"),
                ("request", "GetFeature"),
                ("typeName", self.layer.as_str()),
                ("outputFormat", "json"),
            ])
            .query(params)
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }
}

impl FeatureSource for HttpFeatureSource {
    fn total_features(&self) -> Result<u64, WfsError> {
        let probe = self.get_feature(&[("maxFeatures", "1".to_string())])?;
        probe.total_features.ok_or_else(|| {
            WfsError::Malformed("count response is missing totalFeatures".to_string())
        })
    }

    fn fetch_page(&self, offset: u64, count: u64) -> Result<FeatureCollection, WfsError> {
        self.get_feature(&[
            ("maxFeatures", count.to_string()),
            ("startIndex", offset.to_string()),
            ("sortby", self.sort_field.clone()),
        ])
    }
}
