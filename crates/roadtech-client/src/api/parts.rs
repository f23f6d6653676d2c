//! Parts discovery endpoints: search by proximity, shops nearby.

use std::sync::Arc;

use roadtech_core::ApiError;
use roadtech_core::domain::{Part, PartsProvider};

use crate::http::ApiClient;

/// Parameters for a proximity parts search.
#[derive(Debug, Clone)]
pub struct PartsSearch {
    pub category: Option<String>,
    pub search: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
}

impl PartsSearch {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            category: None,
            search: None,
            latitude,
            longitude,
            radius_km: None,
        }
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(category) = &self.category {
            query.push(("category".to_string(), category.clone()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        query.push(("latitude".to_string(), self.latitude.to_string()));
        query.push(("longitude".to_string(), self.longitude.to_string()));
        if let Some(radius_km) = self.radius_km {
            query.push(("radiusKm".to_string(), radius_km.to_string()));
        }
        query
    }
}

#[derive(Clone)]
pub struct PartsApi {
    client: Arc<ApiClient>,
}

impl PartsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn search(&self, params: &PartsSearch) -> Result<Vec<Part>, ApiError> {
        self.client
            .get_query("/parts/search", params.to_query())
            .await
    }

    pub async fn nearby_providers(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: Option<f64>,
    ) -> Result<Vec<PartsProvider>, ApiError> {
        let mut query = vec![
            ("latitude".to_string(), latitude.to_string()),
            ("longitude".to_string(), longitude.to_string()),
        ];
        if let Some(radius_km) = radius_km {
            query.push(("radiusKm".to_string(), radius_km.to_string()));
        }
        self.client
            .get_query("/parts/providers/nearby", query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_omits_unset_filters() {
        let query = PartsSearch::at(52.52, 13.405).to_query();
        assert_eq!(
            query,
            vec![
                ("latitude".to_string(), "52.52".to_string()),
                ("longitude".to_string(), "13.405".to_string()),
            ]
        );
    }
}
