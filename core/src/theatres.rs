//! Nearby theatre lookup.
//!
//! Combines the location bridge with the map search collaborator: permission,
//! then one location fix, then a natural-language search around it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TheatreConfig;
use crate::error::LocationError;
use crate::location::{Coordinate, LocationBridge};

/// Rectangular search area centred on a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub latitude_meters: f64,
    pub longitude_meters: f64,
}

impl Region {
    pub fn around(center: Coordinate, span_meters: f64) -> Self {
        Self {
            center,
            latitude_meters: span_meters,
            longitude_meters: span_meters,
        }
    }
}

/// A map search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub coordinate: Coordinate,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub url: Option<String>,
}

/// Map/geocoding collaborator.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, query: &str, region: Region) -> Result<Vec<Place>, LocationError>;
}

#[derive(Clone)]
pub struct TheatreService {
    bridge: Arc<LocationBridge>,
    places: Arc<dyn PlaceSearch>,
    config: TheatreConfig,
}

impl TheatreService {
    pub fn new(
        bridge: Arc<LocationBridge>,
        places: Arc<dyn PlaceSearch>,
        config: TheatreConfig,
    ) -> Self {
        Self {
            bridge,
            places,
            config,
        }
    }

    /// Theatres around the user's current location.
    ///
    /// # Errors
    /// - `LocationError::NotAuthorized` when location access is refused
    /// - any error from the bridge or the search collaborator, unchanged
    pub async fn nearby(&self) -> Result<Vec<Place>, LocationError> {
        let status = self.bridge.request_permission().await?;
        if !status.is_authorized() {
            info!(?status, "location access not granted");
            return Err(LocationError::NotAuthorized(status));
        }
        let here = self.bridge.request_location().await?;
        self.search_near(here).await
    }

    pub async fn search_near(&self, center: Coordinate) -> Result<Vec<Place>, LocationError> {
        let region = Region::around(center, self.config.span_meters);
        let places = self.places.search(&self.config.query, region).await?;
        debug!(count = places.len(), "theatre search finished");
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::location::{AuthorizationStatus, LocationPlatform};

    /// Platform that answers every trigger synchronously through the bridge.
    struct Answering {
        status: AuthorizationStatus,
        fix: Coordinate,
        bridge: Mutex<Option<std::sync::Weak<LocationBridge>>>,
    }

    impl Answering {
        fn bridge(&self) -> Option<Arc<LocationBridge>> {
            self.bridge.lock().as_ref().and_then(|b| b.upgrade())
        }
    }

    impl LocationPlatform for Answering {
        fn authorization_status(&self) -> AuthorizationStatus {
            self.status
        }

        fn request_when_in_use_authorization(&self) {}

        fn request_location(&self) {
            if let Some(bridge) = self.bridge() {
                bridge.did_update_locations(&[self.fix]);
            }
        }
    }

    struct Recording {
        queries: Mutex<Vec<(String, Region)>>,
    }

    #[async_trait]
    impl PlaceSearch for Recording {
        async fn search(&self, query: &str, region: Region) -> Result<Vec<Place>, LocationError> {
            self.queries.lock().push((query.to_string(), region));
            Ok(vec![Place {
                name: "Castro Theatre".to_string(),
                coordinate: Coordinate::new(37.762, -122.435),
                address: Some("429 Castro St".to_string()),
                phone_number: None,
                url: None,
            }])
        }
    }

    fn service(status: AuthorizationStatus) -> (TheatreService, Arc<Recording>) {
        let platform = Arc::new(Answering {
            status,
            fix: Coordinate::new(37.7749, -122.4194),
            bridge: Mutex::new(None),
        });
        let bridge = Arc::new(LocationBridge::new(platform.clone()));
        *platform.bridge.lock() = Some(Arc::downgrade(&bridge));
        let places = Arc::new(Recording {
            queries: Mutex::new(Vec::new()),
        });
        let service = TheatreService::new(bridge, places.clone(), TheatreConfig::default());
        (service, places)
    }

    #[tokio::test]
    async fn nearby_searches_around_the_fix() {
        let (service, places) = service(AuthorizationStatus::AuthorizedWhenInUse);
        let found = service.nearby().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Castro Theatre");

        let queries = places.queries.lock();
        assert_eq!(queries[0].0, "movie theater");
        assert_eq!(queries[0].1.center, Coordinate::new(37.7749, -122.4194));
        assert_eq!(queries[0].1.latitude_meters, 10_000.0);
    }

    #[tokio::test]
    async fn denied_access_never_searches() {
        let (service, places) = service(AuthorizationStatus::Denied);
        let err = service.nearby().await.unwrap_err();
        assert!(matches!(
            err,
            LocationError::NotAuthorized(AuthorizationStatus::Denied)
        ));
        assert!(places.queries.lock().is_empty());
    }
}
