//! Composition root.
//!
//! # Design
//! `ServiceRegistry` maps a type identity to one instance. It is an ordinary
//! value built at startup (or in test setup) and passed by reference to
//! `AppServices::compose`, which resolves every dependency exactly once.
//! Nothing resolves from the registry after composition.
//!
//! Keys are exact types: an entry registered as `Arc<SqliteFavoriteStore>`
//! does not answer a lookup for `Arc<dyn FavoriteStore>`. Register trait
//! objects under the trait-object type the consumers ask for.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::client::TmdbClient;
use crate::config::{ApiConfig, TheatreConfig};
use crate::error::ContainerError;
use crate::favorites::{FavoriteStore, FavoritesService};
use crate::location::{LocationBridge, LocationPlatform};
use crate::movies::MovieService;
use crate::theatres::{PlaceSearch, TheatreService};
use crate::transport::{HttpBackend, Transport};

struct Registration {
    type_name: &'static str,
    instance: Box<dyn Any + Send + Sync>,
}

/// Type-keyed registry of shared instances.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: HashMap<TypeId, Registration>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `instance` under `T`, replacing any earlier registration.
    pub fn register<T>(&mut self, instance: T)
    where
        T: Any + Clone + Send + Sync,
    {
        let registration = Registration {
            type_name: type_name::<T>(),
            instance: Box::new(instance),
        };
        if let Some(previous) = self.entries.insert(TypeId::of::<T>(), registration) {
            debug!(service = previous.type_name, "registration replaced");
        }
    }

    /// The latest instance registered under `T`, if any.
    pub fn resolve<T>(&self) -> Option<T>
    where
        T: Any + Clone + Send + Sync,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.instance.downcast_ref::<T>())
            .cloned()
    }

    /// Like `resolve`, but a missing registration is a configuration error.
    pub fn require<T>(&self) -> Result<T, ContainerError>
    where
        T: Any + Clone + Send + Sync,
    {
        self.resolve().ok_or(ContainerError::Missing {
            type_name: type_name::<T>(),
        })
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered type names, sorted. Handy in startup diagnostics.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }
}

/// Fully wired domain services handed to the UI layer.
#[derive(Clone)]
pub struct AppServices {
    pub movies: MovieService,
    pub favorites: FavoritesService,
    pub location: Arc<LocationBridge>,
    pub theatres: TheatreService,
    pub config: ApiConfig,
}

impl AppServices {
    /// Resolve the collaborators and wire the services.
    ///
    /// Requires `ApiConfig`, `Arc<dyn HttpBackend>`, `Arc<dyn FavoriteStore>`,
    /// `Arc<dyn LocationPlatform>` and `Arc<dyn PlaceSearch>`. `TheatreConfig`
    /// is optional and falls back to its default.
    ///
    /// # Errors
    /// - `ContainerError::Missing` naming the first absent dependency
    pub fn compose(registry: &ServiceRegistry) -> Result<Self, ContainerError> {
        let config: ApiConfig = registry.require()?;
        let backend: Arc<dyn HttpBackend> = registry.require()?;
        let store: Arc<dyn FavoriteStore> = registry.require()?;
        let platform: Arc<dyn LocationPlatform> = registry.require()?;
        let places: Arc<dyn PlaceSearch> = registry.require()?;
        let theatre_config: TheatreConfig = registry.resolve().unwrap_or_default();

        let movies = MovieService::new(TmdbClient::new(config.clone()), Transport::new(backend));
        let location = Arc::new(LocationBridge::new(platform));
        let theatres = TheatreService::new(location.clone(), places, theatre_config);

        debug!(services = ?registry.type_names(), "services composed");
        Ok(Self {
            movies,
            favorites: FavoritesService::new(store),
            location,
            theatres,
            config,
        })
    }
}
