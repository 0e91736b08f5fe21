use crate::error::{MockAllError, Result};
use crate::reflect::MarkerKind;
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Comma separated marker kinds that make a field injectable, e.g. `Autowired,Resource`.
pub const INJECTABLE_MARKERS_KEY: &str = "MOCK_ALL_INJECTABLE_MARKERS";

/// Listener order override.
pub const ORDER_KEY: &str = "MOCK_ALL_ORDER";

/// Key/value configuration source
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Snapshot of the process environment.
    pub fn new() -> Self {
        Self::from_pairs(env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let service = Self::default();
        for (key, value) in pairs {
            service.set(key.as_ref(), value.as_ref());
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

/// Settings fixed at listener construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Position among the host's listeners, higher runs later.
    pub order: i32,
    /// Markers that make a field injectable. `NotMocked` is handled separately.
    pub injectable_markers: Vec<MarkerKind>,
}

impl ListenerConfig {
    pub const DEFAULT_ORDER: i32 = 10000;

    pub fn default_injectable_markers() -> Vec<MarkerKind> {
        vec![
            MarkerKind::Autowired,
            MarkerKind::Resource,
            MarkerKind::JakartaResource,
        ]
    }

    /// Read overrides from `config`, falling back to the defaults for absent keys.
    ///
    /// # Errors
    /// [`MockAllError::InvalidConfiguration`] for an unparsable order, an unknown marker
    /// kind, or a marker list naming `NotMocked` or `Qualifier`.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(order) = config.get(ORDER_KEY) {
            settings.order = order.trim().parse().map_err(|_| MockAllError::InvalidConfiguration {
                message: format!("{} must be an integer, got '{}'", ORDER_KEY, order),
            })?;
        }

        if let Some(markers) = config.get(INJECTABLE_MARKERS_KEY) {
            settings.injectable_markers = parse_markers(&markers)?;
        }

        tracing::debug!(
            "Listener config: order={}, injectable markers={:?}",
            settings.order,
            settings.injectable_markers
        );
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&ConfigService::new())
    }

    pub fn with_injectable_markers(mut self, markers: Vec<MarkerKind>) -> Self {
        self.injectable_markers = markers;
        self
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            order: Self::DEFAULT_ORDER,
            injectable_markers: Self::default_injectable_markers(),
        }
    }
}

fn parse_markers(raw: &str) -> Result<Vec<MarkerKind>> {
    let mut markers = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let kind = MarkerKind::from_str(name).map_err(|_| MockAllError::InvalidConfiguration {
            message: format!("unknown marker kind '{}' in {}", name, INJECTABLE_MARKERS_KEY),
        })?;
        if matches!(kind, MarkerKind::NotMocked | MarkerKind::Qualifier) {
            return Err(MockAllError::InvalidConfiguration {
                message: format!("{} cannot be used as an injectable marker", kind),
            });
        }
        if !markers.contains(&kind) {
            markers.push(kind);
        }
    }
    Ok(markers)
}
