//! Store application configuration that gets read from disk
use crate::services::visualization::map::{new_route_visualization_handler, MapSurface, PathStyle};
use crate::services::visualization::IconTable;
use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use simplelog::LevelFilter;
use std::collections::HashMap;
use std::io::prelude::*;
use std::iter::Iterator;
use std::path::PathBuf;
use std::str::FromStr;

static CONFIG_DIR_NAME: &str = "gps-track-mapper";
static CONFIG_FILE_NAME: &str = "config.yml";

/// Defines the allowed keys under the services map
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    RouteVisualization,
}

/// Type alias for clarity
pub type ServiceParameters = HashMap<String, Value>;

/// Configuration options for a single service of any type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    handler: String,
    #[serde(default)]
    configuration: ServiceParameters,
}

impl ServiceConfig {
    pub fn new(handler: &str) -> Self {
        ServiceConfig {
            handler: handler.to_string(),
            configuration: HashMap::new(),
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn parameters(&self) -> impl Iterator<Item = &String> + '_ {
        self.configuration.keys()
    }

    pub fn get_parameter(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    pub fn set_parameter(&mut self, key: &str, value: Value) {
        self.configuration.insert(key.to_string(), value);
    }

    pub fn get_parameter_as_string(&self, key: &str) -> Option<Result<String, Error>> {
        if let Some(value) = self.configuration.get(key) {
            let value = value
                .as_str()
                .ok_or_else(|| {
                    Error::InvalidConfigurationValue(format!(
                        "invalid value for {}.{}, expected a string: {:?}",
                        &self.handler, key, value
                    ))
                })
                .map(|v| v.to_string());
            Some(value)
        } else {
            None
        }
    }

    pub fn get_parameter_as_i64(&self, key: &str) -> Option<Result<i64, Error>> {
        if let Some(value) = self.configuration.get(key) {
            let value = value.as_i64().ok_or_else(|| {
                Error::InvalidConfigurationValue(format!(
                    "invalid value for {}.{}, expected an integer: {:?}",
                    &self.handler, key, value
                ))
            });
            Some(value)
        } else {
            None
        }
    }

    pub fn get_parameter_as_f64(&self, key: &str) -> Option<Result<f64, Error>> {
        if let Some(value) = self.configuration.get(key) {
            let value = value.as_f64().ok_or_else(|| {
                Error::InvalidConfigurationValue(format!(
                    "invalid value for {}.{}, expected a floating point value: {:?}",
                    &self.handler, key, value
                ))
            });
            Some(value)
        } else {
            None
        }
    }

    pub fn get_parameter_as_bool(&self, key: &str) -> Option<Result<bool, Error>> {
        if let Some(value) = self.configuration.get(key) {
            let value = value.as_bool().ok_or_else(|| {
                Error::InvalidConfigurationValue(format!(
                    "invalid value for {}.{}, expected true or false: {:?}",
                    &self.handler, key, value
                ))
            });
            Some(value)
        } else {
            None
        }
    }
}

/// Set a string parameter on the service instance from a ServiceConfig instance
#[macro_export]
macro_rules! set_string_param_from_config {
    ($b:expr, $k:ident, $c:expr) => {
        if let Some(val) = $c.get_parameter_as_string(stringify!($k)) {
            $b.$k = val?
        }
    };
}

#[macro_export]
macro_rules! set_int_param_from_config {
    ($b:expr, $k:ident, $c:expr, $o:ident) => {
        if let Some(val) = $c.get_parameter_as_i64(stringify!($k)) {
            $b.$k = val? as $o
        }
    };
}

#[macro_export]
macro_rules! set_float_param_from_config {
    ($b:expr, $k:ident, $c:expr, $o:ident) => {
        if let Some(val) = $c.get_parameter_as_f64(stringify!($k)) {
            $b.$k = val? as $o
        }
    };
}

#[macro_export]
macro_rules! set_bool_param_from_config {
    ($b:expr, $k:ident, $c:expr) => {
        if let Some(val) = $c.get_parameter_as_bool(stringify!($k)) {
            $b.$k = val?
        }
    };
}

/// Configuration struct that we can create from the config file used
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        deserialize_with = "deserialize_level_filter",
        serialize_with = "serialize_level_filter",
        default = "default_level_filter"
    )]
    log_level: LevelFilter,
    #[serde(default = "default_asset_base")]
    asset_base: String,
    #[serde(default = "default_fuel_efficiency")]
    fuel_efficiency_km_per_liter: f64,
    #[serde(default)]
    path_style: PathStyle,
    #[serde(default)]
    services: HashMap<ServiceType, ServiceConfig>,
}

impl Config {
    pub fn load<T: Read>(source: &mut T) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(source)
    }

    /// Location the config file is read from when one isn't given on the command line
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn asset_base(&self) -> &str {
        &self.asset_base
    }

    pub fn icon_table(&self) -> IconTable {
        IconTable::new(&self.asset_base)
    }

    pub fn fuel_efficiency(&self) -> f64 {
        self.fuel_efficiency_km_per_liter
    }

    pub fn path_style(&self) -> &PathStyle {
        &self.path_style
    }

    /// Build the map surface to render onto, `handler` overrides the configured handler name
    pub fn get_route_visualization_handler(
        &self,
        handler: Option<&str>,
    ) -> Result<Box<dyn MapSurface>, Error> {
        let configured = self.services.get(&ServiceType::RouteVisualization);
        match (configured, handler) {
            (Some(cfg), None) => new_route_visualization_handler(cfg),
            (Some(cfg), Some(name)) if cfg.handler() == name => new_route_visualization_handler(cfg),
            (_, Some(name)) => new_route_visualization_handler(&ServiceConfig::new(name)),
            // an HTML page needs nothing but a browser so it is the default
            (None, None) => new_route_visualization_handler(&ServiceConfig::new("leaflet")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_level_filter(),
            asset_base: default_asset_base(),
            fuel_efficiency_km_per_liter: default_fuel_efficiency(),
            path_style: PathStyle::default(),
            services: HashMap::new(),
        }
    }
}

fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    LevelFilter::from_str(&buf)
        .map_err(|_| serde::de::Error::custom(format!("invalid level value: {}", buf)))
}

fn serialize_level_filter<S>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&level.to_string())
}

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}

fn default_asset_base() -> String {
    "/static/img".to_string()
}

fn default_fuel_efficiency() -> f64 {
    10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::load(&mut "{}".as_bytes()).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Info);
        assert_eq!(config.asset_base(), "/static/img");
        assert_eq!(config.fuel_efficiency(), 10.0);
        assert_eq!(config.path_style(), &PathStyle::default());
        assert!(config.get_route_visualization_handler(None).is_ok());
    }

    #[test]
    fn reads_services_and_parameters() {
        let yaml = "
log_level: debug
asset_base: https://cdn.example.com/icons
fuel_efficiency_km_per_liter: 12.5
path_style:
  color: '#ff0000'
  weight: 6
  opacity: 0.5
services:
  route_visualization:
    handler: geojson
    configuration:
      pretty: false
";
        let config = Config::load(&mut yaml.as_bytes()).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Debug);
        assert_eq!(config.asset_base(), "https://cdn.example.com/icons");
        assert_eq!(config.fuel_efficiency(), 12.5);
        assert_eq!(config.path_style().color(), "#ff0000");
        let svc = &config.services[&ServiceType::RouteVisualization];
        assert_eq!(svc.handler(), "geojson");
        assert_eq!(svc.get_parameter_as_bool("pretty").unwrap().unwrap(), false);
        assert!(svc.get_parameter_as_string("pretty").unwrap().is_err());
        assert!(svc.get_parameter_as_i64("missing").is_none());
    }

    #[test]
    fn rejects_unknown_handlers_and_levels() {
        let yaml = "services:\n  route_visualization:\n    handler: carrier-pigeon\n";
        let config = Config::load(&mut yaml.as_bytes()).unwrap();
        assert!(config.get_route_visualization_handler(None).is_err());
        assert!(config.get_route_visualization_handler(Some("geojson")).is_ok());
        assert!(Config::load(&mut "log_level: loud".as_bytes()).is_err());
    }
}
