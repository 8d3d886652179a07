//! Runtime configuration.
//!
//! Defaults match the deployed network; each field can be overridden with a
//! `MATERIALTRACE_*` environment variable.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use materialtrace_fulfillment::geofence::DEFAULT_RADIUS_MILES;
use materialtrace_fulfillment::workflow::OrderDefaults;
use materialtrace_observability::LogFormat;

pub const ENV_PREFIX: &str = "MATERIALTRACE_";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: cannot parse '{value}': {reason}")]
    Invalid { var: String, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentConfig {
    pub default_currency: String,
    pub default_material_group: String,
    pub default_unit_of_measure: String,
    pub geofence_radius_miles: f64,
    pub min_manufacturer_discounts: usize,
    pub log_format: LogFormat,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        let defaults = OrderDefaults::default();
        Self {
            default_currency: defaults.currency,
            default_material_group: defaults.material_group,
            default_unit_of_measure: defaults.unit_of_measure,
            geofence_radius_miles: DEFAULT_RADIUS_MILES,
            min_manufacturer_discounts: 2,
            log_format: LogFormat::Json,
        }
    }
}

impl FulfillmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or blank variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |suffix: &str| {
            let var = format!("{ENV_PREFIX}{suffix}");
            lookup(&var).filter(|v| !v.trim().is_empty()).map(|v| (var, v))
        };
        let mut config = Self::default();

        if let Some((_, v)) = get("DEFAULT_CURRENCY") {
            config.default_currency = v;
        }
        if let Some((_, v)) = get("DEFAULT_MATERIAL_GROUP") {
            config.default_material_group = v;
        }
        if let Some((_, v)) = get("DEFAULT_UNIT_OF_MEASURE") {
            config.default_unit_of_measure = v;
        }
        if let Some((var, v)) = get("GEOFENCE_RADIUS_MILES") {
            let radius: f64 = parse(&var, &v)?;
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigError::Invalid { var, value: v, reason: "must be a positive number".to_string() });
            }
            config.geofence_radius_miles = radius;
        }
        if let Some((var, v)) = get("MIN_MANUFACTURER_DISCOUNTS") {
            config.min_manufacturer_discounts = parse(&var, &v)?;
        }
        if let Some((var, v)) = get("LOG_FORMAT") {
            config.log_format = parse(&var, &v)?;
        }
        Ok(config)
    }

    pub fn order_defaults(&self) -> OrderDefaults {
        OrderDefaults {
            currency: self.default_currency.clone(),
            material_group: self.default_material_group.clone(),
            unit_of_measure: self.default_unit_of_measure.clone(),
        }
    }
}

fn parse<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = FulfillmentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FulfillmentConfig::default());
        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.default_material_group, "pipe");
        assert_eq!(config.default_unit_of_measure, "each");
        assert_eq!(config.geofence_radius_miles, 1.0);
        assert_eq!(config.min_manufacturer_discounts, 2);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn variables_override_defaults() {
        let config = FulfillmentConfig::from_lookup(lookup(&[
            ("MATERIALTRACE_DEFAULT_CURRENCY", "CAD"),
            ("MATERIALTRACE_GEOFENCE_RADIUS_MILES", "2.5"),
            ("MATERIALTRACE_MIN_MANUFACTURER_DISCOUNTS", "1"),
            ("MATERIALTRACE_LOG_FORMAT", "pretty"),
            ("MATERIALTRACE_DEFAULT_UNIT_OF_MEASURE", "  "),
        ]))
        .unwrap();
        assert_eq!(config.default_currency, "CAD");
        assert_eq!(config.geofence_radius_miles, 2.5);
        assert_eq!(config.min_manufacturer_discounts, 1);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.order_defaults().unit_of_measure, "each");
    }

    #[test]
    fn unparsable_values_name_the_variable() {
        match FulfillmentConfig::from_lookup(lookup(&[("MATERIALTRACE_MIN_MANUFACTURER_DISCOUNTS", "two")])) {
            Err(ConfigError::Invalid { var, value, .. }) => {
                assert_eq!(var, "MATERIALTRACE_MIN_MANUFACTURER_DISCOUNTS");
                assert_eq!(value, "two");
            }
            other => panic!("Expected Invalid error, got {other:?}"),
        }
        assert!(FulfillmentConfig::from_lookup(lookup(&[("MATERIALTRACE_GEOFENCE_RADIUS_MILES", "-1")])).is_err());
    }
}
