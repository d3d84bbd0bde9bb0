// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capping settings loaded from environment variables or a host settings file.

use serde::{Deserialize, Serialize};

/// Global capping settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapSettings {
    /// Cap clipped surfaces at all. When off, every existing cap is removed.
    pub enabled: bool,
    /// Distance added to every plane offset so caps sit just inside the
    /// visible half-space instead of z-fighting with the clip plane.
    pub offset: f64,
}

impl CapSettings {
    pub const DEFAULT_OFFSET: f64 = 0.01;

    /// Load settings from `CLIPCAP_ENABLED` and `CLIPCAP_OFFSET`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through a variable lookup. Missing or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            enabled: lookup("CLIPCAP_ENABLED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.enabled),
            offset: lookup("CLIPCAP_OFFSET")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(defaults.offset),
        }
    }
}

impl Default for CapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            offset: Self::DEFAULT_OFFSET,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = CapSettings::from_lookup(lookup(&[]));
        assert_eq!(s, CapSettings::default());
        assert!(s.enabled);
        assert_eq!(s.offset, 0.01);
    }

    #[test]
    fn reads_variables() {
        let s = CapSettings::from_lookup(lookup(&[("CLIPCAP_ENABLED", "off"), ("CLIPCAP_OFFSET", " 0.25 ")]));
        assert!(!s.enabled);
        assert_eq!(s.offset, 0.25);
    }

    #[test]
    fn bad_values_fall_back() {
        let s = CapSettings::from_lookup(lookup(&[("CLIPCAP_ENABLED", "maybe"), ("CLIPCAP_OFFSET", "NaN")]));
        assert_eq!(s, CapSettings::default());
    }

    #[test]
    fn serde_fills_missing_fields() {
        let s: CapSettings = serde_json::from_str(r#"{"offset": 0.5}"#).unwrap();
        assert!(s.enabled);
        assert_eq!(s.offset, 0.5);

        let json = serde_json::to_string(&CapSettings::default()).unwrap();
        let back: CapSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CapSettings::default());
    }
}
