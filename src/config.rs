use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs of the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Clearance kept between paths and around obstacle corners.
    pub spacing: i32,
    /// Upper bound on obstacle growth passes per solve.
    pub grow_passes: usize,
    /// Pruning ellipse for the first solve, as a multiple of the start/end distance.
    pub oval_constant: f64,
    /// Slack applied to the previous cost ratio when a path is re-solved.
    pub cost_ratio_epsilon: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            spacing: 4,
            grow_passes: 2,
            oval_constant: 1.13,
            cost_ratio_epsilon: 1.04,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    spacing: Option<i32>,
    grow_passes: Option<usize>,
    oval_constant: Option<f64>,
    cost_ratio_epsilon: Option<f64>,
}

impl ConfigFile {
    fn apply(self, config: &mut RouterConfig) {
        if let Some(v) = self.spacing {
            config.spacing = v;
        }
        if let Some(v) = self.grow_passes {
            config.grow_passes = v;
        }
        if let Some(v) = self.oval_constant {
            config.oval_constant = v;
        }
        if let Some(v) = self.cost_ratio_epsilon {
            config.cost_ratio_epsilon = v;
        }
    }
}

/// Loads router settings, layering the optional JSON file over the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RouterConfig> {
    let mut config = RouterConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let parsed = parse_config_file(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    parsed.apply(&mut config);
    Ok(config)
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    Ok(serde_json::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config.spacing, 4);
        assert_eq!(config.grow_passes, 2);
        assert!((config.oval_constant - 1.13).abs() < f64::EPSILON);
        assert!((config.cost_ratio_epsilon - 1.04).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let parsed = parse_config_file(r#"{ "spacing": 8, "growPasses": 3 }"#).expect("parse");
        let mut config = RouterConfig::default();
        parsed.apply(&mut config);
        assert_eq!(config.spacing, 8);
        assert_eq!(config.grow_passes, 3);
        assert!((config.oval_constant - 1.13).abs() < f64::EPSILON);
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = load_config(Some(Path::new("/nonexistent/router.json"))).unwrap_err();
        assert!(err.to_string().contains("router.json"));
    }
}
