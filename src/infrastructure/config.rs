use crate::domain::flatten::FlattenPolicy;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub decode: DecodeSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    /// Path template appended to `base_url`; `${kind}` expands to the chart kind
    pub chart_path: String,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            chart_path: "/dashboard/chart/${kind}".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DecodeSettings {
    pub strict: bool,
}

impl DecodeSettings {
    pub fn policy(&self) -> FlattenPolicy {
        if self.strict {
            FlattenPolicy::Strict
        } else {
            FlattenPolicy::Lenient
        }
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    load_config_from("config/dashboard")
}

/// Load `path` (any format the config crate knows, optional) with
/// `DASHBOARD__SECTION__KEY` environment overrides on top.
pub fn load_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a path, percent-encoding the substituted values
pub fn prepare_path(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_path() {
        let mut vars = HashMap::new();
        vars.insert("kind".to_string(), "barchart".to_string());
        vars.insert("name".to_string(), "total compression time".to_string());

        let path = prepare_path("/dashboard/chart/${kind}?name=${name}", &vars);

        assert_eq!(path, "/dashboard/chart/barchart?name=total%20compression%20time");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config_from("config/does-not-exist").unwrap();
        assert_eq!(config.backend.chart_path, "/dashboard/chart/${kind}");
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[backend]\nbase_url = \"http://backend:9000\"\n\n[decode]\nstrict = true\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.backend.base_url, "http://backend:9000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.decode.policy(), FlattenPolicy::Strict);
    }
}
