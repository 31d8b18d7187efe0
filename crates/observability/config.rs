use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) log_format: LogFormat,
    /// Warnings captured during config parsing so they can be logged after tracing is initialized.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    fn from_lookup(component: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let component = component.trim().to_string();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let service_name = non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone());
        let environment = non_empty("STAGE").unwrap_or_else(|| "unknown".to_string());

        let mut warnings = Vec::new();
        let log_format = match non_empty("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => parse_format(&raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "LOG_FORMAT is invalid (value: {raw}); defaulting to full"
                ));
                LogFormat::default()
            }),
        };

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            log_format,
            warnings,
        }
    }
}

fn parse_format(input: &str) -> Option<LogFormat> {
    match input.trim().to_ascii_lowercase().as_str() {
        "full" => Some(LogFormat::Full),
        "compact" => Some(LogFormat::Compact),
        "pretty" => Some(LogFormat::Pretty),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(component: &str, vars: &[(&str, &str)]) -> ObservabilityConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ObservabilityConfig::from_lookup(component, |key| vars.get(key).cloned())
    }

    #[test]
    fn service_name_falls_back_to_component() {
        let config = config_with(" backend ", &[("SERVICE_NAME", "  ")]);

        assert_eq!(config.service_context.service_name, "backend");
        assert_eq!(config.service_context.environment, "unknown");
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn explicit_context_wins() {
        let config = config_with(
            "backend",
            &[("SERVICE_NAME", "gigs-api"), ("STAGE", "production")],
        );

        assert_eq!(config.service_context.service_name, "gigs-api");
        assert_eq!(config.service_context.environment, "production");
    }

    #[test]
    fn unknown_format_warns_and_defaults() {
        let config = config_with("backend", &[("LOG_FORMAT", "xml")]);

        assert_eq!(config.log_format, LogFormat::Full);
        assert_eq!(config.warnings.len(), 1);
    }

    #[test]
    fn format_is_case_insensitive() {
        let config = config_with("backend", &[("LOG_FORMAT", "Compact")]);

        assert_eq!(config.log_format, LogFormat::Compact);
    }
}
