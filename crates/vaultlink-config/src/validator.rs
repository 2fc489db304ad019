//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_vault(config, &mut result);
        Self::validate_session(config, &mut result);
        Self::validate_save_prompt(config, &mut result);
        Self::validate_menu(config, &mut result);
        Self::validate_misc(config, &mut result);

        result
    }

    fn validate_vault(config: &Config, result: &mut ValidationResult) {
        match url::Url::parse(&config.vault.base_url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    result.add_error(ValidationError::new(
                        "vault.base_url",
                        "base_url must use http or https",
                    ));
                }
                let loopback = matches!(
                    parsed.host_str(),
                    Some("127.0.0.1") | Some("localhost") | Some("[::1]")
                );
                if !loopback {
                    result.add_warning(ValidationWarning::new(
                        "vault.base_url",
                        "base_url is not a loopback address; the vault is expected to run locally",
                    ));
                }
            }
            Err(_) => {
                result.add_error(ValidationError::new(
                    "vault.base_url",
                    format!("Invalid URL: {}", config.vault.base_url),
                ));
            }
        }

        if config.vault.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "vault.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }
    }

    fn validate_session(config: &Config, result: &mut ValidationResult) {
        let minutes = config.session.auto_lock_minutes;
        if minutes != -1 && minutes <= 0 {
            result.add_error(ValidationError::new(
                "session.auto_lock_minutes",
                "auto_lock_minutes must be a positive number of minutes or -1 (browser close)",
            ));
        } else if minutes > 24 * 60 {
            result.add_warning(ValidationWarning::new(
                "session.auto_lock_minutes",
                "auto_lock_minutes is longer than a day",
            ));
        }

        if config.session.keep_alive_seconds == 0 {
            result.add_error(ValidationError::new(
                "session.keep_alive_seconds",
                "keep_alive_seconds must be greater than 0",
            ));
        } else if config.session.keep_alive_seconds >= 30 {
            result.add_warning(ValidationWarning::new(
                "session.keep_alive_seconds",
                "hosts suspend idle background contexts after ~30s; the heartbeat may be too slow",
            ));
        }

        if config.session.window_close_settle_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "session.window_close_settle_ms",
                "a zero settle delay can lock while another extension is moving tabs",
            ));
        }
    }

    fn validate_save_prompt(config: &Config, result: &mut ValidationResult) {
        let prompt = &config.save_prompt;
        if prompt.dismiss_after_seconds == 0 {
            result.add_error(ValidationError::new(
                "save_prompt.dismiss_after_seconds",
                "dismiss_after_seconds must be greater than 0",
            ));
        }
        if prompt.max_pending_age_seconds == 0 {
            result.add_error(ValidationError::new(
                "save_prompt.max_pending_age_seconds",
                "max_pending_age_seconds must be greater than 0",
            ));
        }
        if prompt.same_page_delay_ms > 5_000 {
            result.add_warning(ValidationWarning::new(
                "save_prompt.same_page_delay_ms",
                "same_page_delay_ms above 5s delays the save prompt noticeably",
            ));
        }
    }

    fn validate_menu(config: &Config, result: &mut ValidationResult) {
        let menu = &config.menu;
        if menu.viewport_margin < 0.0 {
            result.add_error(ValidationError::new(
                "menu.viewport_margin",
                "viewport_margin cannot be negative",
            ));
        }
        if menu.width <= 0.0 {
            result.add_error(ValidationError::new("menu.width", "width must be positive"));
        }
        if menu.item_height <= 0.0 {
            result.add_error(ValidationError::new(
                "menu.item_height",
                "item_height must be positive",
            ));
        }
        if menu.max_visible_items == 0 {
            result.add_error(ValidationError::new(
                "menu.max_visible_items",
                "max_visible_items must be greater than 0",
            ));
        }
    }

    fn validate_misc(config: &Config, result: &mut ValidationResult) {
        if !config.badge.color.starts_with('#') {
            result.add_warning(ValidationWarning::new(
                "badge.color",
                "badge color should be a hex color such as #175DDC",
            ));
        }
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "level cannot be empty",
            ));
        }
    }
}
