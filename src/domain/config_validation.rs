//! Configuration validation.
//!
//! Every key is optional; validation only rejects values that are present and
//! unusable.

use crate::domain::annual::MissingValuation;
use crate::domain::error::DcaError;
use crate::ports::config_port::ConfigPort;

pub const MIN_CHART_DIMENSION: i64 = 200;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), DcaError> {
    validate_data_path(config)?;
    validate_date_format(config)?;
    validate_annual_amount(config)?;
    validate_missing_valuation(config)?;
    validate_chart_dimension(config, "width")?;
    validate_chart_dimension(config, "height")?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> DcaError {
    DcaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), DcaError> {
    match config.get_string("data", "path") {
        Some(s) if s.trim().is_empty() => Err(invalid("data", "path", "path must not be empty")),
        _ => Ok(()),
    }
}

fn validate_date_format(config: &dyn ConfigPort) -> Result<(), DcaError> {
    match config.get_string("data", "date_format") {
        Some(s) if s.trim().is_empty() => Err(invalid(
            "data",
            "date_format",
            "date_format must not be empty",
        )),
        _ => Ok(()),
    }
}

fn validate_annual_amount(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let Some(raw) = config.get_string("investment", "annual_amount") else {
        return Ok(());
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("investment", "annual_amount", "annual_amount must be a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "investment",
            "annual_amount",
            "annual_amount must be positive",
        ));
    }
    Ok(())
}

fn validate_missing_valuation(config: &dyn ConfigPort) -> Result<(), DcaError> {
    match config.get_string("investment", "missing_valuation") {
        Some(s) => s
            .parse::<MissingValuation>()
            .map(|_| ())
            .map_err(|reason| invalid("investment", "missing_valuation", reason)),
        None => Ok(()),
    }
}

fn validate_chart_dimension(config: &dyn ConfigPort, key: &str) -> Result<(), DcaError> {
    let Some(raw) = config.get_string("chart", key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= MIN_CHART_DIMENSION => Ok(()),
        Ok(_) => Err(invalid(
            "chart",
            key,
            format!("{} must be at least {}", key, MIN_CHART_DIMENSION),
        )),
        Err(_) => Err(invalid("chart", key, format!("{} must be an integer", key))),
    }
}
