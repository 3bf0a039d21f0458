//! Boundary checks for user-entered power ratings and runtimes.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{0}' is not a valid number")]
    NotANumber(String),

    #[error("power rating must be a positive number of watts, got {0}")]
    InvalidPower(f64),

    #[error("hours on must be zero or more, got {0}")]
    InvalidHours(f64),

    #[error("price per kWh must be zero or more, got {0}")]
    InvalidTariff(f64),

    #[error("device name must not be empty")]
    EmptyName,
}

fn parse_number(input: &str) -> Result<f64, ValidationError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber(input.trim().to_string()))
}

pub fn validate_power(watts: f64) -> Result<f64, ValidationError> {
    if watts.is_finite() && watts > 0.0 {
        Ok(watts)
    } else {
        Err(ValidationError::InvalidPower(watts))
    }
}

pub fn validate_hours(hours: f64) -> Result<f64, ValidationError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(hours)
    } else {
        Err(ValidationError::InvalidHours(hours))
    }
}

pub fn validate_tariff(per_kwh: f64) -> Result<f64, ValidationError> {
    if per_kwh.is_finite() && per_kwh >= 0.0 {
        Ok(per_kwh)
    } else {
        Err(ValidationError::InvalidTariff(per_kwh))
    }
}

/// Parse a power rating such as `"75"` or `"2100.5"`.
pub fn parse_power(input: &str) -> Result<f64, ValidationError> {
    validate_power(parse_number(input)?)
}

/// Parse a runtime in hours such as `"1.5"` (one and a half hours).
pub fn parse_hours(input: &str) -> Result<f64, ValidationError> {
    validate_hours(parse_number(input)?)
}

pub fn parse_tariff(input: &str) -> Result<f64, ValidationError> {
    validate_tariff(parse_number(input)?)
}
