//! Postal codes and temperature reports.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::domain::error::LookupError;

/// Required postal code length, in bytes.
pub const POSTAL_CODE_LEN: usize = 8;

/// A postal code that passed the length check.
///
/// No format or checksum validation is done; the directory service decides
/// whether the code exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Accept `raw` if it is exactly 8 bytes long.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        if raw.len() != POSTAL_CODE_LEN {
            return Err(LookupError::InvalidInput);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Celsius to (Celsius, Fahrenheit, Kelvin).
///
/// Kelvin uses a +273 offset, not 273.15. Clients compare against that value.
pub fn convert(celsius: f64) -> (f64, f64, f64) {
    (celsius, celsius * 1.8 + 32.0, celsius + 273.0)
}

/// Resolved city and its current temperature in three scales.
///
/// All four fields are always populated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    #[serde(rename = "temp_C", serialize_with = "serialize_degrees")]
    pub temp_c: f64,
    #[serde(rename = "temp_F", serialize_with = "serialize_degrees")]
    pub temp_f: f64,
    #[serde(rename = "temp_K", serialize_with = "serialize_degrees")]
    pub temp_k: f64,
}

impl WeatherReport {
    /// Build a report from a Celsius reading.
    pub fn from_celsius(city: impl Into<String>, celsius: f64) -> Self {
        let (temp_c, temp_f, temp_k) = convert(celsius);
        Self {
            city: city.into(),
            temp_c,
            temp_f,
            temp_k,
        }
    }
}

// Whole degrees go out as JSON integers (`25`, not `25.0`).
fn serialize_degrees<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
