use log::debug;
use machine_learning::{encoding::EncoderSet, features::Column, features::TripRecord};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::ServiceErr;

const DEFAULT_DEPARTURE_TIME: &str = "Morning";
const DEFAULT_ARRIVAL_TIME: &str = "Night";
const DEFAULT_DURATION: f64 = 2.0;
const DEFAULT_DAYS_LEFT: i64 = 1;

/// The body of a prediction request, kept as raw json values.
///
/// A field is `None` only when its key is absent, an explicit `null` is `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictRequest {
    #[serde(default, deserialize_with = "present")]
    pub airline: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub flight: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub source_city: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub departure_time: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub stops: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub arrival_time: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub destination_city: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub class_type: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub duration: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub days_left: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PredictRequest {
    /// Fills in the missing fields and coerces the numeric ones.
    ///
    /// Absent keys take their default: `departure_time`, `arrival_time`, `duration` and
    /// `days_left` have fixed ones, the other categorical fields take their encoder's fallback
    /// class. A categorical value that is not a string, `null` included, is an unseen label and
    /// also takes the fallback class.
    ///
    /// # Errors
    /// If `duration` or `days_left` is present but not a number or a numeric string.
    pub fn into_trip(self, encoders: &EncoderSet) -> Result<TripRecord, ServiceErr> {
        let field = |value, column, default| label(encoders, column, value, default);

        Ok(TripRecord {
            airline: field(self.airline, Column::Airline, None)?,
            flight: field(self.flight, Column::Flight, None)?,
            source_city: field(self.source_city, Column::SourceCity, None)?,
            departure_time: field(
                self.departure_time,
                Column::DepartureTime,
                Some(DEFAULT_DEPARTURE_TIME),
            )?,
            stops: field(self.stops, Column::Stops, None)?,
            arrival_time: field(
                self.arrival_time,
                Column::ArrivalTime,
                Some(DEFAULT_ARRIVAL_TIME),
            )?,
            destination_city: field(self.destination_city, Column::DestinationCity, None)?,
            class: field(self.class_type, Column::Class, None)?,
            duration: duration(self.duration)?,
            days_left: days_left(self.days_left)?,
        })
    }
}

fn label(
    encoders: &EncoderSet,
    column: Column,
    value: Option<Value>,
    default: Option<&str>,
) -> Result<String, ServiceErr> {
    let encoder = encoders.get(column)?;

    match (value, default) {
        (Some(Value::String(label)), _) => Ok(label),
        (None, Some(default)) => Ok(default.to_string()),
        (None, None) => Ok(encoder.fallback().to_string()),
        (Some(other), _) => {
            let shown = other.to_string();
            debug!(
                column = column.name(), value = shown.as_str(), fallback = encoder.fallback();
                "non-string label, substituting fallback"
            );
            Ok(encoder.fallback().to_string())
        }
    }
}

fn invalid(field: &str, value: &Value) -> ServiceErr {
    ServiceErr::BadRequest(format!("invalid {field}: {value}"))
}

fn duration(value: Option<Value>) -> Result<f64, ServiceErr> {
    let Some(value) = value else {
        return Ok(DEFAULT_DURATION);
    };

    let hours = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    hours
        .filter(|h| h.is_finite())
        .ok_or_else(|| invalid("duration", &value))
}

fn days_left(value: Option<Value>) -> Result<i64, ServiceErr> {
    let Some(value) = value else {
        return Ok(DEFAULT_DAYS_LEFT);
    };

    let days = match &value {
        // Fractional days are truncated toward zero.
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    days.ok_or_else(|| invalid("days_left", &value))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encoders() -> EncoderSet {
        let trip = |airline: &str, flight: &str| TripRecord {
            airline: airline.into(),
            flight: flight.into(),
            source_city: "Delhi".into(),
            departure_time: "Evening".into(),
            stops: "one".into(),
            arrival_time: "Morning".into(),
            destination_city: "Mumbai".into(),
            class: "Economy".into(),
            duration: 2.0,
            days_left: 1,
        };

        EncoderSet::fit([&trip("Vistara", "UK-810"), &trip("Indigo", "6E-2046")]).unwrap()
    }

    fn request(body: Value) -> PredictRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn missing_fields_take_their_defaults() {
        let trip = request(json!({
            "airline": "Indigo",
            "source_city": "Delhi",
            "stops": "zero",
            "destination_city": "Mumbai",
            "class_type": "Economy",
        }))
        .into_trip(&encoders())
        .unwrap();

        assert_eq!(trip.airline, "Indigo");
        assert_eq!(trip.class, "Economy");
        assert_eq!(trip.flight, "6E-2046");
        assert_eq!(trip.departure_time, "Morning");
        assert_eq!(trip.arrival_time, "Night");
        assert_eq!(trip.duration, 2.0);
        assert_eq!(trip.days_left, 1);
    }

    #[test]
    fn missing_required_labels_take_the_fallback_class() {
        let trip = request(json!({})).into_trip(&encoders()).unwrap();

        assert_eq!(trip.airline, "Indigo");
        assert_eq!(trip.source_city, "Delhi");
        assert_eq!(trip.stops, "one");
    }

    #[test]
    fn null_labels_are_unseen_not_absent() {
        let trip = request(json!({
            "airline": null,
            "departure_time": null,
            "arrival_time": null,
        }))
        .into_trip(&encoders())
        .unwrap();

        assert_eq!(trip.airline, "Indigo");
        assert_eq!(trip.departure_time, "Evening");
        assert_eq!(trip.arrival_time, "Morning");
    }

    #[test]
    fn null_numeric_fields_are_rejected() {
        let encoders = encoders();

        for body in [json!({ "duration": null }), json!({ "days_left": null })] {
            let err = request(body.clone()).into_trip(&encoders).unwrap_err();
            assert!(matches!(err, ServiceErr::BadRequest(_)), "{body}");
        }
    }

    #[test]
    fn numeric_fields_are_coerced() {
        let encoders = encoders();
        let trip = request(json!({ "duration": "3.5", "days_left": 12.9 }))
            .into_trip(&encoders)
            .unwrap();
        assert_eq!(trip.duration, 3.5);
        assert_eq!(trip.days_left, 12);

        let trip = request(json!({ "duration": 1, "days_left": " 30 " }))
            .into_trip(&encoders)
            .unwrap();
        assert_eq!(trip.duration, 1.0);
        assert_eq!(trip.days_left, 30);
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let encoders = encoders();

        for body in [
            json!({ "days_left": "soon" }),
            json!({ "days_left": "4.5" }),
            json!({ "days_left": [1] }),
            json!({ "duration": "long" }),
            json!({ "duration": true }),
        ] {
            let err = request(body.clone()).into_trip(&encoders).unwrap_err();
            assert!(matches!(err, ServiceErr::BadRequest(_)), "{body}");
        }
    }

    #[test]
    fn non_string_labels_take_the_fallback_class() {
        let trip = request(json!({ "stops": 0, "airline": "Vistara", "flight": ["UK-810"] }))
            .into_trip(&encoders())
            .unwrap();

        assert_eq!(trip.airline, "Vistara");
        assert_eq!(trip.stops, "one");
        assert_eq!(trip.flight, "6E-2046");
    }
}
