use std::fmt;

use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{Result, encoding::EncoderSet};

/// A model input column. The declaration order is the feature order the model is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Airline,
    Flight,
    SourceCity,
    DepartureTime,
    Stops,
    ArrivalTime,
    DestinationCity,
    Class,
    Duration,
    DaysLeft,
}

/// The number of model input columns.
pub const NUM_FEATURES: usize = 10;

impl Column {
    /// Every feature column, in model order.
    pub const ALL: [Column; NUM_FEATURES] = [
        Column::Airline,
        Column::Flight,
        Column::SourceCity,
        Column::DepartureTime,
        Column::Stops,
        Column::ArrivalTime,
        Column::DestinationCity,
        Column::Class,
        Column::Duration,
        Column::DaysLeft,
    ];

    /// The columns that go through a label encoder.
    pub const CATEGORICAL: [Column; 8] = [
        Column::Airline,
        Column::Flight,
        Column::SourceCity,
        Column::DepartureTime,
        Column::Stops,
        Column::ArrivalTime,
        Column::DestinationCity,
        Column::Class,
    ];

    /// The name of the regression target in the dataset.
    pub const TARGET: &'static str = "price";

    /// Returns the dataset header name of this column.
    pub fn name(self) -> &'static str {
        match self {
            Column::Airline => "airline",
            Column::Flight => "flight",
            Column::SourceCity => "source_city",
            Column::DepartureTime => "departure_time",
            Column::Stops => "stops",
            Column::ArrivalTime => "arrival_time",
            Column::DestinationCity => "destination_city",
            Column::Class => "class",
            Column::Duration => "duration",
            Column::DaysLeft => "days_left",
        }
    }

    /// Returns the names of all the feature columns, in model order.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.name().to_string()).collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value a trip holds for a given column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Label(&'a str),
    Number(f64),
}

/// A single flight described by the attributes the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub airline: String,
    pub flight: String,
    pub source_city: String,
    pub departure_time: String,
    pub stops: String,
    pub arrival_time: String,
    pub destination_city: String,
    pub class: String,
    /// Flight duration in hours.
    pub duration: f64,
    pub days_left: i64,
}

impl TripRecord {
    /// Returns the value of `column` for this trip.
    pub fn value(&self, column: Column) -> FieldValue<'_> {
        match column {
            Column::Airline => FieldValue::Label(&self.airline),
            Column::Flight => FieldValue::Label(&self.flight),
            Column::SourceCity => FieldValue::Label(&self.source_city),
            Column::DepartureTime => FieldValue::Label(&self.departure_time),
            Column::Stops => FieldValue::Label(&self.stops),
            Column::ArrivalTime => FieldValue::Label(&self.arrival_time),
            Column::DestinationCity => FieldValue::Label(&self.destination_city),
            Column::Class => FieldValue::Label(&self.class),
            Column::Duration => FieldValue::Number(self.duration),
            Column::DaysLeft => FieldValue::Number(self.days_left as f64),
        }
    }

    /// Builds the feature vector for this trip. Labels outside an encoder's vocabulary are
    /// replaced by that encoder's fallback class.
    ///
    /// # Arguments
    /// * `encoders` - The encoders fitted at training time.
    ///
    /// # Returns
    /// The encoded features in `Column::ALL` order, or an error if an encoder is missing.
    pub fn encode(&self, encoders: &EncoderSet) -> Result<Array1<f64>> {
        self.encode_with(|column, label| {
            let encoder = encoders.get(column)?;
            if !encoder.contains(label) {
                debug!(
                    column = column.name(), label = label, fallback = encoder.fallback();
                    "unseen label, substituting fallback"
                );
            }

            Ok(encoder.transform_or_fallback(label))
        })
    }

    /// Builds the feature vector for this trip, failing on any unseen label.
    ///
    /// # Arguments
    /// * `encoders` - The encoders fitted at training time.
    ///
    /// # Returns
    /// The encoded features in `Column::ALL` order.
    pub fn encode_strict(&self, encoders: &EncoderSet) -> Result<Array1<f64>> {
        self.encode_with(|column, label| encoders.get(column)?.transform(label))
    }

    fn encode_with<F>(&self, mut code: F) -> Result<Array1<f64>>
    where
        F: FnMut(Column, &str) -> Result<usize>,
    {
        Column::ALL
            .iter()
            .map(|&column| match self.value(column) {
                FieldValue::Label(label) => code(column, label).map(|c| c as f64),
                FieldValue::Number(x) => Ok(x),
            })
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MlErr, encoding::EncoderSet};

    fn trip(airline: &str) -> TripRecord {
        TripRecord {
            airline: airline.into(),
            flight: "UK-810".into(),
            source_city: "Delhi".into(),
            departure_time: "Morning".into(),
            stops: "zero".into(),
            arrival_time: "Night".into(),
            destination_city: "Mumbai".into(),
            class: "Economy".into(),
            duration: 2.25,
            days_left: 7,
        }
    }

    fn encoders() -> EncoderSet {
        EncoderSet::fit([&trip("Vistara"), &trip("Indigo"), &trip("AirAsia")]).unwrap()
    }

    #[test]
    fn columns_are_ordered_like_the_dataset() {
        assert_eq!(
            Column::names(),
            [
                "airline",
                "flight",
                "source_city",
                "departure_time",
                "stops",
                "arrival_time",
                "destination_city",
                "class",
                "duration",
                "days_left",
            ]
        );
    }

    #[test]
    fn encode_places_numeric_columns_last() {
        let x = trip("Indigo").encode(&encoders()).unwrap();

        assert_eq!(x.len(), Column::ALL.len());
        // AirAsia < Indigo < Vistara
        assert_eq!(x[0], 1.0);
        assert_eq!(x[8], 2.25);
        assert_eq!(x[9], 7.0);
    }

    #[test]
    fn encode_falls_back_to_first_class() {
        let x = trip("Lufthansa").encode(&encoders()).unwrap();
        assert_eq!(x[0], 0.0);
    }

    #[test]
    fn encode_strict_rejects_unseen_labels() {
        let err = trip("Lufthansa").encode_strict(&encoders()).unwrap_err();
        assert!(matches!(err, MlErr::UnseenLabel { .. }));
    }
}
