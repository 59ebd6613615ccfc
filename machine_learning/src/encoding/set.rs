use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::LabelEncoder;
use crate::{MlErr, Result, features::Column, features::FieldValue, features::TripRecord};

/// One `LabelEncoder` per categorical column, fixed once training is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSet {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderSet {
    /// Fits an encoder for every categorical column over the given trips.
    ///
    /// # Arguments
    /// * `trips` - The trips of the training dataset.
    ///
    /// # Returns
    /// The fitted set or an error if there were no trips.
    pub fn fit<'a, I>(trips: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a TripRecord>,
    {
        let mut vocabularies: BTreeMap<Column, BTreeSet<&str>> = BTreeMap::new();

        for trip in trips {
            for column in Column::CATEGORICAL {
                if let FieldValue::Label(label) = trip.value(column) {
                    vocabularies.entry(column).or_default().insert(label);
                }
            }
        }

        let encoders: BTreeMap<String, LabelEncoder> = Column::CATEGORICAL
            .iter()
            .map(|&column| {
                let labels = vocabularies.remove(&column).unwrap_or_default();
                let encoder = LabelEncoder::fit(column.name(), labels)?;
                Ok((column.name().to_string(), encoder))
            })
            .collect::<Result<_>>()?;

        Ok(Self { encoders })
    }

    /// Returns the encoder of a categorical column.
    pub fn get(&self, column: Column) -> Result<&LabelEncoder> {
        self.encoders
            .get(column.name())
            .ok_or(MlErr::MissingEncoder {
                column: column.name(),
            })
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Checks that every categorical column has a usable encoder.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(MlErr::InvalidConfig("the encoder set is empty".into()));
        }

        for column in Column::CATEGORICAL {
            let encoder = self.get(column)?;
            if encoder.column() != column.name() {
                return Err(MlErr::InvalidConfig(format!(
                    "the encoder stored under '{column}' encodes '{}'",
                    encoder.column()
                )));
            }

            encoder.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(airline: &str, class: &str) -> TripRecord {
        TripRecord {
            airline: airline.into(),
            flight: "SG-8709".into(),
            source_city: "Delhi".into(),
            departure_time: "Evening".into(),
            stops: "zero".into(),
            arrival_time: "Night".into(),
            destination_city: "Mumbai".into(),
            class: class.into(),
            duration: 2.17,
            days_left: 1,
        }
    }

    #[test]
    fn fit_builds_one_encoder_per_categorical_column() {
        let trips = [trip("SpiceJet", "Economy"), trip("Air_India", "Business")];
        let set = EncoderSet::fit(&trips).unwrap();

        assert_eq!(set.len(), Column::CATEGORICAL.len());
        assert_eq!(
            set.get(Column::Airline).unwrap().classes(),
            ["Air_India", "SpiceJet"]
        );
        assert_eq!(set.get(Column::Class).unwrap().fallback(), "Business");
        set.validate().unwrap();
    }

    #[test]
    fn numeric_columns_have_no_encoder() {
        let set = EncoderSet::fit(&[trip("SpiceJet", "Economy")]).unwrap();
        assert!(matches!(
            set.get(Column::Duration),
            Err(MlErr::MissingEncoder { column: "duration" })
        ));
    }

    #[test]
    fn fit_without_trips_fails() {
        let trips: [TripRecord; 0] = [];
        assert!(EncoderSet::fit(&trips).is_err());
    }

    #[test]
    fn validate_detects_missing_encoders() {
        let mut set = EncoderSet::fit(&[trip("SpiceJet", "Economy")]).unwrap();
        set.encoders.remove("flight");

        assert!(matches!(
            set.validate(),
            Err(MlErr::MissingEncoder { column: "flight" })
        ));
    }

    #[test]
    fn validate_rejects_an_empty_set() {
        let set: EncoderSet = serde_json::from_str(r#"{ "encoders": {} }"#).unwrap();

        assert!(set.is_empty());
        assert!(matches!(set.validate(), Err(MlErr::InvalidConfig(_))));
    }
}
