use std::{fs::File, path::Path};

use csv::StringRecord;
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{
    MlErr, Result,
    encoding::EncoderSet,
    features::{Column, NUM_FEATURES, TripRecord},
};

/// A historical price observation for a single trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub trip: TripRecord,
    pub price: f64,
}

/// The positions of the relevant columns inside a csv header.
struct Layout {
    features: [usize; NUM_FEATURES],
    target: usize,
}

impl Layout {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let position = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(MlErr::MissingColumn(name))
        };

        let mut features = [0; NUM_FEATURES];
        for (slot, column) in features.iter_mut().zip(Column::ALL) {
            *slot = position(column.name())?;
        }
        let target = position(Column::TARGET)?;

        for (i, header) in headers.iter().enumerate() {
            if features.contains(&i) || i == target {
                continue;
            }

            if header.is_empty() || header.starts_with("Unnamed") {
                debug!(position = i; "dropping unnamed index column");
            } else {
                warn!(column = header; "ignoring column unknown to the model");
            }
        }

        Ok(Self { features, target })
    }

    fn field<'r>(&self, record: &'r StringRecord, column: Column) -> &'r str {
        // `Column::ALL` is indexed in declaration order.
        record.get(self.features[column as usize]).unwrap_or_default()
    }
}

/// Reads every observation of a csv dataset with a header row.
///
/// # Arguments
/// * `path` - The path to the csv file.
///
/// # Returns
/// The observations in file order, or an error if the file is missing, lacks a required column,
/// holds an unparsable value or has no rows.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let csv_err = |source: csv::Error| MlErr::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| MlErr::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let layout = Layout::resolve(reader.headers().map_err(csv_err)?)?;

    let mut observations = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        observations.push(parse_record(&layout, &record, i + 1)?);
    }

    if observations.is_empty() {
        return Err(MlErr::EmptyDataset);
    }

    info!(rows = observations.len(); "dataset loaded");
    Ok(observations)
}

fn parse_record(layout: &Layout, record: &StringRecord, row: usize) -> Result<Observation> {
    let label = |column: Column| layout.field(record, column).to_string();
    let invalid = |column: &'static str, value: &str| MlErr::InvalidValue {
        row,
        column,
        value: value.to_string(),
    };

    let duration = layout.field(record, Column::Duration);
    let days_left = layout.field(record, Column::DaysLeft);
    let price = record.get(layout.target).unwrap_or_default();

    let trip = TripRecord {
        airline: label(Column::Airline),
        flight: label(Column::Flight),
        source_city: label(Column::SourceCity),
        departure_time: label(Column::DepartureTime),
        stops: label(Column::Stops),
        arrival_time: label(Column::ArrivalTime),
        destination_city: label(Column::DestinationCity),
        class: label(Column::Class),
        duration: parse_finite(duration)
            .ok_or_else(|| invalid(Column::Duration.name(), duration))?,
        days_left: days_left
            .parse()
            .map_err(|_| invalid(Column::DaysLeft.name(), days_left))?,
    };

    let price = parse_finite(price).ok_or_else(|| invalid(Column::TARGET, price))?;
    Ok(Observation { trip, price })
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse().ok().filter(|x: &f64| x.is_finite())
}

/// The fully encoded training data: the fitted encoders, the feature matrix and the target.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    encoders: EncoderSet,
    x: Array2<f64>,
    y: Array1<f64>,
}

impl TrainingSet {
    /// Fits the encoders over `observations` and encodes them.
    ///
    /// # Arguments
    /// * `observations` - The raw observations.
    ///
    /// # Returns
    /// A new `TrainingSet` whose matrix columns follow `Column::ALL`.
    pub fn fit(observations: &[Observation]) -> Result<Self> {
        if observations.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let encoders = EncoderSet::fit(observations.iter().map(|o| &o.trip))?;

        let mut x = Array2::zeros((observations.len(), NUM_FEATURES));
        for (mut row, observation) in x.rows_mut().into_iter().zip(observations) {
            row.assign(&observation.trip.encode_strict(&encoders)?);
        }

        let y = observations.iter().map(|o| o.price).collect();
        Ok(Self { encoders, x, y })
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    /// Returns the amount of observations in the set.
    pub fn rows(&self) -> usize {
        self.y.len()
    }

    /// Consumes the set, keeping only the encoders.
    pub fn into_encoders(self) -> EncoderSet {
        self.encoders
    }
}
