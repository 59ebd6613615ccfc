mod label;
mod set;

pub use label::LabelEncoder;
pub use set::EncoderSet;
