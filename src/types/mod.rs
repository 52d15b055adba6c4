mod geometry;
mod population;
mod zsj_key;

pub use geometry::{GeometryRecord, ID_COLUMN_CANDIDATES};
pub(crate) use geometry::{geometry_records, identifier_column};
pub use population::{PopulationIndex, PopulationRecord, ResidentCounts, POPULATION_CODE_COLUMN};
pub use zsj_key::{normalize_code, KeyRule, ShortKey, DEFAULT_KEY_WIDTH};
