use ahash::AHashMap;
use anyhow::Result;
use log::warn;
use polars::frame::DataFrame;

use crate::{io::csv::{column_names, optional_string_column}, types::normalize_code, PipelineError};

/// Census header of the ZSJ code column.
pub const POPULATION_CODE_COLUMN: &str = "Základná sídelná jednotka - kód";

/// Long census headers and the short names they are known by downstream.
/// Either form is accepted in the input.
const COLUMN_ALIASES: [(&str, &str); 12] = [
    ("Kraj - kód", "kraj_kod"),
    ("Kraj - názov", "kraj_nazov"),
    ("Okres - kód", "okres_kod"),
    ("Okres - názov", "okres_nazov"),
    ("Obec - kód", "obec_kod"),
    ("Obec - názov", "obec_nazov"),
    (POPULATION_CODE_COLUMN, "zsj_kod"),
    ("Základná sídelná jednotka - názov", "zsj_nazov"),
    ("Miesto trvalého pobytu alebo obvyklého bydliska - zhodné s trvalým pobytom", "pop_trvaly_pobyt"),
    ("Miesto trvalého pobytu alebo obvyklého bydliska - inde v SR", "pop_inde_sr"),
    ("Miesto trvalého pobytu alebo obvyklého bydliska - v zahraničí", "pop_zahranicie"),
    ("Spolu", "pop_total"),
];

/// Resident counts by place of permanent residence. `None` means the cell was blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResidentCounts {
    /// Usual residence equals permanent residence.
    pub local: Option<i64>,
    /// Permanent residence elsewhere in Slovakia.
    pub domestic_other: Option<i64>,
    /// Permanent residence abroad.
    pub foreign: Option<i64>,
    pub total: Option<i64>,
}

/// One row of the census table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationRecord {
    pub zsj_code: String,
    pub zsj_name: Option<String>,
    pub region_name: Option<String>,
    pub district_name: Option<String>,
    pub municipality_name: Option<String>,
    pub residents: ResidentCounts,
}

/// Census records keyed by normalized ZSJ code.
#[derive(Debug, Clone, Default)]
pub struct PopulationIndex {
    records: Vec<PopulationRecord>,
    by_code: AHashMap<String, usize>,
    duplicates: usize,
}

impl PopulationIndex {
    /// Build the index. Later records with an already-seen code are dropped.
    pub fn new(records: Vec<PopulationRecord>) -> Self {
        let mut by_code = AHashMap::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        let mut duplicates = 0;

        for record in records {
            if by_code.contains_key(&record.zsj_code) {
                duplicates += 1;
                if duplicates <= 3 {
                    warn!("[types::population] duplicate ZSJ code {}, keeping first record", record.zsj_code);
                }
                continue;
            }
            by_code.insert(record.zsj_code.clone(), kept.len());
            kept.push(record);
        }

        if duplicates > 3 {
            warn!("[types::population] {duplicates} duplicate ZSJ codes in total");
        }

        Self { records: kept, by_code, duplicates }
    }

    /// Load from a census table read with every column as text.
    pub(crate) fn from_frame(df: &DataFrame) -> Result<Self> {
        let column = |short: &str| -> Result<Option<Vec<Option<String>>>> {
            for (long, alias) in COLUMN_ALIASES {
                if alias == short {
                    if let Some(values) = optional_string_column(df, long)? { return Ok(Some(values)) }
                }
            }
            optional_string_column(df, short)
        };

        let codes = match column("zsj_kod")? {
            Some(codes) => codes,
            None => return Err(PipelineError::MissingColumn {
                table: "population",
                column: POPULATION_CODE_COLUMN.to_string(),
                available: column_names(df),
            }.into()),
        };

        let height = df.height();
        let text = |values: &Option<Vec<Option<String>>>, i: usize| {
            values.as_ref().and_then(|v| v[i].clone())
        };
        let count = |values: &Option<Vec<Option<String>>>, i: usize| {
            values.as_ref().and_then(|v| v[i].as_deref()).and_then(parse_count)
        };

        let zsj_names = column("zsj_nazov")?;
        let region_names = column("kraj_nazov")?;
        let district_names = column("okres_nazov")?;
        let municipality_names = column("obec_nazov")?;
        let local = column("pop_trvaly_pobyt")?;
        let domestic_other = column("pop_inde_sr")?;
        let foreign = column("pop_zahranicie")?;
        let total = column("pop_total")?;

        let records = (0..height)
            .filter_map(|i| codes[i].as_deref().map(|code| (i, normalize_code(code))))
            .map(|(i, zsj_code)| PopulationRecord {
                zsj_code,
                zsj_name: text(&zsj_names, i),
                region_name: text(&region_names, i),
                district_name: text(&district_names, i),
                municipality_name: text(&municipality_names, i),
                residents: ResidentCounts {
                    local: count(&local, i),
                    domestic_other: count(&domestic_other, i),
                    foreign: count(&foreign, i),
                    total: count(&total, i),
                },
            })
            .collect();

        Ok(Self::new(records))
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Number of input records dropped because their code was already present.
    #[inline] pub fn duplicates(&self) -> usize { self.duplicates }

    #[inline] pub fn records(&self) -> &[PopulationRecord] { &self.records }

    pub fn get(&self, code: &str) -> Option<&PopulationRecord> {
        self.by_code.get(code).map(|&i| &self.records[i])
    }

    /// The first `n` codes, for diagnostics.
    pub fn sample_codes(&self, n: usize) -> Vec<String> {
        self.records.iter().take(n).map(|r| r.zsj_code.clone()).collect()
    }
}

/// Parse a resident count. Accepts `12`, `12.0`, and space-grouped `1 234`;
/// NaN, infinities and text give `None`.
pub(crate) fn parse_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then(|| value.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, total: Option<i64>) -> PopulationRecord {
        PopulationRecord {
            zsj_code: code.into(),
            residents: ResidentCounts { total, ..Default::default() },
            ..Default::default()
        }
    }

    #[test]
    fn counts_parse_leniently() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count("42.0"), Some(42));
        assert_eq!(parse_count("1 234"), Some(1234));
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("inf"), None);
        assert_eq!(parse_count("x"), None);
    }

    #[test]
    fn first_duplicate_wins() {
        let index = PopulationIndex::new(vec![record("1", Some(10)), record("2", None), record("1", Some(99))]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.duplicates(), 1);
        assert_eq!(index.get("1").unwrap().residents.total, Some(10));
        assert!(index.get("3").is_none());
        assert_eq!(index.sample_codes(5), vec!["1", "2"]);
    }

    #[test]
    fn loads_long_census_headers() {
        let df = polars::df!(
            POPULATION_CODE_COLUMN => [" 2045520", "2045521"],
            "Základná sídelná jednotka - názov" => [Some("Staré Mesto"), None],
            "Okres - názov" => ["Bratislava I", "Bratislava I"],
            "Spolu" => [Some("120"), Some("")],
            "Miesto trvalého pobytu alebo obvyklého bydliska - v zahraničí" => ["7", "NaN"],
        ).unwrap();

        let index = PopulationIndex::from_frame(&df).unwrap();
        let first = index.get("2045520").unwrap();
        assert_eq!(first.zsj_name.as_deref(), Some("Staré Mesto"));
        assert_eq!(first.district_name.as_deref(), Some("Bratislava I"));
        assert_eq!(first.residents.total, Some(120));
        assert_eq!(first.residents.foreign, Some(7));
        assert_eq!(first.residents.local, None);

        let second = index.get("2045521").unwrap();
        assert_eq!(second.zsj_name, None);
        assert_eq!(second.residents.total, None);
        assert_eq!(second.residents.foreign, None);
    }

    #[test]
    fn accepts_short_headers() {
        let df = polars::df!("zsj_kod" => ["1"], "pop_total" => ["5"]).unwrap();
        let index = PopulationIndex::from_frame(&df).unwrap();
        assert_eq!(index.get("1").unwrap().residents.total, Some(5));
    }

    #[test]
    fn missing_code_column_is_fatal() {
        let df = polars::df!("Spolu" => ["5"]).unwrap();
        let err = PopulationIndex::from_frame(&df).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::MissingColumn { .. })));
    }
}
