use ahash::AHashSet;
use anyhow::Result;
use log::warn;

use crate::{error::KeySamples, types::{GeometryRecord, KeyRule, PopulationIndex, PopulationRecord, ShortKey}, PipelineError};

/// Number of keys from each side shown when nothing matches.
const SAMPLE_SIZE: usize = 5;

/// A geometry row with its derived key and, if found, its census record.
#[derive(Debug, Clone)]
pub struct JoinedRow<'a> {
    pub geometry: &'a GeometryRecord,
    pub short_key: Option<ShortKey>,
    pub population: Option<&'a PopulationRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub total: usize,
    /// Rows whose key found a census record.
    pub found: usize,
    /// Rows whose census record carries a total population.
    pub matched: usize,
    /// Keys that are not all digits of the expected width.
    pub malformed_keys: usize,
    /// Rows whose key was already used by an earlier geometry row.
    pub duplicate_keys: usize,
}

/// Left join geometry rows to census records on the derived short key.
///
/// One output row per geometry row. Fails with [`PipelineError::NoMatches`]
/// when no row found a census record with a total population.
pub fn left_join<'a>(
    geometries: &'a [GeometryRecord],
    population: &'a PopulationIndex,
    rule: &KeyRule,
) -> Result<(Vec<JoinedRow<'a>>, JoinStats)> {
    let mut stats = JoinStats { total: geometries.len(), ..Default::default() };
    let mut seen = AHashSet::with_capacity(geometries.len());

    let rows: Vec<JoinedRow<'a>> = geometries.iter()
        .map(|geometry| {
            let short_key = geometry.raw_id.as_deref().map(|id| rule.derive(id));

            if let Some(key) = &short_key {
                if !key.well_formed {
                    stats.malformed_keys += 1;
                    if stats.malformed_keys <= 3 {
                        warn!("[merge::join] identifier {:?} gives key {:?}, expected {} digits",
                            geometry.raw_id.as_deref().unwrap_or_default(), key.key, rule.width());
                    }
                }
                if !seen.insert(key.key.clone()) {
                    stats.duplicate_keys += 1;
                }
            }

            let record = short_key.as_ref().and_then(|key| population.get(&key.key));
            if let Some(record) = record {
                stats.found += 1;
                if record.residents.total.is_some() { stats.matched += 1 }
            }

            JoinedRow { geometry, short_key, population: record }
        })
        .collect();

    if stats.malformed_keys > 3 {
        warn!("[merge::join] {} identifiers gave malformed keys", stats.malformed_keys);
    }
    if stats.duplicate_keys > 0 {
        warn!("[merge::join] {} geometry rows share a key with an earlier row; census values are repeated", stats.duplicate_keys);
    }

    if stats.matched == 0 {
        if stats.found > 0 {
            warn!("[merge::join] {} keys found a census record, but none has a total population", stats.found);
        }
        let samples = KeySamples {
            geometry_ids: geometries.iter().take(SAMPLE_SIZE)
                .map(|g| g.raw_id.clone().unwrap_or_default())
                .collect(),
            short_keys: rows.iter().take(SAMPLE_SIZE)
                .map(|r| r.short_key.as_ref().map(|k| k.key.clone()).unwrap_or_default())
                .collect(),
            population_keys: population.sample_codes(SAMPLE_SIZE),
        };
        return Err(PipelineError::NoMatches { samples }.into());
    }

    Ok((rows, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResidentCounts;

    fn geometry(id: Option<&str>) -> GeometryRecord {
        GeometryRecord { raw_id: id.map(str::to_string), wkt: Some("POINT(0 0)".into()), ..Default::default() }
    }

    fn census(codes: &[&str]) -> PopulationIndex {
        PopulationIndex::new(codes.iter().map(|code| PopulationRecord {
            zsj_code: code.to_string(),
            residents: ResidentCounts { total: Some(1), ..Default::default() },
            ..Default::default()
        }).collect())
    }

    #[test]
    fn keeps_geometry_cardinality() {
        let geometries = vec![geometry(Some("SK01012045520")), geometry(Some("SK01012045521")), geometry(None)];
        let population = census(&["2045520"]);

        let (rows, stats) = left_join(&geometries, &population, &KeyRule::default()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(stats, JoinStats { total: 3, found: 1, matched: 1, malformed_keys: 0, duplicate_keys: 0 });
        assert_eq!(rows[0].population.unwrap().zsj_code, "2045520");
        assert!(rows[1].population.is_none());
        assert!(rows[2].short_key.is_none());
    }

    #[test]
    fn duplicate_and_malformed_keys_are_counted() {
        let geometries = vec![
            geometry(Some("SK01012045520")),
            geometry(Some("XX99992045520")),
            geometry(Some("123")),
        ];
        let population = census(&["2045520"]);

        let (rows, stats) = left_join(&geometries, &population, &KeyRule::default()).unwrap();
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.duplicate_keys, 1);
        assert_eq!(stats.malformed_keys, 1);
        assert_eq!(rows[0].population, rows[1].population);
    }

    #[test]
    fn disjoint_keys_abort_with_samples() {
        let geometries = vec![geometry(Some("SK01012045520"))];
        let population = census(&["9999999"]);

        let err = left_join(&geometries, &population, &KeyRule::default()).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::NoMatches { samples }) => {
                assert_eq!(samples.geometry_ids, vec!["SK01012045520"]);
                assert_eq!(samples.short_keys, vec!["2045520"]);
                assert_eq!(samples.population_keys, vec!["9999999"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn records_without_totals_do_not_count_as_matches() {
        let geometries = vec![geometry(Some("SK01012045520")), geometry(Some("SK01012045521"))];
        let mut population = census(&["2045520", "2045521"]).records().to_vec();
        population[1].residents.total = None;

        let index = PopulationIndex::new(population);
        let (rows, stats) = left_join(&geometries, &index, &KeyRule::default()).unwrap();
        assert_eq!(stats.found, 2);
        assert_eq!(stats.matched, 1);
        assert!(rows[1].population.is_some());
    }

    #[test]
    fn blank_totals_everywhere_abort() {
        let geometries = vec![geometry(Some("SK01012045520"))];
        let population = PopulationIndex::new(vec![PopulationRecord {
            zsj_code: "2045520".into(),
            ..Default::default()
        }]);

        let err = left_join(&geometries, &population, &KeyRule::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::NoMatches { .. })));
    }

    #[test]
    fn empty_geometry_table_aborts() {
        assert!(left_join(&[], &census(&["1"]), &KeyRule::default()).is_err());
    }
}
