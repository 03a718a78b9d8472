use std::collections::BTreeMap;

use tracing::info;

use crate::error::{CoreError, Result};
use crate::history::DrawHistory;
use crate::models::{Draw, BUCKET_RANGE, DRAW_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRecord {
    pub draw_index: usize,
    pub common_with_reference: u8,
    pub sum: u32,
    pub even_count: u8,
    pub odd_count: u8,
    pub numbers: [u8; DRAW_SIZE],
}

impl ComparisonRecord {
    fn compare(draw: &Draw, reference: &Draw) -> Self {
        Self {
            draw_index: draw.draw_index,
            common_with_reference: draw.common_with(reference),
            sum: draw.sum,
            even_count: draw.even_count,
            odd_count: draw.odd_count,
            numbers: draw.numbers,
        }
    }
}

/// Tirages groupés par nombre exact de numéros communs avec la référence.
/// Toutes les clés de `BUCKET_RANGE` sont présentes, même vides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapBuckets {
    buckets: BTreeMap<u8, Vec<ComparisonRecord>>,
}

impl OverlapBuckets {
    fn from_records(records: &[ComparisonRecord]) -> Self {
        let mut buckets: BTreeMap<u8, Vec<ComparisonRecord>> =
            BUCKET_RANGE.map(|k| (k, Vec::new())).collect();
        for record in records {
            if let Some(bucket) = buckets.get_mut(&record.common_with_reference) {
                bucket.push(record.clone());
            }
        }
        Self { buckets }
    }

    pub fn get(&self, overlap: u8) -> &[ComparisonRecord] {
        self.buckets.get(&overlap).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[ComparisonRecord])> {
        self.buckets.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    /// (recoupement, nombre de tirages) pour chaque groupe.
    pub fn sizes(&self) -> Vec<(u8, usize)> {
        self.buckets.iter().map(|(&k, v)| (k, v.len())).collect()
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub reference: Draw,
    pub records: Vec<ComparisonRecord>,
    pub buckets: OverlapBuckets,
}

pub fn analyze(history: &DrawHistory) -> Result<Analysis> {
    let reference = history.reference().ok_or(CoreError::EmptyHistory)?.clone();

    let records: Vec<ComparisonRecord> = history
        .draws()
        .iter()
        .map(|draw| ComparisonRecord::compare(draw, &reference))
        .collect();
    let buckets = OverlapBuckets::from_records(&records);

    info!(
        draws = records.len(),
        reference_index = reference.draw_index,
        "analyse terminée"
    );

    Ok(Analysis {
        reference,
        records,
        buckets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawCell;
    use crate::history::normalize;

    fn draw(index: usize, numbers: &[u8]) -> Draw {
        Draw::new(index, numbers).unwrap()
    }

    #[test]
    fn test_empty_history_rejected() {
        let history = DrawHistory::default();
        assert!(matches!(analyze(&history), Err(CoreError::EmptyHistory)));
    }

    #[test]
    fn test_reference_overlaps_itself() {
        let history = DrawHistory::from_draws(vec![draw(
            0,
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
        )]);
        let analysis = analyze(&history).unwrap();
        assert_eq!(analysis.records.len(), 1);
        assert_eq!(analysis.records[0].common_with_reference, 15);
        // 15 n'est pas un groupe rapporté.
        assert!(analysis.buckets.iter().all(|(_, records)| records.is_empty()));
    }

    #[test]
    fn test_two_rows_from_raw_input() {
        let rows: Vec<Vec<RawCell>> = vec![
            (1..=15).map(RawCell::Integer).collect(),
            [2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 1, 3, 5, 7, 9]
                .iter()
                .map(|&n| RawCell::Integer(n))
                .collect(),
        ];
        let analysis = analyze(&normalize(&rows)).unwrap();
        assert_eq!(analysis.reference.draw_index, 1);
        assert_eq!(analysis.records[1].common_with_reference, 15);
        // {1..15} ∩ {2,4,…,14,1,3,5,7,9} = 12 numéros.
        assert_eq!(analysis.records[0].common_with_reference, 12);
        assert_eq!(analysis.buckets.get(12).len(), 1);
        assert_eq!(analysis.buckets.get(12)[0].draw_index, 0);
    }

    #[test]
    fn test_bucket_sizes() {
        let history = DrawHistory::from_draws(vec![
            draw(0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
            draw(1, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 16]),
            draw(2, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 20, 21, 22, 23, 24, 25]),
            draw(3, &[11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25]),
        ]);
        let analysis = analyze(&history).unwrap();
        let overlaps: Vec<u8> = analysis.records.iter().map(|r| r.common_with_reference).collect();
        assert_eq!(overlaps, vec![5, 5, 6, 15]);

        let sizes = analysis.buckets.sizes();
        assert_eq!(sizes.len(), 10);
        assert_eq!(sizes.first(), Some(&(5, 2)));
        assert_eq!(sizes[1], (6, 1));
        assert_eq!(sizes.last(), Some(&(14, 0)));
        assert_eq!(sizes.iter().map(|(_, n)| n).sum::<usize>(), 3);
    }

    #[test]
    fn test_repeat_of_reference_not_bucketed() {
        let numbers = [3, 5, 7, 9, 11, 13, 15, 17, 19, 21, 23, 25, 2, 4, 6];
        let history = DrawHistory::from_draws(vec![draw(0, &numbers), draw(1, &numbers)]);
        let analysis = analyze(&history).unwrap();
        assert_eq!(analysis.records[0].common_with_reference, 15);
        assert!(analysis.buckets.iter().all(|(_, records)| records.is_empty()));
    }
}
