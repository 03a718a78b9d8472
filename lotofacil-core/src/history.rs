use tracing::debug;

use crate::extract::{extract_numbers, RawCell};
use crate::models::{Draw, DRAW_SIZE};

/// Bilan de la normalisation : combien de lignes ont été écartées, et pourquoi.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub total_records: usize,
    /// Moins de 15 numéros exploitables.
    pub incomplete: usize,
    /// 15 numéros, mais avec des doublons.
    pub duplicated: usize,
}

impl NormalizeReport {
    pub fn discarded(&self) -> usize {
        self.incomplete + self.duplicated
    }
}

/// Tirages valides dans l'ordre des lignes d'origine. Le dernier est le tirage
/// de référence.
#[derive(Debug, Clone, Default)]
pub struct DrawHistory {
    draws: Vec<Draw>,
    report: NormalizeReport,
}

impl DrawHistory {
    pub fn from_draws(draws: Vec<Draw>) -> Self {
        let report = NormalizeReport {
            total_records: draws.len(),
            ..NormalizeReport::default()
        };
        Self { draws, report }
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Dernier tirage conservé (et non l'index le plus élevé du fichier).
    pub fn reference(&self) -> Option<&Draw> {
        self.draws.last()
    }

    /// Les `n` derniers tirages, dans l'ordre chronologique.
    pub fn tail(&self, n: usize) -> &[Draw] {
        let start = self.draws.len().saturating_sub(n);
        &self.draws[start..]
    }

    pub fn report(&self) -> &NormalizeReport {
        &self.report
    }

    pub fn discarded(&self) -> usize {
        self.report.discarded()
    }
}

/// Construit l'historique : une ligne qui ne donne pas un tirage complet et
/// sans doublon est écartée, et son index n'est pas réutilisé.
pub fn normalize<R: AsRef<[RawCell]>>(records: &[R]) -> DrawHistory {
    let mut report = NormalizeReport {
        total_records: records.len(),
        ..NormalizeReport::default()
    };
    let mut draws = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let numbers = extract_numbers(record.as_ref());
        if numbers.len() < DRAW_SIZE {
            debug!(index, found = numbers.len(), "ligne incomplète ignorée");
            report.incomplete += 1;
            continue;
        }
        match Draw::new(index, &numbers) {
            Ok(draw) => draws.push(draw),
            Err(e) => {
                debug!(index, error = %e, "ligne ignorée");
                report.duplicated += 1;
            }
        }
    }

    DrawHistory { draws, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_row(values: &[i64]) -> Vec<RawCell> {
        values.iter().map(|&v| RawCell::Integer(v)).collect()
    }

    #[test]
    fn test_two_complete_rows() {
        let rows = vec![
            int_row(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
            int_row(&[2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 1, 3, 5, 7, 9]),
        ];
        let history = normalize(&rows);
        assert_eq!(history.len(), 2);
        assert_eq!(history.reference().unwrap().draw_index, 1);
        assert_eq!(history.discarded(), 0);
    }

    #[test]
    fn test_incomplete_rows_keep_original_index() {
        let rows = vec![
            int_row(&[1, 2, 3]),
            int_row(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
            vec![RawCell::from_text("résultat"), RawCell::Empty],
            int_row(&[11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25]),
            int_row(&[25, 24]),
        ];
        let history = normalize(&rows);
        let indices: Vec<usize> = history.draws().iter().map(|d| d.draw_index).collect();
        assert_eq!(indices, vec![1, 3]);
        // La référence est le dernier tirage conservé, pas la dernière ligne.
        assert_eq!(history.reference().unwrap().draw_index, 3);
        assert_eq!(history.report().incomplete, 3);
    }

    #[test]
    fn test_duplicate_numbers_discarded() {
        let rows = vec![int_row(&[1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14])];
        let history = normalize(&rows);
        assert!(history.is_empty());
        assert_eq!(history.report().duplicated, 1);
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<Vec<RawCell>> = vec![];
        let history = normalize(&rows);
        assert!(history.is_empty());
        assert!(history.reference().is_none());
    }

    #[test]
    fn test_all_rows_malformed() {
        let rows = vec![
            vec![RawCell::from_text("abc")],
            vec![RawCell::Empty, RawCell::Integer(99)],
        ];
        let history = normalize(&rows);
        assert!(history.is_empty());
        assert_eq!(history.discarded(), 2);
    }

    #[test]
    fn test_tail() {
        let rows: Vec<Vec<RawCell>> = (0..5)
            .map(|_| int_row(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]))
            .collect();
        let history = normalize(&rows);
        assert_eq!(history.tail(2).len(), 2);
        assert_eq!(history.tail(2)[0].draw_index, 3);
        assert_eq!(history.tail(50).len(), 5);
    }
}
