//! Extraction des numéros d'une ligne brute.
//!
//! Chaque cellule est d'abord classée (vide, nombre, liste délimitée,
//! inexploitable), puis seuls les entiers de 1 à 25 sont conservés, dans
//! l'ordre de lecture, à hauteur de 15.

use crate::models::{DRAW_SIZE, POOL_SIZE};

const LIST_DELIMITERS: [char; 2] = [',', ';'];

/// Cellule telle que lue dans le fichier source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawCell {
    /// Une cellule texte vide (ou composée d'espaces) est considérée absente.
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }

    pub fn classify(&self) -> CellKind {
        match self {
            RawCell::Empty => CellKind::Empty,
            RawCell::Integer(n) => CellKind::Number(*n),
            RawCell::Float(f) if f.is_nan() => CellKind::Empty,
            RawCell::Float(f) if f.is_finite() => CellKind::Number(f.trunc() as i64),
            RawCell::Float(_) => CellKind::Unparseable,
            RawCell::Text(s) => classify_text(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Number(i64),
    DelimitedList(Vec<i64>),
    Unparseable,
}

impl CellKind {
    pub fn values(&self) -> &[i64] {
        match self {
            CellKind::Number(n) => std::slice::from_ref(n),
            CellKind::DelimitedList(values) => values,
            CellKind::Empty | CellKind::Unparseable => &[],
        }
    }
}

fn classify_text(s: &str) -> CellKind {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return CellKind::Empty;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return CellKind::Number(n);
    }
    // Les jetons invalides sont ignorés sans erreur.
    let values: Vec<i64> = trimmed
        .split(LIST_DELIMITERS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<i64>().ok())
        .collect();
    if values.is_empty() {
        CellKind::Unparseable
    } else {
        CellKind::DelimitedList(values)
    }
}

fn in_pool(n: i64) -> Option<u8> {
    if (1..=POOL_SIZE as i64).contains(&n) {
        Some(n as u8)
    } else {
        None
    }
}

/// Extrait au plus 15 numéros de 1 à 25 d'une ligne, dans l'ordre de lecture.
/// Les doublons sont conservés : la complétude et l'unicité sont vérifiées
/// par la normalisation.
pub fn extract_numbers(row: &[RawCell]) -> Vec<u8> {
    row.iter()
        .map(RawCell::classify)
        .flat_map(|kind| kind.values().to_vec())
        .filter_map(in_pool)
        .take(DRAW_SIZE)
        .collect()
}
