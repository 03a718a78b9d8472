use std::ops::RangeInclusive;

use crate::error::{CoreError, Result};

/// Plus grand numéro tirable (les numéros vont de 1 à 25).
pub const POOL_SIZE: u8 = 25;

/// Nombre de numéros d'un tirage.
pub const DRAW_SIZE: usize = 15;

/// Recoupements rapportés par l'analyse. Les valeurs 0..=4 et 15 sont calculées
/// mais volontairement absentes des groupes : 15 correspond toujours au tirage
/// de référence lui-même.
pub const BUCKET_RANGE: RangeInclusive<u8> = 5..=14;

pub fn is_even(n: u8) -> bool {
    n % 2 == 0
}

/// (pairs, impairs)
pub fn parity_counts(numbers: &[u8]) -> (u8, u8) {
    let even = numbers.iter().filter(|&&n| is_even(n)).count() as u8;
    (even, numbers.len() as u8 - even)
}

/// Masque binaire des numéros : le bit `n` est levé si `n` est présent.
/// Les numéros hors de 1..=25 sont ignorés.
pub fn number_mask(numbers: &[u8]) -> u32 {
    numbers
        .iter()
        .filter(|&&n| (1..=POOL_SIZE).contains(&n))
        .fold(0u32, |mask, &n| mask | (1 << n))
}

/// Les numéros de 1..=25 absents de `numbers`, triés.
pub fn universe_complement(numbers: &[u8]) -> Vec<u8> {
    let mask = number_mask(numbers);
    (1..=POOL_SIZE).filter(|&n| mask & (1 << n) == 0).collect()
}

pub fn validate_draw(numbers: &[u8]) -> Result<()> {
    if numbers.len() != DRAW_SIZE {
        return Err(CoreError::InvalidDraw(format!(
            "{} numéros au lieu de {}",
            numbers.len(),
            DRAW_SIZE
        )));
    }
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            return Err(CoreError::InvalidDraw(format!("numéro {} hors limites (1-25)", n)));
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(CoreError::InvalidDraw(format!("numéro en double : {}", numbers[i])));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    /// Position de la ligne d'origine, jamais renumérotée.
    pub draw_index: usize,
    /// Ordre d'extraction, non trié.
    pub numbers: [u8; DRAW_SIZE],
    pub sum: u32,
    pub even_count: u8,
    pub odd_count: u8,
}

impl Draw {
    pub fn new(draw_index: usize, numbers: &[u8]) -> Result<Self> {
        validate_draw(numbers)?;
        let mut arr = [0u8; DRAW_SIZE];
        arr.copy_from_slice(numbers);
        let (even_count, odd_count) = parity_counts(&arr);
        Ok(Self {
            draw_index,
            numbers: arr,
            sum: arr.iter().map(|&n| n as u32).sum(),
            even_count,
            odd_count,
        })
    }

    pub fn sorted_numbers(&self) -> [u8; DRAW_SIZE] {
        let mut sorted = self.numbers;
        sorted.sort();
        sorted
    }

    pub fn mask(&self) -> u32 {
        number_mask(&self.numbers)
    }

    /// Cardinal de l'intersection avec un autre tirage.
    pub fn common_with(&self, other: &Draw) -> u8 {
        (self.mask() & other.mask()).count_ones() as u8
    }
}

/// Paramètres ayant produit une combinaison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationParams {
    pub overlap_k: u8,
    pub target_even_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    /// Toujours triés.
    pub numbers: [u8; DRAW_SIZE],
    pub sum: u32,
    pub even_count: u8,
    pub odd_count: u8,
    pub params: CombinationParams,
}

impl Combination {
    pub fn new(mut numbers: [u8; DRAW_SIZE], params: CombinationParams) -> Self {
        numbers.sort();
        let (even_count, odd_count) = parity_counts(&numbers);
        Self {
            numbers,
            sum: numbers.iter().map(|&n| n as u32).sum(),
            even_count,
            odd_count,
            params,
        }
    }
}
