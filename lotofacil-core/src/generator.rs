//! Génération de combinaisons par échantillonnage avec rejet.
//!
//! Chaque combinaison prend exactement `overlap_k` numéros dans le tirage de
//! référence et complète avec des numéros du complémentaire (les 10 numéros
//! absents de la référence), de sorte que le total de numéros pairs soit
//! `target_even_count`. Les répartitions de parité impossibles sont rejetées
//! avant de tirer le complément.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::models::{
    is_even, universe_complement, validate_draw, Combination, CombinationParams, Draw, DRAW_SIZE,
};

pub const DEFAULT_MAX_ATTEMPTS: u64 = 200_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub reference: [u8; DRAW_SIZE],
    pub overlap_k: u8,
    pub target_even_count: u8,
    pub quantity: usize,
    pub max_attempts: u64,
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(reference: &Draw, overlap_k: u8, target_even_count: u8, quantity: usize) -> Self {
        Self {
            reference: reference.numbers,
            overlap_k,
            target_even_count,
            quantity,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Les 10 numéros de 1..=25 absents de la référence.
    pub fn universe_complement(&self) -> Vec<u8> {
        universe_complement(&self.reference)
    }

    pub fn params(&self) -> CombinationParams {
        CombinationParams {
            overlap_k: self.overlap_k,
            target_even_count: self.target_even_count,
        }
    }

    /// Seules les requêtes structurellement fausses sont refusées ; une parité
    /// impossible ne l'est pas et épuise simplement le budget de tentatives.
    fn validate(&self) -> Result<()> {
        validate_draw(&self.reference)
            .map_err(|e| CoreError::InvalidRequest(format!("référence : {}", e)))?;
        if self.overlap_k as usize > DRAW_SIZE {
            return Err(CoreError::InvalidRequest(format!(
                "k = {} dépasse les {} numéros de la référence",
                self.overlap_k, DRAW_SIZE
            )));
        }
        Ok(())
    }
}

/// Compteurs de rejets, utiles pour diagnostiquer une génération incomplète.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rejections {
    /// Parité hors des emplacements restants.
    pub parity: u64,
    /// Pas assez de pairs ou d'impairs dans le complémentaire.
    pub pool: u64,
    pub duplicate: u64,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Dans l'ordre d'acceptation.
    pub combinations: Vec<Combination>,
    pub attempts_used: u64,
    /// Budget épuisé avant d'atteindre la quantité demandée.
    pub exhausted: bool,
    pub rejections: Rejections,
    pub requested: usize,
}

impl GenerationOutcome {
    pub fn is_complete(&self) -> bool {
        !self.exhausted
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.combinations.len())
    }
}

struct ComplementPools {
    even: Vec<u8>,
    odd: Vec<u8>,
}

impl ComplementPools {
    fn new(complement: &[u8]) -> Self {
        let (even, odd): (Vec<u8>, Vec<u8>) = complement.iter().copied().partition(|&n| is_even(n));
        Self { even, odd }
    }
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Génère avec le générateur aléatoire dérivé de `request.seed`.
pub fn generate(request: &GenerationRequest) -> Result<GenerationOutcome> {
    let mut rng = seeded_rng(request.seed);
    generate_with_rng(request, &mut rng)
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    request: &GenerationRequest,
    rng: &mut R,
) -> Result<GenerationOutcome> {
    request.validate()?;

    let k = request.overlap_k as usize;
    let slots = DRAW_SIZE - k;
    let target = request.target_even_count as usize;
    let params = request.params();
    let pools = ComplementPools::new(&request.universe_complement());

    let mut seen: HashSet<[u8; DRAW_SIZE]> = HashSet::with_capacity(request.quantity);
    let mut combinations = Vec::with_capacity(request.quantity);
    let mut rejections = Rejections::default();
    let mut attempts = 0u64;

    while combinations.len() < request.quantity && attempts < request.max_attempts {
        attempts += 1;

        let mut key = [0u8; DRAW_SIZE];
        for (slot, &n) in key.iter_mut().zip(request.reference.choose_multiple(rng, k)) {
            *slot = n;
        }
        let evens_chosen = key[..k].iter().filter(|&&n| is_even(n)).count();

        if evens_chosen > target || target - evens_chosen > slots {
            rejections.parity += 1;
            continue;
        }
        let evens_needed = target - evens_chosen;
        let odds_needed = slots - evens_needed;
        if evens_needed > pools.even.len() || odds_needed > pools.odd.len() {
            rejections.pool += 1;
            continue;
        }

        // k + pairs + impairs = 15 : chaque emplacement est rempli une fois.
        for (slot, &n) in key[k..].iter_mut().zip(pools.even.choose_multiple(rng, evens_needed)) {
            *slot = n;
        }
        for (slot, &n) in key[k + evens_needed..]
            .iter_mut()
            .zip(pools.odd.choose_multiple(rng, odds_needed))
        {
            *slot = n;
        }
        key.sort_unstable();

        if !seen.insert(key) {
            rejections.duplicate += 1;
            continue;
        }
        combinations.push(Combination::new(key, params));
    }

    let exhausted = combinations.len() < request.quantity;
    debug!(
        attempts,
        accepted = combinations.len(),
        parity = rejections.parity,
        pool = rejections.pool,
        duplicate = rejections.duplicate,
        "échantillonnage terminé"
    );
    if exhausted {
        warn!(
            requested = request.quantity,
            generated = combinations.len(),
            k = request.overlap_k,
            even = request.target_even_count,
            "budget de tentatives épuisé"
        );
    }

    Ok(GenerationOutcome {
        combinations,
        attempts_used: attempts,
        exhausted,
        rejections,
        requested: request.quantity,
    })
}

/// Requêtes indépendantes exécutées en parallèle. Chacune garde son propre
/// générateur aléatoire, l'ordre des résultats suit celui des requêtes.
pub fn generate_batch(requests: &[GenerationRequest]) -> Vec<Result<GenerationOutcome>> {
    requests.par_iter().map(generate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: [u8; 15] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

    fn request(k: u8, even: u8, quantity: usize) -> GenerationRequest {
        let reference = Draw::new(0, &REFERENCE).unwrap();
        GenerationRequest::new(&reference, k, even, quantity).with_seed(Some(42))
    }

    fn assert_valid(outcome: &GenerationOutcome, k: u8, even: u8) {
        let mut unique = HashSet::new();
        for combo in &outcome.combinations {
            assert!(combo.numbers.windows(2).all(|w| w[0] < w[1]), "{:?}", combo.numbers);
            assert!(combo.numbers.iter().all(|&n| (1..=25).contains(&n)));
            let from_reference = combo.numbers.iter().filter(|n| REFERENCE.contains(n)).count();
            assert_eq!(from_reference, k as usize);
            assert_eq!(combo.even_count, even);
            assert_eq!(combo.odd_count, 15 - even);
            assert_eq!(combo.params, CombinationParams { overlap_k: k, target_even_count: even });
            assert!(unique.insert(combo.numbers));
        }
    }

    #[test]
    fn test_feasible_request_complete() {
        let outcome = generate(&request(8, 7, 50)).unwrap();
        assert_eq!(outcome.combinations.len(), 50);
        assert!(outcome.is_complete());
        assert_eq!(outcome.shortfall(), 0);
        assert!(outcome.attempts_used >= 50);
        assert_valid(&outcome, 8, 7);
    }

    #[test]
    fn test_all_k_in_ui_range() {
        for k in 5..=12u8 {
            let outcome = generate(&request(k, 7, 10)).unwrap();
            assert_eq!(outcome.combinations.len(), 10, "k = {}", k);
            assert_valid(&outcome, k, 7);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let a = generate(&request(9, 8, 20)).unwrap();
        let b = generate(&request(9, 8, 20)).unwrap();
        assert_eq!(a.combinations, b.combinations);
        assert_eq!(a.attempts_used, b.attempts_used);
    }

    #[test]
    fn test_explicit_rng_handle() {
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = generate_with_rng(&request(6, 6, 5), &mut rng).unwrap();
        assert_eq!(outcome.combinations.len(), 5);
        assert_valid(&outcome, 6, 6);
    }

    #[test]
    fn test_whole_reference_converges_to_one() {
        // k = 15 : aucun emplacement pour le complémentaire, une seule combinaison possible.
        let req = request(15, 7, 5).with_max_attempts(1_000);
        let outcome = generate(&req).unwrap();
        assert_eq!(outcome.combinations.len(), 1);
        assert_eq!(outcome.combinations[0].numbers, REFERENCE);
        assert!(outcome.exhausted);
        assert_eq!(outcome.attempts_used, 1_000);
        assert_eq!(outcome.rejections.duplicate, 999);
        assert_eq!(outcome.shortfall(), 4);
    }

    #[test]
    fn test_whole_reference_wrong_parity() {
        let outcome = generate(&request(15, 8, 1).with_max_attempts(100)).unwrap();
        assert!(outcome.combinations.is_empty());
        assert_eq!(outcome.rejections.parity, 100);
    }

    #[test]
    fn test_impossible_parity_exhausts() {
        let outcome = generate(&request(8, 16, 10).with_max_attempts(5_000)).unwrap();
        assert!(outcome.combinations.is_empty());
        assert!(outcome.exhausted);
        assert_eq!(outcome.attempts_used, 5_000);
    }

    #[test]
    fn test_pool_shortage_rejected() {
        // k = 5 : 10 numéros du complémentaire (5 pairs, 5 impairs), il en faut donc
        // exactement 5 pairs ; 0 pair au total est impossible.
        let outcome = generate(&request(5, 0, 3).with_max_attempts(500)).unwrap();
        assert!(outcome.combinations.is_empty());
        assert_eq!(outcome.rejections.parity + outcome.rejections.pool, 500);
    }

    #[test]
    fn test_every_attempt_accounted() {
        for (k, even, quantity) in [(8, 7, 40), (15, 7, 3), (5, 0, 3), (12, 9, 30), (10, 16, 5)] {
            let outcome = generate(&request(k, even, quantity).with_max_attempts(3_000)).unwrap();
            let r = outcome.rejections;
            assert_eq!(
                outcome.attempts_used,
                r.parity + r.pool + r.duplicate + outcome.combinations.len() as u64,
                "k = {}, pairs = {}",
                k,
                even
            );
        }
    }

    #[test]
    fn test_zero_quantity() {
        let outcome = generate(&request(8, 7, 0)).unwrap();
        assert!(outcome.combinations.is_empty());
        assert!(!outcome.exhausted);
        assert_eq!(outcome.attempts_used, 0);
    }

    #[test]
    fn test_invalid_requests() {
        assert!(matches!(
            generate(&request(16, 7, 1)),
            Err(CoreError::InvalidRequest(_))
        ));
        let mut bad = request(8, 7, 1);
        bad.reference[0] = 2;
        assert!(matches!(generate(&bad), Err(CoreError::InvalidRequest(_))));
    }

    #[test]
    fn test_universe_complement() {
        assert_eq!(
            request(8, 7, 1).universe_complement(),
            vec![16, 17, 18, 19, 20, 21, 22, 23, 24, 25]
        );
    }

    #[test]
    fn test_complement_of_out_of_range_reference() {
        let mut req = request(8, 7, 1);
        req.reference[0] = 40;
        assert_eq!(
            req.universe_complement(),
            vec![1, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25]
        );
        assert!(matches!(generate(&req), Err(CoreError::InvalidRequest(_))));
    }

    #[test]
    fn test_batch_keeps_request_order() {
        let requests: Vec<GenerationRequest> = (5..=12u8).map(|k| request(k, 7, 5)).collect();
        let outcomes = generate_batch(&requests);
        assert_eq!(outcomes.len(), 8);
        for (k, outcome) in (5..=12u8).zip(outcomes) {
            let outcome = outcome.unwrap();
            assert_eq!(outcome.combinations.len(), 5);
            assert_valid(&outcome, k, 7);
        }
    }
}
