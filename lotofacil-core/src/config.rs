use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::generator::{GenerationRequest, DEFAULT_MAX_ATTEMPTS};
use crate::models::Draw;

pub const OVERLAP_K_RANGE: RangeInclusive<u8> = 5..=12;
pub const TARGET_EVEN_RANGE: RangeInclusive<u8> = 0..=15;
pub const QUANTITY_RANGE: RangeInclusive<usize> = 1..=5000;

/// Paramètres de génération, chargeables depuis un fichier JSON. Les champs
/// absents prennent leur valeur par défaut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub quantity: usize,
    pub overlap_k: u8,
    pub target_even_count: u8,
    pub max_attempts: u64,
    /// 0 ou absent : aléatoire.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            quantity: 100,
            overlap_k: 8,
            target_even_count: 7,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !OVERLAP_K_RANGE.contains(&self.overlap_k) {
            return Err(CoreError::Config(format!(
                "overlap_k = {} hors de {:?}",
                self.overlap_k, OVERLAP_K_RANGE
            )));
        }
        if !TARGET_EVEN_RANGE.contains(&self.target_even_count) {
            return Err(CoreError::Config(format!(
                "target_even_count = {} hors de {:?}",
                self.target_even_count, TARGET_EVEN_RANGE
            )));
        }
        if !QUANTITY_RANGE.contains(&self.quantity) {
            return Err(CoreError::Config(format!(
                "quantity = {} hors de {:?}",
                self.quantity, QUANTITY_RANGE
            )));
        }
        if self.max_attempts == 0 {
            return Err(CoreError::Config("max_attempts doit être positif".to_string()));
        }
        Ok(())
    }

    pub fn effective_seed(&self) -> Option<u64> {
        self.seed.filter(|&s| s != 0)
    }

    pub fn request(&self, reference: &Draw) -> GenerationRequest {
        GenerationRequest::new(reference, self.overlap_k, self.target_even_count, self.quantity)
            .with_max_attempts(self.max_attempts)
            .with_seed(self.effective_seed())
    }
}
