use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::analysis::scorer::ScoringWeights;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON taxonomy to load instead of the built-in one.
    pub taxonomy_path: Option<PathBuf>,
    pub extraction_timeout_secs: u64,
    /// PDF parses allowed on the blocking pool at once.
    pub max_concurrent_extractions: usize,
    pub max_upload_bytes: usize,
    pub max_course_recommendations: usize,
    pub scoring_weights: ScoringWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            taxonomy_path: None,
            extraction_timeout_secs: 30,
            max_concurrent_extractions: 4,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_course_recommendations: 5,
            scoring_weights: ScoringWeights::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let default_weights = &defaults.scoring_weights;

        let scoring_weights = ScoringWeights {
            keywords: parse_env("SCORE_WEIGHT_KEYWORDS", default_weights.keywords)?,
            formatting: parse_env("SCORE_WEIGHT_FORMATTING", default_weights.formatting)?,
            ats: parse_env("SCORE_WEIGHT_ATS", default_weights.ats)?,
        };

        let config = Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            taxonomy_path: std::env::var("TAXONOMY_PATH").ok().map(PathBuf::from),
            extraction_timeout_secs: parse_env(
                "EXTRACTION_TIMEOUT_SECS",
                defaults.extraction_timeout_secs,
            )?,
            max_concurrent_extractions: parse_env(
                "MAX_CONCURRENT_EXTRACTIONS",
                defaults.max_concurrent_extractions,
            )?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_course_recommendations: parse_env(
                "MAX_COURSE_RECOMMENDATIONS",
                defaults.max_course_recommendations,
            )?,
            scoring_weights,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but would make every analysis fail or score 0.
    pub fn validate(&self) -> Result<()> {
        let weights = &self.scoring_weights;
        for (key, weight) in [
            ("SCORE_WEIGHT_KEYWORDS", weights.keywords),
            ("SCORE_WEIGHT_FORMATTING", weights.formatting),
            ("SCORE_WEIGHT_ATS", weights.ats),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                bail!("{key} must be a finite number >= 0, got {weight}");
            }
        }
        if weights.total() <= 0.0 {
            bail!("SCORE_WEIGHT_* values must sum to a positive number");
        }
        if self.extraction_timeout_secs == 0 {
            bail!("EXTRACTION_TIMEOUT_SECS must be at least 1");
        }
        if self.max_concurrent_extractions == 0 {
            bail!("MAX_CONCURRENT_EXTRACTIONS must be at least 1");
        }
        if self.max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be at least 1");
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
