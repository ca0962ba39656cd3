use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::config::MappingConfig;
use crate::error::{NormalizeError, NormalizeResult};
use crate::models::CanonicalSchema;
use crate::processor::similarity::SimilarityScorer;

/// How a key path reached its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Fuzzy { score: u8 },
}

/// A key path resolved to a canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Index of the column in the canonical schema.
    pub position: usize,
    pub kind: MatchKind,
}

/// One step of the resolution chain.
pub trait ResolveStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(&self, key: &str) -> Option<Resolution>;
}

/// Verbatim lookup in the curated key-path table.
#[derive(Debug, Clone)]
pub struct ExactMatch {
    table: HashMap<String, usize>,
}

impl ExactMatch {
    pub fn new(
        mappings: &HashMap<String, String>,
        schema: &CanonicalSchema,
    ) -> NormalizeResult<Self> {
        let mut table = HashMap::with_capacity(mappings.len());
        for (key, column) in mappings {
            let position = schema.position(column).ok_or_else(|| {
                NormalizeError::InvalidConfig(format!(
                    "exact mapping '{}' targets '{}', which is not in the schema",
                    key, column
                ))
            })?;
            table.insert(key.clone(), position);
        }
        Ok(Self { table })
    }
}

impl ResolveStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn resolve(&self, key: &str) -> Option<Resolution> {
        self.table.get(key).map(|&position| Resolution {
            position,
            kind: MatchKind::Exact,
        })
    }
}

/// Best-scoring canonical column, if it clears the threshold.
///
/// On a tie the column listed first in the schema wins.
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    scorer: SimilarityScorer,
    choices: Vec<String>,
    threshold: u8,
}

impl FuzzyMatch {
    pub fn new(schema: &CanonicalSchema, threshold: u8) -> NormalizeResult<Self> {
        let scorer = SimilarityScorer::new()
            .map_err(|e| NormalizeError::InvalidConfig(format!("similarity pattern: {}", e)))?;
        let choices = schema
            .columns()
            .iter()
            .map(|column| scorer.preprocess(column))
            .collect();

        Ok(Self {
            scorer,
            choices,
            threshold,
        })
    }

    /// Highest-scoring column for `key` regardless of the threshold.
    pub fn best_match(&self, key: &str) -> Option<(usize, u8)> {
        let query = self.scorer.preprocess(key);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(usize, u8)> = None;
        for (position, choice) in self.choices.iter().enumerate() {
            let score = super::similarity::wratio(&query, choice);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((position, score));
            }
        }
        best
    }
}

impl ResolveStrategy for FuzzyMatch {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn resolve(&self, key: &str) -> Option<Resolution> {
        let (position, score) = self.best_match(key)?;
        (score >= self.threshold).then_some(Resolution {
            position,
            kind: MatchKind::Fuzzy { score },
        })
    }
}

/// Maps flattened key paths to canonical columns.
///
/// Strategies are tried in order and the first hit wins, so an exact table
/// entry always beats a fuzzy candidate. Keys nothing matches are
/// unresolved; callers drop them.
#[derive(Debug)]
pub struct KeyResolver {
    schema: Arc<CanonicalSchema>,
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl KeyResolver {
    pub fn new(schema: Arc<CanonicalSchema>, strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { schema, strategies }
    }

    /// Exact table first, then fuzzy matching against the schema.
    pub fn from_config(config: &MappingConfig) -> NormalizeResult<Self> {
        config.validate()?;
        let schema = Arc::new(config.canonical_schema()?);

        let exact = ExactMatch::new(&config.exact_mappings, &schema)?;
        let fuzzy = FuzzyMatch::new(&schema, config.fuzzy_threshold)?;

        Ok(Self::new(schema, vec![Box::new(exact), Box::new(fuzzy)]))
    }

    pub fn schema(&self) -> &Arc<CanonicalSchema> {
        &self.schema
    }

    pub fn resolve(&self, key: &str) -> Option<Resolution> {
        let resolution = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.resolve(key));

        if resolution.is_none() {
            trace!("Unresolved key path dropped: {}", key);
        }
        resolution
    }

    /// Name of the column `key` resolves to, if any.
    pub fn resolve_column(&self, key: &str) -> Option<&str> {
        self.resolve(key)
            .map(|r| self.schema.columns()[r.position].as_str())
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}
