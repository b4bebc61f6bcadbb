use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::word_data::BUILTIN_CATEGORIES;

pub const DEFAULT_CATEGORY: &str = "Alimentos";

#[derive(Debug, thiserror::Error)]
pub enum WordPoolError {
    #[error("failed to read word file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse word file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("word file contains no words")]
    Empty,
}

/// A secret word together with the category it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretWord {
    pub word: String,
    pub category: String,
}

/// Category → candidate words. Pure lookup, shared read-only by every room.
#[derive(Debug, Clone)]
pub struct WordPool {
    categories: BTreeMap<String, Vec<String>>,
    default_category: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub word_count: usize,
}

impl Default for WordPool {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WordPool {
    pub fn builtin() -> Self {
        let categories = BUILTIN_CATEGORIES
            .iter()
            .map(|(name, words)| {
                (
                    name.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect();
        Self {
            categories,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn from_categories(categories: BTreeMap<String, Vec<String>>) -> Self {
        let default_category = if categories.contains_key(DEFAULT_CATEGORY) {
            DEFAULT_CATEGORY.to_string()
        } else {
            categories.keys().next().cloned().unwrap_or_default()
        };
        Self {
            categories,
            default_category,
        }
    }

    /// Loads a JSON object of the form `{"category": ["word", ...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, WordPoolError> {
        let raw = std::fs::read_to_string(path)?;
        let categories: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)?;
        if categories.values().all(|words| words.is_empty()) {
            return Err(WordPoolError::Empty);
        }
        Ok(Self::from_categories(categories))
    }

    pub fn with_default_category(mut self, category: &str) -> Self {
        if self.categories.contains_key(category) {
            self.default_category = category.to_string();
        }
        self
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn words(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(|words| words.as_slice())
    }

    pub fn summaries(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|(name, words)| CategorySummary {
                name: name.clone(),
                word_count: words.len(),
            })
            .collect()
    }

    /// Union of the selected categories' words, falling back to the default
    /// category when the selection is empty or yields nothing.
    pub fn candidates(&self, selection: &[String]) -> Vec<SecretWord> {
        let pool = self.collect(selection.iter().map(String::as_str));
        if pool.is_empty() {
            self.collect(std::iter::once(self.default_category.as_str()))
        } else {
            pool
        }
    }

    pub fn draw<R: Rng + ?Sized>(&self, selection: &[String], rng: &mut R) -> Option<SecretWord> {
        self.candidates(selection).choose(rng).cloned()
    }

    /// Picks a word other than `secret`, preferring its own category and then
    /// anything else in the pool.
    pub fn draw_decoy<R: Rng + ?Sized>(&self, secret: &SecretWord, rng: &mut R) -> Option<SecretWord> {
        let same_category: Vec<SecretWord> = self
            .collect(std::iter::once(secret.category.as_str()))
            .into_iter()
            .filter(|candidate| candidate.word != secret.word)
            .collect();
        if let Some(decoy) = same_category.choose(rng) {
            return Some(decoy.clone());
        }
        let anywhere: Vec<SecretWord> = self
            .collect(self.categories.keys().map(String::as_str))
            .into_iter()
            .filter(|candidate| candidate.word != secret.word)
            .collect();
        anywhere.choose(rng).cloned()
    }

    fn collect<'a>(&self, categories: impl Iterator<Item = &'a str>) -> Vec<SecretWord> {
        let mut pool = Vec::new();
        for category in categories {
            if let Some(words) = self.categories.get(category) {
                pool.extend(words.iter().map(|word| SecretWord {
                    word: word.clone(),
                    category: category.to_string(),
                }));
            }
        }
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> WordPool {
        let mut categories = BTreeMap::new();
        categories.insert("Animales".to_string(), vec!["puma".to_string()]);
        categories.insert(
            "Colores".to_string(),
            vec!["rojo".to_string(), "azul".to_string()],
        );
        WordPool::from_categories(categories)
    }

    #[test]
    fn builtin_pool_has_the_default_category() {
        let pool = WordPool::builtin();
        assert_eq!(pool.default_category(), DEFAULT_CATEGORY);
        assert!(pool.words(DEFAULT_CATEGORY).map_or(false, |w| !w.is_empty()));
    }

    #[test]
    fn unknown_selection_falls_back_to_default() {
        let pool = pool();
        let candidates = pool.candidates(&["Planetas".to_string()]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].category, "Animales");
        assert_eq!(pool.candidates(&[]).len(), 1);
    }

    #[test]
    fn selection_is_a_union() {
        let pool = pool();
        let selection = vec!["Animales".to_string(), "Colores".to_string()];
        assert_eq!(pool.candidates(&selection).len(), 3);
    }

    #[test]
    fn decoy_differs_from_secret() {
        let pool = pool();
        let mut rng = StdRng::seed_from_u64(7);
        let secret = SecretWord {
            word: "rojo".to_string(),
            category: "Colores".to_string(),
        };
        for _ in 0..20 {
            let decoy = pool.draw_decoy(&secret, &mut rng).unwrap();
            assert_eq!(decoy.word, "azul");
        }

        // single-word category borrows from elsewhere
        let lonely = SecretWord {
            word: "puma".to_string(),
            category: "Animales".to_string(),
        };
        let decoy = pool.draw_decoy(&lonely, &mut rng).unwrap();
        assert_eq!(decoy.category, "Colores");
    }
}
