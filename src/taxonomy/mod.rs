//! Category taxonomy
//!
//! The taxonomy is a YAML mapping from category name to an optional spec
//! with subcategories. Labels offered to the classifier are the category
//! names plus `Category::Subcategory` entries.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{ExplicaError, Result};

/// Per-category specification in the taxonomy file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional subcategory names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<String>,
}

/// A loaded taxonomy: ordered mapping of category name to its spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Taxonomy(pub BTreeMap<String, CategorySpec>);

impl Taxonomy {
    /// Flatten the taxonomy into candidate labels.
    ///
    /// Categories are ordered by name, each followed by its
    /// `Category::Subcategory` entries.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        for (category, spec) in &self.0 {
            labels.push(category.clone());
            for sub in &spec.subcategories {
                labels.push(format!("{}::{}", category, sub));
            }
        }
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Loads taxonomies from YAML files
#[derive(Debug, Clone)]
pub struct TaxonomyLoader {
    path: String,
}

impl TaxonomyLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Load and parse the taxonomy file.
    ///
    /// The YAML root must be a mapping. A missing file is an error, not a
    /// silently empty taxonomy.
    pub fn load(&self) -> Result<Taxonomy> {
        if !Path::new(&self.path).exists() {
            error!(path = %self.path, "Taxonomy file not found");
            return Err(ExplicaError::Taxonomy(format!(
                "taxonomy file not found: {}",
                self.path
            )));
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let taxonomy: Taxonomy = serde_yaml::from_str(&raw)
            .map_err(|e| ExplicaError::Taxonomy(format!("invalid taxonomy YAML: {}", e)))?;
        Ok(taxonomy)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Taxonomy {
        let yaml = r#"
"Food & Drink":
  subcategories: ["Coffee Shops", "Restaurants"]
"Transportation":
  subcategories: ["Fuel"]
"Shopping": {}
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_labels_include_subcategories() {
        let labels = sample().labels();
        assert!(labels.contains(&"Food & Drink".to_string()));
        assert!(labels.contains(&"Food & Drink::Coffee Shops".to_string()));
        assert!(labels.contains(&"Transportation::Fuel".to_string()));
        assert!(labels.contains(&"Shopping".to_string()));
    }

    #[test]
    fn test_category_without_subcategories() {
        let taxonomy = sample();
        let spec = taxonomy.0.get("Shopping").unwrap();
        assert!(spec.subcategories.is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let loader = TaxonomyLoader::new("/nonexistent/taxonomy.yaml");
        assert!(matches!(
            loader.load(),
            Err(ExplicaError::Taxonomy(_))
        ));
    }
}
