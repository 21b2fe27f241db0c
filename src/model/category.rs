use serde::{Deserialize, Serialize};

/// The categories offered even when the backend knows of none.
pub const DEFAULT_CATEGORIES: &[&str] = &["Food", "Transport", "Entertainment", "Bills", "Health"];

/// One row of the backend's category list.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The category names offered to the user: the built-in defaults first, then whatever the backend
/// adds, without exact duplicates.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Categories {
    names: Vec<String>,
}

impl Default for Categories {
    fn default() -> Self {
        Self {
            names: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Categories {
    /// Enriches the default set with `fetched`. Fetched names never replace defaults.
    pub fn merged(fetched: impl IntoIterator<Item = Category>) -> Self {
        let mut categories = Self::default();
        for category in fetched {
            if !categories.names.iter().any(|n| n == category.name()) {
                categories.names.push(category.name);
            }
        }
        categories
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
