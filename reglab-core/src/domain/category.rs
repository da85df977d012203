//! Vehicle categories.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Vehicle category of a registration.
///
/// The five listed categories carry calibrated generator constants. Any other
/// label is kept verbatim as `Unlisted` and falls back to default constants.
/// Equality, hashing and ordering all follow the label text, so an
/// `Unlisted` value carrying a listed label is the same category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    TwoWheeler,
    ThreeWheeler,
    FourWheeler,
    Commercial,
    Others,
    Unlisted(String),
}

impl Category {
    /// Categories used when a request names none.
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::TwoWheeler,
            Category::ThreeWheeler,
            Category::FourWheeler,
        ]
    }

    /// Every category with calibrated constants.
    pub fn listed() -> Vec<Category> {
        vec![
            Category::TwoWheeler,
            Category::ThreeWheeler,
            Category::FourWheeler,
            Category::Commercial,
            Category::Others,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::TwoWheeler => "2W",
            Category::ThreeWheeler => "3W",
            Category::FourWheeler => "4W",
            Category::Commercial => "Commercial",
            Category::Others => "Others",
            Category::Unlisted(label) => label,
        }
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        match label.trim() {
            "2W" => Category::TwoWheeler,
            "3W" => Category::ThreeWheeler,
            "4W" => Category::FourWheeler,
            "Commercial" => Category::Commercial,
            "Others" => Category::Others,
            other => Category::Unlisted(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::from(label.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for category in Category::listed() {
            assert_eq!(Category::from(category.as_str()), category);
        }
    }

    #[test]
    fn unknown_label_is_kept() {
        let c = Category::from("E-Rickshaw");
        assert_eq!(c, Category::Unlisted("E-Rickshaw".into()));
        assert_eq!(c.as_str(), "E-Rickshaw");
        assert!(matches!(c, Category::Unlisted(_)));
    }

    #[test]
    fn equality_agrees_with_ordering() {
        use std::collections::{BTreeSet, HashSet};

        let spelled_out = Category::Unlisted("2W".into());
        assert_eq!(spelled_out, Category::TwoWheeler);
        assert_eq!(spelled_out.cmp(&Category::TwoWheeler), Ordering::Equal);

        let hashed: HashSet<Category> = [spelled_out.clone(), Category::TwoWheeler].into();
        let sorted: BTreeSet<Category> = [spelled_out, Category::TwoWheeler].into();
        assert_eq!(hashed.len(), 1);
        assert_eq!(sorted.len(), 1);
        assert_ne!(Category::Unlisted("Tractor".into()), Category::Others);
    }

    #[test]
    fn ordering_is_lexical() {
        let mut cats = vec![
            Category::Others,
            Category::FourWheeler,
            Category::Commercial,
            Category::TwoWheeler,
            Category::ThreeWheeler,
        ];
        cats.sort();
        let labels: Vec<&str> = cats.iter().map(|c| c.as_str()).collect();
        assert_eq!(labels, vec!["2W", "3W", "4W", "Commercial", "Others"]);
    }

    #[test]
    fn serde_uses_label() {
        let json = serde_json::to_string(&Category::FourWheeler).unwrap();
        assert_eq!(json, "\"4W\"");
        let back: Category = serde_json::from_str("\"Commercial\"").unwrap();
        assert_eq!(back, Category::Commercial);
    }
}
