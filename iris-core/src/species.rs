//! Species Types
//!
//! The three fixed Iris classes and their label strings.

/// Label strings in class-index order
pub const CLASS_NAMES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Number of classes
pub const CLASS_COUNT: usize = CLASS_NAMES.len();

/// Iris species, indexed 0..3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Setosa,
    Versicolor,
    Virginica,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Setosa, Species::Versicolor, Species::Virginica];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            Species::Setosa => 0,
            Species::Versicolor => 1,
            Species::Virginica => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        CLASS_NAMES[self.index()]
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Species {
    type Err = String;

    /// Accepts `setosa` as well as the UCI spelling `Iris-setosa`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("iris-").unwrap_or(&lower);
        Self::ALL
            .into_iter()
            .find(|species| species.as_str() == name)
            .ok_or_else(|| format!("unknown species: {}", s))
    }
}
