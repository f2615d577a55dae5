// =============================================================================
// Keyword Classification Module
// =============================================================================
//
// Flags which software ecosystems a paper mentions:
// - python ecosystem: python, numpy, scipy, astropy, sklearn
// - julia
//
// Classification is a case-insensitive substring search, not tokenization, so
// "numpydoc" counts as numpy. Cheap and deterministic.

use serde::{Deserialize, Serialize};

/// Keyword vocabulary, in the order results are serialized
pub const KEYWORDS: [&str; 6] = ["python", "numpy", "scipy", "astropy", "sklearn", "julia"];

/// Presence of each vocabulary keyword in one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub python: bool,
    pub numpy: bool,
    pub scipy: bool,
    pub astropy: bool,
    pub sklearn: bool,
    pub julia: bool,
}

impl Classification {
    /// Look up a keyword by label
    pub fn get(&self, label: &str) -> Option<bool> {
        match label {
            "python" => Some(self.python),
            "numpy" => Some(self.numpy),
            "scipy" => Some(self.scipy),
            "astropy" => Some(self.astropy),
            "sklearn" => Some(self.sklearn),
            "julia" => Some(self.julia),
            _ => None,
        }
    }

    pub fn is_python_ecosystem(&self) -> bool {
        self.python || self.numpy || self.scipy || self.astropy || self.sklearn
    }

    pub fn is_julia(&self) -> bool {
        self.julia
    }
}

/// Classify document text by keyword presence
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();
    let has = |keyword: &str| lower.contains(keyword);

    Classification {
        python: has("python"),
        numpy: has("numpy"),
        scipy: has("scipy"),
        astropy: has("astropy"),
        sklearn: has("sklearn"),
        julia: has("julia"),
    }
}
