//! Diagram references for questions
//!
//! Questions can carry a reference to a figure stored in the platform's
//! media library (circuit diagrams, geometry figures, data tables rendered
//! as images). The engine treats the reference as opaque; resolving it to
//! pixels is the rendering layer's job.

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Reference to a diagram in the platform's media library
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Validate)]
pub struct Diagram {
    /// Identifier of the stored figure
    #[garde(length(min = 1, max = crate::constants::diagram::MAX_ID_LENGTH))]
    pub id: String,
    /// Alternative text for accessibility and display fallbacks
    #[garde(length(max = crate::constants::diagram::MAX_ALT_LENGTH))]
    pub alt: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_validation() {
        let diagram = Diagram {
            id: "fig-heat-engine-02".to_string(),
            alt: "Schematic of a heat engine".to_string(),
        };
        assert!(diagram.validate().is_ok());
    }

    #[test]
    fn test_diagram_empty_id_rejected() {
        let diagram = Diagram {
            id: String::new(),
            alt: String::new(),
        };
        assert!(diagram.validate().is_err());
    }

    #[test]
    fn test_diagram_alt_too_long() {
        let diagram = Diagram {
            id: "fig".to_string(),
            alt: "a".repeat(crate::constants::diagram::MAX_ALT_LENGTH + 1),
        };
        assert!(diagram.validate().is_err());
    }
}
