/// Number of classes in the model's output vector.
pub const CLASS_COUNT: usize = 7;

/// Stable identifier for every class the classifier can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKey {
    BaybayTall,
    CatiganDwarf,
    LagunaTall,
    TacunanDwarf,
    NotCoconut,
    UnknownDwarf,
    UnknownTall,
}

/// Output-vector order of the trained model. Position i of the probability
/// vector scores CLASS_INDEX[i].
pub const CLASS_INDEX: [ClassKey; CLASS_COUNT] = [
    ClassKey::BaybayTall,
    ClassKey::CatiganDwarf,
    ClassKey::LagunaTall,
    ClassKey::TacunanDwarf,
    ClassKey::NotCoconut,
    ClassKey::UnknownDwarf,
    ClassKey::UnknownTall,
];

impl ClassKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKey::BaybayTall => "Baybay Tall Coconut",
            ClassKey::CatiganDwarf => "Catigan Dwarf Coconut",
            ClassKey::LagunaTall => "Laguna Tall Coconut",
            ClassKey::TacunanDwarf => "Tacunan Dwarf Coconut",
            ClassKey::NotCoconut => "NotCoconut",
            ClassKey::UnknownDwarf => "Unknown Dwarf",
            ClassKey::UnknownTall => "Unknown Tall",
        }
    }

    /// A specific, identifiable cultivar. Only these may produce a valid verdict.
    pub fn is_named_cultivar(&self) -> bool {
        matches!(
            self,
            ClassKey::BaybayTall
                | ClassKey::CatiganDwarf
                | ClassKey::LagunaTall
                | ClassKey::TacunanDwarf
        )
    }

    /// Recognized morphology (tall/dwarf habit) but unidentified cultivar.
    pub fn is_ambiguous_group(&self) -> bool {
        matches!(self, ClassKey::UnknownDwarf | ClassKey::UnknownTall)
    }

    /// Sentinel for "not a classifiable coconut seedling image".
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClassKey::NotCoconut)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CultivarInfo {
    pub display_name: &'static str,
    pub lifespan: &'static str,
    pub definition: &'static str,
}

/// Single source of truth for per-class display metadata.
const CATALOG: &[(ClassKey, CultivarInfo)] = &[
    (
        ClassKey::BaybayTall,
        CultivarInfo {
            display_name: "Baybay Tall Coconut",
            lifespan: "60-90 years",
            definition: "A tall coconut variety commonly grown for its strong trunk and high yield.",
        },
    ),
    (
        ClassKey::CatiganDwarf,
        CultivarInfo {
            display_name: "Catigan Dwarf Coconut",
            lifespan: "60-90 years",
            definition: "A dwarf coconut variety known for early fruiting and consistent nut production.",
        },
    ),
    (
        ClassKey::LagunaTall,
        CultivarInfo {
            display_name: "Laguna Tall Coconut",
            lifespan: "60-90 years",
            definition: "A tall coconut variety recognized for its durability and adaptability.",
        },
    ),
    (
        ClassKey::TacunanDwarf,
        CultivarInfo {
            display_name: "Tacunan Dwarf Coconut",
            lifespan: "60-90 years",
            definition: "A compact dwarf coconut variety valued for its high-quality nuts.",
        },
    ),
    (
        ClassKey::UnknownTall,
        CultivarInfo {
            display_name: "Unknown Tall Coconut",
            lifespan: "Unknown",
            definition: "Possibly from a tall coconut group.",
        },
    ),
    (
        ClassKey::UnknownDwarf,
        CultivarInfo {
            display_name: "Unknown Dwarf Coconut",
            lifespan: "Unknown",
            definition: "Possibly from a dwarf coconut group.",
        },
    ),
    (
        ClassKey::NotCoconut,
        CultivarInfo {
            display_name: "Invalid Image",
            lifespan: "None",
            definition: "None",
        },
    ),
];

/// Fallback when a class key has no catalog record. Should be unreachable
/// once `validate_catalog` has passed, but a missing record must degrade to a
/// placeholder rather than fail the request.
const UNKNOWN_INFO: CultivarInfo = CultivarInfo {
    display_name: "Unknown",
    lifespan: "Unknown",
    definition: "No info available",
};

pub fn info(key: ClassKey) -> &'static CultivarInfo {
    CATALOG
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, info)| info)
        .unwrap_or(&UNKNOWN_INFO)
}

/// Startup check: every index the model can produce must resolve to a
/// catalog record.
pub fn validate_catalog() -> Result<(), String> {
    for key in CLASS_INDEX {
        if !CATALOG.iter().any(|(k, _)| *k == key) {
            return Err(format!("class '{}' has no catalog record", key.as_str()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_model_class() {
        assert!(validate_catalog().is_ok());
        assert_eq!(CLASS_INDEX.len(), CLASS_COUNT);
        for key in CLASS_INDEX {
            let info = info(key);
            assert!(!info.display_name.is_empty());
        }
    }

    #[test]
    fn tiers_are_disjoint_and_exhaustive() {
        for key in CLASS_INDEX {
            let tiers = [
                key.is_named_cultivar(),
                key.is_ambiguous_group(),
                key.is_rejection(),
            ];
            assert_eq!(tiers.iter().filter(|&&t| t).count(), 1, "{:?}", key);
        }
        assert_eq!(CLASS_INDEX.iter().filter(|k| k.is_named_cultivar()).count(), 4);
        assert_eq!(CLASS_INDEX.iter().filter(|k| k.is_ambiguous_group()).count(), 2);
        assert_eq!(CLASS_INDEX.iter().filter(|k| k.is_rejection()).count(), 1);
    }

    #[test]
    fn rejection_sentinel_displays_as_invalid_image() {
        assert_eq!(info(ClassKey::NotCoconut).display_name, "Invalid Image");
    }
}
