use crate::models::catalog::{self, ClassKey, CLASS_INDEX};
use crate::models::verdict::Verdict;

/// Confidence reported for an ambiguous-group verdict. A fixed mid-range
/// constant rather than the raw model score: the group is plausible but the
/// cultivar is unconfirmed, so the raw probability must not leak through.
pub const AMBIGUOUS_CONFIDENCE: f64 = 0.55;

/// Map a probability vector onto a verdict.
///
/// Argmax picks the winning class (lowest index wins exact ties). Ambiguous
/// groups collapse to a fixed confidence and are invalid; the rejection
/// sentinel and anything under the acceptance threshold collapse to a
/// rejection with confidence pinned to 0.0; everything else is accepted with
/// the raw score rounded to 4 decimals.
pub fn decide(probs: &[f32], acceptance_threshold: f32) -> Verdict {
    let Some(idx) = argmax(probs) else {
        return build_verdict(ClassKey::NotCoconut, 0.0, false);
    };

    let raw_confidence = probs[idx];
    let class_key = CLASS_INDEX[idx];

    if class_key.is_ambiguous_group() {
        return build_verdict(class_key, AMBIGUOUS_CONFIDENCE, false);
    }

    if class_key.is_rejection() || raw_confidence < acceptance_threshold {
        return build_verdict(ClassKey::NotCoconut, 0.0, false);
    }

    build_verdict(class_key, round4(raw_confidence), true)
}

/// Index of the maximum value; the first occurrence wins on exact ties.
/// None only for an empty slice, which the model adapter already rules out.
fn argmax(probs: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in probs.iter().enumerate() {
        match best {
            Some((_, max)) if p <= max => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}

fn round4(value: f32) -> f64 {
    (value as f64 * 10_000.0).round() / 10_000.0
}

fn build_verdict(class_key: ClassKey, confidence: f64, is_valid: bool) -> Verdict {
    let info = catalog::info(class_key);
    Verdict {
        class_key,
        class_name: info.display_name.to_string(),
        lifespan: info.lifespan.to_string(),
        definition: info.definition.to_string(),
        confidence,
        is_valid,
        location: None,
        image_source: None,
    }
}
