use docvault_core::models::{ClassificationResult, DocumentType, MismatchVerdict};

/// Default confidence the classifier must strictly exceed before its
/// disagreement with the user is surfaced.
pub const MISMATCH_CONFIDENCE_THRESHOLD: u8 = 70;

/// [`reconcile_with_threshold`] at [`MISMATCH_CONFIDENCE_THRESHOLD`].
pub fn reconcile(declared: DocumentType, result: &ClassificationResult) -> Option<MismatchVerdict> {
    reconcile_with_threshold(declared, result, MISMATCH_CONFIDENCE_THRESHOLD)
}

/// Compare the declared type with the classifier's answer.
///
/// A verdict is produced iff the result is available, its confidence is
/// above `threshold` and the inferred type differs from the declared one.
pub fn reconcile_with_threshold(
    declared: DocumentType,
    result: &ClassificationResult,
    threshold: u8,
) -> Option<MismatchVerdict> {
    if !result.is_available()
        || result.confidence <= threshold
        || result.inferred_type == declared
    {
        return None;
    }

    Some(MismatchVerdict {
        declared_type: declared,
        inferred_type: result.inferred_type,
        confidence: result.confidence,
        reasoning: result.reasoning.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::models::ClassificationStatus;

    fn available(inferred: DocumentType, confidence: u8) -> ClassificationResult {
        let mut result = ClassificationResult::unavailable(inferred);
        result.status = ClassificationStatus::Available;
        result.confidence = confidence;
        result.reasoning = "Invoice with amount due".to_string();
        result
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(reconcile(DocumentType::Personal, &available(DocumentType::Financial, 70)).is_none());

        let verdict =
            reconcile(DocumentType::Personal, &available(DocumentType::Financial, 71)).unwrap();
        assert_eq!(verdict.declared_type, DocumentType::Personal);
        assert_eq!(verdict.inferred_type, DocumentType::Financial);
        assert_eq!(verdict.confidence, 71);
        assert_eq!(verdict.reasoning, "Invoice with amount due");
    }

    #[test]
    fn test_custom_threshold() {
        let result = available(DocumentType::Financial, 80);
        assert!(reconcile_with_threshold(DocumentType::Work, &result, 80).is_none());
        assert!(reconcile_with_threshold(DocumentType::Work, &result, 79).is_some());

        let barely = available(DocumentType::Financial, 1);
        assert!(reconcile_with_threshold(DocumentType::Work, &barely, 0).is_some());
    }

    #[test]
    fn test_agreement_is_never_a_mismatch() {
        assert!(reconcile(DocumentType::Medical, &available(DocumentType::Medical, 100)).is_none());
    }

    #[test]
    fn test_unavailable_is_never_a_mismatch() {
        let mut result = ClassificationResult::unavailable(DocumentType::Financial);
        result.confidence = 99;
        assert!(reconcile(DocumentType::Personal, &result).is_none());
    }
}
