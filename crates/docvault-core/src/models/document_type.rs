use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Category of a personal document, either declared by the user at upload
/// time or inferred by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Medical,
    Financial,
    Budget,
    Personal,
    Legal,
    Education,
    Work,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 8] = [
        DocumentType::Medical,
        DocumentType::Financial,
        DocumentType::Budget,
        DocumentType::Personal,
        DocumentType::Legal,
        DocumentType::Education,
        DocumentType::Work,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Medical => "medical",
            DocumentType::Financial => "financial",
            DocumentType::Budget => "budget",
            DocumentType::Personal => "personal",
            DocumentType::Legal => "legal",
            DocumentType::Education => "education",
            DocumentType::Work => "work",
            DocumentType::Other => "other",
        }
    }

    /// Domain-specific fields the classifier is asked to extract for this type.
    pub fn expected_fields(&self) -> &'static [&'static str] {
        match self {
            DocumentType::Medical => &["doctor_name", "crm", "diagnosis"],
            DocumentType::Financial => &["issuer", "amount", "due_date"],
            DocumentType::Budget => &["supplier", "amount", "valid_until"],
            _ => &[],
        }
    }
}

impl FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| AppError::Validation(format!("Unknown document type: {}", s)))
    }
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Medical".parse::<DocumentType>().unwrap(), DocumentType::Medical);
        assert_eq!(" budget ".parse::<DocumentType>().unwrap(), DocumentType::Budget);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "receipt".parse::<DocumentType>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&DocumentType::Financial).unwrap();
        assert_eq!(json, "\"financial\"");
        let parsed: DocumentType = serde_json::from_str("\"education\"").unwrap();
        assert_eq!(parsed, DocumentType::Education);
    }

    #[test]
    fn test_expected_fields_by_type() {
        assert_eq!(
            DocumentType::Medical.expected_fields(),
            &["doctor_name", "crm", "diagnosis"]
        );
        assert_eq!(
            DocumentType::Budget.expected_fields(),
            &["supplier", "amount", "valid_until"]
        );
        assert!(DocumentType::Personal.expected_fields().is_empty());
    }
}
