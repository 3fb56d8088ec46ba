//! Fixed code-to-label tables for the coded categorical features.

/// Immutable mapping from integer code to descriptive label for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMap {
    column: &'static str,
    entries: &'static [(i64, &'static str)],
}

/// Chest pain type.
pub const CP: CategoryMap = CategoryMap {
    column: "cp",
    entries: &[
        (1, "typical angina"),
        (2, "atypical angina"),
        (3, "non-anginal pain"),
        (4, "asymptomatic"),
    ],
};

/// Resting electrocardiographic results.
pub const RESTECG: CategoryMap = CategoryMap {
    column: "restecg",
    entries: &[
        (0, "normal"),
        (1, "wave abnormality"),
        (2, "ventricular hypertrophy"),
    ],
};

/// Thallium stress test result.
pub const THAL: CategoryMap = CategoryMap {
    column: "thal",
    entries: &[(3, "normal"), (6, "fixed defect"), (7, "reversable defect")],
};

/// Every table, in schema column order.
pub const ALL: [CategoryMap; 3] = [CP, RESTECG, THAL];

/// Table for a coded column, if it has one.
#[must_use]
pub fn for_column(column: &str) -> Option<CategoryMap> {
    ALL.into_iter().find(|m| m.column == column)
}

impl CategoryMap {
    /// Name of the column this map applies to.
    #[must_use]
    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Label for a code, if the code is known.
    #[must_use]
    pub fn translate(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == code)
            .map(|(_, label)| *label)
    }

    /// Whether `label` is one of this map's output labels.
    #[must_use]
    pub fn is_label(&self, label: &str) -> bool {
        self.entries.iter().any(|(_, l)| *l == label)
    }

    pub fn entries(&self) -> impl Iterator<Item = (i64, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_known_codes() {
        assert_eq!(CP.translate(1), Some("typical angina"));
        assert_eq!(CP.translate(4), Some("asymptomatic"));
        assert_eq!(RESTECG.translate(0), Some("normal"));
        assert_eq!(RESTECG.translate(2), Some("ventricular hypertrophy"));
        assert_eq!(THAL.translate(6), Some("fixed defect"));
        assert_eq!(THAL.translate(7), Some("reversable defect"));
    }

    #[test]
    fn test_translate_unknown_codes() {
        assert_eq!(CP.translate(0), None);
        assert_eq!(RESTECG.translate(3), None);
        assert_eq!(THAL.translate(99), None);
    }

    #[test]
    fn test_labels_are_not_keys() {
        // "normal" appears in two maps but never as a code.
        assert!(RESTECG.is_label("normal"));
        assert!(THAL.is_label("normal"));
        assert!(!CP.is_label("normal"));
        assert_eq!(CP.len() + RESTECG.len() + THAL.len(), 10);
    }

    #[test]
    fn test_for_column() {
        assert_eq!(for_column("thal"), Some(THAL));
        assert_eq!(for_column("age"), None);
    }
}
