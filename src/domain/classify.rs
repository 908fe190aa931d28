use super::Transaction;

/// A list of keywords matched as case-insensitive substrings of free text.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k))
    }

    fn matches_opt(&self, text: Option<&str>) -> bool {
        text.is_some_and(|t| self.matches(t))
    }
}

/// Keyword-based classification of treasury transactions.
///
/// These rules are deliberately heuristic substring matches over free text:
/// they preserve how the chapter's books have historically been kept, where
/// opening balances and scholarship donations are identified by wording
/// rather than a dedicated field. Keeping them as data rather than inline
/// checks means the keyword sets can be tested and extended without touching
/// the balance-sheet fold.
#[derive(Debug, Clone)]
pub struct ClassificationPolicy {
    /// Matched against description only. A deposit matching this rule counts
    /// toward the balance but not toward income, so initial capitalization
    /// is not double-counted as revenue.
    pub opening_balance: KeywordRule,
    /// Matched against description or category. A deposit matching this rule
    /// also accrues to the scholarship fund total.
    pub scholarship: KeywordRule,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            opening_balance: KeywordRule::new(["beginning balance", "opening balance"]),
            scholarship: KeywordRule::new(["scholarship", "memorial"]),
        }
    }
}

impl ClassificationPolicy {
    pub fn is_opening_balance(&self, txn: &Transaction) -> bool {
        self.opening_balance.matches_opt(txn.description.as_deref())
    }

    pub fn is_scholarship(&self, txn: &Transaction) -> bool {
        self.scholarship.matches_opt(txn.description.as_deref())
            || self.scholarship.matches_opt(txn.category.as_deref())
    }
}
