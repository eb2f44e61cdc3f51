//! Assigns a semantic category to a term based on its ID
//!
//! The category is derived from the numeric suffix of the [`TermId`](crate::TermId).
//! Each [`CategoryRule`] covers an inclusive range of numbers. Rules are checked
//! in the order they were added and the first matching rule wins, so
//! overlapping ranges are resolved by declaration order.

use crate::term::termid::numeric_suffix;
use crate::FALLBACK_CATEGORY;

/// A single inclusive range of term numbers that maps to a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    start: u32,
    end: u32,
    category: String,
}

impl CategoryRule {
    /// Constructs a new rule for the inclusive range `start..=end`
    pub fn new(start: u32, end: u32, category: &str) -> Self {
        Self {
            start,
            end,
            category: category.to_string(),
        }
    }

    /// Returns `true` if the term number falls within the rule's range
    pub fn contains(&self, number: u32) -> bool {
        self.start <= number && number <= self.end
    }

    /// The category label of the rule
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// An ordered list of [`CategoryRule`]s plus a fallback label
///
/// # Examples
///
/// ```
/// use phenograph::CategoryRules;
///
/// let rules = CategoryRules::default();
/// assert_eq!(rules.classify("HP:0000005"), "Inheritance");
/// assert_eq!(rules.classify("HP:0032500"), "Multisystem Disorder");
/// assert_eq!(rules.classify("HP:0000001"), "Other");
/// assert_eq!(rules.classify("not an id"), "Other");
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl CategoryRules {
    /// Constructs an empty rule set with the given fallback label
    pub fn new(fallback: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: fallback.to_string(),
        }
    }

    /// Appends a rule with lower precedence than all existing rules
    #[must_use]
    pub fn with_rule(mut self, start: u32, end: u32, category: &str) -> Self {
        self.rules.push(CategoryRule::new(start, end, category));
        self
    }

    /// The label used for IDs that no rule matches
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Returns the number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the category of the term ID
    ///
    /// IDs without a `:` separator or with a non-numeric suffix get
    /// the fallback label.
    pub fn classify(&self, id: &str) -> &str {
        let Some(number) = numeric_suffix(id) else {
            return &self.fallback;
        };
        self.rules
            .iter()
            .find(|rule| rule.contains(number))
            .map_or(&self.fallback, |rule| &rule.category)
    }
}

impl Default for CategoryRules {
    /// The category ranges of the HPO sub-ontologies
    ///
    /// Several ranges overlap (e.g. `Inheritance` covers most of the
    /// organ abnormalities), the order of the rules is significant.
    fn default() -> Self {
        CategoryRules::new(FALLBACK_CATEGORY)
            .with_rule(5, 1999, "Inheritance")
            .with_rule(118, 1416, "Morphology")
            .with_rule(707, 1626, "Nervous System")
            .with_rule(1574, 1780, "Integument")
            .with_rule(478, 612, "Eye")
            .with_rule(598, 706, "Ear")
            .with_rule(818, 933, "Skeletal system")
            .with_rule(1197, 1574, "Connective Tissue")
            .with_rule(1507, 1573, "Growth")
            .with_rule(1574, 1780, "Constitutional Symptom")
            .with_rule(1781, 2060, "Limbs")
            .with_rule(2061, 3128, "Musculature")
            .with_rule(152, 589, "Head/Neck")
            .with_rule(1608, 1621, "Voice")
            .with_rule(1626, 1869, "Cardiovascular")
            .with_rule(1871, 2087, "Blood")
            .with_rule(2086, 2250, "Respiratory")
            .with_rule(2242, 3011, "Abdomen")
            .with_rule(118, 118, "Genitourinary system")
            .with_rule(1939, 1939, "Metabolism/Homeostasis")
            .with_rule(1871, 2597, "Endocrine")
            .with_rule(2715, 4431, "Immunology")
            .with_rule(4325, 4332, "Oncology")
            .with_rule(32223, 33127, "Multisystem Disorder")
    }
}
