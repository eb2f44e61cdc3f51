use core::fmt::Debug;
use std::borrow::Borrow;
use std::fmt::Display;

/// The unique identifier of an ontology term, e.g. `HP:0000118`
///
/// The ID is kept as the original string, because the graph sink
/// uses it as merge key. The numeric part can be extracted
/// with [`TermId::number`].
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TermId {
    inner: String,
}

impl TermId {
    /// Returns the string representation of the ID
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the prefix before the `:` separator
    ///
    /// # Examples
    ///
    /// ```
    /// use phenograph::TermId;
    ///
    /// assert_eq!(TermId::from("HP:0000118").prefix(), Some("HP"));
    /// assert_eq!(TermId::from("0000118").prefix(), None);
    /// ```
    pub fn prefix(&self) -> Option<&str> {
        self.inner.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Returns the numeric suffix of the ID
    ///
    /// Returns `None` if the ID has no `:` separator or the suffix
    /// is not a plain decimal number.
    ///
    /// # Examples
    ///
    /// ```
    /// use phenograph::TermId;
    ///
    /// assert_eq!(TermId::from("HP:0000118").number(), Some(118));
    /// assert_eq!(TermId::from("HP:00001A8").number(), None);
    /// assert_eq!(TermId::from("HP0000118").number(), None);
    /// ```
    pub fn number(&self) -> Option<u32> {
        numeric_suffix(&self.inner)
    }
}

/// Parses the numeric part of `PREFIX:NNNNNNN`
pub(crate) fn numeric_suffix(id: &str) -> Option<u32> {
    let (_, suffix) = id.split_once(':')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u32>().ok()
}

impl From<&str> for TermId {
    fn from(s: &str) -> Self {
        TermId {
            inner: s.to_string(),
        }
    }
}

impl From<String> for TermId {
    fn from(inner: String) -> Self {
        TermId { inner }
    }
}

impl Borrow<str> for TermId {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for TermId {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Debug for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TermId({})", self)
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for TermId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for TermId {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

/// The unique identifier of a disease, e.g. `OMIM:619340` or `ORPHA:79394`
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DiseaseId {
    inner: String,
}

impl DiseaseId {
    /// Returns the string representation of the ID
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for DiseaseId {
    fn from(s: &str) -> Self {
        DiseaseId {
            inner: s.to_string(),
        }
    }
}

impl From<String> for DiseaseId {
    fn from(inner: String) -> Self {
        DiseaseId { inner }
    }
}

impl Borrow<str> for DiseaseId {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl Debug for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DiseaseId({})", self)
    }
}

impl Display for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<&str> for DiseaseId {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn numeric_suffix_with_leading_zeros() {
        assert_eq!(numeric_suffix("HP:0000001"), Some(1));
        assert_eq!(numeric_suffix("HP:0033127"), Some(33127));
    }

    #[test]
    fn numeric_suffix_rejects_malformed() {
        assert_eq!(numeric_suffix("HP:"), None);
        assert_eq!(numeric_suffix("HP:-000001"), None);
        assert_eq!(numeric_suffix("HP: 0000001"), None);
        assert_eq!(numeric_suffix("HP:99999999999"), None);
        assert_eq!(numeric_suffix(""), None);
    }

    #[test]
    fn compare_to_str() {
        let id = TermId::from("HP:0000118");
        assert_eq!(id, "HP:0000118");
        assert_eq!(format!("{id:?}"), "TermId(HP:0000118)");
    }
}
