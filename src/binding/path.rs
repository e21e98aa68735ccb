use std::fmt::Display;

/// Separator used in declared binding paths, e.g. `"Sales|Region|Total"`.
pub const PATH_SEPARATOR: char = '|';

/// Ordered header labels a record field uses to locate its column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BindingPath(Vec<String>);

/// How a binding path is compared with a leaf path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The whole root-to-leaf label chain must be equal.
    #[default]
    Exact,
    /// The binding path must equal the tail of the leaf path.
    Relative,
}

impl BindingPath {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        Self(labels.iter().map(|label| label.as_ref().to_owned()).collect())
    }

    /// Parses a pipe-delimited path. An empty string yields one empty label.
    pub fn parse(path: &str) -> Self {
        Self(path.split(PATH_SEPARATOR).map(str::to_owned).collect())
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks this binding path against a leaf's full path.
    pub fn matches(&self, leaf_path: &[String], mode: MatchMode) -> bool {
        match mode {
            MatchMode::Exact => self.0.as_slice() == leaf_path,
            MatchMode::Relative => leaf_path.ends_with(&self.0),
        }
    }
}

impl From<&str> for BindingPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<Vec<String>> for BindingPath {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

impl Display for BindingPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    #[test]
    fn exact_match() {
        let leaf_path = leaf(&["Sales", "Region", "Total"]);
        assert!(BindingPath::parse("Sales|Region|Total").matches(&leaf_path, MatchMode::Exact));
        assert!(!BindingPath::parse("Region|Total").matches(&leaf_path, MatchMode::Exact));
        assert!(!BindingPath::parse("Sales|Region").matches(&leaf_path, MatchMode::Exact));
    }

    #[test]
    fn relative_match() {
        let leaf_path = leaf(&["Sales", "Region", "Total"]);
        assert!(BindingPath::parse("Region|Total").matches(&leaf_path, MatchMode::Relative));
        assert!(BindingPath::parse("Total").matches(&leaf_path, MatchMode::Relative));
        assert!(BindingPath::parse("Sales|Region|Total").matches(&leaf_path, MatchMode::Relative));
        assert!(!BindingPath::parse("Region").matches(&leaf_path, MatchMode::Relative));
        assert!(!BindingPath::parse("X|Sales|Region|Total").matches(&leaf_path, MatchMode::Relative));
    }

    #[test]
    fn parse_and_display() {
        let path = BindingPath::parse("A|B");
        assert_eq!(path.labels(), &["A".to_string(), "B".to_string()]);
        assert_eq!(path.to_string(), "A|B");
        assert_eq!(BindingPath::parse("").len(), 1);
    }
}
