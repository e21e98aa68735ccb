use crate::binding::BindingError;
use crate::binding::ScanSettings;
use crate::spreadsheet::span::Extent;
use crate::spreadsheet::span::HeaderSpan;
use log::debug;
use log::warn;
use std::sync::Arc;
use std::sync::OnceLock;

/// A node of a sheet's header tree.
///
/// The tree root is a synthetic node standing for the whole sheet. Its children
/// are the top header spans, and every leaf below it is one data column.
#[derive(Clone, Debug, Default)]
pub struct HeaderNode {
    label: String,
    col_start: usize,
    col_end: usize,
    row_start: usize,
    row_end: usize,
    /// Labels from the top header down to this node, root excluded
    path: Vec<String>,
    children: Vec<HeaderNode>,
    settings: ScanSettings,
    is_root: bool,
    leaves: OnceLock<Arc<[HeaderNode]>>,
}

impl HeaderNode {
    /// Creates the synthetic root of a sheet covering columns `col_start..=col_end`.
    pub fn root(label: &str, col_start: usize, col_end: usize, settings: ScanSettings) -> Self {
        Self {
            label: label.to_owned(),
            col_start,
            col_end,
            settings,
            is_root: true,
            ..Default::default()
        }
    }

    /// Builds the tree below `root` out of the header spans of its sheet.
    ///
    /// Spans must form a nested partition (as merged header cells do). The
    /// children of a node are the spans found between the first span starting at
    /// the node's first column and the next span ending at its last column.
    pub fn build(mut self, spans: &[HeaderSpan]) -> Result<Self, BindingError> {
        let extents = spans
            .iter()
            .map(|span| {
                span.extent().map_err(|source| BindingError::MalformedHeader {
                    span: span.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<Extent>, _>>()?;

        self.children = self.build_children(spans, &extents);
        self.leaves = OnceLock::new();
        debug!(
            "Built header tree '{}' with {} leaves, data starts at row index {}",
            self.label,
            self.leaves().len(),
            self.data_row_start()
        );
        Ok(self)
    }

    fn build_children(&self, spans: &[HeaderSpan], extents: &[Extent]) -> Vec<HeaderNode> {
        let Some((start, end)) = self.children_boundary(spans, extents) else {
            return Vec::new();
        };
        (start..=end)
            .map(|index| {
                let extent = extents[index];
                let label = spans[index].label.to_owned();
                let mut path = self.path.clone();
                path.push(label.clone());
                let mut node = HeaderNode {
                    label,
                    col_start: extent.col_start,
                    col_end: extent.col_end,
                    row_start: extent.row_start,
                    row_end: extent.row_end,
                    path,
                    settings: self.settings,
                    ..Default::default()
                };
                node.children = node.build_children(spans, extents);
                node
            })
            .collect()
    }

    /// Finds the index range `[start, end]` of this node's children in `extents`.
    fn children_boundary(&self, spans: &[HeaderSpan], extents: &[Extent]) -> Option<(usize, usize)> {
        let below = |extent: &Extent| {
            extent.row_start > self.row_end
                && extent.col_start >= self.col_start
                && extent.col_end <= self.col_end
        };
        let start = extents
            .iter()
            .position(|extent| below(extent) && extent.col_start == self.col_start)?;
        let end = extents[start..]
            .iter()
            .position(|extent| below(extent) && extent.col_end == self.col_end)
            .map(|offset| start + offset);
        if end.is_none() {
            warn!(
                "Header span {} under '{}' has no closing span ending at column {}, treated as leaf",
                spans[start], self.label, self.col_end
            );
        }
        end.map(|end| (start, end))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn children(&self) -> &[HeaderNode] {
        &self.children
    }

    pub fn settings(&self) -> ScanSettings {
        self.settings
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// First and last column (1-based) covered by this node.
    pub fn col_index_pos(&self) -> (usize, usize) {
        (self.col_start, self.col_end)
    }

    /// First and last row (1-based) covered by this node, `(0, 0)` for a root.
    pub fn row_index_pos(&self) -> (usize, usize) {
        (self.row_start, self.row_end)
    }

    /// Leaves below this node from left to right. Computed once per node.
    ///
    /// A childless root yields no leaves, a childless inner node is its own leaf.
    pub fn leaves(&self) -> &[HeaderNode] {
        self.leaf_index()
    }

    pub(crate) fn leaf_index(&self) -> &Arc<[HeaderNode]> {
        self.leaves.get_or_init(|| {
            let mut leaves = Vec::new();
            if !(self.is_root && self.children.is_empty()) {
                self.collect_leaves(&mut leaves);
            }
            leaves.into()
        })
    }

    fn collect_leaves(&self, leaves: &mut Vec<HeaderNode>) {
        if self.children.is_empty() {
            leaves.push(HeaderNode {
                leaves: OnceLock::new(),
                ..self.clone()
            });
        } else {
            for child in &self.children {
                child.collect_leaves(leaves);
            }
        }
    }

    /// Index of the first row holding data rather than header text, following
    /// first children down to a leaf.
    pub fn data_row_start(&self) -> usize {
        let mut node = self;
        while let Some(child) = node.children.first() {
            node = child;
        }
        node.row_end
    }

    /// Looks up a node by a `|` delimited label path (or `.` delimited when the
    /// path has no `|`). Paths are relative to this node's children, so the
    /// sheet root never takes part in the match.
    pub fn sub_node(&self, path: &str) -> Option<&HeaderNode> {
        let labels: Vec<&str> = if path.contains('|') {
            path.split('|').collect()
        } else {
            path.split('.').collect()
        };
        if self.is_root {
            self.children.iter().find_map(|child| child.descend(&labels))
        } else {
            let mut labels = labels;
            labels.insert(0, &self.label);
            self.descend(&labels)
        }
    }

    fn descend(&self, labels: &[&str]) -> Option<&HeaderNode> {
        let (first, rest) = labels.split_first()?;
        if self.label != *first {
            None
        } else if rest.is_empty() {
            Some(self)
        } else {
            self.children.iter().find_map(|child| child.descend(rest))
        }
    }
}
