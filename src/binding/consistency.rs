use crate::binding::node::HeaderNode;
use crate::binding::record::RecordHandle;
use crate::binding::BindingError;
use crate::helpers::recover::recover;

impl HeaderNode {
    /// Checks that the leaf paths are exactly the field paths of `templates`,
    /// taken in template order then field order.
    pub fn is_consistent(&self, templates: &[&dyn RecordHandle]) -> Result<bool, BindingError> {
        match self.ensure_consistent(templates) {
            Ok(()) => Ok(true),
            Err(BindingError::HeaderMismatch { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Like [`HeaderNode::is_consistent`], but reports the first mismatching column.
    ///
    /// `position` is the 1-based index into the leaf list; a missing leaf or
    /// field shows up as an empty path.
    pub fn ensure_consistent(&self, templates: &[&dyn RecordHandle]) -> Result<(), BindingError> {
        recover("ensure_consistent", || {
            let expected: Vec<&[String]> = templates
                .iter()
                .flat_map(|template| template.field_paths())
                .map(|path| path.labels())
                .collect();
            let leaves = self.leaves();
            let found: Vec<&[String]> = leaves.iter().map(|leaf| leaf.path()).collect();

            let mismatch = |position: usize| BindingError::HeaderMismatch {
                position: position + 1,
                expected: expected.get(position).map(|labels| labels.join("|")).unwrap_or_default(),
                found: found.get(position).map(|labels| labels.join("|")).unwrap_or_default(),
            };
            let shared = expected.len().min(found.len());
            if let Some(position) = (0..shared).find(|&index| expected[index] != found[index]) {
                return Err(mismatch(position));
            }
            if expected.len() != found.len() {
                return Err(mismatch(shared));
            }
            Ok(())
        })
    }
}
