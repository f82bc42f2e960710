/*!
Type-directed navigation over a built node list.

Queries widen from generic to specific and never the other way: `Heading`
finds a level-3 heading, `Heading3` never finds a level-2 one. Running off
either end of the buffer is a normal outcome and yields `None`.
*/

use super::node::{BufferNode, NavType};
use crate::types::LumenResult;

impl NavType {
  /// Whether a node of kind `node` answers a query for `self`.
  pub fn matches(self, node: NavType) -> bool {
    match self {
      Self::Heading => node.is_heading(),
      Self::Link => matches!(node, Self::Link | Self::AriaLink),
      Self::FormField => matches!(
        node,
        Self::FormField
          | Self::Edit
          | Self::Checkbox
          | Self::RadioButton
          | Self::ComboBox
          | Self::ListBox
      ),
      query => query == node,
    }
  }

  /// Parse a token sent by the browse-mode key layer.
  pub fn from_token(token: &str) -> LumenResult<Self> {
    token.parse()
  }
}

/// First node of the queried kind starting strictly after `from`.
pub fn find_next(nodes: &[BufferNode], query: NavType, from: usize) -> Option<&BufferNode> {
  let first = nodes.partition_point(|n| n.range.start <= from);
  nodes
    .iter()
    .skip(first)
    .find(|n| query.matches(n.nav_type))
}

/// Last node of the queried kind starting strictly before `from`.
pub fn find_previous(nodes: &[BufferNode], query: NavType, from: usize) -> Option<&BufferNode> {
  let end = nodes.partition_point(|n| n.range.start < from);
  nodes
    .iter()
    .take(end)
    .rev()
    .find(|n| query.matches(n.nav_type))
}
