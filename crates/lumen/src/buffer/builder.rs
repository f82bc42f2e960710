/*!
Virtual buffer construction.

A depth-first, pre-order walk of the live tree below one root. Each element
contributes at most one run of text (its structured text, value or name, in
that order of preference); elements that present their own text are not
descended into. Block elements sit on their own lines. The walk is bounded by
[`BufferConfig::max_depth`] and [`BufferConfig::max_nodes`]; hitting either
produces a shorter buffer, never a failure.

Everything is built into local state and handed back whole. Nothing is
visible to readers until the caller publishes it.
*/

use std::sync::LazyLock;

use regex::Regex;

use super::node::{BufferNode, NavType};
use crate::a11y::Role;
use crate::config::BufferConfig;
use crate::object::AccessibleObject;
use crate::provider::ExtendedAttributes;
use crate::types::{NodeId, TextRange};

/// Native role text that marks a heading ("heading", "Heading level 2", "h3").
static HEADING_ROLE: LazyLock<Option<Regex>> =
  LazyLock::new(|| Regex::new(r"(?i)\bheading\b|^\s*h[1-9]\s*$").ok());

/// Level inside native role text: "heading level 2", "heading 2", "h2".
static ROLE_LEVEL: LazyLock<Option<Regex>> =
  LazyLock::new(|| Regex::new(r"(?i)\b(?:heading|h)\s*(?:level\s*)?([1-9])\b").ok());

/// Level at the start of a display name: "H2 Installation", "Heading 3: Usage".
static NAME_LEVEL: LazyLock<Option<Regex>> =
  LazyLock::new(|| Regex::new(r"(?i)^\s*(?:heading|h)\s*(?:level\s*)?([1-9])\b").ok());

fn captured_level(pattern: &LazyLock<Option<Regex>>, text: &str) -> Option<u8> {
  let re = pattern.as_ref()?;
  re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Heading level for an object, 0 when nothing says.
///
/// Sources in order, first hit wins: explicit level attribute (extended
/// attributes, then the object's attribute map), the structured level the API
/// reports, a level in the native role text, a level at the start of the name.
pub fn resolve_heading_level(object: &AccessibleObject, ext: Option<&ExtendedAttributes>) -> u8 {
  let explicit = ext.and_then(|e| e.level).or_else(|| {
    object
      .attributes
      .get("level")
      .and_then(|l| l.trim().parse::<u8>().ok())
      .filter(|l| *l > 0)
  });

  let level = explicit
    .or(object.structured_heading_level)
    .or_else(|| {
      object
        .localized_role
        .as_deref()
        .and_then(|r| captured_level(&ROLE_LEVEL, r))
    })
    .or_else(|| object.name.as_deref().and_then(|n| captured_level(&NAME_LEVEL, n)));

  level.unwrap_or_else(|| {
    log::debug!(
      "Unresolved heading level for {:?} (role text {:?})",
      object.name,
      object.localized_role
    );
    0
  })
}

fn is_heading_candidate(object: &AccessibleObject, ext: Option<&ExtendedAttributes>) -> bool {
  object.role == Role::Heading
    || ext.is_some_and(ExtendedAttributes::is_heading)
    || object
      .localized_role
      .as_deref()
      .zip(HEADING_ROLE.as_ref())
      .is_some_and(|(role, re)| re.is_match(role))
}

/// First non-empty of structured text, value, name.
fn own_text(object: &AccessibleObject) -> Option<String> {
  let pick = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
  pick(object.text().as_deref())
    .or_else(|| pick(object.value.as_deref()))
    .or_else(|| pick(object.name.as_deref()))
}

/// Text and node list of one finished build.
#[derive(Debug)]
pub(crate) struct Built {
  pub(crate) text: String,
  pub(crate) nodes: Vec<BufferNode>,
}

enum Step {
  Enter {
    object: AccessibleObject,
    depth: usize,
    parent: Option<NodeId>,
  },
  /// Line break after a block element's subtree.
  CloseBlock,
}

struct Walk<'a> {
  config: &'a BufferConfig,
  browser: bool,
  text: String,
  /// Length of `text` in chars.
  len: usize,
  nodes: Vec<BufferNode>,
  depth_capped: bool,
  node_capped: bool,
}

impl Walk<'_> {
  fn push_str(&mut self, s: &str) {
    self.text.push_str(s);
    self.len += s.chars().count();
  }

  fn ensure_line_break(&mut self) {
    if !self.text.is_empty() && !self.text.ends_with('\n') {
      self.push_str("\n");
    }
  }

  /// Append inline text; returns its range.
  fn append(&mut self, text: &str) -> TextRange {
    if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
      self.push_str(" ");
    }
    let start = self.len;
    self.push_str(text);
    TextRange::new(start, self.len)
  }

  fn children_of(&mut self, object: &AccessibleObject, depth: usize) -> Vec<AccessibleObject> {
    if object.role.presents_own_text() {
      return Vec::new();
    }
    if depth + 1 >= self.config.max_depth {
      if !self.depth_capped {
        log::debug!("Depth cap {} reached; not descending further", self.config.max_depth);
        self.depth_capped = true;
      }
      return Vec::new();
    }
    object.children()
  }

  /// Visit one element; returns the steps to run after it.
  fn enter(&mut self, object: AccessibleObject, depth: usize, parent: Option<NodeId>) -> Vec<Step> {
    let id = NodeId(self.nodes.len());
    let ext = if self.browser {
      object.extended_attributes()
    } else {
      None
    };

    let candidate = is_heading_candidate(&object, ext.as_ref());
    let heading_level = if candidate {
      resolve_heading_level(&object, ext.as_ref())
    } else {
      0
    };
    let (landmark, position) = match &ext {
      Some(e) => (e.landmark.or(object.landmark), e.position.or(object.position)),
      None => (object.landmark, object.position),
    };
    let nav_type = if candidate {
      NavType::heading(heading_level)
    } else {
      NavType::classify(
        object.role,
        ext.as_ref().and_then(|e| e.aria_role.as_deref()),
        heading_level,
        landmark,
        object.states,
      )
    };

    let block = object.role.is_block() || nav_type.is_heading();
    if block {
      self.ensure_line_break();
    }

    let children = self.children_of(&object, depth);
    let range = if children.is_empty() || object.role.presents_own_text() {
      own_text(&object).map(|t| self.append(&t))
    } else {
      None
    }
    .unwrap_or(TextRange::new(self.len, self.len));

    if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
      parent.children.push(id);
    }
    self.nodes.push(BufferNode {
      id,
      range,
      states: object.states,
      object,
      nav_type,
      heading_level,
      landmark,
      position,
      depth,
      parent,
      children: Vec::new(),
    });

    let mut steps = Vec::with_capacity(children.len() + 1);
    if block {
      steps.push(Step::CloseBlock);
    }
    steps.extend(children.into_iter().rev().map(|child| Step::Enter {
      object: child,
      depth: depth + 1,
      parent: Some(id),
    }));
    steps
  }

  /// Give text-less elements an empty range where their content begins,
  /// which keeps the node list sorted by start.
  fn finish(mut self) -> Built {
    let mut next_start = self.len;
    for node in self.nodes.iter_mut().rev() {
      if node.range.is_empty() {
        node.range = TextRange::new(next_start, next_start);
      } else {
        next_start = node.range.start;
      }
    }
    Built {
      text: self.text,
      nodes: self.nodes,
    }
  }
}

/// Walk the tree under `root` into a text buffer and node list.
pub(crate) fn build(root: &AccessibleObject, config: &BufferConfig) -> Built {
  let mut walk = Walk {
    config,
    browser: root.is_browser_document(),
    text: String::new(),
    len: 0,
    nodes: Vec::new(),
    depth_capped: false,
    node_capped: false,
  };

  let mut stack = vec![Step::Enter {
    object: root.clone(),
    depth: 0,
    parent: None,
  }];
  while let Some(step) = stack.pop() {
    match step {
      Step::Enter { object, depth, parent } => {
        if walk.nodes.len() >= config.max_nodes {
          if !walk.node_capped {
            log::debug!("Node cap {} reached; skipping the rest of the tree", config.max_nodes);
            walk.node_capped = true;
          }
          continue;
        }
        let next = walk.enter(object, depth, parent);
        stack.extend(next);
      }
      Step::CloseBlock => walk.ensure_line_break(),
    }
  }

  let built = walk.finish();
  log::debug!(
    "Built buffer: {} nodes, {} bytes of text",
    built.nodes.len(),
    built.text.len()
  );
  built
}
