/*!
ARIA-equivalent extended attributes.

Browser-class documents carry web semantics the core role/state model loses:
explicit ARIA roles, heading levels, landmark types and set positions. The
extension API reports them as an object-attributes string (`level:2;xml-roles:heading;`),
the tree-based API as an ARIA-properties string (`level=2;setsize=3`). Both
parse into the same [`ExtendedAttributes`].
*/

use std::collections::BTreeMap;

use crate::a11y::{Landmark, Role};
use crate::object::SetPosition;

/// Web semantics of one browser-document element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedAttributes {
  /// Explicit ARIA role (space-separated fallback list, as authored).
  pub aria_role: Option<String>,
  /// Explicit heading level (`aria-level` or the heading tag's level).
  pub level: Option<u8>,
  pub landmark: Option<Landmark>,
  pub position: Option<SetPosition>,
  /// Every attribute as reported, for consumers that want more.
  pub raw: BTreeMap<String, String>,
}

impl ExtendedAttributes {
  /// Interpret a parsed attribute map.
  ///
  /// Recognizes `xml-roles`/`role`, `level`, `posinset`/`setsize`, and derives
  /// the landmark from the ARIA role when no explicit landmark key is present.
  pub fn from_map(raw: BTreeMap<String, String>) -> Self {
    let aria_role = raw
      .get("xml-roles")
      .or_else(|| raw.get("role"))
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty());

    let level = raw
      .get("level")
      .and_then(|s| s.trim().parse::<u8>().ok())
      .filter(|l| *l > 0);

    let landmark = raw
      .get("landmark")
      .and_then(|s| Landmark::from_aria_role(s))
      .or_else(|| aria_role.as_deref().and_then(Landmark::from_aria_role));

    let position = match (raw.get("posinset"), raw.get("setsize")) {
      (Some(index), Some(size)) => match (index.trim().parse(), size.trim().parse()) {
        (Ok(index), Ok(size)) => SetPosition::new(index, size),
        _ => None,
      },
      _ => None,
    };

    Self {
      aria_role,
      level,
      landmark,
      position,
      raw,
    }
  }

  /// Parse an attribute string with the given key/value separator.
  pub fn parse(attributes: &str, kv_separator: char) -> Self {
    Self::from_map(parse_attribute_string(attributes, kv_separator))
  }

  /// Whether the explicit ARIA role marks a heading.
  pub fn is_heading(&self) -> bool {
    self
      .aria_role
      .as_deref()
      .is_some_and(|r| r.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case("heading")))
  }
}

/// Split `key<sep>value;key<sep>value;` into a map.
///
/// Backslash escapes the next character, so `\;`, `\:`, `\=` and `\\` may
/// appear inside keys and values. Entries without a separator are skipped.
/// Later duplicates win.
pub fn parse_attribute_string(attributes: &str, kv_separator: char) -> BTreeMap<String, String> {
  let mut map = BTreeMap::new();
  let mut key = String::new();
  let mut value = String::new();
  let mut in_value = false;
  let mut chars = attributes.chars();

  while let Some(c) = chars.next() {
    let target = if in_value { &mut value } else { &mut key };
    match c {
      '\\' => {
        if let Some(escaped) = chars.next() {
          target.push(escaped);
        }
      }
      ';' => {
        if in_value && !key.trim().is_empty() {
          map.insert(key.trim().to_owned(), std::mem::take(&mut value));
        }
        key.clear();
        value.clear();
        in_value = false;
      }
      c if c == kv_separator && !in_value => in_value = true,
      c => target.push(c),
    }
  }
  if in_value && !key.trim().is_empty() {
    map.insert(key.trim().to_owned(), value);
  }
  map
}

/// Canonical role for an ARIA role token list. First recognized token wins.
pub fn role_from_aria(aria_role: &str) -> Option<Role> {
  aria_role
    .split_ascii_whitespace()
    .find_map(|token| role_from_aria_token(&token.to_ascii_lowercase()))
}

fn role_from_aria_token(token: &str) -> Option<Role> {
  Some(match token {
    "heading" => Role::Heading,
    "link" => Role::Link,
    "button" => Role::Button,
    "checkbox" => Role::CheckBox,
    "radio" => Role::RadioButton,
    "radiogroup" => Role::RadioGroup,
    "switch" => Role::Switch,
    "textbox" => Role::Edit,
    "searchbox" => Role::SearchBox,
    "combobox" => Role::ComboBox,
    "listbox" => Role::ListBox,
    "option" | "listitem" => Role::ListItem,
    "list" => Role::List,
    "slider" => Role::Slider,
    "spinbutton" => Role::SpinButton,
    "progressbar" => Role::ProgressBar,
    "meter" => Role::Meter,
    "img" | "image" => Role::Image,
    "article" => Role::Article,
    "paragraph" => Role::Paragraph,
    "blockquote" => Role::BlockQuote,
    "note" => Role::Note,
    "document" => Role::Document,
    "application" => Role::Application,
    "dialog" | "alertdialog" => Role::Dialog,
    "alert" => Role::Alert,
    "status" => Role::StatusBar,
    "log" => Role::Log,
    "marquee" => Role::Marquee,
    "timer" => Role::Timer,
    "math" => Role::Math,
    "separator" => Role::Separator,
    "toolbar" => Role::Toolbar,
    "tooltip" => Role::Tooltip,
    "table" => Role::Table,
    "grid" | "treegrid" => Role::DataGrid,
    "row" => Role::Row,
    "cell" | "gridcell" => Role::Cell,
    "columnheader" => Role::ColumnHeader,
    "rowheader" => Role::RowHeader,
    "tab" => Role::Tab,
    "tablist" => Role::TabList,
    "tabpanel" => Role::TabPanel,
    "tree" => Role::Tree,
    "treeitem" => Role::TreeItem,
    "menu" => Role::Menu,
    "menubar" => Role::MenuBar,
    "menuitem" => Role::MenuItem,
    "menuitemcheckbox" => Role::CheckMenuItem,
    "menuitemradio" => Role::RadioMenuItem,
    "group" => Role::Group,
    "region" => Role::Region,
    "form" => Role::Form,
    "banner" | "complementary" | "contentinfo" | "main" | "navigation" | "search" => {
      Role::Landmark
    }
    _ => return None,
  })
}
