/*! Buffer node records and their navigation classification. */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::a11y::{Landmark, Role, StateSet};
use crate::object::{AccessibleObject, SetPosition};
use crate::types::{LumenError, NodeId, TextRange};

/// What a buffer node is, for type-directed navigation.
///
/// Generic kinds (`Heading`, `Link`, `FormField`) are also query types that
/// widen to their specific kinds; see [`NavType::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavType {
  /// Heading whose level could not be resolved (or lies outside 1..=6).
  Heading,
  Heading1,
  Heading2,
  Heading3,
  Heading4,
  Heading5,
  Heading6,
  Link,
  /// Element that is a link only by its explicit ARIA role.
  AriaLink,
  Button,
  /// Form control without a more specific kind (sliders, spinners, switches).
  FormField,
  Edit,
  Checkbox,
  RadioButton,
  ComboBox,
  ListBox,
  List,
  ListItem,
  Table,
  Graphic,
  Landmark,
  BlockQuote,
  Separator,
  Text,
  Other,
}

impl NavType {
  /// Specific heading kind for a level; levels outside 1..=6 stay generic.
  pub const fn heading(level: u8) -> Self {
    match level {
      1 => Self::Heading1,
      2 => Self::Heading2,
      3 => Self::Heading3,
      4 => Self::Heading4,
      5 => Self::Heading5,
      6 => Self::Heading6,
      _ => Self::Heading,
    }
  }

  pub const fn is_heading(self) -> bool {
    matches!(
      self,
      Self::Heading
        | Self::Heading1
        | Self::Heading2
        | Self::Heading3
        | Self::Heading4
        | Self::Heading5
        | Self::Heading6
    )
  }

  /// Classify a node.
  ///
  /// `aria_role` is the explicit ARIA role, when the document reports one.
  /// Heading level wins over role; a non-link carrying the linked state is a link.
  pub fn classify(
    role: Role,
    aria_role: Option<&str>,
    heading_level: u8,
    landmark: Option<Landmark>,
    states: StateSet,
  ) -> Self {
    let aria_link = aria_role
      .is_some_and(|r| r.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case("link")));

    if heading_level > 0 || role == Role::Heading {
      return Self::heading(heading_level);
    }
    if aria_link {
      return Self::AriaLink;
    }
    if role == Role::Link || states.contains(StateSet::LINKED) {
      return Self::Link;
    }

    match role {
      Role::Edit | Role::PasswordEdit | Role::SearchBox => Self::Edit,
      Role::CheckBox | Role::CheckMenuItem => Self::Checkbox,
      Role::RadioButton | Role::RadioMenuItem => Self::RadioButton,
      Role::ComboBox => Self::ComboBox,
      Role::ListBox => Self::ListBox,
      Role::Button
      | Role::ToggleButton
      | Role::SplitButton
      | Role::MenuButton
      | Role::DropDownButton => Self::Button,
      other if other.is_form_field() => Self::FormField,
      other if landmark.is_some() || other.is_landmark() => Self::Landmark,
      Role::List | Role::Tree => Self::List,
      Role::ListItem | Role::TreeItem => Self::ListItem,
      Role::Table | Role::DataGrid => Self::Table,
      Role::Image | Role::Icon | Role::Canvas | Role::Chart => Self::Graphic,
      Role::BlockQuote => Self::BlockQuote,
      Role::Separator => Self::Separator,
      Role::StaticText | Role::Paragraph | Role::Label => Self::Text,
      _other => Self::Other,
    }
  }
}

impl fmt::Display for NavType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      Self::Heading => "heading",
      Self::Heading1 => "heading level 1",
      Self::Heading2 => "heading level 2",
      Self::Heading3 => "heading level 3",
      Self::Heading4 => "heading level 4",
      Self::Heading5 => "heading level 5",
      Self::Heading6 => "heading level 6",
      Self::Link | Self::AriaLink => "link",
      Self::Button => "button",
      Self::FormField => "form field",
      Self::Edit => "edit",
      Self::Checkbox => "check box",
      Self::RadioButton => "radio button",
      Self::ComboBox => "combo box",
      Self::ListBox => "list box",
      Self::List => "list",
      Self::ListItem => "list item",
      Self::Table => "table",
      Self::Graphic => "graphic",
      Self::Landmark => "landmark",
      Self::BlockQuote => "block quote",
      Self::Separator => "separator",
      Self::Text => "text",
      Self::Other => "element",
    };
    f.write_str(text)
  }
}

impl FromStr for NavType {
  type Err = LumenError;

  /// Parse a browse-mode token: single-key letters (`h`, `k`, `f`, `d`, ...),
  /// digits for heading levels, or the spelled-out kind.
  fn from_str(token: &str) -> Result<Self, Self::Err> {
    Ok(match token.trim().to_ascii_lowercase().as_str() {
      "h" | "heading" => Self::Heading,
      "1" | "h1" => Self::Heading1,
      "2" | "h2" => Self::Heading2,
      "3" | "h3" => Self::Heading3,
      "4" | "h4" => Self::Heading4,
      "5" | "h5" => Self::Heading5,
      "6" | "h6" => Self::Heading6,
      "k" | "link" => Self::Link,
      "b" | "button" => Self::Button,
      "f" | "formfield" | "form_field" => Self::FormField,
      "e" | "edit" => Self::Edit,
      "x" | "checkbox" => Self::Checkbox,
      "r" | "radio" | "radiobutton" => Self::RadioButton,
      "c" | "combobox" => Self::ComboBox,
      "listbox" => Self::ListBox,
      "l" | "list" => Self::List,
      "i" | "listitem" => Self::ListItem,
      "t" | "table" => Self::Table,
      "g" | "graphic" => Self::Graphic,
      "d" | "landmark" => Self::Landmark,
      "q" | "blockquote" => Self::BlockQuote,
      "s" | "separator" => Self::Separator,
      _ => return Err(LumenError::UnknownNavToken(token.to_owned())),
    })
  }
}

/// One element of a built buffer.
///
/// Everything here is a build-time snapshot; only `object` can reach the live
/// element again.
#[derive(Debug, Clone)]
pub struct BufferNode {
  pub id: NodeId,
  /// Text this element contributed itself. Elements whose text comes only
  /// from descendants have an empty range at the start of that text.
  pub range: TextRange,
  pub object: AccessibleObject,
  pub nav_type: NavType,
  /// 0 when the node is not a heading.
  pub heading_level: u8,
  pub landmark: Option<Landmark>,
  pub position: Option<SetPosition>,
  pub states: StateSet,
  pub depth: usize,
  pub parent: Option<NodeId>,
  pub children: Vec<NodeId>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn headings_by_level() {
    assert_eq!(NavType::heading(2), NavType::Heading2);
    assert_eq!(NavType::heading(0), NavType::Heading);
    assert_eq!(NavType::heading(8), NavType::Heading);
    assert!(NavType::Heading6.is_heading());
    assert!(!NavType::Link.is_heading());
  }

  #[test]
  fn classification_precedence() {
    let none = StateSet::empty();
    assert_eq!(NavType::classify(Role::Group, None, 3, None, none), NavType::Heading3);
    assert_eq!(NavType::classify(Role::Heading, None, 0, None, none), NavType::Heading);
    assert_eq!(NavType::classify(Role::Link, None, 0, None, none), NavType::Link);
    assert_eq!(NavType::classify(Role::Link, Some("link"), 0, None, none), NavType::AriaLink);
    assert_eq!(NavType::classify(Role::StaticText, None, 0, None, StateSet::LINKED), NavType::Link);
    assert_eq!(NavType::classify(Role::Slider, None, 0, None, none), NavType::FormField);
    assert_eq!(
      NavType::classify(Role::Group, None, 0, Some(Landmark::Main), none),
      NavType::Landmark
    );
    assert_eq!(NavType::classify(Role::Container, None, 0, None, none), NavType::Other);
  }

  #[test]
  fn tokens() {
    assert_eq!("h".parse::<NavType>().ok(), Some(NavType::Heading));
    assert_eq!("H2".parse::<NavType>().ok(), Some(NavType::Heading2));
    assert_eq!("3".parse::<NavType>().ok(), Some(NavType::Heading3));
    assert_eq!("k".parse::<NavType>().ok(), Some(NavType::Link));
    assert_eq!("d".parse::<NavType>().ok(), Some(NavType::Landmark));
    assert!(matches!(
      "zz".parse::<NavType>(),
      Err(LumenError::UnknownNavToken(t)) if t == "zz"
    ));
  }
}
