/*!
Canonical UI roles.

Roles describe what an element *is*. The enumeration is the union of what the
four native API families can express; each provider maps its own role
vocabulary onto it in its `mapping.rs`. Native roles nobody mapped land on
[`Role::Container`], never on an error.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Canonical UI role (provider-agnostic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  // === Top-level / windows ===
  Application,
  Window,
  Dialog,
  Alert,
  Desktop,
  Frame,
  InternalFrame,
  Pane,
  TitleBar,

  // === Documents & structure ===
  Document,
  Article,
  Section,
  Paragraph,
  BlockQuote,
  Heading,
  Form,
  Landmark,
  Region,
  Note,
  Header,
  Footer,
  Caption,
  Definition,
  Page,
  Log,
  Marquee,
  Timer,

  // === Static content ===
  Label,
  StaticText,
  Image,
  Icon,
  Canvas,
  Chart,
  Equation,
  Math,
  Separator,
  Animation,

  // === Bars & menus ===
  Toolbar,
  StatusBar,
  MenuBar,
  Menu,
  MenuItem,
  CheckMenuItem,
  RadioMenuItem,
  Tooltip,

  // === Scrolling & layout chrome ===
  ScrollBar,
  ScrollPane,
  SplitPane,
  Grip,
  Ruler,
  Indicator,
  Caret,
  Cursor,

  // === Tabs ===
  Tab,
  TabList,
  TabPanel,

  // === Collections ===
  List,
  ListItem,
  ListBox,
  Tree,
  TreeItem,
  Table,
  Row,
  Column,
  Cell,
  ColumnHeader,
  RowHeader,
  DataGrid,

  // === Interactive ===
  Link,
  Button,
  ToggleButton,
  SplitButton,
  MenuButton,
  DropDownButton,
  CheckBox,
  RadioButton,
  RadioGroup,
  Switch,
  ComboBox,
  Slider,
  SpinButton,
  ProgressBar,
  Meter,
  Edit,
  PasswordEdit,
  SearchBox,
  DateEditor,
  ColorChooser,
  FileChooser,
  Calendar,
  Terminal,
  EmbeddedObject,

  // === Generic / fallback ===
  /// Generic grouping with no semantics of its own.
  Group,
  /// Fallback for native roles that have no canonical counterpart.
  Container,
  /// The native API reported no role at all.
  #[default]
  Unknown,
}

impl Role {
  /// Every role, in declaration order.
  pub const ALL: &'static [Self] = &[
    Self::Application, Self::Window, Self::Dialog, Self::Alert, Self::Desktop, Self::Frame,
    Self::InternalFrame, Self::Pane, Self::TitleBar, Self::Document, Self::Article, Self::Section,
    Self::Paragraph, Self::BlockQuote, Self::Heading, Self::Form, Self::Landmark, Self::Region,
    Self::Note, Self::Header, Self::Footer, Self::Caption, Self::Definition, Self::Page, Self::Log,
    Self::Marquee, Self::Timer, Self::Label, Self::StaticText, Self::Image, Self::Icon,
    Self::Canvas, Self::Chart, Self::Equation, Self::Math, Self::Separator, Self::Animation,
    Self::Toolbar, Self::StatusBar, Self::MenuBar, Self::Menu, Self::MenuItem, Self::CheckMenuItem,
    Self::RadioMenuItem, Self::Tooltip, Self::ScrollBar, Self::ScrollPane, Self::SplitPane,
    Self::Grip, Self::Ruler, Self::Indicator, Self::Caret, Self::Cursor, Self::Tab, Self::TabList,
    Self::TabPanel, Self::List, Self::ListItem, Self::ListBox, Self::Tree, Self::TreeItem,
    Self::Table, Self::Row, Self::Column, Self::Cell, Self::ColumnHeader, Self::RowHeader,
    Self::DataGrid, Self::Link, Self::Button, Self::ToggleButton, Self::SplitButton,
    Self::MenuButton, Self::DropDownButton, Self::CheckBox, Self::RadioButton, Self::RadioGroup,
    Self::Switch, Self::ComboBox, Self::Slider, Self::SpinButton, Self::ProgressBar, Self::Meter,
    Self::Edit, Self::PasswordEdit, Self::SearchBox, Self::DateEditor, Self::ColorChooser,
    Self::FileChooser, Self::Calendar, Self::Terminal, Self::EmbeddedObject, Self::Group,
    Self::Container, Self::Unknown,
  ];

  /// Human-readable role text, as spoken.
  ///
  /// Roles absent from the table fall back to their symbolic name, so this is
  /// total over the enumeration.
  pub fn text(self) -> Cow<'static, str> {
    match self.table_text() {
      Some(text) => Cow::Borrowed(text),
      None => Cow::Owned(format!("{self:?}")),
    }
  }

  #[allow(clippy::too_many_lines)]
  const fn table_text(self) -> Option<&'static str> {
    Some(match self {
      Self::Application => "application",
      Self::Window => "window",
      Self::Dialog => "dialog",
      Self::Alert => "alert",
      Self::Desktop => "desktop",
      Self::Frame => "frame",
      Self::InternalFrame => "internal frame",
      Self::Pane => "pane",
      Self::TitleBar => "title bar",
      Self::Document => "document",
      Self::Article => "article",
      Self::Section => "section",
      Self::Paragraph => "paragraph",
      Self::BlockQuote => "block quote",
      Self::Heading => "heading",
      Self::Form => "form",
      Self::Landmark => "landmark",
      Self::Region => "region",
      Self::Note => "note",
      Self::Header => "header",
      Self::Footer => "footer",
      Self::Caption => "caption",
      Self::Definition => "definition",
      Self::Page => "page",
      Self::Log => "log",
      Self::Marquee => "marquee",
      Self::Timer => "timer",
      Self::Label => "label",
      Self::StaticText => "text",
      Self::Image => "graphic",
      Self::Icon => "icon",
      Self::Canvas => "canvas",
      Self::Chart => "chart",
      Self::Equation => "equation",
      Self::Math => "math",
      Self::Separator => "separator",
      Self::Animation => "animation",
      Self::Toolbar => "tool bar",
      Self::StatusBar => "status bar",
      Self::MenuBar => "menu bar",
      Self::Menu => "menu",
      Self::MenuItem => "menu item",
      Self::CheckMenuItem => "check menu item",
      Self::RadioMenuItem => "radio menu item",
      Self::Tooltip => "tool tip",
      Self::ScrollBar => "scroll bar",
      Self::ScrollPane => "scroll pane",
      Self::SplitPane => "split pane",
      Self::Grip => "grip",
      Self::Ruler => "ruler",
      Self::Indicator => "indicator",
      Self::Tab => "tab",
      Self::TabList => "tab control",
      Self::TabPanel => "tab panel",
      Self::List => "list",
      Self::ListItem => "list item",
      Self::ListBox => "list box",
      Self::Tree => "tree view",
      Self::TreeItem => "tree view item",
      Self::Table => "table",
      Self::Row => "row",
      Self::Column => "column",
      Self::Cell => "cell",
      Self::ColumnHeader => "column header",
      Self::RowHeader => "row header",
      Self::DataGrid => "data grid",
      Self::Link => "link",
      Self::Button => "button",
      Self::ToggleButton => "toggle button",
      Self::SplitButton => "split button",
      Self::MenuButton => "menu button",
      Self::DropDownButton => "drop down button",
      Self::CheckBox => "check box",
      Self::RadioButton => "radio button",
      Self::RadioGroup => "grouping",
      Self::Switch => "switch",
      Self::ComboBox => "combo box",
      Self::Slider => "slider",
      Self::SpinButton => "spin button",
      Self::ProgressBar => "progress bar",
      Self::Meter => "meter",
      Self::Edit => "edit",
      Self::PasswordEdit => "password edit",
      Self::SearchBox => "search edit",
      Self::DateEditor => "date editor",
      Self::ColorChooser => "color chooser",
      Self::FileChooser => "file chooser",
      Self::Calendar => "calendar",
      Self::Terminal => "terminal",
      Self::EmbeddedObject => "embedded object",
      Self::Group => "grouping",
      // Presentational: never spoken, no table entry.
      Self::Caret | Self::Cursor | Self::Container | Self::Unknown => return None,
    })
  }

  /// Roles whose text is not spoken in announcements (layout-only or plain text).
  pub const fn is_silent(self) -> bool {
    matches!(
      self,
      Self::Container
        | Self::Unknown
        | Self::Section
        | Self::Paragraph
        | Self::StaticText
        | Self::Label
        | Self::Caret
        | Self::Cursor
        | Self::Pane
    )
  }

  /// Block roles end their content with a line break in the virtual buffer.
  pub const fn is_block(self) -> bool {
    matches!(
      self,
      Self::Document
        | Self::Article
        | Self::Section
        | Self::Paragraph
        | Self::BlockQuote
        | Self::Heading
        | Self::Form
        | Self::Landmark
        | Self::Region
        | Self::Note
        | Self::Header
        | Self::Footer
        | Self::Caption
        | Self::Definition
        | Self::Separator
        | Self::List
        | Self::ListItem
        | Self::ListBox
        | Self::Tree
        | Self::TreeItem
        | Self::Table
        | Self::Row
        | Self::Dialog
        | Self::Alert
        | Self::Log
        | Self::TabPanel
    )
  }

  /// Roles whose own name/value is their content; the buffer does not descend into them.
  pub const fn presents_own_text(self) -> bool {
    matches!(
      self,
      Self::Edit
        | Self::PasswordEdit
        | Self::SearchBox
        | Self::ComboBox
        | Self::Button
        | Self::ToggleButton
        | Self::SplitButton
        | Self::MenuButton
        | Self::DropDownButton
        | Self::CheckBox
        | Self::RadioButton
        | Self::Switch
        | Self::Slider
        | Self::SpinButton
        | Self::ProgressBar
        | Self::Meter
        | Self::Image
        | Self::Icon
        | Self::Separator
        | Self::ScrollBar
        | Self::DateEditor
        | Self::ColorChooser
        | Self::Math
        | Self::Equation
    )
  }

  /// Does this role typically contain other elements?
  pub const fn is_container(self) -> bool {
    matches!(
      self,
      Self::Application
        | Self::Window
        | Self::Dialog
        | Self::Desktop
        | Self::Frame
        | Self::InternalFrame
        | Self::Pane
        | Self::Document
        | Self::Article
        | Self::Section
        | Self::Form
        | Self::Landmark
        | Self::Region
        | Self::Toolbar
        | Self::StatusBar
        | Self::MenuBar
        | Self::Menu
        | Self::ScrollPane
        | Self::SplitPane
        | Self::TabList
        | Self::TabPanel
        | Self::List
        | Self::ListBox
        | Self::Tree
        | Self::Table
        | Self::Row
        | Self::DataGrid
        | Self::RadioGroup
        | Self::Group
        | Self::Container
    )
  }

  /// Landmark regions (navigation, main, named regions, ...).
  pub const fn is_landmark(self) -> bool {
    matches!(self, Self::Landmark | Self::Region)
  }

  /// Roles that count as form fields for quick navigation.
  pub const fn is_form_field(self) -> bool {
    matches!(
      self,
      Self::Edit
        | Self::PasswordEdit
        | Self::SearchBox
        | Self::ComboBox
        | Self::CheckBox
        | Self::RadioButton
        | Self::ListBox
        | Self::Switch
        | Self::Slider
        | Self::SpinButton
        | Self::DateEditor
    )
  }

  /// Is this a text input element?
  pub const fn is_text_input(self) -> bool {
    matches!(
      self,
      Self::Edit | Self::PasswordEdit | Self::SearchBox | Self::ComboBox | Self::Terminal
    )
  }

  /// Roles that carry a checked/not-checked state worth announcing.
  pub const fn is_checkable(self) -> bool {
    matches!(
      self,
      Self::CheckBox | Self::CheckMenuItem | Self::RadioButton | Self::RadioMenuItem | Self::Switch
    )
  }

  /// Can elements with this role have a meaningful value?
  pub const fn can_have_value(self) -> bool {
    matches!(
      self,
      Self::Edit
        | Self::PasswordEdit
        | Self::SearchBox
        | Self::ComboBox
        | Self::Slider
        | Self::SpinButton
        | Self::ProgressBar
        | Self::Meter
        | Self::DateEditor
        | Self::ColorChooser
        | Self::Terminal
        | Self::Link
    )
  }
}
