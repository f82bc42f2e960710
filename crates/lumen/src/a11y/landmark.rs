/*! Landmark regions: semantically significant areas of a document. */

use serde::{Deserialize, Serialize};

/// Landmark classification, following the ARIA landmark roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Landmark {
  Banner,
  Complementary,
  ContentInfo,
  Form,
  Main,
  Navigation,
  Region,
  Search,
}

impl Landmark {
  /// Parse an ARIA role token (`"navigation"`, `"main"`, ...).
  ///
  /// Role attributes may hold a space-separated fallback list; the first
  /// landmark token wins.
  pub fn from_aria_role(role: &str) -> Option<Self> {
    role.split_ascii_whitespace().find_map(|token| {
      Some(match token.to_ascii_lowercase().as_str() {
        "banner" => Self::Banner,
        "complementary" => Self::Complementary,
        "contentinfo" => Self::ContentInfo,
        "form" => Self::Form,
        "main" => Self::Main,
        "navigation" => Self::Navigation,
        "region" => Self::Region,
        "search" => Self::Search,
        _ => return None,
      })
    })
  }

  /// Spoken text.
  pub const fn text(self) -> &'static str {
    match self {
      Self::Banner => "banner",
      Self::Complementary => "complementary",
      Self::ContentInfo => "content info",
      Self::Form => "form",
      Self::Main => "main",
      Self::Navigation => "navigation",
      Self::Region => "region",
      Self::Search => "search",
    }
  }
}
