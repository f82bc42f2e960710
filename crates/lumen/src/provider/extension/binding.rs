/*!
Native binding for the extension API.

The extension API rides on the handle-based one: every extension object is
also a handle-based object, so [`ExtensionBinding`] extends [`LegacyBinding`]
with the extra interfaces (unique ids, extended roles/states, object
attributes, text).
*/

#![allow(missing_docs)]

use crate::provider::legacy::{LegacyBinding, LegacyRef};
use crate::types::NativeResult;

/// Extension interface data for one object.
#[derive(Debug, Clone, Default)]
pub struct ExtensionProperties {
  /// Window-unique id.
  pub unique_id: i32,
  /// Extended role. Values below `0x400` are plain handle-based role numbers.
  pub role: i32,
  pub states: u32,
  /// `key:value;` object attributes.
  pub attributes: Option<String>,
  /// Group position: nesting level, set size, 1-based index. `0` = unknown.
  pub group_level: i32,
  pub similar_items_in_group: i32,
  pub position_in_group: i32,
}

/// Host implementation of the extension API.
pub trait ExtensionBinding: LegacyBinding {
  /// Is the extension proxy registered with the system?
  fn is_registered(&self) -> bool;

  /// Activate the proxy in this process.
  fn activate(&self) -> NativeResult<()>;

  /// Extension data. Objects without the extension interface report "no interface".
  fn extension_properties(&self, target: LegacyRef) -> NativeResult<ExtensionProperties>;

  /// Full text of the object's text interface.
  fn text(&self, target: LegacyRef) -> NativeResult<Option<String>>;

  /// Replace the whole text via the editable-text interface.
  fn replace_text(&self, target: LegacyRef, text: &str) -> NativeResult<()>;
}
