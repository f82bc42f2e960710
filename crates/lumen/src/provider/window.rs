/*!
Window-manager seam.

Window enumeration and process lookup belong to the host. Providers only ask
the handful of questions below, all of which must be cheap.
*/

use crate::types::{Point, ProcessId, WindowHandle};

/// Host-supplied window and process queries.
pub trait WindowSystem: Send + Sync {
  /// The window with keyboard focus.
  fn foreground_window(&self) -> Option<WindowHandle>;

  /// Top-most window under a screen point.
  fn window_at_point(&self, point: Point) -> Option<WindowHandle>;

  /// Window class name.
  fn class_name(&self, window: WindowHandle) -> Option<String>;

  /// Owning process of a window.
  fn process_id(&self, window: WindowHandle) -> Option<ProcessId>;

  /// Whether any process with this executable name is running.
  fn is_process_running(&self, image_name: &str) -> bool;
}

/// Window classes that host browser documents.
pub(crate) const BROWSER_WINDOW_CLASSES: &[&str] = &[
  "MozillaWindowClass",
  "Chrome_RenderWidgetHostHWND",
  "Chrome_WidgetWin_1",
];

pub(crate) fn is_browser_class(class_name: &str) -> bool {
  BROWSER_WINDOW_CLASSES.contains(&class_name)
}
