/*!
Lumen - screen-reader core over heterogeneous accessibility APIs

Every native API (tree, legacy, extension, bridge) is wrapped by a provider that
maps its elements into one [`AccessibleObject`] shape. The [`Dispatcher`] picks
the provider that owns a window, and a [`VirtualBuffer`] flattens a document
into navigable text.

```ignore
use lumen::{Dispatcher, NavType, VirtualBuffer, BufferConfig};

let dispatcher = Dispatcher::builder()
  .windows(windows)
  .tree(tree_binding)
  .legacy(legacy_binding)
  .build()?;

let focused = dispatcher.resolve_focused().ok_or("nothing focused")?;
println!("{}", focused.announcement());

let buffer = VirtualBuffer::new(BufferConfig::default())?;
buffer.load_document(&focused)?;
if let Some(heading) = buffer.find_next_by_type("h".parse()?, buffer.caret_offset()) {
  buffer.move_to_node(heading.id)?;
}

// Provider events, after filters
dispatcher.start_listening();
let mut events = dispatcher.subscribe();
while let Ok(event) = events.recv().await {
  // handle event
}
dispatcher.shutdown();
```
*/

mod config;
mod dispatch;
mod object;
mod types;

pub mod a11y;
pub mod buffer;
pub mod provider;

#[cfg(test)]
mod testing;

pub use types::*;

pub use crate::buffer::{BufferNode, BufferSnapshot, LoadHandle, NavType, VirtualBuffer};
pub use crate::config::{BufferConfig, SessionConfig};
pub use crate::dispatch::{Dispatcher, DispatcherBuilder, FilterChain, ObjectFilter};
pub use crate::object::{AccessibleObject, NativeHandle, ObjectId, SetPosition, CHILD_ID_SELF};
pub use crate::provider::Provider;
