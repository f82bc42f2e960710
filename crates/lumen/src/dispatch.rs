/*!
Provider dispatch.

The [`Dispatcher`] is the session object: it owns the window-system seam, the
providers in priority order, the per-application filter chain, and the event
channel. Nothing here is global; hosts build one and pass it around.

Resolution walks the providers most specific first. A provider is skipped
when it reports itself unavailable (without being initialized), when it fails
to initialize, or when it does not own the target window. A provider that
owns the window but resolves nothing hands over to the next one. There is no
other retry.

# Example

```ignore
let dispatcher = Dispatcher::builder()
    .windows(host_windows)
    .tree(uia_binding)
    .legacy(msaa_binding)
    .filter(|mut obj: AccessibleObject| {
        obj.name = obj.name.map(|n| n.trim().to_owned());
        obj
    })
    .build()?;

let mut events = dispatcher.subscribe();
dispatcher.start_listening();
if let Some(focused) = dispatcher.resolve_focused() {
    println!("{}", focused.announcement());
}
```
*/

use std::sync::Arc;

use async_broadcast::{InactiveReceiver, Receiver, Sender};

use crate::config::SessionConfig;
use crate::object::{AccessibleObject, NativeHandle};
use crate::provider::{
  BridgeBinding, BridgeProvider, EventSink, ExtensionBinding, ExtensionProvider, LegacyBinding,
  LegacyProvider, Provider, TreeBinding, TreeProvider, WindowSystem,
};
use crate::types::{LumenError, LumenResult, Point, ProviderEvent, WindowHandle};

/// Post-processing hook for canonical objects (per-application overrides).
///
/// Filters are pure: they may rewrite the object they are given but must not
/// touch provider state.
pub trait ObjectFilter: Send + Sync {
  fn apply(&self, object: AccessibleObject) -> AccessibleObject;
}

impl<F> ObjectFilter for F
where
  F: Fn(AccessibleObject) -> AccessibleObject + Send + Sync,
{
  fn apply(&self, object: AccessibleObject) -> AccessibleObject {
    self(object)
  }
}

/// Ordered list of filters. Cheap to clone.
#[derive(Clone, Default)]
pub struct FilterChain {
  filters: Vec<Arc<dyn ObjectFilter>>,
}

impl std::fmt::Debug for FilterChain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FilterChain").field("len", &self.filters.len()).finish()
  }
}

impl FilterChain {
  pub fn push(&mut self, filter: Arc<dyn ObjectFilter>) {
    self.filters.push(filter);
  }

  pub fn len(&self) -> usize {
    self.filters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.filters.is_empty()
  }

  /// Run the object through every filter in insertion order.
  pub fn apply(&self, object: AccessibleObject) -> AccessibleObject {
    self.filters.iter().fold(object, |obj, filter| filter.apply(obj))
  }
}

/// Builder for a [`Dispatcher`].
///
/// Built-in providers are created for whichever bindings are supplied and
/// ordered bridge, extension, tree, legacy. Providers added with
/// [`provider`](Self::provider) follow them in insertion order.
#[derive(Default)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct DispatcherBuilder {
  windows: Option<Arc<dyn WindowSystem>>,
  tree: Option<Arc<dyn TreeBinding>>,
  legacy: Option<Arc<dyn LegacyBinding>>,
  extension: Option<Arc<dyn ExtensionBinding>>,
  bridge: Option<Arc<dyn BridgeBinding>>,
  extra: Vec<Arc<dyn Provider>>,
  filters: FilterChain,
  config: SessionConfig,
}

impl std::fmt::Debug for DispatcherBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DispatcherBuilder")
      .field("config", &self.config)
      .field("filters", &self.filters)
      .finish_non_exhaustive()
  }
}

impl DispatcherBuilder {
  /// The host window manager. Required.
  pub fn windows(mut self, windows: Arc<dyn WindowSystem>) -> Self {
    self.windows = Some(windows);
    self
  }

  pub fn tree(mut self, binding: Arc<dyn TreeBinding>) -> Self {
    self.tree = Some(binding);
    self
  }

  pub fn legacy(mut self, binding: Arc<dyn LegacyBinding>) -> Self {
    self.legacy = Some(binding);
    self
  }

  pub fn extension(mut self, binding: Arc<dyn ExtensionBinding>) -> Self {
    self.extension = Some(binding);
    self
  }

  pub fn bridge(mut self, binding: Arc<dyn BridgeBinding>) -> Self {
    self.bridge = Some(binding);
    self
  }

  /// Append a custom provider after the built-in ones.
  pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
    self.extra.push(provider);
    self
  }

  /// Append a post-processing filter.
  pub fn filter(mut self, filter: impl ObjectFilter + 'static) -> Self {
    self.filters.push(Arc::new(filter));
    self
  }

  pub fn config(mut self, config: SessionConfig) -> Self {
    self.config = config;
    self
  }

  pub fn build(self) -> LumenResult<Dispatcher> {
    self.config.validate()?;
    let windows = self
      .windows
      .ok_or_else(|| LumenError::InvalidConfig("a window system is required".into()))?;

    let mut providers: Vec<Arc<dyn Provider>> = Vec::new();
    if let Some(binding) = self.bridge {
      providers.push(BridgeProvider::new(
        binding,
        Arc::clone(&windows),
        self.config.availability_timeout_duration(),
      ));
    }
    if let Some(binding) = self.extension {
      providers.push(ExtensionProvider::new(binding, Arc::clone(&windows)));
    }
    if let Some(binding) = self.tree {
      providers.push(TreeProvider::new(binding, Arc::clone(&windows)));
    }
    if let Some(binding) = self.legacy {
      providers.push(LegacyProvider::new(binding, Arc::clone(&windows)));
    }
    providers.extend(self.extra);

    if providers.is_empty() {
      log::warn!("Dispatcher built without providers; every resolution will return None");
    }

    let (mut tx, rx) = async_broadcast::broadcast(self.config.event_capacity);
    tx.set_overflow(true); // Drop oldest messages when full

    Ok(Dispatcher {
      windows,
      providers,
      filters: self.filters,
      events_tx: tx,
      events_keepalive: rx.deactivate(),
    })
  }
}

/// Routes resolution requests to the provider that owns the target.
pub struct Dispatcher {
  windows: Arc<dyn WindowSystem>,
  providers: Vec<Arc<dyn Provider>>,
  filters: FilterChain,
  events_tx: Sender<ProviderEvent>,
  events_keepalive: InactiveReceiver<ProviderEvent>,
}

impl std::fmt::Debug for Dispatcher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let kinds: Vec<_> = self.providers.iter().map(|p| p.kind()).collect();
    f.debug_struct("Dispatcher")
      .field("providers", &kinds)
      .field("filters", &self.filters)
      .finish_non_exhaustive()
  }
}

impl Dispatcher {
  pub fn builder() -> DispatcherBuilder {
    DispatcherBuilder::default()
  }

  /// Providers in dispatch order.
  pub fn providers(&self) -> &[Arc<dyn Provider>] {
    &self.providers
  }

  /// Providers that are available and initialized, checked lazily in order.
  fn ready(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
    self.providers.iter().filter(|provider| {
      if !provider.is_available() {
        log::trace!("[{}] unavailable, skipping", provider.kind());
        return false;
      }
      if !provider.initialize() {
        log::warn!("[{}] failed to initialize, skipping", provider.kind());
        return false;
      }
      true
    })
  }

  fn chain(
    &self,
    window: WindowHandle,
    resolve: impl Fn(&dyn Provider) -> Option<AccessibleObject>,
  ) -> Option<AccessibleObject> {
    for provider in self.ready() {
      if !provider.owns_window(window) {
        continue;
      }
      if let Some(object) = resolve(provider.as_ref()) {
        return Some(self.filters.apply(object));
      }
      log::debug!("[{}] owns {window} but resolved nothing, trying next", provider.kind());
    }
    None
  }

  /// The OS-reported focused element.
  pub fn resolve_focused(&self) -> Option<AccessibleObject> {
    if let Some(window) = self.windows.foreground_window() {
      return self.chain(window, |provider| provider.resolve_focused());
    }
    log::debug!("No foreground window, asking providers directly");
    self
      .ready()
      .find_map(|provider| provider.resolve_focused())
      .map(|object| self.filters.apply(object))
  }

  /// The element under a screen point.
  pub fn resolve_at_point(&self, point: Point) -> Option<AccessibleObject> {
    let Some(window) = self.windows.window_at_point(point) else {
      log::debug!("No window at ({}, {})", point.x, point.y);
      return None;
    };
    self.chain(window, |provider| provider.resolve_at_point(point))
  }

  /// The root element of a window.
  pub fn resolve_at_window(&self, window: WindowHandle) -> Option<AccessibleObject> {
    self.chain(window, |provider| provider.resolve_at_window(window))
  }

  /// The first ready provider that owns a window.
  pub fn provider_for_window(&self, window: WindowHandle) -> Option<Arc<dyn Provider>> {
    self.ready().find(|provider| provider.owns_window(window)).cloned()
  }

  /// The provider that understands a native handle, without resolving it.
  pub fn provider_for_node(&self, handle: &NativeHandle) -> Option<Arc<dyn Provider>> {
    self
      .providers
      .iter()
      .find(|provider| provider.supports_node(handle))
      .cloned()
  }

  /// Subscribe to canonical events from every listening provider.
  pub fn subscribe(&self) -> Receiver<ProviderEvent> {
    self.events_keepalive.activate_cloned()
  }

  /// Start native event delivery on every initialized provider.
  /// Returns how many providers are listening.
  pub fn start_listening(&self) -> usize {
    self
      .providers
      .iter()
      .filter(|provider| provider.is_initialized())
      .filter(|provider| {
        let sink = EventSink::new(self.events_tx.clone(), self.filters.clone());
        let started = provider.start_listening(sink);
        if !started {
          log::warn!("[{}] could not start listening", provider.kind());
        }
        started
      })
      .count()
  }

  pub fn stop_listening(&self) {
    for provider in &self.providers {
      provider.stop_listening();
    }
  }

  /// Stop events and release every initialized provider's native bindings.
  pub fn shutdown(&self) {
    self.stop_listening();
    for provider in self.providers.iter().filter(|p| p.is_initialized()) {
      log::debug!("[{}] shutting down", provider.kind());
      provider.shutdown();
    }
  }
}
