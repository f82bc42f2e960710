/*! Core value types shared by providers, the dispatcher and the buffer. */

#![allow(missing_docs)]

mod error;
mod event;
mod geometry;
mod ids;
mod range;

pub use error::{status, LumenError, LumenResult, NativeError, NativeResult};
pub(crate) use error::log_native;
pub use event::{EventKind, ProviderEvent};
pub use geometry::{Bounds, Point};
pub use ids::{ApiKind, NativeToken, NodeId, ProcessId, WindowHandle};
pub use range::TextRange;
