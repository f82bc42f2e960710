/*!
Provider-agnostic accessibility vocabulary.

These types are decoupled from the native APIs and represent the canonical
semantic model every provider maps onto.
*/

mod landmark;
mod role;
mod state;

pub use landmark::Landmark;
pub use role::Role;
pub use state::StateSet;
