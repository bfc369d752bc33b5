//! Cross-context synchronization
//!
//! Several execution contexts share one store. Each write is followed by a
//! [`shared::message::ChangeEvent`] on the [`ChangeBus`]; contexts apply
//! events for keys they watch and ignore their own. Last write observed wins.

mod bus;
mod context;
pub mod keys;
mod view;

pub use bus::{ChangeBus, DEFAULT_CHANNEL_CAPACITY};
pub use context::{ChangeCallback, ListenerId, StoreContext};
pub use view::CollectionView;
