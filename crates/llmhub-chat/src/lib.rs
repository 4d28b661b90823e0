//! Provider dispatch and session state.
//!
//! Normalizes stateless, history-bearing and multimodal LLM providers behind
//! one `(message, history, images) -> (reply, history)` contract, keeps
//! per-session conversation history, and routes the `news` pseudo-provider
//! to the headline lookup.

pub mod dispatcher;
pub mod failure;
pub mod normalize;
pub mod providers;
pub mod store;
pub mod types;

pub use dispatcher::Dispatcher;
pub use failure::ProviderFailure;
pub use providers::{Adapter, Generation};
pub use store::ConversationStore;
pub use types::*;
