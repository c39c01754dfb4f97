pub mod conversation_store;
pub mod seller_registry;

pub use conversation_store::{ConversationStore, InMemoryConversationStore};
pub use seller_registry::{InMemorySellerRegistry, SellerRegistry};
