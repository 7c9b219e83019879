//! Collaborator traits for the sales agent
//!
//! Every external dependency of the dialogue core sits behind one of
//! these traits so that backends can be swapped and faked in tests:
//!
//! ```text
//! InventoryStore     vehicle records and their embeddings
//! EmbeddingProvider  text → dense vector
//! ChatProvider       role-tagged messages → free text
//! Ranker             profile → scored recommendations
//! ```

mod chat;
mod embedding;
mod inventory;
mod ranker;

pub use chat::ChatProvider;
pub use embedding::EmbeddingProvider;
pub use inventory::InventoryStore;
pub use ranker::Ranker;
