pub mod chat;
pub mod core;
pub mod document;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod server;
pub mod session;
pub mod state;
