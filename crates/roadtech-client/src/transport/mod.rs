//! HTTP transport adapters: reqwest against the real backend, scripted
//! in-memory for tests and offline development.

mod memory;
mod reqwest;

pub use memory::MemoryTransport;
pub use reqwest::ReqwestTransport;
