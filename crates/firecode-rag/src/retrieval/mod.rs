//! Query-time retrieval over a built index

pub mod retriever;

pub use retriever::{CancelToken, Retriever};
