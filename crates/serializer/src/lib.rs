//! # Critique Serializer
//!
//! Turns a live design tree into a size-capped payload for remote analysis.
//!
//! ## Architecture
//!
//! ```text
//! Host document (loosely typed JSON)
//!     │
//!     ├──> RawNode ──adapter──> DesignNode { Container | Text | Leaf }
//!     │                         (field presence checked once, here)
//!     │
//!     └──> TreeSerializer + TraversalBudget
//!          ├─> depth cap      (over-depth subtrees are dropped)
//!          ├─> fan-out cap    (first N children, original order)
//!          ├─> node budget    (shared across all frames of one request)
//!          └─> SerializedNode[]
//! ```
//!
//! The projection is lossy on purpose: only identity, geometry, visibility,
//! text and non-default layout survive.
//!
//! ## Example
//!
//! ```rust
//! use critique_serializer::{DesignNode, SerializerConfig, TreeSerializer};
//!
//! let frame = DesignNode::container("1:1", "Login", critique_protocol::NodeType::Frame)
//!     .with_child(DesignNode::text("1:2", "Title", "Sign in"));
//!
//! let serializer = TreeSerializer::new(SerializerConfig::default());
//! let payload = serializer.serialize(&frame).unwrap();
//! assert_eq!(payload.children[0].text.as_deref(), Some("Sign in"));
//! ```

mod adapter;
mod budget;
mod config;
mod error;
mod node;
mod serializer;

pub use adapter::{parse_document, RawNode};
pub use budget::TraversalBudget;
pub use config::SerializerConfig;
pub use error::{AdapterError, Result};
pub use node::{DesignNode, NodeKind, NodeStyle};
pub use serializer::TreeSerializer;
