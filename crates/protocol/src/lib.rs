//! Wire types exchanged between the design host, the critique pipeline and the
//! remote analysis service.
//!
//! Everything here is plain data: serialization shape is the contract, and
//! field names follow the camelCase JSON the remote side and the UI expect.

use anyhow::Result;
use serde::Serialize;

mod context;
mod critique;
mod envelope;
mod messages;
mod node;

pub use context::{AnalysisContext, Complexity, DesignType};
pub use critique::{parse_critique, AnalysisResult, ParsedCritique, Violation};
pub use envelope::{AnalysisRequest, RemoteEnvelope};
pub use messages::{FrameSummary, InboundCommand, OutboundMessage};
pub use node::{LayoutMode, NodeType, SerializedNode};

pub const SCHEMA_VERSION: u32 = 1;

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// JSON schemas for every type that crosses a process boundary.
pub fn wire_schemas() -> Result<serde_json::Value> {
    let mut schemas = serde_json::Map::new();
    schemas.insert(
        "schemaVersion".to_string(),
        serde_json::Value::from(SCHEMA_VERSION),
    );
    schemas.insert(
        "AnalysisRequest".to_string(),
        serde_json::to_value(schemars::schema_for!(AnalysisRequest))?,
    );
    schemas.insert(
        "InboundCommand".to_string(),
        serde_json::to_value(schemars::schema_for!(InboundCommand))?,
    );
    schemas.insert(
        "OutboundMessage".to_string(),
        serde_json::to_value(schemars::schema_for!(OutboundMessage))?,
    );
    schemas.insert(
        "Violation".to_string(),
        serde_json::to_value(schemars::schema_for!(Violation))?,
    );
    Ok(serde_json::Value::Object(schemas))
}
