use anyhow::{Context as AnyhowContext, Result};
use critique_protocol::InboundCommand;
use serde::Deserialize;
use serde_json::Value;

const SELECTION_CHANGE: &str = "selection-change";

/// One line of the `serve` input stream.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The host selection now consists of these node ids
    SelectionChange { ids: Vec<String> },
    Command(InboundCommand),
}

#[derive(Deserialize)]
struct SelectionChangeLine {
    #[serde(default)]
    ids: Vec<String>,
}

impl HostEvent {
    pub fn parse(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line).context("event is not JSON")?;
        if value.get("type").and_then(Value::as_str) == Some(SELECTION_CHANGE) {
            let change: SelectionChangeLine =
                serde_json::from_value(value).context("invalid selection-change event")?;
            return Ok(Self::SelectionChange { ids: change.ids });
        }
        let command = serde_json::from_value(value).context("unknown command")?;
        Ok(Self::Command(command))
    }
}
