//! Graph states and mode routing.

use routechat_core::mode::Mode;
use serde::Serialize;

/// A node of the routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphState {
    Start,
    Route,
    PlainReply,
    NewsReply,
    ToolReply,
    ToolExec,
    End,
}

/// The strategy a mode selects at `Route`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Plain,
    News,
    Tools,
}

impl Branch {
    /// The state the graph enters after `Route`.
    pub fn entry(self) -> GraphState {
        match self {
            Branch::Plain => GraphState::PlainReply,
            Branch::News => GraphState::NewsReply,
            Branch::Tools => GraphState::ToolReply,
        }
    }
}

/// Pick the branch for a mode.
pub fn route(mode: Mode) -> Branch {
    match mode {
        Mode::Tools => Branch::Tools,
        Mode::News => Branch::News,
        Mode::Normal => Branch::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_an_entry_state() {
        assert_eq!(route(Mode::Normal).entry(), GraphState::PlainReply);
        assert_eq!(route(Mode::News).entry(), GraphState::NewsReply);
        assert_eq!(route(Mode::Tools).entry(), GraphState::ToolReply);
    }

    #[test]
    fn free_text_modes_fall_back_to_plain() {
        for text in ["", "NEWS!", "tool", "banana"] {
            assert_eq!(route(Mode::parse_lossy(text)), Branch::Plain, "{text:?}");
        }
    }

    #[test]
    fn states_serialize_snake_case() {
        let json = serde_json::to_string(&[GraphState::ToolExec, GraphState::End]).unwrap();
        assert_eq!(json, r#"["tool_exec","end"]"#);
    }
}
