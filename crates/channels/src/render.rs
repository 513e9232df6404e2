//! Turn rendering for text surfaces.

use routechat_core::message::{Message, Role};

/// One transcript line, labeled by role. Tool results name their tool.
pub fn render_turn(turn: &Message) -> String {
    match (turn.role, &turn.in_reply_to) {
        (Role::Tool, Some(call)) => format!("tool ({}): {}", call.name, turn.content),
        (role, _) => format!("{}: {}", role.label(), turn.content),
    }
}

/// The question/answer pair shown right after a reply arrives.
///
/// Display only; the transcript keeps the raw turns.
pub fn render_exchange(question: &str, answer: &str) -> String {
    format!("Q: {question}\n\nA: {answer}")
}
