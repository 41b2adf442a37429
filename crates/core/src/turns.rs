//! Conversational turn extraction.
//!
//! Segments a flat transcript into `(user, assistant)` exchanges using
//! message positions only. There are no thread or session ids to lean on.
//!
//! Rules:
//! - a message whose extracted text is empty is inert,
//! - messages with an unknown role are inert,
//! - a user message opens a pending turn, closing the previous one if it
//!   has a reply,
//! - an assistant message sets (or overwrites) the pending turn's reply,
//! - a pending turn that never got a reply is superseded by the next user
//!   message, and dropped at the end of the scan.

use serde::{Deserialize, Serialize};

use crate::message::{Message, Role};

/// One user-message/assistant-reply exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub assistant: String,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

#[derive(Default)]
struct PendingTurn {
    user: String,
    reply: Option<String>,
}

impl PendingTurn {
    fn close(self) -> Option<ConversationTurn> {
        self.reply.map(|assistant| ConversationTurn {
            user: self.user,
            assistant,
        })
    }
}

/// Extract every complete turn from a transcript, in order.
pub fn extract_turns(messages: &[Message]) -> Vec<ConversationTurn> {
    let mut turns = Vec::new();
    let mut pending: Option<PendingTurn> = None;

    for msg in messages {
        let text = msg.text();
        if text.is_empty() {
            continue;
        }

        match msg.role {
            Role::User => {
                if let Some(turn) = pending.take().and_then(PendingTurn::close) {
                    turns.push(turn);
                }
                pending = Some(PendingTurn {
                    user: text,
                    reply: None,
                });
            }
            Role::Assistant => {
                if let Some(turn) = pending.as_mut() {
                    turn.reply = Some(text);
                }
            }
            Role::Unknown => {}
        }
    }

    if let Some(turn) = pending.and_then(PendingTurn::close) {
        turns.push(turn);
    }

    turns
}

/// The most recent exchange: the last user message with text, paired with
/// the first assistant message with text that follows it.
///
/// The scan after the user message runs until the first assistant reply.
/// Since the anchor is the *last* user message with text, any user message
/// after it is empty and inert, so it never cuts the scan short.
pub fn latest_turn(messages: &[Message]) -> Option<ConversationTurn> {
    let (user_idx, user_text) = messages.iter().enumerate().rev().find_map(|(i, m)| {
        if m.role != Role::User {
            return None;
        }
        let text = m.text();
        (!text.is_empty()).then_some((i, text))
    })?;

    messages[user_idx + 1..]
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(Message::text)
        .find(|text| !text.is_empty())
        .map(|assistant| ConversationTurn {
            user: user_text,
            assistant,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ContentBlock;

    fn user(t: &str) -> Message {
        Message::user(t)
    }

    fn assistant(t: &str) -> Message {
        Message::assistant(t)
    }

    fn system(t: &str) -> Message {
        Message {
            role: Role::Unknown,
            ..Message::user(t)
        }
    }

    #[test]
    fn pairs_alternating_messages() {
        let turns = extract_turns(&[user("hi"), assistant("hello"), user("bye"), assistant("later")]);
        assert_eq!(
            turns,
            vec![
                ConversationTurn::new("hi", "hello"),
                ConversationTurn::new("bye", "later"),
            ]
        );
    }

    #[test]
    fn second_user_message_supersedes_unanswered_one() {
        let turns = extract_turns(&[user("a"), user("b"), assistant("c")]);
        assert_eq!(turns, vec![ConversationTurn::new("b", "c")]);
    }

    #[test]
    fn later_assistant_message_overwrites_reply() {
        let turns = extract_turns(&[user("q"), assistant("draft"), assistant("final")]);
        assert_eq!(turns, vec![ConversationTurn::new("q", "final")]);
    }

    #[test]
    fn degenerate_transcripts_yield_nothing() {
        assert!(extract_turns(&[]).is_empty());
        assert!(extract_turns(&[user("a"), user("b")]).is_empty());
        assert!(extract_turns(&[assistant("a"), assistant("b")]).is_empty());
    }

    #[test]
    fn assistant_before_any_user_is_ignored() {
        let turns = extract_turns(&[assistant("welcome"), user("hi"), assistant("hello")]);
        assert_eq!(turns, vec![ConversationTurn::new("hi", "hello")]);
    }

    #[test]
    fn empty_and_unknown_messages_are_inert() {
        let turns = extract_turns(&[
            user("question"),
            user(""),
            system("you are helpful"),
            Message::with_blocks(Role::Assistant, vec![ContentBlock::Other]),
            assistant("answer"),
        ]);
        assert_eq!(turns, vec![ConversationTurn::new("question", "answer")]);
    }

    #[test]
    fn block_content_is_joined() {
        let turns = extract_turns(&[
            Message::with_blocks(
                Role::User,
                vec![ContentBlock::text("line one"), ContentBlock::text("line two")],
            ),
            assistant("ok"),
        ]);
        assert_eq!(turns[0].user, "line one\nline two");
    }

    #[test]
    fn turn_count_never_exceeds_user_messages() {
        let transcripts = vec![
            vec![user("a"), assistant("b"), assistant("c"), user("d")],
            vec![user("a"), user("b"), user("c"), assistant("d")],
            vec![assistant("a"), user("b"), assistant("c"), user("d"), assistant("e")],
            vec![system("x"), user(""), assistant("y")],
        ];
        for transcript in transcripts {
            let users = transcript
                .iter()
                .filter(|m| m.role == Role::User && !m.text().is_empty())
                .count();
            assert!(extract_turns(&transcript).len() <= users);
        }
    }

    #[test]
    fn extraction_does_not_touch_input() {
        let transcript = vec![user("hi"), assistant("hello")];
        let before = transcript.clone();
        let _ = extract_turns(&transcript);
        assert_eq!(transcript, before);
    }

    #[test]
    fn latest_turn_pairs_last_user_with_following_reply() {
        let turn = latest_turn(&[user("old"), assistant("old reply"), user("new"), assistant("new reply")]);
        assert_eq!(turn, Some(ConversationTurn::new("new", "new reply")));
    }

    #[test]
    fn latest_turn_uses_last_of_consecutive_users() {
        let turn = latest_turn(&[user("a"), user("b"), assistant("c")]);
        assert_eq!(turn, Some(ConversationTurn::new("b", "c")));
    }

    #[test]
    fn latest_turn_scans_past_empty_user_message() {
        let turn = latest_turn(&[user("question"), user(""), system("note"), assistant("answer")]);
        assert_eq!(turn, Some(ConversationTurn::new("question", "answer")));
    }

    #[test]
    fn latest_turn_does_not_reach_back_before_the_anchor() {
        // The reply belongs to the earlier question; the newest question is unanswered.
        let turn = latest_turn(&[user("first"), assistant("reply"), user("second")]);
        assert_eq!(turn, None);
    }

    #[test]
    fn latest_turn_skips_empty_assistant_messages() {
        let turn = latest_turn(&[
            user("q"),
            Message::with_blocks(Role::Assistant, vec![ContentBlock::Other]),
            assistant("a"),
        ]);
        assert_eq!(turn, Some(ConversationTurn::new("q", "a")));
    }

    #[test]
    fn latest_turn_absent_for_degenerate_transcripts() {
        assert_eq!(latest_turn(&[]), None);
        assert_eq!(latest_turn(&[user("a"), user("b")]), None);
        assert_eq!(latest_turn(&[assistant("a")]), None);
    }
}
