use crate::ai::{ChatTier, GenerationResult, Operation};
use crate::app::{Effect, Snapshot};
use crate::types::{ChatMessage, Role};

#[derive(Clone, Debug)]
pub enum ChatCommand {
    SetInput(String),
    Send,
    /// Cumulative text of a streaming reply.
    Partial(String),
    Replied(GenerationResult<String>),
    ToggleLibrary,
    UsePrompt(String),
    CopyPrompt(String),
    Clear,
}

/// One chat screen. Both tiers share this state; only the reply path differs.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatState {
    pub tier: ChatTier,
    pub transcript: Vec<ChatMessage>,
    pub input: String,
    pub sending: bool,
    pub library_open: bool,
}

impl ChatState {
    pub fn new(tier: ChatTier, transcript: Vec<ChatMessage>) -> Self {
        Self {
            tier,
            transcript,
            input: String::new(),
            sending: false,
            library_open: false,
        }
    }

    fn save(&self) -> Effect {
        Effect::Save(Snapshot::Transcript(self.tier, self.transcript.clone()))
    }

    /// Distinct prompts the user has sent, latest first.
    pub fn prompt_library(&self) -> Vec<String> {
        let mut prompts: Vec<String> = Vec::new();
        for message in self.transcript.iter().filter(|m| m.role == Role::User) {
            if !prompts.contains(&message.text) {
                prompts.push(message.text.clone());
            }
        }
        prompts.reverse();
        prompts
    }

    /// The streaming placeholder, while a streamed reply is in flight.
    fn placeholder_mut(&mut self) -> Option<&mut ChatMessage> {
        if !(self.sending && self.tier.streams()) {
            return None;
        }
        self.transcript
            .last_mut()
            .filter(|last| last.role == Role::Model && !last.failed)
    }

    fn finish(&mut self, reply: ChatMessage) {
        match self.placeholder_mut() {
            Some(placeholder) => *placeholder = reply,
            None => self.transcript.push(reply),
        }
        self.sending = false;
    }

    pub fn handle(&mut self, command: ChatCommand) -> Vec<Effect> {
        match command {
            ChatCommand::SetInput(input) => {
                self.input = input;
                vec![]
            }
            ChatCommand::Send => {
                if self.input.trim().is_empty() || self.sending {
                    return vec![];
                }
                let text = std::mem::take(&mut self.input);
                let prior = self.transcript.clone();
                self.transcript.push(ChatMessage::user(text.clone()));
                if self.tier.streams() {
                    self.transcript.push(ChatMessage::model(""));
                }
                self.sending = true;
                vec![
                    self.save(),
                    Effect::Chat {
                        tier: self.tier,
                        transcript: prior,
                        text,
                    },
                ]
            }
            ChatCommand::Partial(text) => {
                if let Some(placeholder) = self.placeholder_mut()
                    && text.len() > placeholder.text.len()
                    && text.starts_with(placeholder.text.as_str())
                {
                    placeholder.text = text;
                }
                vec![]
            }
            ChatCommand::Replied(result) => {
                if !self.sending {
                    return vec![];
                }
                let reply = match result {
                    Ok(text) => ChatMessage::model(text),
                    Err(err) => {
                        tracing::warn!(tier = ?self.tier, %err, "chat turn failed");
                        ChatMessage::failure(err.user_message(Operation::Chat))
                    }
                };
                self.finish(reply);
                vec![self.save()]
            }
            ChatCommand::ToggleLibrary => {
                self.library_open = !self.library_open;
                vec![]
            }
            ChatCommand::UsePrompt(prompt) => {
                self.input = prompt;
                self.library_open = false;
                vec![]
            }
            ChatCommand::CopyPrompt(prompt) => vec![Effect::CopyToClipboard(prompt)],
            ChatCommand::Clear => {
                if self.sending {
                    return vec![];
                }
                self.transcript.clear();
                vec![self.save()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GenerationError;

    fn send(chat: &mut ChatState, text: &str) -> Vec<Effect> {
        chat.handle(ChatCommand::SetInput(text.into()));
        chat.handle(ChatCommand::Send)
    }

    #[test]
    fn sync_failure_keeps_alternation() {
        let mut chat = ChatState::new(ChatTier::Complex, vec![]);
        let effects = send(&mut chat, "hello");
        assert_eq!(effects.len(), 2);
        assert!(chat.sending);
        assert_eq!(chat.transcript.len(), 1);

        chat.handle(ChatCommand::Replied(Err(GenerationError::Transport(
            "offline".into(),
        ))));
        let roles: Vec<Role> = chat.transcript.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model]);
        assert_eq!(chat.transcript[1].text, "Error: offline");
        assert!(chat.transcript[1].failed);
    }

    #[test]
    fn streaming_placeholder_grows_monotonically() {
        let mut chat = ChatState::new(ChatTier::Fast, vec![]);
        send(&mut chat, "count");
        assert_eq!(chat.transcript.last().unwrap().text, "");

        chat.handle(ChatCommand::Partial("one".into()));
        chat.handle(ChatCommand::Partial("one two".into()));
        chat.handle(ChatCommand::Partial("one".into()));
        chat.handle(ChatCommand::Partial("something else".into()));
        assert_eq!(chat.transcript.last().unwrap().text, "one two");

        chat.handle(ChatCommand::Replied(Ok("one two three".into())));
        assert_eq!(chat.transcript.len(), 2);
        assert_eq!(chat.transcript[1].text, "one two three");
        assert!(!chat.sending);
    }

    #[test]
    fn streaming_failure_replaces_placeholder() {
        let mut chat = ChatState::new(ChatTier::Fast, vec![]);
        send(&mut chat, "q");
        chat.handle(ChatCommand::Partial("partial ans".into()));
        chat.handle(ChatCommand::Replied(Err(GenerationError::Transport(
            "stream reset".into(),
        ))));
        assert_eq!(chat.transcript.len(), 2);
        assert_eq!(chat.transcript[1].text, "Error: stream reset");
        assert!(chat.transcript[1].failed);
    }

    #[test]
    fn blank_or_concurrent_sends_are_ignored() {
        let mut chat = ChatState::new(ChatTier::Complex, vec![]);
        assert!(send(&mut chat, "  ").is_empty());
        send(&mut chat, "first");
        assert!(send(&mut chat, "second").is_empty());
        assert_eq!(chat.transcript.len(), 1);
    }

    #[test]
    fn sent_text_keeps_its_indentation() {
        let mut chat = ChatState::new(ChatTier::Complex, vec![]);
        let pasted = "    fn main() {}\n";
        let effects = send(&mut chat, pasted);
        assert_eq!(chat.transcript[0].text, pasted);
        assert!(chat.input.is_empty());
        assert!(effects.iter().any(|effect| matches!(
            effect,
            Effect::Chat { text, .. } if text == pasted
        )));
    }

    #[test]
    fn library_is_unique_latest_first() {
        let transcript = vec![
            ChatMessage::user("a"),
            ChatMessage::model("1"),
            ChatMessage::user("b"),
            ChatMessage::model("2"),
            ChatMessage::user("a"),
            ChatMessage::model("3"),
            ChatMessage::user("c"),
            ChatMessage::model("4"),
        ];
        let chat = ChatState::new(ChatTier::Complex, transcript);
        assert_eq!(chat.prompt_library(), vec!["c", "b", "a"]);
    }

    #[test]
    fn using_a_prompt_closes_library() {
        let mut chat = ChatState::new(ChatTier::Fast, vec![]);
        chat.handle(ChatCommand::ToggleLibrary);
        chat.handle(ChatCommand::UsePrompt("again".into()));
        assert_eq!(chat.input, "again");
        assert!(!chat.library_open);
    }
}
