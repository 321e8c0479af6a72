use super::chat::{build_messages, ChatMessage, ChatRole, CodeContext, CompletionRequest};
use super::provider::{display_model, Provider};
use crate::content::{language_for, FileBody};
use crate::credentials::Credentials;
use crate::error::{FetchError, FetchResult};

pub const APOLOGY: &str = "Sorry, there was an error processing your request.";

// ── Message types ──

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageRole {
    User,
    Assistant,
    /// Local note shown in the transcript but never sent
    Note,
}

#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub role: MessageRole,
    pub text: String,
    pub timestamp: String,
}

impl ChatEntry {
    fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: chrono::Local::now().format("%H:%M").to_string(),
        }
    }
}

/// A request handed to a worker, tagged with the transcript epoch it belongs to
#[derive(Debug, Clone)]
pub struct PendingChat {
    pub epoch: u64,
    pub request: CompletionRequest,
}

// ── Session state ──

/// The chat panel's transcript and composer. Reset whenever the open file
/// changes; replies from an older epoch are dropped.
pub struct ChatSession {
    pub provider: Provider,
    pub model: String,
    pub entries: Vec<ChatEntry>,
    pub input: String,
    pub scroll: u16,
    pub waiting: bool,
    epoch: u64,
    file_path: Option<String>,
    context: Option<CodeContext>,
}

pub fn greeting(provider: Provider) -> String {
    format!(
        "Hello I am your assistant from {}, I am here to answer your questions!",
        provider.name()
    )
}

pub fn expand_slash_command(input: &str) -> Option<String> {
    match input.trim() {
        "/explain" => Some("Explain what this file does and how its main parts work.".into()),
        "/review" => Some("Review this code. What would you change and why?".into()),
        "/bugs" | "/bug" => Some("What could go wrong in this code? Any bugs or edge cases?".into()),
        "/test" => Some("Write unit tests for this code.".into()),
        "/suggest" => Some("Suggest improvements to this code.".into()),
        _ => None,
    }
}

impl ChatSession {
    pub fn new(provider: Provider, model: &str) -> Self {
        let model = if provider.offers_model(model) {
            model.to_string()
        } else {
            provider.default_model().to_string()
        };
        Self {
            provider,
            model,
            entries: vec![ChatEntry::new(MessageRole::Assistant, greeting(provider))],
            input: String::new(),
            scroll: 0,
            waiting: false,
            epoch: 0,
            file_path: None,
            context: None,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn context(&self) -> Option<&CodeContext> {
        self.context.as_ref()
    }

    /// Start a fresh transcript, invalidating any reply still in flight
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.entries = vec![ChatEntry::new(MessageRole::Assistant, greeting(self.provider))];
        self.scroll = 0;
        self.waiting = false;
    }

    /// Track the open file. A different path resets the transcript; the same
    /// path only refreshes the code context.
    pub fn set_file(&mut self, file: Option<(&str, &str, &FileBody)>) {
        let path = file.map(|(_, path, _)| path.to_string());
        if path != self.file_path {
            self.reset();
            self.file_path = path;
        }
        self.context = file.map(|(name, _, body)| CodeContext {
            code: body.as_context_text().to_string(),
            language: language_for(name).to_string(),
        });
    }

    pub fn cycle_provider(&mut self) {
        self.provider = self.provider.next();
        self.model = self.provider.default_model().to_string();
        self.note_model();
    }

    pub fn cycle_model(&mut self) {
        self.model = self.provider.next_model(&self.model).to_string();
        self.note_model();
    }

    fn note_model(&mut self) {
        let text = format!("Using {} ({})", self.provider.name(), display_model(&self.model));
        self.entries.push(ChatEntry::new(MessageRole::Note, text));
    }

    /// Messages sent to the provider: notes are local only
    fn transcript(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .filter_map(|e| match e.role {
                MessageRole::User => Some(ChatMessage::new(ChatRole::User, e.text.clone())),
                MessageRole::Assistant => {
                    Some(ChatMessage::new(ChatRole::Assistant, e.text.clone()))
                }
                MessageRole::Note => None,
            })
            .collect()
    }

    /// Turn the composer's text into a request. `Ok(None)` when there is
    /// nothing to send; a missing key leaves the input in place.
    pub fn submit(&mut self, creds: &Credentials) -> FetchResult<Option<PendingChat>> {
        let text = self.input.trim().to_string();
        if text.is_empty() || self.waiting {
            return Ok(None);
        }
        let api_key = creds.api_key(self.provider).ok_or_else(|| {
            FetchError::MissingCredential(format!("{}'s API key", self.provider.name()))
        })?;

        let prompt = expand_slash_command(&text).unwrap_or(text);
        self.entries.push(ChatEntry::new(MessageRole::User, prompt));
        self.input.clear();
        self.waiting = true;

        Ok(Some(PendingChat {
            epoch: self.epoch,
            request: CompletionRequest {
                provider: self.provider,
                model: self.model.clone(),
                api_key: api_key.to_string(),
                messages: build_messages(&self.transcript(), self.context.as_ref()),
            },
        }))
    }

    /// Record a reply. Returns false when it belongs to an older transcript.
    pub fn apply_reply(&mut self, epoch: u64, reply: FetchResult<String>) -> bool {
        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, "dropping reply for reset transcript");
            return false;
        }
        self.waiting = false;
        let text = match reply {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), "chat failed: {e}");
                APOLOGY.to_string()
            }
        };
        self.entries.push(ChatEntry::new(MessageRole::Assistant, text));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds_with_key(provider: Provider) -> Credentials {
        let mut c = Credentials::default();
        c.set(provider.credential_key(), "sk-test");
        c
    }

    fn text_file(body: &str) -> FileBody {
        FileBody::Text(body.to_string())
    }

    #[test]
    fn starts_with_greeting_and_valid_model() {
        let s = ChatSession::new(Provider::OpenAi, "not-a-model");
        assert_eq!(s.model, "gpt-4-turbo");
        assert_eq!(s.entries.len(), 1);
        assert!(s.entries[0].text.contains("OpenAI"));
    }

    #[test]
    fn empty_input_is_ignored() {
        let mut s = ChatSession::new(Provider::OpenAi, "gpt-4o");
        s.input = "   ".into();
        assert!(s.submit(&Credentials::default()).unwrap().is_none());
        assert_eq!(s.entries.len(), 1);
    }

    #[test]
    fn missing_key_is_reported_without_touching_transcript() {
        let mut s = ChatSession::new(Provider::Gemini, "gemini-1.5-pro");
        s.input = "hi".into();
        let err = s.submit(&creds_with_key(Provider::OpenAi)).unwrap_err();
        assert!(matches!(err, FetchError::MissingCredential(_)));
        assert_eq!(err.to_string(), "Gemini's API key is not set");
        assert_eq!(s.input, "hi");
        assert!(!s.waiting);
        assert_eq!(s.entries.len(), 1);
    }

    #[test]
    fn submit_builds_request_with_context() {
        let mut s = ChatSession::new(Provider::OpenAi, "gpt-4o");
        let body = text_file("print('hi')");
        s.set_file(Some(("app.py", "src/app.py", &body)));
        s.input = "/explain".into();

        let pending = s.submit(&creds_with_key(Provider::OpenAi)).unwrap().unwrap();
        assert!(s.waiting);
        assert!(s.input.is_empty());
        assert_eq!(pending.request.model, "gpt-4o");
        assert_eq!(pending.request.api_key, "sk-test");

        let msgs = &pending.request.messages;
        // system, greeting, user question, code
        assert_eq!(msgs.len(), 4);
        assert!(msgs[2].content.starts_with("Explain what this file does"));
        assert!(msgs[3].content.starts_with("This is the code:\n```python\n"));
    }

    #[test]
    fn notes_are_not_sent() {
        let mut s = ChatSession::new(Provider::DeepSeek, "deepseek-chat");
        s.cycle_model();
        assert_eq!(s.model, "deepseek-reasoner");
        s.input = "q".into();
        let pending = s.submit(&creds_with_key(Provider::DeepSeek)).unwrap().unwrap();
        assert!(pending.request.messages.iter().all(|m| !m.content.starts_with("Using ")));
    }

    #[test]
    fn reply_and_failure_are_appended() {
        let mut s = ChatSession::new(Provider::OpenAi, "gpt-4o");
        s.input = "q".into();
        let p = s.submit(&creds_with_key(Provider::OpenAi)).unwrap().unwrap();
        assert!(s.apply_reply(p.epoch, Ok("answer".into())));
        assert_eq!(s.entries.last().unwrap().text, "answer");
        assert!(!s.waiting);

        s.input = "again".into();
        let p = s.submit(&creds_with_key(Provider::OpenAi)).unwrap().unwrap();
        assert!(s.apply_reply(p.epoch, Err(FetchError::EmptyReply)));
        assert_eq!(s.entries.last().unwrap().text, APOLOGY);
        assert_eq!(s.entries.last().unwrap().role, MessageRole::Assistant);
    }

    #[test]
    fn reply_after_file_change_is_dropped() {
        let mut s = ChatSession::new(Provider::OpenAi, "gpt-4o");
        let a = text_file("a");
        s.set_file(Some(("a.rs", "a.rs", &a)));
        s.input = "q".into();
        let p = s.submit(&creds_with_key(Provider::OpenAi)).unwrap().unwrap();

        let b = text_file("b");
        s.set_file(Some(("b.rs", "b.rs", &b)));
        assert!(!s.waiting);
        assert!(!s.apply_reply(p.epoch, Ok("late".into())));
        assert_eq!(s.entries.len(), 1);
    }

    #[test]
    fn same_file_keeps_transcript() {
        let mut s = ChatSession::new(Provider::OpenAi, "gpt-4o");
        let a = text_file("a");
        s.set_file(Some(("a.rs", "a.rs", &a)));
        s.cycle_provider();
        let before = s.entries.len();
        s.set_file(Some(("a.rs", "a.rs", &a)));
        assert_eq!(s.entries.len(), before);
        assert_eq!(s.context().unwrap().language, "rust");
    }

    #[test]
    fn cycle_provider_resets_model() {
        let mut s = ChatSession::new(Provider::OpenAi, "gpt-4o");
        s.cycle_provider();
        assert_eq!(s.provider, Provider::Gemini);
        assert_eq!(s.model, Provider::Gemini.default_model());
    }

    #[test]
    fn slash_commands() {
        assert!(expand_slash_command("/review").is_some());
        assert!(expand_slash_command(" /bugs ").is_some());
        assert_eq!(expand_slash_command("/unknown"), None);
        assert_eq!(expand_slash_command("plain text"), None);
    }
}
