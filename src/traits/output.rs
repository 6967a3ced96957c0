use std::sync::Mutex;

/// Output message captured by MockOutput for testing
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum OutputMessage {
    Success(String),
    Error(String),
    Info(String),
    KeyValue(String, String),
    Dimmed(String),
}

/// Trait for terminal output operations to enable testing with mocks
pub trait Output: Send + Sync {
    /// Print a success message
    fn success(&self, message: &str);

    /// Print an error message
    fn error(&self, message: &str);

    /// Print an info message
    fn info(&self, message: &str);

    /// Print a key-value pair
    fn key_value(&self, key: &str, value: &str);

    /// Print a dimmed/muted message
    fn dimmed(&self, message: &str);
}

/// Real terminal output implementation using the output module
pub struct TerminalOutput;

impl Output for TerminalOutput {
    fn success(&self, message: &str) {
        crate::output::success(message);
    }

    fn error(&self, message: &str) {
        crate::output::error(message);
    }

    fn info(&self, message: &str) {
        crate::output::info(message);
    }

    fn key_value(&self, key: &str, value: &str) {
        crate::output::key_value(key, value);
    }

    fn dimmed(&self, message: &str) {
        crate::output::dimmed(message);
    }
}

/// Output that only reports errors, used when verbose mode is off
pub struct QuietOutput;

impl Output for QuietOutput {
    fn success(&self, _message: &str) {}

    fn error(&self, message: &str) {
        crate::output::error(message);
    }

    fn info(&self, _message: &str) {}

    fn key_value(&self, _key: &str, _value: &str) {}

    fn dimmed(&self, _message: &str) {}
}

/// Mock output implementation for testing (captures output)
#[allow(dead_code)]
pub struct MockOutput {
    messages: Mutex<Vec<OutputMessage>>,
}

#[allow(dead_code)]
impl MockOutput {
    /// Create new mock output
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Get all captured messages
    pub fn get_messages(&self) -> Vec<OutputMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Check if a specific message was output
    pub fn contains_message(&self, message: &OutputMessage) -> bool {
        self.messages.lock().unwrap().contains(message)
    }

    /// Get all messages formatted as text
    pub fn to_text(&self) -> String {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|msg| match msg {
                OutputMessage::Success(s) => format!("✓ {}", s),
                OutputMessage::Error(s) => format!("✗ {}", s),
                OutputMessage::Info(s) => s.clone(),
                OutputMessage::KeyValue(k, v) => format!("{}: {}", k, v),
                OutputMessage::Dimmed(s) => s.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&self, message: OutputMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

impl Default for MockOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for MockOutput {
    fn success(&self, message: &str) {
        self.push(OutputMessage::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(OutputMessage::Error(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(OutputMessage::Info(message.to_string()));
    }

    fn key_value(&self, key: &str, value: &str) {
        self.push(OutputMessage::KeyValue(key.to_string(), value.to_string()));
    }

    fn dimmed(&self, message: &str) {
        self.push(OutputMessage::Dimmed(message.to_string()));
    }
}
