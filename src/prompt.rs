//! Single-outstanding-request dialogs.
//!
//! A [`Prompt`] stands for one modal dialog (color picker, category picker).
//! Opening it hands out a [`PromptRequest`] the caller awaits. Opening it
//! again while a request is pending cancels that request, and a dialog that
//! goes away without answering cancels too, so a waiting caller always gets
//! a [`PromptResult`] and never hangs.

use tokio::sync::oneshot;

/// Outcome of a prompt: a value or a cancellation, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult<T> {
    Value(T),
    Canceled,
}

impl<T> PromptResult<T> {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Canceled => None,
        }
    }
}

/// The caller's side of an open prompt.
#[derive(Debug)]
pub struct PromptRequest<T> {
    receiver: oneshot::Receiver<PromptResult<T>>,
}

impl<T> PromptRequest<T> {
    pub async fn wait(self) -> PromptResult<T> {
        self.receiver.await.unwrap_or(PromptResult::Canceled)
    }
}

/// The dialog's side.
#[derive(Debug)]
pub struct Prompt<T> {
    name: &'static str,
    pending: Option<oneshot::Sender<PromptResult<T>>>,
}

impl<T> Prompt<T> {
    pub fn new(name: &'static str) -> Self {
        Self { name, pending: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a request is waiting for an answer.
    pub fn is_open(&self) -> bool {
        self.pending.as_ref().is_some_and(|sender| !sender.is_closed())
    }

    /// Open the dialog, superseding any pending request.
    pub fn open(&mut self) -> PromptRequest<T> {
        if self.cancel() {
            tracing::debug!("Prompt {} reopened, previous request canceled", self.name);
        }

        let (sender, receiver) = oneshot::channel();
        self.pending = Some(sender);
        PromptRequest { receiver }
    }

    /// Answer the pending request. Returns `false` when nobody was waiting.
    pub fn resolve(&mut self, value: T) -> bool {
        self.finish(PromptResult::Value(value))
    }

    /// Cancel the pending request. Returns `false` when nobody was waiting.
    pub fn cancel(&mut self) -> bool {
        self.finish(PromptResult::Canceled)
    }

    fn finish(&mut self, result: PromptResult<T>) -> bool {
        match self.pending.take() {
            Some(sender) => sender.send(result).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolved_prompt_yields_value() {
        let mut prompt = Prompt::new("color");
        let request = prompt.open();
        assert!(prompt.is_open());

        assert!(prompt.resolve("#ff0000".to_string()));
        assert_eq!(request.wait().await, PromptResult::Value("#ff0000".to_string()));
        assert!(!prompt.is_open());
    }

    #[tokio::test]
    async fn test_reopening_cancels_pending_request() {
        let mut prompt = Prompt::new("color");
        let first = prompt.open();
        let second = prompt.open();

        assert!(prompt.resolve(7));
        assert_eq!(first.wait().await, PromptResult::Canceled);
        assert_eq!(second.wait().await, PromptResult::Value(7));
    }

    #[tokio::test]
    async fn test_dropped_prompt_cancels() {
        let mut prompt: Prompt<u32> = Prompt::new("category");
        let request = prompt.open();
        drop(prompt);

        assert!(request.wait().await.is_canceled());
    }

    #[test]
    fn test_resolve_without_request_is_ignored() {
        let mut prompt = Prompt::new("color");
        assert!(!prompt.resolve(1));
        assert!(!prompt.cancel());
    }

    #[test]
    fn test_abandoned_request_closes_prompt() {
        let mut prompt: Prompt<u32> = Prompt::new("color");
        drop(prompt.open());
        assert!(!prompt.is_open());
        assert!(!prompt.resolve(3));
    }
}
