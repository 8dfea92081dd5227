//! Focus label capture

/// Answer given by the operator when asked what they are focusing on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Confirmed, possibly with empty text
    Confirmed(String),
    /// The default "just start" path; no new text was entered
    Skipped,
    /// Dismissed without confirming; the timer must not start
    Cancelled,
}

/// Collaborator asked for a focus label before a Focus run starts
pub trait FocusPrompt {
    fn prompt_focus_label(&mut self) -> PromptOutcome;
}

/// An outcome known in advance, e.g. carried by a request body
impl FocusPrompt for PromptOutcome {
    fn prompt_focus_label(&mut self) -> PromptOutcome {
        self.clone()
    }
}
