#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Continue,
    Submit(String),
    HistoryPrev,
    HistoryNext,
    /// Esc on an empty prompt: stop the reply in progress.
    Cancel,
    Clear,
}
