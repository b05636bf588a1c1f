//! Terminal result callbacks

use quill_providers::AiError;
use tokio::sync::oneshot;

/// Receives the single terminal outcome of a task.
///
/// Both methods consume the callback, so a delivered callback cannot be
/// invoked a second time.
pub trait ResultCallback: Send + 'static {
    fn on_success(self: Box<Self>, reply: String);
    fn on_failure(self: Box<Self>, error: AiError);
}

pub type BoxedCallback = Box<dyn ResultCallback>;

/// Closure pair adapter, see [`callback_fn`]
pub struct FnCallback<S, F> {
    on_success: S,
    on_failure: F,
}

pub fn callback_fn<S, F>(on_success: S, on_failure: F) -> FnCallback<S, F>
where
    S: FnOnce(String) + Send + 'static,
    F: FnOnce(AiError) + Send + 'static,
{
    FnCallback {
        on_success,
        on_failure,
    }
}

impl<S, F> ResultCallback for FnCallback<S, F>
where
    S: FnOnce(String) + Send + 'static,
    F: FnOnce(AiError) + Send + 'static,
{
    fn on_success(self: Box<Self>, reply: String) {
        (self.on_success)(reply)
    }

    fn on_failure(self: Box<Self>, error: AiError) {
        (self.on_failure)(error)
    }
}

/// Lets async callers await the outcome. A dropped receiver is ignored.
impl ResultCallback for oneshot::Sender<Result<String, AiError>> {
    fn on_success(self: Box<Self>, reply: String) {
        let _ = (*self).send(Ok(reply));
    }

    fn on_failure(self: Box<Self>, error: AiError) {
        let _ = (*self).send(Err(error));
    }
}
