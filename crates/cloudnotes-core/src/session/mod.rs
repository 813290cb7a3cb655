//! Session orchestration: sign-in reconciliation, the UI model, and the
//! cancellable request handles returned by every operation.

mod model;
mod orchestrator;
mod reconciler;
mod subscription;


pub use crate::auth::SignInStatus;
pub use model::UiModel;
pub use orchestrator::SessionOrchestrator;
pub use reconciler::{Action, ListReason, Message, Reconciler, SignalSource};
pub use subscription::{CancelToken, Subscription};
