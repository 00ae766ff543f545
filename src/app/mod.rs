// Application layer - Use case interactors

pub mod container;
pub mod retry_controller;
pub mod split_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use retry_controller::RetryController;
pub use split_interactor::{SplitInteractor, SplitOutcome};
