pub mod analysis;
pub mod model;
pub mod notifier;
pub mod signals;

pub use analysis::SignalService;
pub use model::{FileModelStore, ModelStore, TrainedModel};
pub use notifier::{NotifyOutcome, TelegramNotifier};
