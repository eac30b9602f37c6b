pub mod config;
pub mod kernel;

// Re-export specific items if needed for convenient access
pub use config::CoreConfig;
pub use kernel::behavior::BehaviorStateMachine;
pub use kernel::decision::DecisionMaker;
pub use kernel::emotion::EmotionModel;
pub use kernel::personality::PersonalityProfile;
pub use kernel::reactor::Reactor;
