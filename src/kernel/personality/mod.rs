pub mod profile;
pub mod types;

pub use profile::PersonalityProfile;
pub use types::{PersonalityError, PersonalityInfo, PersonalityTrait, Preset, ResponseStyle};
