pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, FileTypeTable, KenBurnsSettings, MAX_RECENT_PATHS, OrganizerSettings, UserSettings,
};
