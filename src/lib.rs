pub mod irc;
mod settings;

pub use settings::Settings;
