//! Configuration Management

pub mod settings;

pub use settings::{
    CorsSettings, CryptoSettings, DatabaseSettings, JwtSettings, ProfanitySettings,
    ServerSettings, Settings,
};
