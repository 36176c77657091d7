pub mod settings;

pub use settings::{
    JwtSettings, OAuthClientSettings, PostgresSettings, Settings, VerificationSettings,
};
