use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::PathBuf;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub storage: StorageSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    // Environment variables are strings: `deserialize_number_from_string` lets `PORT=5001` through.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Verbose error pages and `debug` level logs.
    #[serde(default)]
    pub debug: bool,
    /// Signs the flash message cookies and encrypts the session cookie. Must be at least 64 bytes
    /// long.
    pub secret_key: Secret<String>,
    /// Only send the session cookie over HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct StorageSettings {
    pub data_file: PathBuf,
}

/// The possible runtime environment for our application.
#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}

/// Flat environment variables honoured on top of the layered configuration, and the setting each
/// of them overrides.
const FLAT_OVERRIDES: [(&str, &str); 4] = [
    ("PORT", "application.port"),
    ("DEBUG", "application.debug"),
    ("SECRET_KEY", "application.secret_key"),
    ("DATA_FILE", "storage.data_file"),
];

/// Layers, from lowest to highest precedence:
/// * `configuration/base.yaml`;
/// * `configuration/{local,production}.yaml`, picked through `APP_ENVIRONMENT`;
/// * `APP_`-prefixed environment variables, `__` separating nested keys
///   (e.g. `APP_APPLICATION__PORT=5001`);
/// * the flat `PORT`, `DEBUG`, `SECRET_KEY` and `DATA_FILE` variables.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment. Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let mut builder = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );
    for (variable, key) in FLAT_OVERRIDES {
        builder = builder.set_override_option(key, std::env::var(variable).ok())?;
    }

    builder.build()?.try_deserialize::<Settings>()
}
