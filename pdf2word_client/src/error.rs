#[derive(Debug)]
pub enum Failure {
    IoFailed(std::io::Error),
    ConverterMissing(String),
    ConversionFailed(String),
    InvalidInput(String),
    Busy,
    ConfigurationError(toml::de::Error),
}

impl std::error::Error for Failure {}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::ConfigurationError(err) => {
                write!(f, "{}", err)
            },
            Failure::IoFailed(err) => {
                write!(f, "{}", err)
            },
            Failure::Busy => {
                write!(f, "A conversion is already running")
            },
            Failure::ConverterMissing(details) | Failure::ConversionFailed(details) | Failure::InvalidInput(details) => {
                write!(f, "{}", details)
            },
        }
    }
}

impl From<std::io::Error> for Failure {
    fn from(error: std::io::Error) -> Self {
        Failure::IoFailed(error)
    }
}

impl From<toml::de::Error> for Failure {
    fn from(error: toml::de::Error) -> Self {
        Failure::ConfigurationError(error)
    }
}
