use super::{AppConfig, ConfigError};

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    validate_range(
        "rag.chunk_size",
        config.rag.chunk_size as u64,
        1,
        100_000,
    )?;
    validate_range("rag.top_k", config.rag.top_k as u64, 1, 100)?;
    validate_range(
        "http.request_timeout_secs",
        config.http.request_timeout_secs,
        1,
        3_600,
    )?;

    validate_non_empty("server.default_model", &config.server.default_model)?;
    validate_non_empty("llm.base_url", &config.llm.base_url)?;
    validate_non_empty("llm.model", &config.llm.model)?;
    validate_non_empty("embedding.base_url", &config.embedding.base_url)?;
    validate_non_empty("embedding.model", &config.embedding.model)?;
    validate_non_empty("vector_store.endpoint", &config.vector_store.endpoint)?;

    Ok(())
}

fn validate_range(field: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.vector_store.endpoint = "https://idx.example.io".to_string();
        config
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let mut config = valid_config();
        config.rag.chunk_size = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("rag.chunk_size"));
    }

    #[test]
    fn rejects_zero_top_k() {
        let mut config = valid_config();
        config.rag.top_k = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_empty_model() {
        let mut config = valid_config();
        config.llm.model = "  ".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("llm.model"));
    }
}
