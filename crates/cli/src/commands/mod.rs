//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use std::path::Path;

use secrecy::SecretString;
use sqlx::PgPool;

/// Load a `.env` file into the process environment; variables already set
/// keep their value. `None` searches the working directory and its parents.
///
/// Returns false if no file was loaded.
pub fn load_env_file(path: Option<&Path>) -> bool {
    match path {
        Some(path) => dotenvy::from_path(path).is_ok(),
        None => dotenvy::dotenv().is_ok(),
    }
}

/// Connect to the storefront database named by the environment.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    load_env_file(None);
    let database_url: SecretString = bazaar_storefront::config::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = bazaar_storefront::db::create_pool(&database_url).await?;
    Ok(pool)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_env_file_values_are_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "BAZAAR_CLI_ENV_FILE_MARKER=from-file").unwrap();

        assert!(load_env_file(Some(file.path())));
        assert_eq!(
            std::env::var("BAZAAR_CLI_ENV_FILE_MARKER").as_deref(),
            Ok("from-file")
        );
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_env_file(Some(&dir.path().join(".env"))));
    }
}
