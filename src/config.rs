use anyhow::Context;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("REPORTS_DB_MAX_CONNECTIONS").ok(),
        )
    }

    fn from_vars(
        database_url: Option<String>,
        max_connections: Option<String>,
    ) -> anyhow::Result<Self> {
        let database_url =
            database_url.context("DATABASE_URL must be set to a production Postgres instance")?;
        let max_connections = match max_connections {
            Some(value) => value
                .parse()
                .with_context(|| format!("REPORTS_DB_MAX_CONNECTIONS is not a number: {value}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pool_size() {
        let config = DbConfig::from_vars(Some("postgres://localhost/reports".into()), None).unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.database_url, "postgres://localhost/reports");
    }

    #[test]
    fn requires_database_url() {
        assert!(DbConfig::from_vars(None, None).is_err());
    }

    #[test]
    fn rejects_bad_pool_size() {
        let url = Some("postgres://localhost/reports".to_string());
        assert!(DbConfig::from_vars(url.clone(), Some("lots".into())).is_err());
        assert_eq!(
            DbConfig::from_vars(url, Some("12".into())).unwrap().max_connections,
            12
        );
    }
}
