use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Fixed shift applied to client instants before they are stored as record dates.
    pub record_offset_hours: i64,
    /// Prefix for image URLs stored as server-relative paths.
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        Ok(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            record_offset_hours: std::env::var("RECORD_UTC_OFFSET_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(10),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Absolute URL for a stored image path; absolute URLs pass through.
    pub fn image_url(&self, stored: Option<&str>) -> Option<String> {
        match stored {
            None | Some("") => None,
            Some(url) if url.starts_with("http") => Some(url.to_string()),
            Some(path) => Some(format!("{}{}", self.public_base_url, path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/test".into(),
            max_connections: 1,
            record_offset_hours: 10,
            public_base_url: "http://10.0.0.2:4000".into(),
        }
    }

    #[test]
    fn image_url_prefixes_relative_paths() {
        let cfg = config();
        assert_eq!(
            cfg.image_url(Some("/uploads/food_images/a.jpg")).as_deref(),
            Some("http://10.0.0.2:4000/uploads/food_images/a.jpg")
        );
        assert_eq!(
            cfg.image_url(Some("https://cdn.example.com/a.jpg")).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(cfg.image_url(None), None);
        assert_eq!(cfg.image_url(Some("")), None);
    }
}
