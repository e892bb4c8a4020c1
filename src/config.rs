use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许的跨域来源，为空表示不限制
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Redis 连接串；未配置时使用进程内缓存
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            // 无配置文件：使用环境变量与默认值构建
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // 数据库 URL 在无配置文件时必须提供
        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 4000u16),
                allowed_origins: get_env("ALLOWED_ORIGINS")
                    .map(|v| parse_origins(&v))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                expires_in: get_env_parse("JWT_EXPIRES_IN", 86_400i64),
            },
            cache: CacheConfig {
                redis_url: get_env("REDIS_URL"),
            },
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("ALLOWED_ORIGINS") {
            self.server.allowed_origins = parse_origins(&v);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("REDIS_URL") {
            self.cache.redis_url = Some(v);
        }
    }
}
