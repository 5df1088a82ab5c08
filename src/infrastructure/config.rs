use crate::domain::config::{ConnectionConfig, DeviceConfig, GlobalConfig, ProjComConfig};
use crate::domain::error::{ProjComError, ProjComResult};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".projcom";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> ProjComResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = Self::find_project_config_path();

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Manager reading from explicit locations
    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load configuration from files
    pub fn load_config(&self) -> ProjComResult<ProjComConfig> {
        let mut config = ProjComConfig::default();

        if self.global_config_path.exists() {
            let global_config = self.load_config_from_path(&self.global_config_path)?;
            config.global = global_config.global;
            config.devices = global_config.devices;
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                let project_config = self.load_config_from_path(project_path)?;
                // Project devices shadow global ones of the same name
                for device in project_config.devices {
                    config.devices.retain(|d| d.name != device.name);
                    config.devices.push(device);
                }
            }
        }

        Ok(config)
    }

    /// Save configuration to files
    pub fn save_config(&self, config: &ProjComConfig) -> ProjComResult<()> {
        let Some(project_path) = &self.project_config_path else {
            return self.save_config_to_path(&self.global_config_path, config);
        };

        let global_config = ProjComConfig {
            global: config.global.clone(),
            devices: Vec::new(),
        };
        self.save_config_to_path(&self.global_config_path, &global_config)?;

        let project_config = ProjComConfig {
            global: GlobalConfig::default(),
            devices: config.devices.clone(),
        };
        self.save_config_to_path(project_path, &project_config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> ProjComResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| ProjComError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("projcom").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> ProjComResult<ProjComConfig> {
        let content = fs::read_to_string(path).map_err(|e| ProjComError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| ProjComError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &ProjComConfig) -> ProjComResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ProjComError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| ProjComError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| ProjComError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create default project configuration
    pub fn init_project_config(&self, path: &Path) -> ProjComResult<PathBuf> {
        let config_file = path.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_file.exists() {
            return Err(ProjComError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        let default_config = ProjComConfig {
            global: GlobalConfig::default(),
            devices: vec![
                DeviceConfig {
                    name: "lobby_serial".to_string(),
                    description: "Projector on the RS-232C control port".to_string(),
                    connection: ConnectionConfig::serial("/dev/ttyUSB0"),
                },
                DeviceConfig {
                    name: "lobby_tcp".to_string(),
                    description: "Projector reached over ESC/VP.net".to_string(),
                    connection: ConnectionConfig::tcp("192.168.1.100"),
                },
                DeviceConfig {
                    name: "lobby_http".to_string(),
                    description: "Projector web control".to_string(),
                    connection: ConnectionConfig::http("192.168.1.100"),
                },
            ],
        };

        self.save_config_to_path(&config_file, &default_config)?;

        Ok(config_file)
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> &PathBuf {
        &self.global_config_path
    }
}

impl ProjComConfig {
    /// Look a device up by name
    pub fn find_device(&self, name: &str) -> ProjComResult<&DeviceConfig> {
        self.devices
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ProjComError::Config {
                message: format!("Device '{}' not found in configuration", name),
            })
    }

    /// Check the configuration for mistakes that parsing alone does not catch.
    ///
    /// Returns one message per problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        if self.global.timeout_ms == 0 {
            problems.push("global.timeout_ms must be greater than zero".to_string());
        }

        for device in &self.devices {
            if device.name.trim().is_empty() {
                problems.push("device with an empty name".to_string());
            }
            if !seen.insert(device.name.as_str()) {
                problems.push(format!("duplicate device name '{}'", device.name));
            }
            if let Err(e) = crate::infrastructure::create_transport(&device.connection) {
                problems.push(format!("device '{}': {}", device.name, e));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_paths(
            dir.path().join("global").join(CONFIG_FILE),
            Some(dir.path().join(CONFIG_DIR).join(CONFIG_FILE)),
        )
    }

    #[test]
    fn test_load_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = manager_in(&temp_dir).load_config().unwrap();

        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.global.timeout_ms, 5000);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn test_init_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);

        let config_file = manager.init_project_config(temp_dir.path()).unwrap();
        assert!(config_file.exists());

        let config = manager.load_config().unwrap();
        assert_eq!(config.devices.len(), 3);
        assert!(config.validate().is_empty());
        assert!(matches!(
            config.find_device("lobby_tcp").unwrap().connection,
            ConnectionConfig::Tcp { port: 3629, .. }
        ));

        assert!(manager.init_project_config(temp_dir.path()).is_err());
    }

    #[test]
    fn test_project_devices_shadow_global() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);

        fs::create_dir_all(temp_dir.path().join("global")).unwrap();
        fs::write(
            manager.get_global_config_path_ref(),
            r#"
[global]
timeout_ms = 2000

[[devices]]
name = "hall"
connection = { type = "serial", port = "COM1" }

[[devices]]
name = "booth"
connection = { type = "http", host = "10.0.0.9" }
"#,
        )
        .unwrap();
        let project = manager.get_project_config_path().unwrap().clone();
        fs::create_dir_all(project.parent().unwrap()).unwrap();
        fs::write(
            &project,
            r#"
[[devices]]
name = "hall"
connection = { type = "tcp", host = "10.0.0.8" }
"#,
        )
        .unwrap();

        let config = manager.load_config().unwrap();
        assert_eq!(config.global.timeout_ms, 2000);
        assert_eq!(config.devices.len(), 2);
        assert!(matches!(
            config.find_device("hall").unwrap().connection,
            ConnectionConfig::Tcp { .. }
        ));
        assert!(config.find_device("attic").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager_in(&temp_dir);
        let mut config = ProjComConfig::default();
        config.global.timeout_ms = 1500;
        config.devices.push(DeviceConfig {
            name: "stage".to_string(),
            description: String::new(),
            connection: ConnectionConfig::tcp("10.1.1.1"),
        });

        manager.save_config(&config).unwrap();
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.global.timeout_ms, 1500);
        assert_eq!(loaded.devices.len(), 1);
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = ProjComConfig::default();
        config.global.timeout_ms = 0;
        let device = DeviceConfig {
            name: "twin".to_string(),
            description: String::new(),
            connection: ConnectionConfig::Serial {
                port: "COM2".to_string(),
                baud_rate: 9600,
                data_bits: 4,
                stop_bits: 1,
                parity: Default::default(),
                flow_control: Default::default(),
            },
        };
        config.devices.push(device.clone());
        config.devices.push(device);

        let problems = config.validate();
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("duplicate")));
    }
}
