//! INI file configuration adapter.

use crate::domain::error::TradeSignalError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradeSignalError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TradeSignalError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TradeSignalError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradeSignalError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_all_sections() {
        let content = r#"
[backtest]
initial_capital = 100000.0
commission_pct = 0.1
allow_shorting = false

[optimizer]
method = random
max_candidates = 50
seed = 7

[data]
path = bars/SPY.csv
symbol = SPY
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_capital", 0.0), 100000.0);
        assert_eq!(adapter.get_double("backtest", "commission_pct", 0.0), 0.1);
        assert!(!adapter.get_bool("backtest", "allow_shorting", true));
        assert_eq!(adapter.get_string("optimizer", "method"), Some("random".to_string()));
        assert_eq!(adapter.get_int("optimizer", "max_candidates", 0), 50);
        assert_eq!(adapter.get_int("optimizer", "seed", 0), 7);
        assert_eq!(adapter.get_string("data", "path"), Some("bars/SPY.csv".to_string()));
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("optimizer", "max_candidates", 200), 200);
        assert_eq!(adapter.get_double("backtest", "position_size", 0.9999), 0.9999);
        assert!(adapter.get_bool("optimizer", "parallel", true));
    }

    #[test]
    fn non_numeric_values_fall_back_to_defaults() {
        let adapter =
            FileConfigAdapter::from_string("[optimizer]\nmax_candidates = lots\nseed = x\n")
                .unwrap();
        assert_eq!(adapter.get_int("optimizer", "max_candidates", 42), 42);
        assert_eq!(adapter.get_double("optimizer", "seed", 1.5), 1.5);
    }

    #[test]
    fn blank_string_is_absent() {
        let adapter = FileConfigAdapter::from_string("[data]\nsymbol =\n").unwrap();
        assert_eq!(adapter.get_string("data", "symbol"), None);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[optimizer]\na = yes\nb = on\nc = 1\nd = no\ne = off\nf = 0\ng = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("optimizer", "a", false));
        assert!(adapter.get_bool("optimizer", "b", false));
        assert!(adapter.get_bool("optimizer", "c", false));
        assert!(!adapter.get_bool("optimizer", "d", true));
        assert!(!adapter.get_bool("optimizer", "e", true));
        assert!(!adapter.get_bool("optimizer", "f", true));
        assert!(adapter.get_bool("optimizer", "g", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[data]\npath = /tmp/bars.csv\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("/tmp/bars.csv".to_string())
        );
    }

    #[test]
    fn missing_file_is_a_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, TradeSignalError::ConfigParse { file, .. } if file.contains("config.ini")));
    }
}
