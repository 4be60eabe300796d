//! CLI mode
//!
//! Handles the non-server subcommands.

use std::path::Path;

use anyhow::{Result, bail};

use crate::cli::ConfigCommands;
use crate::config::StaticConfig;

/// 示例配置的默认输出路径
pub const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// 执行 `config` 子命令
pub fn run_config_command(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Generate { output_path, force } => {
            let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());
            generate_sample(Path::new(&path), force)?;
            println!("Sample configuration written to {}", path);
            Ok(())
        }
    }
}

/// 写入默认配置；目标已存在且未指定 force 时报错
pub fn generate_sample(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }
    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_sample_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        generate_sample(&path, false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[analytics]"));

        assert!(generate_sample(&path, false).is_err());
        generate_sample(&path, true).unwrap();
    }
}
