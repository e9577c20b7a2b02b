// src/config/validate.rs

use crate::config::model::{ConfigFile, CvsSection, KeeperSection, RawConfigFile};
use crate::errors::{KeeperError, Result};
use crate::filter::ExcludeSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::KeeperError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_keeper(&raw.keeper)?;
        validate_cvs(&raw.cvs)?;
        let umask = parse_umask(&raw.cvs.umask)?;
        let exclude = ExcludeSet::new(&raw.keeper.exclude)
            .map_err(|e| KeeperError::ConfigError(format!("[keeper].exclude: {e:#}")))?;
        Ok(ConfigFile::new_unchecked(raw.keeper, raw.cvs, exclude, umask))
    }
}

fn validate_keeper(keeper: &KeeperSection) -> Result<()> {
    if !keeper.root.is_absolute() {
        return Err(KeeperError::ConfigError(format!(
            "[keeper].root must be an absolute path (got {})",
            keeper.root.display()
        )));
    }
    if keeper.root.parent().is_none() {
        return Err(KeeperError::ConfigError(
            "[keeper].root must not be the filesystem root".to_string(),
        ));
    }
    if keeper.acting_user_env.trim().is_empty() {
        return Err(KeeperError::ConfigError(
            "[keeper].acting_user_env must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_cvs(cvs: &CvsSection) -> Result<()> {
    if cvs.binary.trim().is_empty() {
        return Err(KeeperError::ConfigError(
            "[cvs].binary must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn parse_umask(s: &str) -> Result<u32> {
    let value = u32::from_str_radix(s.trim(), 8).map_err(|_| {
        KeeperError::ConfigError(format!("[cvs].umask must be an octal number (got {s:?})"))
    })?;
    if value > 0o777 {
        return Err(KeeperError::ConfigError(format!(
            "[cvs].umask must be at most 777 (got {s})"
        )));
    }
    Ok(value)
}
