//! Logging backend for the launchers: `log` facade, `log4rs` appenders.

mod consts;

pub use consts::*;

use crate::foundation::MixError;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::threshold::ThresholdFilter;
use log4rs::Config;
use std::io::IsTerminal;
use std::path::Path;

const CONSOLE_APPENDER: &str = "stderr";
const LOG_FILE_APPENDER: &str = "log_file";
const ERR_LOG_FILE_APPENDER: &str = "err_log_file";

/// Parsed filter expression, e.g. `"info,mixer_core=debug,root=warn"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilters {
    /// Level for the whitelisted crates.
    pub app: LevelFilter,
    /// Level for every other crate.
    pub root: LevelFilter,
    /// Explicit `<module>=<level>` entries.
    pub modules: Vec<(String, LevelFilter)>,
}

impl LogFilters {
    /// Unparseable entries are skipped.
    pub fn parse(filters: &str) -> Self {
        let mut parsed = Self { app: LevelFilter::Info, root: LevelFilter::Off, modules: Vec::new() };
        let mut app_seen = false;
        for part in filters.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            match part.split_once('=') {
                None if !app_seen => {
                    if let Ok(level) = part.parse() {
                        parsed.app = level;
                        app_seen = true;
                    }
                }
                None => {}
                Some((module, level)) => {
                    let module = module.trim();
                    let Ok(level) = level.trim().parse::<LevelFilter>() else {
                        continue;
                    };
                    match module {
                        "" => {}
                        "root" => parsed.root = level,
                        _ => parsed.modules.push((module.to_string(), level)),
                    }
                }
            }
        }
        parsed
    }

    fn overrides(&self, module: &str) -> bool {
        self.modules.iter().any(|(name, _)| name == module)
    }
}

fn rolling_appender(dir: &Path, file_name: &str) -> Result<RollingFileAppender, MixError> {
    let archive = dir.join(format!("{file_name}.{{}}.gz"));
    let archive = archive.to_str().ok_or_else(|| MixError::ConfigError(format!("log dir is not valid UTF-8: {}", dir.display())))?;
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(archive, LOG_FILE_MAX_ROLLS)
        .map_err(|err| MixError::ConfigError(format!("log roller for {file_name}: {err}")))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(LOG_FILE_MAX_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN)))
        .build(dir.join(file_name), Box::new(policy))
        .map_err(|err| MixError::ConfigError(format!("log file {file_name}: {err}")))
}

/// Installs the global logger.
///
/// Console output goes to stderr. With a non-blank `log_dir`, `mixer.log` receives everything
/// and `mixer_err.log` receives warnings and errors; both roll by size. Only `mixer_core` and
/// `mixer_service` log unless `filters` opts other crates in. A second call is a no-op.
pub fn init_logger(log_dir: Option<&str>, filters: &str) -> Result<(), MixError> {
    let filters = LogFilters::parse(filters);
    let pattern = if std::io::stderr().is_terminal() { LOG_LINE_PATTERN_COLORED } else { LOG_LINE_PATTERN };
    let console = ConsoleAppender::builder().target(Target::Stderr).encoder(Box::new(PatternEncoder::new(pattern))).build();

    let mut builder = Config::builder().appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
    let mut appenders = vec![CONSOLE_APPENDER.to_string()];

    if let Some(dir) = log_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
        let dir = Path::new(dir);
        builder = builder.appender(Appender::builder().build(LOG_FILE_APPENDER, Box::new(rolling_appender(dir, LOG_FILE_NAME)?)));
        builder = builder.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Warn)))
                .build(ERR_LOG_FILE_APPENDER, Box::new(rolling_appender(dir, ERR_LOG_FILE_NAME)?)),
        );
        appenders.push(LOG_FILE_APPENDER.to_string());
        appenders.push(ERR_LOG_FILE_APPENDER.to_string());
    }

    let logger = |name: &str, level: LevelFilter| Logger::builder().appenders(appenders.clone()).additive(false).build(name, level);
    for name in WHITELISTED_CRATES.iter().copied().filter(|name| !filters.overrides(name)) {
        builder = builder.logger(logger(name, filters.app));
    }
    for (module, level) in &filters.modules {
        builder = builder.logger(logger(module, *level));
    }

    let config = builder
        .build(Root::builder().appenders(appenders.clone()).build(filters.root))
        .map_err(|err| MixError::ConfigError(format!("logger config: {err}")))?;
    // Tests and embedders may initialise more than once.
    let _ = log4rs::init_config(config);
    Ok(())
}
