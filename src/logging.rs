//! Run log setup.
//!
//! Each run writes a timestamped log file under the configured logs
//! directory, mirroring what lands on the console. The file is the audit
//! trail the report points back to — warnings about skipped files and
//! nested folders only exist here.

use chrono::Local;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {m}{n}";
const CONSOLE_PATTERN: &str = "{l:>5} {m}{n}";

/// Initialize logging: a timestamped file under `logs_dir` plus stderr.
///
/// The default level is `info`; set `PHOTOLIFT_LOG` to override (e.g.
/// `PHOTOLIFT_LOG=debug`). Returns the log file path.
pub fn init_logging(logs_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(logs_dir)?;

    let log_path = logs_dir.join(format!(
        "photolift-{}.log",
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    ));

    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(&log_path)?;

    // stderr, so progress bars and piped report output stay clean
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let level = std::env::var("PHOTOLIFT_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)))
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(
            Root::builder()
                .appender("file")
                .appender("console")
                .build(level),
        )?;

    log4rs::init_config(config)?;
    Ok(log_path)
}
