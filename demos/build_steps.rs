//! Fake build driven from several tokio tasks, each owning one status line.
//!
//! Configured through the environment:
//!     INSERTION_LOG_DEMO_STEPS  number of concurrent steps (default 4)
//!     INSERTION_LOG_DEMO_LOG    file to write diagnostics to (unset: no diagnostics)
//!     INSERTION_LOG_DEMO_LEVEL  diagnostics level (default debug)
use anyhow::{Context, Result};
use crossterm::tty::IsTty;
use insertion_log::SharedInsertionLog;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::env;
use std::fs::File;
use std::io;
use std::time::Duration;

struct DemoConfig {
    steps: usize,
    log_file: Option<String>,
    level: LevelFilter,
}

impl DemoConfig {
    fn from_env() -> Result<Self> {
        let steps = match env::var("INSERTION_LOG_DEMO_STEPS") {
            Ok(value) => value
                .parse::<usize>()
                .ok()
                .with_context(|| format!("INSERTION_LOG_DEMO_STEPS is not a number: {value}"))?,
            Err(_) => 4,
        };
        let level = match env::var("INSERTION_LOG_DEMO_LEVEL") {
            Ok(value) => value
                .parse::<LevelFilter>()
                .ok()
                .with_context(|| format!("INSERTION_LOG_DEMO_LEVEL is not a level: {value}"))?,
            Err(_) => LevelFilter::Debug,
        };
        Ok(Self {
            steps,
            log_file: env::var("INSERTION_LOG_DEMO_LOG").ok(),
            level,
        })
    }
}

fn init_logging(config: &DemoConfig) -> Result<()> {
    // Diagnostics can't share stdout with the log being drawn.
    if let Some(path) = &config.log_file {
        let file = File::create(path).with_context(|| format!("creating {path}"))?;
        WriteLogger::init(config.level, Config::default(), file)?;
    }
    Ok(())
}

async fn run_step(log: SharedInsertionLog<io::Stdout>, step: usize) -> Result<()> {
    let id = format!("step{step}");
    let delay = Duration::from_millis(80 + 40 * step as u64);

    tokio::time::sleep(delay).await;
    log.replace(&id, &format!("[{step}] compiling unit {step}"))?;
    for tick in 0..8 {
        tokio::time::sleep(delay).await;
        log.append(&id, ".")?;
        if tick == 3 && step % 2 == 1 {
            log.insert_after(
                &id,
                &format!("    warning: unit {step} is slow\n    (it always is)"),
                Some(&format!("warn{step}")),
            )?;
        }
    }
    log.append(&id, " done")?;
    log::info!("Step {step} finished");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = DemoConfig::from_env()?;
    init_logging(&config)?;

    let stdout = io::stdout();
    if !stdout.is_tty() {
        log::warn!("stdout is not a terminal, cursor movement will show up as raw escapes");
    }
    let log = SharedInsertionLog::new(stdout);

    log.log(&format!("Building {} units", config.steps), Some("header"))?;
    for step in 0..config.steps {
        log.log(&format!("[{step}] queued"), Some(&format!("step{step}")))?;
    }

    let tasks: Vec<_> = (0..config.steps)
        .map(|step| tokio::spawn(run_step(log.clone(), step)))
        .collect();
    for task in tasks {
        task.await??;
    }

    log.replace("header", &format!("Built {} units", config.steps))?;
    log.insert_before("header", "== build ==", None)?;
    if let Some(last) = config.steps.checked_sub(1) {
        // Nothing above the final step will be redrawn again.
        log.flush(&format!("step{last}"))?;
    }
    log.log("Finished", None)?;
    Ok(())
}
