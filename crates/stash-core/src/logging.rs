//! Console logging.
//!
//! Every line looks like `[2026-01-02T03:04:05.678Z] [INFO] message`; lines
//! written through a [`ThreadLogger`] carry an extra `[label:sequence]`
//! segment so interleaved flows can be told apart. WARN and ERROR go to
//! stderr, everything else to stdout.

use std::{collections::HashMap, env, fmt, sync::Mutex};

use chrono::{SecondsFormat, Utc};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        format::Writer,
        writer::{MakeWriterExt, OrElse, WithMaxLevel},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
    EnvFilter,
};

use crate::{errors::Error, Result};

/// Target used for every event emitted through [`Logger`].
pub const LOG_TARGET: &str = "stash";

/// Presence of this variable enables debug lines.
pub const DEBUG_ENV: &str = "DEBUG";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{LOG_TARGET}=debug")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(route(std::io::stderr, std::io::stdout))
        .event_format(LineFormat)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialize logging: {e}")))
}

/// Log panics instead of letting them vanish with the task that raised them.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(target: LOG_TARGET, "unhandled panic: {info}");
    }));
}

/// WARN and ERROR to `err`, everything else to `out`.
fn route<E, O>(err: E, out: O) -> OrElse<WithMaxLevel<E>, O>
where
    E: for<'a> MakeWriter<'a>,
    O: for<'a> MakeWriter<'a>,
{
    err.with_max_level(Level::WARN).or_else(out)
}

struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "[{}] [{}] ",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Decides whether debug lines are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugSwitch {
    /// Look at [`DEBUG_ENV`] on every call, so it can be flipped at runtime.
    Env,
    Always,
    Never,
}

impl DebugSwitch {
    pub fn enabled(self) -> bool {
        match self {
            Self::Env => env::var_os(DEBUG_ENV).is_some(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Process-scoped logging service.
///
/// Shared behind an `Arc`; hands out [`ThreadLogger`]s whose sequence numbers
/// increase by one per label for the life of the process.
#[derive(Debug)]
pub struct Logger {
    threads: Mutex<HashMap<String, u64>>,
    debug: DebugSwitch,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(DebugSwitch::Env)
    }
}

impl Logger {
    pub fn new(debug: DebugSwitch) -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
            debug,
        }
    }

    /// Open a new named flow. Labels are never released.
    pub fn thread(&self, label: &str) -> ThreadLogger {
        let sequence = {
            let mut map = self
                .threads
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let counter = map.entry(label.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };

        ThreadLogger {
            label: label.to_string(),
            sequence,
            debug: self.debug,
        }
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        if self.debug.enabled() {
            emit(Level::DEBUG, &msg.to_string());
        }
    }

    pub fn info(&self, msg: impl fmt::Display) {
        emit(Level::INFO, &msg.to_string());
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        emit(Level::WARN, &msg.to_string());
    }

    pub fn error(&self, msg: impl fmt::Display) {
        emit(Level::ERROR, &msg.to_string());
    }
}

/// Logger bound to one `label:sequence` identity.
#[derive(Clone, Debug)]
pub struct ThreadLogger {
    label: String,
    sequence: u64,
    debug: DebugSwitch,
}

impl ThreadLogger {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn line(&self, msg: &dyn fmt::Display) -> String {
        format!("[{}:{}] {msg}", self.label, self.sequence)
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        if self.debug.enabled() {
            emit(Level::DEBUG, &self.line(&msg));
        }
    }

    pub fn info(&self, msg: impl fmt::Display) {
        emit(Level::INFO, &self.line(&msg));
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        emit(Level::WARN, &self.line(&msg));
    }

    pub fn error(&self, msg: impl fmt::Display) {
        emit(Level::ERROR, &self.line(&msg));
    }
}

fn emit(level: Level, line: &str) {
    if level == Level::ERROR {
        tracing::error!(target: LOG_TARGET, "{line}");
    } else if level == Level::WARN {
        tracing::warn!(target: LOG_TARGET, "{line}");
    } else if level == Level::INFO {
        tracing::info!(target: LOG_TARGET, "{line}");
    } else {
        tracing::debug!(target: LOG_TARGET, "{line}");
    }
}
