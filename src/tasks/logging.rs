/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;

use ::log::{Level, LevelFilter};
use ::std::fmt;
use ::std::path::{Path, PathBuf};

const OUR_CRATES: &[&str] = &[
    "densemat_tasks",
    "densemat_matrix",
    "densemat_aligned",
    "densemat_blas",
];

/// Builder-style setup for logging
#[derive(Debug, Clone, Default)]
pub struct GlobalLogger {
    path: Option<PathBuf>,
    verbosity: Verbosity,
    show_module: bool,
}

impl GlobalLogger {
    /// Also write the log to this file, truncating it.
    pub fn path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self
    { self.path = Some(path.as_ref().to_owned()); self }

    /// Any integer will be accepted; the level will be truncated
    /// to the most extreme value supported.
    pub fn verbosity(&mut self, level: i32) -> &mut Self
    {
        self.verbosity = match level > 0 {
            true => Verbosity::Loud,
            false => Verbosity::Default,
        };
        self
    }

    /// Prefix each message with the module that logged it.
    pub fn show_module(&mut self, show: bool) -> &mut Self
    { self.show_module = show; self }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity { Default, Loud }

impl Default for Verbosity {
    fn default() -> Self { Verbosity::Default }
}

impl GlobalLogger {
    /// Install the logger.  This can only succeed once per process.
    pub fn apply(&mut self) -> FailResult<()>
    {Ok({
        use ::std::time::Instant;

        let start = Instant::now();
        let show_module = self.show_module;
        let ours = match self.verbosity {
            Verbosity::Default => LevelFilter::Debug,
            Verbosity::Loud => LevelFilter::Trace,
        };

        let mut fern = ::fern::Dispatch::new()
            .format(move |out, message, record| {
                let t = start.elapsed();
                match show_module {
                    true => out.finish(format_args!("[{:>4}.{:03}s][{}][{}] {}",
                        t.as_secs(),
                        t.subsec_millis(),
                        record.target(),
                        ColorizedLevel(record.level()),
                        message)),
                    false => out.finish(format_args!("[{:>4}.{:03}s][{}] {}",
                        t.as_secs(),
                        t.subsec_millis(),
                        ColorizedLevel(record.level()),
                        message)),
                }
            })
            .level(LevelFilter::Info);

        for name in OUR_CRATES {
            fern = fern.level_for(*name, ours);
        }
        fern = fern.chain(::std::io::stdout());

        if let Some(path) = self.path.as_ref() {
            fern = fern.chain(::fern::log_file(path)?);
        }

        fern.apply().map_err(|e| format_err!("{}", e))?;
    })}
}

#[derive(Debug, Copy, Clone)]
pub struct ColorizedLevel(pub Level);
impl fmt::Display for ColorizedLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let style = match self.0 {
            Level::Error => ::ansi_term::Colour::Red.bold(),
            Level::Warn  => ::ansi_term::Colour::Red.normal(),
            Level::Info  => ::ansi_term::Colour::Cyan.bold(),
            Level::Debug => ::ansi_term::Colour::Yellow.dimmed(),
            Level::Trace => ::ansi_term::Colour::Cyan.normal(),
        };
        write!(f, "{}", style.paint(self.0.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_saturates() {
        let mut logger = GlobalLogger::default();
        assert_eq!(logger.verbosity(3).verbosity, Verbosity::Loud);
        assert_eq!(logger.verbosity(-2).verbosity, Verbosity::Default);
    }

    #[test]
    fn colorized_level_keeps_the_name() {
        let s = ColorizedLevel(Level::Warn).to_string();
        assert!(s.contains("WARN"));
    }
}
