/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::{FailResult, Settings, YamlRead};
use crate::logging::GlobalLogger;

use ::clap::{App, Arg, ArgMatches};
use ::densemat_matrix::Backend;
use ::std::ffi::OsStr;
use ::std::fs::File;
use ::std::path::Path;

fn wrap_result_main<F>(main: F)
where F: FnOnce() -> FailResult<()>,
{
    main().unwrap_or_else(|e| {
        for cause in e.iter_chain() {
            error!("{}", cause);
        }

        if ::std::env::var_os("RUST_BACKTRACE") == Some(OsStr::new("1").to_owned()) {
            error!("{}", e.backtrace());
        }
        ::std::process::exit(1);
    });
}

fn app<'a, 'b>(name: &'b str, about: &'b str) -> App<'a, 'b> {
    App::new(name)
        .version(env!("CARGO_PKG_VERSION"))
        .about(about)
        .args(&[
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("CONFIG")
                .takes_value(true)
                .help("settings yaml (every key is optional)"),
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("trace-level logging for densemat crates"),
            Arg::with_name("log")
                .long("log")
                .value_name("FILE")
                .takes_value(true)
                .help("also write the log to this file"),
        ])
}

/// Logging, settings, and the thread pool, in that order.
fn init(matches: &ArgMatches) -> FailResult<Settings> {
    let mut logger = GlobalLogger::default();
    logger
        .verbosity(matches.occurrences_of("verbose") as i32)
        .show_module(crate::env::log_mod()?);
    if let Some(path) = matches.value_of_os("log") {
        logger.path(path);
    }
    logger.apply()?;

    let settings = match matches.value_of_os("config") {
        Some(path) => read_settings(Path::new(path))?,
        None => Settings::default(),
    };
    settings.validate()?;

    let threads = match crate::env::num_threads()? {
        Some(n) => n,
        None => settings.threads.unwrap_or_else(crate::env::max_num_threads),
    };
    ::rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    debug!("Using {} thread(s).", threads);
    if !cfg!(feature = "rayon-support") && threads > 1 {
        warn!("densemat was built without rayon-support; products will run on one thread");
    }

    Ok(settings)
}

fn read_settings(path: &Path) -> FailResult<Settings> {
    let file = File::open(path)
        .map_err(|e| format_err!("could not open config {}: {}", path.display(), e))?;
    let settings = Settings::from_reader(file)
        .map_err(|e| format_err!("in config {}: {}", path.display(), e))?;
    debug!("Read settings from {}", path.display());
    Ok(settings)
}

// -------------------------------------------------------------------------------------

pub fn check() {
    wrap_result_main(|| {
        let matches = app(
            "densemat-check",
            "Runs the product, resize and elementwise checks for every scalar type.",
        ).get_matches();
        let settings = init(&matches)?;

        if settings.backend != Backend::Portable && !Backend::Blas.is_accelerated::<f64>() {
            info!("BLAS is not linked into this build; every backend is the portable one.");
        }
        crate::cmd::check::run(&settings)
    });
}

pub fn bench() {
    wrap_result_main(|| {
        let matches = app(
            "densemat-bench",
            "Times square matrix products for every scalar type and backend.",
        ).get_matches();
        let settings = init(&matches)?;

        crate::cmd::bench::run(&settings)
    });
}
