/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;

use ::std::env;

fn var(key: &str) -> FailResult<Option<String>>
{ match env::var(key) {
    Ok(s) => Ok(Some(s)),
    Err(env::VarError::NotPresent) => Ok(None),
    Err(env::VarError::NotUnicode(s)) => bail!("env var not unicode: {}={:?}", key, s),
}}

fn nonempty_var(key: &str) -> FailResult<Option<String>>
{ match var(key) {
    Ok(Some(ref s)) if s == "" => Ok(None),
    r => r,
}}

/// Show module names in log output.
pub fn log_mod() -> FailResult<bool>
{Ok({
    match nonempty_var("DENSEMAT_LOG_MOD")? {
        None => false,
        Some(s) => parse_flag("DENSEMAT_LOG_MOD", &s)?,
    }
})}

/// Thread count requested through the environment, overriding the config.
pub fn num_threads() -> FailResult<Option<usize>>
{Ok({
    match nonempty_var("DENSEMAT_NUM_THREADS")? {
        None => None,
        Some(s) => Some(parse_thread_count("DENSEMAT_NUM_THREADS", &s)?),
    }
})}

/// The thread count to use when nobody asked for one.
pub fn max_num_threads() -> usize {
    ::num_cpus::get()
}

fn parse_flag(key: &str, s: &str) -> FailResult<bool>
{ match s {
    "1" => Ok(true),
    "0" => Ok(false),
    _ => bail!("Invalid setting for {}: {:?}", key, s),
}}

fn parse_thread_count(key: &str, s: &str) -> FailResult<usize>
{
    match s.trim().parse::<usize>() {
        Ok(0) | Err(_) => bail!("Invalid setting for {}: {:?} (expected a positive integer)", key, s),
        Ok(n) => Ok(n),
    }
}
