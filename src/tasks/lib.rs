/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The code behind `densemat-check` and `densemat-bench`.
//!
//! Each binary is a shim that calls one function in [`entry_points`].

#[macro_use] extern crate failure;
#[macro_use] extern crate serde_derive;
#[macro_use] extern crate log;

pub type FailResult<T> = Result<T, failure::Error>;

pub use crate::config::{Settings, YamlRead};
mod config;

mod env;
mod logging;
mod cmd;

pub mod entry_points;
