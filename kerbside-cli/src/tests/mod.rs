//! Shared test harness modules for the kerbside CLI.

use super::*;

mod helpers;
mod locate_unit;
