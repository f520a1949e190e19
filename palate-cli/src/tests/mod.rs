//! Shared test harness modules for the Palate CLI.

use super::*;

mod commands_unit;
mod helpers;
