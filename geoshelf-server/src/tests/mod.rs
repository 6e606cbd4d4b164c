//! Shared test harness modules for the Geoshelf server.

use super::*;
