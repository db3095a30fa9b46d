// Autolog
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Tracing setup for build scripts and tools

use tracing::Level;

/// Environment variable holding the log level
pub const LOG_ENV: &str = "AUTOLOG_LOG";

/// Install a fmt subscriber writing to stderr.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());
    let _ = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).with_target(false).try_init();
}

/// `trace`..`error`, case-insensitive; anything else means `info`
fn parse_level(value: Option<&str>) -> Level {
    value.and_then(|v| v.trim().parse::<Level>().ok()).unwrap_or(Level::INFO)
}
