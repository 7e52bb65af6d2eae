// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use env_logger::Env;

/// Log filter read from the environment, e.g. TOMBSTONE_LOG=info
static LOG_FILTER_VARIABLE: &str = "TOMBSTONE_LOG";

pub fn setup_troubleshooting() {
    better_panic::install();
    human_panic::setup_panic!();

    env_logger::Builder::from_env(Env::default().filter(LOG_FILTER_VARIABLE))
        .format_timestamp(None)
        .format_module_path(false)
        .format_level(false)
        .format_target(false)
        .init();
}
