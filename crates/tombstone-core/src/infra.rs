// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod cli;

pub(crate) mod caching;
pub(crate) mod catalog;
pub(crate) mod networking;
