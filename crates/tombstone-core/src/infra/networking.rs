// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub(crate) mod http;
pub(crate) mod pages;
pub(crate) mod probes;
