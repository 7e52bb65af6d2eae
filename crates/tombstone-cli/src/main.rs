// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use tikv_jemallocator::Jemalloc;
use tombstone_core::factory;
use tombstone_core::infra::cli;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::troubleshooting::setup_troubleshooting();
    let (task, settings) = cli::parsing::parse_arguments()?;

    let tombstone = factory::create_tombstone(&settings);
    tombstone.execute(task).await?;

    Ok(())
}
