//! Command-line inspector for the configurator engine.
//!
//! Commands return serializable reports; `run` renders them as text or JSON.

pub mod args;
pub mod commands;

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use configurator_engine::ModelRegistry;

use crate::args::{Cli, Command};

pub fn run(cli: &Cli, registry: &ModelRegistry, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Command::Models => {
            let report = commands::models(registry);
            emit(cli.json, out, report.as_slice(), commands::render_models)
        }
        Command::Steps { model, selections } => {
            let report = commands::steps(registry, model, selections)?;
            emit(cli.json, out, &report, commands::render_steps)
        }
        Command::Build { model, selections } => {
            let report = commands::build(registry, model, selections)?;
            emit(cli.json, out, &report, commands::render_build)
        }
    }
}

fn emit<T, W>(
    json: bool,
    out: &mut W,
    report: &T,
    render: fn(&T, &mut W) -> std::io::Result<()>,
) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
    } else {
        render(report, out)?;
    }
    Ok(())
}
