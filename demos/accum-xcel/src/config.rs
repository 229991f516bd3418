// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Layered configuration.
//!
//! Values are taken from, in increasing priority:
//!  - the defaults in [`SimConfig::default`]
//!  - the TOML file given with `--config`
//!  - `ACCUM_` environment variables (e.g. `ACCUM_MEM_LATENCY=4`)
//!  - command-line flags

use std::path::PathBuf;

use cascade_engine::engine::DEFAULT_MAX_CYCLES;
use cascade_models::accum_xcel::Level;
use cascade_models::conformance::DATA_BASE;
use cascade_models::memory::MemoryConfig;
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "ACCUM_";

/// Name of the model that runs the accumulator. Any other name selects a
/// multiplier.
pub const ACCUM_MODEL: &str = "accum";

/// Command-line arguments. Every flag overrides the file and environment.
#[derive(Debug, Default, Parser, Serialize)]
#[command(about = "Accumulator accelerator simulation")]
pub struct Cli {
    /// TOML file to read the configuration from.
    #[arg(long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Level of the accelerator model: fl, cl or rtl.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    /// Comma-separated words to sum.
    #[arg(long, value_delimiter = ',', value_parser = parse_u32)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u32>>,

    /// Address the data is placed at.
    #[arg(long, value_parser = parse_u32)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_address: Option<u32>,

    /// `accum`, or a multiplier such as `var-lat-cl` or `4-stage-rtl` which
    /// multiplies consecutive pairs of data words.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Cycles between the memory accepting a request and responding.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_latency: Option<u64>,

    /// Length of the memory stall pattern. 0 disables stalls.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_stall_period: Option<u64>,

    /// Cycles of each stall period in which the memory refuses requests.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_stall_cycles: Option<u64>,

    /// Stop with an error if the simulation runs longer than this.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,

    /// Level of log message to display.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<log::Level>,

    /// Regular expression selecting the entities that log at `log_level`.
    /// Others only log errors.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    /// Also write a full trace to this file.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_file: Option<String>,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}': {e}"))
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SimConfig {
    pub level: Level,
    pub data: Vec<u32>,
    pub base_address: u32,
    pub model: String,
    pub mem_latency: u64,
    pub mem_stall_period: u64,
    pub mem_stall_cycles: u64,
    pub max_cycles: u64,
    pub log_level: log::Level,
    pub log_filter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_file: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            level: Level::default(),
            data: vec![1, 2, 3, 4],
            base_address: DATA_BASE,
            model: ACCUM_MODEL.to_string(),
            mem_latency: 1,
            mem_stall_period: 0,
            mem_stall_cycles: 0,
            max_cycles: DEFAULT_MAX_CYCLES,
            log_level: log::Level::Info,
            log_filter: String::new(),
            trace_file: None,
        }
    }
}

impl SimConfig {
    fn figment(cli: &Cli) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(SimConfig::default()));
        if let Some(conf_file) = &cli.config {
            figment = figment.merge(Toml::file(conf_file));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(cli))
    }

    /// Merge every configuration source.
    pub fn load(cli: &Cli) -> Result<Self, figment::Error> {
        if let Some(conf_file) = &cli.config {
            if !conf_file.is_file() {
                return Err(figment::Error::from(format!(
                    "{} not found",
                    conf_file.display()
                )));
            }
        }
        Self::figment(cli).extract()
    }

    #[must_use]
    pub fn memory_config(&self) -> MemoryConfig {
        MemoryConfig::new(self.mem_latency)
            .with_stalls(self.mem_stall_period, self.mem_stall_cycles)
    }
}
