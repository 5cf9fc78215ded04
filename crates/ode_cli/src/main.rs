use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use log::info;
use ode_core::{IntegratorSettings, Model};
use serde::Deserialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(ClapParser)]
#[command(name = "ode_cli")]
#[command(about = "Integrate a TOML-described ODE model with explicit Euler")]
struct Cli {
    /// Path to the model file
    model: PathBuf,
}

/// Contents of a model file.
#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    settings: IntegratorSettings,
    #[serde(default)]
    initial: BTreeMap<String, f64>,
    #[serde(default)]
    ode: Vec<OdeEntry>,
}

#[derive(Debug, Deserialize)]
struct OdeEntry {
    symbol: String,
    equation: String,
}

fn parse_level(level: Option<&str>) -> Result<LevelFilter> {
    level.map_or(Ok(LevelFilter::Warn), |name| {
        name.parse::<LevelFilter>()
            .with_context(|| format!("unknown log_level \"{name}\""))
    })
}

fn build_model(file: &ModelFile) -> Result<Model> {
    if file.ode.is_empty() {
        bail!("model file declares no [[ode]] entries");
    }

    let mut model = Model::new(file.settings);
    for (symbol, value) in &file.initial {
        model.initial(symbol, *value);
    }
    for entry in &file.ode {
        let equation = model
            .parse(&entry.equation)
            .with_context(|| format!("failed to parse equation for {}", entry.symbol))?;
        model.ode(&entry.symbol, equation);
    }
    Ok(model)
}

fn load(path: &Path) -> Result<ModelFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read model file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid model file {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let file = load(&cli.model)?;

    TermLogger::init(
        parse_level(file.log_level.as_deref())?,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to initialize logger")?;

    let mut model = build_model(&file)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = model.execute(&mut out)?;
    out.flush()?;
    info!("wrote {} row(s)", summary.steps + 1);
    Ok(())
}
