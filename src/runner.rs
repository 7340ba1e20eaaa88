use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Command, FromArgMatches as _, ValueEnum};
use serde::Serialize;

use crate::config::{load_config, OutbreakConfig};
use crate::context::Context;
use crate::error::GeoSpreadError;
use crate::geo::GeoPoint;
use crate::log::{set_log_level, set_module_filter, LevelFilter};
use crate::outbreak::{ContextOutbreakExt, DailySummary, OutbreakStatus};
use crate::parameters::{Pathogen, SimulationParameters};
use crate::random::ContextRandomExt;
use crate::spread::InfectionSite;

/// Days simulated when neither the config nor the command line sets a limit.
pub const DEFAULT_DAYS: u32 = 60;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The overlay text and the origin
    #[default]
    Summary,
    /// Status, daily history and the rendered sites as JSON
    Json,
}

/// Default cli arguments for the geospread runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for an outbreak config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of days to simulate
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Origin of the outbreak as `lat,lng`
    #[arg(long, value_parser = parse_geo_point, allow_hyphen_values = true)]
    pub origin: Option<GeoPoint>,

    /// Basic reproduction number
    #[arg(long)]
    pub r0: Option<f64>,

    /// Use a pathogen's typical parameters
    #[arg(long, value_enum)]
    pub pathogen: Option<Pathogen>,

    /// Simulated days per unit of time, between 0.5 and 5
    #[arg(long)]
    pub speed: Option<f64>,

    #[arg(long)]
    pub travel_restrictions: bool,

    #[arg(long)]
    pub social_distancing: bool,

    #[arg(long)]
    pub mask_usage: bool,

    /// Percentage of the population vaccinated
    #[arg(long)]
    pub vaccination: Option<f64>,

    /// Enable logging: a level (e.g. `info`) and/or `module=level` pairs, comma separated
    #[arg(long)]
    pub log_level: Option<String>,

    /// What to print when the run ends
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    pub output: OutputFormat,
}

fn create_cli() -> Command {
    let cli = Command::new("geospread")
        .about("Simulates an outbreak spreading across the globe from a chosen origin");
    BaseArgs::augment_args(cli)
}

/// Parses `lat,lng` into a `GeoPoint`.
///
/// # Errors
///
/// Returns an error unless the input is two comma separated finite numbers.
pub fn parse_geo_point(value: &str) -> Result<GeoPoint, GeoSpreadError> {
    let invalid = || GeoSpreadError::InvalidArgument(format!("expected `lat,lng`, got `{value}`"));
    let (lat, lng) = value.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    let origin = GeoPoint::new(lat, lng);
    if !origin.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
        return Err(invalid());
    }
    Ok(origin)
}

/// Applies a `--log-level` value: bare levels set the global level, `module=level` pairs set
/// module filters.
///
/// # Errors
///
/// Returns an error if any level is not one of `off`, `error`, `warn`, `info`, `debug`,
/// `trace`.
pub fn apply_log_level(levels: &str) -> Result<(), GeoSpreadError> {
    let parse_level = |level: &str| {
        LevelFilter::from_str(level.trim()).map_err(|_| {
            GeoSpreadError::InvalidArgument(format!("unknown log level `{}`", level.trim()))
        })
    };
    for part in levels.split(',').filter(|part| !part.trim().is_empty()) {
        match part.split_once('=') {
            Some((module, level)) => set_module_filter(module.trim(), parse_level(level)?),
            None => set_log_level(parse_level(part)?),
        }
    }
    Ok(())
}

/// Builds the outbreak configuration: the config file if given, then command line overrides.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded.
pub fn resolve_config(args: &BaseArgs) -> Result<OutbreakConfig, GeoSpreadError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => OutbreakConfig::default(),
    };

    if let Some(origin) = args.origin {
        config.origin = origin;
    }
    if let Some(pathogen) = args.pathogen {
        config.pathogen = Some(pathogen);
        config.parameters = None;
    }
    if let Some(r0) = args.r0 {
        config.parameters = Some(SimulationParameters {
            r0,
            ..config.simulation_parameters()
        });
    }
    if let Some(speed) = args.speed {
        config.simulation_speed = speed;
    }
    config.mitigations.travel_restrictions |= args.travel_restrictions;
    config.mitigations.social_distancing |= args.social_distancing;
    config.mitigations.mask_usage |= args.mask_usage;
    if let Some(vaccination) = args.vaccination {
        config.mitigations.vaccination = vaccination;
    }
    config.max_days = args.days.or(config.max_days).or(Some(DEFAULT_DAYS));
    Ok(config)
}

/// Runs an outbreak with the default cli arguments
///
/// `setup_fn` runs after the outbreak is configured and before it starts, so it can add
/// plans (for example a scheduled stop) or change the configuration.
///
/// # Errors
///
/// Returns an error if argument parsing, configuration, or the setup function fails.
pub fn run_with_args<F>(setup_fn: F) -> Result<(Context, BaseArgs), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Context, &BaseArgs) -> Result<(), GeoSpreadError>,
{
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    let context = run_with_args_internal(&args, setup_fn)?;
    Ok((context, args))
}

fn run_with_args_internal<F>(args: &BaseArgs, setup_fn: F) -> Result<Context, GeoSpreadError>
where
    F: FnOnce(&mut Context, &BaseArgs) -> Result<(), GeoSpreadError>,
{
    if let Some(levels) = &args.log_level {
        apply_log_level(levels)?;
    }

    let config = resolve_config(args)?;
    let mut context = Context::new();
    context.init_random(args.random_seed);
    context.init_outbreak(&config);

    setup_fn(&mut context, args)?;

    context.start_outbreak();
    context.execute();
    Ok(context)
}

#[derive(Serialize)]
struct OutbreakReport<'a> {
    origin: GeoPoint,
    status: OutbreakStatus,
    history: &'a [DailySummary],
    sites: &'a [InfectionSite],
}

/// Writes the end-of-run output in the requested format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_output<W: Write>(
    context: &Context,
    format: OutputFormat,
    writer: &mut W,
) -> Result<(), GeoSpreadError> {
    match format {
        OutputFormat::Summary => {
            let origin = context.outbreak_origin();
            writeln!(writer, "Origin: {:.2}, {:.2}", origin.lat, origin.lng)?;
            writeln!(writer, "{}", context.outbreak_status())?;
        }
        OutputFormat::Json => {
            let report = OutbreakReport {
                origin: context.outbreak_origin(),
                status: context.outbreak_status(),
                history: context.outbreak_history(),
                sites: context.visible_infection_sites(),
            };
            serde_json::to_writer_pretty(&mut *writer, &report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
