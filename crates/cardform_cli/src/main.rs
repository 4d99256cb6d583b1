//! Card form simulator
//!
//! Walk focus targets through a headless card form and print what the form
//! measured, scrolled and focused.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use cardform::{logging, FormController, FormProps};
use cardform_core::{resolve, FieldId, FormConfig, RequirementFlags};
use cardform_layout::ScrollState;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

mod sim;

use sim::{SimField, SimSurface, Step, Timeline};

/// Row width when the configuration leaves it unset
const DEFAULT_FIELD_WIDTH: f32 = 160.0;

/// Frame step for the headless surface
const FRAME_MS: u32 = 16;

/// Give up on a scroll that has not settled after this long
const SETTLE_TIMEOUT_MS: u32 = 5_000;

#[derive(Parser)]
#[command(name = "cardform-sim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate focus-driven scrolling in the card form", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML form configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show the verification code field
    #[arg(long, global = true)]
    cvc: bool,

    /// Show the cardholder name field
    #[arg(long, global = true)]
    name: bool,

    /// Show the postal code field
    #[arg(long, global = true)]
    postal_code: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus each target in turn and print the timeline
    Walk {
        /// Focus targets (number, expiry, cvc, name, postalCode)
        #[arg(required = true)]
        targets: Vec<FieldId>,

        /// Request every target before any layout finishes
        #[arg(long)]
        overlap: bool,

        /// Field whose measurement fails
        #[arg(long)]
        fail: Option<FieldId>,

        /// Jump instead of animating
        #[arg(long)]
        instant: bool,

        /// Print the timeline as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the composed field configurations as JSON
    Compose {
        /// Field values as field=value
        #[arg(long = "value")]
        values: Vec<String>,
    },

    /// List the visible fields in form order
    Fields,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(if cli.verbose {
        "cardform=debug,cardform_layout=debug,cardform_sim=debug"
    } else {
        "warn"
    });

    let config = load_config(cli.config.as_deref())?;
    let flags = RequirementFlags {
        requires_cvc: cli.cvc,
        requires_name: cli.name,
        requires_postal_code: cli.postal_code,
    };

    match cli.command {
        Commands::Walk {
            targets,
            overlap,
            fail,
            instant,
            json,
        } => cmd_walk(config, flags, &targets, overlap, fail, instant, json),
        Commands::Compose { values } => cmd_compose(config, flags, &values),
        Commands::Fields => cmd_fields(flags),
    }
}

fn load_config(path: Option<&Path>) -> Result<FormConfig> {
    match path {
        Some(path) => {
            let config = FormConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            info!("Loaded form configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(FormConfig::default()),
    }
}

fn cmd_walk(
    config: FormConfig,
    flags: RequirementFlags,
    targets: &[FieldId],
    overlap: bool,
    fail: Option<FieldId>,
    instant: bool,
    json: bool,
) -> Result<()> {
    let timeline = Timeline::default();
    let width = config.field_width.unwrap_or(DEFAULT_FIELD_WIDTH);

    let surface = SimSurface::new(ScrollState::new(), timeline.clone());
    let mut form = FormController::new(config, surface).with_animated_scroll(!instant);

    // Editors exist only for visible fields, laid out left to right
    let editors: Vec<Arc<SimField>> = resolve(flags)
        .iter()
        .enumerate()
        .map(|(i, field)| {
            Arc::new(SimField::new(
                field,
                width * i as f32,
                fail == Some(field),
                timeline.clone(),
            ))
        })
        .collect();
    for editor in &editors {
        form.mount_field(editor.field(), editor.clone());
    }

    form.activate(FormProps::new(flags));

    if overlap {
        for &target in targets {
            timeline.push(Step::Target { field: target });
            form.update(FormProps::new(flags).with_focus(Some(target)));
        }
        // Layout finishes newest first
        for editor in editors.iter().rev() {
            if editor.lay_out() > 0 {
                pump(&mut form, &timeline);
            }
        }
        settle(&mut form, &timeline)?;
    } else {
        for &target in targets {
            timeline.push(Step::Target { field: target });
            form.update(FormProps::new(flags).with_focus(Some(target)));
            for editor in &editors {
                editor.lay_out();
            }
            pump(&mut form, &timeline);
            settle(&mut form, &timeline)?;
        }
    }

    let steps = timeline.steps();
    if json {
        let out = serde_json::to_string_pretty(&steps).context("Failed to serialize timeline")?;
        println!("{}", out);
    } else {
        for step in &steps {
            println!("{}", step);
        }
    }

    Ok(())
}

fn pump(form: &mut FormController<SimSurface>, timeline: &Timeline) {
    let report = form.pump();
    debug!("pump: {:?}", report);
    if report.stale > 0 {
        timeline.push(Step::Stale {
            count: report.stale,
        });
    }
    for diagnostic in form.take_diagnostics() {
        timeline.push(Step::Diagnostic {
            message: diagnostic.to_string(),
        });
    }
}

/// Tick the surface until the running scroll settles
fn settle(form: &mut FormController<SimSurface>, timeline: &Timeline) -> Result<()> {
    let mut elapsed_ms = 0;
    loop {
        if let Some(generation) = form.surface_mut().state.tick(FRAME_MS as f32 / 1000.0) {
            let offset = form.surface().state.offset_x();
            timeline.push(Step::Settled {
                generation: generation.get(),
                offset,
                elapsed_ms,
            });
            form.on_scroll_settled(generation);
            return Ok(());
        }
        if !form.surface().state.is_animating() {
            return Ok(());
        }

        elapsed_ms += FRAME_MS;
        if elapsed_ms > SETTLE_TIMEOUT_MS {
            anyhow::bail!("Scroll did not settle within {}ms", SETTLE_TIMEOUT_MS);
        }
    }
}

fn cmd_compose(
    config: FormConfig,
    flags: RequirementFlags,
    values: &[String],
) -> Result<()> {
    let mut props = FormProps::new(flags);
    for entry in values {
        let (field, value) = entry
            .split_once('=')
            .with_context(|| format!("Expected field=value, got '{}'", entry))?;
        let field: FieldId = field
            .parse()
            .with_context(|| format!("Invalid value '{}'", entry))?;
        props = props.with_value(field, value);
    }

    let timeline = Timeline::default();
    let mut form = FormController::new(config, SimSurface::new(ScrollState::new(), timeline));
    form.activate(props);

    let out = serde_json::to_string_pretty(form.configurations())
        .context("Failed to serialize field configurations")?;
    println!("{}", out);
    Ok(())
}

fn cmd_fields(flags: RequirementFlags) -> Result<()> {
    for field in resolve(flags).iter() {
        let optional = if field.is_optional() { " (optional)" } else { "" };
        println!("{}{}", field, optional);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_walk_args_parse_field_names() {
        let cli = Cli::parse_from([
            "cardform-sim",
            "--cvc",
            "walk",
            "expiry",
            "cvc",
            "--fail",
            "cvc",
        ]);
        assert!(cli.cvc);
        match cli.command {
            Commands::Walk { targets, fail, .. } => {
                assert_eq!(targets, vec![FieldId::Expiry, FieldId::Cvc]);
                assert_eq!(fail, Some(FieldId::Cvc));
            }
            _ => panic!("expected walk"),
        }
    }

    #[test]
    fn test_compose_args_collect_values() {
        let cli = Cli::parse_from([
            "cardform-sim",
            "compose",
            "--value",
            "number=4242",
            "--value",
            "expiry=12/30",
        ]);
        match cli.command {
            Commands::Compose { values } => {
                assert_eq!(values, vec!["number=4242", "expiry=12/30"]);
            }
            _ => panic!("expected compose"),
        }
        assert!(Cli::try_parse_from(["cardform-sim", "compose", "--focus", "cvc"]).is_err());
    }

    #[test]
    fn test_settle_reaches_scroll_target() {
        let timeline = Timeline::default();
        let surface = SimSurface::new(ScrollState::new(), timeline.clone());
        let mut form = FormController::new(FormConfig::default(), surface);
        let editor = Arc::new(SimField::new(FieldId::Expiry, 300.0, false, timeline.clone()));
        form.mount_field(FieldId::Expiry, editor.clone());

        form.activate(FormProps::default().with_focus(Some(FieldId::Expiry)));
        editor.lay_out();
        pump(&mut form, &timeline);
        settle(&mut form, &timeline).unwrap();

        assert_eq!(form.surface().state.offset_x(), 260.0);
        assert!(matches!(
            timeline.steps().last(),
            Some(Step::Settled { generation: 1, .. })
        ));
    }
}
