use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use aura_artifact::{Artifact, ArtifactId};
use aura_core::{selection_from_ids, BatchOutcome, Studio, StudioConfig, StudioError, StudioMode};
use aura_prompt::{catalog, AspectRatio};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

mod inputs;

fn cli() -> Command {
    Command::new("aura")
        .version(aura_core::VERSION)
        .about("Fashion and product imagery studio")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("store-dir")
                .long("store-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory for persisted history (overrides config)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(Command::new("presets").about("List styles, scenes and palette colors"))
        .subcommand(
            Command::new("generate")
                .about("Run a variation batch (model, product, model_product, background)")
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .default_value("model")
                        .value_parser(parse_mode)
                        .help("Studio mode"),
                )
                .arg(image_arg("subject", "Subject photo"))
                .arg(products_arg())
                .arg(Arg::new("style").long("style").help("Style preset id"))
                .arg(Arg::new("scene").long("scene").help("Scene preset id"))
                .arg(Arg::new("custom").long("custom").help("Custom scene or style text"))
                .arg(Arg::new("color").long("color").help("Palette color (hex)"))
                .arg(aspect_arg()),
        )
        .subcommand(
            Command::new("angles")
                .about("Re-shoot a stored artifact from the standard angle list")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("directors-cut")
                .about("Exhaustive reshoot of a stored artifact")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("composite")
                .about("Subject interacting with product references")
                .arg(image_arg("subject", "Subject photo").required(true))
                .arg(products_arg().required(true))
                .arg(Arg::new("interaction").long("interaction").help("How the model holds or uses the products"))
                .arg(
                    Arg::new("scenario")
                        .long("scenario")
                        .default_value("Studio Session")
                        .help("Scenario label of the subject shot"),
                )
                .arg(aspect_arg()),
        )
        .subcommand(
            Command::new("carousel")
                .about("Five-slide social carousel")
                .arg(
                    Arg::new("contextual")
                        .long("contextual")
                        .action(ArgAction::SetTrue)
                        .help("Story-driven carousel from three reference shots"),
                )
                .arg(image_arg("subject", "Model photo (kit carousel)"))
                .arg(products_arg())
                .arg(image_arg("model-with-product", "Model holding the product (contextual)"))
                .arg(image_arg("model-only", "Model alone (contextual)"))
                .arg(image_arg("product-only", "Product alone (contextual)"))
                .arg(Arg::new("context").long("context").help("Story context (contextual)"))
                .arg(Arg::new("theme").long("theme").help("Theme color (hex)"))
                .arg(aspect_arg()),
        )
        .subcommand(
            Command::new("copy")
                .about("Marketing copy for a product")
                .arg(Arg::new("name").long("name").required(true).help("Product name"))
                .arg(Arg::new("context").long("context").required(true).help("Product benefits"))
                .arg(Arg::new("audience").long("audience").help("Target audience")),
        )
        .subcommand(
            Command::new("history").about("List stored artifacts, newest first").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
        .subcommand(
            Command::new("export")
                .about("Write an artifact's payload to a file")
                .arg(id_arg())
                .arg(
                    Arg::new("out")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output path"),
                ),
        )
        .subcommand(Command::new("delete").about("Remove one artifact").arg(id_arg()))
        .subcommand(Command::new("clear").about("Remove every stored artifact"))
}

fn image_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn products_arg() -> Arg {
    Arg::new("product")
        .long("product")
        .action(ArgAction::Append)
        .value_parser(value_parser!(PathBuf))
        .help("Product photo (repeatable)")
}

fn aspect_arg() -> Arg {
    Arg::new("aspect")
        .long("aspect")
        .value_parser(|s: &str| s.parse::<AspectRatio>())
        .help("Aspect ratio: 9:16, 1:1 or 3:4")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(|s: &str| s.parse::<ArtifactId>())
        .help("Artifact id")
}

fn parse_mode(s: &str) -> Result<StudioMode, StudioError> {
    let mode = s.parse::<StudioMode>()?;
    match mode {
        StudioMode::Model | StudioMode::Product | StudioMode::ModelProduct | StudioMode::Background => Ok(mode),
        other => Err(StudioError::input(format!("'{other}' has its own subcommand"))),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if installed.is_err() {
        eprintln!("tracing subscriber already installed");
    }
}

/// Process exit status for a failed command
fn exit_status(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<StudioError>() {
        Some(StudioError::InputInvalid(_)) => 2,
        Some(StudioError::BatchRejected(_)) => 3,
        Some(StudioError::Config(_)) => 4,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit_status(&error))
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<()> {
    if let Some(("presets", _)) = matches.subcommand() {
        print_presets();
        return Ok(());
    }

    let studio = open_studio(matches).await?;
    match matches.subcommand() {
        Some(("generate", args)) => {
            let mode = args.get_one::<StudioMode>("mode").copied().unwrap_or(StudioMode::Model);
            let mut session = studio.new_session(mode);
            session.selection = selection_from_ids(
                args.get_one::<String>("style").map(String::as_str),
                args.get_one::<String>("scene").map(String::as_str),
                args.get_one::<String>("custom").map(String::as_str),
                args.get_one::<String>("color").map(String::as_str),
            );
            if let Some(aspect) = args.get_one::<AspectRatio>("aspect") {
                session.aspect_ratio = *aspect;
            }
            session.inputs.subject = inputs::read_optional(args.get_one::<PathBuf>("subject")).await?;
            session.inputs.products = inputs::read_all(args.get_many::<PathBuf>("product").into_iter().flatten()).await?;

            let outcome = studio.generate(&mut session).await?;
            print_outcome(&outcome);
        }
        Some((name @ ("angles" | "directors-cut"), args)) => {
            let source = stored(&studio, args).await?;
            let mut session = studio.new_session(StudioMode::Model);
            let outcome = if name == "angles" {
                studio.angle_set(&mut session, &source).await?
            } else {
                studio.directors_cut(&mut session, &source).await?
            };
            print_outcome(&outcome);
        }
        Some(("composite", args)) => {
            let mut session = studio.new_session(StudioMode::ModelProduct);
            if let Some(aspect) = args.get_one::<AspectRatio>("aspect") {
                session.aspect_ratio = *aspect;
            }
            session.inputs.subject = inputs::read_optional(args.get_one::<PathBuf>("subject")).await?;
            session.inputs.products = inputs::read_all(args.get_many::<PathBuf>("product").into_iter().flatten()).await?;

            let scenario = args.get_one::<String>("scenario").map_or("Studio Session", String::as_str);
            let interaction = args.get_one::<String>("interaction").map(String::as_str);
            let outcome = studio.composite(&mut session, interaction, scenario).await?;
            print_outcome(&outcome);
        }
        Some(("carousel", args)) => {
            let mode = if args.get_flag("contextual") {
                StudioMode::ContextualCarousel
            } else {
                StudioMode::Carousel
            };
            let mut session = studio.new_session(mode);
            if let Some(aspect) = args.get_one::<AspectRatio>("aspect") {
                session.aspect_ratio = *aspect;
            }
            let form = &mut session.inputs;
            form.subject = inputs::read_optional(args.get_one::<PathBuf>("subject")).await?;
            form.products = inputs::read_all(args.get_many::<PathBuf>("product").into_iter().flatten()).await?;
            form.model_with_product = inputs::read_optional(args.get_one::<PathBuf>("model-with-product")).await?;
            form.model_only = inputs::read_optional(args.get_one::<PathBuf>("model-only")).await?;
            form.product_only = inputs::read_optional(args.get_one::<PathBuf>("product-only")).await?;
            form.context_text = args.get_one::<String>("context").cloned();
            form.theme_color = args.get_one::<String>("theme").cloned();

            let outcome = studio.generate(&mut session).await?;
            print_outcome(&outcome);
        }
        Some(("copy", args)) => {
            let mut session = studio.new_session(StudioMode::Copy);
            session.inputs.product_name = args.get_one::<String>("name").cloned();
            session.inputs.context_text = args.get_one::<String>("context").cloned();
            session.inputs.audience = args.get_one::<String>("audience").cloned();

            let outcome = studio.generate(&mut session).await?;
            print_outcome(&outcome);
            for bundle in outcome.artifacts.iter().filter_map(|a| a.payload().as_copy()) {
                println!("\n== EMAIL ==\n{}", bundle.email_content);
                println!("\n== SOCIAL ==\n{}", bundle.social_content);
                println!("\n== SALES PAGE ==\n{}", bundle.sales_page_content);
                for link in &bundle.grounding_links {
                    println!("source: {} {}", link.uri, link.title);
                }
            }
        }
        Some(("history", args)) => {
            let history = studio.history().await;
            if args.get_flag("json") {
                let rows: Vec<_> = history.iter().map(summary_json).collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if history.is_empty() {
                println!("history is empty");
            } else {
                for artifact in &history {
                    println!("{}", summary_line(artifact));
                }
            }
        }
        Some(("export", args)) => {
            let artifact = stored(&studio, args).await?;
            let out = args.get_one::<PathBuf>("out").context("missing output path")?;
            inputs::export(&artifact, out).await?;
            println!("wrote {}", out.display());
        }
        Some(("delete", args)) => {
            let id = artifact_id(args)?;
            if studio.delete(id).await {
                println!("deleted {id}");
            } else {
                println!("{id} was not in history");
            }
        }
        Some(("clear", _)) => {
            studio.clear().await;
            println!("history cleared");
        }
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
    Ok(())
}

async fn open_studio(matches: &ArgMatches) -> Result<Studio> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StudioConfig::from_toml_file(path).map_err(StudioError::from)?,
        None => StudioConfig::new(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("store-dir") {
        config = config.with_store_dir(dir.clone());
    }
    let config = config.with_env_overrides();
    if config.gemini.api_key().is_none() {
        tracing::warn!("no API key configured; generation commands will be rejected");
    }
    Ok(Studio::open(config).await?)
}

fn artifact_id(args: &ArgMatches) -> Result<ArtifactId> {
    args.get_one::<ArtifactId>("id").copied().context("missing artifact id")
}

async fn stored(studio: &Studio, args: &ArgMatches) -> Result<Artifact> {
    let id = artifact_id(args)?;
    let artifact = studio
        .get(id)
        .await
        .ok_or_else(|| StudioError::input(format!("no artifact {id} in history")))?;
    Ok(artifact)
}

fn summary_line(artifact: &Artifact) -> String {
    let slide = artifact
        .slide()
        .map(|s| format!(" [{}/{}]", s.position, s.label))
        .unwrap_or_default();
    format!(
        "{}  {:<13} {}  {}{}",
        artifact.id(),
        artifact.category().as_str(),
        artifact.scenario_label(),
        artifact.prompt_summary(),
        slide
    )
}

fn summary_json(artifact: &Artifact) -> serde_json::Value {
    serde_json::json!({
        "id": artifact.id().to_string(),
        "category": artifact.category().as_str(),
        "createdAt": artifact.created_at().value(),
        "createdWall": artifact.created_wall().to_rfc3339(),
        "promptSummary": artifact.prompt_summary(),
        "scenarioLabel": artifact.scenario_label(),
        "slide": artifact.slide().map(|s| serde_json::json!({ "position": s.position, "label": s.label })),
        "references": artifact.references().iter().map(ToString::to_string).collect::<Vec<_>>(),
        "videoNarrative": artifact.derived_video_narrative(),
    })
}

fn print_outcome(outcome: &BatchOutcome) {
    println!(
        "batch {} ({}): {}/{} succeeded",
        outcome.batch_id,
        outcome.category,
        outcome.artifacts.len(),
        outcome.requested
    );
    for artifact in &outcome.artifacts {
        println!("  {}", summary_line(artifact));
    }
    for failed in &outcome.failures {
        println!("  slot {} failed: {}", failed.index + 1, failed.failure);
    }
    if !outcome.persisted {
        println!("warning: results are kept in memory only");
    }
    if !outcome.evicted.is_empty() {
        println!("{} older artifact(s) evicted", outcome.evicted.len());
    }
    if outcome.needs_retry() {
        println!("nothing was generated; try again");
    }
}

fn print_presets() {
    println!("Styles:");
    for preset in catalog::STYLES {
        println!("  {:<20} {}", preset.id, preset.label);
    }
    println!("Scenes:");
    for preset in catalog::SCENES {
        println!("  {:<20} {}", preset.id, preset.label);
    }
    println!("Colors:");
    for swatch in catalog::COLORS {
        let core = if swatch.hex == catalog::CORE_COLOR { " (core)" } else { "" };
        println!("  {:<20} {}{core}", swatch.hex, swatch.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_generate() {
        let matches = cli()
            .try_get_matches_from([
                "aura", "--store-dir", "/tmp/aura", "generate", "--mode", "product", "--product", "a.png",
                "--product", "b.jpg", "--aspect", "1:1",
            ])
            .unwrap();
        assert_eq!(matches.get_one::<PathBuf>("store-dir"), Some(&PathBuf::from("/tmp/aura")));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "generate");
        assert_eq!(args.get_one::<StudioMode>("mode"), Some(&StudioMode::Product));
        assert_eq!(args.get_many::<PathBuf>("product").unwrap().count(), 2);
        assert_eq!(args.get_one::<AspectRatio>("aspect"), Some(&AspectRatio::Square));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(cli().try_get_matches_from(["aura", "generate", "--mode", "copy"]).is_err());
        assert!(cli().try_get_matches_from(["aura", "generate", "--aspect", "4:5"]).is_err());
        assert!(cli().try_get_matches_from(["aura", "delete", "not-a-uuid"]).is_err());
        assert!(cli().try_get_matches_from(["aura"]).is_err());
    }

    #[test]
    fn exit_status_by_error_kind() {
        let input = anyhow::Error::from(StudioError::input("x"));
        assert_eq!(exit_status(&input), 2);
        assert_eq!(exit_status(&anyhow::anyhow!("io")), 1);
    }
}
