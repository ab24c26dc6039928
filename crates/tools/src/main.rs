use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use datamap::{Datamap, Invocation};
use formats::{DataType, load_bytes, load_data, load_topology};
use options::{Config, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render choropleth maps to SVG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw a topology (and optional overlays) into an SVG document
    Render(RenderArgs),

    /// List the objects a topology holds (usable as --scope)
    Objects {
        /// TopoJSON file or http(s) URL
        #[arg(long)]
        topology: String,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// TopoJSON file or http(s) URL
    #[arg(long)]
    topology: String,

    /// Choropleth data keyed by region id (file or URL)
    #[arg(long)]
    data: Option<String>,

    /// Format of --data: json or csv
    #[arg(long, default_value = "json")]
    data_type: String,

    /// JSON object of map options, merged over the defaults
    #[arg(long)]
    options: Option<String>,

    /// Topology object to draw (overrides --options)
    #[arg(long)]
    scope: Option<String>,

    /// equirectangular, mercator or orthographic (overrides --options)
    #[arg(long)]
    projection: Option<String>,

    /// Width in pixels (overrides --options)
    #[arg(long)]
    width: Option<f64>,

    /// Emit a viewBox-scaled document instead of a fixed size
    #[arg(long)]
    responsive: bool,

    /// JSON array of bubbles to draw
    #[arg(long)]
    bubbles: Option<String>,

    /// JSON array of arcs to draw
    #[arg(long)]
    arcs: Option<String>,

    /// Label every region
    #[arg(long)]
    labels: bool,

    /// Add a legend of the configured fills
    #[arg(long)]
    legend: bool,

    /// Title shown above the legend
    #[arg(long, requires = "legend")]
    legend_title: Option<String>,

    /// Draw latitude/longitude lines beneath the regions
    #[arg(long)]
    graticule: bool,

    /// Output file (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Render(args) => render(args).await,
        Command::Objects { topology } => {
            for name in load_topology(&topology).await?.object_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

async fn render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = match &args.options {
        Some(source) => Config::from_json(read_json(source).await?)
            .ok_or("--options must hold a JSON object")?,
        None => Config::new(),
    };
    let options = with_overrides(base, &args);

    let topology = load_topology(&args.topology).await?;
    let data = match &args.data {
        Some(source) => Some(load_data(source, DataType::from_name(&args.data_type)?).await?),
        None => None,
    };

    let mut map = Datamap::new(options, &topology)?;
    if let Some(data) = &data {
        map.update_choropleth(data, false)?;
    }
    if args.graticule {
        map.graticule(Invocation::new())?;
    }
    if let Some(source) = &args.arcs {
        let arcs = Value::from(read_json(source).await?);
        map.arc(&arcs, Invocation::new())?;
    }
    if let Some(source) = &args.bubbles {
        let bubbles = Value::from(read_json(source).await?);
        map.bubbles(&bubbles, Invocation::new())?;
    }
    if args.labels {
        map.labels(&Value::Null, Invocation::new())?;
    }
    if args.legend {
        let settings = Config::new().with("legendTitle", args.legend_title.clone());
        map.legend(&settings.into(), Invocation::new())?;
    }
    let report = map.settle();
    let svg = map.to_svg();

    match &args.out {
        Some(path) => {
            tokio::fs::write(path, &svg).await?;
            info!(
                out = %path.display(),
                bytes = svg.len(),
                transitions = report.applied,
                "map rendered"
            );
        }
        None => println!("{svg}"),
    }
    Ok(())
}

/// Applies the flags that override `--options`.
fn with_overrides(mut options: Config, args: &RenderArgs) -> Config {
    if let Some(scope) = &args.scope {
        options.set("scope", scope.as_str());
    }
    if let Some(projection) = &args.projection {
        options.set("projection", projection.as_str());
    }
    if let Some(width) = args.width {
        options.set("width", width);
    }
    if args.responsive {
        options.set("responsive", true);
    }
    options
}

async fn read_json(source: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let bytes = load_bytes(source).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
