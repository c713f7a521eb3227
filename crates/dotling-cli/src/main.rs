use dotling::{LinkRecord, NodeRecord, Simulator, Snapshot, Tunables};
use serde::Deserialize;
use std::io::Read;

/// Cooling schedule of the stepping loop. Alpha decays geometrically each
/// tick and the run ends once it falls below the floor, mirroring the force
/// loop this engine was built to be driven by.
const DEFAULT_ALPHA: f64 = 0.1;
const ALPHA_DECAY: f64 = 0.99;
const ALPHA_FLOOR: f64 = 0.005;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Layout(dotling::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<dotling::Error> for CliError {
    fn from(value: dotling::Error) -> Self {
        Self::Layout(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    out: Option<String>,
    ticks: Option<u64>,
    alpha: f64,
    tunables: Tunables,
}

/// `{nodes, links}` graph file as produced by the data pipeline.
#[derive(Debug, Deserialize)]
struct GraphFile {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    links: Vec<LinkRecord>,
}

fn usage() -> &'static str {
    "dotling-cli\n\
\n\
USAGE:\n\
  dotling-cli [layout] [--ticks <n>] [--alpha <a>] [--pretty] [--out <path>]\n\
              [--width <w>] [--height <h>] [--pop-scale <v>] [--area-scale <v>]\n\
              [--size-power <v>] [--start-density <v>] [--target-density <v>]\n\
              [--step-density <v>] [--charge-gain <v>] [--link-gain <v>]\n\
              [--home-gain <v>] [--home-even-density <v>] [--frame-gain <v>]\n\
              [--frame-padding <v>] [--sea-distance <v>] [--group-distance <v>]\n\
              [--even-octaves <n>] [<graph.json>|-]\n\
\n\
NOTES:\n\
  - If <graph.json> is omitted or '-', input is read from stdin.\n\
  - The input is a {nodes, links} JSON graph; links are optional.\n\
  - The run steps with a decaying alpha (0.1, ×0.99/tick, floor 0.005);\n\
    --ticks caps the tick count, --alpha overrides the starting alpha.\n\
  - The final snapshot JSON is printed to stdout; use --out to write a file.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        alpha: DEFAULT_ALPHA,
        tunables: Tunables::default(),
        ..Default::default()
    };

    fn next_f64<'a>(
        it: &mut impl Iterator<Item = &'a String>,
    ) -> Result<f64, CliError> {
        let Some(raw) = it.next() else {
            return Err(CliError::Usage(usage()));
        };
        let value = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
        if !value.is_finite() {
            return Err(CliError::Usage(usage()));
        }
        Ok(value)
    }

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "--pretty" => args.pretty = true,
            "--ticks" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.ticks = Some(n.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--alpha" => {
                args.alpha = next_f64(&mut it)?;
                if args.alpha <= 0.0 {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--out" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(path.clone());
            }
            "--width" => args.tunables.width = next_f64(&mut it)?,
            "--height" => args.tunables.height = next_f64(&mut it)?,
            "--pop-scale" => args.tunables.pop_scale = next_f64(&mut it)?,
            "--area-scale" => args.tunables.area_scale = next_f64(&mut it)?,
            "--size-power" => args.tunables.size_power = next_f64(&mut it)?,
            "--start-density" => args.tunables.start_density = next_f64(&mut it)?,
            "--target-density" => args.tunables.target_density = next_f64(&mut it)?,
            "--step-density" => args.tunables.step_density = next_f64(&mut it)?,
            "--charge-gain" => args.tunables.charge_gain = next_f64(&mut it)?,
            "--link-gain" => args.tunables.link_gain = next_f64(&mut it)?,
            "--home-gain" => args.tunables.home_gain = next_f64(&mut it)?,
            "--home-even-density" => args.tunables.home_even_density = next_f64(&mut it)?,
            "--frame-gain" => args.tunables.frame_gain = next_f64(&mut it)?,
            "--frame-padding" => args.tunables.frame_padding = next_f64(&mut it)?,
            "--sea-distance" => args.tunables.sea_distance = next_f64(&mut it)?,
            "--group-distance" => args.tunables.group_distance = next_f64(&mut it)?,
            "--even-octaves" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.tunables.even_octaves =
                    n.parse::<u32>().map_err(|_| CliError::Usage(usage()))?;
            }
            other => {
                if other.starts_with("--") {
                    return Err(CliError::Usage(usage()));
                }
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(other.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_snapshot(snapshot: &Snapshot, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let Command::Layout = args.command;

    let text = read_input(args.input.as_deref())?;
    let graph: GraphFile = serde_json::from_str(&text)?;

    let mut sim = Simulator::new(graph.nodes, graph.links, args.tunables)?;
    sim.start();

    let mut alpha = args.alpha;
    let mut ticks = 0u64;
    while alpha >= ALPHA_FLOOR {
        if args.ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        sim.step(alpha);
        alpha *= ALPHA_DECAY;
        ticks += 1;
    }
    sim.pause();

    write_snapshot(&Snapshot::capture(&sim), args.pretty, args.out.as_deref())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
