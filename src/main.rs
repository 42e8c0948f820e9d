use anyhow::{Context, Result};
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use photogrid::build::{arrange_request, build_gallery};
use photogrid::config::Config;
use photogrid::gallery::{self, LayoutRequest};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("ERROR: {:?}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PHOTOGRID_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("photogrid=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let matches = App::new("photogrid")
        .version(crate_version!())
        .about("Arranges photo galleries into a 6-column grid mosaic")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .takes_value(true)
                .value_name("DIR")
                .help("Directory to search (upwards) for photogrid.yaml [default: .]"),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .short("j")
                .takes_value(true)
                .value_name("N")
                .help("Worker threads for reading image dimensions [default: CPU count]"),
        )
        .subcommand(
            SubCommand::with_name("arrange")
                .about("Prints the grid layout of a gallery or image list as YAML")
                .arg(
                    Arg::with_name("INPUT")
                        .required(true)
                        .help("Gallery manifest, or a list of {id, aspectRatio, width, height}"),
                ),
        )
        .subcommand(
            SubCommand::with_name("render")
                .about("Renders a gallery manifest to an HTML page")
                .arg(
                    Arg::with_name("GALLERY")
                        .required(true)
                        .help("Gallery manifest"),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("Output directory [default: from photogrid.yaml]"),
                ),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists the gallery manifests in a directory, newest first")
                .arg(
                    Arg::with_name("DIR")
                        .required(true)
                        .help("Directory of gallery manifests"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("arrange", Some(sub)) => arrange(&matches, sub),
        ("render", Some(sub)) => render(&matches, sub),
        ("list", Some(sub)) => list(sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn config(matches: &ArgMatches, output: Option<&Path>) -> Result<Config> {
    let project = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let threads = match matches.value_of("threads") {
        Some(n) => Some(
            n.parse::<usize>()
                .with_context(|| format!("Invalid --threads value `{}`", n))?,
        ),
        None => None,
    };
    Config::from_directory(&project, output, threads)
}

fn arrange(matches: &ArgMatches, sub: &ArgMatches) -> Result<()> {
    let config = config(matches, None)?;
    let input = Path::new(sub.value_of("INPUT").unwrap_or_default());
    let request = LayoutRequest::from_path(input)?;
    let placed = arrange_request(&config, request)
        .with_context(|| format!("Arranging `{}`", input.display()))?;
    serde_yaml::to_writer(std::io::stdout(), &placed)?;
    Ok(())
}

fn render(matches: &ArgMatches, sub: &ArgMatches) -> Result<()> {
    let output = sub.value_of("output").map(PathBuf::from);
    let config = config(matches, output.as_deref())?;
    let manifest = Path::new(sub.value_of("GALLERY").unwrap_or_default());
    let path = build_gallery(&config, manifest)
        .with_context(|| format!("Rendering `{}`", manifest.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn list(sub: &ArgMatches) -> Result<()> {
    let directory = Path::new(sub.value_of("DIR").unwrap_or_default());
    let galleries = gallery::index(directory)
        .with_context(|| format!("Listing `{}`", directory.display()))?;
    for (path, gallery) in galleries {
        println!(
            "{}\t{}\t{}",
            gallery.date.as_deref().unwrap_or("-"),
            gallery.title,
            path.display()
        );
    }
    Ok(())
}
