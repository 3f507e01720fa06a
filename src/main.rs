use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context};
use log::info;

extern crate clap;
use clap::{App, Arg, ArgMatches};

use pairgenome::app::{Event, SourceMode, ViewMode};
use pairgenome::geom::Point;
use pairgenome::gesture::PointerEvent;
use pairgenome::layers::GridLayout;
use pairgenome::record::read_source_colors;
use pairgenome::render::{write_png, write_svg};
use pairgenome::{Config, DataSource, Genome, Strategy};

fn parse_opt<T: FromStr>(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        None => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid value {:?} for --{}: {}", v, name, e)),
    }
}

fn parse_xy(value: &str, name: &str) -> anyhow::Result<(f64, f64)> {
    let parsed: Option<(f64, f64)> = value
        .split_once(',')
        .and_then(|(x, y)| Some((x.trim().parse().ok()?, y.trim().parse().ok()?)));
    parsed.with_context(|| format!("--{} expects two comma-separated numbers, got {:?}", name, value))
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_file(Path::new(path))
            .with_context(|| format!("loading config {}", path))?,
        None => Config::default(),
    };
    if let Some(v) = parse_opt(matches, "width")? {
        config.width = v;
    }
    if let Some(v) = parse_opt(matches, "height")? {
        config.height = v;
    }
    if let Some(v) = parse_opt(matches, "margin")? {
        config.margin = v;
    }
    if let Some(v) = parse_opt(matches, "color-scale")? {
        config.color_scale = v;
    }
    if let Some(v) = parse_opt(matches, "coarse-cutoff")? {
        config.coarse_cutoff = v;
    }
    if let Some(v) = parse_opt::<GridLayout>(matches, "layout")? {
        config.layout = v;
    }
    if let Some(v) = parse_opt::<Strategy>(matches, "strategy")? {
        config.strategy = v;
    }
    config.validate()?;
    Ok(config)
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;

    let genome = match matches.value_of("chroms") {
        Some(path) => Genome::from_sizes_file(Path::new(path))
            .with_context(|| format!("loading chromosome sizes from {}", path))?,
        None => {
            info!("No chromosome table given, using mm9");
            Genome::mm9()
        }
    };

    let mut sources = Vec::new();
    for path in matches.values_of("INPUT").into_iter().flatten() {
        let source = DataSource::from_file(Path::new(path), &genome)
            .with_context(|| format!("loading records from {}", path))?;
        sources.push(source);
    }

    let source_mode = if matches.is_present("single-source") {
        let num_samples: usize = parse_opt(matches, "samples")?.unwrap_or(1);
        if num_samples == 0 {
            bail!("--samples must be at least 1");
        }
        let named = match matches.value_of("source-colors") {
            Some(path) => read_source_colors(Path::new(path))
                .with_context(|| format!("loading source colours from {}", path))?,
            None => Default::default(),
        };
        let colors = sources
            .iter()
            .enumerate()
            .map(|(i, s)| {
                named
                    .get(&s.name)
                    .copied()
                    .unwrap_or_else(|| pairgenome::color::palette_color(i))
            })
            .collect();
        SourceMode::Single {
            num_samples,
            colors,
        }
    } else {
        SourceMode::Multi
    };

    let (width, height) = (config.width, config.height);
    let mut app = pairgenome::App::new(config, genome, sources)?.with_source_mode(source_mode);

    if let Some(idx) = parse_opt::<usize>(matches, "source")? {
        app.select_source(idx)?;
    }
    if let Some(pair) = matches.value_of("hover") {
        let (i, j) = app.genome().resolve_pair(pair)?;
        app.handle(Event::Hover(Some((i, j))));
    }
    if let Some(pair) = matches.value_of("zoom") {
        let (i, j) = app.genome().resolve_pair(pair)?;
        app.handle(Event::Click { prox: i, dist: j });
        if app.mode() == ViewMode::Overview {
            bail!("chromosome pair {} has no cell in the grid layout", pair);
        }
    }

    let center = Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0);
    if let Some(pan) = matches.value_of("pan") {
        let (dx, dy) = parse_xy(pan, "pan")?;
        app.handle(Event::Pointer(PointerEvent::Down(center)));
        app.handle(Event::Pointer(PointerEvent::Up(Point::new(center.x + dx, center.y + dy))));
    }
    if let Some(delta) = parse_opt::<f64>(matches, "wheel")? {
        app.handle(Event::Wheel {
            at: center,
            delta_y: delta,
        });
    }

    if let Some(at) = matches.value_of("hover-record") {
        let (x, y) = parse_xy(at, "hover-record")?;
        app.handle(Event::HoverRecord(Some(Point::new(x, y))));
        match app.hovered_record() {
            Some((_, record)) => println!("{}", record.describe()),
            None => info!("No record under {}", at),
        }
    }

    let scene = app.scene();
    let mut wrote = false;
    if let Some(path) = matches.value_of("png") {
        write_png(&scene, Path::new(path)).with_context(|| format!("writing {}", path))?;
        wrote = true;
    }
    if let Some(path) = matches.value_of("svg") {
        write_svg(&scene, Path::new(path)).with_context(|| format!("writing {}", path))?;
        wrote = true;
    }
    if !wrote {
        bail!("nothing to do: give --png and/or --svg");
    }
    Ok(())
}

fn main() {
    let matches = App::new("pairgenome")
        .version("0.1.0")
        .author("Erik Garrison <erik.garrison@gmail.com>")
        .about("Render a pairwise genome matrix of interval records")
        .arg(Arg::with_name("INPUT")
             .required(true)
             .takes_value(true)
             .multiple(true)
             .index(1)
             .help("record files, one data source each (CODE PROX_START PROX_END DIST_START DIST_END [SAMPLE])"))
        .arg(Arg::with_name("chroms")
             .short("c")
             .long("chroms")
             .takes_value(true)
             .help("chromosome NAME SIZE table (default: mm9)"))
        .arg(Arg::with_name("png")
             .short("p")
             .long("png")
             .takes_value(true)
             .help("Save the matrix view to this PNG file."))
        .arg(Arg::with_name("svg")
             .short("s")
             .long("svg")
             .takes_value(true)
             .help("Save the matrix view to this SVG file."))
        .arg(Arg::with_name("config")
             .long("config")
             .takes_value(true)
             .help("TOML configuration file; flags override it"))
        .arg(Arg::with_name("zoom")
             .short("z")
             .long("zoom")
             .takes_value(true)
             .value_name("I,J")
             .help("zoom into this chromosome pair (names or 0-based indices)"))
        .arg(Arg::with_name("hover")
             .long("hover")
             .takes_value(true)
             .value_name("I,J")
             .help("highlight this chromosome pair in the overview"))
        .arg(Arg::with_name("color-scale")
             .short("k")
             .long("color-scale")
             .takes_value(true)
             .help("colour intensity parameter of the grid"))
        .arg(Arg::with_name("layout")
             .long("layout")
             .takes_value(true)
             .possible_values(&["full", "triangular"])
             .help("which chromosome pairs get a grid cell"))
        .arg(Arg::with_name("strategy")
             .long("strategy")
             .takes_value(true)
             .possible_values(&["sweep", "full-scan"])
             .help("how records are bucketed by chromosome pair"))
        .arg(Arg::with_name("coarse-cutoff")
             .long("coarse-cutoff")
             .takes_value(true)
             .value_name("BP")
             .help("hide records this small or smaller in the overview"))
        .arg(Arg::with_name("width")
             .long("width")
             .takes_value(true)
             .help("image width in pixels"))
        .arg(Arg::with_name("height")
             .long("height")
             .takes_value(true)
             .help("image height in pixels"))
        .arg(Arg::with_name("margin")
             .long("margin")
             .takes_value(true)
             .help("axis label margin in pixels"))
        .arg(Arg::with_name("source")
             .long("source")
             .takes_value(true)
             .help("0-based index of the data source to show"))
        .arg(Arg::with_name("single-source")
             .long("single-source")
             .help("draw each source in one translucent colour"))
        .arg(Arg::with_name("samples")
             .long("samples")
             .takes_value(true)
             .requires("single-source")
             .help("number of samples; detail opacity is 1/N"))
        .arg(Arg::with_name("source-colors")
             .long("source-colors")
             .takes_value(true)
             .requires("single-source")
             .help("SOURCE_NAME COLOR table"))
        .arg(Arg::with_name("hover-record")
             .long("hover-record")
             .takes_value(true)
             .value_name("X,Y")
             .allow_hyphen_values(true)
             .help("hover the record drawn at this canvas pixel and print its details"))
        .arg(Arg::with_name("pan")
             .long("pan")
             .takes_value(true)
             .value_name("DX,DY")
             .requires("zoom")
             .help("drag the zoomed view by this many pixels"))
        .arg(Arg::with_name("wheel")
             .long("wheel")
             .takes_value(true)
             .allow_hyphen_values(true)
             .requires("zoom")
             .help("wheel delta at the chart centre; negative zooms in"))
        .arg(Arg::with_name("verbose")
             .short("v")
             .multiple(true)
             .help("log more; repeat for debug output"))
        .get_matches();

    env_logger::Builder::new()
        .filter_level(match matches.occurrences_of("verbose") {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .parse_default_env()
        .init();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
