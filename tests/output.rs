use std::fs;
use std::path::Path;

use pairgenome::app::Event;
use pairgenome::render::{write_png, write_svg};
use pairgenome::{App, Config, DataSource, Genome};

use pretty_assertions::assert_eq;
use rgb::RGBA8;
use rstest::*;

const CHROMS: &str = "# name size\n1 100\n2 200\n3 100\n";

const RECORDS: &str = "\
0xff0000 0 50 0 50 WSB_EiJ
0x00ff00 60 70 80 90
0x0000ff 10 40 120 280
# a comment
0xff0000 120 130 310 315
";

#[fixture]
fn app() -> App {
    let dir = tempfile::tempdir().unwrap();
    let chroms = dir.path().join("chroms.txt");
    let records = dir.path().join("dom_mus.combos.txt");
    fs::write(&chroms, CHROMS).unwrap();
    fs::write(&records, RECORDS).unwrap();

    let genome = Genome::from_sizes_file(&chroms).unwrap();
    let source = DataSource::from_file(&records, &genome).unwrap();
    assert_eq!(source.name, "dom_mus");
    assert_eq!(source.records.len(), 4);
    assert_eq!(source.samples, vec!["WSB_EiJ"]);

    let config = Config {
        width: 420,
        height: 410,
        margin: 10.0,
        coarse_cutoff: 20,
        ..Config::default()
    };
    App::new(config, genome, vec![source]).unwrap()
}

fn pixel(bitmap: &lodepng::Bitmap<RGBA8>, x: usize, y: usize) -> RGBA8 {
    bitmap.buffer[y * bitmap.width + x]
}

fn decode(path: &Path) -> lodepng::Bitmap<RGBA8> {
    lodepng::decode32_file(path).unwrap()
}

#[rstest]
fn test_overview_png(app: App) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overview.png");
    write_png(&app.scene(), &path).unwrap();

    let bitmap = decode(&path);
    assert_eq!((bitmap.width, bitmap.height), (420, 410));
    // top-left corner lies outside every cell and label box
    assert_eq!(pixel(&bitmap, 5, 5), RGBA8::new(255, 255, 255, 255));
    // chromosome pair (3, 1) has no records
    assert_eq!(pixel(&bitmap, 350, 50), RGBA8::new(255, 255, 255, 255));
    // chromosome pair (1, 1) is mostly red
    let cell = pixel(&bitmap, 105, 105);
    assert_eq!(cell.r, 255);
    assert!(cell.g < 255 && cell.g == cell.b);
}

#[rstest]
fn test_zoomed_png_shows_records(mut app: App) {
    app.handle(Event::Click { prox: 0, dist: 0 });
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zoomed.png");
    write_png(&app.scene(), &path).unwrap();

    // scale 4 puts the first record at pixels [0, 200) on both axes
    let bitmap = decode(&path);
    assert_eq!(pixel(&bitmap, 100, 100), RGBA8::new(255, 0, 0, 255));
    assert_eq!(pixel(&bitmap, 250, 340), RGBA8::new(0, 255, 0, 255));
    assert_eq!(pixel(&bitmap, 300, 50), RGBA8::new(255, 255, 255, 255));
}

#[rstest]
fn test_svg_structure(mut app: App) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("view.svg");

    write_svg(&app.scene(), &path).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    for id in &["chrom_group", "unique_group", "x-axis", "y-axis"] {
        assert!(svg.contains(&format!(r#"<g id="{}">"#, id)), "missing group {}", id);
    }
    assert_eq!(svg.matches("<text").count(), 6);
    assert!(!svg.contains("transform="));
    assert!(svg.contains("<title>Sample: WSB_EiJ\nProximal start: 0\n"));

    app.handle(Event::Click { prox: 1, dist: 2 });
    write_svg(&app.scene(), &path).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains(r#"<g id="chrom_group" display="none">"#));
    assert!(svg.contains(r#"<g transform="translate(-220,-620)scale(2)">"#));
}
