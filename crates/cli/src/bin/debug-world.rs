//! Debug World Tool
//!
//! Inspection utility for terrain and resource generation.
//!
//! Features:
//! - ASCII biome map of a tile region
//! - Resource listing around a center tile
//! - Spacing validation over many overlapping generation passes
//!
//! Usage:
//!   debug-world tiles --seed 42 --region -40,-20,40,20
//!   debug-world resources --seed 42 --center 0,0 --radius 50
//!   debug-world validate-spacing --seed 42 --region -200,-200,200,200

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;
use tilemine_core::{TileCoord, WorldSeed};
use tilemine_world::{ResourceField, TerrainField, TileType, MIN_NODE_SPACING};

#[derive(Debug)]
struct Config {
    command: Command,
    seed: WorldSeed,
    cosmetic_seed: Option<u64>,
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
struct Region {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

#[derive(Debug)]
enum Command {
    Tiles(Region),
    Resources { center: TileCoord, radius: i32 },
    ValidateSpacing { region: Region, step: i32 },
    Help,
}

fn parse_region(text: &str) -> Result<Region, String> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 4 {
        return Err("--region format: min_x,min_y,max_x,max_y".to_string());
    }
    let mut values = [0i32; 4];
    for (value, (part, name)) in values
        .iter_mut()
        .zip(parts.iter().zip(["min_x", "min_y", "max_x", "max_y"]))
    {
        *value = part
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {}: {}", name, e))?;
    }
    let [min_x, min_y, max_x, max_y] = values;
    if min_x > max_x || min_y > max_y {
        return Err("--region minimum exceeds maximum".to_string());
    }
    Ok(Region {
        min_x,
        min_y,
        max_x,
        max_y,
    })
}

fn parse_args_from(args: &[String]) -> Result<Config, String> {
    if args.len() < 2 {
        return Ok(Config {
            command: Command::Help,
            seed: WorldSeed(0),
            cosmetic_seed: None,
            output: None,
        });
    }

    let command_str = &args[1];

    let mut seed = WorldSeed(21_343_124);
    let mut cosmetic_seed = None;
    let mut output = None;
    let mut region: Option<Region> = None;
    let mut center = TileCoord::new(0, 0);
    let mut radius = 50;
    let mut step = 21;

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("{} requires an argument", flag))?;
        match flag {
            "--seed" => {
                seed = value
                    .parse::<i64>()
                    .map(WorldSeed::from)
                    .map_err(|e| format!("Invalid seed: {}", e))?;
            }
            "--cosmetic-seed" => {
                cosmetic_seed = Some(
                    value
                        .parse()
                        .map_err(|e| format!("Invalid cosmetic seed: {}", e))?,
                );
            }
            "--region" => region = Some(parse_region(value)?),
            "--center" => center = value.parse().map_err(|e| format!("Invalid center: {}", e))?,
            "--radius" => {
                radius = value
                    .parse()
                    .map_err(|e| format!("Invalid radius: {}", e))?;
            }
            "--step" => {
                step = value
                    .parse()
                    .map_err(|e| format!("Invalid step: {}", e))?;
                if step <= 0 {
                    return Err("--step must be positive".to_string());
                }
            }
            "--output" | "-o" => output = Some(PathBuf::from(value)),
            _ => return Err(format!("Unknown option: {}", flag)),
        }
        i += 2;
    }

    let command = match command_str.as_str() {
        "tiles" => Command::Tiles(region.ok_or("tiles requires --region option")?),
        "resources" => Command::Resources { center, radius },
        "validate-spacing" => Command::ValidateSpacing {
            region: region.ok_or("validate-spacing requires --region option")?,
            step,
        },
        "help" | "--help" | "-h" => Command::Help,
        _ => {
            return Err(format!(
                "Unknown command: {}\nRun 'debug-world help' for usage",
                command_str
            ));
        }
    };

    Ok(Config {
        command,
        seed,
        cosmetic_seed,
        output,
    })
}

fn print_help() {
    println!("Debug World Tool - terrain and resource inspection utility");
    println!();
    println!("Usage:");
    println!("  debug-world <command> [options]");
    println!();
    println!("Commands:");
    println!("  tiles              ASCII biome map of a tile region");
    println!("  resources          Generate around a center tile and list the nodes");
    println!("  validate-spacing   Generate over a grid of centers and check node spacing");
    println!("  help               Show this help message");
    println!();
    println!("Options:");
    println!("  --seed <number>           World seed (default: 21343124)");
    println!("  --cosmetic-seed <number>  Pin node jitter, size and richness");
    println!("  --region <x1,y1,x2,y2>    Tile region to process");
    println!("  --center <x,y>            Center tile for resources (default: 0,0)");
    println!("  --radius <tiles>          Generation radius (default: 50)");
    println!("  --step <tiles>            Center spacing for validate-spacing (default: 21)");
    println!("  --output <file>           Output file (default: stdout)");
}

fn emit(text: &str, output: Option<PathBuf>, what: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            fs::write(&path, text)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!("{} saved to: {}", what, path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn render_tiles(terrain: &TerrainField, region: Region) -> String {
    let mut map = String::new();
    map.push_str(&format!("Tile Map (Seed: {})\n", terrain.seed().as_i64()));
    map.push_str(&format!(
        "Region: ({}, {}) to ({}, {})\n\nLegend:\n",
        region.min_x, region.min_y, region.max_x, region.max_y
    ));
    for tile in TileType::ALL {
        map.push_str(&format!("  {} = {}\n", tile.glyph(), tile.display_name()));
    }
    map.push('\n');

    // north up: highest row first
    for y in (region.min_y..=region.max_y).rev() {
        for x in region.min_x..=region.max_x {
            map.push(terrain.classify(x, y).glyph());
        }
        map.push('\n');
    }
    map
}

fn new_field(seed: WorldSeed, cosmetic_seed: Option<u64>) -> ResourceField {
    match cosmetic_seed {
        Some(cosmetic) => ResourceField::with_cosmetic_seed(seed, cosmetic),
        None => ResourceField::new(seed),
    }
}

fn list_resources(field: &mut ResourceField, center: TileCoord, radius: i32) -> String {
    let spawned = field.generate_resources_in_area(center.x, center.y, radius);
    let mut out = format!(
        "Resources around {} (radius {}, seed {}): {} nodes\n\n",
        center,
        radius,
        field.seed().as_i64(),
        spawned
    );
    out.push_str("  id     tile        biome      position            size   info\n");
    for node in field.nodes() {
        let tile = TileCoord::containing(node.pos());
        out.push_str(&format!(
            "  {:<6} {:<11} {:<10} ({:>8.1}, {:>8.1})  {:>5.1}  {}\n",
            node.id().to_string(),
            tile.to_string(),
            field.terrain().classify_coord(tile).display_name(),
            node.pos().x,
            node.pos().y,
            node.size(),
            node.info_text()
        ));
    }
    out
}

fn validate_spacing(field: &mut ResourceField, region: Region, step: i32) -> Result<(), String> {
    println!("Validating node spacing...");
    println!("Seed: {}", field.seed().as_i64());
    println!(
        "Region: ({}, {}) to ({}, {}), center step {}",
        region.min_x, region.min_y, region.max_x, region.max_y, step
    );
    println!();

    let step = step.max(1) as usize;
    let mut passes = 0;
    for y in (region.min_y..=region.max_y).step_by(step) {
        for x in (region.min_x..=region.max_x).step_by(step) {
            field.generate_resources_in_area(x, y, 50);
            passes += 1;
        }
    }

    let nodes = field.nodes();
    let mut pairs = 0usize;
    let mut violations = 0usize;
    let mut closest = f32::INFINITY;
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            pairs += 1;
            let d = a.center().distance(b.center());
            closest = closest.min(d);
            if d < MIN_NODE_SPACING {
                violations += 1;
            }
        }
    }

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Spacing Validation Results                  ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
    println!("  Generation passes:       {}", passes);
    println!("  Nodes:                   {}", nodes.len());
    println!("  Pairs checked:           {}", pairs);
    println!("  Closest pair:            {:.1}", closest);
    println!("  Violations:              {}", violations);
    println!();

    if violations > 0 {
        return Err(format!(
            "FAILED: {} node pairs closer than {}",
            violations, MIN_NODE_SPACING
        ));
    }
    println!("✅ SUCCESS: every node pair respects the minimum spacing");
    Ok(())
}

fn run(config: Config) -> Result<(), String> {
    match config.command {
        Command::Tiles(region) => {
            let terrain = TerrainField::new(config.seed);
            emit(&render_tiles(&terrain, region), config.output, "Tile map")
        }
        Command::Resources { center, radius } => {
            let mut field = new_field(config.seed, config.cosmetic_seed);
            emit(
                &list_resources(&mut field, center, radius),
                config.output,
                "Resource list",
            )
        }
        Command::ValidateSpacing { region, step } => {
            let mut field = new_field(config.seed, config.cosmetic_seed);
            validate_spacing(&mut field, region, step)
        }
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = match parse_args_from(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            process::exit(1);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("debug-world")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_tiles_command() {
        let config = parse_args_from(&args(&["tiles", "--seed", "42", "--region", "-2,-1,3,4"]))
            .expect("parses");
        assert_eq!(config.seed, WorldSeed(42));
        match config.command {
            Command::Tiles(r) => assert_eq!((r.min_x, r.min_y, r.max_x, r.max_y), (-2, -1, 3, 4)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_region_and_bad_center() {
        assert!(parse_args_from(&args(&["tiles"])).is_err());
        assert!(parse_args_from(&args(&["resources", "--center", "1;2"])).is_err());
        assert!(parse_args_from(&args(&["tiles", "--region", "5,0,1,1"])).is_err());
    }

    #[test]
    fn tile_map_has_one_row_per_y() {
        let terrain = TerrainField::new(WorldSeed(42));
        let region = Region {
            min_x: -1,
            min_y: -1,
            max_x: 1,
            max_y: 1,
        };
        let map = render_tiles(&terrain, region);
        let rows: Vec<&str> = map.lines().rev().take(3).collect();
        // x = 0 and y = 0 are road lines, x = -1 is not
        assert_eq!(rows[1].chars().nth(1), Some('#'));
        assert!(rows.iter().all(|r| r.chars().count() == 3));
    }

    #[test]
    fn lists_known_resources() {
        let mut field = new_field(WorldSeed(42), Some(1));
        let listing = list_resources(&mut field, TileCoord::new(0, 0), 50);
        assert!(listing.contains(": 8 nodes"));
        assert!(listing.contains("Oil (infinite)"));
    }

    #[test]
    fn spacing_holds_over_overlapping_passes() {
        let mut field = new_field(WorldSeed(42), Some(1));
        let region = Region {
            min_x: -60,
            min_y: -60,
            max_x: 60,
            max_y: 60,
        };
        assert!(validate_spacing(&mut field, region, 21).is_ok());
    }
}
