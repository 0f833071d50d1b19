use blockwork::definition::BlockDefinition;
use blockwork::render::RendererRegistry;
use blockwork::svg;
use blockwork::workspace::Workspace;
use std::env;
use std::fs;
use std::process;

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <block.json> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>     Output file (default: stdout)");
        eprintln!("  -r, --renderer <name>   Renderer: classic, compact (default: classic)");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut renderer_name = String::from("classic");

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-r" | "--renderer" => {
                i += 1;
                if i < args.len() {
                    renderer_name = args[i].clone();
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let def = match BlockDefinition::from_json(&input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Definition error: {}", e);
            process::exit(1);
        }
    };

    let registry = RendererRegistry::with_defaults();
    let renderer = match registry.create(&renderer_name) {
        Some(r) => r,
        None => {
            eprintln!(
                "Unknown renderer: {} (available: {})",
                renderer_name,
                registry.names().join(", ")
            );
            process::exit(1);
        }
    };

    let mut ws = Workspace::new();
    let block = match ws.instantiate(&def) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to build block: {}", e);
            process::exit(1);
        }
    };

    let result = match renderer.render(&mut ws, block) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Render error: {}", e);
            process::exit(1);
        }
    };

    let doc = svg::preview(&result.outline, &result.inline, result.width, result.height);

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &doc) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", doc),
    }
}
