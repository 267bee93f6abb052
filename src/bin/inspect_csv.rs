use rooftop_templates::{
    ingest::{load_inputs, render_table},
    resolve::classify,
    Settings,
};
use std::{env, path::PathBuf, process::exit};

fn main() {
    // Expect one or more CSV or ZIP paths.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <CSV_OR_ZIP>...", args[0]);
        exit(1);
    }
    let paths: Vec<PathBuf> = args[1..].iter().map(PathBuf::from).collect();
    inspect(&paths);
}

/// Decode every input and print its table plus the role its name maps to.
fn inspect(paths: &[PathBuf]) {
    let settings = Settings::default();
    let files = load_inputs(paths, &settings);
    if files.is_empty() {
        println!("(no CSV files found)");
        return;
    }

    for f in &files {
        let role = classify(&f.name).map_or("<none>", |r| r.label());
        match &f.outcome {
            Ok(matrix) => {
                print!("{}", render_table(&f.source, matrix, settings.max_column_width));
                println!("Role: {}", role);
                println!("Columns: {}", matrix.header().len());
            }
            Err(e) => println!("=== {} ===\nError: {}", f.source, e),
        }
        println!();
    }
}
