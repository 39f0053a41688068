//! Concatenate an SD card directory from the command line.
//!
//! Usage:
//!
//! ```text
//! cargo run --example concat_directory -- <card dir> [output dir] [--gzip]
//! cargo run --example concat_directory -- --options options.json
//! ```
//!
//! Set `RUST_LOG=debug` for per-line diagnostics.

use spotter_sd_rs::{ConcatOptions, OutputFormat, Result, concatenate_directory};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match args.as_slice() {
        [flag, path] if flag == "--options" => ConcatOptions::load_from_file(path)?,
        [] => {
            eprintln!("usage: concat_directory <card dir> [output dir] [--gzip]");
            eprintln!("       concat_directory --options <options.json>");
            std::process::exit(2);
        }
        [input, rest @ ..] => {
            let mut options = ConcatOptions::new(input);
            for arg in rest {
                if arg == "--gzip" {
                    options = options.with_output_format(OutputFormat::Gzip);
                } else {
                    options = options.with_output_dir(arg);
                }
            }
            options
        }
    };

    let summary = concatenate_directory(&options)?;
    println!(
        "{} output(s) in {} version group(s)",
        summary.output_count(),
        summary.groups.len()
    );
    for group in &summary.groups {
        for output in &group.outputs {
            println!(
                "  {}: {} file(s), {} line(s)",
                output.path.display(),
                output.stats.files_written,
                output.stats.lines_written
            );
        }
    }
    if let Some(log) = &summary.error_log {
        println!("{} file(s) skipped, see {}", summary.errors.len(), log.display());
    }

    summary.save_to_file(options.output_dir().join("concat_summary.json"))?;
    Ok(())
}
