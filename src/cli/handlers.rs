use crate::{
    transform_file_with_options, transform_source_with_options, PluginOptions, Result,
    TransformError, TransformStats,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Instant;

// --- TRANSFORM ---
pub fn handle_transform_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = matches.get_one::<String>("input").unwrap();
    let output_path = matches
        .get_one::<String>("output")
        .map(|s| s.to_string())
        .unwrap_or_else(|| default_output_path(cli, input_path));

    let options = cli.build_plugin_options(matches)?;

    if matches.get_flag("watch") {
        watch_and_transform(input_path, &output_path, options)
    } else {
        transform_single_file(input_path, &output_path, options, matches)
    }
}

/// Default output path: `<input>.out.css`, placed in the configured output
/// directory when one is set.
fn default_output_path(cli: &super::EnhancedCli, input_path: &str) -> String {
    let output = Path::new(input_path).with_extension("out.css");
    match &cli.config.output_directory {
        Some(dir) => {
            let file_name = output
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_default();
            Path::new(dir).join(file_name).to_string_lossy().into_owned()
        }
        None => output.to_string_lossy().into_owned(),
    }
}

fn transform_single_file(
    input_path: &str,
    output_path: &str,
    options: PluginOptions,
    matches: &clap::ArgMatches,
) -> Result<()> {
    println!("🔨 Transforming {} -> {}", input_path, output_path);

    let transform_start = Instant::now();
    let stats = transform_file_with_options(input_path, output_path, options)?;
    let transform_time = transform_start.elapsed();

    println!("✅ Transform successful!");
    println!("   Output: {} bytes", stats.output_size);
    println!("   Time: {:.2}ms", transform_time.as_millis());
    println!("   rre() calls transformed: {}", stats.transformations);

    if matches.get_flag("stats") {
        print_detailed_stats(&stats);
    }

    Ok(())
}

fn print_detailed_stats(stats: &TransformStats) {
    println!("\nDetailed statistics:");
    println!("   Source size: {} bytes", stats.source_size);
    println!("   Output size: {} bytes", stats.output_size);
    println!("   Custom properties: {}", stats.custom_properties);
    println!("   Media queries: {}", stats.media_queries);
    println!("   Custom media: {}", stats.custom_media);
    println!("   Cache hits/misses: {}/{}", stats.cache_hits, stats.cache_misses);
    if stats.validation_errors > 0 {
        println!("   Validation findings: {}", stats.validation_errors);
    }
}

fn watch_and_transform(
    input_path: &str,
    output_path: &str,
    options: PluginOptions,
) -> Result<()> {
    println!("👀 Watching {} for changes...", input_path);

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| {
        TransformError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to create file watcher: {}", e),
        ))
    })?;

    watcher
        .watch(Path::new(input_path), RecursiveMode::NonRecursive)
        .map_err(|e| {
            TransformError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to watch file: {}", e),
            ))
        })?;

    if let Err(e) = transform_file_with_options(input_path, output_path, options.clone()) {
        eprintln!("❌ Initial transform failed: {}", e);
    } else {
        println!("✅ Initial transform successful");
    }

    loop {
        match rx.recv() {
            Ok(_event) => {
                println!("🔄 File changed, re-transforming...");
                match transform_file_with_options(input_path, output_path, options.clone()) {
                    Ok(stats) => {
                        println!(
                            "✅ Re-transformed successfully ({} bytes, {} calls, {}ms)",
                            stats.output_size, stats.transformations, stats.transform_time_ms
                        );
                    }
                    Err(e) => eprintln!("❌ Transform failed: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

// --- CHECK ---
pub fn handle_check_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = matches.get_one::<String>("input").unwrap();
    let recursive = matches.get_flag("recursive");

    if recursive && Path::new(input_path).is_dir() {
        check_directory_recursive(input_path)
    } else {
        check_single_file(input_path)
    }
}

fn check_single_file(input_path: &str) -> Result<()> {
    println!("🔍 Checking {}", input_path);

    let source = std::fs::read_to_string(input_path).map_err(|e| TransformError::FileNotFound {
        path: format!("{}: {}", input_path, e),
    })?;

    let options = PluginOptions {
        validate_css: true,
        ..Default::default()
    };

    match transform_source_with_options(&source, input_path, options) {
        Ok(output) => {
            if output.metrics.validation_errors > 0 {
                println!(
                    "⚠️  {} - {} validation findings",
                    input_path, output.metrics.validation_errors
                );
            } else {
                println!("✅ {} - No issues found", input_path);
            }
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", input_path, e);
            Err(e)
        }
    }
}

fn check_directory_recursive(dir_path: &str) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    for entry in walkdir::WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| {
            TransformError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension() {
                if ext == "css" {
                    total_files += 1;
                    if check_single_file(&entry.path().to_string_lossy()).is_err() {
                        error_files += 1;
                    }
                }
            }
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(TransformError::Validation {
            message: format!("{} files have errors", error_files),
        })
    } else {
        Ok(())
    }
}

// --- ANALYZE ---
pub fn handle_analyze_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = matches.get_one::<String>("input").unwrap();
    let output_path = matches.get_one::<String>("output");
    let format = matches.get_one::<super::OutputFormat>("format").unwrap();

    println!("🔬 Analyzing {}", input_path);

    let source = std::fs::read_to_string(input_path).map_err(|e| TransformError::FileNotFound {
        path: format!("{}: {}", input_path, e),
    })?;

    let options = PluginOptions {
        validate_css: true,
        ..Default::default()
    };
    let output = transform_source_with_options(&source, input_path, options)?;

    let analysis = match format {
        super::OutputFormat::Json => serde_json::to_string_pretty(&output.metrics).map_err(|e| {
            TransformError::InvalidFormat {
                message: format!("JSON serialization error: {}", e),
            }
        })?,
        _ => format!("CSS File Analysis: {}\n\n{:#?}", input_path, output.metrics),
    };

    if let Some(output_file) = output_path {
        std::fs::write(output_file, analysis)?;
        println!("✅ Analysis saved to {}", output_file);
    } else {
        println!("{}", analysis);
    }
    Ok(())
}

// --- BENCHMARK ---
pub fn handle_benchmark_command(matches: &clap::ArgMatches) -> Result<()> {
    let input_path = matches.get_one::<String>("input").unwrap();
    let iterations: usize = matches
        .get_one::<String>("iterations")
        .unwrap()
        .parse()
        .map_err(|_| TransformError::InvalidFormat {
            message: "Invalid iteration count".to_string(),
        })?;
    let warmup: usize = matches
        .get_one::<String>("warmup")
        .unwrap()
        .parse()
        .map_err(|_| TransformError::InvalidFormat {
            message: "Invalid warmup count".to_string(),
        })?;

    let source = std::fs::read_to_string(input_path).map_err(|e| TransformError::FileNotFound {
        path: format!("{}: {}", input_path, e),
    })?;

    println!(
        "⏱️  Benchmarking {} ({} iterations, {} warmup)",
        input_path, iterations, warmup
    );

    for _ in 0..warmup {
        transform_source_with_options(&source, input_path, PluginOptions::default())?;
    }

    let mut timings = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        transform_source_with_options(&source, input_path, PluginOptions::default())?;
        timings.push(start.elapsed().as_secs_f64() * 1000.0);
    }

    let total: f64 = timings.iter().sum();
    let mean = total / iterations as f64;
    let min = timings.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = timings.iter().cloned().fold(0.0f64, f64::max);

    println!("   Mean: {:.3}ms", mean);
    println!("   Min:  {:.3}ms", min);
    println!("   Max:  {:.3}ms", max);

    Ok(())
}
