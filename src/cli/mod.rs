mod config;
mod handlers;

use crate::error::{Result, TransformError};
use crate::PluginOptions;
use clap::{Arg, ArgAction, Command, ValueEnum};
use std::time::Instant;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Css,
    Json,
    Debug,
}

pub struct EnhancedCli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl EnhancedCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        self.setup_logging(matches.get_count("verbose"));

        match matches.subcommand() {
            Some(("transform", sub_matches)) => handlers::handle_transform_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(sub_matches),
            Some(("analyze", sub_matches)) => handlers::handle_analyze_command(sub_matches),
            Some(("benchmark", sub_matches)) => handlers::handle_benchmark_command(sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("RRE Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("transform")
                    .about("Transform rre() calls in CSS files")
                    .arg(Arg::new("input").help("Input CSS file").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output CSS file"))
                    .arg(Arg::new("prefix").long("prefix").value_name("PREFIX").help("Custom property prefix (default --rre)"))
                    .arg(Arg::new("no-custom-properties").long("no-custom-properties").help("Replace rre() with literal pixel values").action(ArgAction::SetTrue))
                    .arg(Arg::new("no-custom-media").long("no-custom-media").help("Skip @custom-media generation").action(ArgAction::SetTrue))
                    .arg(Arg::new("no-cache").long("no-cache").help("Disable the transformation cache").action(ArgAction::SetTrue))
                    .arg(Arg::new("cache-size").long("cache-size").value_name("N").help("Maximum cache entries"))
                    .arg(Arg::new("validate").long("validate").help("Validate the generated output").action(ArgAction::SetTrue))
                    .arg(Arg::new("dev").short('d').long("dev").help("Development mode with comments and verbose logging").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Show detailed transform statistics").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch for file changes and re-transform").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Check CSS files for syntax and rre() usage errors")
                    .arg(Arg::new("input").help("Input CSS file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all CSS files in directory recursively").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("analyze")
                    .about("Transform a file in memory and report metrics")
                    .arg(Arg::new("input").help("Input CSS file").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output analysis to file"))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("debug").help("Analysis output format")),
            )
            .subcommand(
                Command::new("benchmark")
                    .about("Run transform benchmarks")
                    .arg(Arg::new("input").help("Input CSS file").required(true).index(1))
                    .arg(Arg::new("iterations").short('n').long("iterations").value_name("N").help("Number of benchmark iterations").default_value("10"))
                    .arg(Arg::new("warmup").long("warmup").value_name("N").help("Number of warmup iterations").default_value("3")),
            )
    }

    fn setup_logging(&self, verbose_count: u8) {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
    }

    pub fn build_plugin_options(&self, matches: &clap::ArgMatches) -> Result<PluginOptions> {
        let mut options = PluginOptions::default();

        if matches.get_flag("no-custom-properties") {
            options.generate_custom_properties = false;
        } else if let Some(enabled) = self.config.generate_custom_properties {
            options.generate_custom_properties = enabled;
        }

        if matches.get_flag("no-custom-media") {
            options.generate_custom_media = false;
        } else if let Some(enabled) = self.config.generate_custom_media {
            options.generate_custom_media = enabled;
        }

        if let Some(prefix) = matches
            .get_one::<String>("prefix")
            .cloned()
            .or_else(|| self.config.custom_property_prefix.clone())
        {
            if !prefix.starts_with("--") {
                return Err(TransformError::InvalidFormat {
                    message: format!(
                        "Invalid custom property prefix '{}': must start with '--'",
                        prefix
                    ),
                });
            }
            options.custom_property_prefix = prefix;
        }

        options.development = matches.get_flag("dev") || self.config.development.unwrap_or(false);
        options.validate_css =
            matches.get_flag("validate") || self.config.validate_css.unwrap_or(false);
        options.performance_metrics =
            matches.get_flag("stats") || self.config.performance_metrics.unwrap_or(false);

        if matches.get_flag("no-cache") {
            options.enable_caching = false;
        } else if let Some(enabled) = self.config.enable_caching {
            options.enable_caching = enabled;
        }

        if let Some(size) = matches.get_one::<String>("cache-size") {
            options.cache_size = size.parse().map_err(|_| TransformError::InvalidFormat {
                message: format!("Invalid cache size: {}", size),
            })?;
        } else if let Some(size) = self.config.cache_size {
            options.cache_size = size;
        }

        Ok(options)
    }
}

impl Default for EnhancedCli {
    fn default() -> Self {
        Self::new()
    }
}
