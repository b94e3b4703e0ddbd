//! # PulseLabel CLI
//!
//! Command-line interface for label templates, bulk generation and printing.
//!
//! ## Usage
//!
//! ```bash
//! # List field types that can be placed on a label
//! pulselabel fields
//!
//! # Render a template to PNG with some data
//! pulselabel preview parcel.json --set trackingNumber=CM123 -o label.png
//!
//! # Check a CSV before a bulk run
//! pulselabel validate shipments.csv --require trackingNumber --require receiver
//!
//! # Render every valid record, save PNGs and print them
//! pulselabel generate parcel.json shipments.csv --out labels/ --print
//!
//! # Serve the HTTP API
//! pulselabel serve --listen 0.0.0.0:8080 --templates ./templates
//! ```

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pulselabel::{
    LabelError,
    binding::{DataContext, FieldBindingRegistry},
    bulk::{self, BulkGenerator, FieldRule, ValidationReport, Validator},
    printer::{CutMode, PrinterConfig, print_batch_bytes, print_job_bytes},
    render,
    server::{self, ServerConfig},
    store::{FsTemplateStore, TemplateStore},
    telemetry::{self, LogFormat, LoggingConfig},
    template::LabelTemplate,
    transport,
};

/// PulseLabel - shipping label templates for thermal printers
#[derive(Parser, Debug)]
#[command(name = "pulselabel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level or filter directive (RUST_LOG overrides)
    #[arg(long, global = true, default_value = telemetry::DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Where a template comes from.
#[derive(Args, Debug)]
struct TemplateSource {
    /// Template JSON file, or the name of a template in --templates
    template: String,

    /// Directory of saved templates
    #[arg(long, default_value = "templates")]
    templates: PathBuf,
}

/// Validation rules for bulk records.
#[derive(Args, Debug)]
struct RuleArgs {
    /// JSON file with an array of field rules
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Field that must be non-empty (repeatable)
    #[arg(long = "require", value_name = "FIELD")]
    required: Vec<String>,
}

#[derive(Args, Debug)]
struct PrinterArgs {
    /// Printer device path
    #[arg(long, default_value = transport::DEFAULT_DEVICE)]
    device: String,

    /// Printer preset (tsp650ii, tsp650ii-58)
    #[arg(long, default_value = "tsp650ii", value_parser = parse_printer)]
    printer: PrinterConfig,

    /// Feed a short gap instead of cutting after each label
    #[arg(long)]
    no_cut: bool,

    /// Leave a hinge when cutting so labels stay on one strip
    #[arg(long, conflicts_with = "no_cut")]
    partial_cut: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the field types that can be placed on a label
    Fields,

    /// Render a template to a PNG file
    Preview {
        #[command(flatten)]
        source: TemplateSource,

        /// JSON object with field values
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Field value as key=value (repeatable, overrides --data)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        values: Vec<(String, String)>,

        /// Output PNG path
        #[arg(short, long, default_value = "label.png")]
        output: PathBuf,
    },

    /// Import records and report which ones fail validation
    Validate {
        /// CSV or JSON records file
        records: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a template once per valid record
    Generate {
        #[command(flatten)]
        source: TemplateSource,

        /// CSV or JSON records file
        records: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,

        /// Directory to write one PNG per label
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Append the job summary to this CSV file
        #[arg(long, value_name = "FILE")]
        job_log: Option<PathBuf>,

        /// Send the labels to the printer
        #[arg(long)]
        print: bool,

        #[command(flatten)]
        printer: PrinterArgs,
    },

    /// Render a template and print it
    Print {
        #[command(flatten)]
        source: TemplateSource,

        /// JSON object with field values
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Field value as key=value (repeatable, overrides --data)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        values: Vec<(String, String)>,

        #[command(flatten)]
        printer: PrinterArgs,
    },

    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Printer device path
        #[arg(long, default_value = transport::DEFAULT_DEVICE)]
        device: String,

        /// Directory of saved templates (in memory when omitted)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Printer preset (tsp650ii, tsp650ii-58)
        #[arg(long, default_value = "tsp650ii", value_parser = parse_printer)]
        printer: PrinterConfig,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();
    telemetry::init_logging(&LoggingConfig {
        level: cli.log_level,
        format: cli.log_format,
    })?;

    let registry = FieldBindingRegistry::builtin();

    match cli.command {
        Commands::Fields => {
            println!("{:<18} {:<20} {:<14} {}", "ID", "LABEL", "KIND", "BINDING");
            for field in registry.fields() {
                println!(
                    "{:<18} {:<20} {:<14} {}",
                    field.id,
                    field.label,
                    field.kind.as_str(),
                    field.binding.map(|b| b.as_str()).unwrap_or("-")
                );
            }
        }

        Commands::Preview {
            source,
            data,
            values,
            output,
        } => {
            let template = load_template(&source)?;
            let context = load_context(data.as_deref(), values)?;
            let raster = render::render_label(&template.layout, &context, &registry)?;
            fs::write(&output, raster.to_png()?)?;
            println!(
                "Saved {}x{} preview to {}",
                raster.width,
                raster.height,
                output.display()
            );
        }

        Commands::Validate {
            records,
            rules,
            json,
        } => {
            let report = validate_file(&records, &rules)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Commands::Generate {
            source,
            records,
            rules,
            out,
            job_log,
            print,
            printer,
        } => {
            let template = load_template(&source)?;
            let report = validate_file(&records, &rules)?;
            if !report.is_clean() {
                print_report(&report);
            }

            let generator =
                BulkGenerator::new(registry).fit_width(printer.printer.width_dots as usize);
            let output = generator.generate(&template, &report.valid, |p| {
                eprint!("\rGenerated {}/{} ({} failed)", p.completed, p.total, p.failed);
            });
            eprintln!();
            for failure in &output.job.failures {
                eprintln!("  record {}: {}", failure.record_index + 1, failure.error);
            }

            if let Some(dir) = &out {
                fs::create_dir_all(dir)?;
                for label in &output.labels {
                    let path = dir.join(format!("label-{:04}.png", label.record_index + 1));
                    fs::write(path, label.raster.to_png()?)?;
                }
                println!("Wrote {} labels to {}", output.labels.len(), dir.display());
            }

            if let Some(path) = &job_log {
                append_job_log(path, &output.job)?;
            }

            if print && !output.labels.is_empty() {
                let rasters: Vec<_> = output.labels.into_iter().map(|l| l.raster).collect();
                let bytes = print_batch_bytes(&rasters, &printer.printer, cut_mode(&printer))?;
                transport::send(Path::new(&printer.device), &bytes)?;
                println!("Printed {} labels", rasters.len());
            }

            println!(
                "Job {}: {} generated, {} failed ({})",
                output.job.id,
                output.job.generated,
                output.job.failed,
                output.job.status.as_str()
            );
        }

        Commands::Print {
            source,
            data,
            values,
            printer,
        } => {
            let template = load_template(&source)?;
            let context = load_context(data.as_deref(), values)?;
            let raster = render::render_label_fit(
                &template.layout,
                &context,
                &registry,
                printer.printer.width_dots as usize,
            )?;
            let bytes = print_job_bytes(&raster, &printer.printer, cut_mode(&printer))?;
            transport::send(Path::new(&printer.device), &bytes)?;
            println!("Printed {} on {}", template.name, printer.printer.name);
        }

        Commands::Serve {
            listen,
            device,
            templates,
            printer,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                device_path: device,
                template_dir: templates,
                printer,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))?;
        }
    }

    Ok(())
}

fn parse_printer(s: &str) -> Result<PrinterConfig, String> {
    PrinterConfig::parse(s).ok_or_else(|| {
        format!("Unknown printer '{}'. Use 'tsp650ii' or 'tsp650ii-58'", s)
    })
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", s))
}

fn cut_mode(args: &PrinterArgs) -> CutMode {
    CutMode::from_flags(!args.no_cut, args.partial_cut)
}

/// A path to a JSON file wins; anything else is looked up by name.
fn load_template(source: &TemplateSource) -> Result<LabelTemplate, LabelError> {
    let path = Path::new(&source.template);
    if path.is_file() {
        return Ok(LabelTemplate::from_json(&fs::read_to_string(path)?)?);
    }
    FsTemplateStore::open(&source.templates)?.require(&source.template)
}

fn load_context(
    data: Option<&Path>,
    values: Vec<(String, String)>,
) -> Result<DataContext, LabelError> {
    let mut context = match data {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => DataContext::new(),
    };
    for (key, value) in values {
        context.insert(key, value);
    }
    Ok(context)
}

fn load_rules(args: &RuleArgs) -> Result<Vec<FieldRule>, LabelError> {
    let mut rules: Vec<FieldRule> = match &args.rules {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    rules.extend(args.required.iter().map(|f| FieldRule::new(f).required()));
    Ok(rules)
}

fn validate_file(records: &Path, rules: &RuleArgs) -> Result<ValidationReport, LabelError> {
    let validator = Validator::new(load_rules(rules)?)?;
    Ok(validator.validate(bulk::import_path(records)?))
}

fn print_report(report: &ValidationReport) {
    println!(
        "{} records: {} valid, {} invalid ({} errors)",
        report.total(),
        report.valid.len(),
        report.invalid.len(),
        report.error_count
    );
    for invalid in &report.invalid {
        println!("  record {}: {}", invalid.record.index + 1, invalid.errors.join("; "));
    }
}

/// Append one job row, writing the header when the file is new.
fn append_job_log(path: &Path, job: &bulk::GenerationJob) -> Result<(), LabelError> {
    let exists = path.exists();
    let mut buf = Vec::new();
    bulk::export_jobs_csv(std::slice::from_ref(job), &mut buf)?;
    let text = String::from_utf8_lossy(&buf).into_owned();
    let body: &str = if exists {
        text.split_once('\n').map(|(_, rest)| rest).unwrap_or("")
    } else {
        &text
    };

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(body.as_bytes())?;
    Ok(())
}
