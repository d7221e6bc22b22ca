use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use cfn_flip::{flip, Format};

/// AWS CloudFormation Template Flip converts CloudFormation templates
/// between JSON and YAML formats, making use of the YAML format's short
/// function syntax where possible.
#[derive(Parser)]
#[command(name = "cfn-flip", version, about)]
struct Cli {
    /// Specify the input format. Overrides -j and -y flags.
    #[arg(short = 'i', long = "input", value_name = "FORMAT")]
    input_format: Option<Format>,

    /// Specify the output format. Overrides -j, -y, and -n flags.
    #[arg(short = 'o', long = "output", value_name = "FORMAT")]
    output_format: Option<Format>,

    /// Convert to JSON. Assume the input is YAML.
    #[arg(short, long, conflicts_with = "yaml")]
    json: bool,

    /// Convert to YAML. Assume the input is JSON.
    #[arg(short, long)]
    yaml: bool,

    /// Performs some opinionated cleanup on your template.
    #[arg(short, long)]
    clean: bool,

    /// Use long-form syntax for functions when converting to YAML.
    #[arg(short, long)]
    long: bool,

    /// Perform other operations but do not flip the output format.
    #[arg(short, long)]
    no_flip: bool,

    /// Input file [default: stdin]
    input: Option<PathBuf>,

    /// Output file [default: stdout]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let template = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let in_format = cli
        .input_format
        .or_else(|| cli.input.as_deref().and_then(sniff_extension));

    let out_format = cli.output_format.or(if cli.json {
        Some(Format::Json)
    } else if cli.yaml {
        Some(Format::Yaml)
    } else {
        None
    });

    let flipped = flip(
        &template,
        in_format,
        out_format,
        cli.clean,
        cli.no_flip,
        cli.long,
    )?;

    match &cli.output {
        Some(path) => fs::write(path, flipped)?,
        None => io::stdout().write_all(flipped.as_bytes())?,
    }

    Ok(())
}

/// File extensions give the input format without a flag.
fn sniff_extension(path: &Path) -> Option<Format> {
    match path.extension()?.to_str()? {
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}
