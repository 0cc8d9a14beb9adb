use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use flatrec::{decode_to_json, encode_json, CompiledSchema, Endian};
use flatrec_compiler::{compile_file, emitter_for, CompileOptions, FlatrecError, Language};

#[derive(Parser)]
#[command(name = "flatrec")]
#[command(about = "Lay out fixed-size record schemas and generate C, C++ or Rust definitions", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: OptionArgs,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OptionArgs {
    /// Lay out every field with alignment 1 and mark structs packed
    #[arg(long, global = true)]
    packed: bool,

    #[arg(long, global = true, default_value_t = 65535)]
    max_record_size: u64,

    #[arg(long, global = true, default_value_t = 65535)]
    max_array_elements: u64,

    #[arg(long, global = true, default_value_t = 16)]
    max_nesting_depth: usize,
}

impl From<&OptionArgs> for CompileOptions {
    fn from(args: &OptionArgs) -> Self {
        CompileOptions {
            packed:             args.packed,
            max_record_size:    args.max_record_size,
            max_array_elements: args.max_array_elements,
            max_nesting_depth:  args.max_nesting_depth,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a schema (`.frec` IDL or `.json` config) and print record sizes
    Check {
        /// Input schema file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the computed layout as JSON
    Layout {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Generate a C header
    GenC(GenArgs),

    /// Generate a C++ header with `toJS()` dumps
    GenCpp(GenArgs),

    /// Generate a Rust module with `FixedRecord` impls
    GenRust(GenArgs),

    /// Encode a JSON document into a record image
    Encode {
        #[arg(short, long)]
        input: PathBuf,

        /// Record to encode
        #[arg(short, long)]
        record: String,

        /// JSON document with the field values
        #[arg(short, long)]
        json: PathBuf,

        /// Output file for the record bytes
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        big_endian: bool,
    },

    /// Decode a record image to JSON (printed to stdout)
    Decode {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        record: String,

        /// File holding exactly one record image
        #[arg(short, long)]
        data: PathBuf,

        #[arg(long)]
        big_endian: bool,
    },
}

#[derive(Args)]
struct GenArgs {
    /// Input schema file
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (if omitted, prints to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn endian(big: bool) -> Endian {
    if big {
        Endian::Big
    } else {
        Endian::Little
    }
}

fn generate(schema: &CompiledSchema, language: Language, output: &Option<PathBuf>) -> Result<(), FlatrecError> {
    let code = emitter_for(language).emit(schema)?;
    match output {
        Some(out_path) => {
            fs::write(out_path, &code)?;
            info!("generated {:?} code written to {}", language, out_path.display());
        }
        None => print!("{}", code),
    }
    Ok(())
}

fn load(input: &Path, options: &CompileOptions) -> Result<CompiledSchema, FlatrecError> {
    info!("compiling {}", input.display());
    compile_file(input, options)
}

fn main() -> Result<(), FlatrecError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    let options = CompileOptions::from(&cli.options);

    match &cli.command {
        Commands::Check { input } => {
            let schema = load(input, &options)?;
            for record in schema.iter() {
                println!(
                    "{:20} size 0x{:x}, align 0x{:x}, {} fields",
                    record.name(),
                    record.size,
                    record.align,
                    record.entries.len()
                );
            }
            Ok(())
        }

        Commands::Layout { input } => {
            let schema = load(input, &options)?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }

        Commands::GenC(args) => generate(&load(&args.input, &options)?, Language::C, &args.output),
        Commands::GenCpp(args) => generate(&load(&args.input, &options)?, Language::Cpp, &args.output),
        Commands::GenRust(args) => generate(&load(&args.input, &options)?, Language::Rust, &args.output),

        Commands::Encode { input, record, json, output, big_endian } => {
            let schema = load(input, &options)?;
            let text = fs::read_to_string(json)?;
            let bytes = encode_json(&schema, record, &text, endian(*big_endian))?;
            fs::write(output, &bytes)?;
            info!("wrote {} bytes of {} to {}", bytes.len(), record, output.display());
            Ok(())
        }

        Commands::Decode { input, record, data, big_endian } => {
            let schema = load(input, &options)?;
            let bytes = fs::read(data)?;
            println!("{}", decode_to_json(&schema, record, &bytes, endian(*big_endian))?);
            Ok(())
        }
    }
}
