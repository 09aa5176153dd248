// Command-line front end for oxibps.
//
// Explicit subcommands for creating, applying and inspecting BPS patches.
// Each command handler returns a process exit code.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::bps::decoder::{DEFAULT_MAX_TARGET_LEN, PatchInfo, ResolvedOp};
use crate::bps::operation::Operation;
use crate::engine::{DecodeOptions, EncodeOptions, MIN_MATCH};
use crate::io::{self, IoError};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// BPS binary patch encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "oxibps",
    version,
    about = "BPS binary patch encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a patch that turns SOURCE into TARGET.
    Create(CreateArgs),
    /// Apply a patch to SOURCE, writing the reconstructed target.
    Apply(ApplyArgs),
    /// Print the header, metadata and checksums of a patch.
    Info(PrintArgs),
    /// List every operation in a patch.
    Ops(PrintArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Original file.
    #[arg(value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Modified file.
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,

    /// Patch file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Metadata text stored in the patch header.
    #[arg(long, short = 'm')]
    metadata: Option<String>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Original file.
    #[arg(value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// File to write the reconstructed target to.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Disable CRC-32 verification.
    #[arg(long = "no-checksum")]
    no_checksum: bool,

    /// Refuse patches that declare a larger target (bytes, 0 = no limit).
    #[arg(long = "max-target-size", value_name = "BYTES")]
    max_target_size: Option<u64>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// BPS patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Create,
    Apply,
    Info,
    Ops,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    no_checksum: bool,
    max_target_len: Option<u64>,
    metadata: Vec<u8>,
    source_file: Option<PathBuf>,
    target_file: Option<PathBuf>,
    patch_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

impl Options {
    fn new(command: Command, cli: &Cli) -> Self {
        Self {
            command,
            force: cli.force,
            quiet: cli.quiet,
            verbose: cli.verbose.min(2),
            json_output: cli.json_output,
            no_checksum: false,
            max_target_len: Some(DEFAULT_MAX_TARGET_LEN),
            metadata: Vec::new(),
            source_file: None,
            target_file: None,
            patch_file: None,
            output_file: None,
        }
    }

    /// Default log filter for the chosen verbosity.
    fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, _) => "debug",
        }
    }

    fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            metadata: self.metadata.clone(),
        }
    }

    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            verify_checksums: !self.no_checksum,
            max_target_len: self.max_target_len,
        }
    }
}

fn resolve_options(cli: Cli) -> Options {
    let command = match &cli.command {
        Cmd::Create(_) => Command::Create,
        Cmd::Apply(_) => Command::Apply,
        Cmd::Info(_) => Command::Info,
        Cmd::Ops(_) => Command::Ops,
        Cmd::Config => Command::Config,
    };
    let mut opts = Options::new(command, &cli);

    match cli.command {
        Cmd::Create(args) => {
            opts.metadata = args.metadata.map(String::into_bytes).unwrap_or_default();
            opts.source_file = Some(args.source);
            opts.target_file = Some(args.target);
            opts.output_file = Some(args.patch);
        }
        Cmd::Apply(args) => {
            opts.no_checksum = args.no_checksum;
            if let Some(limit) = args.max_target_size {
                opts.max_target_len = (limit != 0).then_some(limit);
            }
            opts.source_file = Some(args.source);
            opts.patch_file = Some(args.patch);
            opts.output_file = Some(args.output);
        }
        Cmd::Info(args) | Cmd::Ops(args) => opts.patch_file = Some(args.patch),
        Cmd::Config => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxibps".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = opts.log_filter();
        let _ = opts.encode_options();
        let _ = opts.decode_options();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required<'a>(path: &'a Option<PathBuf>, what: &str) -> Result<&'a Path, i32> {
    path.as_deref().ok_or_else(|| {
        eprintln!("oxibps: missing {what} file");
        1
    })
}

fn check_overwrite(path: &Path, force: bool) -> Result<(), i32> {
    if path.exists() && !force {
        eprintln!(
            "oxibps: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return Err(1);
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => eprintln!("oxibps: json error: {e}"),
    }
}

fn digest_json(digest: Option<[u8; 32]>) -> serde_json::Value {
    digest.map_or(serde_json::Value::Null, |d| io::hex(&d).into())
}

fn report_io_error(context: &str, e: &IoError) -> i32 {
    eprintln!("oxibps: {context}: {e}");
    1
}

fn read_patch(path: &Path) -> Result<(Vec<u8>, PatchInfo), i32> {
    let patch = std::fs::read(path).map_err(|e| {
        eprintln!("oxibps: {}: {e}", path.display());
        1
    })?;
    let info = PatchInfo::parse(&patch).map_err(|e| {
        eprintln!("oxibps: invalid BPS patch: {e}");
        1
    })?;
    Ok((patch, info))
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxibps version {version} (Rust)");

    let crc32fast = cfg!(feature = "crc32") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("CRC32FAST={crc32fast}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("MIN_MATCH={MIN_MATCH}");
    eprintln!("MAX_TARGET_LEN={DEFAULT_MAX_TARGET_LEN}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Create command
// ---------------------------------------------------------------------------

fn cmd_create(opts: &Options) -> i32 {
    let (source, target, patch) = match (
        required(&opts.source_file, "source"),
        required(&opts.target_file, "target"),
        required(&opts.output_file, "patch"),
    ) {
        (Ok(s), Ok(t), Ok(p)) => (s, t, p),
        _ => return 1,
    };
    if let Err(code) = check_overwrite(patch, opts.force) {
        return code;
    }

    let stats = match io::encode_file(source, target, patch, &opts.encode_options()) {
        Ok(stats) => stats,
        Err(e) => return report_io_error("create", &e),
    };

    if opts.verbose > 0 && !opts.quiet {
        let ops = &stats.operations;
        eprintln!(
            "oxibps: create: source size: {}, target size: {}, patch size: {}",
            stats.source_size, stats.target_size, stats.patch_size
        );
        eprintln!(
            "oxibps: create: {} operations ({} source reads, {} target reads, \
             {} source copies, {} target copies), {} literal bytes",
            ops.total(),
            ops.source_reads,
            ops.target_reads,
            ops.source_copies,
            ops.target_copies,
            ops.literal_bytes
        );
    }

    if opts.json_output {
        let ops = &stats.operations;
        print_json(&serde_json::json!({
            "command": "create",
            "source_size": stats.source_size,
            "target_size": stats.target_size,
            "patch_size": stats.patch_size,
            "operations": {
                "source_read": ops.source_reads,
                "target_read": ops.target_reads,
                "source_copy": ops.source_copies,
                "target_copy": ops.target_copies,
            },
            "literal_bytes": ops.literal_bytes,
            "source_sha256": digest_json(stats.source_sha256),
            "target_sha256": digest_json(stats.target_sha256),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Apply command
// ---------------------------------------------------------------------------

fn cmd_apply(opts: &Options) -> i32 {
    let (source, patch, output) = match (
        required(&opts.source_file, "source"),
        required(&opts.patch_file, "patch"),
        required(&opts.output_file, "output"),
    ) {
        (Ok(s), Ok(p), Ok(o)) => (s, p, o),
        _ => return 1,
    };
    if let Err(code) = check_overwrite(output, opts.force) {
        return code;
    }

    let stats = match io::decode_file(source, patch, output, &opts.decode_options()) {
        Ok(stats) => stats,
        Err(e) => return report_io_error("apply", &e),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxibps: apply: source size: {}, patch size: {}, output size: {}",
            stats.source_size, stats.patch_size, stats.output_size
        );
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "apply",
            "source_size": stats.source_size,
            "patch_size": stats.patch_size,
            "output_size": stats.output_size,
            "checksums_verified": !opts.no_checksum,
            "output_sha256": digest_json(stats.output_sha256),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Print commands (info, ops)
// ---------------------------------------------------------------------------

fn cmd_info(opts: &Options) -> i32 {
    let path = match required(&opts.patch_file, "patch") {
        Ok(p) => p,
        Err(code) => return code,
    };
    let (patch, info) = match read_patch(path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let patch_crc_ok = info.verify_patch_crc(&patch).is_ok();

    println!("BPS patch size:               {}", patch.len());
    println!("BPS source size:              {}", info.header.source_len);
    println!("BPS target size:              {}", info.header.target_len);
    println!("BPS metadata size:            {}", info.header.metadata.len());
    if !info.header.metadata.is_empty() {
        let s = String::from_utf8_lossy(&info.header.metadata);
        println!("BPS metadata:                 {s}");
    }
    println!("BPS operation bytes:          {}", info.ops_end - info.ops_start);
    println!("BPS source crc32:             {:08X}", info.footer.source_crc);
    println!("BPS target crc32:             {:08X}", info.footer.target_crc);
    println!(
        "BPS patch crc32:              {:08X} ({})",
        info.footer.patch_crc,
        if patch_crc_ok { "ok" } else { "MISMATCH" }
    );

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "info",
            "patch_size": patch.len(),
            "source_size": info.header.source_len,
            "target_size": info.header.target_len,
            "metadata": String::from_utf8_lossy(&info.header.metadata),
            "source_crc32": info.footer.source_crc,
            "target_crc32": info.footer.target_crc,
            "patch_crc32": info.footer.patch_crc,
            "patch_crc32_ok": patch_crc_ok,
        }));
    }

    if patch_crc_ok { 0 } else { 1 }
}

fn describe(r: &ResolvedOp<'_>) -> String {
    let mut line = format!(
        "{:>10}  {:<11} {:>8}",
        r.output_offset,
        r.op.kind().name(),
        r.op.length()
    );
    if let (Some(delta), Some(read)) = (r.op.delta(), r.read_offset) {
        line.push_str(&format!("  @{read} ({delta:+})"));
    } else if let Some(read) = r.read_offset {
        line.push_str(&format!("  @{read}"));
    }
    line
}

fn cmd_ops(opts: &Options) -> i32 {
    let path = match required(&opts.patch_file, "patch") {
        Ok(p) => p,
        Err(code) => return code,
    };
    let (patch, info) = match read_patch(path) {
        Ok(r) => r,
        Err(code) => return code,
    };

    println!("    offset  operation     length  read");
    let mut count = 0u64;
    let mut literal_bytes = 0u64;
    let mut iter = info.operations(&patch);
    while let Some(item) = iter.next() {
        let resolved = match item {
            Ok(r) => r,
            Err(e) => {
                eprintln!(
                    "oxibps: operation {count} (target offset {}): {e}",
                    iter.output_offset()
                );
                return 1;
            }
        };
        if let Operation::TargetRead { length } = resolved.op {
            literal_bytes += length as u64;
        }
        println!("{}", describe(&resolved));
        count += 1;
    }

    if !opts.quiet {
        eprintln!("oxibps: {count} operations, {literal_bytes} literal bytes");
    }
    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "ops",
            "operations": count,
            "literal_bytes": literal_bytes,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(opts.log_filter()))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Create => cmd_create(&opts),
        Command::Apply => cmd_apply(&opts),
        Command::Info => cmd_info(&opts),
        Command::Ops => cmd_ops(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
