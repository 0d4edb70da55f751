//! pdfreflow CLI - PDF text extraction with line-wrap repair

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfreflow::batch::run_batch_with_progress;
use pdfreflow::{
    BatchConfig, ErrorMode, ExtractOptions, JsonFormat, ReflowOptions, ReflowPreset, Reflower,
    TextExtractor,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "pdfreflow")]
#[command(version)]
#[command(about = "Extract text from PDFs and repair broken line wraps", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output text file (default: <FILE stem>_cleaned.txt)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    reflow: ReflowArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Reflow and error-handling flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
struct ReflowArgs {
    /// Reflow preset
    #[arg(long, value_enum, global = true)]
    preset: Option<PresetArg>,

    /// Collapse runs of spaces into one
    #[arg(long, global = true)]
    collapse_spaces: bool,

    /// Merge soft-wrapped lines pairwise instead of chaining
    #[arg(long, global = true)]
    no_chain: bool,

    /// Let a line ending in ':' continue onto the next line
    #[arg(long, global = true)]
    colon_continues: bool,

    /// Fail on the first extraction error instead of skipping bad content
    #[arg(long, global = true)]
    strict: bool,
}

impl ReflowArgs {
    fn reflow_options(&self) -> ReflowOptions {
        let preset = self.preset.map(ReflowPreset::from).unwrap_or_default();
        let mut options = ReflowOptions::from_preset(preset);
        if self.collapse_spaces {
            options = options.with_collapse_spaces(true);
        }
        if self.no_chain {
            options = options.with_chain_merges(false);
        }
        if self.colon_continues {
            options = options.with_colon_terminates(false);
        }
        options
    }

    fn extract_options(&self) -> ExtractOptions {
        let error_mode = if self.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        };
        ExtractOptions::new()
            .with_error_mode(error_mode)
            .with_reflow(self.reflow_options())
    }

    fn extractor(&self) -> TextExtractor {
        TextExtractor::with_options(self.extract_options())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean every PDF in a directory
    Batch {
        /// Directory containing the PDFs
        #[arg(value_name = "DIR", env = "PDFREFLOW_INPUT_DIR")]
        input: PathBuf,

        /// Output directory (default: next to the inputs)
        #[arg(short, long, value_name = "DIR", env = "PDFREFLOW_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Input file extension
        #[arg(long, default_value = "pdf", env = "PDFREFLOW_EXT")]
        ext: String,

        /// Output file extension
        #[arg(long, default_value = "txt")]
        out_ext: String,
    },

    /// Print or save the cleaned text of a PDF
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the text as extracted, without reflow
        #[arg(long)]
        raw: bool,
    },

    /// Dump the detailed extraction result as JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Reflow an existing text file
    Clean {
        /// Input text file (stdin if not specified)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    /// Pairwise merges, colon continues, no normalization
    Minimal,
    /// Chained merges, colon ends a sentence, NFC (default)
    Standard,
    /// Standard plus collapsing of space runs
    Aggressive,
}

impl From<PresetArg> for ReflowPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Minimal => ReflowPreset::Minimal,
            PresetArg::Standard => ReflowPreset::Standard,
            PresetArg::Aggressive => ReflowPreset::Aggressive,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch {
            input,
            output,
            ext,
            out_ext,
        }) => cmd_batch(input, output, &ext, &out_ext, &cli.reflow),
        Some(Commands::Text { input, output, raw }) => {
            cmd_text(&input, output.as_deref(), raw, &cli.reflow)
        }
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact, &cli.reflow),
        Some(Commands::Info { input }) => cmd_info(&input, &cli.reflow),
        Some(Commands::Clean { input, output }) => {
            cmd_clean(input.as_deref(), output.as_deref(), &cli.reflow)
        }
        None => {
            if let Some(input) = cli.input {
                cmd_parse(&input, cli.output.as_deref(), &cli.reflow)
            } else {
                println!("{}", "Usage: pdfreflow <FILE> [OUTPUT]".yellow());
                println!("       pdfreflow --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>, reflow: &ReflowArgs) -> CliResult {
    let written = reflow.extractor().parse(input, output)?;
    println!("{} {}", "Saved to".green(), written.display());
    Ok(())
}

fn cmd_batch(
    input: PathBuf,
    output: Option<PathBuf>,
    ext: &str,
    out_ext: &str,
    reflow: &ReflowArgs,
) -> CliResult {
    let mut config = BatchConfig::new(input)
        .with_extension(ext)
        .with_output_extension(out_ext);
    if let Some(dir) = output {
        config = config.with_output_dir(dir);
    }

    let extractor = reflow.extractor();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let report = run_batch_with_progress(&config, &extractor, |outcome, total| {
        pb.set_length(total as u64);
        pb.set_message(
            outcome
                .input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        pb.inc(1);
    })?;

    pb.finish_and_clear();

    if report.is_empty() {
        println!(
            "{} no .{} files in {}",
            "Nothing to do:".yellow(),
            config.extension,
            config.input_dir.display()
        );
        return Ok(());
    }

    for outcome in report.succeeded() {
        println!(
            "  {} {} -> {}",
            "✓".green(),
            outcome.input.display(),
            outcome.output.display()
        );
    }
    for outcome in report.failed() {
        println!(
            "  {} {}: {}",
            "✗".red(),
            outcome.input.display(),
            outcome.error.as_deref().unwrap_or_default()
        );
    }

    let failed = report.failed().count();
    println!(
        "\n{} {} succeeded, {} failed",
        "Done!".green().bold(),
        report.succeeded().count(),
        failed
    );

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, report.len()).into());
    }
    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>, raw: bool, reflow: &ReflowArgs) -> CliResult {
    let result = reflow.extractor().try_extract(input)?;

    let text = if raw { result.text_raw } else { result.text };

    write_or_print(output, &text)
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool, reflow: &ReflowArgs) -> CliResult {
    let result = reflow.extractor().try_extract(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = pdfreflow::render::to_json(&result, format)?;

    write_or_print(output, &json)
}

fn cmd_info(input: &Path, reflow: &ReflowArgs) -> CliResult {
    let result = reflow.extractor().try_extract(input)?;
    let metadata = &result.metadata;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), result.total_pages);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if metadata.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Words".bold(), result.text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), result.text.chars().count());
    println!("{}: {}", "Text blocks".bold(), result.text_element_count());
    println!("{}: {}", "Figures".bold(), result.figure_count());
    println!(
        "{}: {}",
        "Reflow".bold(),
        if result.cleanup_applied {
            "applied"
        } else {
            "skipped (raw text kept)"
        }
    );

    if !result.fonts.is_empty() {
        println!("{}:", "Fonts".bold());
        for font in &result.fonts {
            println!("  {} {}", "•".dimmed(), font);
        }
    }

    Ok(())
}

fn cmd_clean(input: Option<&Path>, output: Option<&Path>, reflow: &ReflowArgs) -> CliResult {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let reflowed = Reflower::new(reflow.reflow_options()).reflow(&text);
    if let pdfreflow::ReflowStatus::Fallback { reason } = &reflowed.status {
        eprintln!("{} {}", "Reflow skipped:".yellow(), reason);
    }

    write_or_print(output, &reflowed.text)
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_takes_file_and_output() {
        let cli = Cli::try_parse_from(["pdfreflow", "protocol2.pdf", "out.txt"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.input, Some(PathBuf::from("protocol2.pdf")));
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.reflow.reflow_options(), ReflowOptions::standard());
    }

    #[test]
    fn test_batch_arguments() {
        let cli = Cli::try_parse_from([
            "pdfreflow", "batch", "papers", "-o", "txt", "--ext", "PDF", "--out-ext", "md",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Batch {
                input,
                output,
                ext,
                out_ext,
            }) => {
                assert_eq!(input, PathBuf::from("papers"));
                assert_eq!(output, Some(PathBuf::from("txt")));
                assert_eq!(ext, "PDF");
                assert_eq!(out_ext, "md");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_reflow_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pdfreflow",
            "text",
            "a.pdf",
            "--preset",
            "minimal",
            "--collapse-spaces",
            "--strict",
        ])
        .unwrap();

        let options = cli.reflow.reflow_options();
        assert_eq!(options, ReflowOptions::minimal().with_collapse_spaces(true));
        assert_eq!(cli.reflow.extract_options().error_mode, ErrorMode::Strict);
    }

    #[test]
    fn test_chain_and_colon_overrides() {
        let cli =
            Cli::try_parse_from(["pdfreflow", "--no-chain", "--colon-continues", "clean"]).unwrap();

        let options = cli.reflow.reflow_options();
        assert!(!options.chain_merges);
        assert!(!options.colon_terminates);
        assert!(options.normalize_unicode);
        assert_eq!(cli.reflow.extract_options().error_mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        assert!(Cli::try_parse_from(["pdfreflow", "--preset", "extreme", "a.pdf"]).is_err());
    }
}
