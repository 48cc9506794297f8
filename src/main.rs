use clap::Parser;
use tracing_subscriber::EnvFilter;
use xlsx_design::cli::{run_table_export, TableExportOptions};
use xlsx_design::config::DesignerOptions;
use xlsx_design::culture::CULTURES;
use xlsx_design::document::DocumentProperties;

use std::fs::File;
use std::io::{self, Read, Write};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    export: TableExportOptions,

    /// Culture used for currency symbols and date formats (e.g., en-US, de-DE, ja-JP)
    #[arg(short = 'c', long, default_value = "en-US")]
    culture: String,

    /// Title stored in the document properties
    #[arg(long)]
    doc_title: Option<String>,
    /// Author stored in the document properties
    #[arg(long)]
    author: Option<String>,
    /// Company stored in the document properties
    #[arg(long)]
    company: Option<String>,

    /// Skip writing shadow, glow and soft-edge effects
    #[arg(long, default_value_t = false)]
    no_effects: bool,

    /// Input file (default: stdin)
    input: Option<String>,

    /// Output file (default: stdout)
    output: Option<String>,

    /// List available cultures
    #[arg(short = 'l', long)]
    list_cultures: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if cli.list_cultures {
        for culture in CULTURES {
            println!(
                "{:<8}{:<6}{}",
                culture.name, culture.currency_symbol, culture.short_date
            );
        }
        return Ok(());
    }

    let mut input_content = String::new();
    match cli.input.as_deref() {
        Some(path) if path != "-" => {
            File::open(path)?.read_to_string(&mut input_content)?;
        }
        _ => {
            io::stdin().read_to_string(&mut input_content)?;
        }
    }

    let designer_options = DesignerOptions {
        properties: DocumentProperties {
            title: cli.doc_title,
            author: cli.author,
            company: cli.company,
            ..Default::default()
        },
        apply_effects: !cli.no_effects,
        ..DesignerOptions::default()
    }
    .with_culture(&cli.culture);

    let mut workbook = Vec::new();
    run_table_export(&input_content, &mut workbook, &cli.export, designer_options)?;

    // Only touch the output once the workbook exists.
    let mut output_writer: Box<dyn Write> = match cli.output {
        Some(path) if path != "-" => Box::new(File::create(path)?),
        _ => Box::new(io::stdout()),
    };
    output_writer.write_all(&workbook)?;
    output_writer.flush()?;

    Ok(())
}
