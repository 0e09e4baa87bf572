use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use proquest_xml::{
    concordance_with_window, create_table, create_table_lenient, filter_company_reports,
    parse_query_line, prompt_query_terms, Document, Table, DEFAULT_CONTEXT_WINDOW,
};

#[derive(Parser, Debug)]
#[command(name = "proquest-xml")]
#[command(about = "Flatten ProQuest XML exports to CSV, optionally as keyword-in-context rows")]
struct Cli {
    /// ProQuest XML files to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Output CSV path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Run a concordance search instead of exporting the flat table
    #[arg(long)]
    concordance: bool,
    /// Comma-separated query terms; prompts interactively when omitted
    #[arg(long)]
    terms: Option<String>,
    /// Context window size in tokens per side
    #[arg(long, default_value_t = DEFAULT_CONTEXT_WINDOW)]
    window: usize,
    /// Skip documents that fail to flatten instead of aborting
    #[arg(long)]
    lenient: bool,
    /// Keep "Company Data Report" rows in concordance output
    #[arg(long)]
    keep_company_reports: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();

    let mut documents = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let doc = Document::from_file(path)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        documents.push(doc);
    }

    let table = if args.lenient {
        let (table, failures) = create_table_lenient(&documents, &[]);
        for (index, err) in &failures {
            eprintln!("skipped {}: {}", args.files[*index].display(), err);
        }
        table
    } else {
        create_table(&documents, &[])?
    };

    let table = if args.concordance {
        let terms = match &args.terms {
            Some(raw) => parse_query_line(raw)?,
            None => prompt_query_terms()?,
        };
        let table = if args.keep_company_reports {
            table
        } else {
            filter_company_reports(&table)
        };
        concordance_with_window(&table, &terms, args.window)
    } else {
        table
    };

    if table.is_empty() {
        bail!("no rows to write");
    }
    write_output(&table, args.output.as_deref())?;
    Ok(())
}

fn write_output(table: &Table, output: Option<&std::path::Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            table.write_csv(BufWriter::new(file))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            table.write_csv(&mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}
