// ABOUTME: CLI for running sift field specs or ad-hoc processor chains over HTML/JSON files.
// ABOUTME: Prints extracted values as JSON; configuration errors exit with status 1.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value as Json};
use sift_core::{Pipeline, Select, Value};
use sift_loader::{
    CompiledRecord, FieldSpec, HtmlLoader, JsonLoader, ProcessorSpec, RecordSpec, ReducerSpec,
    XPathLoader,
};
use tracing::debug;

/// Extract fields from an HTML or JSON document and print them as JSON.
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Run processor chains over HTML/JSON documents", long_about = None)]
struct Args {
    /// HTML document to query with CSS selectors, or XPath with --xpath ("-" for stdin)
    #[arg(long, conflicts_with = "json", required_unless_present = "json")]
    html: Option<PathBuf>,

    /// JSON document to query with JMESPath ("-" for stdin)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Query the --html document with XPath instead of CSS
    #[arg(long, requires = "html")]
    xpath: bool,

    /// Record spec file mapping field names to query/processors/reduce
    #[arg(long, conflicts_with = "query", required_unless_present = "query")]
    spec: Option<PathBuf>,

    /// Single query to run instead of a record spec
    #[arg(short, long)]
    query: Option<String>,

    /// Processor chain for --query, as a JSON array of processor specs
    #[arg(long, requires = "query")]
    chain: Option<String>,

    /// Reducer for --query, as a JSON reducer spec (default: first non-empty)
    #[arg(long, requires = "query")]
    reduce: Option<String>,

    /// Run once per node matched by this query and print an array
    #[arg(long)]
    each: Option<String>,

    /// Wrap --query results with run diagnostics
    #[arg(long, requires = "query")]
    report: bool,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

enum Document {
    Html(HtmlLoader),
    XPath(XPathLoader),
    Json(JsonLoader),
}

enum Job {
    Record(CompiledRecord),
    Field { query: String, pipeline: Pipeline },
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<()> {
    let document = load_document(args)?;
    let job = build_job(args, &document)?;

    let output = match &args.each {
        Some(each) => {
            let targets = each_target(&document, each);
            debug!(query = %each, count = targets.len(), "running per node");
            Json::Array(
                targets
                    .iter()
                    .map(|t| apply(&job, t.as_ref(), args.report))
                    .collect(),
            )
        }
        None => match &document {
            Document::Html(doc) => apply(&job, doc, args.report),
            Document::XPath(doc) => apply(&job, doc, args.report),
            Document::Json(doc) => apply(&job, doc, args.report),
        },
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match &args.output {
        Some(path) => fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_document(args: &Args) -> Result<Document> {
    if let Some(path) = &args.html {
        let raw = read_input(path)?;
        return Ok(if args.xpath {
            Document::XPath(XPathLoader::parse(&raw))
        } else {
            Document::Html(HtmlLoader::parse(&raw))
        });
    }
    let path = args
        .json
        .as_ref()
        .context("one of --html or --json is required")?;
    let loader = JsonLoader::parse(&read_input(path)?)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(Document::Json(loader))
}

fn build_job(args: &Args, document: &Document) -> Result<Job> {
    if let Some(path) = &args.spec {
        let spec = RecordSpec::from_json(&read_input(path)?)
            .with_context(|| format!("invalid record spec {}", path.display()))?;
        if let Document::Html(_) = document {
            spec.precompile_selectors();
        }
        return Ok(Job::Record(spec.compile()?));
    }

    let query = args
        .query
        .clone()
        .context("one of --spec or --query is required")?;
    let processors: Vec<ProcessorSpec> = match &args.chain {
        Some(raw) => serde_json::from_str(raw).context("invalid --chain")?,
        None => Vec::new(),
    };
    let reduce: ReducerSpec = match &args.reduce {
        Some(raw) => serde_json::from_str(raw).context("invalid --reduce")?,
        None => ReducerSpec::default(),
    };
    let field = FieldSpec {
        query: query.clone(),
        processors,
        reduce,
    };
    Ok(Job::Field {
        query,
        pipeline: field.pipeline()?,
    })
}

fn each_target<'a>(document: &'a Document, query: &str) -> Vec<Box<dyn Select + 'a>> {
    match document {
        Document::Html(doc) => doc
            .css(query)
            .into_iter()
            .map(|node| Box::new(node) as Box<dyn Select + 'a>)
            .collect(),
        Document::XPath(doc) => doc
            .xpath(query)
            .into_iter()
            .map(|node| Box::new(node) as Box<dyn Select + 'a>)
            .collect(),
        Document::Json(doc) => doc
            .node(query)
            .into_iter()
            .map(|node| Box::new(node) as Box<dyn Select + 'a>)
            .collect(),
    }
}

fn apply(job: &Job, source: &dyn Select, report: bool) -> Json {
    match job {
        Job::Record(record) => Json::Object(record.extract(source)),
        Job::Field { query, pipeline } => {
            let (value, stats) = pipeline.run_with_report(Value::List(source.select(query)));
            let value = value.map_or(Json::Null, |v| v.to_json());
            if report {
                json!({
                    "value": value,
                    "report": {
                        "skipped": stats.skipped,
                        "stages_run": stats.stages_run,
                        "short_circuited": stats.short_circuited,
                    }
                })
            } else {
                value
            }
        }
    }
}
