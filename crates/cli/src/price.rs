//! `pricefill price`, `check` and `schemas`.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use pricefill_io::{read_input, write_output, PricelistCache};
use pricefill_pricing::schema::BUILTIN_SCHEMAS;
use pricefill_pricing::{
    price_table, LoadedPricelist, PriceSchema, PriceSummary, PricelistDiagnostics,
};

use crate::{CliError, PricelistArgs};

#[derive(Serialize)]
struct PriceReport<'a> {
    pricelist: &'a PricelistDiagnostics,
    results: Vec<InputReport>,
}

#[derive(Serialize)]
struct InputReport {
    input: String,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PriceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Price every input against one pricelist load. A failing input is
/// reported and skipped; the run exits with the first failure's code once
/// every input has been tried.
pub fn cmd_price(
    inputs: Vec<PathBuf>,
    args: PricelistArgs,
    output: Option<PathBuf>,
    sheet: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    if output.is_some() && inputs.len() > 1 {
        return Err(CliError::usage("--output can only be used with a single input")
            .with_hint("omit -o to write <input>_priced.xlsx next to each input"));
    }

    let schema = resolve_schema(&args)?;
    let mut cache = PricelistCache::new();
    let pricelist = cache.get_or_load(&args.pricelist, &schema)?;
    let diagnostics = &pricelist.diagnostics;

    if !quiet && !json {
        print_diagnostics_line(&args.pricelist, diagnostics);
    }

    let mut results = Vec::with_capacity(inputs.len());
    let mut first_failure: Option<u8> = None;
    for input in &inputs {
        let out = output.clone().unwrap_or_else(|| default_output_path(input));
        let mut report = InputReport {
            input: input.display().to_string(),
            output: out.display().to_string(),
            summary: None,
            error: None,
        };

        match price_one(input, &out, sheet.as_deref(), &pricelist, &schema) {
            Ok(summary) => {
                if !quiet && !json {
                    print_summary(input, &out, &summary);
                }
                report.summary = Some(summary);
            }
            Err(err) => {
                eprintln!("error: {}: {}", input.display(), err.message);
                if let Some(hint) = &err.hint {
                    eprintln!("hint:  {}", hint);
                }
                first_failure = first_failure.or(Some(err.code));
                report.error = Some(err.message);
            }
        }
        results.push(report);
    }

    if json {
        let report = PriceReport { pricelist: diagnostics, results };
        print_json(&report)?;
    }

    match first_failure {
        // Already printed per input.
        Some(code) => Err(CliError { code, message: String::new(), hint: None }),
        None => Ok(()),
    }
}

fn price_one(
    input: &Path,
    out: &Path,
    sheet: Option<&str>,
    pricelist: &LoadedPricelist,
    schema: &PriceSchema,
) -> Result<PriceSummary, CliError> {
    if same_file(input, out) {
        return Err(CliError::usage(format!(
            "output {} would overwrite the input",
            out.display()
        )));
    }

    let table = read_input(input, sheet)?;
    let (priced, summary) = price_table(&table, pricelist, schema)?;
    write_output(&priced, out, &schema.output.sheet)?;
    debug!("wrote {}", out.display());
    Ok(summary)
}

pub fn cmd_check(args: PricelistArgs, json: bool) -> Result<(), CliError> {
    let schema = resolve_schema(&args)?;
    let pricelist = pricefill_io::load_pricelist(&args.pricelist, &schema)?;
    let d = &pricelist.diagnostics;

    if json {
        return print_json(d);
    }

    println!("pricelist: {}", args.pricelist.display());
    println!("schema:    {}", d.schema);
    println!("sheet:     {}", d.sheet);
    println!("rows:      {}", d.rows);
    println!("keys:      {}", d.keys);
    println!("conflicts: {}", d.conflicts.len());
    for c in &d.conflicts {
        println!(
            "  row {}: {} {} -> {}",
            c.row_number, c.key, c.previous, c.incoming
        );
    }
    Ok(())
}

pub fn cmd_schemas(show: Option<String>, json: bool) -> Result<(), CliError> {
    if let Some(name) = show {
        let schema = PriceSchema::builtin(&name)?;
        let text = toml::to_string_pretty(&schema)
            .map_err(|e| CliError::io(format!("cannot render schema: {e}")))?;
        print!("{text}");
        return Ok(());
    }

    let schemas = BUILTIN_SCHEMAS
        .iter()
        .map(|name| PriceSchema::builtin(name))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        return print_json(&schemas);
    }

    for schema in &schemas {
        let columns = schema.pricelist_required();
        println!("{:<12} {}", schema.name, columns.join(" | "));
    }
    Ok(())
}

/// `--schema-file` wins over `--schema` (clap rejects passing both).
fn resolve_schema(args: &PricelistArgs) -> Result<PriceSchema, CliError> {
    match &args.schema_file {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::io(format!("cannot read schema file {}: {e}", path.display()))
            })?;
            Ok(PriceSchema::from_toml(&text)?)
        }
        None => Ok(PriceSchema::builtin(&args.schema)?),
    }
}

/// `<dir>/<stem>_priced.xlsx`
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_priced.xlsx"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json_str}");
    Ok(())
}

fn print_diagnostics_line(path: &Path, d: &PricelistDiagnostics) {
    eprintln!(
        "pricelist {} (sheet '{}', {} rows, {} keys, {} conflicts)",
        path.display(),
        d.sheet,
        d.rows,
        d.keys,
        d.conflicts.len()
    );
}

fn print_summary(input: &Path, output: &Path, s: &PriceSummary) {
    eprintln!(
        "{} -> {}: {} rows, {} ok, {} not found, {} incomplete",
        input.display(),
        output.display(),
        s.total,
        s.ok,
        s.not_found,
        s.incomplete
    );
    for row in &s.not_found_sample {
        eprintln!("  not found: row {} {}", row.row_number, row.key);
    }
    if s.not_found > s.not_found_sample.len() {
        eprintln!("  ... and {} more", s.not_found - s.not_found_sample.len());
    }
}
