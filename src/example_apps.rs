use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser, ValueEnum, error::ErrorKind};

use crate::config::{DatasetSchema, RenderConfig};
#[cfg(feature = "http")]
use crate::config::HttpSourceConfig;
use crate::constants::schema::JSON_SUFFIX;
use crate::facets::{Facet, FacetValue};
use crate::render::render_html;
use crate::session::{LoadOutcome, Session};
use crate::sort::SortDirection;
#[cfg(feature = "http")]
use crate::source::HttpSource;
use crate::source::{DatasetLoader, FileSource, ResourceSource};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaArg {
    Grouped,
    Layered,
}

impl From<SchemaArg> for DatasetSchema {
    fn from(value: SchemaArg) -> Self {
        match value {
            SchemaArg::Grouped => DatasetSchema::grouped(),
            SchemaArg::Layered => DatasetSchema::layered(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Ascending,
    Descending,
}

impl From<OrderArg> for SortDirection {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Ascending => SortDirection::Ascending,
            OrderArg::Descending => SortDirection::Descending,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "render_dataset",
    disable_help_subcommand = true,
    about = "Render an activation dataset as highlighted HTML",
    long_about = "Load a (optionally gzip-compressed) activation dataset from a directory or base URL, apply facet filters and ordering, and write colored token spans as HTML.",
    group(ArgGroup::new("location").required(true).args(["data_dir", "base_url"]))
)]
/// CLI for `render_dataset`.
///
/// Common usage:
/// - List datasets in a folder: `--data-dir ./data --list`
/// - Render one layer: `--data-dir ./data --schema layered --dataset layer_6 --filter feature=12`
struct RenderDatasetCli {
    #[arg(long = "data-dir", value_name = "PATH", help = "Directory holding dataset resources")]
    data_dir: Option<PathBuf>,
    #[arg(long = "base-url", value_name = "URL", help = "Base URL holding dataset resources")]
    base_url: Option<String>,
    #[arg(long, value_enum, default_value = "grouped", help = "Dataset layout")]
    schema: SchemaArg,
    #[arg(long, help = "Datasets are uncompressed `.json` instead of `.json.gz`")]
    plain: bool,
    #[arg(long, help = "Dataset id; defaults to the first listed dataset")]
    dataset: Option<String>,
    #[arg(long, help = "Print available dataset ids and exit")]
    list: bool,
    #[arg(
        long = "filter",
        value_name = "FACET=VALUE",
        value_parser = parse_filter_arg,
        help = "Facet constraint, repeat as needed (for example group=news)"
    )]
    filters: Vec<(Facet, String)>,
    #[arg(long, value_enum, default_value = "descending", help = "Activation score ordering")]
    order: OrderArg,
    #[arg(
        long,
        default_value_t = 20,
        value_parser = parse_positive_usize,
        help = "Maximum number of records rendered"
    )]
    limit: usize,
    #[arg(long, value_name = "RESOURCE", help = "Feature metadata resource to summarize")]
    metadata: Option<String>,
    #[arg(long, value_name = "PATH", help = "Write HTML here instead of stdout")]
    output: Option<PathBuf>,
}

/// Run the `render_dataset` demo with `args_iter` (program name excluded), writing to `out`.
pub fn run_render_dataset<I>(args_iter: I, out: &mut dyn Write) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let Some(cli) = parse_cli::<RenderDatasetCli, _>(
        std::iter::once("render_dataset".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut schema: DatasetSchema = cli.schema.into();
    if cli.plain {
        schema = schema.with_resource_suffix(JSON_SUFFIX);
    }
    let source = build_source(&cli)?;
    let loader = DatasetLoader::new(source, schema);

    if cli.list {
        for id in loader.available_datasets()? {
            writeln!(out, "{id}")?;
        }
        return Ok(());
    }

    let dataset_id = match cli.dataset.clone() {
        Some(id) => id,
        None => loader
            .available_datasets()?
            .into_iter()
            .next()
            .ok_or("no datasets found; pass --dataset explicitly")?,
    };

    let session = Session::new(loader);
    if let LoadOutcome::Failed(err) = session.load_in_background(dataset_id).wait() {
        return Err(err.into());
    }
    for (facet, value) in &cli.filters {
        session.select(*facet, value)?;
    }
    session.set_direction(cli.order.into());

    let config = RenderConfig::default();
    if let Some(resource) = &cli.metadata {
        let metadata = session.loader().load_metadata(resource)?;
        let selection = session.selection();
        match selection.filter.constraint(Facet::Feature) {
            Some(feature) => describe_feature(out, &metadata, feature, config.tooltip_precision)?,
            None => writeln!(out, "<!-- {} features described -->", metadata.len())?,
        }
    }

    let mut view = session.view();
    view.truncate(cli.limit);
    let html = render_html(&view, &config);
    match &cli.output {
        Some(path) => fs::write(path, html)?,
        None => out.write_all(html.as_bytes())?,
    }
    Ok(())
}

fn describe_feature(
    out: &mut dyn Write,
    metadata: &crate::metadata::FeatureMetadata,
    feature: &FacetValue,
    precision: usize,
) -> std::io::Result<()> {
    match metadata.for_value(feature) {
        Some(descriptor) => writeln!(
            out,
            "<!-- {}: {} -->",
            Facet::Feature.encode(feature),
            descriptor.summary_line(precision)
        ),
        None => writeln!(out, "<!-- {}: no metadata -->", Facet::Feature.encode(feature)),
    }
}

fn build_source(cli: &RenderDatasetCli) -> Result<Arc<dyn ResourceSource>, Box<dyn Error>> {
    if let Some(dir) = &cli.data_dir {
        return Ok(Arc::new(FileSource::new(dir)));
    }
    cli.base_url
        .as_deref()
        .and_then(http_source)
        .ok_or_else(|| "no usable data location; --base-url requires the `http` feature".into())
}

#[cfg(feature = "http")]
fn http_source(base_url: &str) -> Option<Arc<dyn ResourceSource>> {
    Some(Arc::new(HttpSource::new(HttpSourceConfig::new(base_url))))
}

#[cfg(not(feature = "http"))]
fn http_source(_base_url: &str) -> Option<Arc<dyn ResourceSource>> {
    None
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_filter_arg(raw: &str) -> Result<(Facet, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("--filter expects FACET=VALUE, got '{raw}'"))?;
    let facet = name.trim().parse::<Facet>().map_err(|err| err.to_string())?;
    Ok((facet, value.to_string()))
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse --limit value '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("--limit must be greater than zero".to_string());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DATA: &str = r#"[
        {"text_id":"a","tokens":["low"],"firing_magnitudes":[1],"group":"news","feature":3},
        {"text_id":"b","tokens":["high"],"firing_magnitudes":[9],"group":"news","feature":3},
        {"text_id":"c","tokens":["other"],"firing_magnitudes":[5],"group":"blog","feature":4}
    ]"#;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn filter_arg_parses_facet_and_value() {
        assert_eq!(
            parse_filter_arg("sub_source=wiki=en"),
            Ok((Facet::SubSource, "wiki=en".to_string()))
        );
        assert!(parse_filter_arg("group").is_err());
        assert!(parse_filter_arg("colour=red").is_err());
    }

    #[test]
    fn positive_usize_rejects_zero() {
        assert_eq!(parse_positive_usize("3"), Ok(3));
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_usize("x").is_err());
    }

    #[test]
    fn lists_and_renders_from_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("texts.json"), DATA).unwrap();
        fs::write(
            dir.path().join("meta.json"),
            r#"{"3": {"Macro F1": 0.5}}"#,
        )
        .unwrap();
        let root = dir.path().to_string_lossy().to_string();

        let mut listed = Vec::new();
        run_render_dataset(args(&["--data-dir", &root, "--plain", "--list"]), &mut listed).unwrap();
        let listed = String::from_utf8(listed).unwrap();
        assert!(listed.lines().any(|line| line == "texts"));
        assert!(listed.lines().any(|line| line == "meta"));

        let mut rendered = Vec::new();
        run_render_dataset(
            args(&[
                "--data-dir",
                &root,
                "--plain",
                "--dataset",
                "texts",
                "--filter",
                "group=news",
                "--filter",
                "feature=3",
                "--metadata",
                "meta.json",
            ]),
            &mut rendered,
        )
        .unwrap();
        let html = String::from_utf8(rendered).unwrap();
        assert!(html.contains("feature=3: Macro F1: 0.5000"));
        let high = html.find("high").unwrap();
        let low = html.find("low").unwrap();
        assert!(high < low);
        assert!(!html.contains("other"));
    }

    #[test]
    fn missing_dataset_is_reported() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let mut out = Vec::new();
        let err = run_render_dataset(
            args(&["--data-dir", &root, "--dataset", "absent"]),
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("absent.json.gz"));
    }

    #[test]
    fn location_is_required() {
        let mut out = Vec::new();
        assert!(run_render_dataset(args(&["--list"]), &mut out).is_err());
    }
}
