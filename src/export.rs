use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::StarredRepoRecord;
use crate::types::GitHubRepo;
use clap::ValueEnum;
use futures::stream::{Stream, TryStreamExt};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where the serialized records go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl From<Option<PathBuf>> for Destination {
    fn from(dest: Option<PathBuf>) -> Self {
        dest.map_or(Destination::Stdout, Destination::File)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("standard output"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub count: usize,
    pub destination: Destination,
}

/// Drains the repository stream into records, keeping page order.
pub async fn collect_records<S>(repos: S) -> Result<Vec<StarredRepoRecord>>
where
    S: Stream<Item = Result<GitHubRepo>>,
{
    repos.map_ok(StarredRepoRecord::from).try_collect().await
}

/// Pretty-printed array with 2-space indentation, no trailing newline.
pub fn write_json<W: Write>(records: &[StarredRepoRecord], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// `name,link` header followed by one CRLF-terminated row per record.
pub fn write_csv<W: Write>(records: &[StarredRepoRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    // Written explicitly so an empty export still gets a header
    writer.write_record(["name", "link"])?;
    for record in records {
        writer.write_record([record.name.as_str(), record.link.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn render<W: Write>(
    records: &[StarredRepoRecord],
    format: OutputFormat,
    writer: W,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(records, writer),
        OutputFormat::Csv => write_csv(records, writer),
    }
}

pub fn write_records(
    records: &[StarredRepoRecord],
    format: OutputFormat,
    destination: &Destination,
) -> Result<()> {
    match (destination, format) {
        (Destination::Stdout, _) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            render(records, format, &mut handle)?;
            if format == OutputFormat::Json {
                writeln!(handle)?;
            }
            handle.flush()?;
        }
        (Destination::File(path), OutputFormat::Json) => write_json_atomic(records, path)?,
        (Destination::File(path), OutputFormat::Csv) => {
            let mut file = BufWriter::new(File::create(path)?);
            write_csv(records, &mut file)?;
            file.flush()?;
        }
    }

    debug!(destination = %destination, %format, count = records.len(), "Wrote records");
    Ok(())
}

/// Writes into a sibling temp file and renames it over `path`.
fn write_json_atomic(records: &[StarredRepoRecord], path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    // Created like `File::create` would, subject to the umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;

    // An overwritten export keeps its mode
    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_json(records, &mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Fetches every repository `username` starred and writes them out.
pub async fn export_starred(
    client: &GitHubClient,
    username: &str,
    format: OutputFormat,
    destination: Destination,
) -> Result<ExportSummary> {
    let starred = client.starred(username).await?;
    info!(
        user = starred.login(),
        total = starred.total_count(),
        pages = starred.total_pages(),
        "Fetching starred repositories"
    );

    let records = collect_records(starred.into_stream()).await?;
    write_records(&records, format, &destination)?;

    Ok(ExportSummary {
        count: records.len(),
        destination,
    })
}
