extern crate bers;

use bers::output::FileOutput;
use bers::{run_project, CoefficientTables, ProjectFlags};
use clap::Parser;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct BersArgs {
    input_file: String,
    /// Read the input as a flat web-form submission
    #[arg(long, default_value_t = false)]
    form: bool,
    /// Directory holding the published coefficient tables, replacing the bundled samples
    #[arg(long)]
    tables_dir: Option<PathBuf>,
    /// Directory to write results into, defaulting to the input file's directory
    #[arg(long, short)]
    output_dir: Option<PathBuf>,
    /// Also write the intermediate values of the estimation
    #[arg(long, default_value_t = false)]
    breakdown: bool,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = BersArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let input_file = Path::new(args.input_file.as_str());
    let input_file_stem = input_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("building");
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        input_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let output = FileOutput::new(
        output_dir,
        format!("{input_file_stem}__bers__{{}}.{{}}"),
    );

    let tables = args
        .tables_dir
        .as_ref()
        .map(CoefficientTables::from_directory)
        .transpose()?;

    let mut flags = ProjectFlags::empty();
    if args.form {
        flags.insert(ProjectFlags::FORM_INPUT);
    }
    if args.breakdown {
        flags.insert(ProjectFlags::BREAKDOWN);
    }

    let result = run_project(
        BufReader::new(File::open(input_file)?),
        &output,
        tables,
        &flags,
    )?;

    info!(
        "score {:.1}, level {}",
        result.est_score, result.est_score_level
    );

    Ok(())
}
