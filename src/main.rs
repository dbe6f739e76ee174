use anyhow::Result;
use clap::{Parser, Subcommand};
use complaint_dashboard::aggregate;
use complaint_dashboard::config::{DashboardConfig, OutputFormat};
use complaint_dashboard::render;
use complaint_dashboard::schema::{Facet, ViewKind};
use complaint_dashboard::{compute_view, DashboardError, FilterSelection, Selection, Session};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "complaint-dashboard")]
#[command(about = "Filtered summaries and charts over a consumer complaint dataset")]
struct Args {
    /// CSV export to load (or set COMPLAINTS_DATA)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Rows shown per ranking table (or set DASHBOARD_TABLE_ROWS)
    #[arg(long)]
    table_rows: Option<usize>,

    /// Bins of the description-length histogram (or set DASHBOARD_BINS)
    #[arg(long)]
    bins: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Totals and rankings by state, city and status
    Summary {
        #[arg(long, default_value = "All")]
        company: Selection,
        /// State to keep; prefix with `=` to match a literal value such as `=All`
        #[arg(long, default_value = "All")]
        state: Selection,
        /// City to keep; prefix with `=` to match a literal value such as `=All`
        #[arg(long, default_value = "All")]
        city: Selection,
    },
    /// Case series per company and distribution charts
    Dashboard {
        #[arg(long, default_value = "All")]
        company: Selection,
        /// State to keep; prefix with `=` to match a literal value such as `=All`
        #[arg(long, default_value = "All")]
        state: Selection,
        #[arg(long, default_value = "All")]
        status: Selection,
        /// Minimum description length in characters
        #[arg(long, default_value_t = 0)]
        min_length: usize,
    },
    /// Selectable values of one facet
    Options {
        #[arg(value_enum)]
        facet: FacetArg,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FacetArg {
    Company,
    State,
    City,
    Status,
}

impl From<FacetArg> for Facet {
    fn from(arg: FacetArg) -> Self {
        match arg {
            FacetArg::Company => Facet::Company,
            FacetArg::State => Facet::State,
            FacetArg::City => Facet::City,
            FacetArg::Status => Facet::Status,
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = DashboardConfig::from_env()?
        .with_data_path(args.data)
        .with_format(args.format)
        .with_table_rows(args.table_rows)
        .with_histogram_bins(args.bins);

    let mut session = Session::new();
    if let Some(path) = &config.data_path {
        session.load_csv(path)?;
    }

    let (kind, selection) = match args.command {
        Command::Summary { company, state, city } => (
            ViewKind::Summary,
            FilterSelection::new().company(company).state(state).city(city),
        ),
        Command::Dashboard {
            company,
            state,
            status,
            min_length,
        } => (
            ViewKind::Dashboard,
            FilterSelection::new()
                .company(company)
                .state(state)
                .status(status)
                .min_description_length(min_length),
        ),
        Command::Options { facet } => return print_options(&session, facet.into(), &config),
    };

    info!("Computing {:?} view", kind);
    match compute_view(&session, kind, &selection, &config) {
        Ok(view) => {
            match config.format {
                OutputFormat::Text => print!("{}", render::render_view(&view, config.table_rows)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
            }
            Ok(())
        }
        Err(DashboardError::DataNotLoaded) => {
            warn!("No dataset loaded");
            eprintln!("{}", DashboardError::DataNotLoaded);
            Ok(())
        }
        Err(err) => {
            error!("{:?} view failed: {}", kind, err);
            Err(err.into())
        }
    }
}

fn print_options(session: &Session, facet: Facet, config: &DashboardConfig) -> Result<()> {
    let dataset = match session.dataset() {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("{}", err);
            return Ok(());
        }
    };
    let options = aggregate::facet_options(dataset, facet)?;
    match config.format {
        OutputFormat::Text => {
            for option in options {
                println!("{}", option);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
    }
    Ok(())
}
