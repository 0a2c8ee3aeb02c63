// Cost Basis
// Written in 2023 by
//   Andrew Poelstra <tradetracker@wpsoftware.net>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! Cost Basis CLI
//!
//! Replays a journal of acquisitions and disposals and reports the cost
//! basis of every disposal
//!

use anyhow::Context;
use clap::{Parser, Subcommand};
use cost_basis::csv::{self, CsvPrinter};
use cost_basis::file::{self, TextFile};
use cost_basis::journal::{Journal, Report};
use cost_basis::logger::Logger;
use cost_basis::settings::CostBasisMethod;
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cost-basis-cli")]
#[command(about = "Cost basis accounting for asset disposals")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replays a journal and reports the cost basis of every disposal
    Report {
        /// The journal file (JSON)
        journal: PathBuf,
        /// Overrides the journal's cost basis method (fifo, lifo, hifo, acb)
        #[arg(short, long)]
        method: Option<CostBasisMethod>,
        /// Output CSV rather than text
        #[arg(long)]
        csv: bool,
        /// Write the report to this file rather than stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory for the debug and lot-match logs
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
    /// Replays a journal and lists only the disposals which couldn't be matched
    Missing {
        /// The journal file (JSON)
        journal: PathBuf,
        /// Overrides the journal's cost basis method (fifo, lifo, hifo, acb)
        #[arg(short, long)]
        method: Option<CostBasisMethod>,
        /// Output CSV rather than text
        #[arg(long)]
        csv: bool,
    },
}

fn default_log_dir() -> anyhow::Result<PathBuf> {
    let mut log_path = dirs::data_dir().context("getting XDG data directory")?;
    log_path.push("cost-basis");
    log_path.push("logs");
    Ok(log_path)
}

fn init_file_logger(log_dir: &Path) -> anyhow::Result<()> {
    file::ensure_dir(log_dir)?;
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    Logger::init(
        log_dir.join(format!("debug-{now}.log")),
        log_dir.join(format!("matches-{now}.log")),
    )
    .context("initializing logger")
}

fn load_journal(path: &Path, method: Option<CostBasisMethod>) -> anyhow::Result<Journal> {
    let journal = Journal::load(path)?;
    Ok(match method {
        Some(method) => {
            info!("Overriding cost basis method with {}.", method);
            journal.with_method(method)
        }
        None => journal,
    })
}

fn print_report(out: &mut TextFile, report: &Report) -> anyhow::Result<()> {
    writeln!(out, "Cost basis report (method {})", report.method)?;
    writeln!(out)?;
    writeln!(out, "Spends:")?;
    for spend in &report.spends {
        let info = &spend.info;
        writeln!(
            out,
            "  #{} {} {} on {}: taxable {} (cost {}), tax-free {} (cost {}){}",
            spend.event_index,
            info.spending_amount,
            spend.asset,
            spend.timestamp,
            info.taxable_amount,
            info.taxable_bought_cost,
            info.taxfree_amount,
            info.taxfree_bought_cost,
            if info.is_complete { "" } else { " INCOMPLETE" },
        )?;
        for matched in &info.matched_acquisitions {
            writeln!(out, "      {}", matched)?;
        }
    }
    if !report.reductions.is_empty() {
        writeln!(out)?;
        writeln!(out, "Reductions:")?;
        for reduce in &report.reductions {
            writeln!(
                out,
                "  #{} {} {} on {}{}",
                reduce.event_index,
                reduce.amount,
                reduce.asset,
                reduce.timestamp,
                if reduce.complete { "" } else { " INCOMPLETE" },
            )?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Totals:")?;
    for (asset, totals) in &report.totals {
        writeln!(
            out,
            "  {}: taxable {} (cost {}), tax-free {} (cost {}), unmatched {}",
            asset,
            totals.taxable_amount,
            totals.taxable_bought_cost,
            totals.taxfree_amount,
            totals.taxfree_bought_cost,
            totals.unmatched_amount,
        )?;
    }
    print_missing(out, report)
}

fn print_missing(out: &mut TextFile, report: &Report) -> anyhow::Result<()> {
    writeln!(out)?;
    if report.missing_acquisitions.is_empty() {
        writeln!(out, "No missing acquisitions.")?;
    } else {
        writeln!(out, "Missing acquisitions:")?;
        for missing in &report.missing_acquisitions {
            writeln!(out, "  {}", missing)?;
        }
    }
    Ok(())
}

fn print_report_csv(out: &mut TextFile, report: &Report) -> anyhow::Result<()> {
    writeln!(out, "{}", csv::SPEND_HEADER)?;
    for spend in &report.spends {
        writeln!(out, "{}", CsvPrinter(spend))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", csv::REDUCE_HEADER)?;
    for reduce in &report.reductions {
        writeln!(out, "{}", CsvPrinter(reduce))?;
    }
    writeln!(out)?;
    print_missing_csv(out, report)
}

fn print_missing_csv(out: &mut TextFile, report: &Report) -> anyhow::Result<()> {
    writeln!(out, "{}", csv::MISSING_HEADER)?;
    for missing in &report.missing_acquisitions {
        writeln!(out, "{}", CsvPrinter(missing))?;
    }
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    match Args::parse().command {
        Command::Report {
            journal,
            method,
            csv,
            output,
            log_dir,
        } => {
            let log_dir = match log_dir {
                Some(dir) => dir,
                None => default_log_dir()?,
            };
            init_file_logger(&log_dir)?;

            let report = load_journal(&journal, method)?
                .replay()
                .context("replaying journal")?;
            let mut out = match output {
                Some(path) => file::create_text_file(path, "for cost basis report")?,
                None => TextFile::stdout(),
            };
            if csv {
                print_report_csv(&mut out, &report)?;
            } else {
                print_report(&mut out, &report)?;
            }
            out.flush()?;
        }
        Command::Missing {
            journal,
            method,
            csv,
        } => {
            Logger::init_stderr_only().context("initializing logger")?;
            let report = load_journal(&journal, method)?
                .replay()
                .context("replaying journal")?;
            let mut out = TextFile::stdout();
            if csv {
                print_missing_csv(&mut out, &report)?;
            } else {
                print_missing(&mut out, &report)?;
            }
            out.flush()?;
        }
    }

    log::logger().flush();
    Ok(())
}
