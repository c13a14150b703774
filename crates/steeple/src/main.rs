// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Steeple: a shared CRM for selling livestream gear to churches.

mod doctor;
mod render;
mod session;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use steeple_app::views;
use steeple_app::{
    ActivityForm, AppState, CalendarForm, Controller, KpiTargetForm, NewLeadForm, NoticeLevel,
    View,
};
use steeple_config::SteepleConfig;
use steeple_core::dates::{money_to_number, parse_iso_date_input, parse_us_date};
use steeple_core::{ActivityType, Stage, SteepleError};
use steeple_pipeline::{LeadEdit, LeadFilter};
use tracing::debug;

use crate::session::Session;

/// Church sales CRM.
#[derive(Parser, Debug)]
#[command(name = "steeple", version, about = "Steeple - church sales CRM")]
struct Cli {
    /// Config file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the pipeline board.
    Pipeline,
    /// Show overdue, due-today, and upcoming follow-ups.
    Followups,
    /// Set the saved owner, stage, or search filter.
    Filter {
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Reset every filter to ALL.
        #[arg(long)]
        clear: bool,
    },
    /// Create, view, edit, or delete leads.
    Lead {
        #[command(subcommand)]
        action: LeadCommands,
    },
    /// Log outreach against a lead.
    Activity {
        #[command(subcommand)]
        action: ActivityCommands,
    },
    /// Import leads from a CSV file.
    Import { file: PathBuf },
    /// Export all leads as CSV.
    Export {
        /// Output file, or `-` for stdout. Defaults to the export directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Shared availability calendar for Closed Won clients.
    Calendar {
        #[command(subcommand)]
        action: Option<CalendarCommands>,
    },
    /// Weekly KPI counts and targets.
    Kpi {
        #[command(subcommand)]
        action: Option<KpiCommands>,
    },
    /// Local preferences on this device.
    Settings {
        #[command(subcommand)]
        action: Option<SettingsCommands>,
    },
    /// Run diagnostic checks.
    Doctor,
}

#[derive(Subcommand, Debug)]
enum LeadCommands {
    /// Add a lead.
    Add(Box<LeadArgs>),
    /// Show one lead and its recent activity.
    Show { id: String },
    /// Edit a lead's sales fields.
    Update(Box<UpdateArgs>),
    /// Move a lead to another stage.
    Stage { id: String, stage: Stage },
    /// Delete a lead and its activity.
    Delete { id: String },
}

#[derive(clap::Args, Debug)]
struct LeadArgs {
    church_name: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long, default_value = "")]
    website: String,
    /// yes, no, or unknown.
    #[arg(long, default_value = "")]
    livestream: String,
    #[arg(long, default_value = "")]
    livestream_url: String,
    #[arg(long, default_value = "")]
    contact: String,
    #[arg(long, default_value = "")]
    role: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    owner: String,
    #[arg(long, default_value = "")]
    stage: String,
    #[arg(long, default_value = "")]
    tier: String,
    #[arg(long, default_value = "")]
    budget: String,
    /// MM/DD/YYYY.
    #[arg(long, default_value = "")]
    follow_up: String,
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(clap::Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    owner: Option<String>,
    #[arg(long)]
    stage: Option<Stage>,
    #[arg(long)]
    tier: Option<String>,
    #[arg(long)]
    budget: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// MM/DD/YYYY.
    #[arg(long, conflicts_with = "clear_follow_up")]
    follow_up: Option<String>,
    #[arg(long)]
    clear_follow_up: bool,
    #[arg(long)]
    deposit_paid: Option<bool>,
    /// Dollar amount, e.g. `$1,500`.
    #[arg(long)]
    deposit_amount: Option<String>,
    /// YYYY-MM-DD.
    #[arg(long)]
    deposit_date: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ActivityCommands {
    /// Log an activity, e.g. `steeple activity log <lead> "Call Connected"`.
    Log {
        lead: String,
        kind: ActivityType,
        /// YYYY-MM-DD; defaults to now.
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[derive(Subcommand, Debug)]
enum CalendarCommands {
    /// Show a month (the saved one by default).
    Show {
        /// YYYY-MM.
        #[arg(long, conflicts_with_all = ["prev", "next", "current"])]
        month: Option<String>,
        #[arg(long)]
        prev: bool,
        #[arg(long)]
        next: bool,
        #[arg(long)]
        current: bool,
    },
    /// Add availability for a Closed Won client.
    Add {
        lead: String,
        /// YYYY-MM-DD.
        date: String,
        /// Available, Booked, or Unavailable.
        #[arg(long, default_value = "")]
        availability: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Delete a calendar entry.
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum KpiCommands {
    /// Show a week (the saved one by default).
    Show {
        /// Any YYYY-MM-DD date in the week.
        #[arg(long, conflicts_with_all = ["prev", "next", "current"])]
        week: Option<String>,
        #[arg(long)]
        prev: bool,
        #[arg(long)]
        next: bool,
        #[arg(long)]
        current: bool,
    },
    /// Set weekly targets for an owner.
    SetTarget {
        owner: String,
        #[arg(long)]
        calls: String,
        #[arg(long)]
        emails: String,
        #[arg(long)]
        messages: String,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    Show,
    /// Set who you are on this device.
    Owner { name: String },
    /// Clear every local preference.
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => steeple_config::load_and_validate_path(path),
        None => steeple_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            steeple_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.app.log_level);

    let use_color = !cli.plain && std::io::stdout().is_terminal();
    match run(cli, &config, use_color).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command failed and already reported why.
async fn run(cli: Cli, config: &SteepleConfig, use_color: bool) -> Result<bool, SteepleError> {
    if let Some(Commands::Doctor) = cli.command {
        let failures = doctor::run_doctor(config, cli.plain).await?;
        return Ok(failures == 0);
    }

    let mut session = Session::open(config, cli.yes).await?;
    let outcome = dispatch(&mut session.controller, cli.command, config, use_color).await;
    let reported = session
        .controller
        .state()
        .notices
        .iter()
        .any(|n| n.level == NoticeLevel::Error);
    session.finish(use_color).await?;
    match outcome {
        Ok(()) => Ok(true),
        Err(e) if reported => {
            debug!(error = %e, "command failed");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

async fn dispatch(
    c: &mut Controller,
    command: Option<Commands>,
    config: &SteepleConfig,
    color: bool,
) -> Result<(), SteepleError> {
    let now = c.now();
    match command {
        None => print!("{}", render::current_view(c.state(), now, color)),
        Some(Commands::Pipeline) => {
            c.set_view(View::Pipeline);
            print!("{}", render::pipeline(&views::pipeline(c.state()), now, color));
        }
        Some(Commands::Followups) => {
            c.set_view(View::Followups);
            print!(
                "{}",
                render::followups(&views::followups(c.state(), now), now, color)
            );
        }
        Some(Commands::Filter {
            owner,
            stage,
            search,
            clear,
        }) => {
            if clear {
                let all = LeadFilter::default();
                c.set_owner_filter(&all.owner);
                c.set_stage_filter(&all.stage);
                c.set_search(&all.search);
            }
            if let Some(owner) = owner {
                if !c.set_owner_filter(&owner) {
                    return Err(SteepleError::Validation(format!(
                        "unknown owner filter `{owner}`"
                    )));
                }
            }
            if let Some(stage) = stage {
                if !c.set_stage_filter(&stage) {
                    return Err(SteepleError::Validation(format!(
                        "unknown stage filter `{stage}`"
                    )));
                }
            }
            if let Some(search) = search {
                c.set_search(&search);
            }
            print!("{}", render::settings(c.state()));
        }
        Some(Commands::Lead { action }) => lead_command(c, action, color).await?,
        Some(Commands::Activity {
            action:
                ActivityCommands::Log {
                    lead,
                    kind,
                    date,
                    notes,
                },
        }) => {
            let id = resolve_lead_id(c.state(), &lead)?;
            c.log_activity(
                &id,
                ActivityForm {
                    activity_type: kind,
                    date,
                    notes,
                },
            )
            .await?;
            c.show_lead(&id).await?;
            if let Some(view) = views::detail(c.state()) {
                print!("{}", render::lead_detail(&view, color));
            }
        }
        Some(Commands::Import { file }) => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| {
                    SteepleError::Validation(format!("cannot read {}: {e}", file.display()))
                })?;
            c.set_view(View::ImportExport);
            c.import_csv(&text).await?;
        }
        Some(Commands::Export { output }) => {
            c.set_view(View::ImportExport);
            let export = c.export_csv()?;
            let path = match output {
                Some(path) if path.as_os_str() == "-" => {
                    println!("{}", export.contents);
                    return Ok(());
                }
                Some(path) => path,
                None => PathBuf::from(&config.export.directory).join(&export.filename),
            };
            tokio::fs::write(&path, export.contents.as_bytes())
                .await
                .map_err(SteepleError::storage)?;
            println!("Exported {} leads to {}", c.state().leads.len(), path.display());
        }
        Some(Commands::Calendar { action }) => calendar_command(c, action, color).await?,
        Some(Commands::Kpi { action }) => {
            match action {
                None => {}
                Some(KpiCommands::Show {
                    week,
                    prev,
                    next,
                    current,
                }) => {
                    if let Some(week) = week {
                        c.set_kpi_week_from_input(&week)?;
                    } else if prev {
                        c.shift_kpi_week(-1);
                    } else if next {
                        c.shift_kpi_week(1);
                    } else if current {
                        c.current_kpi_week();
                    }
                }
                Some(KpiCommands::SetTarget {
                    owner,
                    calls,
                    emails,
                    messages,
                }) => {
                    c.save_kpi_target(KpiTargetForm {
                        owner,
                        calls,
                        emails,
                        messages,
                    })
                    .await?;
                }
            }
            c.set_view(View::Kpis);
            print!("{}", render::kpis(&views::kpis(c.state()), color));
        }
        Some(Commands::Settings { action }) => {
            match action {
                None | Some(SettingsCommands::Show) => {}
                Some(SettingsCommands::Owner { name }) => c.set_user_owner(&name)?,
                Some(SettingsCommands::Reset) => c.reset_preferences(),
            }
            print!("{}", render::settings(c.state()));
        }
        // Runs before a session is opened.
        Some(Commands::Doctor) => {}
    }
    Ok(())
}

async fn lead_command(
    c: &mut Controller,
    action: LeadCommands,
    color: bool,
) -> Result<(), SteepleError> {
    match action {
        LeadCommands::Add(args) => {
            let args = *args;
            let id = c
                .create_lead(NewLeadForm {
                    church_name: args.church_name,
                    website: args.website,
                    livestream_status: args.livestream,
                    livestream_url: args.livestream_url,
                    city: args.city,
                    state: args.state,
                    contact_name: args.contact,
                    contact_role: args.role,
                    phone: args.phone,
                    email: args.email,
                    owner: args.owner,
                    stage: args.stage,
                    tier_interest: args.tier,
                    estimated_gear_budget: args.budget,
                    next_follow_up: args.follow_up,
                    notes: args.notes,
                })
                .await?;
            println!("{id}");
        }
        LeadCommands::Show { id } => {
            let id = resolve_lead_id(c.state(), &id)?;
            c.open_lead(&id).await?;
            if let Some(view) = views::detail(c.state()) {
                print!("{}", render::lead_detail(&view, color));
            }
        }
        LeadCommands::Update(args) => {
            let args = *args;
            let id = resolve_lead_id(c.state(), &args.id)?;
            let Some(lead) = c.state().lead(&id) else {
                return Err(SteepleError::lead_not_found(&id));
            };
            let mut edit = LeadEdit::from_lead(lead);
            if let Some(owner) = args.owner {
                edit.owner = owner;
            }
            if let Some(stage) = args.stage {
                edit.stage = stage;
            }
            if let Some(tier) = args.tier {
                edit.tier_interest = tier;
            }
            if let Some(budget) = args.budget {
                edit.estimated_gear_budget = budget;
            }
            if let Some(notes) = args.notes {
                edit.notes = notes;
            }
            if args.clear_follow_up {
                edit.next_follow_up_at = None;
            }
            if let Some(raw) = args.follow_up {
                edit.next_follow_up_at = Some(parse_us_date(&raw).ok_or_else(|| {
                    SteepleError::Validation(format!("follow-up must be MM/DD/YYYY (got `{raw}`)"))
                })?);
            }
            if let Some(paid) = args.deposit_paid {
                edit.deposit_paid = paid;
            }
            if let Some(raw) = args.deposit_amount {
                edit.deposit_amount = money_to_number(&raw);
            }
            if let Some(raw) = args.deposit_date {
                edit.deposit_paid_at = Some(parse_iso_date_input(&raw).ok_or_else(|| {
                    SteepleError::Validation(format!(
                        "deposit date must be YYYY-MM-DD (got `{raw}`)"
                    ))
                })?);
            }
            c.save_lead(&id, edit).await?;
            c.open_lead(&id).await?;
            if let Some(view) = views::detail(c.state()) {
                print!("{}", render::lead_detail(&view, color));
            }
        }
        LeadCommands::Stage { id, stage } => {
            let id = resolve_lead_id(c.state(), &id)?;
            c.set_stage(&id, stage).await?;
        }
        LeadCommands::Delete { id } => {
            let id = resolve_lead_id(c.state(), &id)?;
            if !c.delete_lead(&id).await? {
                println!("Kept.");
            }
        }
    }
    Ok(())
}

async fn calendar_command(
    c: &mut Controller,
    action: Option<CalendarCommands>,
    color: bool,
) -> Result<(), SteepleError> {
    match action {
        None => {}
        Some(CalendarCommands::Show {
            month,
            prev,
            next,
            current,
        }) => {
            if let Some(month) = month {
                if !c.set_calendar_month(&month) {
                    return Err(SteepleError::Validation(format!(
                        "month must be YYYY-MM (got `{month}`)"
                    )));
                }
            } else if prev {
                c.shift_calendar_month(-1);
            } else if next {
                c.shift_calendar_month(1);
            } else if current {
                c.current_calendar_month();
            }
        }
        Some(CalendarCommands::Add {
            lead,
            date,
            availability,
            notes,
        }) => {
            let lead_id = resolve_lead_id(c.state(), &lead)?;
            c.create_calendar_entry(CalendarForm {
                lead_id,
                date,
                availability_type: availability,
                notes,
            })
            .await?;
        }
        Some(CalendarCommands::Delete { id }) => {
            let id = resolve_prefix(
                c.state().calendar_entries.iter().map(|e| e.id.as_str()),
                &id,
                "calendar entry",
            )?;
            if !c.delete_calendar_entry(&id).await? {
                println!("Kept.");
            }
        }
    }
    c.set_view(View::Calendar);
    let now = c.now();
    print!("{}", render::calendar(&views::calendar(c.state(), now), color));
    Ok(())
}

fn resolve_lead_id(state: &AppState, input: &str) -> Result<String, SteepleError> {
    resolve_prefix(state.leads.iter().map(|l| l.id.as_str()), input, "lead")
}

/// Match `input` against ids exactly, or as a unique prefix.
fn resolve_prefix<'a>(
    ids: impl Iterator<Item = &'a str> + Clone,
    input: &str,
    kind: &'static str,
) -> Result<String, SteepleError> {
    let input = input.trim();
    if let Some(id) = ids.clone().find(|id| *id == input) {
        return Ok(id.to_string());
    }
    let candidates: Vec<&str> = ids
        .filter(|id| !input.is_empty() && id.starts_with(input))
        .collect();
    match candidates.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(SteepleError::NotFound {
            kind,
            id: input.to_string(),
        }),
        _ => Err(SteepleError::Validation(format!(
            "`{input}` matches {} {kind} ids; use more characters",
            candidates.len()
        ))),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("steeple={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::try_parse_from(["steeple"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.plain);
    }

    #[test]
    fn lead_stage_parses_display_names() {
        let cli = Cli::try_parse_from(["steeple", "lead", "stage", "abc", "Closed Won"]).unwrap();
        match cli.command {
            Some(Commands::Lead {
                action: LeadCommands::Stage { id, stage },
            }) => {
                assert_eq!(id, "abc");
                assert_eq!(stage, Stage::ClosedWon);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(Cli::try_parse_from(["steeple", "lead", "stage", "abc", "Won"]).is_err());
    }

    #[test]
    fn activity_kind_is_case_insensitive() {
        let cli =
            Cli::try_parse_from(["steeple", "activity", "log", "abc", "deposit paid", "--yes"])
                .unwrap();
        assert!(cli.yes);
        match cli.command {
            Some(Commands::Activity {
                action: ActivityCommands::Log { kind, date, .. },
            }) => {
                assert_eq!(kind, ActivityType::DepositPaid);
                assert!(date.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn lead_add_requires_city_and_state() {
        assert!(Cli::try_parse_from(["steeple", "lead", "add", "Grace"]).is_err());
        assert!(
            Cli::try_parse_from([
                "steeple", "lead", "add", "Grace", "--city", "Austin", "--state", "TX"
            ])
            .is_ok()
        );
    }

    #[test]
    fn calendar_month_conflicts_with_navigation() {
        assert!(
            Cli::try_parse_from(["steeple", "calendar", "show", "--month", "2026-01", "--next"])
                .is_err()
        );
    }

    #[test]
    fn prefix_resolution() {
        let ids = ["lead-10", "lead-11", "lead-2"];
        assert_eq!(resolve_prefix(ids.iter().copied(), "lead-2", "lead").unwrap(), "lead-2");
        assert_eq!(resolve_prefix(ids.iter().copied(), "lead-10", "lead").unwrap(), "lead-10");
        assert!(matches!(
            resolve_prefix(ids.iter().copied(), "lead-1", "lead"),
            Err(SteepleError::Validation(_))
        ));
        assert!(matches!(
            resolve_prefix(ids.iter().copied(), "x", "lead"),
            Err(SteepleError::NotFound { .. })
        ));
    }
}
