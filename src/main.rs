use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use shiftmap_core::{OutputFormat, OvernightPolicy, ShiftmapConfig};
use shiftmap_coverage::aggregate::{aggregate, CoverageTable};
use shiftmap_coverage::gaps::{coverage_gaps, GapTable};
use shiftmap_coverage::roster::{load_team, TeamRoster};
use shiftmap_coverage::timeline::{build_timeline, Timeline};

const CONFIG_FILE: &str = ".shiftmap.toml";

#[derive(Parser)]
#[command(
    name = "shiftmap",
    version,
    about = "Team skill coverage across the day",
    long_about = "Shiftmap turns a YAML team roster into weighted skill coverage across the day.\n\n\
                   Each developer's working hours count toward their skills, weighted by\n\
                   expertise level, sampled at fixed time slots.\n\n\
                   Examples:\n  \
                     shiftmap coverage --team team_data.yaml   Weighted coverage per hour\n  \
                     shiftmap gaps --format markdown           Shortfall against full staffing\n  \
                     shiftmap timeline --format json           Working-hour bars per skill\n  \
                     shiftmap init                             Write a default .shiftmap.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .shiftmap.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct TeamArgs {
    /// Team roster YAML file
    #[arg(long, default_value = "team_data.yaml")]
    team: PathBuf,

    /// Fail if any roster record had to be skipped
    #[arg(long)]
    strict: bool,

    /// Override the overnight policy (wrap or reject)
    #[arg(long)]
    overnight: Option<OvernightPolicy>,

    /// Override the minutes between time slots
    #[arg(long)]
    step_minutes: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Weighted coverage per time slot and skill
    #[command(long_about = "Weighted coverage per time slot and skill.\n\n\
        Each cell sums the expertise weights of everyone working that skill at the\n\
        slot's instant. Working hours are half-open: 9:00 AM - 5:00 PM counts at\n\
        09:00 and 16:00 but not at 17:00.\n\n\
        Examples:\n  shiftmap coverage --team team_data.yaml\n  shiftmap coverage --step-minutes 30 --format json")]
    Coverage {
        #[command(flatten)]
        team: TeamArgs,
    },
    /// Shortfall of each slot against a skill's full capacity
    #[command(long_about = "Shortfall of each slot against a skill's full capacity.\n\n\
        Capacity is the number of people listed under a skill times the sum of all\n\
        expertise weights. Each cell is capacity minus the coverage at that slot.\n\n\
        Examples:\n  shiftmap gaps --team team_data.yaml --format markdown")]
    Gaps {
        #[command(flatten)]
        team: TeamArgs,
    },
    /// Working-hour bars grouped by skill
    #[command(long_about = "Working-hour bars grouped by skill.\n\n\
        Lists every person's window per skill, ordered by start time. Windows\n\
        ending after midnight are shown wrapping into the next day.\n\n\
        Examples:\n  shiftmap timeline --team team_data.yaml")]
    Timeline {
        #[command(flatten)]
        team: TeamArgs,
    },
    /// Create a default .shiftmap.toml configuration file
    #[command(long_about = "Create a default .shiftmap.toml configuration file.\n\n\
        Writes the standard expertise weights and slot settings.\n\
        Fails if .shiftmap.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Shiftmap Configuration

# Expertise label -> coverage weight. Replaces the whole table when present;
# every label used in the team roster must appear here.
[expertise]
"Junior Developer" = 1
"Mid-Level Developer" = 2
"Senior Developer" = 3
"Principal/Lead Developer" = 4

[slots]
# Minutes between coverage samples; must divide 1440.
step_minutes = 60

[coverage]
# Hours like 10:00 PM - 6:00 AM: "wrap" past midnight or "reject" the roster.
overnight = "wrap"
"#;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ShiftmapConfig> {
    let config = match path {
        Some(path) => ShiftmapConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                ShiftmapConfig::from_file(default_path)?
            } else {
                ShiftmapConfig::default()
            }
        }
    };
    Ok(config)
}

/// Apply CLI overrides on top of the file configuration.
fn resolve_config(mut config: ShiftmapConfig, args: &TeamArgs) -> Result<ShiftmapConfig> {
    if let Some(policy) = args.overnight {
        config.coverage.overnight = policy;
    }
    if let Some(step) = args.step_minutes {
        config.slots.step_minutes = step;
    }
    config.validate()?;
    Ok(config)
}

fn load_roster(args: &TeamArgs) -> Result<TeamRoster> {
    if !args.team.exists() {
        miette::bail!(miette::miette!(
            help = "Pass --team <path> to a roster YAML file mapping skill -> person -> start, end, expertise",
            "Team file not found: {}",
            args.team.display()
        ));
    }

    let roster = load_team(&args.team)?;
    tracing::info!(
        path = %args.team.display(),
        intervals = roster.intervals.len(),
        skipped = roster.skipped.len(),
        "loaded team roster"
    );

    if args.strict && !roster.is_complete() {
        let lines: Vec<String> = roster.skipped.iter().map(|r| format!("  {r}")).collect();
        miette::bail!(miette::miette!(
            help = "Fill in start, end and expertise for these records, or drop --strict",
            "{} roster record(s) skipped:\n{}",
            roster.skipped.len(),
            lines.join("\n")
        ));
    }

    Ok(roster)
}

fn coverage_for(roster: &TeamRoster, config: &ShiftmapConfig) -> Result<CoverageTable> {
    let slots = config.slots.time_slots()?;
    let table = aggregate(
        &roster.intervals,
        &slots,
        &config.expertise,
        config.coverage.overnight,
    )?;
    Ok(table)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Init => {
            let config_path = Path::new(CONFIG_FILE);
            if config_path.exists() {
                miette::bail!(miette::miette!(
                    help = "Edit the existing file or remove it first",
                    "{CONFIG_FILE} already exists"
                ));
            }
            std::fs::write(config_path, DEFAULT_CONFIG).into_diagnostic()?;
            eprintln!("Created {CONFIG_FILE}");
        }
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "shiftmap", &mut std::io::stdout());
        }
        Command::Coverage { ref team } => {
            let config = resolve_config(load_config(cli.config.as_deref())?, team)?;
            tracing::debug!(
                levels = config.expertise.len(),
                step_minutes = config.slots.step_minutes,
                overnight = %config.coverage.overnight,
                "resolved configuration"
            );
            let roster = load_roster(team)?;
            let table = coverage_for(&roster, &config)?;

            match cli.format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "coverage": table,
                        "skipped": roster.skipped,
                    });
                    println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    println!("# Skill Coverage\n");
                    print_markdown_table(&table);
                    print_skipped_markdown(&roster);
                }
                OutputFormat::Text => {
                    println!("Weighted Skill Coverage:");
                    print_text_table(&table, None);
                    print_skipped_text(&roster);
                }
            }
        }
        Command::Gaps { ref team } => {
            let config = resolve_config(load_config(cli.config.as_deref())?, team)?;
            let roster = load_roster(team)?;
            let table = coverage_for(&roster, &config)?;
            let gaps = coverage_gaps(&table, &roster.intervals, &config.expertise)?;

            match cli.format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "gaps": gaps,
                        "skipped": roster.skipped,
                    });
                    println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    println!("# Coverage Gaps\n");
                    print_capacity_markdown(&gaps);
                    print_markdown_table(&gaps.gaps);
                    print_skipped_markdown(&roster);
                }
                OutputFormat::Text => {
                    println!("Coverage Gaps (capacity - coverage):");
                    print_text_table(&gaps.gaps, Some(&gaps));
                    print_skipped_text(&roster);
                }
            }
        }
        Command::Timeline { ref team } => {
            let roster = load_roster(team)?;
            let timeline = build_timeline(&roster);

            match cli.format {
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "timeline": timeline,
                        "skipped": roster.skipped,
                    });
                    println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
                }
                OutputFormat::Markdown => {
                    println!("# Skill Timeline\n");
                    print_timeline_markdown(&timeline);
                    print_skipped_markdown(&roster);
                }
                OutputFormat::Text => {
                    println!("Skill Timeline:");
                    print_timeline_text(&timeline);
                    print_skipped_text(&roster);
                }
            }
        }
    }

    Ok(())
}

fn column_widths(table: &CoverageTable) -> Vec<usize> {
    table.skills().iter().map(|s| s.len().max(5)).collect()
}

fn print_text_table(table: &CoverageTable, gaps: Option<&GapTable>) {
    if table.is_empty() {
        println!("  No work intervals found.");
        return;
    }
    let widths = column_widths(table);
    let header: Vec<String> = table
        .skills()
        .iter()
        .zip(&widths)
        .map(|(skill, &w)| format!("{skill:>w$}"))
        .collect();
    println!("{:-<1$}", "", 8 + widths.iter().map(|w| w + 2).sum::<usize>());
    println!("  {:<6}{}", "Slot", header.iter().map(|h| format!("  {h}")).collect::<String>());

    if let Some(gaps) = gaps {
        let capacity: String = table
            .skills()
            .iter()
            .zip(&widths)
            .map(|(skill, &w)| format!("  {:>w$}", gaps.capacity(skill).unwrap_or(0)))
            .collect();
        println!("  {:<6}{capacity}", "Max");
    }

    for (slot, row) in table.rows() {
        let cells: String = row
            .iter()
            .zip(&widths)
            .map(|(value, &w)| format!("  {value:>w$}"))
            .collect();
        println!("  {:<6}{cells}", slot.to_string());
    }
    println!();
}

fn print_markdown_table(table: &CoverageTable) {
    if table.is_empty() {
        println!("No work intervals found.\n");
        return;
    }
    println!("| Slot | {} |", table.skills().join(" | "));
    println!(
        "|------|{}",
        table
            .skills()
            .iter()
            .map(|s| format!("{:-<1$}|", "", s.len() + 2))
            .collect::<String>()
    );
    for (slot, row) in table.rows() {
        let cells: Vec<String> = row.iter().map(u32::to_string).collect();
        println!("| {slot} | {} |", cells.join(" | "));
    }
    println!();
}

fn print_capacity_markdown(gaps: &GapTable) {
    for (skill, capacity) in &gaps.capacity {
        println!("- **{skill}** capacity: {capacity}");
    }
    println!();
}

fn clock(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as u32 % (24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn print_timeline_text(timeline: &Timeline) {
    if timeline.lanes.is_empty() {
        println!("  No work intervals found.");
        return;
    }
    for lane in &timeline.lanes {
        println!("{:-<72}", "");
        println!("  {}", lane.skill);
        for bar in &lane.bars {
            let overnight = if bar.end_hours() > 24.0 { " (+1d)" } else { "" };
            println!(
                "    {}-{}{overnight:<6}  {:>5.1}h  {} ({})",
                clock(bar.start_hours),
                clock(bar.end_hours()),
                bar.duration_hours,
                bar.person,
                bar.expertise,
            );
        }
    }
    println!();
}

fn print_timeline_markdown(timeline: &Timeline) {
    if timeline.lanes.is_empty() {
        println!("No work intervals found.\n");
        return;
    }
    for lane in &timeline.lanes {
        println!("## {}\n", lane.skill);
        println!("| Person | Expertise | Start | End | Hours |");
        println!("|--------|-----------|-------|-----|-------|");
        for bar in &lane.bars {
            println!(
                "| {} | {} | {} | {} | {:.1} |",
                bar.person,
                bar.expertise,
                clock(bar.start_hours),
                clock(bar.end_hours()),
                bar.duration_hours,
            );
        }
        println!();
    }
}

fn print_skipped_text(roster: &TeamRoster) {
    if roster.is_complete() {
        return;
    }
    println!("Skipped records:");
    for record in &roster.skipped {
        println!("  {record}");
    }
}

fn print_skipped_markdown(roster: &TeamRoster) {
    if roster.is_complete() {
        return;
    }
    println!("## Skipped Records\n");
    for record in &roster.skipped {
        println!("- {record}");
    }
    println!();
}
