mod player;

use clap::{Parser, Subcommand, ValueEnum};
use interval_core::editor::MoveDirection;
use interval_core::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "intervals")]
#[command(about = "Interval workout timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved plans
    List,

    /// Show a plan and its timeline
    Show { id: String },

    /// List built-in templates
    Templates,

    /// Create a plan from a built-in template
    New {
        template: String,

        /// Name for the new plan (defaults to the template's)
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a plan with a single exercise
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Warmup seconds (0 to omit)
        #[arg(long, default_value_t = 0)]
        warmup: u32,

        /// Cooldown seconds (0 to omit)
        #[arg(long, default_value_t = 0)]
        cooldown: u32,

        #[arg(long = "type", value_enum, default_value_t = TypeArg::Running)]
        exercise_type: TypeArg,

        /// Exercise seconds
        #[arg(long)]
        duration: u32,

        #[arg(long, value_enum)]
        intensity: Option<IntensityArg>,
    },

    /// Add an item to a plan
    Add {
        plan: String,

        /// Set to append into (top level if omitted)
        #[arg(long)]
        parent: Option<String>,

        #[command(subcommand)]
        item: ItemArgs,
    },

    /// Remove an item (and anything inside it)
    Remove { plan: String, item: String },

    /// Move an item among its siblings
    Move {
        plan: String,
        item: String,
        #[arg(value_enum)]
        direction: DirectionArg,
    },

    /// Rename a plan
    Rename { plan: String, name: String },

    /// Delete a plan
    Delete { id: String },

    /// Play a plan (p = pause, r = resume, s = skip, q = stop)
    Play {
        id: String,

        /// Do not ring the terminal bell
        #[arg(long)]
        silent: bool,
    },

    /// Show recent session summaries
    History {
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..))]
        days: i64,
    },
}

#[derive(Subcommand)]
enum ItemArgs {
    /// Timed exercise
    Exercise {
        #[arg(long = "type", value_enum)]
        exercise_type: TypeArg,

        #[arg(long)]
        duration: u32,

        #[arg(long, value_enum)]
        intensity: Option<IntensityArg>,

        #[arg(long)]
        name: Option<String>,
    },

    /// Rest interval
    Rest {
        #[arg(long)]
        duration: u32,

        #[arg(long)]
        name: Option<String>,
    },

    /// Empty repeated set; add items into it with --parent
    Set {
        #[arg(long, default_value_t = 1)]
        repetitions: u32,

        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Running,
    Walking,
}

impl From<TypeArg> for ExerciseType {
    fn from(value: TypeArg) -> Self {
        match value {
            TypeArg::Running => ExerciseType::Running,
            TypeArg::Walking => ExerciseType::Walking,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum IntensityArg {
    Low,
    Medium,
    High,
}

impl From<IntensityArg> for IntensityLevel {
    fn from(value: IntensityArg) -> Self {
        match value {
            IntensityArg::Low => IntensityLevel::Low,
            IntensityArg::Medium => IntensityLevel::Medium,
            IntensityArg::High => IntensityLevel::High,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for MoveDirection {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Up => MoveDirection::Up,
            DirectionArg::Down => MoveDirection::Down,
        }
    }
}

fn main() -> ExitCode {
    // Keep playback output readable; RUST_LOG still overrides
    interval_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let mut store = JsonFileStore::in_dir(&data_dir);
    let history_path = data_dir.join("sessions.jsonl");

    match cli.command {
        Commands::List => cmd_list(&store),
        Commands::Show { id } => cmd_show(&load_playable(&store, &id)?),
        Commands::Templates => cmd_templates(),
        Commands::New { template, name } => cmd_new(&mut store, &template, name),
        Commands::Create {
            name,
            description,
            warmup,
            cooldown,
            exercise_type,
            duration,
            intensity,
        } => {
            let mut exercise = Exercise::new(exercise_type.into(), duration);
            exercise.intensity = intensity.map(Into::into);
            let plan = store.create_plan(PlanDraft {
                name,
                description,
                warmup_time: warmup,
                cooldown_time: cooldown,
                items: vec![exercise.into()],
            })?;
            println!("✓ Created plan {}", plan.id);
            Ok(())
        }
        Commands::Add { plan, parent, item } => {
            let mut plan = load(&store, &plan)?;
            let item = build_item(item);
            let item_id = item.id().to_string();
            plan.add_item(parent.as_deref(), item)?;
            store.save_plan(&mut plan)?;
            println!("✓ Added item {}", item_id);
            Ok(())
        }
        Commands::Remove { plan, item } => {
            let mut plan = load(&store, &plan)?;
            if plan.remove_item(&item).is_none() {
                return Err(Error::NotFound(format!("item {}", item)));
            }
            store.save_plan(&mut plan)?;
            println!("✓ Removed item {}", item);
            Ok(())
        }
        Commands::Move {
            plan,
            item,
            direction,
        } => {
            let mut plan = load(&store, &plan)?;
            if plan.move_item(&item, direction.into())? {
                store.save_plan(&mut plan)?;
                println!("✓ Moved item {}", item);
            } else {
                println!("Item {} is already at the edge", item);
            }
            Ok(())
        }
        Commands::Rename { plan, name } => {
            let mut plan = load(&store, &plan)?;
            plan.rename(name);
            store.save_plan(&mut plan)?;
            println!("✓ Renamed plan {} to {}", plan.id, plan.name);
            Ok(())
        }
        Commands::Delete { id } => {
            if store.delete_plan(&id) {
                println!("✓ Deleted plan {}", id);
                Ok(())
            } else {
                Err(Error::NotFound(format!("plan {}", id)))
            }
        }
        Commands::Play { id, silent } => {
            let plan = load_playable(&store, &id)?;
            player::play(&plan, &config, silent, &history_path)
        }
        Commands::History { days } => cmd_history(&history_path, days),
    }
}

/// Load a plan or report it missing
fn load(store: &JsonFileStore, id: &str) -> Result<WorkoutPlan> {
    store
        .load_plan(id)
        .ok_or_else(|| Error::NotFound(format!("plan {}", id)))
}

/// Load a plan that is safe to expand into a timeline
///
/// Hand-edited files can hold plans that never passed validation.
fn load_playable(store: &JsonFileStore, id: &str) -> Result<WorkoutPlan> {
    let plan = load(store, id)?;
    plan.validate()?;
    Ok(plan)
}

fn build_item(args: ItemArgs) -> WorkoutItem {
    match args {
        ItemArgs::Exercise {
            exercise_type,
            duration,
            intensity,
            name,
        } => {
            let mut exercise = Exercise::new(exercise_type.into(), duration);
            exercise.intensity = intensity.map(Into::into);
            exercise.name = name;
            exercise.into()
        }
        ItemArgs::Rest { duration, name } => {
            let mut rest = Rest::new(duration);
            rest.name = name;
            rest.into()
        }
        ItemArgs::Set { repetitions, name } => {
            let mut set = Set::new(repetitions, Vec::new());
            set.name = name;
            set.into()
        }
    }
}

fn cmd_list(store: &JsonFileStore) -> Result<()> {
    let plans = store.list_plans();
    if plans.is_empty() {
        println!("No plans yet. Try `intervals templates`.");
        return Ok(());
    }

    for plan in &plans {
        let summary = PlanSummary::from(plan);
        println!(
            "{}  {:<28} {:>6}  {:>3} intervals",
            summary.id,
            summary.name,
            player::clock(u64::from(summary.total_time)),
            summary.interval_count
        );
    }
    Ok(())
}

fn cmd_show(plan: &WorkoutPlan) -> Result<()> {
    println!("\n{}", plan.name);
    if !plan.description.is_empty() {
        println!("  {}", plan.description);
    }
    println!(
        "  Total: {}  ({} intervals)",
        player::clock(u64::from(calculate_total_time(plan))),
        count_intervals(plan)
    );
    println!();

    println!("Items:");
    if plan.warmup_time > 0 {
        println!("  warmup {}s", plan.warmup_time);
    }
    print_items(&plan.items, 1);
    if plan.cooldown_time > 0 {
        println!("  cooldown {}s", plan.cooldown_time);
    }
    println!();

    println!("Timeline:");
    for (i, step) in build_timeline(plan).iter().enumerate() {
        println!(
            "  {:>3}. {}-{}  {:<12} severity {}",
            i + 1,
            player::clock(u64::from(step.start_offset)),
            player::clock(u64::from(step.end_offset)),
            step.display_name(),
            step.severity
        );
    }
    Ok(())
}

fn print_items(items: &[WorkoutItem], depth: usize) {
    let indent = "  ".repeat(depth);
    for item in items {
        match item {
            WorkoutItem::Exercise(e) => println!(
                "{}{:?} {}s {:?}{}  [{}]",
                indent,
                e.exercise_type,
                e.duration,
                e.intensity_level(),
                e.name.as_deref().map(|n| format!(" \"{}\"", n)).unwrap_or_default(),
                e.id
            ),
            WorkoutItem::Rest(r) => println!("{}Rest {}s  [{}]", indent, r.duration, r.id),
            WorkoutItem::Set(s) => {
                println!(
                    "{}{} x{}  [{}]",
                    indent,
                    s.name.as_deref().unwrap_or("Set"),
                    s.repetitions,
                    s.id
                );
                print_items(&s.items, depth + 1);
            }
        }
    }
}

fn cmd_templates() -> Result<()> {
    for template in interval_core::catalog::templates() {
        let plan = WorkoutPlan::from_draft(template.instantiate());
        println!(
            "{:<12} {:<24} {:>6}  {}",
            template.key,
            plan.name,
            player::clock(u64::from(calculate_total_time(&plan))),
            plan.description
        );
    }
    Ok(())
}

fn cmd_new(store: &mut JsonFileStore, key: &str, name: Option<String>) -> Result<()> {
    let template = interval_core::catalog::find_template(key)
        .ok_or_else(|| Error::NotFound(format!("template {}", key)))?;

    let mut draft = template.instantiate();
    if let Some(name) = name {
        draft.name = name;
    }
    let plan = store.create_plan(draft)?;
    println!("✓ Created plan {}", plan.id);
    Ok(())
}

fn cmd_history(path: &Path, days: i64) -> Result<()> {
    let summaries = interval_core::history::load_recent_summaries(path, days)?;
    if summaries.is_empty() {
        println!("No sessions in the last {} days.", days);
        return Ok(());
    }

    for s in &summaries {
        println!(
            "{}  {:<24} {:>6} / {:>6}  {}  ({} skipped)",
            s.started_at.format("%Y-%m-%d %H:%M"),
            s.plan_name,
            player::clock(s.total_elapsed_ms / 1000),
            player::clock(u64::from(s.planned_secs)),
            if s.completed { "completed" } else { "stopped" },
            s.count(StepStatus::Skipped)
        );
    }
    Ok(())
}
