use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Add a new task.
    Add {
        /// The task description text.
        #[structopt()]
        description: String,

        /// How much completing the task is worth.
        #[structopt(short, long)]
        value: String,

        /// Weight applied while the task is not yet due.
        #[structopt(short = "i", long = "importance")]
        due_date_importance: String,

        /// How fast importance fades once the task is overdue.
        #[structopt(long = "decay")]
        past_due_importance_decrease_rate: Option<String>,

        /// Deadline, as "YYYY-MM-DD HH:MM".
        #[structopt(long = "due")]
        due_date: Option<String>,

        /// Weekly effort, as "h,m" or "h,m,s".
        #[structopt(long = "per-week")]
        time_per_week: Option<String>,

        /// Whether the due date is fixed (true/false).
        #[structopt(long)]
        absolute_date: Option<String>,

        /// Free-form JSON object stored alongside the task.
        #[structopt(long)]
        extra: Option<String>,

        /// Score by weekly effort instead of by deadline.
        #[structopt(long)]
        hobby: bool,
    },
    /// List all tasks with their current importance.
    List {
        /// Order by importance instead of by id.
        #[structopt(short, long)]
        rank: bool,
    },
    /// Show the most important task.
    Next,
    /// Remove tasks by id.
    Rm {
        #[structopt(required = true)]
        ids: Vec<i64>,
    },
    /// Print the task field names.
    Fields,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "urgent",
    about = "Rank your tasks by how much they matter right now."
)]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Use a different task store file.
    #[structopt(parse(from_os_str), short, long, env = "URGENT_STORE")]
    pub store_file: Option<PathBuf>,
}
