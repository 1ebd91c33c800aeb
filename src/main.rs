use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use sf_event_tools::reports::{self, ConnectionArgs, ReportArgs, SubArgs};

#[derive(Parser)]
#[command(name = "sf-events")]
#[command(about = "Salesforce Event Monitoring reporting tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// API usage by user: request counts and average timings
    ApiUsage {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        report: ReportArgs,

        /// Only rows for this user ID
        #[arg(long)]
        user: Option<String>,
    },

    /// API endpoints called per user, endpoints nested under each user
    ApiEndpoints {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        sub: SubArgs,

        /// Only rows for this user ID
        #[arg(long)]
        user: Option<String>,
    },

    /// Login failures by username, status codes nested under each user
    LoginFailures {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        sub: SubArgs,

        /// Only rows for this username
        #[arg(long)]
        user: Option<String>,
    },

    /// Apex execution hotspots by entry point
    ApexExecution {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Visualforce page performance
    Visualforce {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// List available event log files
    LogFiles {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Only this event type (e.g. API, Login)
        #[arg(long)]
        event_type: Option<String>,

        /// Only log files for this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Newest log file per event type
        #[arg(long)]
        latest: bool,

        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ApiUsage {
            connection,
            report,
            user,
        } => reports::api_usage::run(&connection, &report, user.as_deref()).await,
        Commands::ApiEndpoints {
            connection,
            report,
            sub,
            user,
        } => reports::api_endpoints::run(&connection, &report, &sub, user.as_deref()).await,
        Commands::LoginFailures {
            connection,
            report,
            sub,
            user,
        } => reports::login_failures::run(&connection, &report, &sub, user.as_deref()).await,
        Commands::ApexExecution { connection, report } => {
            reports::apex_execution::run(&connection, &report).await
        }
        Commands::Visualforce { connection, report } => {
            reports::visualforce::run(&connection, &report).await
        }
        Commands::LogFiles {
            connection,
            event_type,
            date,
            latest,
            format,
        } => {
            reports::log_files::run(
                &connection,
                event_type.as_deref(),
                date.as_deref(),
                latest,
                &format,
            )
            .await
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sf-events", &mut std::io::stdout());
            Ok(())
        }
    }
}
