use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rallyman::config::ProvisionConfig;
use rallyman::gateway::RestGateway;
use rallyman::models::{keys, AnnotationValue};
use rallyman::provision;

#[derive(Parser)]
#[command(name = "rallyman")]
#[command(about = "Provision rally and sprint workspaces on a collaboration platform")]
struct Cli {
    /// Path to the provisioning config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a rally workspace (team, project, wiki, view registration)
    CreateRally {
        /// Rally number
        number: u32,

        /// Project name, defaults to "Rally <number>"
        #[arg(long)]
        title: Option<String>,
    },
    /// Create a sprint workspace under an existing rally
    CreateSprint {
        /// Rally number
        number: u32,

        /// Sprint letter (e.g. A)
        letter: char,

        /// Project name, defaults to "Sprint <number><letter>"
        #[arg(long)]
        title: Option<String>,
    },
    /// Look up a rally by number
    GetRally { number: u32 },
    /// Look up a sprint by rally number and letter
    GetSprint { number: u32, letter: char },
    /// List all registered rallies
    ListRallies,
    /// List registered sprints
    ListSprints {
        /// Restrict to one rally
        #[arg(long)]
        rally: Option<u32>,
    },
    /// Find a rally by walking the workspace hierarchy instead of the view
    /// index (useful when the index lags or is suspect)
    Locate { number: u32 },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "rallyman=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ProvisionConfig::load(cli.config.as_deref())?;
    let gateway = RestGateway::from_env();

    match cli.command {
        Commands::CreateRally { number, title } => {
            let rally = provision::create_rally(&gateway, &config, number, title).await?;
            println!("rally {} -> {}", rally.number, rally.id());
        }
        Commands::CreateSprint {
            number,
            letter,
            title,
        } => {
            let sprint = provision::create_sprint(&gateway, &config, number, letter, title).await?;
            println!("sprint {} -> {}", sprint.label, sprint.id());
        }
        Commands::GetRally { number } => match provision::get_rally(&gateway, &config, number)
            .await?
        {
            Some(rally) => println!("rally {} -> {} ({})", rally.number, rally.id(), rally.project.name),
            None => println!("no rally {number}"),
        },
        Commands::GetSprint { number, letter } => {
            match provision::get_sprint(&gateway, &config, number, letter).await? {
                Some(sprint) => println!(
                    "sprint {} -> {} ({})",
                    sprint.label,
                    sprint.id(),
                    sprint.project.name
                ),
                None => println!("no sprint {number}{letter}"),
            }
        }
        Commands::ListRallies => {
            for rally in provision::get_rallies(&gateway, &config).await? {
                println!("rally {} -> {} ({})", rally.number, rally.id(), rally.project.name);
            }
        }
        Commands::ListSprints { rally } => {
            for sprint in provision::get_sprints(&gateway, &config, rally).await? {
                println!(
                    "sprint {} -> {} ({})",
                    sprint.label,
                    sprint.id(),
                    sprint.project.name
                );
            }
        }
        Commands::Locate { number } => {
            let hit = provision::find_in_hierarchy(&gateway, &config.root_project_id, |node| {
                node.annotations.get(keys::RALLY) == Some(&AnnotationValue::from(number))
            })
            .await?;
            match hit {
                Some(entity) => println!("rally {} -> {} ({})", number, entity.id, entity.name),
                None => println!("no rally {number} reachable from the hierarchy root"),
            }
        }
    }

    Ok(())
}
