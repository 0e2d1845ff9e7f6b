use anyhow::Result;
use clap::{Parser, Subcommand};
use server_api::password::hash_password;
use shared::{domain::RequestStatus, protocol::StudentFilter};
use storage::{seed, Storage, WorkflowStore};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/mentoring.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the demo department into an empty database.
    Seed,
    ListStudents {
        /// One of Pending, Accepted, Rejected.
        #[arg(long)]
        request_status: Option<RequestStatus>,
    },
    /// Print a `password_hash` value for an `[[accounts]]` entry.
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::HashPassword { password } = &cli.command {
        println!("{}", hash_password(password));
        return Ok(());
    }

    let storage = Storage::new(&cli.database_url).await?;
    match cli.command {
        Command::Seed => {
            if storage.apply_seed(&seed::demo()?).await? {
                println!("seeded demo data into {}", cli.database_url);
            } else {
                println!("database already has students; nothing seeded");
            }
        }
        Command::ListStudents { request_status } => {
            let filter = StudentFilter {
                request_status,
                ..StudentFilter::default()
            };
            for student in storage.list_students(&filter).await? {
                println!(
                    "{:>3}  {:<16} {:<6} {:<4} remark={:<5} request={:<8} hod={}",
                    student.id.0,
                    student.name,
                    student.branch,
                    student.year,
                    student.remark_status.as_str(),
                    student.request_status.as_str(),
                    student.hod_support_status.as_str(),
                );
            }
        }
        Command::HashPassword { .. } => {}
    }

    Ok(())
}
