use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinema_client::{
    config::Config,
    controllers::SubmitOutcome,
    models::{seat::join_seats, PaymentProof, ProfileUpdate, Registration, SeatId, SeatMap},
    CinemaApp,
};

/// Cinema ticket booking from the command line.
#[derive(Parser, Debug)]
#[command(name = "cinema", version, about = "Browse movies, pick seats and book tickets")]
struct Cli {
    /// Account used for commands that need a session.
    #[arg(short, long, env = "CINEMA_USERNAME", global = true)]
    username: Option<String>,

    #[arg(short, long, env = "CINEMA_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all movies.
    Movies,
    /// Show one movie with its showtimes.
    Movie { id: i64 },
    /// Print the seat map of a showtime.
    Seats { showtime: i64 },
    /// Book seats and upload a payment proof.
    Book {
        #[arg(long)]
        showtime: i64,
        /// Comma separated, e.g. `C5,C6`.
        #[arg(long, value_delimiter = ',')]
        seats: Vec<SeatId>,
        /// Image or PDF proving the payment.
        #[arg(long)]
        proof: PathBuf,
    },
    /// List your bookings (all bookings for staff).
    Bookings,
    /// Approve a pending payment (staff only).
    Approve { payment: i64 },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Show or update your profile.
    Profile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    info!("Using cinema API at {}", config.api.base_url);
    let app = CinemaApp::new(config)?;

    match cli.command {
        Command::Movies => {
            for movie in app.catalog().movies().await? {
                println!("{:>4}  {} ({}, {} min)", movie.id, movie.title, movie.genre, movie.duration);
            }
        }
        Command::Movie { id } => {
            let detail = app.catalog().movie_detail(id).await?;
            println!("{}", detail.movie.title);
            println!(
                "{}",
                detail.movie.description.as_deref().unwrap_or("No description available.")
            );
            println!("Genre: {}  Duration: {} minutes", detail.movie.genre, detail.movie.duration);
            for showtime in &detail.showtimes {
                println!("{:>4}  {}", showtime.id, showtime.label());
            }
        }
        Command::Seats { showtime } => {
            let mut flow = app.booking_flow();
            flow.select_showtime(showtime).await;
            if let Some(notice) = flow.notice() {
                println!("{}", notice);
            }
            print!("{}", SeatMap::render(flow.booked_seats(), flow.selected_seats()));
            println!(". available  x booked");
        }
        Command::Book { showtime, seats, proof } => {
            sign_in(&app, &cli.username, &cli.password).await?;
            let mut flow = app.booking_flow();
            flow.select_showtime(showtime).await;
            if let Some(notice) = flow.notice() {
                println!("{}", notice);
            }
            flow.pick_seats(seats).map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let proof = PaymentProof::from_path(&proof)
                .await
                .with_context(|| format!("Could not read {}", proof.display()))?;
            flow.attach_proof(proof);

            let outcome = flow.submit().await;
            println!("{}", outcome.message());
            match outcome {
                SubmitOutcome::Submitted { booking_id, .. } => {
                    println!("Booking #{} for seats {}", booking_id, join_seats(flow.selected_seats()));
                    print_bookings(&app).await?;
                }
                SubmitOutcome::LoginRequired => bail!("Login required"),
                SubmitOutcome::Failed(_) | SubmitOutcome::Rejected(_) => std::process::exit(1),
            }
        }
        Command::Bookings => {
            sign_in(&app, &cli.username, &cli.password).await?;
            print_bookings(&app).await?;
        }
        Command::Approve { payment } => {
            sign_in(&app, &cli.username, &cli.password).await?;
            let mut bookings = app.bookings();
            bookings.approve(payment).await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("Payment {} approved", payment);
        }
        Command::Register { email, phone } => {
            let (Some(username), Some(password)) = (cli.username.clone(), cli.password.clone()) else {
                bail!("--username and --password are required to register");
            };
            let registered = app
                .account()
                .register(&Registration { username, email, phone, password })
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            if registered.signed_in {
                println!("Welcome, {}!", registered.profile.username);
            } else {
                println!("Auto-login failed. Please log in manually.");
            }
        }
        Command::Profile { email, phone } => {
            sign_in(&app, &cli.username, &cli.password).await?;
            let account = app.account();
            let mut profile = account.profile().await?;
            if email.is_some() || phone.is_some() {
                let update = ProfileUpdate {
                    email: email.unwrap_or(profile.email.clone()),
                    phone: phone.unwrap_or(profile.phone.clone().unwrap_or_default()),
                };
                profile = account
                    .update_profile(&update)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                println!("Profile updated successfully!");
            }
            println!("Username: {}", profile.username);
            println!("Email:    {}", profile.email);
            println!("Phone:    {}", profile.phone.unwrap_or_default());
            println!("Bookings: {}", profile.bookings.len());
        }
    }

    Ok(())
}

async fn sign_in(app: &CinemaApp, username: &Option<String>, password: &Option<String>) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (username, password) else {
        bail!("This command needs --username and --password (or CINEMA_USERNAME / CINEMA_PASSWORD)");
    };
    app.account()
        .login(username, password)
        .await
        .map_err(|_| anyhow::anyhow!("Invalid username or password"))?;
    Ok(())
}

async fn print_bookings(app: &CinemaApp) -> anyhow::Result<()> {
    let mut controller = app.bookings();
    let bookings = controller.refresh().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if bookings.is_empty() {
        println!("No bookings found.");
    }
    for booking in bookings {
        println!(
            "#{:<4} {} | {} | seats {} ({} tickets) | {}{}",
            booking.id,
            booking.showtime.movie.title,
            booking.showtime.label(),
            booking.seats,
            booking.num_tickets,
            booking.payment_status,
            booking
                .payment
                .as_ref()
                .map(|p| format!(" | payment {}", p.id))
                .unwrap_or_default()
        );
    }
    Ok(())
}
