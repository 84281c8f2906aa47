use api::Bot;
use db::Database;
use schumacher::{irc, Settings};
use tokio::{runtime::Runtime, sync::mpsc};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse environment variables
    let settings = Settings::from_env()?;

    // Initialize the session coordinator
    let runtime = Runtime::new()?;
    let (outbox, outgoing) = mpsc::unbounded_channel();
    let bot = Bot::new(Database::from(settings.data_dir.clone()), outbox, settings.sessions.clone());

    // Stay connected until we are interrupted
    runtime.block_on(async {
        tokio::spawn(bot.clone().run_reminders());
        tokio::select! {
            () = irc::run(&settings, bot, outgoing) => Ok(()),
            result = tokio::signal::ctrl_c() => {
                log::info!("shutting down");
                anyhow::Ok(result?)
            }
        }
    })
}
