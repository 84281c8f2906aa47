pub mod error;

use crate::{
    command::Command,
    config::Config,
    outbox::{Announcer, Outbox},
    router::{self, Route},
    schedule::{self, Reminder, DEFAULT_ZONE, LEAD_MINUTES},
    session::{Ballot, Kind, Quiz},
    supervisor::Supervisor,
};
use alloc::{boxed::Box, string::ToString, sync::Arc, vec::Vec};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use db::Database;
use model::{Poll, Quote, Search};
use rand::seq::SliceRandom;
use tokio::time;

const HELP: [&str; 7] = [
    "!ask <question> - Ask the bot anything.",
    "!help [command] - Show this help message.",
    "!next [category] - Show the next motorsport event.",
    "!notify [on|off] - Get mentioned when events start on this channel.",
    "!poll <question;option 1;option n> - Start a poll.",
    "!quiz [number] - Start a motorsport quiz of up to 10 questions.",
    "!quote [get|add] [text] - Get a random quote or add one.",
];

struct Inner {
    db: Database,
    supervisor: Arc<Supervisor>,
    outbox: Outbox,
    config: Config,
}

/// Dispatches every chat line the transport sees.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<Inner>,
}

impl Bot {
    pub fn new(db: Database, outbox: Outbox, config: Config) -> Self {
        let supervisor = Arc::default();
        Self { inner: Arc::new(Inner { db, supervisor, outbox, config }) }
    }

    /// Kind and channel of the running session.
    pub fn session(&self) -> Option<(Kind, Box<str>)> {
        self.inner.supervisor.status()
    }

    fn chat(&self, channel: &str) -> Announcer {
        Announcer::new(channel, self.inner.outbox.clone())
    }

    /// Handles a line said by `user` in `channel`. Commands are executed; anything else is
    /// offered to the running session.
    pub async fn on_message(&self, channel: &str, user: &str, text: &str) {
        let Some(command) = Command::parse(text) else {
            if router::route(&self.inner.supervisor, channel, user, text) == Route::Delivered {
                log::trace!("routed answer from {user} in {channel}");
            }
            return;
        };

        let err = match self.on_command(channel, user, &command).await {
            Ok(()) => return,
            Err(err) => err,
        };

        if err.is_silent() {
            log::debug!("ignoring !{} from {user} in {channel}: {err}", command.name);
        } else {
            self.chat(channel).say(err.to_string());
        }
    }

    async fn on_command(&self, channel: &str, user: &str, command: &Command<'_>) -> error::Result<()> {
        let args = command.args.as_slice();
        match command.name.to_lowercase().as_str() {
            "a" | "ask" => self.on_ask_command(channel, args).await,
            "c" | "h" | "commands" | "help" => {
                self.on_help_command(channel, args);
                Ok(())
            }
            "n" | "next" => self.on_next_command(channel, user, args).await,
            "ny" | "notify" => self.on_notify_command(channel, user, args).await,
            "p" | "poll" => self.on_poll_command(channel, user, args),
            "qz" | "quiz" => self.on_quiz_command(channel, user, args).await,
            "q" | "quote" => self.on_quote_command(channel, args).await,
            _ => Err(error::Error::UnknownCommandName),
        }
    }

    async fn on_quiz_command(&self, channel: &str, user: &str, args: &[&str]) -> error::Result<()> {
        // Checked up front so that a busy request never touches the question pool.
        if self.inner.supervisor.is_active() {
            return Err(error::Error::Busy);
        }

        let rounds = self.inner.config.rounds(args.first().copied());
        let mut questions = self.inner.db.get_questions(channel).await.map_err(|err| {
            log::warn!("cannot read the question pool: {err}");
            error::Error::Questions
        })?;
        questions.shuffle(&mut rand::thread_rng());

        let quiz = Quiz::new(questions, rounds).ok_or(error::Error::NoQuestions)?;
        let lease = self.inner.supervisor.try_start(Kind::Quiz, channel).ok_or(error::Error::Busy)?;
        log::info!("{user} started a {}-round quiz in {channel}", quiz.rounds());
        tokio::spawn(quiz.run(lease, self.chat(channel), self.inner.config.quiz_timeout));
        Ok(())
    }

    fn on_poll_command(&self, channel: &str, user: &str, args: &[&str]) -> error::Result<()> {
        if self.inner.supervisor.is_active() {
            return Err(error::Error::Busy);
        }

        let poll = Poll::parse(&args.join(" ")).ok_or(error::Error::PollUsage)?;
        let lease = self.inner.supervisor.try_start(Kind::Poll, channel).ok_or(error::Error::Busy)?;
        log::info!("{user} started a poll with {} option(s) in {channel}", poll.options.len());
        tokio::spawn(Ballot::new(poll).run(lease, self.chat(channel), self.inner.config.poll_timeout));
        Ok(())
    }

    fn on_help_command(&self, channel: &str, args: &[&str]) {
        let chat = self.chat(channel);
        let search = args.concat().to_lowercase();
        if search.is_empty() {
            for line in HELP {
                chat.say(line);
            }
            return;
        }

        let search = search.trim_start_matches(crate::command::PREFIX);
        if let Some(line) = HELP.iter().find(|line| line[1..].starts_with(search)) {
            chat.say(*line);
        }
    }

    async fn on_quote_command(&self, channel: &str, args: &[&str]) -> error::Result<()> {
        let action = args.first().map(|action| action.to_lowercase());
        let text = args.get(1..).unwrap_or_default();
        match action.as_deref() {
            None | Some("get") => {
                let quotes = self.inner.db.get_quotes().await.map_err(|err| {
                    log::warn!("cannot read quotes: {err}");
                    error::Error::Quotes
                })?;
                let Quote { date, text } = quotes.choose(&mut rand::thread_rng()).ok_or(error::Error::NoQuotes)?;
                self.chat(channel).say(alloc::format!("{text} - {date}"));
                Ok(())
            }
            Some("add") if !text.is_empty() => {
                let date = chrono::Local::now().format("%d-%m-%Y").to_string();
                let quote = Quote { date, text: text.join(" ") };
                self.inner.db.add_quote(&quote).await.map_err(|err| {
                    log::warn!("cannot store quote: {err}");
                    error::Error::AddQuote
                })?;
                self.chat(channel).say("Quote added.");
                Ok(())
            }
            _ => Err(error::Error::QuoteUsage),
        }
    }

    async fn on_ask_command(&self, channel: &str, args: &[&str]) -> error::Result<()> {
        if args.is_empty() {
            return Err(error::Error::AskUsage);
        }

        let answers = self.inner.db.get_answers().await.map_err(|err| {
            log::warn!("cannot read answers: {err}");
            error::Error::Answers
        })?;
        let answer = answers.choose(&mut rand::thread_rng()).ok_or(error::Error::NoAnswers)?;
        self.chat(channel).say(&**answer);
        Ok(())
    }

    async fn on_next_command(&self, channel: &str, user: &str, args: &[&str]) -> error::Result<()> {
        let search = Search::parse(&args.join(" "));
        let events = self.inner.db.get_events().await.map_err(|err| {
            log::warn!("cannot read events: {err}");
            error::Error::NoEvent
        })?;
        let now = Utc::now();
        let event = search.first(&events, now).ok_or(error::Error::NoEvent)?;

        let chat = self.chat(channel);
        let zone = match self.time_zone_of(user).await? {
            Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
                log::debug!("unknown time zone {name} of {user}");
                chat.say("Error converting time to user time zone. Using default one.");
                DEFAULT_ZONE
            }),
            None => DEFAULT_ZONE,
        };
        chat.say(schedule::describe(event, zone, now));
        Ok(())
    }

    /// Time zone configured by `nick`. Unregistered users have none.
    async fn time_zone_of(&self, nick: &str) -> error::Result<Option<Box<str>>> {
        let users = match self.inner.db.get_users().await {
            Ok(users) => users,
            Err(db::error::Error::NotFound) => return Ok(None),
            Err(err) => {
                log::warn!("cannot read users: {err}");
                return Err(error::Error::Users);
            }
        };
        let zone = users.into_iter().find(|account| account.is(nick)).map(|account| account.time_zone);
        Ok(zone.filter(|zone| !zone.is_empty()))
    }

    async fn on_notify_command(&self, channel: &str, user: &str, args: &[&str]) -> error::Result<()> {
        let action = args.first().map(|action| action.to_lowercase());
        let subscribe = match action.as_deref() {
            None => None,
            Some("on") => Some(true),
            Some("off") => Some(false),
            _ => return Err(error::Error::NotifyUsage),
        };

        let mut users = match self.inner.db.get_users().await {
            Ok(users) => users,
            Err(db::error::Error::NotFound) => return Err(error::Error::NotRegistered),
            Err(err) => {
                log::warn!("cannot read users: {err}");
                return Err(error::Error::Users);
            }
        };
        let account = users.iter_mut().find(|account| account.is(user)).ok_or(error::Error::NotRegistered)?;

        let chat = self.chat(channel);
        let Some(subscribe) = subscribe else {
            let state = if account.follows(channel) { "on" } else { "off" };
            chat.say(alloc::format!("Event mentions on this channel are {state}."));
            return Ok(());
        };

        let changed = if subscribe { account.subscribe(channel) } else { account.unsubscribe(channel) };
        if changed {
            self.inner.db.set_users(&users).await.map_err(|err| {
                log::warn!("cannot store users: {err}");
                error::Error::UpdateUsers
            })?;
            log::info!("{user} turned event mentions {} in {channel}", if subscribe { "on" } else { "off" });
        }

        chat.say(if subscribe {
            "You will be mentioned when events start on this channel."
        } else {
            "You will no longer be mentioned for events on this channel."
        });
        Ok(())
    }

    /// Announces calendar events shortly before they start, checking once per
    /// `reminder_period`. Never returns.
    pub async fn run_reminders(self) {
        let period = self.inner.config.reminder_period;
        let mut tick = time::interval_at(time::Instant::now() + period, period);
        let mut reminder = Reminder::default();
        loop {
            tick.tick().await;
            self.remind(&mut reminder, Utc::now()).await;
        }
    }

    async fn remind(&self, reminder: &mut Reminder, now: DateTime<Utc>) {
        let events = match self.inner.db.get_events().await {
            Ok(events) => events,
            Err(db::error::Error::NotFound) => return,
            Err(err) => {
                log::warn!("cannot read events: {err}");
                return;
            }
        };
        let due = reminder.due(&events, now);
        if due.is_empty() {
            return;
        }

        let users = self.inner.db.get_users().await.unwrap_or_else(|err| {
            log::debug!("nobody to mention: {err}");
            Vec::new()
        });
        for event in due {
            log::info!("announcing {} in {}", event.title(), event.channel);
            let chat = self.chat(&event.channel);
            chat.say(alloc::format!("\x034Starting in {LEAD_MINUTES} minutes:\x03 \x02{}\x02", event.title()));
            if let Some(link) = &event.link {
                chat.say(alloc::format!("Event link: {link}"));
            }
            if !event.notify {
                continue;
            }

            let mentions: Vec<&str> =
                users.iter().filter(|account| account.follows(&event.channel)).map(|account| &*account.nick).collect();
            if !mentions.is_empty() {
                chat.say(mentions.join(" "));
                chat.say("Use !notify off to stop getting mentions for events on this channel.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bot, HELP};
    use crate::{config::Config, outbox::Message, schedule::Reminder, session::Kind};
    use chrono::{DateTime, Duration as Delta, Utc};
    use core::time::Duration;
    use db::Database;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    const CHANNEL: &str = "#motorsport";

    fn bot() -> (Bot, TempDir, mpsc::UnboundedReceiver<Message>) {
        let dir = TempDir::new().unwrap();
        let (outbox, inbox) = mpsc::unbounded_channel();
        let bot = Bot::new(Database::from(dir.path().to_path_buf()), outbox, Config::default());
        (bot, dir, inbox)
    }

    fn write(dir: &TempDir, table: &str, contents: &str) {
        std::fs::write(dir.path().join(table), contents).unwrap();
    }

    fn drain(inbox: &mut mpsc::UnboundedReceiver<Message>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(Message { text, .. }) = inbox.try_recv() {
            lines.push(text);
        }
        lines
    }

    fn timestamp(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn quiz_is_ignored_while_a_poll_runs() {
        let (bot, dir, mut inbox) = bot();
        write(&dir, "quiz.csv", "2+2?,4\n");

        bot.on_message(CHANNEL, "alice", "!poll Best driver?;Alice;Bob").await;
        assert_eq!(bot.session(), Some((Kind::Poll, CHANNEL.into())));

        bot.on_message(CHANNEL, "bob", "!quiz").await;
        bot.on_message("#formula1", "bob", "!qz 3").await;
        bot.on_message(CHANNEL, "carol", "!poll Again?;Yes;No").await;
        assert_eq!(bot.session(), Some((Kind::Poll, CHANNEL.into())));

        bot.on_message(CHANNEL, "bob", "2").await;
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(bot.session(), None);
        assert_eq!(
            drain(&mut inbox),
            [
                "Poll: Best driver? (60 seconds to vote)",
                "1. Alice",
                "2. Bob",
                "The Poll has ended.",
                "Results:",
                "2. Bob - 100.00% votes",
            ]
        );
    }

    #[tokio::test]
    async fn poll_without_options_shows_usage() {
        let (bot, _dir, mut inbox) = bot();
        bot.on_message(CHANNEL, "alice", "!poll Best driver?").await;
        assert_eq!(bot.session(), None);
        assert_eq!(drain(&mut inbox), ["Syntax: !poll question;option 1;option 2;option n"]);
    }

    #[tokio::test]
    async fn quiz_needs_questions_for_the_channel() {
        let (bot, dir, mut inbox) = bot();
        bot.on_message(CHANNEL, "alice", "!quiz").await;
        assert_eq!(bot.session(), None);
        assert_eq!(drain(&mut inbox), ["Error reading questions."]);

        write(&dir, "quiz.csv", "Who won in 1994?,Schumacher,#formula1\n");
        bot.on_message(CHANNEL, "alice", "!quiz").await;
        assert_eq!(bot.session(), None);
        assert_eq!(drain(&mut inbox), ["No quiz questions available for this channel."]);
    }

    #[tokio::test(start_paused = true)]
    async fn quiz_plays_through_the_router() {
        let (bot, dir, mut inbox) = bot();
        write(&dir, "quiz.csv", "2+2?,4\n");

        bot.on_message(CHANNEL, "alice", "!quiz 3").await;
        assert_eq!(bot.session(), Some((Kind::Quiz, CHANNEL.into())));
        bot.on_message("#formula1", "bob", "4").await;
        // A blank command name is still a command, so it never reaches the quiz.
        bot.on_message(CHANNEL, "bob", "! 4").await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        bot.on_message(CHANNEL, "alice", "4").await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(bot.session(), None);
        assert_eq!(
            drain(&mut inbox),
            ["1/1 - 2+2? (20 seconds remaining)", "Correct!", "The quiz is over!", "Score:", "alice - 1"]
        );
    }

    #[tokio::test]
    async fn quotes_can_be_added_and_read() {
        let (bot, _dir, mut inbox) = bot();
        bot.on_message(CHANNEL, "alice", "!quote").await;
        assert_eq!(drain(&mut inbox), ["Error getting quote."]);

        bot.on_message(CHANNEL, "alice", "!quote add Simply lovely.").await;
        assert_eq!(drain(&mut inbox), ["Quote added."]);

        bot.on_message(CHANNEL, "bob", "!q get").await;
        let lines = drain(&mut inbox);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Simply lovely. - "));

        bot.on_message(CHANNEL, "bob", "!quote add").await;
        bot.on_message(CHANNEL, "bob", "!quote remove it").await;
        assert_eq!(drain(&mut inbox), ["Usage: !quote [get|add] [text]", "Usage: !quote [get|add] [text]"]);
    }

    #[tokio::test]
    async fn ask_replies_from_the_answers_table() {
        let (bot, dir, mut inbox) = bot();
        bot.on_message(CHANNEL, "alice", "!ask").await;
        assert_eq!(drain(&mut inbox), ["Usage: !ask <question>"]);

        write(&dir, "answers.csv", "Without a doubt.\n");
        bot.on_message(CHANNEL, "alice", "!a Will it rain?").await;
        assert_eq!(drain(&mut inbox), ["Without a doubt."]);
    }

    #[tokio::test]
    async fn help_lists_or_searches_commands() {
        let (bot, _dir, mut inbox) = bot();
        bot.on_message(CHANNEL, "alice", "!help").await;
        assert_eq!(drain(&mut inbox), HELP);

        bot.on_message(CHANNEL, "alice", "!h quiz").await;
        bot.on_message(CHANNEL, "alice", "!help n").await;
        assert_eq!(drain(&mut inbox), [HELP[5], HELP[2]]);

        bot.on_message(CHANNEL, "alice", "!help nothing").await;
        bot.on_message(CHANNEL, "alice", "!standings").await;
        bot.on_message(CHANNEL, "alice", "! quiz").await;
        bot.on_message(CHANNEL, "alice", "just chatting").await;
        assert!(drain(&mut inbox).is_empty());
        assert_eq!(bot.session(), None);
    }

    #[tokio::test]
    async fn next_event_in_the_user_time_zone() {
        let (bot, dir, mut inbox) = bot();
        bot.on_message(CHANNEL, "alice", "!next").await;
        assert_eq!(drain(&mut inbox), ["No event found."]);

        let now = Utc::now();
        let events = format!(
            "[Formula 1],Spanish Grand Prix,Race,{},#formula1\n\
             [Formula 1],Monaco Grand Prix,Qualifying,{},#formula1\n\
             [Formula 1],Monaco Grand Prix,Race,{},#formula1\n",
            timestamp(now - Delta::days(7)),
            timestamp(now + Delta::days(2)),
            timestamp(now + Delta::days(3)),
        );
        write(&dir, "events.csv", &events);
        write(&dir, "users.csv", "alice,Asia/Tokyo,0,\nbob,Mars/Olympus,0,\n");

        bot.on_message(CHANNEL, "alice", "!next").await;
        let lines = drain(&mut inbox);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\x02JST (UTC+9)\x02 | [Formula 1] Monaco Grand Prix Qualifying | "));

        bot.on_message(CHANNEL, "carol", "!n race").await;
        let lines = drain(&mut inbox);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("| [Formula 1] Monaco Grand Prix Race | 2 day(s), 23 hour(s), 59 minute(s)"));
        assert!(lines[0].contains("(UTC+1)") || lines[0].contains("(UTC+2)"));

        bot.on_message(CHANNEL, "bob", "!next f1").await;
        let lines = drain(&mut inbox);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Error converting time to user time zone. Using default one.");
        assert!(lines[1].contains("Monaco Grand Prix Qualifying"));

        bot.on_message(CHANNEL, "bob", "!next f2").await;
        assert_eq!(drain(&mut inbox), ["No event found."]);
    }

    #[tokio::test]
    async fn notify_toggles_the_current_channel() {
        let (bot, dir, mut inbox) = bot();
        bot.on_message(CHANNEL, "alice", "!notify on").await;
        assert_eq!(drain(&mut inbox), ["You're not a registered user."]);

        write(&dir, "users.csv", "alice,Asia/Tokyo,12,#formula1\n");
        bot.on_message(CHANNEL, "bob", "!notify on").await;
        bot.on_message(CHANNEL, "alice", "!notify maybe").await;
        bot.on_message(CHANNEL, "alice", "!notify").await;
        assert_eq!(
            drain(&mut inbox),
            ["You're not a registered user.", "Usage: !notify [on|off]", "Event mentions on this channel are off."]
        );

        bot.on_message(CHANNEL, "Alice", "!notify on").await;
        bot.on_message("#formula1", "alice", "!ny off").await;
        assert_eq!(
            drain(&mut inbox),
            [
                "You will be mentioned when events start on this channel.",
                "You will no longer be mentioned for events on this channel.",
            ]
        );
        let table = std::fs::read_to_string(dir.path().join("users.csv")).unwrap();
        assert_eq!(table, "alice,Asia/Tokyo,12,#motorsport\n");
    }

    #[tokio::test]
    async fn reminders_mention_subscribers_once() {
        let (bot, dir, mut inbox) = bot();
        let now = Utc::now();
        let events = format!(
            "[Formula 1],Monaco Grand Prix,Race,{},#formula1,https://example.org/monaco,notify\n\
             [Formula 2],Monaco,Feature Race,{},#motorsport\n\
             [Formula 1],Canadian Grand Prix,Race,{},#formula1,,notify\n",
            timestamp(now + Delta::minutes(3)),
            timestamp(now + Delta::minutes(4)),
            timestamp(now + Delta::days(14)),
        );
        write(&dir, "events.csv", &events);
        write(&dir, "users.csv", "alice,Asia/Tokyo,0,#formula1\nbob,,0,#motorsport\ncarol,,0,#Formula1:#motorsport\n");

        let mut reminder = Reminder::default();
        bot.remind(&mut reminder, now).await;
        bot.remind(&mut reminder, now + Delta::minutes(1)).await;

        let mut lines = Vec::new();
        while let Ok(Message { target, text }) = inbox.try_recv() {
            lines.push(format!("{target} {text}"));
        }
        assert_eq!(
            lines,
            [
                "#formula1 \x034Starting in 5 minutes:\x03 \x02[Formula 1] Monaco Grand Prix Race\x02",
                "#formula1 Event link: https://example.org/monaco",
                "#formula1 alice carol",
                "#formula1 Use !notify off to stop getting mentions for events on this channel.",
                "#motorsport \x034Starting in 5 minutes:\x03 \x02[Formula 2] Monaco Feature Race\x02",
            ]
        );
    }
}
