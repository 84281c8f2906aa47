pub mod error;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::path::PathBuf;
use tokio::{fs, io::AsyncWriteExt};

pub use model::{Event, Question, Quote, User};

const QUIZ_TABLE: &str = "quiz.csv";
const QUOTES_TABLE: &str = "quotes.csv";
const ANSWERS_TABLE: &str = "answers.csv";
const EVENTS_TABLE: &str = "events.csv";
const USERS_TABLE: &str = "users.csv";

/// Start times in the events table are always written in UTC.
const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Flat CSV tables living in a single data folder.
pub struct Database(PathBuf);

impl From<PathBuf> for Database {
    fn from(root: PathBuf) -> Self {
        Self(root)
    }
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    ReaderBuilder::new().has_headers(false).flexible(true).trim(Trim::All).from_reader(bytes)
}

fn deserialize_question_from_record(record: &StringRecord) -> Option<Question> {
    let prompt = record.get(0).filter(|field| !field.is_empty())?;
    let answer = record.get(1).filter(|field| !field.is_empty())?;
    let channel = record.get(2).filter(|field| !field.is_empty()).map(Box::from);
    Some(Question { prompt: prompt.into(), answer: answer.into(), channel })
}

fn deserialize_event_from_record(record: &StringRecord) -> Option<Event> {
    let field = |index: usize| record.get(index).filter(|field| !field.is_empty());
    let start = NaiveDateTime::parse_from_str(field(3)?, EVENT_TIME_FORMAT).ok()?.and_utc();
    Some(Event {
        category: field(0)?.into(),
        name: field(1)?.into(),
        session: field(2)?.into(),
        start,
        channel: field(4)?.into(),
        link: field(5).map(Box::from),
        notify: field(6).is_some_and(|flag| flag.eq_ignore_ascii_case("notify")),
    })
}

fn deserialize_user_from_record(record: &StringRecord) -> Option<User> {
    let nick = record.get(0).filter(|field| !field.is_empty())?;
    let channels = record.get(3).unwrap_or_default().split(':').filter(|channel| !channel.is_empty());
    Some(User {
        nick: nick.into(),
        time_zone: record.get(1).unwrap_or_default().into(),
        points: record.get(2).filter(|field| !field.is_empty()).unwrap_or("0").into(),
        channels: channels.map(Box::from).collect(),
    })
}

impl Database {
    async fn read_table(&self, table: &str) -> error::Result<Vec<u8>> {
        Ok(fs::read(self.0.join(table)).await?)
    }

    /// Appends `row` on a line of its own, even when the table lacks a final line break.
    async fn append_row(&self, table: &str, row: &[u8]) -> error::Result<()> {
        let needs_break = match self.read_table(table).await {
            Ok(bytes) => bytes.last().is_some_and(|&byte| byte != b'\n'),
            Err(error::Error::NotFound) => false,
            Err(err) => return Err(err),
        };

        let mut file = fs::OpenOptions::new().create(true).append(true).open(self.0.join(table)).await?;
        if needs_break {
            file.write_all(b"\n").await?;
        }
        file.write_all(row).await?;
        file.flush().await?;
        Ok(())
    }

    /// Replaces the whole table. The new contents are written aside first and then moved over
    /// the old file.
    async fn replace_table(&self, table: &str, bytes: &[u8]) -> error::Result<()> {
        let path = self.0.join(table);
        let staging = path.with_extension("csv.tmp");
        fs::write(&staging, bytes).await?;
        fs::rename(&staging, &path).await?;
        Ok(())
    }

    /// Retrieves every question that may be asked in the given channel. Rows without a prompt
    /// or an answer are skipped.
    pub async fn get_questions(&self, channel: &str) -> error::Result<Vec<Question>> {
        let bytes = self.read_table(QUIZ_TABLE).await?;
        let mut questions = Vec::new();
        for record in reader(&bytes).records() {
            let record = record?;
            let Some(question) = deserialize_question_from_record(&record) else {
                log::warn!("skipping malformed question at {:?}", record.position());
                continue;
            };
            if question.is_eligible(channel) {
                questions.push(question);
            }
        }
        Ok(questions)
    }

    pub async fn get_quotes(&self) -> error::Result<Vec<Quote>> {
        let bytes = self.read_table(QUOTES_TABLE).await?;
        let quotes = reader(&bytes).deserialize().collect::<Result<_, _>>()?;
        Ok(quotes)
    }

    /// Appends a quote, creating the table if needed.
    pub async fn add_quote(&self, quote: &Quote) -> error::Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.serialize(quote)?;
        let row = writer.into_inner().map_err(|_| error::Error::Io)?;
        self.append_row(QUOTES_TABLE, &row).await
    }

    /// Retrieves the canned replies of the `ask` command.
    pub async fn get_answers(&self) -> error::Result<Vec<Box<str>>> {
        let bytes = self.read_table(ANSWERS_TABLE).await?;
        let mut answers = Vec::new();
        for record in reader(&bytes).records() {
            if let Some(answer) = record?.get(0).filter(|field| !field.is_empty()) {
                answers.push(answer.into());
            }
        }
        Ok(answers)
    }

    /// Retrieves the event calendar in table order. Rows with a missing column or an
    /// unreadable start time are skipped.
    pub async fn get_events(&self) -> error::Result<Vec<Event>> {
        let bytes = self.read_table(EVENTS_TABLE).await?;
        let mut events = Vec::new();
        for record in reader(&bytes).records() {
            let record = record?;
            match deserialize_event_from_record(&record) {
                Some(event) => events.push(event),
                None => log::warn!("skipping malformed event at {:?}", record.position()),
            }
        }
        Ok(events)
    }

    pub async fn get_users(&self) -> error::Result<Vec<User>> {
        let bytes = self.read_table(USERS_TABLE).await?;
        let mut users = Vec::new();
        for record in reader(&bytes).records() {
            let record = record?;
            match deserialize_user_from_record(&record) {
                Some(user) => users.push(user),
                None => log::warn!("skipping malformed user at {:?}", record.position()),
            }
        }
        Ok(users)
    }

    /// Rewrites the users table with the given rows.
    pub async fn set_users(&self, users: &[User]) -> error::Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        for user in users {
            let channels = user.channels.join(":");
            writer.write_record([&*user.nick, &*user.time_zone, &*user.points, channels.as_str()])?;
        }
        let bytes = writer.into_inner().map_err(|_| error::Error::Io)?;
        self.replace_table(USERS_TABLE, &bytes).await
    }
}
