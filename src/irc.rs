use crate::Settings;
use api::{Bot, Message};
use core::time::Duration;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
    sync::mpsc,
    time,
};

/// The parts of the IRC protocol the bot reacts to.
#[derive(Debug, PartialEq, Eq)]
pub enum Event<'txt> {
    Ping(&'txt str),
    /// Registration completed (`001`).
    Welcome,
    Privmsg { nick: &'txt str, target: &'txt str, text: &'txt str },
    Other,
}

pub fn parse(line: &str) -> Event<'_> {
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
    let (prefix, rest) = match line.strip_prefix(':') {
        Some(rest) => match rest.split_once(' ') {
            Some((prefix, rest)) => (Some(prefix), rest),
            None => return Event::Other,
        },
        None => (None, line),
    };

    let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));
    match command {
        "PING" => Event::Ping(params.strip_prefix(':').unwrap_or(params)),
        "001" => Event::Welcome,
        "PRIVMSG" => {
            let Some((target, text)) = params.split_once(' ') else {
                return Event::Other;
            };
            let Some(nick) = prefix.and_then(|prefix| prefix.split('!').next()).filter(|nick| !nick.is_empty()) else {
                return Event::Other;
            };
            Event::Privmsg { nick, target, text: text.strip_prefix(':').unwrap_or(text) }
        }
        _ => Event::Other,
    }
}

fn is_channel(target: &str) -> bool {
    target.starts_with(|c| c == '#' || c == '&')
}

/// Writes protocol replies as soon as they are queued. Chat lines wait until the channels were
/// joined and are then written at a paced rate.
async fn write_loop<W>(
    mut writer: W,
    mut control: mpsc::UnboundedReceiver<String>,
    chat: &mut mpsc::UnboundedReceiver<Message>,
    delay: Duration,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut joined = false;
    loop {
        let (line, paced) = tokio::select! {
            biased;
            Some(line) = control.recv() => (line, false),
            Some(Message { target, text }) = chat.recv(), if joined => {
                let text = text.replace(['\r', '\n'], " ");
                (format!("PRIVMSG {target} :{text}"), true)
            }
            else => return Ok(()),
        };

        log::trace!(">> {line}");
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
        writer.flush().await?;
        joined |= line.starts_with("JOIN ");
        if paced {
            time::sleep(delay).await;
        }
    }
}

async fn read_loop<R>(settings: &Settings, bot: &Bot, control: mpsc::UnboundedSender<String>, reader: R) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let nick = &settings.nick;
    control.send(format!("NICK {nick}"))?;
    control.send(format!("USER {nick} 0 * :{nick}"))?;

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        log::trace!("<< {line}");
        match parse(&line) {
            Event::Ping(token) => control.send(format!("PONG :{token}"))?,
            Event::Welcome => {
                let channels = settings.channels.join(",");
                log::info!("registered as {nick}, joining {channels}");
                control.send(format!("JOIN {channels}"))?;
            }
            Event::Privmsg { nick, target, text } => {
                let channel = if is_channel(target) { target } else { nick };
                bot.on_message(channel, nick, text).await;
            }
            Event::Other => {}
        }
    }

    anyhow::bail!("connection closed by the server")
}

/// Runs the bot over an established connection until either side fails. Chat lines that
/// were not written yet stay queued in `outgoing`.
pub async fn serve<R, W>(
    settings: &Settings,
    bot: &Bot,
    outgoing: &mut mpsc::UnboundedReceiver<Message>,
    reader: R,
    writer: W,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (control, control_rx) = mpsc::unbounded_channel();
    let writing = async { Ok(write_loop(writer, control_rx, outgoing, settings.send_delay).await?) };
    tokio::try_join!(read_loop(settings, bot, control, reader), writing)?;
    Ok(())
}

/// Connects to the configured server and serves it once.
pub async fn connect(
    settings: &Settings,
    bot: &Bot,
    outgoing: &mut mpsc::UnboundedReceiver<Message>,
) -> anyhow::Result<()> {
    log::info!("connecting to {}", settings.server);
    let stream = TcpStream::connect(&*settings.server).await?;
    let (reader, writer) = stream.into_split();
    serve(settings, bot, outgoing, reader, writer).await
}

/// Keeps the bot connected, dialing again after every failure.
pub async fn run(settings: &Settings, bot: Bot, mut outgoing: mpsc::UnboundedReceiver<Message>) {
    loop {
        if let Err(err) = connect(settings, &bot, &mut outgoing).await {
            log::error!("connection failed: {err:#}");
        }
        log::info!("reconnecting in {} seconds", settings.reconnect_delay.as_secs());
        time::sleep(settings.reconnect_delay).await;
    }
}
