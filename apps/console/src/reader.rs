//! Operator input producer: one line in, at most one session event out.

use anyhow::{Context, Result};
use client_core::{RobotFeed, SessionEvent};
use shared::domain::{CellCoord, KeyEvent};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tokio_stream::{wrappers::SplitStream, StreamExt};
use tracing::{debug, warn};

use crate::input::{self, ConsoleCommand, ParseError};

enum Line {
    Text(String),
    Undecodable,
    End,
}

pub struct CommandReader {
    events: mpsc::Sender<SessionEvent>,
    feed: RobotFeed,
    grid_size: usize,
}

impl CommandReader {
    pub fn new(events: mpsc::Sender<SessionEvent>, feed: RobotFeed, grid_size: usize) -> Self {
        Self {
            events,
            feed,
            grid_size,
        }
    }

    /// Forwards commands until `quit`, end of input or a read failure. The
    /// session is asked to unmount on every exit path, so other producers
    /// holding a sender cannot keep it alive.
    pub async fn run<R, W>(self, input: R, mut feedback: W)
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = SplitStream::new(input.split(b'\n'));
        if let Err(err) = self.pump(&mut lines, &mut feedback).await {
            warn!(error = %err, "console: input stopped");
        }
        let _ = self.events.send(SessionEvent::Unmount).await;
    }

    async fn pump<R, W>(&self, lines: &mut SplitStream<R>, feedback: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.events.send(SessionEvent::Render).await.is_err() {
            return Ok(());
        }

        loop {
            let line = match next_line(lines).await? {
                Line::Text(line) => line,
                Line::Undecodable => {
                    report(feedback, "? line is not valid UTF-8").await?;
                    continue;
                }
                Line::End => return Ok(()),
            };
            let command = match input::parse_line(&line, self.grid_size) {
                Ok(command) => command,
                Err(ParseError::Empty) => continue,
                Err(err) => {
                    report(feedback, &format!("? {err}")).await?;
                    continue;
                }
            };

            let event = match command {
                ConsoleCommand::Key { name, repeat } => SessionEvent::Key(if repeat {
                    KeyEvent::repeat(name)
                } else {
                    KeyEvent::press(name)
                }),
                ConsoleCommand::Click { row, col } => {
                    SessionEvent::CellClick(CellCoord::new(row, col))
                }
                ConsoleCommand::Zoom(factor) => SessionEvent::Zoom(factor),
                ConsoleCommand::Map(position) => {
                    let prompt = format!(
                        "type for point at {:.5}, {:.5}? (empty line cancels)",
                        position.lat, position.lng
                    );
                    report(feedback, &prompt).await?;
                    // An empty answer, an undecodable one or end of input cancels.
                    let label = match next_line(lines).await? {
                        Line::Text(answer) if !answer.is_empty() => Some(answer),
                        _ => None,
                    };
                    SessionEvent::MapClick { position, label }
                }
                ConsoleCommand::Robots => {
                    SessionEvent::RobotsUpdated(self.feed.robot_positions().await)
                }
                ConsoleCommand::Show => SessionEvent::Render,
                ConsoleCommand::Quit => return Ok(()),
            };

            if self.events.send(event).await.is_err() {
                debug!("console: session gone, input ignored");
                return Ok(());
            }
        }
    }
}

async fn next_line<R>(lines: &mut SplitStream<R>) -> Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    let Some(raw) = lines.next().await else {
        return Ok(Line::End);
    };
    let mut raw = raw.context("failed to read input")?;
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    Ok(String::from_utf8(raw).map_or(Line::Undecodable, Line::Text))
}

async fn report<W>(feedback: &mut W, message: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    feedback
        .write_all(format!("{message}\n").as_bytes())
        .await
        .context("failed to write console output")?;
    feedback.flush().await.context("failed to write console output")
}

#[cfg(test)]
#[path = "tests/reader_tests.rs"]
mod tests;
