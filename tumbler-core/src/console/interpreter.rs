//! Serial command interpreter
//!
//! Reads bytes from the command stream, turns them into [`Event`]s according
//! to the current [`Mode`] and drives the [`Display`]. Parse errors are
//! answered on the stream and forgotten; anything else that fails ends the
//! session with a [`ConsoleError`].

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use tumbler_hal::FlashStorage;
use tumbler_protocol::{Command, JogKey, LineBuffer, Reply};

use super::mode::{Event, Mode};
use crate::display::{Display, DisplayError};

/// Pause after each calibration key, in milliseconds
pub const JOG_PAUSE_MS: u32 = 30;

/// Bytes requested from the stream per read
const READ_CHUNK: usize = 16;

/// Errors that end a console session
///
/// `E` is the output pin error type, `IoE` the stream error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError<E, IoE> {
    /// Motor or storage failure
    Display(DisplayError<E>),
    /// Reading or writing the stream failed
    Io(IoE),
    /// The stream reported end of input
    Disconnected,
}

impl<E, IoE> From<DisplayError<E>> for ConsoleError<E, IoE> {
    fn from(e: DisplayError<E>) -> Self {
        ConsoleError::Display(e)
    }
}

/// How a supervised session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Shutdown<E, IoE> {
    /// The error that ended the session
    pub cause: ConsoleError<E, IoE>,
    /// Result of the emergency state save
    pub saved: Result<(), DisplayError<E>>,
}

/// Command interpreter bound to one display and one output stream
pub struct Console<P, D, S, W> {
    display: Display<P, D, S>,
    delay: D,
    output: W,
    mode: Mode,
    line: LineBuffer,
}

impl<P, D, S, W> Console<P, D, S, W>
where
    P: OutputPin,
    D: DelayNs,
    S: FlashStorage,
    W: Write,
{
    pub fn new(display: Display<P, D, S>, delay: D, output: W) -> Self {
        Self {
            display,
            delay,
            output,
            mode: Mode::Normal,
            line: LineBuffer::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn display(&self) -> &Display<P, D, S> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display<P, D, S> {
        &mut self.display
    }

    /// Print the status block, as INFO does
    pub async fn announce(&mut self) -> Result<(), ConsoleError<P::Error, W::Error>> {
        self.reply(Reply::Status(self.display.snapshot())).await
    }

    /// Feed one byte from the stream
    ///
    /// In NORMAL mode bytes are collected into lines; lines that are too
    /// long or not UTF-8 are dropped. In CONFIGURE mode every byte is a key.
    pub async fn feed(&mut self, byte: u8) -> Result<(), ConsoleError<P::Error, W::Error>> {
        let event = match self.mode {
            Mode::Normal => match self.line.feed(byte) {
                Ok(Some(line)) => match Command::parse(&line) {
                    Ok(command) => Event::Command(command),
                    Err(e) => Event::Rejected(e),
                },
                Ok(None) | Err(_) => return Ok(()),
            },
            Mode::Configure => Event::Key(JogKey::from_byte(byte)),
        };
        self.handle(event).await
    }

    /// Act on one event, then move to the next mode
    pub async fn handle(&mut self, event: Event) -> Result<(), ConsoleError<P::Error, W::Error>> {
        match event {
            Event::Command(command) => self.execute(command).await?,
            Event::Rejected(_) => self.reply(Reply::NotANumber).await?,
            Event::Key(key) => self.calibrate(key).await?,
        }
        self.mode = self.mode.transition(&event);
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<(), ConsoleError<P::Error, W::Error>> {
        match command {
            Command::Show(number) => self.display.show(number).await?,
            Command::ShowFloat { value, decimals } => {
                match self.display.showf(value, decimals).await {
                    Err(DisplayError::OutOfRange) => self.reply(Reply::NotANumber).await?,
                    result => result?,
                }
            }
            Command::Countdown(from) => {
                self.reply(Reply::CountdownFrom(from)).await?;
                self.display.countdown(from).await?;
            }
            Command::Info => self.announce().await?,
            Command::Save => {
                self.display.save_state().await?;
                self.reply(Reply::Saved).await?;
            }
            Command::Set(number) => {
                self.display.set_digits(number);
                self.announce().await?;
            }
            Command::Configure => self.reply(Reply::ConfigureStarted).await?,
            Command::Empty | Command::Unknown => {}
        }
        Ok(())
    }

    async fn calibrate(&mut self, key: JogKey) -> Result<(), ConsoleError<P::Error, W::Error>> {
        match key {
            JogKey::Step { axis, reverse } => {
                self.display.jog(axis, reverse)?;
                self.delay.delay_ms(JOG_PAUSE_MS).await;
            }
            JogKey::Commit => {
                self.display.reset_state().await?;
                self.display.save_state().await?;
                self.reply(Reply::Configured).await?;
            }
            JogKey::Other => self.delay.delay_ms(JOG_PAUSE_MS).await,
        }
        Ok(())
    }

    async fn reply(&mut self, reply: Reply) -> Result<(), ConsoleError<P::Error, W::Error>> {
        let line = reply.to_line();
        self.output
            .write_all(line.as_bytes())
            .await
            .map_err(ConsoleError::Io)?;
        self.output.flush().await.map_err(ConsoleError::Io)
    }

    /// Serve commands from `input` until something fails
    pub async fn run<R>(
        &mut self,
        input: &mut R,
    ) -> Result<Infallible, ConsoleError<P::Error, W::Error>>
    where
        R: Read<Error = W::Error>,
    {
        let mut buffer = [0u8; READ_CHUNK];
        loop {
            let n = input.read(&mut buffer).await.map_err(ConsoleError::Io)?;
            if n == 0 {
                return Err(ConsoleError::Disconnected);
            }
            for &byte in &buffer[..n] {
                self.feed(byte).await?;
            }
        }
    }

    /// Serve commands until something fails, then save the display state
    ///
    /// The save is attempted once, whatever the cause; its result is
    /// reported alongside the cause.
    pub async fn supervise<R>(&mut self, input: &mut R) -> Shutdown<P::Error, W::Error>
    where
        R: Read<Error = W::Error>,
    {
        let cause = match self.run(input).await {
            Ok(never) => match never {},
            Err(e) => e,
        };
        let saved = self.display.save_state().await;
        Shutdown { cause, saved }
    }
}
