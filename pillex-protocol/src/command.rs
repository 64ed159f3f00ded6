//! Host command parsing
//!
//! A line is split on spaces into a verb and up to [`MAX_ARGS`] argument
//! tokens; further tokens are ignored. The verb is looked up in a static
//! table, then the arguments are validated for that verb. A
//! [`ParseError`] carries the reply line to send back and the dispatcher
//! changes no state for it.

use crate::screen::ScreenId;
use heapless::Vec;

/// Maximum number of argument tokens after the verb
pub const MAX_ARGS: usize = 23;

/// Capacity of the message screen payload in bytes
pub const MESSAGE_CAPACITY: usize = 63;

/// Maximum number of bytes in one `mem -w` command
pub const MAX_WRITE_BYTES: usize = MAX_ARGS - 2;

/// Default length of a `mem -r` read
pub const DEFAULT_READ_LEN: u16 = 16;

/// Command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verb {
    Time,
    Mem,
    Msg,
    Err,
    Screen,
    I2c,
    Drp,
    DrpAll,
    Sns,
}

/// Verb lookup table
static VERB_TABLE: &[(&str, Verb)] = &[
    ("time", Verb::Time),
    ("mem", Verb::Mem),
    ("msg", Verb::Msg),
    ("err", Verb::Err),
    ("screen", Verb::Screen),
    ("i2c", Verb::I2c),
    ("drp", Verb::Drp),
    ("drpall", Verb::DrpAll),
    ("sns", Verb::Sns),
];

impl Verb {
    /// Look up a verb by its exact (case-sensitive) text
    pub fn lookup(text: &str) -> Option<Self> {
        VERB_TABLE
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, verb)| *verb)
    }

    /// Wire text of the verb
    pub fn name(self) -> &'static str {
        VERB_TABLE
            .iter()
            .find(|(_, verb)| *verb == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    /// Usage line sent when the arguments are missing or malformed
    pub const fn usage(self) -> &'static str {
        match self {
            Verb::Time => "Usage: time HH MM SS",
            Verb::Mem => "Usage: mem | mem -r <addr> [len] | mem -w <addr> <v1> .. <vn>",
            Verb::Msg => "Usage: msg <text>",
            Verb::Err => "Usage: err <code>",
            Verb::Screen => "Usage: screen <STATE>",
            Verb::I2c => "Usage: i2c",
            Verb::Drp => "Usage: drp <module 1..4>",
            Verb::DrpAll => "Usage: drpall <n1> <n2> <n3> <n4>",
            Verb::Sns => "Usage: sns",
        }
    }
}

/// A parsed host command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Set the wall clock and refresh host liveness
    SetTime { hours: u8, minutes: u8, seconds: u8 },
    /// Dump the whole persistent store
    MemDump,
    /// Read `len` bytes starting at `addr`
    MemRead { addr: u16, len: u16 },
    /// Write bytes starting at `addr`
    MemWrite {
        addr: u16,
        values: Vec<u8, MAX_WRITE_BYTES>,
    },
    /// Message screen payload, spacing preserved
    Message(&'a str),
    /// Switch to the error screen with a code
    ShowError(i32),
    /// Force a screen
    Screen(ScreenId),
    /// Scan the I2C bus
    I2cScan,
    /// Enqueue one pill for a module (zero-based index)
    Drop { module: u8 },
    /// Replace all four queue counts
    DropAll([u16; 4]),
    /// Read all four sensors
    Sensors,
}

/// Reasons a line is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line was empty or blank
    Empty,
    /// First token is not a known verb
    UnknownVerb,
    /// Too few arguments, or an argument that is not a number
    Usage(Verb),
    /// Hours, minutes or seconds out of range
    TimeOutOfRange,
    /// Module number outside 1..4
    ModuleOutOfRange,
    /// Screen name not one of the seven states
    UnknownScreen,
}

impl ParseError {
    /// Human-readable reply line (without terminator)
    pub const fn reply(&self) -> &'static str {
        match self {
            ParseError::Empty => "",
            ParseError::UnknownVerb => {
                "Unknown command. Commands: time mem msg err screen i2c drp drpall sns"
            }
            ParseError::Usage(verb) => verb.usage(),
            ParseError::TimeOutOfRange => "Invalid time, expected HH 0-23, MM 0-59, SS 0-59",
            ParseError::ModuleOutOfRange => "Invalid module, expected 1..4",
            ParseError::UnknownScreen => {
                "Unknown screen. Screens: LOADING TIME MESSAGE ERROR TAKE_PILL SUCCESS PILL_STUCK"
            }
        }
    }
}

/// Tokenized line: the verb text and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'a> {
    pub verb: &'a str,
    pub args: Vec<&'a str, MAX_ARGS>,
}

/// Split a line on spaces into a verb and at most [`MAX_ARGS`] arguments
///
/// Runs of spaces count as one separator. Returns `None` for a blank line.
pub fn tokenize(line: &str) -> Option<Tokens<'_>> {
    let mut parts = line.split(' ').filter(|t| !t.is_empty());
    let verb = parts.next()?;
    let mut args = Vec::new();
    for token in parts {
        if args.push(token).is_err() {
            break;
        }
    }
    Some(Tokens { verb, args })
}

/// Parse one line into a [`Command`]
pub fn parse(line: &str) -> Result<Command<'_>, ParseError> {
    let tokens = tokenize(line).ok_or(ParseError::Empty)?;
    let verb = Verb::lookup(tokens.verb).ok_or(ParseError::UnknownVerb)?;
    let args = tokens.args.as_slice();

    match verb {
        Verb::Time => parse_time(args),
        Verb::Mem => parse_mem(args),
        Verb::Msg => {
            let text = message_text(line, tokens.verb);
            if text.is_empty() {
                Err(ParseError::Usage(Verb::Msg))
            } else {
                Ok(Command::Message(text))
            }
        }
        Verb::Err => {
            let code = required(args, 0, verb)?;
            let code = code.parse::<i32>().map_err(|_| ParseError::Usage(verb))?;
            Ok(Command::ShowError(code))
        }
        Verb::Screen => {
            let name = required(args, 0, verb)?;
            ScreenId::from_name(name)
                .map(Command::Screen)
                .ok_or(ParseError::UnknownScreen)
        }
        Verb::I2c => Ok(Command::I2cScan),
        Verb::Drp => {
            let module = required(args, 0, verb)?;
            let module = module.parse::<i32>().map_err(|_| ParseError::Usage(verb))?;
            if !(1..=4).contains(&module) {
                return Err(ParseError::ModuleOutOfRange);
            }
            Ok(Command::Drop {
                module: (module - 1) as u8,
            })
        }
        Verb::DrpAll => {
            if args.len() < 4 {
                return Err(ParseError::Usage(verb));
            }
            let mut counts = [0u16; 4];
            for (count, arg) in counts.iter_mut().zip(args) {
                *count = arg.parse::<u16>().map_err(|_| ParseError::Usage(verb))?;
            }
            Ok(Command::DropAll(counts))
        }
        Verb::Sns => Ok(Command::Sensors),
    }
}

fn required<'a>(args: &[&'a str], index: usize, verb: Verb) -> Result<&'a str, ParseError> {
    args.get(index).copied().ok_or(ParseError::Usage(verb))
}

fn parse_time(args: &[&str]) -> Result<Command<'static>, ParseError> {
    if args.len() < 3 {
        return Err(ParseError::Usage(Verb::Time));
    }
    let mut fields = [0u8; 3];
    for (field, arg) in fields.iter_mut().zip(args) {
        *field = arg
            .parse::<u8>()
            .map_err(|_| ParseError::Usage(Verb::Time))?;
    }
    let [hours, minutes, seconds] = fields;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(ParseError::TimeOutOfRange);
    }
    Ok(Command::SetTime {
        hours,
        minutes,
        seconds,
    })
}

fn parse_mem(args: &[&str]) -> Result<Command<'static>, ParseError> {
    let usage = ParseError::Usage(Verb::Mem);
    match args.first().copied() {
        None => Ok(Command::MemDump),
        Some("-r") => {
            let addr = args.get(1).and_then(|a| parse_hex_u16(a)).ok_or(usage)?;
            let len = match args.get(2) {
                Some(len) => parse_hex_u16(len).ok_or(usage)?,
                None => DEFAULT_READ_LEN,
            };
            Ok(Command::MemRead { addr, len })
        }
        Some("-w") => {
            let addr = args.get(1).and_then(|a| parse_hex_u16(a)).ok_or(usage)?;
            let mut values = Vec::new();
            for arg in args.iter().skip(2) {
                let value = parse_hex_u8(arg).ok_or(usage)?;
                values.push(value).map_err(|_| usage)?;
            }
            if values.is_empty() {
                return Err(usage);
            }
            Ok(Command::MemWrite { addr, values })
        }
        Some(_) => Err(usage),
    }
}

/// The raw text after the verb, interior spacing preserved
fn message_text<'a>(line: &'a str, verb: &str) -> &'a str {
    let rest = line.trim_start_matches(' ');
    rest.get(verb.len()..)
        .unwrap_or("")
        .trim_start_matches(' ')
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

fn parse_hex_u16(text: &str) -> Option<u16> {
    u16::from_str_radix(strip_hex_prefix(text), 16).ok()
}

fn parse_hex_u8(text: &str) -> Option<u8> {
    u8::from_str_radix(strip_hex_prefix(text), 16).ok()
}
