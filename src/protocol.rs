/// Line-oriented action protocol
///
/// One action per line, space-delimited, newline-terminated:
///   O <id> <symbol> <B|S> <quantity> <price with 5 fraction digits>
/// The stream ends with a single line containing only `P`.

use rand::Rng;
use std::fmt::{self, Write as _};

pub const ORDER_TOKEN: &str = "O";
pub const PRINT_TOKEN: &str = "P";

/// Terminal line of every complete stream
pub const SENTINEL: &str = PRINT_TOKEN;

pub const PRICE_DECIMALS: usize = 5;
pub const DEFAULT_QUANTITY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(Side::Buy),
            'S' => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Side::Buy => 'B',
            Side::Sell => 'S',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.as_char())
    }
}

/// Trading symbol label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Accepts non-empty ASCII alphanumeric labels
    pub fn new(label: &str) -> Option<Self> {
        if is_valid_symbol(label) {
            Some(Symbol(label.to_string()))
        } else {
            None
        }
    }

    /// Draw `len` independent uppercase letters
    pub fn random<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let label = (0..len)
            .map(|_| rng.gen_range(b'A'..=b'Z') as char)
            .collect();
        Symbol(label)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid_symbol(label: &str) -> bool {
    !label.is_empty() && label.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A single order placement
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub id: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: u32,
    pub price: f64,
}

impl Action {
    /// Append the wire line, including the trailing newline
    pub fn encode_into(&self, out: &mut String) {
        // fmt::Write for String never fails
        let _ = writeln!(out, "{}", self);
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {:.prec$}",
            ORDER_TOKEN,
            self.id,
            self.symbol,
            self.side,
            self.quantity,
            self.price,
            prec = PRICE_DECIMALS
        )
    }
}
