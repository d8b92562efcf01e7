/// Zero-copy line decoder for the action protocol
///
/// Parses one line into a `Record` whose symbol borrows from the input.
/// Accepts exactly what the consuming engine accepts for `O` and `P` lines,
/// and additionally requires the price to carry exactly 5 fraction digits.

use crate::protocol::{is_valid_symbol, Side, ORDER_TOKEN, PRICE_DECIMALS, PRINT_TOKEN};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,

    #[error("unknown action token: {0}")]
    UnknownAction(String),

    #[error("print action takes no arguments")]
    PrintWithArguments,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid order id: {0}")]
    InvalidIdentifier(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid side: {0}")]
    InvalidSide(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("price {0} does not have exactly 5 fraction digits")]
    PriceScale(String),

    #[error("unexpected trailing field: {0}")]
    TrailingField(String),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// One decoded order line; the symbol points into the source text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderLine<'a> {
    pub id: u64,
    pub symbol: &'a str,
    pub side: Side,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record<'a> {
    Order(OrderLine<'a>),
    Print,
}

impl<'a> Record<'a> {
    pub fn id(&self) -> Option<u64> {
        match self {
            Record::Order(o) => Some(o.id),
            Record::Print => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Record::Print)
    }
}

pub struct Decoder;

impl Decoder {
    /// Decode a single line (trailing newline tolerated)
    pub fn decode_line(line: &str) -> DecodeResult<Record<'_>> {
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if line.trim().is_empty() {
            return Err(DecodeError::Empty);
        }

        let mut fields = line.split(' ');
        let token = fields.next().ok_or(DecodeError::Empty)?;

        match token {
            PRINT_TOKEN => {
                if line != PRINT_TOKEN {
                    return Err(DecodeError::PrintWithArguments);
                }
                Ok(Record::Print)
            }
            ORDER_TOKEN => {
                let id_field = fields.next().ok_or(DecodeError::MissingField("id"))?;
                let id = id_field
                    .parse::<u64>()
                    .map_err(|_| DecodeError::InvalidIdentifier(id_field.to_string()))?;

                let symbol = fields.next().ok_or(DecodeError::MissingField("symbol"))?;
                if !is_valid_symbol(symbol) {
                    return Err(DecodeError::InvalidSymbol(symbol.to_string()));
                }

                let side_field = fields.next().ok_or(DecodeError::MissingField("side"))?;
                let mut side_chars = side_field.chars();
                let side = match (side_chars.next(), side_chars.next()) {
                    (Some(c), None) => Side::from_char(c),
                    _ => None,
                }
                .ok_or_else(|| DecodeError::InvalidSide(side_field.to_string()))?;

                let qty_field = fields.next().ok_or(DecodeError::MissingField("quantity"))?;
                let quantity = match qty_field.parse::<u32>() {
                    Ok(q) if q > 0 => q,
                    _ => return Err(DecodeError::InvalidQuantity(qty_field.to_string())),
                };

                let price_field = fields.next().ok_or(DecodeError::MissingField("price"))?;
                let price = price_field
                    .parse::<f64>()
                    .map_err(|_| DecodeError::InvalidPrice(price_field.to_string()))?;
                match price_field.split_once('.') {
                    Some((_, frac))
                        if frac.len() == PRICE_DECIMALS && frac.bytes().all(|b| b.is_ascii_digit()) => {}
                    _ => return Err(DecodeError::PriceScale(price_field.to_string())),
                }

                if let Some(extra) = fields.next() {
                    return Err(DecodeError::TrailingField(extra.to_string()));
                }

                Ok(Record::Order(OrderLine {
                    id,
                    symbol,
                    side,
                    quantity,
                    price,
                }))
            }
            other => Err(DecodeError::UnknownAction(other.to_string())),
        }
    }

    /// Decode a block of text line by line
    /// Blank lines are skipped; stops on error or if callback returns false.
    /// Returns the number of records delivered.
    pub fn decode_stream<F>(text: &str, mut callback: F) -> DecodeResult<usize>
    where
        F: FnMut(&Record) -> bool,
    {
        let mut count = 0;

        for line in text.lines() {
            match Self::decode_line(line) {
                Ok(record) => {
                    count += 1;
                    if !callback(&record) {
                        break;
                    }
                }
                Err(DecodeError::Empty) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(count)
    }
}
