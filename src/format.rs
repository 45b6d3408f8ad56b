//! Fixed width rendering of possibly invalid values.
//!
//! Every field renders to exactly the requested number of characters,
//! invalid values are replaced by a `*` sentinel, so the console table
//! remains aligned during acquisition.
use crate::fix::{Date, Field, Time};

const SENTINEL: char = '*';

/// Longest sentinel [format_int] will emit, wider fields are space padded.
const INT_SENTINEL_WIDTH: usize = 17;

/// Renders a floating point [Field] with `precision` decimals into `len` characters.
pub fn format_float(field: Field<f64>, len: usize, precision: usize) -> String {
    if !field.valid {
        return sentinel(len);
    }

    let mut formatted = format!("{:.*}", precision, field.value);

    // counted on the rendered text: rounding may add a digit, -0.0 keeps its sign
    let mut printed = formatted.chars().count();

    while printed < len {
        formatted.push(' ');
        printed += 1;
    }

    formatted
}

/// Renders an integer [Field] into `len` characters, the last one always being a space.
pub fn format_int(field: Field<u64>, len: usize) -> String {
    let mut formatted: Vec<char> = if field.valid {
        field.value.to_string().chars().collect()
    } else {
        vec![SENTINEL; INT_SENTINEL_WIDTH]
    };

    formatted.resize(len, ' ');

    if let Some(last) = formatted.last_mut() {
        *last = ' ';
    }

    formatted.into_iter().collect()
}

/// Renders "DD/MM/YY HH:MM:SS ", each half being replaced by its sentinel when invalid.
pub fn format_date_time(date: Field<Date>, time: Field<Time>) -> String {
    let mut formatted = String::with_capacity(20);

    match date.get() {
        Some(date) => formatted.push_str(&format!(
            "{:02}/{:02}/{:02} ",
            date.day,
            date.month,
            date.year % 100
        )),
        None => formatted.push_str(&sentinel(11)),
    }

    match time.get() {
        Some(time) => formatted.push_str(&format!(
            "{:02}:{:02}:{:02} ",
            time.hour, time.minute, time.second
        )),
        None => formatted.push_str(&sentinel(9)),
    }

    formatted
}

/// `len - 1` sentinel characters, terminated by a column separator
fn sentinel(len: usize) -> String {
    if len == 0 {
        return String::new();
    }

    let mut formatted = SENTINEL.to_string().repeat(len - 1);
    formatted.push(' ');
    formatted
}
